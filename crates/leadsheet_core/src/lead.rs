use std::fmt;
use std::str::FromStr;

use leadsheet_error::{LeadsheetError, Result};
use serde::{Deserialize, Serialize};

/// Logical fields of a lead.
///
/// Declaration order is the canonical field order used everywhere fields are
/// listed (mappings, rows written, cell writes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeadField {
    TripId,
    Date,
    Consultant,
    Status,
    TravellerName,
    Phone,
    Email,
    TravelDate,
    TravelState,
    Remarks,
    Nights,
    Pax,
    HotelCategory,
    MealPlan,
    Priority,
    Notes,
}

impl LeadField {
    pub const ALL: [LeadField; 16] = [
        LeadField::TripId,
        LeadField::Date,
        LeadField::Consultant,
        LeadField::Status,
        LeadField::TravellerName,
        LeadField::Phone,
        LeadField::Email,
        LeadField::TravelDate,
        LeadField::TravelState,
        LeadField::Remarks,
        LeadField::Nights,
        LeadField::Pax,
        LeadField::HotelCategory,
        LeadField::MealPlan,
        LeadField::Priority,
        LeadField::Notes,
    ];

    /// Name used for this field in column mappings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TripId => "tripId",
            Self::Date => "date",
            Self::Consultant => "consultant",
            Self::Status => "status",
            Self::TravellerName => "travellerName",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::TravelDate => "travelDate",
            Self::TravelState => "travelState",
            Self::Remarks => "remarks",
            Self::Nights => "nights",
            Self::Pax => "pax",
            Self::HotelCategory => "hotelCategory",
            Self::MealPlan => "mealPlan",
            Self::Priority => "priority",
            Self::Notes => "notes",
        }
    }
}

impl FromStr for LeadField {
    type Err = LeadsheetError;

    fn from_str(s: &str) -> Result<Self> {
        LeadField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| LeadsheetError::InvalidConfig(format!("Unknown lead field '{s}'")))
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defines a label enum with a catch-all `Other` variant so that values typed
/// directly into the sheet survive a read/write cycle.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub const KNOWN: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(s) => s.as_str(),
                }
            }

            /// Parse a cell value, `None` if the cell is empty.
            pub fn from_cell(cell: &str) -> Option<Self> {
                if cell.is_empty() {
                    None
                } else {
                    Some(Self::from(cell.to_string()))
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($label => Self::$variant,)+
                    _ => Self::Other(s),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                match v {
                    $name::Other(s) => s,
                    other => other.label().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

label_enum! {
    /// Position of a lead in the sales pipeline.
    LeadStatus {
        Unfollowed => "Unfollowed",
        FollowUpCalls => "Follow-up Calls",
        WorkingOnIt => "Working on it",
        Proposal1Shared => "Proposal 1 Shared",
        Proposal2Shared => "Proposal 2 Shared",
        Proposal3Shared => "Proposal 3 Shared",
        Negotiations => "Negotiations",
        HotLeads => "Hot Leads",
        BookedWithUs => "Booked With Us",
    }
}

label_enum! {
    HotelCategory {
        Basic => "Basic",
        ThreeStar => "3 Star",
        ThreeStarPlus => "3 Star Plus",
        FourStar => "4 Star",
        FiveStar => "5 Star",
    }
}

/// A single value written to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(i64),
}

impl CellValue {
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

fn opt_text(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn opt_count(field: LeadField, s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(%field, value = %s, "ignoring non-numeric cell");
            None
        }
    }
}

/// A lead as stored in one spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub trip_id: String,
    /// Creation date, `YYYY-MM-DD`.
    pub date: String,
    pub consultant: String,
    pub status: Option<LeadStatus>,
    pub traveller_name: String,
    pub phone: String,
    pub email: String,
    /// `YYYY-MM-DD`.
    pub travel_date: String,
    pub travel_state: String,
    pub remarks: String,
    pub nights: Option<u32>,
    pub pax: Option<u32>,
    pub hotel_category: Option<HotelCategory>,
    pub meal_plan: String,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

impl Lead {
    /// Value of a field as it would be written to a cell.
    pub fn cell(&self, field: LeadField) -> CellValue {
        match field {
            LeadField::TripId => self.trip_id.as_str().into(),
            LeadField::Date => self.date.as_str().into(),
            LeadField::Consultant => self.consultant.as_str().into(),
            LeadField::Status => self
                .status
                .as_ref()
                .map(|s| CellValue::from(s.label()))
                .unwrap_or_else(CellValue::empty),
            LeadField::TravellerName => self.traveller_name.as_str().into(),
            LeadField::Phone => self.phone.as_str().into(),
            LeadField::Email => self.email.as_str().into(),
            LeadField::TravelDate => self.travel_date.as_str().into(),
            LeadField::TravelState => self.travel_state.as_str().into(),
            LeadField::Remarks => self.remarks.as_str().into(),
            LeadField::Nights => count_cell(self.nights),
            LeadField::Pax => count_cell(self.pax),
            LeadField::HotelCategory => self
                .hotel_category
                .as_ref()
                .map(|c| CellValue::from(c.label()))
                .unwrap_or_else(CellValue::empty),
            LeadField::MealPlan => self.meal_plan.as_str().into(),
            LeadField::Priority => self.priority.clone().unwrap_or_default().into(),
            LeadField::Notes => self.notes.clone().unwrap_or_default().into(),
        }
    }

    /// Set a field from the text of a cell.
    pub fn set_from_cell(&mut self, field: LeadField, cell: &str) {
        match field {
            LeadField::TripId => self.trip_id = cell.to_string(),
            LeadField::Date => self.date = cell.to_string(),
            LeadField::Consultant => self.consultant = cell.to_string(),
            LeadField::Status => self.status = LeadStatus::from_cell(cell),
            LeadField::TravellerName => self.traveller_name = cell.to_string(),
            LeadField::Phone => self.phone = cell.to_string(),
            LeadField::Email => self.email = cell.to_string(),
            LeadField::TravelDate => self.travel_date = cell.to_string(),
            LeadField::TravelState => self.travel_state = cell.to_string(),
            LeadField::Remarks => self.remarks = cell.to_string(),
            LeadField::Nights => self.nights = opt_count(field, cell),
            LeadField::Pax => self.pax = opt_count(field, cell),
            LeadField::HotelCategory => self.hotel_category = HotelCategory::from_cell(cell),
            LeadField::MealPlan => self.meal_plan = cell.to_string(),
            LeadField::Priority => self.priority = opt_text(cell),
            LeadField::Notes => self.notes = opt_text(cell),
        }
    }
}

fn count_cell(v: Option<u32>) -> CellValue {
    match v {
        Some(n) => CellValue::Number(n as i64),
        None => CellValue::empty(),
    }
}

/// A partial lead. `None` means the field wasn't supplied.
///
/// Used both for new leads (missing fields become empty cells) and for
/// updates (missing fields are left untouched).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadPatch {
    pub trip_id: Option<String>,
    pub date: Option<String>,
    pub consultant: Option<String>,
    pub status: Option<LeadStatus>,
    pub traveller_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub travel_date: Option<String>,
    pub travel_state: Option<String>,
    pub remarks: Option<String>,
    pub nights: Option<u32>,
    pub pax: Option<u32>,
    pub hotel_category: Option<HotelCategory>,
    pub meal_plan: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

impl LeadPatch {
    /// Value supplied for a field, if any.
    pub fn cell(&self, field: LeadField) -> Option<CellValue> {
        fn text(v: &Option<String>) -> Option<CellValue> {
            v.as_ref().map(|s| CellValue::from(s.as_str()))
        }

        match field {
            LeadField::TripId => text(&self.trip_id),
            LeadField::Date => text(&self.date),
            LeadField::Consultant => text(&self.consultant),
            LeadField::Status => self.status.as_ref().map(|s| s.label().into()),
            LeadField::TravellerName => text(&self.traveller_name),
            LeadField::Phone => text(&self.phone),
            LeadField::Email => text(&self.email),
            LeadField::TravelDate => text(&self.travel_date),
            LeadField::TravelState => text(&self.travel_state),
            LeadField::Remarks => text(&self.remarks),
            LeadField::Nights => self.nights.map(|n| CellValue::Number(n as i64)),
            LeadField::Pax => self.pax.map(|n| CellValue::Number(n as i64)),
            LeadField::HotelCategory => self.hotel_category.as_ref().map(|c| c.label().into()),
            LeadField::MealPlan => text(&self.meal_plan),
            LeadField::Priority => text(&self.priority),
            LeadField::Notes => text(&self.notes),
        }
    }

    /// Fields with a supplied value, in canonical order.
    pub fn supplied(&self) -> impl Iterator<Item = (LeadField, CellValue)> + '_ {
        LeadField::ALL
            .into_iter()
            .filter_map(|field| self.cell(field).map(|v| (field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.supplied().next().is_none()
    }
}

impl From<&Lead> for LeadPatch {
    fn from(lead: &Lead) -> Self {
        LeadPatch {
            trip_id: Some(lead.trip_id.clone()),
            date: Some(lead.date.clone()),
            consultant: Some(lead.consultant.clone()),
            status: lead.status.clone(),
            traveller_name: Some(lead.traveller_name.clone()),
            phone: Some(lead.phone.clone()),
            email: Some(lead.email.clone()),
            travel_date: Some(lead.travel_date.clone()),
            travel_state: Some(lead.travel_state.clone()),
            remarks: Some(lead.remarks.clone()),
            nights: lead.nights,
            pax: lead.pax,
            hotel_category: lead.hotel_category.clone(),
            meal_plan: Some(lead.meal_plan.clone()),
            priority: lead.priority.clone(),
            notes: lead.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in LeadField::ALL {
            assert_eq!(field, field.as_str().parse::<LeadField>().unwrap());
        }
        assert!("TripId".parse::<LeadField>().is_err());
    }

    #[test]
    fn status_labels() {
        assert_eq!(
            LeadStatus::FollowUpCalls,
            LeadStatus::from("Follow-up Calls".to_string())
        );
        assert_eq!(
            LeadStatus::Proposal2Shared,
            LeadStatus::from_cell("Proposal 2 Shared").unwrap()
        );
        assert_eq!("Booked With Us", LeadStatus::BookedWithUs.to_string());
        assert_eq!(9, LeadStatus::KNOWN.len());
        assert_eq!(None, LeadStatus::from_cell(""));
    }

    #[test]
    fn unknown_label_preserved() {
        let status = LeadStatus::from_cell("hot leads").unwrap();
        assert_eq!(LeadStatus::Other("hot leads".to_string()), status);
        assert_eq!("hot leads", status.label());
        assert_eq!(
            HotelCategory::Other("Boutique".to_string()),
            HotelCategory::from_cell("Boutique").unwrap()
        );
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&LeadStatus::HotLeads).unwrap();
        assert_eq!(r#""Hot Leads""#, json);
        let back: LeadStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(LeadStatus::HotLeads, back);
    }

    #[test]
    fn counts_parse_leniently() {
        let mut lead = Lead::default();
        lead.set_from_cell(LeadField::Nights, " 4 ");
        lead.set_from_cell(LeadField::Pax, "two");
        assert_eq!(Some(4), lead.nights);
        assert_eq!(None, lead.pax);
        assert_eq!(CellValue::Number(4), lead.cell(LeadField::Nights));
        assert_eq!(CellValue::empty(), lead.cell(LeadField::Pax));
    }

    #[test]
    fn patch_supplied_fields_in_order() {
        let patch = LeadPatch {
            remarks: Some("call back".to_string()),
            status: Some(LeadStatus::HotLeads),
            nights: Some(3),
            ..Default::default()
        };
        let supplied: Vec<_> = patch.supplied().collect();
        assert_eq!(
            vec![
                (LeadField::Status, CellValue::from("Hot Leads")),
                (LeadField::Remarks, CellValue::from("call back")),
                (LeadField::Nights, CellValue::Number(3)),
            ],
            supplied
        );
        assert!(!patch.is_empty());
        assert!(LeadPatch::default().is_empty());
    }

    #[test]
    fn cell_values_serialize_untagged() {
        let cells = vec![CellValue::from("Goa"), CellValue::Number(2)];
        assert_eq!(r#"["Goa",2]"#, serde_json::to_string(&cells).unwrap());
    }
}
