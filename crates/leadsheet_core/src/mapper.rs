//! Conversion between spreadsheet rows and lead records.

use serde::Serialize;

use crate::column::Column;
use crate::lead::{CellValue, Lead, LeadField, LeadPatch};
use crate::mapping::ColumnMapping;
use crate::range::cell_range;

/// Build a lead from the cells of a row.
///
/// Rows aren't padded by the provider, cells past the end of the row read as
/// empty.
pub fn row_to_lead<S: AsRef<str>>(row: &[S], mapping: &ColumnMapping) -> Lead {
    let mut lead = Lead::default();
    for (field, column) in mapping.iter() {
        let cell = row.get(column.index()).map(|c| c.as_ref()).unwrap_or("");
        lead.set_from_cell(field, cell);
    }
    lead
}

/// Generate a trip id from the current time, `T` followed by epoch millis.
pub fn generate_trip_id() -> String {
    format!("T{}", chrono::Utc::now().timestamp_millis())
}

/// A row ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRow {
    /// Trip id of the row, generated if the lead didn't have one.
    pub trip_id: String,
    pub cells: Vec<CellValue>,
}

/// Lay out a (partial) lead as a full row.
///
/// The row is as wide as the rightmost mapped column, unset cells are empty.
/// A lead without a trip id gets a generated one.
pub fn lead_to_row(lead: &LeadPatch, mapping: &ColumnMapping) -> NewRow {
    let trip_id = match lead.trip_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate_trip_id(),
    };

    let mut cells = vec![CellValue::empty(); mapping.row_width()];
    for (field, column) in mapping.iter() {
        let value = match field {
            LeadField::TripId => Some(CellValue::Text(trip_id.clone())),
            _ => lead.cell(field),
        };
        if let Some(value) = value {
            cells[column.index()] = value;
        }
    }

    NewRow { trip_id, cells }
}

/// A value to write to a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellWrite {
    pub range: String,
    pub value: CellValue,
}

/// Fields of an update that can be written.
///
/// Fields without a value or without a mapped column are dropped. The trip id
/// is the lookup key and is never rewritten.
pub fn writable_fields<'a>(
    updates: &'a LeadPatch,
    mapping: &'a ColumnMapping,
) -> impl Iterator<Item = (LeadField, &'a Column, CellValue)> + 'a {
    updates
        .supplied()
        .filter(|(field, _)| *field != LeadField::TripId)
        .filter_map(|(field, value)| mapping.column(field).map(|col| (field, col, value)))
}

/// Turn an update into per-cell writes against a physical row.
///
/// An empty result means there's nothing to write.
pub fn lead_to_cell_writes(
    sheet: &str,
    updates: &LeadPatch,
    mapping: &ColumnMapping,
    row: u32,
) -> Vec<CellWrite> {
    writable_fields(updates, mapping)
        .map(|(_, column, value)| CellWrite {
            range: cell_range(sheet, column, row),
            value,
        })
        .collect()
}
