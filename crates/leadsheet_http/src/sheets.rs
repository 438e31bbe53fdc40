//! Request and response bodies of the spreadsheet values api.

use leadsheet_core::CellValue;
use leadsheet_core::mapper::CellWrite;
use serde::{Deserialize, Serialize};

/// Values are interpreted as if typed into the sheet by a user.
pub const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    /// Missing entirely when the range is empty.
    #[serde(default)]
    pub values: Option<Vec<Vec<serde_json::Value>>>,
}

impl ValueRange {
    /// Rows as strings. Rows aren't padded, trailing empty cells are omitted
    /// by the provider.
    pub fn into_string_rows(self) -> Vec<Vec<String>> {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(true) => "TRUE".to_string(),
        serde_json::Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct AppendRequest<'a> {
    pub values: [&'a [CellValue]; 1],
}

impl<'a> AppendRequest<'a> {
    pub fn single_row(row: &'a [CellValue]) -> Self {
        AppendRequest { values: [row] }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<AppendUpdates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendUpdates {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_cells: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest<'a> {
    pub value_input_option: &'static str,
    pub data: Vec<BatchValueRange<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BatchValueRange<'a> {
    pub range: &'a str,
    pub values: [[&'a CellValue; 1]; 1],
}

impl<'a> BatchUpdateRequest<'a> {
    pub fn from_writes(writes: &'a [CellWrite]) -> Self {
        BatchUpdateRequest {
            value_input_option: VALUE_INPUT_OPTION,
            data: writes
                .iter()
                .map(|w| BatchValueRange {
                    range: &w.range,
                    values: [[&w.value]],
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub total_updated_cells: Option<u64>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_values_is_empty() {
        let vr: ValueRange = serde_json::from_str(r#"{"range":"Leads!A2:AZ10000","majorDimension":"ROWS"}"#).unwrap();
        assert!(vr.into_string_rows().is_empty());

        let vr: ValueRange = serde_json::from_str(r#"{"values":null}"#).unwrap();
        assert!(vr.into_string_rows().is_empty());
    }

    #[test]
    fn mixed_cells_stringified() {
        let vr: ValueRange =
            serde_json::from_str(r#"{"values":[["T1", 4, true, null, 2.5], [], ["T2"]]}"#).unwrap();
        assert_eq!(
            vec![
                vec!["T1", "4", "TRUE", "", "2.5"],
                vec![],
                vec!["T2"],
            ],
            vr.into_string_rows()
        );
    }

    #[test]
    fn append_body() {
        let row = vec![CellValue::from("T1"), CellValue::empty(), CellValue::Number(3)];
        let body = serde_json::to_value(AppendRequest::single_row(&row)).unwrap();
        assert_eq!(json!({"values": [["T1", "", 3]]}), body);
    }

    #[test]
    fn batch_body() {
        let writes = vec![
            CellWrite {
                range: "Sheet!B3".to_string(),
                value: CellValue::from("Hot Leads"),
            },
            CellWrite {
                range: "Sheet!K3".to_string(),
                value: CellValue::Number(5),
            },
        ];
        let body = serde_json::to_value(BatchUpdateRequest::from_writes(&writes)).unwrap();
        assert_eq!(
            json!({
                "valueInputOption": "USER_ENTERED",
                "data": [
                    {"range": "Sheet!B3", "values": [["Hot Leads"]]},
                    {"range": "Sheet!K3", "values": [[5]]},
                ],
            }),
            body
        );
    }

    #[test]
    fn append_response_range() {
        let resp: AppendResponse = serde_json::from_str(
            r#"{"spreadsheetId":"abc","tableRange":"Leads!A1:N40","updates":{"updatedRange":"Leads!A41:N41","updatedRows":1,"updatedCells":14}}"#,
        )
        .unwrap();
        let updates = resp.updates.unwrap();
        assert_eq!(Some("Leads!A41:N41"), updates.updated_range.as_deref());
        assert_eq!(Some(14), updates.updated_cells);
    }
}
