use std::collections::BTreeMap;

use leadsheet_error::{LeadsheetError, Result};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::column::Column;
use crate::lead::LeadField;

/// Binding of logical lead fields to spreadsheet columns.
///
/// Entries are kept in [`LeadField`] order. A field without an entry is never
/// written and reads back as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<(LeadField, Column)>,
}

impl ColumnMapping {
    pub fn new(entries: impl IntoIterator<Item = (LeadField, Column)>) -> Self {
        let by_field: BTreeMap<LeadField, Column> = entries.into_iter().collect();
        ColumnMapping {
            entries: by_field.into_iter().collect(),
        }
    }

    /// Build a mapping from field names and column letters.
    ///
    /// Unknown field names are skipped. Invalid column letters are an error.
    pub fn from_names<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut entries = Vec::new();
        for (name, letters) in pairs {
            let field = match name.parse::<LeadField>() {
                Ok(field) => field,
                Err(_) => {
                    warn!(field = %name, column = %letters, "skipping unknown field in column mapping");
                    continue;
                }
            };
            let column = Column::parse(letters).map_err(|_| {
                LeadsheetError::InvalidColumn(format!("{letters} (field '{name}')"))
            })?;
            entries.push((field, column));
        }
        Ok(ColumnMapping::new(entries))
    }

    pub fn column(&self, field: LeadField) -> Option<&Column> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeadField, &Column)> {
        self.entries.iter().map(|(f, c)| (*f, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of a row that holds every mapped column.
    pub fn row_width(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, c)| c.index() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Rightmost mapped column.
    pub fn last_column(&self) -> Option<&Column> {
        self.entries.iter().map(|(_, c)| c).max_by_key(|c| c.index())
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        ColumnMapping::from_names(raw.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .map_err(serde::de::Error::custom)
    }
}
