//! A1 notation for worksheet ranges.

use std::sync::LazyLock;

use regex::Regex;

use crate::column::Column;

/// Names that read as A1 (`B12`) or R1C1 (`R2C3`) cell references.
static CELL_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(?:[a-z]{1,3}[0-9]+|r[0-9]*c[0-9]*)$").expect("valid regex")
});

/// First physical row holding lead data. Row 1 is the header.
pub const DATA_FIRST_ROW: u32 = 2;

/// Last physical row scanned when reading or looking up leads.
pub const DATA_LAST_ROW: u32 = 10_000;

/// Quote a worksheet name for use in a range if needed.
///
/// Plain names (ASCII alphanumerics and '_', not starting with a digit and
/// not readable as a cell reference) are used as is. Everything else is
/// wrapped in single quotes with embedded quotes doubled.
pub fn quote_sheet_name(sheet: &str) -> String {
    let plain = sheet
        .chars()
        .next()
        .is_some_and(|c| !c.is_ascii_digit())
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !CELL_REFERENCE_REGEX.is_match(sheet);
    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Range for a single cell, e.g. `Leads!B3`.
pub fn cell_range(sheet: &str, column: &Column, row: u32) -> String {
    format!("{}!{}{}", quote_sheet_name(sheet), column, row)
}

/// Range covering `first..=last` columns across the data rows, e.g.
/// `Leads!A2:AZ10000`.
pub fn data_range(sheet: &str, first: &Column, last: &Column) -> String {
    format!(
        "{}!{}{}:{}{}",
        quote_sheet_name(sheet),
        first,
        DATA_FIRST_ROW,
        last,
        DATA_LAST_ROW
    )
}
