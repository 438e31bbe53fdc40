//! Spreadsheet column letters.
//!
//! Columns are a base-26 numeral without a zero digit: 'A'..'Z' are the
//! digits 1..26, most significant letter first. Indices are zero-based, so
//! "A" is 0, "Z" is 25 and "AA" is 26.

use std::fmt;
use std::str::FromStr;

use leadsheet_error::{LeadsheetError, Result};

/// Highest column index a worksheet can hold, `ZZZ`.
pub const MAX_COLUMN_INDEX: usize = 18_277;

/// Convert column letters to a zero-based column index.
///
/// Only uppercase ASCII letters are accepted.
pub fn letter_to_index(col: &str) -> Result<usize> {
    if col.is_empty() {
        return Err(LeadsheetError::InvalidColumn(col.to_string()));
    }

    let mut acc: usize = 0;
    for b in col.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(LeadsheetError::InvalidColumn(col.to_string()));
        }
        let digit = (b - b'A') as usize + 1;
        acc = acc
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| LeadsheetError::InvalidColumn(col.to_string()))?;
    }

    Ok(acc - 1)
}

/// Convert a zero-based column index to column letters.
///
/// Exact inverse of [`letter_to_index`].
pub fn index_to_letter(index: usize) -> String {
    let mut n = index as u128 + 1;
    let mut buf = Vec::new();
    while n > 0 {
        n -= 1;
        buf.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    buf.reverse();
    // Only ASCII uppercase pushed above.
    String::from_utf8(buf).unwrap_or_default()
}

/// A validated column address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    index: usize,
    letters: String,
}

impl Column {
    /// Parse column letters, accepting lowercase input.
    ///
    /// Columns past [`MAX_COLUMN_INDEX`] are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let letters = s.trim().to_ascii_uppercase();
        let index = letter_to_index(&letters)?;
        if index > MAX_COLUMN_INDEX {
            return Err(LeadsheetError::InvalidColumn(letters));
        }
        Ok(Column { index, letters })
    }

    pub fn from_index(index: usize) -> Self {
        Column {
            index,
            letters: index_to_letter(index),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn letters(&self) -> &str {
        &self.letters
    }
}

impl FromStr for Column {
    type Err = LeadsheetError;

    fn from_str(s: &str) -> Result<Self> {
        Column::parse(s)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters)
    }
}
