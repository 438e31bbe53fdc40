//! Locating a lead's physical row by trip id.

use crate::range::DATA_FIRST_ROW;

/// Find the physical row holding `trip_id` in a key column read starting at
/// [`DATA_FIRST_ROW`].
///
/// `cells` are the key column's values top-down, the first cell being the
/// first data row, `None` for a row without a key cell. Comparison is exact,
/// the first match wins. Missing or empty cells never match.
pub fn find_row_by_key<S: AsRef<str>>(trip_id: &str, cells: &[Option<S>]) -> Option<u32> {
    if trip_id.is_empty() {
        return None;
    }
    cells
        .iter()
        .position(|cell| cell.as_ref().is_some_and(|c| c.as_ref() == trip_id))
        .map(|idx| idx as u32 + DATA_FIRST_ROW)
}
