use crate::sheet::Column;

/// A borrowed row of raw cell values as returned by a range read.
///
/// The provider omits trailing empty cells, so a missing cell reads as an empty string.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a>(pub &'a [String]);

impl<'a> RawRow<'a> {
    /// The trimmed cell value, or `""` if the cell is absent.
    pub fn text(&self, column: Column) -> &'a str {
        self.0
            .get(column.index())
            .map(|cell| cell.trim())
            .unwrap_or_default()
    }

    /// The trimmed cell value, if it is not empty.
    pub fn optional(&self, column: Column) -> Option<String> {
        Some(self.text(column))
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
    }

    /// A finite number, if the cell holds one.
    pub fn number(&self, column: Column) -> Option<f64> {
        parse_number(self.text(column))
    }
}

/// Parses a trimmed numeric cell, ignoring empty and non-finite values.
pub fn parse_number(text: &str) -> Option<f64> {
    match text.trim() {
        "" => None,
        text => text.parse::<f64>().ok().filter(|number| number.is_finite()),
    }
}
