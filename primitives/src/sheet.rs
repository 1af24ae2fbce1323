//! Spreadsheet addressing: columns, row positions and A1 ranges.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The internal, numeric id of a tab inside a spreadsheet document.
/// It is different from the tab title and survives renames.
pub type TabId = i64;

/// A zero-based column, displayed with spreadsheet letters (`A`, `B`, .., `Z`, `AA`, ..).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u16);

impl Column {
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut remaining = u32::from(self.0) + 1;
        while remaining > 0 {
            let rem = (remaining - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            remaining = (remaining - 1) / 26;
        }

        letters.iter().rev().try_for_each(|letter| write!(f, "{}", letter))
    }
}

impl FromStr for Column {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(A1Error::Column(s.to_owned()));
        }

        let number = s.chars().try_fold(0_u32, |acc, letter| {
            let digit = u32::from(letter.to_ascii_uppercase()) - u32::from('A') + 1;
            acc.checked_mul(26)
                .and_then(|acc| acc.checked_add(digit))
                .filter(|number| *number <= u32::from(u16::MAX))
        });

        number
            .map(|number| Self((number - 1) as u16))
            .ok_or_else(|| A1Error::Column(s.to_owned()))
    }
}

/// The 1-based physical row of a record inside its tab, as it was at the last full sync.
///
/// Row `1` is always the header, so every parsed record has a row index `>= 2`.
/// Records that were never read from their tab carry [`RowIndex::UNADDRESSED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(i64);

impl RowIndex {
    pub const HEADER_ROW: u32 = 1;
    pub const FIRST_DATA_ROW: u32 = 2;
    pub const UNADDRESSED: RowIndex = RowIndex(0);

    pub const fn new(row: i64) -> Self {
        Self(row)
    }

    /// The row index of the `offset`-th row (0-based) of a block read starting at [`RowIndex::FIRST_DATA_ROW`].
    pub fn from_offset(offset: usize) -> Self {
        Self(offset as i64 + i64::from(Self::FIRST_DATA_ROW))
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns the physical row if it can be used for a positional write or delete.
    pub fn addressable(self) -> Option<u32> {
        u32::try_from(self.0)
            .ok()
            .filter(|row| *row >= Self::FIRST_DATA_ROW)
    }
}

impl Default for RowIndex {
    fn default() -> Self {
        Self::UNADDRESSED
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum A1Error {
    #[error("Expected `<Tab>!<Cells>` but got `{0}`")]
    MissingTab(String),
    #[error("Invalid column `{0}`")]
    Column(String),
    #[error("Invalid cell reference `{0}`")]
    Cell(String),
}

/// One end of an [`A1Range`]. A missing row means the range is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: Column,
    pub row: Option<u32>,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "{}{}", self.column, row),
            None => write!(f, "{}", self.column),
        }
    }
}

impl FromStr for CellRef {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split_at = s
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split_at);

        let column = letters.parse()?;
        let row = match digits {
            "" => None,
            digits => Some(
                digits
                    .parse::<u32>()
                    .ok()
                    .filter(|row| *row > 0)
                    .ok_or_else(|| A1Error::Cell(s.to_owned()))?,
            ),
        };

        Ok(Self { column, row })
    }
}

/// A range in A1 notation, e.g. `Kampagner!A2:E`, `Annoncer!C7` or `AllResources!P2:P10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub tab: String,
    pub start: CellRef,
    pub end: Option<CellRef>,
}

impl A1Range {
    /// A single cell, e.g. `Kampagner!B5`.
    pub fn cell(tab: &str, column: Column, row: u32) -> Self {
        Self {
            tab: tab.to_owned(),
            start: CellRef {
                column,
                row: Some(row),
            },
            end: None,
        }
    }

    /// Every row from `first_row` until the end of the tab, e.g. `Keywords!A2:D`.
    pub fn open_rows(tab: &str, first: Column, last: Column, first_row: u32) -> Self {
        Self {
            tab: tab.to_owned(),
            start: CellRef {
                column: first,
                row: Some(first_row),
            },
            end: Some(CellRef {
                column: last,
                row: None,
            }),
        }
    }

    /// A closed rectangular block, e.g. `AllResources!A2:P1000`.
    pub fn block(tab: &str, first: Column, last: Column, first_row: u32, last_row: u32) -> Self {
        Self {
            tab: tab.to_owned(),
            start: CellRef {
                column: first,
                row: Some(first_row),
            },
            end: Some(CellRef {
                column: last,
                row: Some(last_row),
            }),
        }
    }

    fn quoted_tab(&self) -> String {
        if self
            .tab
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.tab.clone()
        } else {
            format!("'{}'", self.tab.replace('\'', "''"))
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.quoted_tab(), self.start)?;
        if let Some(end) = &self.end {
            write!(f, ":{}", end)?;
        }

        Ok(())
    }
}

impl FromStr for A1Range {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tab, cells) = s
            .rsplit_once('!')
            .ok_or_else(|| A1Error::MissingTab(s.to_owned()))?;

        let tab = match tab.strip_prefix('\'').and_then(|tab| tab.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => tab.to_owned(),
        };
        if tab.is_empty() {
            return Err(A1Error::MissingTab(s.to_owned()));
        }

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start.parse()?, Some(end.parse()?)),
            None => (cells.parse()?, None),
        };

        Ok(Self { tab, start, end })
    }
}

/// A single value destined for one column of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: Column,
    pub value: Value,
}

impl Cell {
    pub fn new(column: Column, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// Values for one range, in the shape the Sheets API uses for `values:batchUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn new(range: &A1Range, values: Vec<Vec<Value>>) -> Self {
        Self {
            range: range.to_string(),
            values,
        }
    }

    /// A write of a single cell.
    pub fn single(range: &A1Range, value: Value) -> Self {
        Self::new(range, vec![vec![value]])
    }

    /// A write of one value per row, top to bottom.
    pub fn column<I>(range: &A1Range, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::new(
            range,
            values.into_iter().map(|value| vec![value.into()]).collect(),
        )
    }
}

/// A tab to create along with a new spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSpec {
    pub title: String,
    /// Written to row `1`.
    pub headers: Vec<String>,
    /// Freeze row `1`.
    pub frozen_header: bool,
    /// Bold & tinted row `1`.
    pub styled_header: bool,
    /// Free-form text written to `A1` when there are no headers.
    pub note: Option<String>,
}

impl TabSpec {
    pub fn with_headers(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_owned(),
            headers: headers.iter().map(|header| header.to_string()).collect(),
            frozen_header: true,
            styled_header: true,
            note: None,
        }
    }

    pub fn with_note(title: &str, note: &str) -> Self {
        Self {
            title: title.to_owned(),
            headers: vec![],
            frozen_header: false,
            styled_header: false,
            note: Some(note.to_owned()),
        }
    }

    /// The range of row `1` that holds the headers (or the note).
    pub fn header_range(&self) -> A1Range {
        let width = self.headers.len().max(1) as u16;
        if width == 1 {
            A1Range::cell(&self.title, Column::new(0), RowIndex::HEADER_ROW)
        } else {
            A1Range::block(
                &self.title,
                Column::new(0),
                Column::new(width - 1),
                RowIndex::HEADER_ROW,
                RowIndex::HEADER_ROW,
            )
        }
    }

    /// The header row (or the note) as a [`ValueRange`].
    pub fn header_values(&self) -> Option<ValueRange> {
        let row: Vec<Value> = match &self.note {
            Some(note) if self.headers.is_empty() => vec![Value::String(note.clone())],
            _ => self.headers.iter().cloned().map(Value::String).collect(),
        };

        (!row.is_empty()).then(|| ValueRange::new(&self.header_range(), vec![row]))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn columns_use_spreadsheet_letters() {
        let cases = [(0, "A"), (4, "E"), (15, "P"), (25, "Z"), (26, "AA"), (27, "AB"), (701, "ZZ"), (702, "AAA")];

        for (index, letters) in cases {
            assert_eq!(letters, Column::new(index).to_string());
            assert_eq!(Ok(Column::new(index)), letters.parse::<Column>());
        }

        assert!("A1".parse::<Column>().is_err());
        assert!("".parse::<Column>().is_err());
    }

    #[test]
    fn row_index_addressing() {
        assert_eq!(RowIndex::new(2), RowIndex::from_offset(0));
        assert_eq!(RowIndex::new(7), RowIndex::from_offset(5));

        assert_eq!(Some(2), RowIndex::new(2).addressable());
        assert_eq!(None, RowIndex::new(1).addressable(), "The header row is never addressable");
        assert_eq!(None, RowIndex::UNADDRESSED.addressable());
        assert_eq!(None, RowIndex::new(-3).addressable());
        assert_eq!(None, RowIndex::new(i64::from(u32::MAX) + 1).addressable());
    }

    #[test]
    fn a1_ranges_display_and_parse() {
        let cases = [
            (
                A1Range::open_rows("Kampagner", Column::new(0), Column::new(4), 2),
                "Kampagner!A2:E",
            ),
            (A1Range::cell("Annoncer", Column::new(2), 7), "Annoncer!C7"),
            (
                A1Range::block("AllResources", Column::new(15), Column::new(15), 2, 10),
                "AllResources!P2:P10",
            ),
            (
                A1Range::cell("Ad Groups", Column::new(0), 1),
                "'Ad Groups'!A1",
            ),
        ];

        for (range, expected) in cases {
            assert_eq!(expected, range.to_string());
            assert_eq!(Ok(range), expected.parse::<A1Range>());
        }

        assert_eq!(
            Err(A1Error::MissingTab("A1:B2".into())),
            "A1:B2".parse::<A1Range>()
        );
        assert_eq!(
            Err(A1Error::Cell("A0".into())),
            "Keywords!A0".parse::<A1Range>()
        );
    }

    #[test]
    fn tab_spec_header_values() {
        let tab = TabSpec::with_headers("Keywords", &["Ad Group", "Keyword", "Match Type", "CPC"]);
        let header = tab.header_values().expect("Should have a header row");

        assert_eq!("Keywords!A1:D1", header.range);
        assert_eq!(
            vec![vec![json!("Ad Group"), json!("Keyword"), json!("Match Type"), json!("CPC")]],
            header.values
        );

        let note = TabSpec::with_note("Forklaring", "Explanation");
        let header = note.header_values().expect("Should have a note");
        assert_eq!("Forklaring!A1", header.range);
        assert_eq!(vec![vec![json!("Explanation")]], header.values);
    }
}
