use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use primitives::{A1Range, SheetId, TabId, TabSpec, ValueRange};

use crate::Error;

/// Raw cell values of a range read, row by row.
///
/// Trailing empty cells of a row and trailing empty rows are omitted by the provider.
pub type Rows = Vec<Vec<String>>;

/// Tab title => internal [`TabId`]
pub type TabIds = HashMap<String, TabId>;

/// The spreadsheet capabilities used for mirroring records.
#[async_trait]
pub trait Spreadsheets: fmt::Debug + Send + Sync {
    /// Reads a rectangular block of cells.
    async fn read_range(&self, sheet_id: &SheetId, range: &A1Range) -> Result<Rows, Error>;

    /// Writes every [`ValueRange`] in a single call. Values are written as they are (`RAW`).
    async fn write_ranges(&self, sheet_id: &SheetId, data: Vec<ValueRange>) -> Result<(), Error>;

    /// Deletes exactly one physical row (1-based) of the tab, shifting the rows below it up.
    async fn delete_row(&self, sheet_id: &SheetId, tab_id: TabId, row: u32) -> Result<(), Error>;

    async fn tab_ids(&self, sheet_id: &SheetId) -> Result<TabIds, Error>;

    /// Creates a new document with the given tabs, their header rows and styling.
    async fn create_document(&self, title: &str, tabs: &[TabSpec]) -> Result<SheetId, Error>;

    /// Resolves the internal id of a tab by its title.
    async fn tab_id(&self, sheet_id: &SheetId, title: &str) -> Result<TabId, Error> {
        self.tab_ids(sheet_id)
            .await?
            .get(title)
            .copied()
            .ok_or_else(|| Error::tab_not_found(title))
    }
}
