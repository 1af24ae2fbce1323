//! Mirrors single record updates & deletes onto the rows of their tab.
//!
//! The store is the system of record: a failed spreadsheet call is logged and swallowed.
use std::sync::Arc;

use adapter::Spreadsheets;
use primitives::{A1Range, FieldPatch, Scope, ValueRange};
use slog::{warn, Logger};

use crate::{parse::TabLayout, Error};

#[derive(Debug, Clone)]
pub struct Projector {
    sheets: Arc<dyn Spreadsheets>,
    logger: Logger,
}

impl Projector {
    pub fn new(sheets: Arc<dyn Spreadsheets>, logger: Logger) -> Self {
        Self { sheets, logger }
    }

    /// The single-cell writes of a patch applied to `row`, e.g. `Kampagner!C7`.
    pub fn update_ranges<P: FieldPatch>(tab: &str, row: u32, patch: &P) -> Vec<ValueRange> {
        patch
            .cells()
            .into_iter()
            .map(|cell| ValueRange::single(&A1Range::cell(tab, cell.column, row), cell.value))
            .collect()
    }

    /// Writes the patched fields to the row of the updated record in one call.
    pub async fn mirror_update<R: TabLayout>(&self, scope: &Scope, updated: &R, patch: &R::Patch) {
        let row = match updated.row_index().addressable() {
            Some(row) => row,
            None => {
                warn!(&self.logger, "Record has no row to mirror the update to"; "tab" => R::TAB, "id" => %updated.id(), "row" => updated.row_index().get());
                return;
            }
        };

        let data = Self::update_ranges(R::TAB, row, patch);
        if data.is_empty() {
            return;
        }

        if let Err(error) = self.sheets.write_ranges(&scope.sheet_id, data).await {
            warn!(&self.logger, "Mirroring the update failed"; "tab" => R::TAB, "row" => row, "error" => %error);
        }
    }

    /// Deletes the row of a record about to be removed from the store.
    ///
    /// Fails only when the record can't address a row, a failed spreadsheet call is logged.
    pub async fn mirror_delete<R: TabLayout>(&self, scope: &Scope, record: &R) -> Result<(), Error> {
        let row = record
            .row_index()
            .addressable()
            .ok_or_else(|| Error::InvalidRowIndex {
                kind: R::KIND,
                id: record.id(),
                row_index: record.row_index(),
            })?;

        let deleted = match self.sheets.tab_id(&scope.sheet_id, R::TAB).await {
            Ok(tab_id) => self.sheets.delete_row(&scope.sheet_id, tab_id, row).await,
            Err(error) => Err(error),
        };

        if let Err(error) = deleted {
            // rows below `row` stay stale until the next full sync either way
            warn!(&self.logger, "Mirroring the delete failed"; "tab" => R::TAB, "row" => row, "error" => %error);
        }

        Ok(())
    }
}
