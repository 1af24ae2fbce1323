use std::sync::Arc;

use adapter::Spreadsheets;
use primitives::{FieldPatch, RecordId, Scope};
use serde::Serialize;
use slog::{info, warn, Logger};

use crate::{
    db::Store,
    parse::{parse_rows, TabLayout},
    projector::Projector,
    Error,
};

/// The outcome of a full sync of one tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// The parsed records, whether or not they were all persisted.
    pub synced: usize,
    pub persisted: usize,
    /// Rows dropped by the required field checks.
    pub skipped: usize,
}

/// Keeps one record kind in the store and its tab in lockstep.
#[derive(Debug)]
pub struct DefService<R: TabLayout> {
    store: Arc<dyn Store<R>>,
    sheets: Arc<dyn Spreadsheets>,
    projector: Projector,
    logger: Logger,
}

impl<R: TabLayout> Clone for DefService<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sheets: self.sheets.clone(),
            projector: self.projector.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<R: TabLayout> DefService<R> {
    pub fn new(store: Arc<dyn Store<R>>, sheets: Arc<dyn Spreadsheets>, logger: Logger) -> Self {
        let logger = logger.new(slog::o!("tab" => R::TAB));

        Self {
            store,
            projector: Projector::new(sheets.clone(), logger.clone()),
            sheets,
            logger,
        }
    }

    /// The records of the scope ordered by row.
    pub async fn list(&self, scope: &Scope) -> Result<Vec<R>, Error> {
        Ok(self.store.find(scope).await?)
    }

    /// Updates the stored record first, then mirrors the set fields to its row.
    ///
    /// String fields are stored trimmed. A required field set to a blank value is rejected
    /// before the store is touched.
    pub async fn update(
        &self,
        scope: &Scope,
        id: RecordId,
        mut patch: R::Patch,
    ) -> Result<R, Error> {
        if patch.is_empty() {
            return Err(Error::Validation("No fields to update".into()));
        }
        patch.normalize()?;

        let updated = self
            .store
            .find_one_and_update(scope, id, &patch)
            .await?
            .ok_or_else(|| Error::not_found(R::KIND, id))?;

        self.projector.mirror_update(scope, &updated, &patch).await;

        Ok(updated)
    }

    /// Deletes the row of the record, then the record.
    /// The record is removed from the store even if its row could not be deleted.
    pub async fn delete(&self, scope: &Scope, id: RecordId) -> Result<R, Error> {
        let record = self
            .store
            .find_one(scope, id)
            .await?
            .ok_or_else(|| Error::not_found(R::KIND, id))?;

        self.projector.mirror_delete(scope, &record).await?;

        if !self.store.delete_one(scope, id).await? {
            return Err(Error::not_found(R::KIND, id));
        }

        Ok(record)
    }

    /// Replaces every stored record of the scope with the rows of the tab.
    ///
    /// The tab is read before anything is deleted, so a failed read leaves the store untouched.
    pub async fn sync_from_sheet(&self, scope: &Scope) -> Result<SyncReport, Error> {
        let rows = self
            .sheets
            .read_range(&scope.sheet_id, &R::range())
            .await
            .map_err(Error::RemoteRead)?;

        let parsed = parse_rows::<R>(&self.logger, scope, &rows);
        let synced = parsed.records.len();

        let deleted = self.store.delete_many(scope).await?;
        let outcome = self.store.insert_many(parsed.records).await?;

        for failure in &outcome.failures {
            warn!(&self.logger, "Record was not persisted"; "scope" => %scope, "error" => failure);
        }

        let report = SyncReport {
            synced,
            persisted: outcome.inserted,
            skipped: parsed.skipped,
        };
        info!(&self.logger, "Synced from sheet"; "scope" => %scope, "deleted" => deleted, "synced" => report.synced, "persisted" => report.persisted, "skipped" => report.skipped);

        Ok(report)
    }
}
