//! In-memory [`Spreadsheets`] & [`AdsPlatform`] clients intended for testing.
//!
//! Both record every call they receive and can be told to fail a call.
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use primitives::{A1Range, Operation, ResourceKind, RowIndex, SheetId, TabId, TabSpec, ValueRange};
use serde_json::{json, Value};

use crate::{AdsPlatform, Error, Rows, Spreadsheets, TabIds};

/// A call of [`Spreadsheets`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetsCall {
    ReadRange,
    WriteRanges,
    DeleteRow,
    TabIds,
    CreateDocument,
}

/// A tab of a dummy document, `rows` starting from row `2`.
#[derive(Debug, Clone, Default)]
struct Tab {
    id: TabId,
    rows: Rows,
}

/// A spreadsheet document created through [`Spreadsheets::create_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub title: String,
    pub tabs: Vec<TabSpec>,
}

#[derive(Debug, Default)]
struct SheetsState {
    /// (document, tab title) => tab
    tabs: DashMap<(SheetId, String), Tab>,
    writes: DashMap<SheetId, Vec<Vec<ValueRange>>>,
    deleted_rows: DashMap<SheetId, Vec<(TabId, u32)>>,
    created: DashMap<SheetId, CreatedDocument>,
    failures: DashMap<SheetsCall, String>,
    next_id: AtomicUsize,
}

/// An in-memory spreadsheet provider.
/// Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct DummySheets {
    state: Arc<SheetsState>,
}

impl DummySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data rows (from row `2` onwards) of a tab, creating the tab if needed.
    pub fn set_tab(&self, sheet_id: &SheetId, title: &str, rows: Rows) {
        let key = (sheet_id.clone(), title.to_owned());
        let id = match self.state.tabs.get(&key) {
            Some(tab) => tab.id,
            None => self.next_id() as TabId,
        };

        self.state.tabs.insert(key, Tab { id, rows });
    }

    /// The current data rows of a tab.
    pub fn tab_rows(&self, sheet_id: &SheetId, title: &str) -> Option<Rows> {
        self.state
            .tabs
            .get(&(sheet_id.clone(), title.to_owned()))
            .map(|tab| tab.rows.clone())
    }

    /// Makes every following `call` fail with `message`.
    pub fn fail(&self, call: SheetsCall, message: &str) {
        self.state.failures.insert(call, message.to_owned());
    }

    pub fn recover(&self, call: SheetsCall) {
        self.state.failures.remove(&call);
    }

    /// Every successful [`Spreadsheets::write_ranges`] call, oldest first.
    pub fn writes(&self, sheet_id: &SheetId) -> Vec<Vec<ValueRange>> {
        self.state
            .writes
            .get(sheet_id)
            .map(|writes| writes.value().clone())
            .unwrap_or_default()
    }

    /// Every successful [`Spreadsheets::delete_row`] call as `(tab id, row)`, oldest first.
    pub fn deleted_rows(&self, sheet_id: &SheetId) -> Vec<(TabId, u32)> {
        self.state
            .deleted_rows
            .get(sheet_id)
            .map(|deleted| deleted.value().clone())
            .unwrap_or_default()
    }

    pub fn created(&self, sheet_id: &SheetId) -> Option<CreatedDocument> {
        self.state
            .created
            .get(sheet_id)
            .map(|document| document.value().clone())
    }

    fn next_id(&self) -> usize {
        self.state.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn check(&self, call: SheetsCall) -> Result<(), Error> {
        match self.state.failures.get(&call) {
            Some(message) => Err(Error::dummy(message.value().clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Spreadsheets for DummySheets {
    async fn read_range(&self, sheet_id: &SheetId, range: &A1Range) -> Result<Rows, Error> {
        self.check(SheetsCall::ReadRange)?;

        let first_row = range.start.row.unwrap_or(RowIndex::FIRST_DATA_ROW);
        if first_row < RowIndex::FIRST_DATA_ROW {
            return Err(Error::invalid_range(format!(
                "Dummy tabs hold data rows only, got `{}`",
                range
            )));
        }

        let rows = match self.state.tabs.get(&(sheet_id.clone(), range.tab.clone())) {
            Some(tab) => tab.rows.clone(),
            None => return Ok(vec![]),
        };

        let skip = (first_row - RowIndex::FIRST_DATA_ROW) as usize;
        let take = match range.end.and_then(|end| end.row) {
            Some(last_row) => (last_row + 1).saturating_sub(first_row) as usize,
            None => usize::MAX,
        };

        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    async fn write_ranges(&self, sheet_id: &SheetId, data: Vec<ValueRange>) -> Result<(), Error> {
        self.check(SheetsCall::WriteRanges)?;

        self.state
            .writes
            .entry(sheet_id.clone())
            .or_default()
            .push(data);

        Ok(())
    }

    async fn delete_row(&self, sheet_id: &SheetId, tab_id: TabId, row: u32) -> Result<(), Error> {
        self.check(SheetsCall::DeleteRow)?;

        let mut tab = self
            .state
            .tabs
            .iter_mut()
            .find(|tab| &tab.key().0 == sheet_id && tab.id == tab_id)
            .ok_or_else(|| Error::dummy(format!("No tab with id {}", tab_id)))?;

        // rows below shift up
        let offset = row.checked_sub(RowIndex::FIRST_DATA_ROW).map(|offset| offset as usize);
        if let Some(offset) = offset.filter(|offset| *offset < tab.rows.len()) {
            tab.rows.remove(offset);
        }
        drop(tab);

        self.state
            .deleted_rows
            .entry(sheet_id.clone())
            .or_default()
            .push((tab_id, row));

        Ok(())
    }

    async fn tab_ids(&self, sheet_id: &SheetId) -> Result<TabIds, Error> {
        self.check(SheetsCall::TabIds)?;

        Ok(self
            .state
            .tabs
            .iter()
            .filter(|tab| &tab.key().0 == sheet_id)
            .map(|tab| (tab.key().1.clone(), tab.id))
            .collect())
    }

    async fn create_document(&self, title: &str, tabs: &[TabSpec]) -> Result<SheetId, Error> {
        self.check(SheetsCall::CreateDocument)?;

        let sheet_id = SheetId::from(format!("dummy-sheet-{}", self.next_id()));
        for tab in tabs {
            self.set_tab(&sheet_id, &tab.title, vec![]);
        }

        let headers: Vec<ValueRange> = tabs.iter().filter_map(TabSpec::header_values).collect();
        self.write_ranges(&sheet_id, headers).await?;

        self.state.created.insert(
            sheet_id.clone(),
            CreatedDocument {
                title: title.to_owned(),
                tabs: tabs.to_vec(),
            },
        );

        Ok(sheet_id)
    }
}

#[derive(Debug, Default)]
struct AdsState {
    batches: DashMap<ResourceKind, Vec<Vec<Operation>>>,
    failures: DashMap<ResourceKind, String>,
}

/// An in-memory advertising platform.
/// Clones share the same submitted batches.
#[derive(Debug, Clone, Default)]
pub struct DummyAds {
    state: Arc<AdsState>,
}

impl DummyAds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following batch of `kind` fail with `message`.
    pub fn fail(&self, kind: ResourceKind, message: &str) {
        self.state.failures.insert(kind, message.to_owned());
    }

    /// The submitted batches of `kind`, oldest first.
    pub fn batches(&self, kind: ResourceKind) -> Vec<Vec<Operation>> {
        self.state
            .batches
            .get(&kind)
            .map(|batches| batches.value().clone())
            .unwrap_or_default()
    }

    /// Every submitted operation of every kind.
    pub fn submitted(&self) -> Vec<Operation> {
        ResourceKind::ALL
            .iter()
            .flat_map(|kind| self.batches(*kind).into_iter().flatten())
            .collect()
    }
}

#[async_trait]
impl AdsPlatform for DummyAds {
    async fn create(&self, kind: ResourceKind, operations: Vec<Operation>) -> Result<Value, Error> {
        if operations.is_empty() {
            return Ok(Value::Null);
        }

        if let Some(message) = self.state.failures.get(&kind) {
            return Err(Error::dummy(format!("{}: {}", kind.endpoint(), message.value())));
        }

        let results = operations.len();
        self.state
            .batches
            .entry(kind)
            .or_default()
            .push(operations);

        Ok(json!({ "results": results }))
    }
}
