use primitives::{PatchError, RecordId, RecordKind, RowIndex, ScopeError};
use thiserror::Error;

use crate::db;

/// The outcome of a failed sync, update, delete or dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// A missing scope or request field. Raised before any remote call.
    #[error("Validation: {0}")]
    Validation(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },
    /// Reading the spreadsheet failed, nothing was changed in the store.
    #[error("Reading the spreadsheet: {0}")]
    RemoteRead(#[source] adapter::Error),
    #[error("Advertising platform: {0}")]
    Platform(#[source] adapter::Error),
    /// Writing back to the spreadsheet failed where the write is not best-effort.
    #[error("Writing the spreadsheet: {0}")]
    RemoteWrite(#[source] adapter::Error),
    #[error("Store: {0}")]
    Store(#[from] db::Error),
    /// The stored row position can't address a spreadsheet row.
    #[error("{kind} {id} has no valid row index ({row_index})")]
    InvalidRowIndex {
        kind: RecordKind,
        id: RecordId,
        row_index: RowIndex,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl Error {
    pub fn not_found(kind: impl ToString, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ScopeError> for Error {
    fn from(error: ScopeError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<PatchError> for Error {
    fn from(error: PatchError) -> Self {
        Self::Validation(error.to_string())
    }
}
