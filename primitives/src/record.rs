use std::{fmt, str::FromStr};

use bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{
    scope::Scope,
    sheet::{Cell, RowIndex},
};

/// The store-issued identity of a record (`_id`).
///
/// A new id is issued on every full sync, so ids are not stable across syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(ObjectId);

impl RecordId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for RecordId {
    fn from(object_id: ObjectId) -> Self {
        Self(object_id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = bson::oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

/// The three record kinds mirrored from a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, parse_display::Display, parse_display::FromStr)]
#[display(style = "lowercase")]
pub enum RecordKind {
    Campaign,
    Ad,
    Keyword,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("`{0}` must not be blank")]
    BlankRequired(&'static str),
}

/// Trims a set string field.
pub(crate) fn trim_field(field: &mut Option<String>) {
    if let Some(text) = field {
        *text = text.trim().to_owned();
    }
}

/// Trims a set string field the record cannot go without.
pub(crate) fn trim_required(field: &mut Option<String>, name: &'static str) -> Result<(), PatchError> {
    trim_field(field);

    match field {
        Some(text) if text.is_empty() => Err(PatchError::BlankRequired(name)),
        _ => Ok(()),
    }
}

/// A partial update of a record.
pub trait FieldPatch {
    /// `true` when no field is set.
    fn is_empty(&self) -> bool;

    /// Trims every set string field and rejects a required field set to a blank value.
    fn normalize(&mut self) -> Result<(), PatchError>;

    /// The cells that mirror this update in the record's row.
    ///
    /// String fields are included only when non-empty, numeric fields whenever present.
    fn cells(&self) -> Vec<Cell>;
}

/// A record stored per [`Scope`] and mirrored to one row of a spreadsheet tab.
pub trait Record:
    fmt::Debug + Clone + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static
{
    type Patch: FieldPatch + fmt::Debug + Serialize + Send + Sync;

    /// The name of the collection holding this kind.
    const COLLECTION: &'static str;
    const KIND: RecordKind;

    fn id(&self) -> RecordId;

    fn in_scope(&self, scope: &Scope) -> bool;

    fn row_index(&self) -> RowIndex;

    /// Applies the set fields of the patch, leaving every other field untouched.
    fn apply_patch(&mut self, patch: &Self::Patch);
}
