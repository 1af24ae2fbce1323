//! Persistence of the mirrored records and the sheet registry.
//!
//! Every record kind lives in its own collection and every query is filtered by
//! the [`Scope`] of the caller.
use std::fmt;

use async_trait::async_trait;
use primitives::{
    CampaignDef, CampaignUpsert, Record, RecordId, Scope, SheetEntry, TenantId, UserId,
};
use thiserror::Error;

pub use self::mongo::{MongoRegistry, MongoStore};
#[cfg(any(test, feature = "test-util"))]
pub use self::memory::{MemoryRegistry, MemoryStore, StoreCall};

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum Error {
    #[error("MongoDB: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Serializing a document: {0}")]
    Serialize(#[from] mongodb::bson::ser::Error),
    /// A unique index rejected the write.
    #[error("Duplicate key: {0}")]
    Duplicate(String),
    /// The upsert didn't return a document.
    #[error("Upserted {0} was not returned")]
    NotReturned(String),
    #[error("In-memory store: {0}")]
    Memory(String),
}

/// The result of a best-effort, unordered bulk insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    /// One message per rejected record.
    pub failures: Vec<String>,
}

/// The collection of one record kind.
#[async_trait]
pub trait Store<R: Record>: fmt::Debug + Send + Sync {
    async fn find(&self, scope: &Scope) -> Result<Vec<R>, Error>;

    async fn find_one(&self, scope: &Scope, id: RecordId) -> Result<Option<R>, Error>;

    /// Sets the fields of the patch and returns the updated record,
    /// or `None` if `(scope, id)` matches nothing.
    async fn find_one_and_update(
        &self,
        scope: &Scope,
        id: RecordId,
        patch: &R::Patch,
    ) -> Result<Option<R>, Error>;

    /// Returns the number of deleted records.
    async fn delete_many(&self, scope: &Scope) -> Result<u64, Error>;

    /// Returns `false` if `(scope, id)` matches nothing.
    async fn delete_one(&self, scope: &Scope, id: RecordId) -> Result<bool, Error>;

    /// Inserts every record it can. A rejected record doesn't stop the others.
    async fn insert_many(&self, records: Vec<R>) -> Result<InsertOutcome, Error>;
}

/// Campaigns are also addressed by their natural key, the `campaignId`.
#[async_trait]
pub trait CampaignStore: Store<CampaignDef> {
    /// Updates the campaign with `(scope, campaign_id)` or inserts a new one.
    async fn upsert_by_campaign_id(
        &self,
        scope: &Scope,
        upsert: &CampaignUpsert,
    ) -> Result<CampaignDef, Error>;
}

/// The spreadsheet documents provisioned per tenant & user.
#[async_trait]
pub trait SheetRegistry: fmt::Debug + Send + Sync {
    /// Fails with [`Error::Duplicate`] if the name is taken for the tenant & user.
    async fn insert(&self, entry: SheetEntry) -> Result<(), Error>;

    async fn find_by_name(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<SheetEntry>, Error>;

    async fn list(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<Vec<SheetEntry>, Error>;

    async fn find(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        id: RecordId,
    ) -> Result<Option<SheetEntry>, Error>;
}
