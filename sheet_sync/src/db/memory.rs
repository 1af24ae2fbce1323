//! In-memory [`Store`] & [`SheetRegistry`] for tests, with failure injection.
use std::{
    fmt,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use dashmap::DashMap;
use primitives::{
    CampaignDef, CampaignUpsert, Record, RecordId, Scope, SheetEntry, TenantId, UserId,
};

use super::{CampaignStore, Error, InsertOutcome, SheetRegistry, Store};

/// A [`Store`] call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    Find,
    FindOne,
    FindOneAndUpdate,
    DeleteMany,
    DeleteOne,
    InsertMany,
    Upsert,
}

type Rejection<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Clones share the same records.
pub struct MemoryStore<R> {
    records: Arc<RwLock<Vec<R>>>,
    failures: Arc<DashMap<StoreCall, String>>,
    rejection: Arc<RwLock<Option<Rejection<R>>>>,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            failures: self.failures.clone(),
            rejection: self.rejection.clone(),
        }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            records: Default::default(),
            failures: Default::default(),
            rejection: Default::default(),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for MemoryStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.records)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record regardless of scope.
    pub fn all(&self) -> Vec<R> {
        self.read().map(|records| records.clone()).unwrap_or_default()
    }

    /// Makes every following `call` fail with `message`.
    pub fn fail(&self, call: StoreCall, message: &str) {
        self.failures.insert(call, message.to_owned());
    }

    /// Rejects the inserts of every record matching `rejected`, like a unique index would.
    pub fn reject_inserts<F>(&self, rejected: F)
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        if let Ok(mut rejection) = self.rejection.write() {
            *rejection = Some(Arc::new(rejected));
        }
    }

    fn check(&self, call: StoreCall) -> Result<(), Error> {
        match self.failures.get(&call) {
            Some(message) => Err(Error::Memory(message.value().clone())),
            None => Ok(()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<R>>, Error> {
        self.records
            .read()
            .map_err(|_| Error::Memory("Error occurred when trying to acquire lock for: reading".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<R>>, Error> {
        self.records
            .write()
            .map_err(|_| Error::Memory("Error occurred when trying to acquire lock for: writing".into()))
    }
}

#[async_trait]
impl<R: Record> Store<R> for MemoryStore<R> {
    async fn find(&self, scope: &Scope) -> Result<Vec<R>, Error> {
        self.check(StoreCall::Find)?;

        let mut found: Vec<R> = self
            .read()?
            .iter()
            .filter(|record| record.in_scope(scope))
            .cloned()
            .collect();
        found.sort_by_key(|record| record.row_index());

        Ok(found)
    }

    async fn find_one(&self, scope: &Scope, id: RecordId) -> Result<Option<R>, Error> {
        self.check(StoreCall::FindOne)?;

        Ok(self
            .read()?
            .iter()
            .find(|record| record.id() == id && record.in_scope(scope))
            .cloned())
    }

    async fn find_one_and_update(
        &self,
        scope: &Scope,
        id: RecordId,
        patch: &R::Patch,
    ) -> Result<Option<R>, Error> {
        self.check(StoreCall::FindOneAndUpdate)?;

        let mut records = self.write()?;
        let updated = records
            .iter_mut()
            .find(|record| record.id() == id && record.in_scope(scope))
            .map(|record| {
                record.apply_patch(patch);
                record.clone()
            });

        Ok(updated)
    }

    async fn delete_many(&self, scope: &Scope) -> Result<u64, Error> {
        self.check(StoreCall::DeleteMany)?;

        let mut records = self.write()?;
        let before = records.len();
        records.retain(|record| !record.in_scope(scope));

        Ok((before - records.len()) as u64)
    }

    async fn delete_one(&self, scope: &Scope, id: RecordId) -> Result<bool, Error> {
        self.check(StoreCall::DeleteOne)?;

        let mut records = self.write()?;
        match records
            .iter()
            .position(|record| record.id() == id && record.in_scope(scope))
        {
            Some(position) => {
                records.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_many(&self, new_records: Vec<R>) -> Result<InsertOutcome, Error> {
        self.check(StoreCall::InsertMany)?;

        let rejection = self
            .rejection
            .read()
            .map_err(|_| Error::Memory("Poisoned rejection lock".into()))?
            .clone();

        let mut records = self.write()?;
        let mut outcome = InsertOutcome::default();

        for (index, record) in new_records.into_iter().enumerate() {
            let duplicate_id = records.iter().any(|stored| stored.id() == record.id());
            let rejected = matches!(&rejection, Some(rejected) if rejected(&record));

            if duplicate_id || rejected {
                outcome
                    .failures
                    .push(format!("#{}: duplicate key {}", index, record.id()));
            } else {
                records.push(record);
                outcome.inserted += 1;
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl CampaignStore for MemoryStore<CampaignDef> {
    async fn upsert_by_campaign_id(
        &self,
        scope: &Scope,
        upsert: &CampaignUpsert,
    ) -> Result<CampaignDef, Error> {
        self.check(StoreCall::Upsert)?;

        let mut records = self.write()?;
        let existing = records.iter_mut().find(|campaign| {
            campaign.in_scope(scope)
                && campaign.campaign_id.as_deref() == Some(upsert.campaign_id.as_str())
        });

        match existing {
            Some(campaign) => {
                upsert.apply(campaign);
                Ok(campaign.clone())
            }
            None => {
                let campaign = upsert.clone().into_record(scope);
                records.push(campaign.clone());
                Ok(campaign)
            }
        }
    }
}

/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    entries: Arc<RwLock<Vec<SheetEntry>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<SheetEntry>>, Error> {
        self.entries
            .read()
            .map_err(|_| Error::Memory("Error occurred when trying to acquire lock for: reading".into()))
    }
}

#[async_trait]
impl SheetRegistry for MemoryRegistry {
    async fn insert(&self, entry: SheetEntry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::Memory("Error occurred when trying to acquire lock for: writing".into()))?;

        let taken = entries.iter().any(|existing| {
            existing.owned_by(&entry.tenant_id, &entry.user_id) && existing.name == entry.name
        });
        if taken {
            return Err(Error::Duplicate(entry.name));
        }

        entries.push(entry);
        Ok(())
    }

    async fn find_by_name(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<SheetEntry>, Error> {
        Ok(self
            .read()?
            .iter()
            .find(|entry| entry.owned_by(tenant_id, user_id) && entry.name == name)
            .cloned())
    }

    async fn list(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<Vec<SheetEntry>, Error> {
        Ok(self
            .read()?
            .iter()
            .filter(|entry| entry.owned_by(tenant_id, user_id))
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        id: RecordId,
    ) -> Result<Option<SheetEntry>, Error> {
        Ok(self
            .read()?
            .iter()
            .find(|entry| entry.id == id && entry.owned_by(tenant_id, user_id))
            .cloned())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use primitives::{
        test_util::{DUMMY_SCOPE, OTHER_TENANT_SCOPE},
        CampaignStatus,
    };

    use super::*;

    fn upsert(campaign_id: &str, name: &str) -> CampaignUpsert {
        CampaignUpsert {
            campaign_id: campaign_id.into(),
            name: name.into(),
            status: CampaignStatus::Enabled,
            budget: None,
            start_date: "2024-06-01".into(),
            end_date: "2024-08-31".into(),
        }
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_scope_and_campaign_id() {
        let store = MemoryStore::<CampaignDef>::new();

        let inserted = store
            .upsert_by_campaign_id(&DUMMY_SCOPE, &upsert("C-1", "Summer"))
            .await
            .expect("Should insert");
        let updated = store
            .upsert_by_campaign_id(&DUMMY_SCOPE, &upsert("C-1", "Summer sale"))
            .await
            .expect("Should update");
        let other_tenant = store
            .upsert_by_campaign_id(&OTHER_TENANT_SCOPE, &upsert("C-1", "Theirs"))
            .await
            .expect("Should insert for the other tenant");

        assert_eq!(inserted.id, updated.id);
        assert_eq!("Summer sale", updated.name);
        assert_ne!(inserted.id, other_tenant.id);
        assert_eq!(2, store.all().len());
        assert_eq!(None, inserted.row_index.addressable());
    }

    #[tokio::test]
    async fn registry_names_are_unique_per_tenant_and_user() {
        let registry = MemoryRegistry::new();
        let entry = |tenant: &str| SheetEntry {
            id: RecordId::new(),
            tenant_id: tenant.into(),
            user_id: "user-1".into(),
            sheet_id: "sheet".into(),
            name: "Q3".into(),
            sheet_url: "https://docs.google.com/spreadsheets/d/sheet".into(),
            created_at: chrono::Utc::now(),
        };

        registry.insert(entry("tenant-1")).await.expect("Should insert");
        registry
            .insert(entry("tenant-2"))
            .await
            .expect("Same name under another tenant");

        let duplicate = registry.insert(entry("tenant-1")).await;
        assert!(matches!(duplicate, Err(Error::Duplicate(name)) if name == "Q3"));
    }
}
