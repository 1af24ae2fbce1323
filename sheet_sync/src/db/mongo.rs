use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson, to_document, DateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{
        FindOneAndUpdateOptions, FindOptions, IndexOptions, InsertManyOptions, ReturnDocument,
    },
    Collection, Database, IndexModel,
};
use primitives::{
    CampaignDef, CampaignUpsert, Record, RecordId, RowIndex, Scope, SheetEntry, TenantId, UserId,
};

use super::{CampaignStore, Error, InsertOutcome, SheetRegistry, Store};

/// The server code of a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

fn scope_filter(scope: &Scope) -> Document {
    doc! {
        "tenantId": scope.tenant_id.as_str(),
        "userId": scope.user_id.as_str(),
        "sheetId": scope.sheet_id.as_str(),
    }
}

fn record_filter(scope: &Scope, id: RecordId) -> Document {
    let mut filter = scope_filter(scope);
    filter.insert("_id", id.as_object_id());
    filter
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

/// A [`Store`] over the collection named [`Record::COLLECTION`].
#[derive(Debug, Clone)]
pub struct MongoStore<R> {
    collection: Collection<R>,
}

impl<R: Record> MongoStore<R> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(R::COLLECTION),
        }
    }

    /// Indexes the scope, since every query is filtered by it.
    pub async fn create_indexes(&self) -> Result<(), Error> {
        let index = IndexModel::builder()
            .keys(doc! { "tenantId": 1, "userId": 1, "sheetId": 1, "rowIndex": 1 })
            .build();

        self.collection.create_index(index, None).await?;

        Ok(())
    }
}

#[async_trait]
impl<R: Record> Store<R> for MongoStore<R> {
    async fn find(&self, scope: &Scope) -> Result<Vec<R>, Error> {
        let options = FindOptions::builder().sort(doc! { "rowIndex": 1 }).build();
        let cursor = self.collection.find(scope_filter(scope), options).await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, scope: &Scope, id: RecordId) -> Result<Option<R>, Error> {
        Ok(self
            .collection
            .find_one(record_filter(scope, id), None)
            .await?)
    }

    async fn find_one_and_update(
        &self,
        scope: &Scope,
        id: RecordId,
        patch: &R::Patch,
    ) -> Result<Option<R>, Error> {
        let update = doc! { "$set": to_document(patch)? };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(record_filter(scope, id), update, options)
            .await?)
    }

    async fn delete_many(&self, scope: &Scope) -> Result<u64, Error> {
        let result = self
            .collection
            .delete_many(scope_filter(scope), None)
            .await?;

        Ok(result.deleted_count)
    }

    async fn delete_one(&self, scope: &Scope, id: RecordId) -> Result<bool, Error> {
        let result = self
            .collection
            .delete_one(record_filter(scope, id), None)
            .await?;

        Ok(result.deleted_count == 1)
    }

    async fn insert_many(&self, records: Vec<R>) -> Result<InsertOutcome, Error> {
        // the driver refuses an empty batch
        if records.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let total = records.len();
        let options = InsertManyOptions::builder().ordered(false).build();

        match self.collection.insert_many(records, options).await {
            Ok(result) => Ok(InsertOutcome {
                inserted: result.inserted_ids.len(),
                failures: vec![],
            }),
            Err(error) => match error.kind.as_ref() {
                ErrorKind::BulkWrite(failure) => {
                    let failures: Vec<String> = failure
                        .write_errors
                        .iter()
                        .flatten()
                        .map(|write_error| {
                            format!("#{}: {}", write_error.index, write_error.message)
                        })
                        .collect();

                    Ok(InsertOutcome {
                        inserted: total.saturating_sub(failures.len()),
                        failures,
                    })
                }
                _ => Err(error.into()),
            },
        }
    }
}

#[async_trait]
impl CampaignStore for MongoStore<CampaignDef> {
    async fn upsert_by_campaign_id(
        &self,
        scope: &Scope,
        upsert: &CampaignUpsert,
    ) -> Result<CampaignDef, Error> {
        let mut filter = scope_filter(scope);
        filter.insert("campaignId", upsert.campaign_id.as_str());

        let mut set = doc! {
            "name": upsert.name.as_str(),
            "status": to_bson(&upsert.status)?,
            "startDate": upsert.start_date.as_str(),
            "endDate": upsert.end_date.as_str(),
        };
        if let Some(budget) = upsert.budget {
            set.insert("budget", budget);
        }

        // the equality fields of the filter are part of an inserted document
        let update = doc! {
            "$set": set,
            "$setOnInsert": {
                "_id": ObjectId::new(),
                "rowIndex": RowIndex::UNADDRESSED.get(),
                "createdAt": DateTime::from_chrono(Utc::now()),
            },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(filter, update, options)
            .await?
            .ok_or_else(|| Error::NotReturned(format!("campaign {}", upsert.campaign_id)))
    }
}

#[derive(Debug, Clone)]
pub struct MongoRegistry {
    collection: Collection<SheetEntry>,
}

impl MongoRegistry {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(SheetEntry::COLLECTION),
        }
    }

    /// A sheet name is unique per tenant & user.
    pub async fn create_indexes(&self) -> Result<(), Error> {
        let index = IndexModel::builder()
            .keys(doc! { "tenantId": 1, "userId": 1, "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index, None).await?;

        Ok(())
    }
}

fn owner_filter(tenant_id: &TenantId, user_id: &UserId) -> Document {
    doc! {
        "tenantId": tenant_id.as_str(),
        "userId": user_id.as_str(),
    }
}

#[async_trait]
impl SheetRegistry for MongoRegistry {
    async fn insert(&self, entry: SheetEntry) -> Result<(), Error> {
        match self.collection.insert_one(&entry, None).await {
            Ok(_) => Ok(()),
            Err(error) if is_duplicate_key(&error) => Err(Error::Duplicate(entry.name)),
            Err(error) => Err(error.into()),
        }
    }

    async fn find_by_name(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        name: &str,
    ) -> Result<Option<SheetEntry>, Error> {
        let mut filter = owner_filter(tenant_id, user_id);
        filter.insert("name", name);

        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn list(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<Vec<SheetEntry>, Error> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = self
            .collection
            .find(owner_filter(tenant_id, user_id), options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        id: RecordId,
    ) -> Result<Option<SheetEntry>, Error> {
        let mut filter = owner_filter(tenant_id, user_id);
        filter.insert("_id", id.as_object_id());

        Ok(self.collection.find_one(filter, None).await?)
    }
}
