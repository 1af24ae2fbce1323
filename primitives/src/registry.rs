use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    record::RecordId,
    scope::{SheetId, TenantId, UserId},
};

/// A spreadsheet document provisioned for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetEntry {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sheet_id: SheetId,
    /// Unique per tenant and user.
    pub name: String,
    pub sheet_url: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl SheetEntry {
    pub const COLLECTION: &'static str = "sheets";

    pub fn owned_by(&self, tenant_id: &TenantId, user_id: &UserId) -> bool {
        &self.tenant_id == tenant_id && &self.user_id == user_id
    }
}
