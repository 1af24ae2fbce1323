use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    campaign_def::non_empty_cell,
    record::{trim_field, trim_required, FieldPatch, PatchError, Record, RecordId, RecordKind},
    scope::{Scope, SheetId, TenantId, UserId},
    sheet::{Cell, Column, RowIndex},
};

/// Columns of the `Annoncer` tab.
pub mod columns {
    use crate::sheet::Column;

    pub const AD_GROUP: Column = Column::new(0);
    pub const HEADLINE_1: Column = Column::new(1);
    pub const HEADLINE_2: Column = Column::new(2);
    pub const DESCRIPTION: Column = Column::new(3);
    pub const FINAL_URL: Column = Column::new(4);
    pub const PATH_1: Column = Column::new(5);
    pub const PATH_2: Column = Column::new(6);

    pub const LAST: Column = PATH_2;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDef {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sheet_id: SheetId,
    pub ad_group: String,
    pub headline1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline2: Option<String>,
    pub description: String,
    pub final_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path2: Option<String>,
    pub row_index: RowIndex,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Record for AdDef {
    type Patch = AdPatch;

    const COLLECTION: &'static str = "adDefs";
    const KIND: RecordKind = RecordKind::Ad;

    fn id(&self) -> RecordId {
        self.id
    }

    fn in_scope(&self, scope: &Scope) -> bool {
        scope.matches(&self.tenant_id, &self.user_id, &self.sheet_id)
    }

    fn row_index(&self) -> RowIndex {
        self.row_index
    }

    fn apply_patch(&mut self, patch: &AdPatch) {
        if let Some(ad_group) = &patch.ad_group {
            self.ad_group = ad_group.clone();
        }
        if let Some(headline1) = &patch.headline1 {
            self.headline1 = headline1.clone();
        }
        if patch.headline2.is_some() {
            self.headline2 = patch.headline2.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(final_url) = &patch.final_url {
            self.final_url = final_url.clone();
        }
        if patch.path1.is_some() {
            self.path1 = patch.path1.clone();
        }
        if patch.path2.is_some() {
            self.path2 = patch.path2.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path2: Option<String>,
}

impl AdPatch {
    fn fields(&self) -> [(Column, Option<&str>); 7] {
        [
            (columns::AD_GROUP, self.ad_group.as_deref()),
            (columns::HEADLINE_1, self.headline1.as_deref()),
            (columns::HEADLINE_2, self.headline2.as_deref()),
            (columns::DESCRIPTION, self.description.as_deref()),
            (columns::FINAL_URL, self.final_url.as_deref()),
            (columns::PATH_1, self.path1.as_deref()),
            (columns::PATH_2, self.path2.as_deref()),
        ]
    }
}

impl FieldPatch for AdPatch {
    fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    fn normalize(&mut self) -> Result<(), PatchError> {
        trim_required(&mut self.ad_group, "adGroup")?;
        trim_required(&mut self.headline1, "headline1")?;
        trim_field(&mut self.headline2);
        trim_required(&mut self.description, "description")?;
        trim_required(&mut self.final_url, "finalUrl")?;
        trim_field(&mut self.path1);
        trim_field(&mut self.path2);

        Ok(())
    }

    fn cells(&self) -> Vec<Cell> {
        self.fields()
            .into_iter()
            .filter_map(|(column, text)| non_empty_cell(column, text))
            .collect()
    }
}
