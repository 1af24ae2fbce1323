use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    campaign_def::non_empty_cell,
    record::{trim_required, FieldPatch, PatchError, Record, RecordId, RecordKind},
    scope::{Scope, SheetId, TenantId, UserId},
    sheet::{Cell, RowIndex},
};

/// Columns of the `Keywords` tab.
pub mod columns {
    use crate::sheet::Column;

    pub const AD_GROUP: Column = Column::new(0);
    pub const KEYWORD: Column = Column::new(1);
    pub const MATCH_TYPE: Column = Column::new(2);
    pub const CPC: Column = Column::new(3);

    pub const LAST: Column = CPC;
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    parse_display::Display,
    parse_display::FromStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[display(style = "SNAKE_CASE")]
pub enum MatchType {
    Broad,
    Phrase,
    Exact,
}

impl MatchType {
    /// Case-insensitive match, defaulting to [`MatchType::Broad`] for anything unrecognized.
    pub fn normalize(raw: &str) -> Self {
        raw.trim()
            .to_ascii_uppercase()
            .parse()
            .unwrap_or_default()
    }
}

impl Default for MatchType {
    fn default() -> Self {
        Self::Broad
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDef {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sheet_id: SheetId,
    pub ad_group: String,
    pub keyword: String,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    pub row_index: RowIndex,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Record for KeywordDef {
    type Patch = KeywordPatch;

    const COLLECTION: &'static str = "keywordDefs";
    const KIND: RecordKind = RecordKind::Keyword;

    fn id(&self) -> RecordId {
        self.id
    }

    fn in_scope(&self, scope: &Scope) -> bool {
        scope.matches(&self.tenant_id, &self.user_id, &self.sheet_id)
    }

    fn row_index(&self) -> RowIndex {
        self.row_index
    }

    fn apply_patch(&mut self, patch: &KeywordPatch) {
        if let Some(ad_group) = &patch.ad_group {
            self.ad_group = ad_group.clone();
        }
        if let Some(keyword) = &patch.keyword {
            self.keyword = keyword.clone();
        }
        if let Some(match_type) = patch.match_type {
            self.match_type = match_type;
        }
        if patch.cpc.is_some() {
            self.cpc = patch.cpc;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
}

impl FieldPatch for KeywordPatch {
    fn is_empty(&self) -> bool {
        self.ad_group.is_none()
            && self.keyword.is_none()
            && self.match_type.is_none()
            && self.cpc.is_none()
    }

    fn normalize(&mut self) -> Result<(), PatchError> {
        trim_required(&mut self.ad_group, "adGroup")?;
        trim_required(&mut self.keyword, "keyword")
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = [
            (columns::AD_GROUP, self.ad_group.as_deref()),
            (columns::KEYWORD, self.keyword.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, text)| non_empty_cell(column, text))
        .collect();

        if let Some(match_type) = self.match_type {
            cells.push(Cell::new(columns::MATCH_TYPE, match_type.to_string()));
        }
        if let Some(cpc) = self.cpc {
            cells.push(Cell::new(columns::CPC, cpc));
        }

        cells
    }
}
