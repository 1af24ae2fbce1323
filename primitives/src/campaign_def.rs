use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    record::{trim_required, FieldPatch, PatchError, Record, RecordId, RecordKind},
    scope::{Scope, SheetId, TenantId, UserId},
    sheet::{Cell, Column, RowIndex},
};

/// Columns of the `Kampagner` tab.
pub mod columns {
    use crate::sheet::Column;

    pub const NAME: Column = Column::new(0);
    pub const STATUS: Column = Column::new(1);
    pub const BUDGET: Column = Column::new(2);
    pub const START_DATE: Column = Column::new(3);
    pub const END_DATE: Column = Column::new(4);

    pub const LAST: Column = END_DATE;
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
pub enum CampaignStatus {
    Enabled,
    Paused,
}

impl CampaignStatus {
    /// `PAUSED` (in any casing) is paused, anything else is enabled.
    pub fn normalize(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("PAUSED") {
            Self::Paused
        } else {
            Self::Enabled
        }
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Enabled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDef {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sheet_id: SheetId,
    /// The natural key used by the platform dispatch upsert.
    /// A full sync sets it to the row index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub start_date: String,
    pub end_date: String,
    pub row_index: RowIndex,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Record for CampaignDef {
    type Patch = CampaignPatch;

    const COLLECTION: &'static str = "campaignDefs";
    const KIND: RecordKind = RecordKind::Campaign;

    fn id(&self) -> RecordId {
        self.id
    }

    fn in_scope(&self, scope: &Scope) -> bool {
        scope.matches(&self.tenant_id, &self.user_id, &self.sheet_id)
    }

    fn row_index(&self) -> RowIndex {
        self.row_index
    }

    fn apply_patch(&mut self, patch: &CampaignPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(budget) = patch.budget {
            self.budget = Some(budget);
        }
        if let Some(start_date) = &patch.start_date {
            self.start_date = start_date.clone();
        }
        if let Some(end_date) = &patch.end_date {
            self.end_date = end_date.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl FieldPatch for CampaignPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.budget.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    fn normalize(&mut self) -> Result<(), PatchError> {
        trim_required(&mut self.name, "name")?;
        trim_required(&mut self.start_date, "startDate")?;
        trim_required(&mut self.end_date, "endDate")
    }

    fn cells(&self) -> Vec<Cell> {
        let texts = [
            (columns::NAME, self.name.as_deref()),
            (columns::START_DATE, self.start_date.as_deref()),
            (columns::END_DATE, self.end_date.as_deref()),
        ];

        let mut cells: Vec<Cell> = texts
            .into_iter()
            .filter_map(|(column, text)| non_empty_cell(column, text))
            .collect();

        if let Some(status) = self.status {
            cells.push(Cell::new(columns::STATUS, status.to_string()));
        }
        if let Some(budget) = self.budget {
            cells.push(Cell::new(columns::BUDGET, budget));
        }

        cells.sort_by_key(|cell| cell.column);
        cells
    }
}

pub(crate) fn non_empty_cell(column: Column, text: Option<&str>) -> Option<Cell> {
    text.filter(|text| !text.trim().is_empty())
        .map(|text| Cell::new(column, Value::String(text.to_owned())))
}

/// The fields a platform dispatch row writes into a campaign, keyed by `campaign_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpsert {
    pub campaign_id: String,
    pub name: String,
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub start_date: String,
    pub end_date: String,
}

impl CampaignUpsert {
    /// A new record for an upsert that matched nothing.
    /// It has no known row in the `Kampagner` tab.
    pub fn into_record(self, scope: &Scope) -> CampaignDef {
        CampaignDef {
            id: RecordId::new(),
            tenant_id: scope.tenant_id.clone(),
            user_id: scope.user_id.clone(),
            sheet_id: scope.sheet_id.clone(),
            campaign_id: Some(self.campaign_id),
            name: self.name,
            status: self.status,
            budget: self.budget,
            start_date: self.start_date,
            end_date: self.end_date,
            row_index: RowIndex::UNADDRESSED,
            created_at: Utc::now(),
        }
    }

    /// Overwrites the upserted fields of an existing record.
    pub fn apply(&self, campaign: &mut CampaignDef) {
        campaign.name = self.name.clone();
        campaign.status = self.status;
        if self.budget.is_some() {
            campaign.budget = self.budget;
        }
        campaign.start_date = self.start_date.clone();
        campaign.end_date = self.end_date.clone();
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn normalizes_campaign_status() {
        assert_eq!(CampaignStatus::Paused, CampaignStatus::normalize("PAUSED"));
        assert_eq!(CampaignStatus::Paused, CampaignStatus::normalize(" paused "));
        assert_eq!(CampaignStatus::Enabled, CampaignStatus::normalize("ENABLED"));
        assert_eq!(CampaignStatus::Enabled, CampaignStatus::normalize("stopped"));
        assert_eq!(CampaignStatus::Enabled, CampaignStatus::normalize(""));

        assert_eq!("PAUSED", CampaignStatus::Paused.to_string());
        assert_eq!(json!("ENABLED"), serde_json::to_value(CampaignStatus::Enabled).unwrap());
    }

    #[test]
    fn patch_cells_skip_empty_strings_but_keep_zero_budget() {
        let patch = CampaignPatch {
            name: Some("".into()),
            budget: Some(0.0),
            end_date: Some("2024-12-31".into()),
            ..Default::default()
        };

        assert_eq!(
            vec![
                Cell::new(columns::BUDGET, 0.0),
                Cell::new(columns::END_DATE, "2024-12-31"),
            ],
            patch.cells()
        );
        assert!(!patch.is_empty());
        assert!(CampaignPatch::default().is_empty());
    }

    #[test]
    fn patch_deserializes_partial_body() {
        let patch: CampaignPatch =
            serde_json::from_value(json!({ "status": "PAUSED", "budget": 150 })).unwrap();

        assert_eq!(
            CampaignPatch {
                status: Some(CampaignStatus::Paused),
                budget: Some(150.0),
                ..Default::default()
            },
            patch
        );
        assert_eq!(
            json!({ "status": "PAUSED", "budget": 150.0 }),
            serde_json::to_value(&patch).unwrap()
        );
    }
}
