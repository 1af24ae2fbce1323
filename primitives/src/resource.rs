//! The consolidated `AllResources` tab, where every row describes one
//! resource to create on the advertising platform.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::{
    campaign_def::{CampaignStatus, CampaignUpsert},
    sheet::RowIndex,
    util::cell::{parse_number, RawRow},
};

/// Columns of the `AllResources` tab.
pub mod columns {
    use crate::sheet::Column;

    pub const RESOURCE_TYPE: Column = Column::new(0);
    pub const ID: Column = Column::new(1);
    pub const PARENT_ID: Column = Column::new(2);
    pub const NAME: Column = Column::new(3);
    pub const BUDGET: Column = Column::new(4);
    pub const STATUS: Column = Column::new(5);
    pub const START_DATE: Column = Column::new(6);
    pub const END_DATE: Column = Column::new(7);
    pub const HEADLINE_1: Column = Column::new(8);
    pub const HEADLINE_2: Column = Column::new(9);
    pub const DESCRIPTION: Column = Column::new(10);
    pub const FINAL_URL: Column = Column::new(11);
    pub const KEYWORD_TEXT: Column = Column::new(12);
    pub const MATCH_TYPE: Column = Column::new(13);
    pub const ACTION: Column = Column::new(14);
    /// Written back by the dispatch pass, never read.
    pub const ROW_STATUS: Column = Column::new(15);
}

/// The discriminator of a consolidated row.
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
#[serde(rename_all = "camelCase")]
#[display(style = "camelCase")]
pub enum ResourceKind {
    Campaign,
    AdGroup,
    Ad,
    Keyword,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [Self::Campaign, Self::AdGroup, Self::Ad, Self::Keyword];

    /// The batch mutate endpoint of the kind, relative to the customer.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Campaign => "campaigns:mutate",
            Self::AdGroup => "adGroups:mutate",
            Self::Ad => "adGroupAds:mutate",
            Self::Keyword => "adGroupCriteria:mutate",
        }
    }
}

/// A flat field map submitted as one `create` operation.
pub type Operation = serde_json::Map<String, Value>;

/// The outcome of a consolidated row, written to column `P`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    parse_display::Display,
    parse_display::FromStr,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum RowStatus {
    #[display("No action")]
    NoAction,
    #[display("Pending")]
    Pending,
    #[display("Error: {0}")]
    Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("Unknown resource type `{0}`")]
    UnknownResourceType(String),
    #[error("Missing campaign id")]
    MissingCampaignId,
}

/// One row of the `AllResources` tab with every cell trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRow {
    pub row_index: RowIndex,
    pub resource_type: String,
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub budget: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub headline1: String,
    pub headline2: String,
    pub description: String,
    pub final_url: String,
    pub keyword_text: String,
    pub match_type: String,
    pub action: String,
}

impl ResourceRow {
    /// Reads the `offset`-th row (0-based) of a block read from row `2`.
    pub fn from_cells(offset: usize, cells: &[String]) -> Self {
        let row = RawRow(cells);
        let text = |column| row.text(column).to_owned();

        Self {
            row_index: RowIndex::from_offset(offset),
            resource_type: text(columns::RESOURCE_TYPE),
            id: text(columns::ID),
            parent_id: text(columns::PARENT_ID),
            name: text(columns::NAME),
            budget: text(columns::BUDGET),
            status: text(columns::STATUS),
            start_date: text(columns::START_DATE),
            end_date: text(columns::END_DATE),
            headline1: text(columns::HEADLINE_1),
            headline2: text(columns::HEADLINE_2),
            description: text(columns::DESCRIPTION),
            final_url: text(columns::FINAL_URL),
            keyword_text: text(columns::KEYWORD_TEXT),
            match_type: text(columns::MATCH_TYPE),
            action: text(columns::ACTION),
        }
    }

    /// A row is dispatched only when its `action` cell holds something.
    pub fn is_actionable(&self) -> bool {
        !self.action.is_empty()
    }

    pub fn kind(&self) -> Result<ResourceKind, RowError> {
        self.resource_type
            .parse()
            .map_err(|_| RowError::UnknownResourceType(self.resource_type.clone()))
    }

    /// The `create` operation of the row. Empty cells are left out.
    pub fn operation(&self, kind: ResourceKind) -> Operation {
        let fields: Vec<(&str, &str)> = match kind {
            ResourceKind::Campaign => vec![
                ("id", self.id.as_str()),
                ("name", self.name.as_str()),
                ("budget", self.budget.as_str()),
                ("status", self.status.as_str()),
                ("startDate", self.start_date.as_str()),
                ("endDate", self.end_date.as_str()),
                ("action", self.action.as_str()),
            ],
            ResourceKind::AdGroup => vec![
                ("id", self.id.as_str()),
                ("parentId", self.parent_id.as_str()),
                ("name", self.name.as_str()),
                ("status", self.status.as_str()),
                ("action", self.action.as_str()),
            ],
            ResourceKind::Ad => vec![
                ("parentId", self.parent_id.as_str()),
                ("headline1", self.headline1.as_str()),
                ("headline2", self.headline2.as_str()),
                ("description", self.description.as_str()),
                ("finalUrl", self.final_url.as_str()),
                ("action", self.action.as_str()),
            ],
            ResourceKind::Keyword => vec![
                ("parentId", self.parent_id.as_str()),
                ("keywordText", self.keyword_text.as_str()),
                ("matchType", self.match_type.as_str()),
                ("action", self.action.as_str()),
            ],
        };

        fields
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect()
    }

    /// The campaign fields upserted into the store for a `campaign` row, keyed by its id.
    pub fn campaign_upsert(&self) -> Result<CampaignUpsert, RowError> {
        if self.id.is_empty() {
            return Err(RowError::MissingCampaignId);
        }

        Ok(CampaignUpsert {
            campaign_id: self.id.clone(),
            name: self.name.clone(),
            status: CampaignStatus::normalize(&self.status),
            budget: parse_number(&self.budget),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        })
    }
}

impl From<RowError> for RowStatus {
    fn from(error: RowError) -> Self {
        Self::Error(error.to_string())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn row_status_display_and_serde() {
        assert_eq!("No action", RowStatus::NoAction.to_string());
        assert_eq!("Pending", RowStatus::Pending.to_string());
        assert_eq!(
            "Error: boom",
            RowStatus::Error("boom".into()).to_string()
        );

        assert_eq!(
            json!(["No action", "Pending", "Error: Missing campaign id"]),
            serde_json::to_value(vec![
                RowStatus::NoAction,
                RowStatus::Pending,
                RowError::MissingCampaignId.into(),
            ])
            .expect("Should serialize")
        );

        let parsed: RowStatus =
            serde_json::from_value(json!("Error: quota exceeded")).expect("Should deserialize");
        assert_eq!(RowStatus::Error("quota exceeded".into()), parsed);
    }

    #[test]
    fn resource_kind_discriminators_and_endpoints() {
        assert_eq!(ResourceKind::AdGroup, "adGroup".parse::<ResourceKind>().expect("adGroup"));
        assert_eq!("adGroup", ResourceKind::AdGroup.to_string());
        assert!("Campaign".parse::<ResourceKind>().is_err());

        let endpoints: Vec<_> = ResourceKind::ALL.iter().map(|kind| kind.endpoint()).collect();
        assert_eq!(
            vec![
                "campaigns:mutate",
                "adGroups:mutate",
                "adGroupAds:mutate",
                "adGroupCriteria:mutate"
            ],
            endpoints
        );
    }

    #[test]
    fn reads_a_consolidated_row() {
        let row = ResourceRow::from_cells(
            3,
            &cells(&[
                "campaign", "C-1", "", " Summer ", "250", "paused", "2024-06-01", "2024-08-31",
                "", "", "", "", "", "", "create",
            ]),
        );

        assert_eq!(RowIndex::new(5), row.row_index);
        assert_eq!(Ok(ResourceKind::Campaign), row.kind());
        assert!(row.is_actionable());
        assert_eq!(
            json!({
                "id": "C-1",
                "name": "Summer",
                "budget": "250",
                "status": "paused",
                "startDate": "2024-06-01",
                "endDate": "2024-08-31",
                "action": "create",
            }),
            Value::Object(row.operation(ResourceKind::Campaign))
        );

        let upsert = row.campaign_upsert().expect("Should have a campaign id");
        assert_eq!(CampaignStatus::Paused, upsert.status);
        assert_eq!(Some(250.0), upsert.budget);
    }

    #[test]
    fn short_rows_are_not_actionable() {
        let row = ResourceRow::from_cells(0, &cells(&["keyword", "", "G-1", "", "", "", "", "", "", "", "", "", "shoes"]));

        assert!(!row.is_actionable());
        assert_eq!(
            json!({ "parentId": "G-1", "keywordText": "shoes" }),
            Value::Object(row.operation(ResourceKind::Keyword))
        );
    }

    #[test]
    fn unknown_discriminator_and_missing_campaign_id() {
        let row = ResourceRow::from_cells(0, &cells(&["banner", "", "", "", "", "", "", "", "", "", "", "", "", "", "create"]));
        assert_eq!(
            Err(RowError::UnknownResourceType("banner".into())),
            row.kind()
        );

        let row = ResourceRow::from_cells(0, &cells(&["campaign"]));
        assert_eq!(Err(RowError::MissingCampaignId), row.campaign_upsert());
    }
}
