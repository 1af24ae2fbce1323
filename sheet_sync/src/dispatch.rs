//! The platform dispatch pass over the consolidated `AllResources` tab.
use std::sync::Arc;

use adapter::{AdsPlatform, Spreadsheets};
use futures::join;
use primitives::{
    resource::columns, A1Range, Operation, ResourceKind, ResourceRow, RowIndex, RowStatus, Scope,
    ValueRange,
};
use slog::{info, warn, Logger};

use crate::{db::CampaignStore, Error};

pub const RESOURCES_TAB: &str = "AllResources";

pub const RESOURCES_HEADERS: &[&str] = &[
    "Resource Type",
    "ID",
    "Parent ID",
    "Name",
    "Budget",
    "Status",
    "Start Date",
    "End Date",
    "Headline 1",
    "Headline 2",
    "Description",
    "Final URL",
    "Keyword Text",
    "Match Type",
    "Action",
    "Row Status",
];

/// One `create` batch per [`ResourceKind`].
#[derive(Debug, Default)]
struct Batches {
    campaigns: Vec<Operation>,
    ad_groups: Vec<Operation>,
    ads: Vec<Operation>,
    keywords: Vec<Operation>,
}

impl Batches {
    fn push(&mut self, kind: ResourceKind, operation: Operation) {
        let batch = match kind {
            ResourceKind::Campaign => &mut self.campaigns,
            ResourceKind::AdGroup => &mut self.ad_groups,
            ResourceKind::Ad => &mut self.ads,
            ResourceKind::Keyword => &mut self.keywords,
        };

        batch.push(operation);
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    sheets: Arc<dyn Spreadsheets>,
    ads: Arc<dyn AdsPlatform>,
    campaigns: Arc<dyn CampaignStore>,
    /// The last row of the tab read by a pass.
    last_row: u32,
    logger: Logger,
}

impl Dispatcher {
    pub fn new(
        sheets: Arc<dyn Spreadsheets>,
        ads: Arc<dyn AdsPlatform>,
        campaigns: Arc<dyn CampaignStore>,
        last_row: u32,
        logger: Logger,
    ) -> Self {
        Self {
            sheets,
            ads,
            campaigns,
            last_row,
            logger: logger.new(slog::o!("tab" => RESOURCES_TAB)),
        }
    }

    /// `AllResources!A2:P<last row>`
    pub fn range(&self) -> A1Range {
        A1Range::block(
            RESOURCES_TAB,
            columns::RESOURCE_TYPE,
            columns::ROW_STATUS,
            RowIndex::FIRST_DATA_ROW,
            self.last_row,
        )
    }

    /// Queues every actionable row into the batch of its kind, submits the four batches
    /// concurrently and writes the status of every row to column `P`.
    ///
    /// A `Pending` row was accepted for dispatch, it is not a confirmed platform outcome.
    pub async fn dispatch(&self, scope: &Scope) -> Result<Vec<RowStatus>, Error> {
        let rows = self
            .sheets
            .read_range(&scope.sheet_id, &self.range())
            .await
            .map_err(Error::RemoteRead)?;

        if rows.is_empty() {
            return Ok(vec![]);
        }

        let mut batches = Batches::default();
        let mut statuses = Vec::with_capacity(rows.len());
        for (offset, cells) in rows.iter().enumerate() {
            let row = ResourceRow::from_cells(offset, cells);
            let status = self.queue(scope, &row, &mut batches).await;

            if let RowStatus::Error(reason) = &status {
                warn!(&self.logger, "Row was not queued"; "row" => row.row_index.get(), "reason" => reason);
            }
            statuses.push(status);
        }

        self.submit(batches).await?;

        let written = A1Range::block(
            RESOURCES_TAB,
            columns::ROW_STATUS,
            columns::ROW_STATUS,
            RowIndex::FIRST_DATA_ROW,
            RowIndex::FIRST_DATA_ROW + statuses.len() as u32 - 1,
        );
        let values = ValueRange::column(&written, statuses.iter().map(ToString::to_string));
        self.sheets
            .write_ranges(&scope.sheet_id, vec![values])
            .await
            .map_err(Error::RemoteWrite)?;

        info!(&self.logger, "Dispatched to the platform"; "scope" => %scope, "rows" => statuses.len());

        Ok(statuses)
    }

    async fn queue(&self, scope: &Scope, row: &ResourceRow, batches: &mut Batches) -> RowStatus {
        if !row.is_actionable() {
            return RowStatus::NoAction;
        }

        // unknown discriminators are accepted but never batched
        let kind = match row.kind() {
            Ok(kind) => kind,
            Err(error) => {
                warn!(&self.logger, "Row was not batched"; "row" => row.row_index.get(), "reason" => %error);
                return RowStatus::Pending;
            }
        };

        if kind == ResourceKind::Campaign {
            let upsert = match row.campaign_upsert() {
                Ok(upsert) => upsert,
                Err(error) => return error.into(),
            };

            if let Err(error) = self.campaigns.upsert_by_campaign_id(scope, &upsert).await {
                return RowStatus::Error(error.to_string());
            }
        }

        batches.push(kind, row.operation(kind));
        RowStatus::Pending
    }

    /// Every batch runs to completion before the first failure is returned.
    async fn submit(&self, batches: Batches) -> Result<(), Error> {
        let platform = &self.ads;

        let (campaigns, ad_groups, ads, keywords) = join!(
            platform.create(ResourceKind::Campaign, batches.campaigns),
            platform.create(ResourceKind::AdGroup, batches.ad_groups),
            platform.create(ResourceKind::Ad, batches.ads),
            platform.create(ResourceKind::Keyword, batches.keywords),
        );

        let mut first_failure = None;
        for (kind, outcome) in [
            (ResourceKind::Campaign, campaigns),
            (ResourceKind::AdGroup, ad_groups),
            (ResourceKind::Ad, ads),
            (ResourceKind::Keyword, keywords),
        ] {
            if let Err(error) = outcome {
                warn!(&self.logger, "Batch was rejected"; "kind" => %kind, "error" => %error);
                first_failure.get_or_insert(error);
            }
        }

        match first_failure {
            Some(error) => Err(Error::Platform(error)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use adapter::dummy::{DummyAds, DummySheets, SheetsCall};
    use pretty_assertions::assert_eq;
    use primitives::{
        test_util::{discard_logger, rows, DUMMY_SCOPE, OTHER_SHEET_SCOPE},
        CampaignDef, CampaignStatus, Record,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::db::{MemoryStore, Store, StoreCall};

    struct Setup {
        dispatcher: Dispatcher,
        sheets: DummySheets,
        ads: DummyAds,
        campaigns: MemoryStore<CampaignDef>,
    }

    fn setup(resources: Vec<Vec<String>>) -> Setup {
        let sheets = DummySheets::new();
        sheets.set_tab(&DUMMY_SCOPE.sheet_id, RESOURCES_TAB, resources);
        let ads = DummyAds::new();
        let campaigns = MemoryStore::<CampaignDef>::new();

        let dispatcher = Dispatcher::new(
            Arc::new(sheets.clone()),
            Arc::new(ads.clone()),
            Arc::new(campaigns.clone()),
            1000,
            discard_logger(),
        );

        Setup {
            dispatcher,
            sheets,
            ads,
            campaigns,
        }
    }

    fn resources() -> Vec<Vec<String>> {
        rows(&[
            &["campaign", "C-1", "", "Summer", "250", "PAUSED", "2024-06-01", "2024-08-31", "", "", "", "", "", "", "create"],
            &["adGroup", "G-1", "C-1", "Shoes", "", "ENABLED", "", "", "", "", "", "", "", "", "create"],
            &["ad", "", "G-1", "", "", "", "", "", "Red shoes", "", "Buy red shoes", "https://shop.example/red", "", "", ""],
            &["keyword", "", "G-1", "", "", "", "", "", "", "", "", "", "red shoes", "EXACT", "create"],
            &["banner", "", "", "", "", "", "", "", "", "", "", "", "", "", "create"],
        ])
    }

    #[test]
    fn reads_up_to_the_configured_row() {
        let Setup { dispatcher, .. } = setup(vec![]);

        assert_eq!("AllResources!A2:P1000", dispatcher.range().to_string());
    }

    #[tokio::test]
    async fn dispatches_actionable_rows_and_writes_back_statuses() {
        let Setup {
            dispatcher,
            sheets,
            ads,
            campaigns,
        } = setup(resources());

        let statuses = dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");

        assert_eq!(
            vec![
                RowStatus::Pending,
                RowStatus::Pending,
                RowStatus::NoAction,
                RowStatus::Pending,
                RowStatus::Pending,
            ],
            statuses
        );

        assert_eq!(1, ads.batches(ResourceKind::Campaign).len());
        assert_eq!(1, ads.batches(ResourceKind::AdGroup).len());
        assert!(ads.batches(ResourceKind::Ad).is_empty(), "The empty batch is never submitted");
        assert_eq!(
            vec![vec![json!({
                "parentId": "G-1",
                "keywordText": "red shoes",
                "matchType": "EXACT",
                "action": "create",
            })]],
            ads.batches(ResourceKind::Keyword)
                .into_iter()
                .map(|batch| batch.into_iter().map(Value::Object).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        );

        let written = ValueRange {
            range: "AllResources!P2:P6".into(),
            values: vec![
                vec![json!("Pending")],
                vec![json!("Pending")],
                vec![json!("No action")],
                vec![json!("Pending")],
                vec![json!("Pending")],
            ],
        };
        assert_eq!(vec![vec![written]], sheets.writes(&DUMMY_SCOPE.sheet_id));

        let stored = campaigns.find(&DUMMY_SCOPE).await.expect("Should find");
        assert_eq!(1, stored.len());
        assert_eq!(Some("C-1".to_string()), stored[0].campaign_id);
        assert_eq!(CampaignStatus::Paused, stored[0].status);
        assert_eq!(Some(250.0), stored[0].budget);
        assert_eq!(None, stored[0].row_index().addressable());
    }

    #[tokio::test]
    async fn rows_without_action_are_never_batched() {
        let Setup { dispatcher, ads, .. } = setup(rows(&[
            &["campaign", "C-1", "", "Summer"],
            &["keyword", "", "G-1", "", "", "", "", "", "", "", "", "", "shoes", "BROAD", "   "],
        ]));

        let statuses = dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");

        assert_eq!(vec![RowStatus::NoAction, RowStatus::NoAction], statuses);
        assert!(ads.submitted().is_empty());
    }

    #[tokio::test]
    async fn campaign_rows_upsert_by_campaign_id() {
        let Setup {
            dispatcher,
            campaigns,
            ..
        } = setup(resources());

        dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");
        dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");

        assert_eq!(1, campaigns.all().len());
    }

    #[tokio::test]
    async fn failed_upserts_and_missing_campaign_ids() {
        let Setup {
            dispatcher,
            campaigns,
            ads,
            ..
        } = setup(rows(&[
            &["campaign", "C-1", "", "Summer", "", "", "", "", "", "", "", "", "", "", "create"],
            &["campaign", "", "", "Nameless", "", "", "", "", "", "", "", "", "", "", "create"],
        ]));
        campaigns.fail(StoreCall::Upsert, "connection reset");

        let statuses = dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");

        assert_eq!(
            vec![
                RowStatus::Error("In-memory store: connection reset".into()),
                RowStatus::Error("Missing campaign id".into()),
            ],
            statuses
        );
        assert!(ads.submitted().is_empty());
    }

    #[tokio::test]
    async fn empty_tab_makes_no_calls() {
        let Setup { dispatcher, sheets, ads, .. } = setup(vec![]);

        let statuses = dispatcher.dispatch(&OTHER_SHEET_SCOPE).await.expect("Should dispatch");

        assert!(statuses.is_empty());
        assert!(ads.submitted().is_empty());
        assert!(sheets.writes(&OTHER_SHEET_SCOPE.sheet_id).is_empty());
    }

    #[tokio::test]
    async fn failed_batch_fails_the_pass_before_the_write_back() {
        let Setup { dispatcher, sheets, ads, .. } = setup(resources());
        ads.fail(ResourceKind::AdGroup, "rejected");

        let error = dispatcher
            .dispatch(&DUMMY_SCOPE)
            .await
            .expect_err("Should fail");

        assert!(matches!(error, Error::Platform(_)));
        assert!(sheets.writes(&DUMMY_SCOPE.sheet_id).is_empty());
        assert_eq!(1, ads.batches(ResourceKind::Campaign).len());
        assert_eq!(
            1,
            ads.batches(ResourceKind::Keyword).len(),
            "The batches after the failed one still complete"
        );
    }

    #[tokio::test]
    async fn unknown_resource_types_are_pending_but_never_batched() {
        let Setup {
            dispatcher,
            sheets,
            ads,
            campaigns,
        } = setup(rows(&[
            &["Campaign", "C-1", "", "Summer", "", "", "", "", "", "", "", "", "", "", "create"],
            &["banner", "", "", "", "", "", "", "", "", "", "", "", "", "", "create"],
        ]));

        let statuses = dispatcher.dispatch(&DUMMY_SCOPE).await.expect("Should dispatch");

        assert_eq!(vec![RowStatus::Pending, RowStatus::Pending], statuses);
        assert!(ads.submitted().is_empty());
        assert!(campaigns.all().is_empty(), "Only `campaign` rows are upserted");
        assert_eq!(1, sheets.writes(&DUMMY_SCOPE.sheet_id).len());
    }

    #[tokio::test]
    async fn failed_write_back() {
        let Setup { dispatcher, sheets, .. } = setup(resources());
        sheets.fail(SheetsCall::WriteRanges, "quota exceeded");

        let error = dispatcher
            .dispatch(&DUMMY_SCOPE)
            .await
            .expect_err("Should fail");

        assert!(matches!(error, Error::RemoteWrite(_)));
    }
}
