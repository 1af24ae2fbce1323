use primitives::{RowStatus, Scope};
use serde::Serialize;
use slog::info;

use crate::{Error, SheetSync};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub campaigns: usize,
    pub ads: usize,
    pub keywords: usize,
}

/// The parsed counts of every tab, with the persisted counts alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncAllReport {
    #[serde(flatten)]
    pub synced: KindCounts,
    pub persisted: KindCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAndDispatchReport {
    pub campaigns_synced: usize,
    pub ads_synced: usize,
    pub keywords_synced: usize,
    pub ads_statuses: Vec<RowStatus>,
}

impl SheetSync {
    /// Syncs the campaigns, ads and keywords of the sheet one after the other.
    ///
    /// Not transactional: a failed tab leaves the tabs synced before it replaced.
    pub async fn sync_all(&self, scope: &Scope) -> Result<SyncAllReport, Error> {
        let campaigns = self.campaigns.sync_from_sheet(scope).await?;
        let ads = self.ads.sync_from_sheet(scope).await?;
        let keywords = self.keywords.sync_from_sheet(scope).await?;

        let report = SyncAllReport {
            synced: KindCounts {
                campaigns: campaigns.synced,
                ads: ads.synced,
                keywords: keywords.synced,
            },
            persisted: KindCounts {
                campaigns: campaigns.persisted,
                ads: ads.persisted,
                keywords: keywords.persisted,
            },
        };
        info!(&self.logger, "Synced every tab"; "scope" => %scope, "campaigns" => report.synced.campaigns, "ads" => report.synced.ads, "keywords" => report.synced.keywords);

        Ok(report)
    }

    /// [`SheetSync::sync_all`] followed by the platform dispatch pass.
    pub async fn sync_all_and_dispatch(&self, scope: &Scope) -> Result<SyncAndDispatchReport, Error> {
        let synced = self.sync_all(scope).await?.synced;
        let ads_statuses = self.dispatcher.dispatch(scope).await?;

        Ok(SyncAndDispatchReport {
            campaigns_synced: synced.campaigns,
            ads_synced: synced.ads,
            keywords_synced: synced.keywords,
            ads_statuses,
        })
    }
}
