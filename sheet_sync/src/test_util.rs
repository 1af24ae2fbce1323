use std::sync::Arc;

use adapter::{
    dummy::{DummyAds, DummySheets},
    Rows,
};
use primitives::{
    config::DEVELOPMENT_CONFIG,
    test_util::{discard_logger, DUMMY_SCOPE},
    AdDef, CampaignDef, KeywordDef,
};

use crate::{
    db::{MemoryRegistry, MemoryStore},
    SheetSync, Stores,
};

/// A [`SheetSync`] over in-memory stores and dummy clients, with handles to all of them.
#[derive(Debug, Clone)]
pub struct Setup {
    pub sync: SheetSync,
    pub sheets: DummySheets,
    pub platform: DummyAds,
    pub campaigns: MemoryStore<CampaignDef>,
    pub ads: MemoryStore<AdDef>,
    pub keywords: MemoryStore<KeywordDef>,
    pub registry: MemoryRegistry,
}

impl Setup {
    pub fn new() -> Self {
        let sheets = DummySheets::new();
        let platform = DummyAds::new();
        let campaigns = MemoryStore::new();
        let ads = MemoryStore::new();
        let keywords = MemoryStore::new();
        let registry = MemoryRegistry::new();

        let stores = Stores {
            campaigns: Arc::new(campaigns.clone()),
            ads: Arc::new(ads.clone()),
            keywords: Arc::new(keywords.clone()),
            registry: Arc::new(registry.clone()),
        };
        let sync = SheetSync::new(
            stores,
            Arc::new(sheets.clone()),
            Arc::new(platform.clone()),
            DEVELOPMENT_CONFIG.clone(),
            discard_logger(),
        );

        Self {
            sync,
            sheets,
            platform,
            campaigns,
            ads,
            keywords,
            registry,
        }
    }

    /// Sets the data rows of a tab of the [`DUMMY_SCOPE`] sheet.
    pub fn set_tab(&self, title: &str, rows: Rows) {
        self.sheets.set_tab(&DUMMY_SCOPE.sheet_id, title, rows);
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}
