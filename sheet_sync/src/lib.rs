#![deny(clippy::all)]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Mirrors the campaigns, ads and keywords of a spreadsheet into a document store,
//! projects single record edits back onto their rows and dispatches the consolidated
//! `AllResources` tab to the advertising platform.

use std::sync::Arc;

use adapter::{AdsPlatform, Spreadsheets};
use primitives::{AdDef, CampaignDef, Config, KeywordDef};
use slog::Logger;

use crate::{
    db::{CampaignStore, SheetRegistry, Store},
    dispatch::Dispatcher,
    provision::Provisioner,
    service::DefService,
};

pub use self::{
    error::Error,
    orchestrator::{KindCounts, SyncAllReport, SyncAndDispatchReport},
    service::SyncReport,
};

pub mod application;
pub mod db;
pub mod dispatch;
mod error;
pub mod orchestrator;
pub mod parse;
pub mod projector;
pub mod provision;
pub mod service;

#[cfg(any(test, feature = "test-util"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;

/// The stores of every record kind and the sheet registry.
#[derive(Debug)]
pub struct Stores<C> {
    pub campaigns: Arc<C>,
    pub ads: Arc<dyn Store<AdDef>>,
    pub keywords: Arc<dyn Store<KeywordDef>>,
    pub registry: Arc<dyn SheetRegistry>,
}

#[derive(Debug, Clone)]
pub struct SheetSync {
    pub campaigns: DefService<CampaignDef>,
    pub ads: DefService<AdDef>,
    pub keywords: DefService<KeywordDef>,
    pub dispatcher: Dispatcher,
    pub provisioner: Provisioner,
    pub logger: Logger,
}

impl SheetSync {
    pub fn new<C: CampaignStore + 'static>(
        stores: Stores<C>,
        sheets: Arc<dyn Spreadsheets>,
        platform: Arc<dyn AdsPlatform>,
        config: Config,
        logger: Logger,
    ) -> Self {
        let campaign_store: Arc<dyn CampaignStore> = stores.campaigns.clone();
        let dispatcher = Dispatcher::new(
            sheets.clone(),
            platform,
            campaign_store,
            config.resources_last_row,
            logger.clone(),
        );

        Self {
            campaigns: DefService::new(stores.campaigns, sheets.clone(), logger.clone()),
            ads: DefService::new(stores.ads, sheets.clone(), logger.clone()),
            keywords: DefService::new(stores.keywords, sheets.clone(), logger.clone()),
            dispatcher,
            provisioner: Provisioner::new(sheets, stores.registry, config, logger.clone()),
            logger,
        }
    }
}
