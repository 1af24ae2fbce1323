#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Domain types shared by the spreadsheet adapters and the sync service.
//!
//! Every stored record is partitioned by a [`Scope`] and addressed in the
//! spreadsheet by its [`RowIndex`].

pub use self::{
    ad_def::{AdDef, AdPatch},
    campaign_def::{CampaignDef, CampaignPatch, CampaignStatus, CampaignUpsert},
    config::Config,
    keyword_def::{KeywordDef, KeywordPatch, MatchType},
    record::{FieldPatch, PatchError, Record, RecordId, RecordKind},
    registry::SheetEntry,
    resource::{Operation, ResourceKind, ResourceRow, RowStatus},
    scope::{Scope, ScopeError, SheetId, TenantId, UserId},
    sheet::{A1Range, Cell, Column, RowIndex, TabId, TabSpec, ValueRange},
};

pub mod ad_def;
pub mod campaign_def;
pub mod config;
pub mod keyword_def;
pub mod record;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod sheet;

pub mod util {
    pub use api::ApiUrl;

    pub mod api;
    pub mod cell;
    pub mod logging;
}

#[cfg(any(test, feature = "test-util"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;
