//! Wiring of the MongoDB stores and the Google clients from the environment.
use std::{sync::Arc, time::Duration};

use adapter::google::{GoogleAds, GoogleSheets};
use mongodb::{options::ClientOptions, Client};
use primitives::{config::Environment, AdDef, CampaignDef, Config, KeywordDef};
use serde::Deserialize;
use slog::{info, Logger};
use thiserror::Error;

/// an error used when deserializing a [`EnvConfig`] instance from environment variables
/// see [`EnvConfig::from_env()`]
pub use envy::Error as EnvError;

use crate::{
    db::{self, MongoRegistry, MongoStore},
    SheetSync, Stores,
};

pub const DEFAULT_MONGODB_URL: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "sheet_sync";

#[derive(Debug, Deserialize, Clone)]
pub struct EnvConfig {
    /// Defaults to `Development`: [`Environment::default()`]
    #[serde(default)]
    pub env: Environment,
    /// Defaults to a locally running MongoDB: [`DEFAULT_MONGODB_URL`]
    #[serde(default = "default_mongodb_url")]
    pub mongodb_url: String,
    /// Defaults to [`DEFAULT_MONGODB_DATABASE`]
    #[serde(default = "default_mongodb_database")]
    pub mongodb_database: String,
    /// The OAuth access token of the user whose spreadsheets are accessed.
    pub google_access_token: String,
    /// Only needed for a non-empty dispatch.
    pub google_ads_token: Option<String>,
    pub google_ads_customer_id: Option<String>,
}

impl EnvConfig {
    /// Deserialize the [`EnvConfig`] from Environment variables.
    pub fn from_env() -> Result<Self, EnvError> {
        envy::from_env()
    }
}

fn default_mongodb_url() -> String {
    DEFAULT_MONGODB_URL.into()
}

fn default_mongodb_database() -> String {
    DEFAULT_MONGODB_DATABASE.into()
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("MongoDB: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Creating indexes: {0}")]
    Indexes(#[from] db::Error),
    #[error("Google client: {0}")]
    Client(#[from] adapter::Error),
}

/// Connects to MongoDB, ensures the indexes and builds the Google clients.
pub async fn connect(
    env: &EnvConfig,
    config: Config,
    logger: Logger,
) -> Result<SheetSync, ApplicationError> {
    let mut options = ClientOptions::parse(&env.mongodb_url).await?;
    options.app_name = Some("sheet-sync".into());
    let database = Client::with_options(options)?.database(&env.mongodb_database);

    let campaigns = MongoStore::<CampaignDef>::new(&database);
    let ads = MongoStore::<AdDef>::new(&database);
    let keywords = MongoStore::<KeywordDef>::new(&database);
    let registry = MongoRegistry::new(&database);

    campaigns.create_indexes().await?;
    ads.create_indexes().await?;
    keywords.create_indexes().await?;
    registry.create_indexes().await?;
    info!(&logger, "Connected to MongoDB"; "database" => &env.mongodb_database);

    let timeout = Duration::from_millis(config.fetch_timeout.into());
    let sheets = GoogleSheets::new(
        config.sheets_api_url.clone(),
        env.google_access_token.clone(),
        timeout,
    )?;
    let platform = GoogleAds::new(
        config.ads_api_url.clone(),
        env.google_ads_token.clone(),
        env.google_ads_customer_id.clone(),
        timeout,
    )?;

    let stores = Stores {
        campaigns: Arc::new(campaigns),
        ads: Arc::new(ads),
        keywords: Arc::new(keywords),
        registry: Arc::new(registry),
    };

    Ok(SheetSync::new(
        stores,
        Arc::new(sheets),
        Arc::new(platform),
        config,
        logger,
    ))
}
