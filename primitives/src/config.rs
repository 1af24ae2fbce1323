use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::ApiUrl;

pub use toml::de::Error as TomlError;

pub static PRODUCTION_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/prod.toml"))
        .expect("Failed to parse prod.toml config file")
});

pub static DEVELOPMENT_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::try_toml(include_str!("../../docs/config/dev.toml"))
        .expect("Failed to parse dev.toml config file")
});

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
/// The environment in which the application is running
/// Defaults to [`Environment::Development`]
pub enum Environment {
    /// Google APIs are expected on a local mock server.
    Development,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Self::Development
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all(serialize = "SCREAMING_SNAKE_CASE"))]
pub struct Config {
    /// The Sheets API root, e.g. `https://sheets.googleapis.com/v4/`
    pub sheets_api_url: ApiUrl,
    /// The Ads API root, e.g. `https://googleads.googleapis.com/v14/`
    pub ads_api_url: ApiUrl,
    /// in milliseconds
    /// Sets the client timeout of every Sheets & Ads API request
    pub fetch_timeout: u32,
    /// The last row read from the `AllResources` tab by the dispatch pass
    #[serde(default = "default_resources_last_row")]
    pub resources_last_row: u32,
    /// The document id is appended to it to build the url of a created sheet
    pub sheet_url_prefix: String,
}

fn default_resources_last_row() -> u32 {
    1000
}

impl Config {
    /// Utility method that will deserialize a Toml file content into a [`Config`].
    ///
    /// Instead of relying on the `toml` crate directly, use this method instead.
    pub fn try_toml(toml: &str) -> Result<Self, TomlError> {
        toml::from_str(toml)
    }

    pub fn sheet_url(&self, sheet_id: &str) -> String {
        format!("{}{}", self.sheet_url_prefix, sheet_id)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Toml parsing: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("File reading: {0}")]
    InvalidFile(#[from] std::io::Error),
}

/// If no `config_file` path is provided it will load the [`Environment`] configuration.
/// If `config_file` path is provided it will try to read and parse the file in Toml format.
pub fn configuration(
    environment: Environment,
    config_file: Option<&str>,
) -> Result<Config, ConfigError> {
    match config_file {
        Some(config_file) => {
            let content = std::fs::read_to_string(config_file)?;

            Ok(Config::try_toml(&content)?)
        }
        None => match environment {
            Environment::Production => Ok(PRODUCTION_CONFIG.clone()),
            Environment::Development => Ok(DEVELOPMENT_CONFIG.clone()),
        },
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn built_in_configs_parse() {
        let prod = configuration(Environment::Production, None).expect("Should load prod.toml");
        assert_eq!(
            "https://sheets.googleapis.com/v4/",
            prod.sheets_api_url.to_string()
        );
        assert_eq!(1000, prod.resources_last_row);
        assert_eq!(
            "https://docs.google.com/spreadsheets/d/abc",
            prod.sheet_url("abc")
        );

        let dev = configuration(Environment::Development, None).expect("Should load dev.toml");
        assert_eq!(prod.resources_last_row, dev.resources_last_row);
    }

    #[test]
    fn resources_last_row_defaults_to_1000() {
        let config = Config::try_toml(
            r#"
            sheets_api_url = "http://localhost:8005/sheets"
            ads_api_url = "http://localhost:8005/ads"
            fetch_timeout = 500
            sheet_url_prefix = "http://localhost:8005/d/"
            "#,
        )
        .expect("Should parse");

        assert_eq!(1000, config.resources_last_row);
        assert_eq!("http://localhost:8005/sheets/", config.sheets_api_url.to_string());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = configuration(Environment::Development, Some("./no-such-config.toml"));

        assert!(matches!(result, Err(ConfigError::InvalidFile(_))));
    }
}
