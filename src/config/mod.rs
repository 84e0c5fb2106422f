//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. Every section has defaults, so an
//! empty file is a valid configuration. `CATALOG_API_URL` overrides the
//! configured API URL.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

mod catalog;
mod discovery;
mod fetch;
mod logging;
mod ranking;

pub use catalog::{CatalogConfig, HttpConfig, DEFAULT_API_URL};
pub use discovery::{DiscoveryConfig, SPORTS_KEYWORDS};
pub use fetch::FetchConfig;
pub use logging::LoggingConfig;
pub use ranking::RankingConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text, apply env overrides, and validate.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(url) = std::env::var("CATALOG_API_URL") {
            if !url.trim().is_empty() {
                config.catalog.api_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.catalog.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "api_url" }.into());
        }
        url::Url::parse(&self.catalog.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "api_url",
            reason: e.to_string(),
        })?;
        if self.fetch.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.fetch.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.fetch.retry_backoff_cap_ms < self.fetch.retry_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry_backoff_cap_ms",
                reason: format!(
                    "cap {} is below base backoff {}",
                    self.fetch.retry_backoff_cap_ms, self.fetch.retry_backoff_ms
                ),
            }
            .into());
        }
        if self.ranking.metrics.is_empty() {
            return Err(ConfigError::MissingField { field: "metrics" }.into());
        }
        if self.discovery.max_concurrent_paths == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_paths",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.discovery.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "keywords",
                reason: "keywords cannot be empty".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
