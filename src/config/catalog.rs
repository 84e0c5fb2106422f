//! Catalog API connection settings.

use serde::Deserialize;

/// Production trade API.
pub const DEFAULT_API_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Catalog API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the trade API, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            http: HttpConfig::default(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    3_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
        }
    }
}
