//! Kalshi REST client implementing [`CatalogSource`].
//!
//! One call is one HTTP request. Retries and backoff belong to the
//! paginated fetcher, which decides from [`TransportError::is_transient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::dto::{EventsResponse, MarketsResponse, SeriesResponse};
use crate::config::CatalogConfig;
use crate::domain::{EntityKind, EntryStatus};
use crate::error::TransportError;
use crate::port::{CatalogSource, Cursor, Page, PageQuery};

/// Error bodies are cut to this many characters.
const MAX_ERROR_BODY: usize = 512;

pub struct KalshiClient {
    http: HttpClient,
    base_url: String,
}

impl KalshiClient {
    /// Wrap an existing HTTP client.
    ///
    /// `base_url` is the API root, e.g.
    /// `https://api.elections.kalshi.com/trade-api/v2`.
    #[must_use]
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CatalogConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self::new(http, config.api_url.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for one page.
    pub fn page_url(&self, query: &PageQuery<'_>) -> Result<Url, TransportError> {
        let path = match query.kind {
            EntityKind::Market => "markets",
            EntityKind::Event => "events",
            EntityKind::Series => "series",
        };
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))
            .map_err(|e| TransportError::Other(format!("invalid catalog URL: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(cursor) = query.cursor {
                pairs.append_pair("cursor", cursor.as_str());
            }

            let filter = query.filter;
            if let Some(parent) = &filter.parent {
                let key = match query.kind {
                    EntityKind::Market => "event_ticker",
                    EntityKind::Event | EntityKind::Series => "series_ticker",
                };
                pairs.append_pair(key, parent);
            }
            if query.kind != EntityKind::Series {
                let statuses: Vec<&str> = filter
                    .statuses
                    .iter()
                    .filter_map(EntryStatus::as_filter)
                    .collect();
                if !statuses.is_empty() {
                    pairs.append_pair("status", &statuses.join(","));
                }
            }
            if query.kind == EntityKind::Series {
                if let Some(category) = filter.category {
                    pairs.append_pair("category", category.api_name());
                }
                if let Some(tags) = &filter.tags {
                    pairs.append_pair("tags", tags);
                }
            }
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for KalshiClient {
    async fn list_entries(&self, query: PageQuery<'_>) -> Result<Page, TransportError> {
        let url = self.page_url(&query)?;
        debug!(url = %url, "Requesting catalog page");

        let (entries, cursor) = match query.kind {
            EntityKind::Market => {
                let response: MarketsResponse = self.get(url).await?;
                let entries = response.markets.into_iter().map(|m| m.into_entry()).collect();
                (entries, response.cursor)
            }
            EntityKind::Event => {
                let response: EventsResponse = self.get(url).await?;
                // Sound only when the server filtered on exactly one status.
                let status = match query.filter.statuses.len() {
                    1 => query
                        .filter
                        .statuses
                        .iter()
                        .next()
                        .copied()
                        .unwrap_or(EntryStatus::Unknown),
                    _ => EntryStatus::Unknown,
                };
                let entries = response
                    .events
                    .into_iter()
                    .map(|e| e.into_entry(status))
                    .collect();
                (entries, response.cursor)
            }
            EntityKind::Series => {
                let response: SeriesResponse = self.get(url).await?;
                let entries = response.series.into_iter().map(|s| s.into_entry()).collect();
                (entries, response.cursor)
            }
        };

        Ok(Page::new(entries, cursor.and_then(Cursor::from_token)))
    }

    fn source_name(&self) -> &'static str {
        "kalshi"
    }
}
