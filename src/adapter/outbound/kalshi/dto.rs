//! Kalshi trade API response payloads.
//!
//! Every field the discovery pipeline does not strictly need is optional so
//! that schema additions on the API side never break decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{CatalogEntry, EntityKind, EntryStatus, Metric};

#[derive(Debug, Deserialize)]
pub struct MarketsResponse {
    #[serde(default)]
    pub markets: Vec<KalshiMarket>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<KalshiEvent>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesResponse {
    #[serde(default)]
    pub series: Vec<KalshiSeries>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KalshiMarket {
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_ticker: String,
    #[serde(default)]
    pub market_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub volume_24h: Option<Value>,
    #[serde(default)]
    pub open_interest: Option<Value>,
    #[serde(default)]
    pub liquidity: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct KalshiEvent {
    pub event_ticker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub series_ticker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sub_title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub strike_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KalshiSeries {
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub settlement_sources: Option<Vec<SettlementSource>>,
}

#[derive(Debug, Deserialize)]
pub struct SettlementSource {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Treat an explicit `null` like a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl KalshiMarket {
    #[must_use]
    pub fn into_entry(self) -> CatalogEntry {
        let mut builder = CatalogEntry::builder(EntityKind::Market, self.ticker)
            .parent(self.event_ticker)
            .status(EntryStatus::from_api(&self.status))
            .title(self.title)
            .subtitle(self.subtitle)
            .entry_type(self.market_type)
            .open_time(timestamp(self.open_time.as_deref()))
            .close_time(timestamp(self.close_time.as_deref()));

        for (metric, value) in [
            (Metric::Volume, self.volume),
            (Metric::Volume24h, self.volume_24h),
            (Metric::OpenInterest, self.open_interest),
            (Metric::Liquidity, self.liquidity),
        ] {
            if let Some(value) = value {
                builder = builder.metric(metric.field(), value);
            }
        }
        builder.build()
    }
}

impl KalshiEvent {
    /// Events carry no status; the caller supplies the one it filtered on.
    #[must_use]
    pub fn into_entry(self, status: EntryStatus) -> CatalogEntry {
        CatalogEntry::builder(EntityKind::Event, self.event_ticker)
            .parent(self.series_ticker)
            .status(status)
            .title(self.title)
            .subtitle(self.sub_title)
            .category(self.category)
            .strike_date(timestamp(self.strike_date.as_deref()))
            .build()
    }
}

impl KalshiSeries {
    #[must_use]
    pub fn into_entry(self) -> CatalogEntry {
        let sources = self
            .settlement_sources
            .unwrap_or_default()
            .into_iter()
            .map(|s| match s.url {
                Some(url) if !url.is_empty() => format!("{} ({url})", s.name),
                _ => s.name,
            })
            .collect();

        CatalogEntry::builder(EntityKind::Series, self.ticker)
            .title(self.title)
            .category(self.category)
            .tags(self.tags.unwrap_or_default())
            .frequency(self.frequency)
            .settlement_sources(sources)
            .build()
    }
}
