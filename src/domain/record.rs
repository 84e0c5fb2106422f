//! Outbound record shapes written by the CLI as JSON lines.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classification::ClassificationResult;
use super::entry::CatalogEntry;
use super::metric::Metric;
use super::ranked::RankedEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRecord {
    pub ticker: String,
    pub event_ticker: String,
    pub market_type: Option<String>,
    pub title: String,
    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
    pub volume: Option<f64>,
    pub volume_24h: Option<f64>,
    pub status: String,
    pub open_interest: Option<f64>,
}

impl From<&CatalogEntry> for MarketRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            ticker: entry.identifier().to_string(),
            event_ticker: entry.parent().to_string(),
            market_type: entry.entry_type().map(str::to_string),
            title: entry.title().to_string(),
            open_time: entry.open_time(),
            close_time: entry.close_time(),
            volume: entry.metric(Metric::Volume),
            volume_24h: entry.metric(Metric::Volume24h),
            status: entry.status().to_string(),
            open_interest: entry.metric(Metric::OpenInterest),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub event_ticker: String,
    pub series_ticker: String,
    pub title: String,
    pub sub_title: String,
    pub category: Option<String>,
    pub strike_date: Option<DateTime<Utc>>,
}

impl From<&CatalogEntry> for EventRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            event_ticker: entry.identifier().to_string(),
            series_ticker: entry.parent().to_string(),
            title: entry.title().to_string(),
            sub_title: entry.subtitle().to_string(),
            category: entry.category().map(str::to_string),
            strike_date: entry.strike_date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRecord {
    pub ticker: String,
    pub title: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub frequency: Option<String>,
    pub settlement_sources: Vec<String>,
}

impl From<&CatalogEntry> for SeriesRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            ticker: entry.identifier().to_string(),
            title: entry.title().to_string(),
            category: entry.category().map(str::to_string),
            tags: entry.tags().to_vec(),
            frequency: entry.frequency().map(str::to_string),
            settlement_sources: entry.settlement_sources().to_vec(),
        }
    }
}

/// A record with its position in a ranking. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow<R> {
    pub rank: usize,
    pub metric: &'static str,
    pub value: f64,
    #[serde(flatten)]
    pub record: R,
}

impl<R> RankedRow<R>
where
    R: for<'a> From<&'a CatalogEntry>,
{
    #[must_use]
    pub fn new(rank: usize, ranked: &RankedEntry) -> Self {
        Self {
            rank,
            metric: ranked.metric().field(),
            value: ranked.value(),
            record: R::from(ranked.entry()),
        }
    }
}

/// A record with the classification of its identifier (or its event's).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRow<R> {
    #[serde(flatten)]
    pub record: R,
    pub classification: ClassificationResult,
}
