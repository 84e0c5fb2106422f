//! Catalog entries: the immutable records produced by the paginated fetcher.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::metric::Metric;

/// Which catalog collection an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Market,
    Event,
    Series,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Event => "event",
            Self::Series => "series",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryStatus {
    Open,
    Closed,
    Settled,
    Unknown,
}

impl EntryStatus {
    /// Map a raw API status onto the four-state model.
    ///
    /// The API reports tradable markets as `active` and resolved ones as
    /// `finalized` or `determined`, while filters are expressed as
    /// `open`/`closed`/`settled`.
    #[must_use]
    pub fn from_api(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" | "active" => Self::Open,
            "closed" => Self::Closed,
            "settled" | "finalized" | "determined" => Self::Settled,
            _ => Self::Unknown,
        }
    }

    /// Value used for the `status` query parameter, if filterable.
    #[must_use]
    pub const fn as_filter(&self) -> Option<&'static str> {
        match self {
            Self::Open => Some("open"),
            Self::Closed => Some("closed"),
            Self::Settled => Some("settled"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter().unwrap_or("unknown"))
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "settled" => Ok(Self::Settled),
            _ => Err(crate::error::ConfigError::UnknownStatus(s.to_string())),
        }
    }
}

/// One market, event, or series as returned by the catalog.
///
/// Entries are built once by an adapter and only read afterwards. Ranking
/// and classification borrow them; nothing hands out `&mut` access.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    kind: EntityKind,
    identifier: String,
    parent: String,
    status: EntryStatus,
    metrics: BTreeMap<String, Value>,
    title: String,
    subtitle: String,
    entry_type: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    frequency: Option<String>,
    settlement_sources: Vec<String>,
    open_time: Option<DateTime<Utc>>,
    close_time: Option<DateTime<Utc>>,
    strike_date: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Start building an entry of the given kind.
    #[must_use]
    pub fn builder(kind: EntityKind, identifier: impl Into<String>) -> CatalogEntryBuilder {
        CatalogEntryBuilder {
            entry: Self {
                kind,
                identifier: identifier.into(),
                parent: String::new(),
                status: EntryStatus::Unknown,
                metrics: BTreeMap::new(),
                title: String::new(),
                subtitle: String::new(),
                entry_type: None,
                category: None,
                tags: Vec::new(),
                frequency: None,
                settlement_sources: Vec::new(),
                open_time: None,
                close_time: None,
                strike_date: None,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Identifier of the containing entity; empty for series.
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        self.status
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    #[must_use]
    pub fn entry_type(&self) -> Option<&str> {
        self.entry_type.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    #[must_use]
    pub fn settlement_sources(&self) -> &[String] {
        &self.settlement_sources
    }

    #[must_use]
    pub const fn open_time(&self) -> Option<DateTime<Utc>> {
        self.open_time
    }

    #[must_use]
    pub const fn close_time(&self) -> Option<DateTime<Utc>> {
        self.close_time
    }

    #[must_use]
    pub const fn strike_date(&self) -> Option<DateTime<Utc>> {
        self.strike_date
    }

    /// Raw metric value as delivered by the API.
    #[must_use]
    pub fn raw_metric(&self, name: &str) -> Option<&Value> {
        self.metrics.get(name)
    }

    /// Numeric value of a metric.
    ///
    /// Numbers and numeric strings (the API sends `*_dollars` fields as
    /// strings) are accepted. Missing, non-numeric, and non-finite values
    /// return `None`.
    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let value = match self.metrics.get(metric.field())? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// Builder for [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct CatalogEntryBuilder {
    entry: CatalogEntry,
}

impl CatalogEntryBuilder {
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.entry.parent = parent.into();
        self
    }

    #[must_use]
    pub const fn status(mut self, status: EntryStatus) -> Self {
        self.entry.status = status;
        self
    }

    #[must_use]
    pub fn metric(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.entry.metrics.insert(name.into(), value);
        }
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.entry.title = title.into();
        self
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.entry.subtitle = subtitle.into();
        self
    }

    #[must_use]
    pub fn entry_type(mut self, entry_type: Option<String>) -> Self {
        self.entry.entry_type = entry_type;
        self
    }

    #[must_use]
    pub fn category(mut self, category: Option<String>) -> Self {
        self.entry.category = category;
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.entry.tags = tags;
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Option<String>) -> Self {
        self.entry.frequency = frequency;
        self
    }

    #[must_use]
    pub fn settlement_sources(mut self, sources: Vec<String>) -> Self {
        self.entry.settlement_sources = sources;
        self
    }

    #[must_use]
    pub const fn open_time(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.entry.open_time = at;
        self
    }

    #[must_use]
    pub const fn close_time(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.entry.close_time = at;
        self
    }

    #[must_use]
    pub const fn strike_date(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.entry.strike_date = at;
        self
    }

    #[must_use]
    pub fn build(self) -> CatalogEntry {
        self.entry
    }
}
