//! Builders for catalog entries used across tests.

use crate::domain::{CatalogEntry, EntityKind, EntryStatus};

/// Open market with the given lifetime volume.
pub fn market(id: &str, volume: f64) -> CatalogEntry {
    market_with_status(id, volume, EntryStatus::Open)
}

pub fn market_with_status(id: &str, volume: f64, status: EntryStatus) -> CatalogEntry {
    CatalogEntry::builder(EntityKind::Market, id)
        .parent(event_of(id))
        .status(status)
        .title(format!("Market {id}"))
        .metric("volume", volume)
        .build()
}

/// Open market with no metrics at all.
pub fn market_without_metrics(id: &str) -> CatalogEntry {
    CatalogEntry::builder(EntityKind::Market, id)
        .parent(event_of(id))
        .status(EntryStatus::Open)
        .build()
}

/// Open market with arbitrary metric fields.
pub fn market_with_metrics(id: &str, metrics: &[(&str, serde_json::Value)]) -> CatalogEntry {
    metrics
        .iter()
        .fold(
            CatalogEntry::builder(EntityKind::Market, id)
                .parent(event_of(id))
                .status(EntryStatus::Open),
            |builder, (name, value)| builder.metric(*name, value.clone()),
        )
        .build()
}

pub fn event(id: &str, series: &str) -> CatalogEntry {
    CatalogEntry::builder(EntityKind::Event, id)
        .parent(series)
        .status(EntryStatus::Open)
        .title(format!("Event {id}"))
        .build()
}

pub fn series(id: &str, category: &str) -> CatalogEntry {
    CatalogEntry::builder(EntityKind::Series, id)
        .title(format!("Series {id}"))
        .category(Some(category.to_string()))
        .build()
}

/// Event ticker of a market ticker (`EVENT-SUFFIX` -> `EVENT`).
fn event_of(id: &str) -> String {
    id.rsplit_once('-')
        .map_or_else(|| id.to_string(), |(event, _)| event.to_string())
}
