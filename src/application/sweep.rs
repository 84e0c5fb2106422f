//! Series → events → markets walk.
//!
//! For each series the sweep lists its events, classifies every event ticker,
//! then lists the event's markets. A failed listing is logged and skipped so
//! one bad series does not lose the rest; cancellation stops the sweep.

use std::sync::Arc;

use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::classifier::TickerClassifier;
use super::fetcher::{FetchRequest, PaginatedFetcher};
use crate::domain::{
    CatalogEntry, ClassifiedRow, EntityKind, EntryStatus, MarketRecord, TickerMetadata,
};
use crate::error::FetchError;
use crate::port::CatalogFilter;

/// A listing that could not be completed.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    /// What was being listed (events of a series, or markets of an event).
    pub kind: EntityKind,
    pub parent: String,
    pub error: FetchError,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub rows: Vec<ClassifiedRow<MarketRecord>>,
    pub series_scanned: usize,
    pub events_scanned: usize,
}

#[derive(Error, Debug)]
#[error("sweep incomplete: {} listing(s) failed, {} market(s) collected", .failures.len(), .report.rows.len())]
pub struct PartialSweep {
    pub report: SweepReport,
    pub failures: Vec<SweepFailure>,
}

impl PartialSweep {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_cancelled())
    }
}

pub struct MarketSweep {
    fetcher: PaginatedFetcher,
    classifier: Arc<TickerClassifier>,
}

enum Listing {
    Complete(Vec<CatalogEntry>),
    Failed(Vec<CatalogEntry>, FetchError),
}

impl MarketSweep {
    #[must_use]
    pub fn new(fetcher: PaginatedFetcher, classifier: Arc<TickerClassifier>) -> Self {
        Self {
            fetcher,
            classifier,
        }
    }

    pub async fn sweep(
        &self,
        series: &[String],
        statuses: &[EntryStatus],
    ) -> Result<SweepReport, PartialSweep> {
        let mut report = SweepReport::default();
        let mut failures = Vec::new();
        // Events carry no status of their own; the catalog can only filter
        // them on a single one.
        let event_statuses: &[EntryStatus] = if statuses.len() == 1 { statuses } else { &[] };

        'series: for series_ticker in series {
            report.series_scanned += 1;
            let events = match self.list(EntityKind::Event, series_ticker, event_statuses).await {
                Listing::Complete(events) => events,
                Listing::Failed(events, error) => {
                    let cancelled = error.is_cancelled();
                    failures.push(SweepFailure {
                        kind: EntityKind::Event,
                        parent: series_ticker.clone(),
                        error,
                    });
                    if cancelled {
                        break 'series;
                    }
                    events
                }
            };
            debug!(series = %series_ticker, events = events.len(), "Listed events");

            for event in &events {
                report.events_scanned += 1;
                let classification = self.classifier.classify(
                    event.identifier(),
                    TickerMetadata {
                        parent: Some(series_ticker.as_str()),
                        category: event.category(),
                    },
                );

                let (markets, failure) =
                    match self.list(EntityKind::Market, event.identifier(), statuses).await {
                        Listing::Complete(markets) => (markets, None),
                        Listing::Failed(markets, error) => (markets, Some(error)),
                    };

                report.rows.extend(markets.iter().map(|market| ClassifiedRow {
                    record: MarketRecord::from(market),
                    classification: classification.clone(),
                }));

                if let Some(error) = failure {
                    let cancelled = error.is_cancelled();
                    failures.push(SweepFailure {
                        kind: EntityKind::Market,
                        parent: event.identifier().to_string(),
                        error,
                    });
                    if cancelled {
                        break 'series;
                    }
                }
            }
        }

        if failures.is_empty() {
            info!(
                series = report.series_scanned,
                events = report.events_scanned,
                markets = report.rows.len(),
                "Sweep complete"
            );
            Ok(report)
        } else {
            warn!(
                series = report.series_scanned,
                markets = report.rows.len(),
                failed = failures.len(),
                "Sweep incomplete"
            );
            Err(PartialSweep { report, failures })
        }
    }

    async fn list(&self, kind: EntityKind, parent: &str, statuses: &[EntryStatus]) -> Listing {
        let filter = CatalogFilter::default()
            .with_parent(parent)
            .with_statuses(statuses.iter().copied());
        let mut stream = self.fetcher.fetch(FetchRequest::new(kind, filter));
        let mut entries = Vec::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    warn!(kind = %kind, parent, error = %error, "Listing failed, skipping");
                    return Listing::Failed(entries, error);
                }
            }
        }
        Listing::Complete(entries)
    }
}
