//! Streaming top-K selection over catalog entries.
//!
//! Each metric keeps a min-heap of at most K [`RankedEntry`] values. An
//! incoming entry is compared with the heap's weakest member and either
//! replaces it or is dropped on the spot, so memory stays O(K) however large
//! the catalog is. Page order says nothing about metric order, so the whole
//! stream is always consumed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{CatalogEntry, Metric, RankedEntry};
use crate::error::FetchError;

/// Final ranking for one metric.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub metric: Metric,
    pub k: usize,
    /// Sorted by value descending, then identifier ascending.
    pub entries: Vec<RankedEntry>,
    /// Entries examined.
    pub scanned: usize,
    /// Entries whose metric was missing or non-numeric and ranked as zero.
    pub missing_metric: usize,
}

impl Ranking {
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.entries.iter().map(RankedEntry::identifier).collect()
    }

    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(RankedEntry::value).collect()
    }
}

/// The upstream stream ended abnormally; rankings hold what was retained so far.
#[derive(Error, Debug)]
#[error("top-K selection incomplete after {scanned} entries: {cause}")]
pub struct PartialSelection {
    pub rankings: Vec<Ranking>,
    pub scanned: usize,
    #[source]
    pub cause: FetchError,
}

impl PartialSelection {
    #[must_use]
    pub fn ranking(&self, metric: Metric) -> Option<&Ranking> {
        self.rankings.iter().find(|r| r.metric == metric)
    }
}

/// Bounded min-heap holding the best K entries seen for one metric.
#[derive(Debug)]
pub struct TopK {
    metric: Metric,
    k: usize,
    heap: BinaryHeap<Reverse<RankedEntry>>,
    scanned: usize,
    missing_metric: usize,
}

impl TopK {
    #[must_use]
    pub fn new(metric: Metric, k: usize) -> Self {
        Self {
            metric,
            k,
            heap: BinaryHeap::with_capacity(k.min(4096)),
            scanned: 0,
            missing_metric: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Value an entry would currently need to beat to get in, once full.
    #[must_use]
    pub fn threshold(&self) -> Option<f64> {
        if self.heap.len() < self.k {
            return None;
        }
        self.heap.peek().map(|Reverse(min)| min.value())
    }

    /// Consider one entry. Returns whether it was retained.
    pub fn offer(&mut self, entry: &Arc<CatalogEntry>) -> bool {
        self.scanned += 1;
        let value = entry.metric(self.metric).unwrap_or_else(|| {
            self.missing_metric += 1;
            0.0
        });

        if self.k == 0 {
            return false;
        }

        let candidate = RankedEntry::new(Arc::clone(entry), self.metric, value);
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
            return true;
        }

        let beats_min = self
            .heap
            .peek()
            .is_some_and(|Reverse(min)| candidate > *min);
        if beats_min {
            self.heap.pop();
            self.heap.push(Reverse(candidate));
        }
        beats_min
    }

    #[must_use]
    pub fn into_ranking(self) -> Ranking {
        let mut entries: Vec<RankedEntry> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        entries.sort_by(|a, b| b.cmp(a));
        Ranking {
            metric: self.metric,
            k: self.k,
            entries,
            scanned: self.scanned,
            missing_metric: self.missing_metric,
        }
    }
}

/// Rank a stream by a single metric.
pub async fn select_top_k<S>(stream: S, metric: Metric, k: usize) -> Result<Ranking, PartialSelection>
where
    S: Stream<Item = Result<CatalogEntry, FetchError>> + Unpin,
{
    let mut rankings = select_top_k_by(stream, &[metric], k).await?;
    Ok(rankings.remove(0))
}

/// Rank a stream by several metrics in one pass.
///
/// Entries are shared between the per-metric heaps and released as soon as
/// no heap retains them. Rankings come back in the order of `metrics`.
pub async fn select_top_k_by<S>(
    mut stream: S,
    metrics: &[Metric],
    k: usize,
) -> Result<Vec<Ranking>, PartialSelection>
where
    S: Stream<Item = Result<CatalogEntry, FetchError>> + Unpin,
{
    let mut heaps: Vec<TopK> = metrics.iter().map(|m| TopK::new(*m, k)).collect();
    let mut scanned = 0usize;
    let mut interrupted = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(entry) => {
                scanned += 1;
                let entry = Arc::new(entry);
                for heap in &mut heaps {
                    heap.offer(&entry);
                }
            }
            Err(err) => {
                interrupted = Some(err);
                break;
            }
        }
    }

    let rankings: Vec<Ranking> = heaps.into_iter().map(TopK::into_ranking).collect();
    for ranking in &rankings {
        if ranking.missing_metric > 0 {
            warn!(
                metric = %ranking.metric,
                skipped = ranking.missing_metric,
                "Entries without a numeric metric were ranked as zero"
            );
        }
    }

    match interrupted {
        Some(cause) => {
            warn!(scanned, error = %cause, "Top-K selection interrupted");
            Err(PartialSelection {
                rankings,
                scanned,
                cause,
            })
        }
        None => {
            info!(scanned, k, metrics = metrics.len(), "Top-K selection complete");
            Ok(rankings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testkit::domain::{market, market_with_metrics, market_without_metrics};
    use futures_util::stream;
    use serde_json::json;

    fn ok_stream(
        entries: Vec<CatalogEntry>,
    ) -> impl Stream<Item = Result<CatalogEntry, FetchError>> + Unpin {
        stream::iter(entries.into_iter().map(Ok))
    }

    fn volumes(values: &[f64]) -> Vec<CatalogEntry> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| market(&format!("M{i}"), *v))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn keeps_three_largest_in_descending_order() {
        let ranking = select_top_k(ok_stream(volumes(&[10.0, 50.0, 5.0, 90.0, 30.0])), Metric::Volume, 3)
            .await
            .unwrap();

        assert_eq!(ranking.values(), vec![90.0, 50.0, 30.0]);
        assert_eq!(ranking.scanned, 5);
    }

    #[tokio::test]
    async fn short_stream_is_returned_whole_and_sorted() {
        let ranking = select_top_k(ok_stream(volumes(&[3.0, 1.0, 2.0])), Metric::Volume, 10)
            .await
            .unwrap();

        assert_eq!(ranking.identifiers(), vec!["M0", "M2", "M1"]);
    }

    #[tokio::test]
    async fn zero_k_returns_nothing_but_consumes_stream() {
        let ranking = select_top_k(ok_stream(volumes(&[1.0, 2.0])), Metric::Volume, 0)
            .await
            .unwrap();

        assert!(ranking.entries.is_empty());
        assert_eq!(ranking.scanned, 2);
    }

    #[tokio::test]
    async fn ties_resolve_by_identifier_regardless_of_arrival_order() {
        let forward = vec![market("B", 5.0), market("A", 5.0), market("C", 5.0)];
        let backward = vec![market("C", 5.0), market("A", 5.0), market("B", 5.0)];

        let a = select_top_k(ok_stream(forward), Metric::Volume, 2).await.unwrap();
        let b = select_top_k(ok_stream(backward), Metric::Volume, 2).await.unwrap();

        assert_eq!(a.identifiers(), vec!["A", "B"]);
        assert_eq!(b.identifiers(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn missing_metric_counts_as_zero_and_never_displaces_positive() {
        let entries = vec![
            market("REAL", 1.0),
            market_without_metrics("NONE"),
            market_with_metrics("TEXT", &[("volume", json!("lots"))]),
        ];

        let ranking = select_top_k(ok_stream(entries), Metric::Volume, 1).await.unwrap();

        assert_eq!(ranking.identifiers(), vec!["REAL"]);
        assert_eq!(ranking.missing_metric, 2);
    }

    #[test]
    fn heap_never_exceeds_k() {
        let mut top = TopK::new(Metric::Volume, 2);
        for entry in volumes(&[1.0, 2.0, 3.0, 4.0]) {
            top.offer(&Arc::new(entry));
            assert!(top.len() <= 2);
        }
        assert_eq!(top.threshold(), Some(3.0));
    }

    // -------------------------------------------------------------------------
    // Multiple metrics
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn ranks_several_metrics_in_one_pass() {
        let entries = vec![
            market_with_metrics("A", &[("volume", json!(100)), ("volume_24h", json!(1))]),
            market_with_metrics("B", &[("volume", json!(10)), ("volume_24h", json!(50))]),
            market_with_metrics("C", &[("volume", json!(50)), ("volume_24h", json!(20))]),
        ];

        let rankings = select_top_k_by(ok_stream(entries), &[Metric::Volume, Metric::Volume24h], 2)
            .await
            .unwrap();

        assert_eq!(rankings[0].identifiers(), vec!["A", "C"]);
        assert_eq!(rankings[1].identifiers(), vec!["B", "C"]);
    }

    // -------------------------------------------------------------------------
    // Abnormal termination
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn upstream_failure_yields_partial_selection() {
        let items = vec![
            Ok(market("A", 5.0)),
            Ok(market("B", 7.0)),
            Err(FetchError::FetchFailed {
                page: 2,
                attempts: 3,
                source: TransportError::Timeout,
            }),
            Ok(market("C", 100.0)),
        ];

        let partial = select_top_k(stream::iter(items), Metric::Volume, 5)
            .await
            .unwrap_err();

        assert_eq!(partial.scanned, 2);
        assert!(matches!(partial.cause, FetchError::FetchFailed { page: 2, .. }));
        let ranking = partial.ranking(Metric::Volume).unwrap();
        assert_eq!(ranking.identifiers(), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn cancellation_yields_partial_selection() {
        let items = vec![Ok(market("A", 5.0)), Err(FetchError::Cancelled)];

        let partial = select_top_k(stream::iter(items), Metric::Volume, 5)
            .await
            .unwrap_err();

        assert!(partial.cause.is_cancelled());
    }
}
