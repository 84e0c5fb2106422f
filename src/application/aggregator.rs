//! Series discovery across category and keyword paths.
//!
//! Each category is one filtered series listing. Keyword paths share a single
//! walk of the unfiltered listing, and each keeps the tickers that contain its
//! keyword. Listings run concurrently up to a cap and paths are merged by
//! identifier in declaration order, so the result does not depend on which
//! listing finishes first.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::classifier::TickerClassifier;
use super::fetcher::{FetchRequest, PaginatedFetcher};
use crate::domain::{CatalogCategory, CatalogEntry, ClassificationResult, EntityKind, TickerMetadata};
use crate::error::FetchError;
use crate::port::CatalogFilter;

/// One discovery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryPath {
    Category(CatalogCategory),
    /// Upper-cased keyword matched against series tickers.
    Keyword(String),
}

impl DiscoveryPath {
    fn admits(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Category(_) => true,
            Self::Keyword(keyword) => entry.identifier().to_ascii_uppercase().contains(keyword),
        }
    }
}

impl fmt::Display for DiscoveryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => write!(f, "category:{category}"),
            Self::Keyword(keyword) => write!(f, "keyword:{keyword}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredSeries {
    pub entry: CatalogEntry,
    pub classification: ClassificationResult,
    /// Path that first reported this series.
    pub path: DiscoveryPath,
}

/// Union of all paths, deduplicated by series ticker.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub series: Vec<DiscoveredSeries>,
}

impl Discovery {
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.entry.identifier()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PathFailure {
    pub path: DiscoveryPath,
    pub error: FetchError,
}

/// At least one path failed or was cancelled.
#[derive(Error, Debug)]
#[error("discovery incomplete: {} path(s) failed, {} series found", .failures.len(), .discovery.len())]
pub struct PartialDiscovery {
    pub discovery: Discovery,
    pub failures: Vec<PathFailure>,
}

impl PartialDiscovery {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_cancelled())
    }
}

struct PathOutcome {
    path: DiscoveryPath,
    entries: Vec<CatalogEntry>,
    error: Option<FetchError>,
}

/// One series walk against the catalog.
#[derive(Debug, Clone, Copy)]
enum Listing {
    Category(CatalogCategory),
    /// Every series; shared by all keyword paths.
    Unfiltered,
}

impl Listing {
    fn filter(self) -> CatalogFilter {
        match self {
            Self::Category(category) => CatalogFilter::default().with_category(category),
            Self::Unfiltered => CatalogFilter::default(),
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => write!(f, "category:{category}"),
            Self::Unfiltered => f.write_str("all series"),
        }
    }
}

struct ListingOutcome {
    entries: Vec<CatalogEntry>,
    error: Option<FetchError>,
}

pub struct CategoryAggregator {
    fetcher: PaginatedFetcher,
    classifier: Arc<TickerClassifier>,
    max_concurrent_paths: usize,
}

impl CategoryAggregator {
    #[must_use]
    pub fn new(
        fetcher: PaginatedFetcher,
        classifier: Arc<TickerClassifier>,
        max_concurrent_paths: usize,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            max_concurrent_paths: max_concurrent_paths.max(1),
        }
    }

    /// Run every path and merge the results.
    ///
    /// Blank keywords are ignored. On failure the series found by the other
    /// paths, and by the failed path before it failed, are still returned.
    pub async fn discover(
        &self,
        categories: &[CatalogCategory],
        keywords: &[String],
    ) -> Result<Discovery, PartialDiscovery> {
        let keyword_paths: Vec<DiscoveryPath> = keywords
            .iter()
            .map(|k| k.trim().to_ascii_uppercase())
            .filter(|k| !k.is_empty())
            .map(DiscoveryPath::Keyword)
            .collect();

        let mut listings: Vec<Listing> = categories.iter().copied().map(Listing::Category).collect();
        if !keyword_paths.is_empty() {
            listings.push(Listing::Unfiltered);
        }

        info!(
            paths = categories.len() + keyword_paths.len(),
            listings = listings.len(),
            max_concurrent = self.max_concurrent_paths,
            "Starting series discovery"
        );

        let mut results: Vec<ListingOutcome> =
            stream::iter(listings.into_iter().map(|l| self.run_listing(l)))
                .buffered(self.max_concurrent_paths)
                .collect()
                .await;
        let shared = if keyword_paths.is_empty() {
            None
        } else {
            results.pop()
        };

        let mut outcomes: Vec<PathOutcome> = categories
            .iter()
            .zip(results)
            .map(|(category, result)| PathOutcome {
                path: DiscoveryPath::Category(*category),
                entries: result.entries,
                error: result.error,
            })
            .collect();
        if let Some(listing) = shared {
            for path in keyword_paths {
                let entries = listing
                    .entries
                    .iter()
                    .filter(|entry| path.admits(entry))
                    .cloned()
                    .collect();
                outcomes.push(PathOutcome {
                    path,
                    entries,
                    error: listing.error.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        let mut discovery = Discovery::default();
        let mut failures = Vec::new();

        for outcome in outcomes {
            for entry in outcome.entries {
                if !seen.insert(entry.identifier().to_string()) {
                    continue;
                }
                let classification = self.classifier.classify(
                    entry.identifier(),
                    TickerMetadata {
                        parent: None,
                        category: entry.category(),
                    },
                );
                discovery.series.push(DiscoveredSeries {
                    entry,
                    classification,
                    path: outcome.path.clone(),
                });
            }
            if let Some(error) = outcome.error {
                failures.push(PathFailure {
                    path: outcome.path,
                    error,
                });
            }
        }

        if failures.is_empty() {
            info!(series = discovery.len(), "Series discovery complete");
            Ok(discovery)
        } else {
            warn!(
                series = discovery.len(),
                failed = failures.len(),
                "Series discovery incomplete"
            );
            Err(PartialDiscovery {
                discovery,
                failures,
            })
        }
    }

    async fn run_listing(&self, listing: Listing) -> ListingOutcome {
        let mut stream = self
            .fetcher
            .fetch(FetchRequest::new(EntityKind::Series, listing.filter()));
        let mut entries = Vec::new();
        let mut error = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(listing = %listing, error = %err, "Series listing failed");
                    error = Some(err);
                    break;
                }
            }
        }

        debug!(
            listing = %listing,
            found = entries.len(),
            pages = stream.stats().pages,
            "Series listing finished"
        );
        ListingOutcome { entries, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::domain::Category;
    use crate::error::TransportError;
    use crate::testkit::catalog::{Script, ScriptedCatalog};
    use crate::testkit::domain::series;

    fn aggregator(catalog: ScriptedCatalog, cap: usize) -> (CategoryAggregator, Arc<ScriptedCatalog>) {
        let catalog = Arc::new(catalog);
        let settings = FetchConfig {
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
            retry_backoff_cap_ms: 0,
            ..FetchConfig::default()
        };
        let fetcher = PaginatedFetcher::new(catalog.clone(), settings);
        (
            CategoryAggregator::new(fetcher, Arc::new(TickerClassifier::standard()), cap),
            catalog,
        )
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    // -------------------------------------------------------------------------
    // Merge
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn category_and_keyword_paths_are_unioned_without_duplicates() {
        let catalog = ScriptedCatalog::new()
            .route(
                EntityKind::Series,
                "Sports",
                Script::new().page(
                    vec![series("KXNFLGAME", "Sports"), series("KXNBAGAME", "Sports")],
                    false,
                ),
            )
            .route(
                EntityKind::Series,
                "",
                Script::new().page(
                    vec![series("KXNFLGAME", "Sports"), series("KXCPI", "Economics")],
                    false,
                ),
            );
        let (aggregator, _) = aggregator(catalog, 2);

        let discovery = aggregator
            .discover(&[CatalogCategory::Sports], &keywords(&["nfl"]))
            .await
            .unwrap();

        assert_eq!(discovery.identifiers(), vec!["KXNFLGAME", "KXNBAGAME"]);
        assert_eq!(
            discovery.series[0].path,
            DiscoveryPath::Category(CatalogCategory::Sports)
        );
        assert_eq!(discovery.series[0].classification.category, Category::Nfl);
    }

    #[tokio::test]
    async fn blank_keywords_are_skipped() {
        let (aggregator, catalog) = aggregator(ScriptedCatalog::new(), 1);

        let discovery = aggregator.discover(&[], &keywords(&["  ", ""])).await.unwrap();

        assert!(discovery.is_empty());
        assert_eq!(catalog.request_count(), 0);
    }

    // -------------------------------------------------------------------------
    // Failure
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn failed_path_still_returns_other_paths() {
        let catalog = ScriptedCatalog::new()
            .route(
                EntityKind::Series,
                "Sports",
                Script::new().page(vec![series("KXNFLGAME", "Sports")], false),
            )
            .route(
                EntityKind::Series,
                "Crypto",
                Script::new().error(TransportError::Status {
                    status: 400,
                    body: "bad".into(),
                }),
            );
        let (aggregator, _) = aggregator(catalog, 2);

        let partial = aggregator
            .discover(&[CatalogCategory::Sports, CatalogCategory::Crypto], &[])
            .await
            .unwrap_err();

        assert_eq!(partial.discovery.identifiers(), vec!["KXNFLGAME"]);
        assert_eq!(partial.failures.len(), 1);
        assert_eq!(
            partial.failures[0].path,
            DiscoveryPath::Category(CatalogCategory::Crypto)
        );
        assert!(!partial.is_cancelled());
    }

    #[tokio::test]
    async fn failed_shared_listing_fails_every_keyword_path() {
        let catalog = ScriptedCatalog::new().route(
            EntityKind::Series,
            "",
            Script::new()
                .page(vec![series("KXNFLGAME", "Sports")], true)
                .error(TransportError::Status {
                    status: 400,
                    body: "bad".into(),
                }),
        );
        let (aggregator, catalog) = aggregator(catalog, 2);

        let partial = aggregator
            .discover(&[], &keywords(&["NFL", "NBA"]))
            .await
            .unwrap_err();

        assert_eq!(partial.discovery.identifiers(), vec!["KXNFLGAME"]);
        let failed: Vec<&DiscoveryPath> = partial.failures.iter().map(|f| &f.path).collect();
        assert_eq!(
            failed,
            vec![
                &DiscoveryPath::Keyword("NFL".to_string()),
                &DiscoveryPath::Keyword("NBA".to_string())
            ]
        );
        assert_eq!(catalog.request_count(), 2);
    }
}
