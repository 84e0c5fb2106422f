//! Cursor-driven pagination over a [`CatalogSource`].
//!
//! [`PaginatedFetcher::fetch`] returns an [`EntryStream`]: a lazy, single-use
//! stream of catalog entries. A page is requested only when the consumer has
//! drained the previous one, so at most one request per stream is in flight.
//!
//! The stream ends cleanly when a page comes back empty or without a cursor.
//! It ends abnormally with exactly one error item: [`FetchError::FetchFailed`]
//! once a page has exhausted its retries, or [`FetchError::Cancelled`] once the
//! cancellation token fires.

use std::collections::{HashSet, VecDeque};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::domain::{CatalogEntry, EntityKind};
use crate::error::FetchError;
use crate::port::{CatalogFilter, CatalogSource, Cursor, Page, PageQuery};

/// What to list and how to filter it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub kind: EntityKind,
    pub filter: CatalogFilter,
    /// Overrides the configured page size for this fetch.
    pub page_size: Option<usize>,
}

impl FetchRequest {
    #[must_use]
    pub const fn new(kind: EntityKind, filter: CatalogFilter) -> Self {
        Self {
            kind,
            filter,
            page_size: None,
        }
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Counters for a single fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Page requests that returned a page (retries not counted).
    pub pages: usize,
    /// Entries handed to the consumer.
    pub yielded: usize,
    /// Boundary repeats dropped by deduplication.
    pub duplicates: usize,
    /// Entries dropped by the status filter.
    pub filtered: usize,
}

#[derive(Debug, Default)]
struct Counters {
    pages: AtomicUsize,
    yielded: AtomicUsize,
    duplicates: AtomicUsize,
    filtered: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> FetchStats {
        FetchStats {
            pages: self.pages.load(Ordering::Relaxed),
            yielded: self.yielded.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
        }
    }
}

/// Walks a catalog listing page by page.
///
/// The source handle is passed in explicitly; the fetcher keeps no global
/// client state.
#[derive(Clone)]
pub struct PaginatedFetcher {
    source: Arc<dyn CatalogSource>,
    settings: FetchConfig,
    cancel: CancellationToken,
}

impl PaginatedFetcher {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, settings: FetchConfig) -> Self {
        Self {
            source,
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a caller-owned cancellation token for every stream this fetcher creates.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &FetchConfig {
        &self.settings
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Start a new walk of the catalog.
    ///
    /// Nothing is requested until the returned stream is polled.
    #[must_use]
    pub fn fetch(&self, request: FetchRequest) -> EntryStream {
        let counters = Arc::new(Counters::default());
        let limit = request.page_size.unwrap_or(self.settings.page_size).max(1);
        let walk = Walk {
            source: Arc::clone(&self.source),
            settings: self.settings.clone(),
            cancel: self.cancel.clone(),
            kind: request.kind,
            filter: request.filter,
            limit,
            cursor: None,
            buffer: VecDeque::new(),
            previous_ids: HashSet::new(),
            page: 0,
            state: WalkState::NeedPage,
            counters: Arc::clone(&counters),
        };

        EntryStream {
            inner: stream::unfold(walk, Walk::step).boxed(),
            counters,
        }
    }
}

/// Lazy stream of entries from one fetch.
///
/// Consumed by value; a second pass needs a second [`PaginatedFetcher::fetch`].
pub struct EntryStream {
    inner: BoxStream<'static, Result<CatalogEntry, FetchError>>,
    counters: Arc<Counters>,
}

impl EntryStream {
    /// Counters so far; final once the stream has ended.
    #[must_use]
    pub fn stats(&self) -> FetchStats {
        self.counters.snapshot()
    }
}

impl Stream for EntryStream {
    type Item = Result<CatalogEntry, FetchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    /// Buffer drained, cursor says more pages exist.
    NeedPage,
    /// The buffered page is the last one.
    LastPage,
    Done,
}

struct Walk {
    source: Arc<dyn CatalogSource>,
    settings: FetchConfig,
    cancel: CancellationToken,
    kind: EntityKind,
    filter: CatalogFilter,
    limit: usize,
    cursor: Option<Cursor>,
    buffer: VecDeque<CatalogEntry>,
    previous_ids: HashSet<String>,
    page: usize,
    state: WalkState,
    counters: Arc<Counters>,
}

impl Walk {
    async fn step(mut self) -> Option<(Result<CatalogEntry, FetchError>, Self)> {
        loop {
            if self.state == WalkState::Done {
                return None;
            }
            if self.cancel.is_cancelled() {
                return Some(self.fail(FetchError::Cancelled));
            }
            if let Some(entry) = self.buffer.pop_front() {
                self.counters.yielded.fetch_add(1, Ordering::Relaxed);
                return Some((Ok(entry), self));
            }
            if self.state == WalkState::LastPage {
                self.state = WalkState::Done;
                let stats = self.counters.snapshot();
                info!(
                    source = self.source.source_name(),
                    kind = %self.kind,
                    pages = stats.pages,
                    entries = stats.yielded,
                    duplicates = stats.duplicates,
                    filtered = stats.filtered,
                    "Catalog fetch complete"
                );
                return None;
            }

            match self.request_page().await {
                Ok(page) => self.absorb(page),
                Err(err) => return Some(self.fail(err)),
            }
        }
    }

    fn fail(mut self, err: FetchError) -> (Result<CatalogEntry, FetchError>, Self) {
        self.state = WalkState::Done;
        self.buffer.clear();
        if err.is_cancelled() {
            info!(kind = %self.kind, page = self.page, "Catalog fetch cancelled");
        }
        (Err(err), self)
    }

    /// Load a page into the buffer, dropping boundary repeats and filtered entries.
    fn absorb(&mut self, page: Page) {
        self.counters.pages.fetch_add(1, Ordering::Relaxed);
        debug!(
            kind = %self.kind,
            page = self.page,
            entries = page.entries.len(),
            has_more = page.cursor.is_some(),
            "Fetched catalog page"
        );

        if page.entries.is_empty() {
            self.state = WalkState::LastPage;
            return;
        }

        let mut current_ids = HashSet::with_capacity(page.entries.len());
        for entry in page.entries {
            let id = entry.identifier();
            if self.previous_ids.contains(id) || current_ids.contains(id) {
                debug!(identifier = %id, page = self.page, "Dropping repeated entry");
                self.counters.duplicates.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            current_ids.insert(id.to_string());
            if !self.filter.admits(&entry) {
                self.counters.filtered.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            self.buffer.push_back(entry);
        }
        self.previous_ids = current_ids;

        self.cursor = page.cursor;
        self.state = if self.cursor.is_some() {
            WalkState::NeedPage
        } else {
            WalkState::LastPage
        };
    }

    async fn request_page(&mut self) -> Result<Page, FetchError> {
        self.page += 1;
        let max_attempts = self.settings.retry_max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let query = PageQuery {
                kind: self.kind,
                filter: &self.filter,
                cursor: self.cursor.as_ref(),
                limit: self.limit,
            };

            let result = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.source.list_entries(query) => result,
            };

            let err = match result {
                Ok(page) => return Ok(page),
                Err(err) => err,
            };

            if !err.is_transient() || attempt >= max_attempts {
                warn!(
                    kind = %self.kind,
                    page = self.page,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Catalog page request failed"
                );
                return Err(FetchError::FetchFailed {
                    page: self.page,
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = self.settings.backoff_for(attempt);
            warn!(
                kind = %self.kind,
                page = self.page,
                attempt,
                max_attempts,
                backoff_ms = delay.as_millis() as u64,
                error = %err,
                "Catalog page request failed, retrying"
            );
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(FetchError::Cancelled),
                () = sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryStatus;
    use crate::error::TransportError;
    use crate::testkit::catalog::ScriptedCatalog;
    use crate::testkit::domain::market;

    fn fast_settings() -> FetchConfig {
        FetchConfig {
            retry_backoff_ms: 1,
            retry_backoff_cap_ms: 2,
            ..Default::default()
        }
    }

    fn request() -> FetchRequest {
        FetchRequest::new(EntityKind::Market, CatalogFilter::default())
    }

    async fn drain(stream: &mut EntryStream) -> (Vec<String>, Option<FetchError>) {
        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(entry) => ids.push(entry.identifier().to_string()),
                Err(err) => return (ids, Some(err)),
            }
        }
        (ids, None)
    }

    // -------------------------------------------------------------------------
    // Termination
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn stops_on_missing_cursor() {
        let catalog = Arc::new(ScriptedCatalog::paged(
            (0..5).map(|i| market(&format!("M{i}"), 1.0)).collect(),
            2,
        ));
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let mut stream = fetcher.fetch(request());
        let (ids, err) = drain(&mut stream).await;

        assert!(err.is_none());
        assert_eq!(ids, vec!["M0", "M1", "M2", "M3", "M4"]);
        assert_eq!(catalog.request_count(), 3);
        assert_eq!(stream.stats().pages, 3);
    }

    #[tokio::test]
    async fn stops_on_empty_page_even_with_cursor() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .then_page(vec![market("A", 1.0)], true)
                .then_page(vec![], true)
                .then_page(vec![market("never", 1.0)], false),
        );
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let (ids, err) = drain(&mut fetcher.fetch(request())).await;

        assert!(err.is_none());
        assert_eq!(ids, vec!["A"]);
        assert_eq!(catalog.request_count(), 2);
    }

    #[tokio::test]
    async fn nothing_is_requested_until_polled() {
        let catalog = Arc::new(ScriptedCatalog::paged(vec![market("A", 1.0)], 10));
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let stream = fetcher.fetch(request());
        assert_eq!(catalog.request_count(), 0);
        drop(stream);
        assert_eq!(catalog.request_count(), 0);
    }

    // -------------------------------------------------------------------------
    // Deduplication and filtering
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn drops_boundary_repeat_from_next_page() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .then_page(vec![market("A", 1.0), market("B", 1.0)], true)
                .then_page(vec![market("B", 1.0), market("C", 1.0)], false),
        );
        let fetcher = PaginatedFetcher::new(catalog, fast_settings());

        let mut stream = fetcher.fetch(request());
        let (ids, _) = drain(&mut stream).await;

        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(stream.stats().duplicates, 1);
    }

    #[tokio::test]
    async fn status_filter_is_enforced_client_side() {
        let open = market("OPEN", 1.0);
        let settled = crate::testkit::domain::market_with_status("DONE", 1.0, EntryStatus::Settled);
        let catalog = Arc::new(ScriptedCatalog::new().then_page(vec![open, settled], false));
        let fetcher = PaginatedFetcher::new(catalog, fast_settings());

        let filter = CatalogFilter::default().with_statuses([EntryStatus::Open]);
        let mut stream = fetcher.fetch(FetchRequest::new(EntityKind::Market, filter));
        let (ids, _) = drain(&mut stream).await;

        assert_eq!(ids, vec!["OPEN"]);
        assert_eq!(stream.stats().filtered, 1);
    }

    // -------------------------------------------------------------------------
    // Retries
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn transient_failure_is_retried_invisibly() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .then_error(TransportError::Timeout)
                .then_error(TransportError::Status {
                    status: 502,
                    body: String::new(),
                })
                .then_page(vec![market("A", 1.0)], false),
        );
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let (ids, err) = drain(&mut fetcher.fetch(request())).await;

        assert!(err.is_none());
        assert_eq!(ids, vec!["A"]);
        assert_eq!(catalog.request_count(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_fetch_failed() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .then_page(vec![market("A", 1.0)], true)
                .then_error(TransportError::Timeout)
                .then_error(TransportError::Timeout)
                .then_error(TransportError::Timeout),
        );
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let (ids, err) = drain(&mut fetcher.fetch(request())).await;

        assert_eq!(ids, vec!["A"]);
        match err {
            Some(FetchError::FetchFailed { page, attempts, .. }) => {
                assert_eq!(page, 2);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
        assert_eq!(catalog.request_count(), 4);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let catalog = Arc::new(ScriptedCatalog::new().then_error(TransportError::Status {
            status: 400,
            body: "bad filter".into(),
        }));
        let fetcher = PaginatedFetcher::new(catalog.clone(), fast_settings());

        let (_, err) = drain(&mut fetcher.fetch(request())).await;

        assert!(matches!(err, Some(FetchError::FetchFailed { attempts: 1, .. })));
        assert_eq!(catalog.request_count(), 1);
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn cancellation_ends_stream_with_cancelled() {
        let catalog = Arc::new(
            ScriptedCatalog::new()
                .then_page(vec![market("A", 1.0), market("B", 1.0)], true)
                .then_page(vec![market("C", 1.0)], false),
        );
        let cancel = CancellationToken::new();
        let fetcher =
            PaginatedFetcher::new(catalog.clone(), fast_settings()).with_cancellation(cancel.clone());

        let mut stream = fetcher.fetch(request());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.identifier(), "A");

        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(FetchError::Cancelled))));
        assert!(stream.next().await.is_none());
        assert_eq!(catalog.request_count(), 1);
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let catalog = Arc::new(ScriptedCatalog::new().then_stall());
        let cancel = CancellationToken::new();
        let fetcher =
            PaginatedFetcher::new(catalog, fast_settings()).with_cancellation(cancel.clone());

        let mut stream = fetcher.fetch(request());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            cancel.cancel();
        });

        assert!(matches!(stream.next().await, Some(Err(FetchError::Cancelled))));
        canceller.await.unwrap();
    }
}
