//! Scripted [`CatalogSource`] for tests.
//!
//! Each listing key (entity kind plus parent or category) replays its own
//! script of pages, transport errors and stalls. Unscripted keys fall back to
//! the default script; once a script runs dry the catalog answers with an
//! empty last page.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{CatalogEntry, EntityKind};
use crate::error::TransportError;
use crate::port::{CatalogSource, Cursor, Page, PageQuery};

#[derive(Debug, Clone)]
enum Step {
    Page(Vec<CatalogEntry>, bool),
    Error(TransportError),
    Stall,
}

/// Ordered responses for one listing.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: VecDeque<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `entries` into pages of `page_size`; every page but the last
    /// carries a cursor.
    pub fn paged(entries: Vec<CatalogEntry>, page_size: usize) -> Self {
        let mut script = Self::new();
        let chunks: Vec<Vec<CatalogEntry>> = entries
            .chunks(page_size.max(1))
            .map(<[CatalogEntry]>::to_vec)
            .collect();
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            script = script.page(chunk, i + 1 < total);
        }
        script
    }

    pub fn page(mut self, entries: Vec<CatalogEntry>, has_more: bool) -> Self {
        self.steps.push_back(Step::Page(entries, has_more));
        self
    }

    pub fn error(mut self, err: TransportError) -> Self {
        self.steps.push_back(Step::Error(err));
        self
    }

    /// A request that never completes; only cancellation gets past it.
    pub fn stall(mut self) -> Self {
        self.steps.push_back(Step::Stall);
        self
    }
}

/// One recorded page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub kind: EntityKind,
    pub key: String,
    pub cursor: Option<String>,
    pub limit: usize,
}

pub struct ScriptedCatalog {
    default: Mutex<Script>,
    routes: Mutex<HashMap<(EntityKind, String), Script>>,
    log: Mutex<Vec<RecordedQuery>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cursor_seq: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self {
            default: Mutex::new(Script::new()),
            routes: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
            latency: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            cursor_seq: AtomicUsize::new(0),
        }
    }

    /// Default script serving `entries` in pages of `page_size`.
    pub fn paged(entries: Vec<CatalogEntry>, page_size: usize) -> Self {
        Self::new().with_default(Script::paged(entries, page_size))
    }

    pub fn with_default(self, script: Script) -> Self {
        *lock(&self.default) = script;
        self
    }

    /// Script for listings of `kind` whose parent or category equals `key`.
    ///
    /// Use `""` for listings with neither.
    pub fn route(self, kind: EntityKind, key: &str, script: Script) -> Self {
        lock(&self.routes).insert((kind, key.to_string()), script);
        self
    }

    /// Delay every response, to make concurrent requests overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn then_page(self, entries: Vec<CatalogEntry>, has_more: bool) -> Self {
        {
            let mut script = lock(&self.default);
            script.steps.push_back(Step::Page(entries, has_more));
        }
        self
    }

    pub fn then_error(self, err: TransportError) -> Self {
        lock(&self.default).steps.push_back(Step::Error(err));
        self
    }

    pub fn then_stall(self) -> Self {
        lock(&self.default).steps.push_back(Step::Stall);
        self
    }

    pub fn request_count(&self) -> usize {
        lock(&self.log).len()
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        lock(&self.log).clone()
    }

    /// Highest number of requests observed in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn key_for(query: &PageQuery<'_>) -> String {
        if let Some(parent) = &query.filter.parent {
            return parent.clone();
        }
        if let Some(category) = query.filter.category {
            return category.api_name().to_string();
        }
        String::new()
    }

    fn next_step(&self, kind: EntityKind, key: &str) -> Option<Step> {
        let mut routes = lock(&self.routes);
        if let Some(script) = routes.get_mut(&(kind, key.to_string())) {
            return script.steps.pop_front();
        }
        drop(routes);
        lock(&self.default).steps.pop_front()
    }
}

impl Default for ScriptedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn list_entries(&self, query: PageQuery<'_>) -> Result<Page, TransportError> {
        let key = Self::key_for(&query);
        lock(&self.log).push(RecordedQuery {
            kind: query.kind,
            key: key.clone(),
            cursor: query.cursor.map(|c| c.as_str().to_string()),
            limit: query.limit,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_step(query.kind, &key) {
            Some(Step::Page(entries, has_more)) => {
                let cursor = if has_more {
                    let seq = self.cursor_seq.fetch_add(1, Ordering::SeqCst);
                    Cursor::from_token(format!("cursor-{seq}"))
                } else {
                    None
                };
                Ok(Page::new(entries, cursor))
            }
            Some(Step::Error(err)) => Err(err),
            Some(Step::Stall) => {
                std::future::pending::<()>().await;
                Err(TransportError::Timeout)
            }
            None => Ok(Page::last(Vec::new())),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
