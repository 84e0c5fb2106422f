//! Catalog port: the paginated listing endpoint the fetcher drives.
//!
//! Implementations own transport and authentication. They answer exactly one
//! page per call and never retry; retries live in the fetcher.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;

use crate::domain::{CatalogCategory, CatalogEntry, EntityKind, EntryStatus};
use crate::error::TransportError;

/// Opaque continuation token returned with a page.
///
/// Only meaningful for the request that produced it; it is passed back
/// verbatim and never inspected.
#[derive(Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a token received from the API. Empty tokens mean "no more pages".
    #[must_use]
    pub(crate) fn from_token(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor(<{} bytes>)", self.0.len())
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct Page {
    pub entries: Vec<CatalogEntry>,
    /// Absent on the last page.
    pub cursor: Option<Cursor>,
}

impl Page {
    #[must_use]
    pub const fn new(entries: Vec<CatalogEntry>, cursor: Option<Cursor>) -> Self {
        Self { entries, cursor }
    }

    #[must_use]
    pub const fn last(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            cursor: None,
        }
    }
}

/// Server-side filter applied to every page of a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Allowed statuses; empty means any.
    pub statuses: BTreeSet<EntryStatus>,
    /// Containing entity (series ticker for events, event ticker for markets).
    pub parent: Option<String>,
    /// Series category (series listings only).
    pub category: Option<CatalogCategory>,
    /// Series tags (series listings only).
    pub tags: Option<String>,
}

impl CatalogFilter {
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = EntryStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: CatalogCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Whether an entry passes the status part of the filter.
    ///
    /// Series have no lifecycle status, and entries whose status the API did
    /// not report were already filtered server-side; both pass.
    #[must_use]
    pub fn admits(&self, entry: &CatalogEntry) -> bool {
        self.statuses.is_empty()
            || entry.kind() == EntityKind::Series
            || entry.status() == EntryStatus::Unknown
            || self.statuses.contains(&entry.status())
    }
}

/// Everything needed to request a single page.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery<'a> {
    pub kind: EntityKind,
    pub filter: &'a CatalogFilter,
    pub cursor: Option<&'a Cursor>,
    pub limit: usize,
}

/// A remote catalog that lists entries one page at a time.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Request one page.
    async fn list_entries(&self, query: PageQuery<'_>) -> Result<Page, TransportError>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_end_of_catalog() {
        assert!(Cursor::from_token("").is_none());
        assert_eq!(Cursor::from_token("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn cursor_debug_hides_token() {
        let cursor = Cursor::from_token("secret-token").unwrap();
        assert!(!format!("{cursor:?}").contains("secret"));
    }

    #[test]
    fn filter_admits_any_status_when_empty() {
        let entry = CatalogEntry::builder(EntityKind::Market, "M")
            .status(EntryStatus::Closed)
            .build();
        assert!(CatalogFilter::default().admits(&entry));
        assert!(!CatalogFilter::default()
            .with_statuses([EntryStatus::Open])
            .admits(&entry));
    }

    #[test]
    fn filter_passes_entries_without_a_status() {
        let open_only = CatalogFilter::default().with_statuses([EntryStatus::Open]);
        let series = CatalogEntry::builder(EntityKind::Series, "KXNFLGAME").build();
        let event = CatalogEntry::builder(EntityKind::Event, "KXNFLGAME-25JAN12KCBUF")
            .status(EntryStatus::Unknown)
            .build();

        assert!(open_only.admits(&series));
        assert!(open_only.admits(&event));
    }
}
