//! Ranked entries and their total order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::entry::CatalogEntry;
use super::metric::Metric;

/// A catalog entry together with the value it was ranked on.
///
/// Ordering is "better ranks greater": a higher value is greater, and among
/// equal values the lexicographically smaller identifier is greater. Sorting
/// descending therefore yields (value desc, identifier asc).
#[derive(Debug, Clone)]
pub struct RankedEntry {
    entry: Arc<CatalogEntry>,
    metric: Metric,
    value: f64,
}

impl RankedEntry {
    #[must_use]
    pub const fn new(entry: Arc<CatalogEntry>, metric: Metric, value: f64) -> Self {
        Self {
            entry,
            metric,
            value,
        }
    }

    #[must_use]
    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        self.entry.identifier()
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedEntry {}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| other.identifier().cmp(self.identifier()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::EntityKind;

    fn ranked(id: &str, value: f64) -> RankedEntry {
        let entry = CatalogEntry::builder(EntityKind::Market, id).build();
        RankedEntry::new(Arc::new(entry), Metric::Volume, value)
    }

    #[test]
    fn higher_value_ranks_greater() {
        assert!(ranked("B", 10.0) > ranked("A", 5.0));
    }

    #[test]
    fn ties_prefer_smaller_identifier() {
        assert!(ranked("A", 5.0) > ranked("B", 5.0));
    }

    #[test]
    fn descending_sort_is_value_desc_then_id_asc() {
        let mut rows = vec![
            ranked("C", 1.0),
            ranked("B", 3.0),
            ranked("A", 3.0),
            ranked("D", 2.0),
        ];
        rows.sort_by(|a, b| b.cmp(a));
        let ids: Vec<_> = rows.iter().map(RankedEntry::identifier).collect();
        assert_eq!(ids, vec!["A", "B", "D", "C"]);
    }
}
