//! Exchange-agnostic domain types: catalog entries, metrics, rankings,
//! ticker classifications and the records written out for them.

pub mod category;
pub mod classification;
pub mod entry;
pub mod metric;
pub mod ranked;
pub mod record;

pub use category::CatalogCategory;
pub use classification::{Category, ClassificationResult, League, TeamPair, TickerMetadata};
pub use entry::{CatalogEntry, CatalogEntryBuilder, EntityKind, EntryStatus};
pub use metric::Metric;
pub use ranked::RankedEntry;
pub use record::{ClassifiedRow, EventRecord, MarketRecord, RankedRow, SeriesRecord};
