//! Discovery use cases built on the [`CatalogSource`](crate::port::CatalogSource) port.

pub mod aggregator;
pub mod classifier;
pub mod fetcher;
pub mod selector;
pub mod sweep;

pub use aggregator::{CategoryAggregator, Discovery, DiscoveryPath, PartialDiscovery};
pub use classifier::TickerClassifier;
pub use fetcher::{EntryStream, FetchRequest, FetchStats, PaginatedFetcher};
pub use selector::{select_top_k, select_top_k_by, PartialSelection, Ranking, TopK};
pub use sweep::{MarketSweep, PartialSweep, SweepReport};
