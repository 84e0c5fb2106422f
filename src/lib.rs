//! Catalog scout - discovery, ranking and classification of prediction-market
//! listings.
//!
//! The crate walks a cursor-paginated catalog (Kalshi trade API v2), ranks
//! markets by numeric metrics in bounded memory, and classifies tickers into
//! leagues, teams and game dates.
//!
//! # Architecture
//!
//! - **`port::CatalogSource`** - one page per call; the only seam to the API
//! - **`application::PaginatedFetcher`** - lazy entry stream with retries,
//!   deduplication, status filtering and cancellation
//! - **`application::selector`** - streaming top-K per metric
//! - **`application::TickerClassifier`** - strict ticker rules with keyword
//!   fallback
//! - **`application::CategoryAggregator`** - concurrent category and keyword
//!   series discovery
//! - **`application::MarketSweep`** - series, events, then markets
//!
//! # Modules
//!
//! - [`adapter`] - Kalshi REST client
//! - [`application`] - Discovery use cases
//! - [`cli`] - Command-line interface
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Entries, metrics, rankings, classifications and records
//! - [`error`] - Error types for the crate
//! - [`port`] - Catalog source trait
//!
//! # Features
//!
//! - `testkit` - Scripted catalog and entry builders for integration tests
//!
//! # Example
//!
//! ```
//! use catalog_scout::application::TickerClassifier;
//! use catalog_scout::domain::{Category, TickerMetadata};
//!
//! let classifier = TickerClassifier::standard();
//! let result = classifier.classify("KXNFLGAME-25JAN12KCBUF", TickerMetadata::default());
//! assert_eq!(result.category, Category::Nfl);
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
