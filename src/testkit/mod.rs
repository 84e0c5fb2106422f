//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`catalog`] - [`ScriptedCatalog`](catalog::ScriptedCatalog), a
//!   [`CatalogSource`](crate::port::CatalogSource) that replays scripted
//!   pages, transport errors and stalls.
//! - [`domain`] - Builders for markets, events and series.

pub mod catalog;
pub mod domain;
