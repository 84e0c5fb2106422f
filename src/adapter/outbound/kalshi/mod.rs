//! Kalshi trade API v2 integration.
//!
//! Only the public market-data listings are used: `/markets`, `/events` and
//! `/series`. No request is authenticated.

pub mod client;
pub mod dto;

pub use client::KalshiClient;
