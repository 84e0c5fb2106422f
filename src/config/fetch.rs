//! Pagination and retry settings.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::EntryStatus;

/// Settings shared by every paginated fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Page size hint sent as `limit`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Status filter applied to market and event listings.
    #[serde(default = "default_statuses", deserialize_with = "deserialize_statuses")]
    pub statuses: Vec<EntryStatus>,
    /// Total attempts per page, including the first.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Backoff before the first retry, doubled on each further retry.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Upper bound on a single backoff.
    #[serde(default = "default_retry_backoff_cap_ms")]
    pub retry_backoff_cap_ms: u64,
}

const fn default_page_size() -> usize {
    1000
}

fn default_statuses() -> Vec<EntryStatus> {
    vec![EntryStatus::Open]
}

const fn default_retry_max_attempts() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    500
}

const fn default_retry_backoff_cap_ms() -> u64 {
    8_000
}

fn deserialize_statuses<'de, D>(deserializer: D) -> Result<Vec<EntryStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .collect()
}

impl FetchConfig {
    /// Backoff to wait after `attempt` (one-based) failed.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.retry_backoff_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.retry_backoff_cap_ms))
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            statuses: default_statuses(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_cap_ms: default_retry_backoff_cap_ms(),
        }
    }
}
