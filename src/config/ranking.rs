//! Top-K ranking settings.

use serde::Deserialize;

use crate::domain::Metric;

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Number of entries kept per metric.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Metrics ranked in a single pass over the catalog.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

const fn default_top_k() -> usize {
    1000
}

fn default_metrics() -> Vec<Metric> {
    vec![Metric::Volume, Metric::Volume24h]
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            metrics: default_metrics(),
        }
    }
}
