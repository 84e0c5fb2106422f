//! Series discovery settings.

use serde::Deserialize;

use crate::domain::CatalogCategory;

/// Ticker keywords that mark a series as sports-related.
pub const SPORTS_KEYWORDS: [&str; 20] = [
    "NFL",
    "NBA",
    "MLB",
    "NHL",
    "MLS",
    "UFC",
    "PGA",
    "ATP",
    "NCAA",
    "EPL",
    "FIFA",
    "WNBA",
    "MMA",
    "GOLF",
    "TENNIS",
    "SOCCER",
    "HOCKEY",
    "BASEBALL",
    "BASKETBALL",
    "FOOTBALL",
];

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Category paths; each becomes one series listing.
    #[serde(default = "default_categories")]
    pub categories: Vec<CatalogCategory>,
    /// Keyword paths; each scans the series list for tickers containing it.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Cap on discovery paths in flight at once.
    #[serde(default = "default_max_concurrent_paths")]
    pub max_concurrent_paths: usize,
}

fn default_categories() -> Vec<CatalogCategory> {
    vec![CatalogCategory::Sports]
}

fn default_keywords() -> Vec<String> {
    SPORTS_KEYWORDS.iter().map(|k| (*k).to_string()).collect()
}

const fn default_max_concurrent_paths() -> usize {
    4
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            keywords: default_keywords(),
            max_concurrent_paths: default_max_concurrent_paths(),
        }
    }
}
