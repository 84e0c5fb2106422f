//! Series categories recognised by the catalog.
//!
//! Category filters are parsed into this enum when configuration is loaded,
//! so a misspelled category fails at startup instead of silently returning
//! an empty series list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogCategory {
    Sports,
    Crypto,
    Politics,
    Economics,
    Financials,
    ClimateAndWeather,
    Companies,
    Entertainment,
    Elections,
    ScienceAndTechnology,
    Health,
    World,
    Social,
    Transportation,
    Mentions,
}

impl CatalogCategory {
    pub const ALL: [Self; 15] = [
        Self::Sports,
        Self::Crypto,
        Self::Politics,
        Self::Economics,
        Self::Financials,
        Self::ClimateAndWeather,
        Self::Companies,
        Self::Entertainment,
        Self::Elections,
        Self::ScienceAndTechnology,
        Self::Health,
        Self::World,
        Self::Social,
        Self::Transportation,
        Self::Mentions,
    ];

    /// Name used by the catalog API.
    #[must_use]
    pub const fn api_name(&self) -> &'static str {
        match self {
            Self::Sports => "Sports",
            Self::Crypto => "Crypto",
            Self::Politics => "Politics",
            Self::Economics => "Economics",
            Self::Financials => "Financials",
            Self::ClimateAndWeather => "Climate and Weather",
            Self::Companies => "Companies",
            Self::Entertainment => "Entertainment",
            Self::Elections => "Elections",
            Self::ScienceAndTechnology => "Science and Technology",
            Self::Health => "Health",
            Self::World => "World",
            Self::Social => "Social",
            Self::Transportation => "Transportation",
            Self::Mentions => "Mentions",
        }
    }
}

impl fmt::Display for CatalogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for CatalogCategory {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.api_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for CatalogCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
