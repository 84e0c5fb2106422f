//! Rankable catalog metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// A numeric market field the selector can rank on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Lifetime contract volume.
    Volume,
    /// Contract volume over the trailing 24 hours.
    Volume24h,
    OpenInterest,
    Liquidity,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::Volume,
        Self::Volume24h,
        Self::OpenInterest,
        Self::Liquidity,
    ];

    /// Field name in catalog payloads.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Volume24h => "volume_24h",
            Self::OpenInterest => "open_interest",
            Self::Liquidity => "liquidity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.field() == wanted)
            .ok_or_else(|| ConfigError::UnknownMetric(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
