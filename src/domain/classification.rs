//! Ticker classification results.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Soccer competitions with dedicated game series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    Epl,
    LaLiga,
    Bundesliga,
    SerieA,
    Ligue1,
    Mls,
    Ucl,
    Uel,
    Uecl,
    Fifa,
    Eredivisie,
    LigaPortugal,
    ScottishPrem,
}

impl League {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Epl => "EPL",
            Self::LaLiga => "LALIGA",
            Self::Bundesliga => "BUNDESLIGA",
            Self::SerieA => "SERIEA",
            Self::Ligue1 => "LIGUE1",
            Self::Mls => "MLS",
            Self::Ucl => "UCL",
            Self::Uel => "UEL",
            Self::Uecl => "UECL",
            Self::Fifa => "FIFA",
            Self::Eredivisie => "EREDIVISIE",
            Self::LigaPortugal => "LIGAPORTUGAL",
            Self::ScottishPrem => "SCOTTISHPREM",
        }
    }
}

/// Domain category assigned to a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Nfl,
    Nba,
    Ncaaf,
    Soccer(League),
    /// Sports content outside the leagues above.
    Other,
    Unclassified,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nfl => f.write_str("NFL"),
            Self::Nba => f.write_str("NBA"),
            Self::Ncaaf => f.write_str("NCAAF"),
            Self::Soccer(league) => write!(f, "SOCCER_{}", league.code()),
            Self::Other => f.write_str("OTHER"),
            Self::Unclassified => f.write_str("UNCLASSIFIED"),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Team codes in ticker order: the away side first, the home side second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TeamPair {
    pub away: String,
    pub home: String,
}

impl TeamPair {
    #[must_use]
    pub fn new(away: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            away: away.into(),
            home: home.into(),
        }
    }
}

/// Context the classifier may consult when the identifier alone is not enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickerMetadata<'a> {
    /// Parent identifier (series ticker for events, event ticker for markets).
    pub parent: Option<&'a str>,
    /// Series category as reported by the catalog, e.g. `Sports`.
    pub category: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub teams: Option<TeamPair>,
    pub date: Option<NaiveDate>,
    /// `true` when a strict structural rule matched, `false` for keyword hits.
    pub confident: bool,
}

impl ClassificationResult {
    #[must_use]
    pub const fn unclassified() -> Self {
        Self {
            category: Category::Unclassified,
            teams: None,
            date: None,
            confident: false,
        }
    }

    #[must_use]
    pub const fn keyword(category: Category) -> Self {
        Self {
            category,
            teams: None,
            date: None,
            confident: false,
        }
    }

    /// A strict rule matched but the date token could not be read.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.confident && self.date.is_none()
    }
}
