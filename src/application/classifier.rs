//! Ticker classification.
//!
//! Game tickers follow `{SERIES}-{YY}{MON}{DD}{AWAY}{HOME}`, optionally with
//! a market suffix: `KXNFLGAME-25JAN12KCBUF-KC`. A strict rule matches on the
//! series segment and reads the date and team codes from the event segment.
//! When no strict rule applies, an ordered keyword table is searched in the
//! series segment of the ticker and then of its parent.
//!
//! Classification is a pure function of its inputs.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Category, ClassificationResult, League, TeamPair, TickerMetadata};
use crate::error::ConfigError;

pub const NFL_TEAMS: &[&str] = &[
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAC", "KC", "LA", "LAC", "LV", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "PIT",
    "SEA", "SF", "TB", "TEN", "WAS",
];

pub const NBA_TEAMS: &[&str] = &[
    "ATL", "BOS", "BKN", "CHA", "CHI", "CLE", "DAL", "DEN", "DET", "GS", "HOU", "IND", "LAC",
    "LAL", "MEM", "MIA", "MIL", "MIN", "NO", "NY", "NYK", "OKC", "ORL", "PHI", "PHX", "POR",
    "SAC", "SA", "SAS", "TOR", "UTA", "WAS",
];

/// Two-letter codes seen as the leading team in college tickers.
const LEADING_TWO_LETTER_CODES: &[&str] = &["OH", "SJ", "TB", "NJ", "LA", "SF", "BC", "SC", "AC", "US"];

/// How the team run after the date token splits into `(away, home)`.
#[derive(Debug, Clone, Copy)]
pub enum TeamLayout {
    /// Both halves must be codes from the list; three-letter away codes are
    /// tried before two-letter ones.
    Known(&'static [&'static str]),
    /// The away code has a fixed width; the rest is the home code.
    FixedAway(usize),
    /// Length-based split for leagues too large to enumerate.
    Heuristic,
}

impl TeamLayout {
    fn split(&self, run: &str) -> Option<TeamPair> {
        match self {
            Self::Known(codes) => [3, 2].into_iter().find_map(|width| {
                let away = run.get(..width)?;
                let home = run.get(width..)?;
                (codes.contains(&away) && codes.contains(&home)).then(|| TeamPair::new(away, home))
            }),
            Self::FixedAway(width) => {
                let away = run.get(..*width)?;
                let home = run.get(*width..)?;
                (!home.is_empty()).then(|| TeamPair::new(away, home))
            }
            Self::Heuristic => heuristic_split(run),
        }
    }
}

fn heuristic_split(run: &str) -> Option<TeamPair> {
    let width = match run.len() {
        0..=3 => return None,
        4 => 2,
        5 | 6 => {
            let leading = run.get(..2)?;
            if LEADING_TWO_LETTER_CODES.contains(&leading) {
                2
            } else {
                3
            }
        }
        7 => 3,
        _ => 4,
    };
    Some(TeamPair::new(run.get(..width)?, run.get(width..)?))
}

/// Structural rule for one game series.
#[derive(Debug, Clone, Copy)]
pub struct StrictRule {
    /// Series segment, e.g. `KXNFLGAME`.
    pub series: &'static str,
    pub category: Category,
    pub layout: TeamLayout,
}

/// Fallback substring rule. [`Category::Unclassified`] marks a stop word
/// that shadows later keywords.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub category: Category,
}

const fn strict(series: &'static str, category: Category, layout: TeamLayout) -> StrictRule {
    StrictRule {
        series,
        category,
        layout,
    }
}

const fn soccer(series: &'static str, league: League) -> StrictRule {
    strict(series, Category::Soccer(league), TeamLayout::FixedAway(3))
}

const fn keyword(keyword: &'static str, category: Category) -> KeywordRule {
    KeywordRule { keyword, category }
}

pub const STANDARD_STRICT_RULES: &[StrictRule] = &[
    strict("KXNFLGAME", Category::Nfl, TeamLayout::Known(NFL_TEAMS)),
    strict("KXNBAGAME", Category::Nba, TeamLayout::Known(NBA_TEAMS)),
    strict("KXNCAAFGAME", Category::Ncaaf, TeamLayout::Heuristic),
    soccer("KXEPLGAME", League::Epl),
    soccer("KXLALIGAGAME", League::LaLiga),
    soccer("KXBUNDESLIGAGAME", League::Bundesliga),
    soccer("KXSERIEAGAME", League::SerieA),
    soccer("KXLIGUE1GAME", League::Ligue1),
    soccer("KXMLSGAME", League::Mls),
    soccer("KXUCLGAME", League::Ucl),
    soccer("KXUELGAME", League::Uel),
    soccer("KXUECLGAME", League::Uecl),
    soccer("KXFIFAGAME", League::Fifa),
    soccer("KXEREDIVISIEGAME", League::Eredivisie),
    soccer("KXLIGAPORTUGALGAME", League::LigaPortugal),
    soccer("KXSCOTTISHPREMGAME", League::ScottishPrem),
];

/// Ordered: women's series and stop words before the league keywords they
/// contain, specific leagues before generic sports words.
pub const STANDARD_KEYWORD_RULES: &[KeywordRule] = &[
    keyword("INFLATION", Category::Unclassified),
    keyword("WNBA", Category::Other),
    keyword("NCAAWB", Category::Other),
    keyword("NCAAF", Category::Ncaaf),
    keyword("NFL", Category::Nfl),
    keyword("NBA", Category::Nba),
    keyword("EPL", Category::Soccer(League::Epl)),
    keyword("LALIGA", Category::Soccer(League::LaLiga)),
    keyword("BUNDESLIGA", Category::Soccer(League::Bundesliga)),
    keyword("SERIEA", Category::Soccer(League::SerieA)),
    keyword("LIGUE1", Category::Soccer(League::Ligue1)),
    keyword("MLS", Category::Soccer(League::Mls)),
    keyword("UECL", Category::Soccer(League::Uecl)),
    keyword("UCL", Category::Soccer(League::Ucl)),
    keyword("UEL", Category::Soccer(League::Uel)),
    keyword("FIFA", Category::Soccer(League::Fifa)),
    keyword("EREDIVISIE", Category::Soccer(League::Eredivisie)),
    keyword("LIGAPORTUGAL", Category::Soccer(League::LigaPortugal)),
    keyword("SCOTTISHPREM", Category::Soccer(League::ScottishPrem)),
    keyword("SOCCER", Category::Other),
    keyword("NCAA", Category::Other),
    keyword("MLB", Category::Other),
    keyword("NHL", Category::Other),
    keyword("UFC", Category::Other),
    keyword("MMA", Category::Other),
    keyword("PGA", Category::Other),
    keyword("GOLF", Category::Other),
    keyword("ATP", Category::Other),
    keyword("TENNIS", Category::Other),
    keyword("HOCKEY", Category::Other),
    keyword("BASEBALL", Category::Other),
    keyword("BASKETBALL", Category::Other),
    keyword("FOOTBALL", Category::Other),
];

/// Maps tickers to categories with an ordered strict table and a keyword table.
#[derive(Debug, Clone)]
pub struct TickerClassifier {
    strict: Vec<StrictRule>,
    keywords: Vec<KeywordRule>,
}

impl TickerClassifier {
    /// Build a classifier, rejecting empty, lowercase or duplicate entries.
    #[allow(clippy::result_large_err)]
    pub fn new(strict: Vec<StrictRule>, keywords: Vec<KeywordRule>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &strict {
            check_token("series", rule.series)?;
            if !seen.insert(rule.series) {
                return Err(ConfigError::ClassifierTable(format!(
                    "duplicate series '{}'",
                    rule.series
                )));
            }
            if let TeamLayout::FixedAway(0) = rule.layout {
                return Err(ConfigError::ClassifierTable(format!(
                    "series '{}' has a zero-width away code",
                    rule.series
                )));
            }
        }

        let mut seen = HashSet::new();
        for rule in &keywords {
            check_token("keyword", rule.keyword)?;
            if !seen.insert(rule.keyword) {
                return Err(ConfigError::ClassifierTable(format!(
                    "duplicate keyword '{}'",
                    rule.keyword
                )));
            }
        }

        Ok(Self { strict, keywords })
    }

    /// The built-in NFL, NBA, college football and soccer tables.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            strict: STANDARD_STRICT_RULES.to_vec(),
            keywords: STANDARD_KEYWORD_RULES.to_vec(),
        }
    }

    #[must_use]
    pub fn classify(&self, identifier: &str, metadata: TickerMetadata<'_>) -> ClassificationResult {
        let ticker = identifier.trim().to_ascii_uppercase();
        let mut segments = ticker.split('-');
        let series = segments.next().unwrap_or_default();
        let event = segments.next().unwrap_or_default();

        if let Some(rule) = self.strict.iter().find(|r| r.series == series) {
            if !event.is_empty() {
                let result = apply_strict(rule, event);
                if result.is_degraded() {
                    debug!(identifier, "Ticker date token unreadable");
                }
                return result;
            }
        }

        let parent = metadata
            .parent
            .map(|p| p.trim().to_ascii_uppercase())
            .unwrap_or_default();
        let parent_series = parent.split('-').next().unwrap_or_default();

        for haystack in [series, parent_series] {
            if haystack.is_empty() {
                continue;
            }
            if let Some(rule) = self.keywords.iter().find(|r| haystack.contains(r.keyword)) {
                return match rule.category {
                    Category::Unclassified => ClassificationResult::unclassified(),
                    category => ClassificationResult::keyword(category),
                };
            }
        }

        if metadata
            .category
            .is_some_and(|c| c.trim().eq_ignore_ascii_case("sports"))
        {
            return ClassificationResult::keyword(Category::Other);
        }

        ClassificationResult::unclassified()
    }
}

impl Default for TickerClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

#[allow(clippy::result_large_err)]
fn check_token(kind: &str, token: &str) -> Result<(), ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::ClassifierTable(format!("empty {kind}")));
    }
    if token.chars().any(|c| !c.is_ascii_uppercase() && !c.is_ascii_digit()) {
        return Err(ConfigError::ClassifierTable(format!(
            "{kind} '{token}' must be uppercase ASCII"
        )));
    }
    Ok(())
}

fn apply_strict(rule: &StrictRule, event: &str) -> ClassificationResult {
    let (date, team_run) = match event.get(..7).filter(|t| is_date_shaped(t)) {
        Some(token) => (parse_date_token(token), event.get(7..).unwrap_or_default()),
        None => (None, trailing_letters(event)),
    };

    ClassificationResult {
        category: rule.category,
        teams: rule.layout.split(team_run),
        date,
        confident: true,
    }
}

/// `YYMONDD`: two digits, three letters, two digits.
fn is_date_shaped(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 7
        && b[..2].iter().all(u8::is_ascii_digit)
        && b[2..5].iter().all(u8::is_ascii_alphabetic)
        && b[5..].iter().all(u8::is_ascii_digit)
}

/// Letters after the last digit; where the teams sit when the date token is
/// the wrong length.
fn trailing_letters(event: &str) -> &str {
    match event.rfind(|c: char| c.is_ascii_digit()) {
        Some(pos) => event.get(pos + 1..).unwrap_or_default(),
        None => event,
    }
}

fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let year: i32 = token.get(..2)?.parse().ok()?;
    let month = match token.get(2..5)? {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let day: u32 = token.get(5..7)?.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}
