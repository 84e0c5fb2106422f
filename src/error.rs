//! Error types for the crate.
//!
//! Transport failures are recovered inside the paginated fetcher. Everything
//! that escapes it is either a [`FetchError`] that ended one stream, or a
//! partial-result error carrying the data gathered before the failure.

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown catalog category '{0}'")]
    UnknownCategory(String),

    #[error("unknown metric '{0}' (expected one of: volume, volume_24h, open_interest, liquidity)")]
    UnknownMetric(String),

    #[error("unknown status '{0}' (expected one of: open, closed, settled)")]
    UnknownStatus(String),

    #[error("invalid classifier table: {0}")]
    ClassifierTable(String),

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A single failed request against the catalog API.
///
/// The fetcher retries transient variants; everything else fails the page
/// on the first attempt.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("rate limited by catalog API")]
    RateLimited,

    #[error("catalog API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode catalog response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) | Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::Other(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Abnormal end of an entry stream.
///
/// Clean exhaustion is not an error: the stream simply ends.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("fetch failed on page {page} after {attempts} attempt(s): {source}")]
    FetchFailed {
        /// One-based page number that could not be fetched.
        page: usize,
        /// Number of attempts made for that page.
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Selection(#[from] Box<crate::application::selector::PartialSelection>),

    #[error(transparent)]
    Discovery(#[from] Box<crate::application::aggregator::PartialDiscovery>),

    #[error(transparent)]
    Sweep(#[from] Box<crate::application::sweep::PartialSweep>),
}

pub type Result<T> = std::result::Result<T, Error>;
