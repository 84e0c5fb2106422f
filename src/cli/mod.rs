//! Command-line interface definitions.

pub mod check;
pub mod classify;
pub mod discover;
pub mod output;
pub mod sweep;
pub mod top;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::adapter::outbound::kalshi::KalshiClient;
use crate::application::PaginatedFetcher;
use crate::config::Config;
use crate::domain::{CatalogCategory, EntryStatus, Metric};
use crate::error::Result;
use crate::port::CatalogSource;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Catalog scout - discover, rank and classify prediction-market listings.
#[derive(Parser, Debug)]
#[command(name = "catalog-scout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank markets by one or more metrics
    Top(TopArgs),

    /// Discover series by category and keyword
    Discover(DiscoverArgs),

    /// Classify tickers without contacting the catalog
    Classify(ClassifyArgs),

    /// Walk series, events and markets, classifying every market
    Sweep(SweepArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `catalog-scout check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Arguments for the `top` subcommand.
#[derive(Parser, Debug)]
pub struct TopArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Number of markets to keep per metric
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Comma-separated metrics (volume, volume_24h, open_interest, liquidity)
    #[arg(long, value_delimiter = ',')]
    pub metrics: Vec<Metric>,

    /// Comma-separated statuses (open, closed, settled)
    #[arg(long, value_delimiter = ',')]
    pub statuses: Vec<EntryStatus>,

    /// Override the configured page size
    #[arg(long)]
    pub page_size: Option<usize>,
}

/// Arguments for the `discover` subcommand.
#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Comma-separated series categories, e.g. "Sports,Climate and Weather"
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<CatalogCategory>,

    /// Comma-separated ticker keywords
    #[arg(long, value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Skip keyword paths entirely
    #[arg(long)]
    pub no_keywords: bool,
}

impl DiscoverArgs {
    #[must_use]
    pub fn categories(&self, config: &Config) -> Vec<CatalogCategory> {
        if self.categories.is_empty() {
            config.discovery.categories.clone()
        } else {
            self.categories.clone()
        }
    }

    #[must_use]
    pub fn keywords(&self, config: &Config) -> Vec<String> {
        if self.no_keywords {
            Vec::new()
        } else if self.keywords.is_empty() {
            config.discovery.keywords.clone()
        } else {
            self.keywords.clone()
        }
    }
}

/// Arguments for the `classify` subcommand.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Tickers to classify; read one per line from stdin when omitted
    pub tickers: Vec<String>,

    /// Parent identifier consulted by the keyword fallback
    #[arg(long)]
    pub parent: Option<String>,

    /// Series category, e.g. "Sports"
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `sweep` subcommand.
#[derive(Parser, Debug)]
pub struct SweepArgs {
    /// Comma-separated series tickers; discovered when omitted
    #[arg(long, value_delimiter = ',')]
    pub series: Vec<String>,

    /// Comma-separated statuses (open, closed, settled)
    #[arg(long, value_delimiter = ',')]
    pub statuses: Vec<EntryStatus>,

    #[command(flatten)]
    pub discover: DiscoverArgs,
}

/// How a command ended, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    /// Finished cleanly with nothing to report.
    Empty,
    /// Some listings failed or the run was cancelled; output is incomplete.
    Partial,
}

impl Outcome {
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Complete | Self::Empty => 0,
            Self::Partial => 2,
        }
    }
}

/// Load the config file; a missing default file means built-in defaults.
#[allow(clippy::result_large_err)]
pub fn load_config(path: &Path) -> Result<Config> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Config::parse("");
    }
    Config::load(path)
}

/// Fetcher over the configured Kalshi API.
#[must_use]
pub fn catalog_fetcher(config: &Config, cancel: CancellationToken) -> PaginatedFetcher {
    let source: Arc<dyn CatalogSource> = Arc::new(KalshiClient::from_config(&config.catalog));
    PaginatedFetcher::new(source, config.fetch.clone()).with_cancellation(cancel)
}

/// Statuses from the command line, or the configured ones.
#[must_use]
pub fn statuses_or_default(given: &[EntryStatus], config: &Config) -> Vec<EntryStatus> {
    if given.is_empty() {
        config.fetch.statuses.clone()
    } else {
        given.to_vec()
    }
}
