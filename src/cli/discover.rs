//! `discover`: list series found by category and keyword paths.

use std::io::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::output::{self, JsonLines};
use super::{catalog_fetcher, DiscoverArgs, Outcome};
use crate::application::{CategoryAggregator, Discovery, PartialDiscovery, TickerClassifier};
use crate::config::Config;
use crate::domain::{ClassifiedRow, SeriesRecord};

/// Run discovery with the command-line overrides applied.
pub async fn discover(
    config: &Config,
    args: &DiscoverArgs,
    cancel: CancellationToken,
) -> Result<Discovery, PartialDiscovery> {
    let aggregator = CategoryAggregator::new(
        catalog_fetcher(config, cancel),
        Arc::new(TickerClassifier::standard()),
        config.discovery.max_concurrent_paths,
    );
    aggregator
        .discover(&args.categories(config), &args.keywords(config))
        .await
}

/// Print one line per failed path.
pub fn report_failures(partial: &PartialDiscovery) {
    for failure in &partial.failures {
        if failure.error.is_cancelled() {
            output::warn(&format!("{}: cancelled", failure.path));
        } else {
            output::error(&format!("fetch failed on {}: {}", failure.path, failure.error));
        }
    }
}

pub async fn execute(
    config: &Config,
    args: &DiscoverArgs,
    cancel: CancellationToken,
) -> anyhow::Result<Outcome> {
    let mut out = JsonLines::stdout();
    match discover(config, args, cancel).await {
        Ok(discovery) => {
            emit(&mut out, &discovery)?;
            out.finish()?;
            if discovery.is_empty() {
                output::warn("catalog empty: no series matched any path");
                return Ok(Outcome::Empty);
            }
            Ok(Outcome::Complete)
        }
        Err(partial) => {
            emit(&mut out, &partial.discovery)?;
            out.finish()?;
            report_failures(&partial);
            Ok(Outcome::Partial)
        }
    }
}

fn emit<W: Write>(out: &mut JsonLines<W>, discovery: &Discovery) -> std::io::Result<()> {
    for series in &discovery.series {
        out.write(&ClassifiedRow {
            record: SeriesRecord::from(&series.entry),
            classification: series.classification.clone(),
        })?;
    }
    Ok(())
}
