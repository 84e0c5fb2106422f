//! `top`: rank markets by metric.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::output::{self, JsonLines};
use super::{catalog_fetcher, statuses_or_default, Outcome, TopArgs};
use crate::application::{select_top_k_by, FetchRequest, Ranking};
use crate::config::Config;
use crate::domain::{EntityKind, MarketRecord, RankedRow};
use crate::port::CatalogFilter;

pub async fn execute(
    config: &Config,
    args: &TopArgs,
    cancel: CancellationToken,
) -> anyhow::Result<Outcome> {
    let k = args.top_k.unwrap_or(config.ranking.top_k);
    let metrics = if args.metrics.is_empty() {
        config.ranking.metrics.clone()
    } else {
        args.metrics.clone()
    };
    let statuses = statuses_or_default(&args.statuses, config);

    let mut request = FetchRequest::new(
        EntityKind::Market,
        CatalogFilter::default().with_statuses(statuses),
    );
    if let Some(page_size) = args.page_size {
        request = request.with_page_size(page_size);
    }

    let fetcher = catalog_fetcher(config, cancel);
    let mut stream = fetcher.fetch(request);
    let result = select_top_k_by(&mut stream, &metrics, k).await;
    let stats = stream.stats();
    info!(
        pages = stats.pages,
        markets = stats.yielded,
        duplicates = stats.duplicates,
        "Market scan finished"
    );

    let mut out = JsonLines::stdout();
    match result {
        Ok(rankings) => {
            emit(&mut out, &rankings)?;
            out.finish()?;
            if stats.yielded == 0 {
                output::warn("catalog empty: no markets matched the filter");
                return Ok(Outcome::Empty);
            }
            Ok(Outcome::Complete)
        }
        Err(partial) => {
            emit(&mut out, &partial.rankings)?;
            out.finish()?;
            if partial.cause.is_cancelled() {
                output::warn(&format!(
                    "cancelled after {} markets; rankings are partial",
                    partial.scanned
                ));
            } else {
                output::error(&format!(
                    "fetch failed after {} markets: {}",
                    partial.scanned, partial.cause
                ));
            }
            Ok(Outcome::Partial)
        }
    }
}

fn emit<W: Write>(out: &mut JsonLines<W>, rankings: &[Ranking]) -> std::io::Result<()> {
    for ranking in rankings {
        for (i, ranked) in ranking.entries.iter().enumerate() {
            out.write(&RankedRow::<MarketRecord>::new(i + 1, ranked))?;
        }
    }
    Ok(())
}
