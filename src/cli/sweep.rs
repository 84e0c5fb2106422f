//! `sweep`: classify every market under a set of series.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::discover::{discover, report_failures};
use super::output::{self, JsonLines};
use super::{catalog_fetcher, statuses_or_default, Outcome, SweepArgs};
use crate::application::{MarketSweep, SweepReport, TickerClassifier};
use crate::config::Config;

pub async fn execute(
    config: &Config,
    args: &SweepArgs,
    cancel: CancellationToken,
) -> anyhow::Result<Outcome> {
    let mut incomplete = false;
    let series: Vec<String> = if args.series.is_empty() {
        let discovery = match discover(config, &args.discover, cancel.clone()).await {
            Ok(discovery) => discovery,
            Err(partial) => {
                report_failures(&partial);
                if partial.is_cancelled() {
                    return Ok(Outcome::Partial);
                }
                incomplete = true;
                partial.discovery
            }
        };
        discovery
            .identifiers()
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        args.series.clone()
    };

    if series.is_empty() {
        output::warn("catalog empty: no series to sweep");
        return Ok(if incomplete {
            Outcome::Partial
        } else {
            Outcome::Empty
        });
    }

    let statuses = statuses_or_default(&args.statuses, config);
    let sweep = MarketSweep::new(
        catalog_fetcher(config, cancel),
        Arc::new(TickerClassifier::standard()),
    );

    let mut out = JsonLines::stdout();
    let report = match sweep.sweep(&series, &statuses).await {
        Ok(report) => report,
        Err(partial) => {
            for failure in &partial.failures {
                if failure.error.is_cancelled() {
                    output::warn("sweep cancelled");
                } else {
                    output::error(&format!(
                        "fetch failed listing {}s of {}: {}",
                        failure.kind, failure.parent, failure.error
                    ));
                }
            }
            incomplete = true;
            partial.report
        }
    };

    emit(&mut out, &report)?;
    out.finish()?;

    if incomplete {
        Ok(Outcome::Partial)
    } else if report.rows.is_empty() {
        output::warn("catalog empty: no markets under the swept series");
        Ok(Outcome::Empty)
    } else {
        Ok(Outcome::Complete)
    }
}

fn emit(out: &mut JsonLines<impl std::io::Write>, report: &SweepReport) -> std::io::Result<()> {
    for row in &report.rows {
        out.write(row)?;
    }
    Ok(())
}
