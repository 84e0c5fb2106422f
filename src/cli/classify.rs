//! `classify`: offline ticker classification.

use std::io::{self, BufRead};

use serde::Serialize;

use super::output::{self, JsonLines};
use super::{ClassifyArgs, Outcome};
use crate::application::TickerClassifier;
use crate::domain::{ClassifiedRow, TickerMetadata};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Ticker<'a> {
    ticker: &'a str,
}

pub fn execute(args: &ClassifyArgs) -> anyhow::Result<Outcome> {
    let tickers = if args.tickers.is_empty() {
        read_tickers(io::stdin().lock())?
    } else {
        args.tickers.clone()
    };

    if tickers.is_empty() {
        output::warn("no tickers given");
        return Ok(Outcome::Empty);
    }

    let classifier = TickerClassifier::standard();
    let metadata = TickerMetadata {
        parent: args.parent.as_deref(),
        category: args.category.as_deref(),
    };

    let mut out = JsonLines::stdout();
    for ticker in &tickers {
        out.write(&ClassifiedRow {
            record: Ticker { ticker },
            classification: classifier.classify(ticker, metadata),
        })?;
    }
    out.finish()?;
    Ok(Outcome::Complete)
}

fn read_tickers(input: impl BufRead) -> io::Result<Vec<String>> {
    let mut tickers = Vec::new();
    for line in input.lines() {
        let line = line?;
        let ticker = line.trim();
        if !ticker.is_empty() {
            tickers.push(ticker.to_string());
        }
    }
    Ok(tickers)
}
