use serde::Serialize;
use tickerscope_core::{Period, SnapshotFetcher};

use crate::cli::{OutputFormat, QuoteArgs};
use crate::error::CliError;
use crate::output::format_currency;

#[derive(Debug, Serialize)]
struct QuoteReport {
    symbol: String,
    last_price: f64,
    as_of: String,
}

pub async fn run(
    args: &QuoteArgs,
    fetcher: &SnapshotFetcher,
    format: OutputFormat,
) -> Result<(), CliError> {
    if args.refresh {
        fetcher.refresh(&args.symbol).await;
    }

    let snapshot = fetcher.fetch(&args.symbol, Period::Live).await?;
    if !snapshot.is_valid() {
        return Err(CliError::Command(format!(
            "no live quote available for '{}'",
            snapshot.symbol()
        )));
    }

    let as_of = snapshot
        .series()
        .bars()
        .last()
        .map(|bar| bar.ts.format_rfc3339())
        .unwrap_or_default();

    let report = QuoteReport {
        symbol: snapshot.symbol().to_string(),
        last_price: snapshot.current_price(),
        as_of,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            println!("symbol : {}", report.symbol);
            println!("price  : {}", format_currency(report.last_price));
            println!("as of  : {}", report.as_of);
        }
    }

    Ok(())
}
