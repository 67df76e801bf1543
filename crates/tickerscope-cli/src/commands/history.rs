use serde::Serialize;
use tickerscope_core::analytics::percent_change;
use tickerscope_core::{Bar, Period, SnapshotFetcher};

use crate::cli::{HistoryArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{format_number, format_signed_percentage};

#[derive(Debug, Serialize)]
struct HistoryRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
    daily_change_pct: Option<f64>,
}

pub async fn run(
    args: &HistoryArgs,
    fetcher: &SnapshotFetcher,
    format: OutputFormat,
) -> Result<(), CliError> {
    let period: Period = args.period.parse()?;
    let snapshot = fetcher.fetch(&args.symbol, period).await?;

    if snapshot.series().is_empty() {
        println!("no data for '{}' over '{}'", snapshot.symbol(), period);
        return Ok(());
    }

    let bars = snapshot.series().bars();
    if args.csv {
        render_csv(bars);
        return Ok(());
    }

    let rows = recent_rows(bars, args.rows);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => render_table(&rows),
    }

    Ok(())
}

/// Thin export path: every canonical row, oldest first.
fn render_csv(bars: &[Bar]) {
    println!("Date,Open,High,Low,Close,Volume");
    for bar in bars {
        let volume = bar.volume.map(|v| v.to_string()).unwrap_or_default();
        println!(
            "{},{:.2},{:.2},{:.2},{:.2},{}",
            bar.ts, bar.open, bar.high, bar.low, bar.close, volume,
        );
    }
}

/// Most recent rows, newest first, with the day-over-day change column.
fn recent_rows(bars: &[Bar], limit: usize) -> Vec<HistoryRow> {
    let start = bars.len().saturating_sub(limit);
    let mut rows = Vec::new();

    for (offset, bar) in bars[start..].iter().enumerate() {
        let index = start + offset;
        let daily_change_pct = index
            .checked_sub(1)
            .map(|prev| percent_change(bars[prev].close, bar.close));

        rows.push(HistoryRow {
            date: bar.ts.format_rfc3339(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            daily_change_pct,
        });
    }

    rows.reverse();
    rows
}

fn render_table(rows: &[HistoryRow]) {
    println!(
        "{:<22} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9}",
        "date", "open", "high", "low", "close", "volume", "change"
    );
    for row in rows {
        let volume = row.volume.map(|v| format_number(v as f64)).unwrap_or_default();
        let change = row
            .daily_change_pct
            .map(format_signed_percentage)
            .unwrap_or_else(|| String::from("N/A"));
        println!(
            "{:<22} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10} {:>9}",
            row.date, row.open, row.high, row.low, row.close, volume, change,
        );
    }
}
