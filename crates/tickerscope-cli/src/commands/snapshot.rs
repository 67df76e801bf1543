use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tickerscope_core::analytics::{self, DEFAULT_LEVEL_WINDOW};
use tickerscope_core::{
    HorizonPerformance, Period, SnapshotFetcher, StockSnapshot, SupportResistance,
};

use crate::cli::{OutputFormat, SnapshotArgs};
use crate::error::CliError;
use crate::output::{format_currency, format_number, format_percentage, format_signed_percentage};

#[derive(Debug, Serialize)]
struct SnapshotReport {
    symbol: String,
    period: String,
    company_name: Option<String>,
    current_price: f64,
    price_change: f64,
    price_change_pct: f64,
    key_metrics: BTreeMap<String, Value>,
    basic_stats: BTreeMap<String, f64>,
    returns_analysis: BTreeMap<String, f64>,
    support_resistance: SupportResistance,
    performance: Vec<HorizonPerformance>,
}

impl SnapshotReport {
    fn build(snapshot: &StockSnapshot, period: Period) -> Self {
        let closes = snapshot.series().closes();
        let (price_change, price_change_pct) = snapshot.price_change();

        let company_name = snapshot
            .metadata()
            .get("longName")
            .or_else(|| snapshot.metadata().get("shortName"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Self {
            symbol: snapshot.symbol().to_string(),
            period: period.to_string(),
            company_name,
            current_price: snapshot.current_price(),
            price_change,
            price_change_pct,
            key_metrics: snapshot.key_metrics().into_iter().collect(),
            basic_stats: snapshot.basic_stats(),
            returns_analysis: snapshot.returns_analysis(),
            support_resistance: analytics::support_resistance(&closes, DEFAULT_LEVEL_WINDOW),
            performance: analytics::performance_over_horizons(&closes),
        }
    }
}

pub async fn run(
    args: &SnapshotArgs,
    fetcher: &SnapshotFetcher,
    format: OutputFormat,
) -> Result<(), CliError> {
    let period: Period = args.period.parse()?;
    let snapshot = fetcher.fetch(&args.symbol, period).await?;

    if !snapshot.is_valid() {
        println!(
            "no data for '{}' over '{}'; check the symbol and try again",
            snapshot.symbol(),
            period
        );
        return Ok(());
    }

    let report = SnapshotReport::build(&snapshot, period);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => render_table(&report),
    }

    Ok(())
}

fn render_table(report: &SnapshotReport) {
    match &report.company_name {
        Some(name) => println!("{} ({})  period {}", report.symbol, name, report.period),
        None => println!("{}  period {}", report.symbol, report.period),
    }
    println!(
        "price        : {}  {} ({})",
        format_currency(report.current_price),
        format_currency(report.price_change),
        format_signed_percentage(report.price_change_pct),
    );

    if !report.key_metrics.is_empty() {
        println!("-- key metrics");
        for (key, value) in &report.key_metrics {
            let rendered = match value.as_f64() {
                Some(number) => format_number(number),
                None => value.to_string(),
            };
            println!("{key:<18}: {rendered}");
        }
    }

    if !report.basic_stats.is_empty() {
        println!("-- statistics");
        for (key, value) in &report.basic_stats {
            let rendered = if key.ends_with("pct") {
                format_percentage(*value)
            } else if key == "avg_volume" {
                format_number(*value)
            } else {
                format_currency(*value)
            };
            println!("{key:<18}: {rendered}");
        }
    }

    if !report.returns_analysis.is_empty() {
        println!("-- returns");
        for (key, value) in &report.returns_analysis {
            println!("{key:<18}: {value:.4}");
        }
    }

    if let (Some(support), Some(resistance)) = (
        report.support_resistance.support,
        report.support_resistance.resistance,
    ) {
        println!("-- levels");
        println!("support           : {}", format_currency(support));
        println!("resistance        : {}", format_currency(resistance));
    }

    if !report.performance.is_empty() {
        println!("-- performance");
        for horizon in &report.performance {
            println!(
                "{:<18}: {} (from {})",
                horizon.label,
                format_signed_percentage(horizon.change_pct),
                format_currency(horizon.start_price),
            );
        }
    }
}
