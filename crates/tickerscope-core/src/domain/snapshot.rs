use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics;
use crate::{PriceSeries, Symbol};

/// Provider-defined company/market facts. Keys are optional and provider
/// shaped (`marketCap`, `trailingPE`, `sector`, ...); absence is normal.
pub type Metadata = BTreeMap<String, Value>;

/// Keys surfaced by [`StockSnapshot::key_metrics`].
const KEY_METRIC_FIELDS: [&str; 4] = ["marketCap", "trailingPE", "trailingEps", "dividendYield"];

/// Aggregate of one symbol's normalized series, metadata, and current price.
///
/// A snapshot is always well formed: a failed retrieval yields an empty
/// series with `current_price` 0.0 rather than an error, so presentation
/// collaborators can render a "no data" state. Derived metrics are computed
/// on demand and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    symbol: Symbol,
    series: PriceSeries,
    metadata: Metadata,
    current_price: f64,
}

impl StockSnapshot {
    pub fn new(symbol: Symbol, series: PriceSeries, metadata: Metadata, current_price: f64) -> Self {
        Self {
            symbol,
            series,
            metadata,
            current_price,
        }
    }

    /// The soft-failure shape: empty series, empty metadata, price unknown.
    pub fn unavailable(symbol: Symbol) -> Self {
        Self::new(symbol, PriceSeries::empty(), Metadata::new(), 0.0)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// A snapshot is usable iff it has bars and a known current price.
    pub fn is_valid(&self) -> bool {
        !self.series.is_empty() && self.current_price > 0.0
    }

    /// Absolute and percent change of the current price against the
    /// previous close. Degenerate input resolves to `(0.0, 0.0)`.
    pub fn price_change(&self) -> (f64, f64) {
        let closes = self.series.closes();
        if closes.len() < 2 {
            return (0.0, 0.0);
        }

        let prev_close = closes[closes.len() - 2];
        if prev_close == 0.0 || !prev_close.is_finite() {
            return (0.0, 0.0);
        }

        let absolute = self.current_price - prev_close;
        let percent = absolute / prev_close * 100.0;
        if !absolute.is_finite() || !percent.is_finite() {
            return (0.0, 0.0);
        }
        (absolute, percent)
    }

    /// Distribution statistics over the close series, plus 52-week extrema,
    /// 30-day volatility, average volume, and the share of positive days.
    /// Only finite values are emitted; an empty series yields an empty map.
    pub fn basic_stats(&self) -> BTreeMap<String, f64> {
        let mut stats = BTreeMap::new();
        if self.series.is_empty() {
            return stats;
        }

        let closes = self.series.closes();
        if let Some(last) = closes.last() {
            insert_finite(&mut stats, "current", *last);
        }
        insert_finite(&mut stats, "mean", analytics::mean(&closes));
        insert_finite(&mut stats, "median", analytics::median(&closes));
        insert_finite(&mut stats, "std_dev", analytics::sample_std(&closes));
        insert_finite(&mut stats, "min", min_of(&closes));
        insert_finite(&mut stats, "max", max_of(&closes));

        // 52-week extrema fall back to whole-series extrema on short series.
        let year_tail = if closes.len() >= analytics::TRADING_DAYS_PER_YEAR {
            &closes[closes.len() - analytics::TRADING_DAYS_PER_YEAR..]
        } else {
            &closes[..]
        };
        insert_finite(&mut stats, "high_52w", max_of(year_tail));
        insert_finite(&mut stats, "low_52w", min_of(year_tail));

        insert_finite(
            &mut stats,
            "volatility_30d",
            analytics::volatility(&closes, analytics::DEFAULT_VOLATILITY_WINDOW),
        );

        let volumes: Vec<f64> = self
            .series
            .volumes()
            .into_iter()
            .flatten()
            .map(|v| v as f64)
            .collect();
        if !volumes.is_empty() {
            insert_finite(&mut stats, "avg_volume", analytics::mean(&volumes));
        }

        let returns = analytics::daily_returns(&closes);
        if !returns.is_empty() {
            let positive = returns.iter().filter(|r| **r > 0.0).count();
            insert_finite(
                &mut stats,
                "positive_days_pct",
                positive as f64 / returns.len() as f64 * 100.0,
            );
        }

        stats
    }

    /// Returns-based statistics: mean/std of daily return, annualized Sharpe
    /// ratio, and max drawdown. Empty map when the snapshot is invalid or the
    /// series is too short.
    pub fn returns_analysis(&self) -> BTreeMap<String, f64> {
        if !self.is_valid() {
            return BTreeMap::new();
        }
        analytics::returns_analysis(&self.series.closes())
    }

    /// Headline metadata fields (market cap, P/E, EPS, dividend yield).
    /// Absent keys are omitted rather than defaulted.
    pub fn key_metrics(&self) -> Metadata {
        KEY_METRIC_FIELDS
            .iter()
            .filter_map(|field| {
                self.metadata
                    .get(*field)
                    .map(|value| ((*field).to_owned(), value.clone()))
            })
            .collect()
    }
}

fn insert_finite(stats: &mut BTreeMap<String, f64>, key: &str, value: f64) {
    if value.is_finite() {
        stats.insert(key.to_owned(), value);
    }
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bar, UtcDateTime};
    use serde_json::json;

    fn series_of(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let ts = UtcDateTime::from_unix_timestamp(86_400 * i as i64).expect("timestamp");
                Bar::new(ts, *close, *close, *close, *close, Some(1_000)).expect("bar")
            })
            .collect();
        PriceSeries::new(bars)
    }

    fn snapshot_of(closes: &[f64]) -> StockSnapshot {
        let current = closes.last().copied().unwrap_or(0.0);
        StockSnapshot::new(
            Symbol::parse("TEST").expect("symbol"),
            series_of(closes),
            Metadata::new(),
            current,
        )
    }

    #[test]
    fn invalid_when_series_empty() {
        let snapshot = StockSnapshot::unavailable(Symbol::parse("TEST").expect("symbol"));
        assert!(!snapshot.is_valid());
        assert_eq!(snapshot.current_price(), 0.0);
        assert!(snapshot.basic_stats().is_empty());
        assert!(snapshot.returns_analysis().is_empty());
    }

    #[test]
    fn invalid_when_price_unknown() {
        let snapshot = StockSnapshot::new(
            Symbol::parse("TEST").expect("symbol"),
            series_of(&[100.0, 101.0]),
            Metadata::new(),
            0.0,
        );
        assert!(!snapshot.is_valid());
    }

    #[test]
    fn price_change_of_short_series_is_zero() {
        assert_eq!(snapshot_of(&[100.0]).price_change(), (0.0, 0.0));
    }

    #[test]
    fn price_change_against_previous_close() {
        let (absolute, percent) = snapshot_of(&[100.0, 110.0, 121.0]).price_change();
        assert!((absolute - 11.0).abs() < 1e-10);
        assert!((percent - 10.0).abs() < 1e-10);
    }

    #[test]
    fn price_change_with_zero_previous_close_is_zero() {
        assert_eq!(snapshot_of(&[100.0, 0.0, 121.0]).price_change(), (0.0, 0.0));
    }

    #[test]
    fn basic_stats_report_distribution() {
        let stats = snapshot_of(&[100.0, 102.0, 101.0, 103.0]).basic_stats();
        assert_eq!(stats["current"], 103.0);
        assert_eq!(stats["min"], 100.0);
        assert_eq!(stats["max"], 103.0);
        assert!((stats["mean"] - 101.5).abs() < 1e-10);
        assert!((stats["median"] - 101.5).abs() < 1e-10);
        assert!((stats["positive_days_pct"] - 200.0 / 3.0).abs() < 1e-10);
        assert_eq!(stats["avg_volume"], 1_000.0);
    }

    #[test]
    fn key_metrics_picks_known_fields() {
        let mut metadata = Metadata::new();
        metadata.insert("marketCap".to_owned(), json!(3_000_000_000.0_f64));
        metadata.insert("sector".to_owned(), json!("Technology"));
        let snapshot = StockSnapshot::new(
            Symbol::parse("TEST").expect("symbol"),
            series_of(&[100.0, 101.0]),
            metadata,
            101.0,
        );

        let metrics = snapshot.key_metrics();
        assert!(metrics.contains_key("marketCap"));
        assert!(!metrics.contains_key("sector"));
        assert!(!metrics.contains_key("trailingPE"));
    }
}
