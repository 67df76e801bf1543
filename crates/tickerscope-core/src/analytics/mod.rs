//! Pure derived-statistics engine.
//!
//! Every function here is total over degenerate input: empty, single-row,
//! and all-NaN series resolve to the documented sentinel (0, `None`, or an
//! empty mapping) instead of panicking or propagating NaN/Inf.

mod indicators;
mod levels;
mod returns;

pub use indicators::{bollinger_bands, moving_average, rsi, BollingerBand};
pub use levels::{
    performance_over_horizons, support_resistance, HorizonPerformance, SupportResistance,
    PERFORMANCE_HORIZONS,
};
pub use returns::{
    daily_returns, max_drawdown, price_change, returns_analysis, sharpe_ratio,
    sharpe_ratio_default, volatility,
};

/// Trading days per calendar year, used for annualization.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Annual risk-free rate assumed by the standalone Sharpe ratio.
pub const RISK_FREE_RATE: f64 = 0.02;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_BOLLINGER_WINDOW: usize = 20;
pub const DEFAULT_BOLLINGER_STD_MULT: f64 = 2.0;
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;
pub const DEFAULT_LEVEL_WINDOW: usize = 20;

/// Percent change `(new - old) / old * 100`, with division-by-zero and
/// non-finite input resolving to 0.
pub fn percent_change(old: f64, new: f64) -> f64 {
    if !old.is_finite() || !new.is_finite() || old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (divides by n − 1, the pandas default).
/// NaN for fewer than two observations.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}
