use std::collections::BTreeMap;

use super::{mean, sample_std, RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};

/// Simple daily returns `(c[i] - c[i-1]) / c[i-1]`.
///
/// Pairs whose ratio is not finite (NaN closes, zero prior close) are
/// dropped, mirroring a pct-change-then-dropna pipeline.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .filter(|r| r.is_finite())
        .collect()
}

/// Absolute and percent change of the last close against the previous one.
/// Series shorter than 2 or a zero previous close resolve to `(0.0, 0.0)`.
pub fn price_change(closes: &[f64]) -> (f64, f64) {
    if closes.len() < 2 {
        return (0.0, 0.0);
    }

    let prev = closes[closes.len() - 2];
    let last = closes[closes.len() - 1];
    if prev == 0.0 || !prev.is_finite() || !last.is_finite() {
        return (0.0, 0.0);
    }

    (last - prev, (last - prev) / prev * 100.0)
}

/// Returns-based statistics over a close series.
///
/// Keys: `daily_return_mean`, `daily_return_std`, `sharpe_ratio` (mean/std
/// scaled by √252, zero when std is zero), `max_drawdown` (minimum of
/// cumulative growth over its running maximum, minus one). Any non-finite
/// intermediate empties the whole mapping; the caller never sees NaN.
pub fn returns_analysis(closes: &[f64]) -> BTreeMap<String, f64> {
    if closes.len() < 2 {
        return BTreeMap::new();
    }

    let returns = daily_returns(closes);
    if returns.is_empty() {
        return BTreeMap::new();
    }

    let return_mean = mean(&returns);
    let return_std = sample_std(&returns);

    let sharpe = if return_std == 0.0 {
        0.0
    } else {
        return_mean / return_std * (TRADING_DAYS_PER_YEAR as f64).sqrt()
    };

    let mut cumulative = 1.0_f64;
    let mut running_max = 1.0_f64;
    let mut max_drawdown = 0.0_f64;
    for r in &returns {
        cumulative *= 1.0 + r;
        running_max = running_max.max(cumulative);
        if running_max > 0.0 {
            max_drawdown = max_drawdown.min(cumulative / running_max - 1.0);
        }
    }

    let mut analysis = BTreeMap::new();
    analysis.insert("daily_return_mean".to_owned(), return_mean);
    analysis.insert("daily_return_std".to_owned(), return_std);
    analysis.insert("sharpe_ratio".to_owned(), sharpe);
    analysis.insert("max_drawdown".to_owned(), max_drawdown);

    if analysis.values().any(|value| !value.is_finite()) {
        return BTreeMap::new();
    }
    analysis
}

/// Annualized volatility: sample std of daily returns scaled by √252.
///
/// The window shrinks to the series length when the series is shorter;
/// if the returns that remain are still fewer than the window, the series
/// is too short to say anything and the result is 0.
pub fn volatility(closes: &[f64], window: usize) -> f64 {
    let window = window.min(closes.len());
    if window == 0 {
        return 0.0;
    }

    let returns = daily_returns(closes);
    if returns.len() < window {
        return 0.0;
    }

    let std = sample_std(&returns);
    if !std.is_finite() {
        return 0.0;
    }
    std * (TRADING_DAYS_PER_YEAR as f64).sqrt()
}

/// Annualized Sharpe ratio of a daily-return series against a risk-free
/// rate. Empty or zero-std input resolves to 0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let std = sample_std(returns);
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }

    let excess = mean(returns) * TRADING_DAYS_PER_YEAR as f64 - risk_free_rate;
    let annualized_vol = std * (TRADING_DAYS_PER_YEAR as f64).sqrt();
    let ratio = excess / annualized_vol;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Convenience wrapper using the default risk-free rate.
pub fn sharpe_ratio_default(returns: &[f64]) -> f64 {
    sharpe_ratio(returns, RISK_FREE_RATE)
}

/// Maximum percentage decline from a running peak. Always ≤ 0; exactly 0
/// for series shorter than 2 or strictly non-decreasing ones.
pub fn max_drawdown(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for price in prices {
        if !price.is_finite() {
            continue;
        }
        peak = peak.max(*price);
        if peak > 0.0 {
            let drawdown = (price - peak) / peak * 100.0;
            if drawdown.is_finite() {
                worst = worst.min(drawdown);
            }
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_change_known_series() {
        let (absolute, percent) = price_change(&[100.0, 110.0, 121.0]);
        assert!((absolute - 11.0).abs() < 1e-10);
        assert!((percent - 10.0).abs() < 1e-10);
    }

    #[test]
    fn price_change_degenerate_input() {
        assert_eq!(price_change(&[]), (0.0, 0.0));
        assert_eq!(price_change(&[100.0]), (0.0, 0.0));
        assert_eq!(price_change(&[0.0, 100.0]), (0.0, 0.0));
        assert_eq!(price_change(&[f64::NAN, 100.0]), (0.0, 0.0));
    }

    #[test]
    fn daily_returns_drop_non_finite_pairs() {
        let returns = daily_returns(&[100.0, 0.0, 50.0, 55.0]);
        // 100 -> 0 gives -1.0, 0 -> 50 is dropped (division by zero),
        // 50 -> 55 gives 0.1
        assert_eq!(returns.len(), 2);
        assert!((returns[0] + 1.0).abs() < 1e-10);
        assert!((returns[1] - 0.1).abs() < 1e-10);
    }

    #[test]
    fn flat_series_has_zero_sharpe_and_drawdown() {
        let closes = vec![100.0; 252];
        let analysis = returns_analysis(&closes);
        assert_eq!(analysis["sharpe_ratio"], 0.0);
        assert_eq!(analysis["max_drawdown"], 0.0);
        assert_eq!(analysis["daily_return_mean"], 0.0);
        assert_eq!(analysis["daily_return_std"], 0.0);
    }

    #[test]
    fn returns_analysis_of_short_series_is_empty() {
        assert!(returns_analysis(&[]).is_empty());
        assert!(returns_analysis(&[100.0]).is_empty());
        // two closes leave one return; sample std is undefined there
        assert!(returns_analysis(&[100.0, 110.0]).is_empty());
    }

    #[test]
    fn returns_analysis_of_all_nan_series_is_empty() {
        assert!(returns_analysis(&[f64::NAN, f64::NAN, f64::NAN]).is_empty());
    }

    #[test]
    fn drawdown_in_returns_analysis_matches_decline() {
        // 100 -> 120 -> 60: trough is half the 120 peak
        let analysis = returns_analysis(&[100.0, 120.0, 60.0, 70.0]);
        assert!((analysis["max_drawdown"] + 0.5).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_non_decreasing_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[100.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_reports_percent_decline() {
        let drawdown = max_drawdown(&[100.0, 120.0, 90.0, 110.0]);
        assert!((drawdown + 25.0).abs() < 1e-10);
        assert!(drawdown <= 0.0);
    }

    #[test]
    fn max_drawdown_skips_nan_prices() {
        let drawdown = max_drawdown(&[100.0, f64::NAN, 50.0]);
        assert!((drawdown + 50.0).abs() < 1e-10);
    }

    #[test]
    fn volatility_of_short_series_is_zero() {
        // window shrinks to the series length, but the return count is
        // always one short of it
        assert_eq!(volatility(&[], 30), 0.0);
        assert_eq!(volatility(&[100.0], 30), 0.0);
        assert_eq!(volatility(&[100.0, 101.0, 102.0], 30), 0.0);
    }

    #[test]
    fn volatility_annualizes_return_std() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 5) as f64).collect();
        let expected = sample_std(&daily_returns(&closes)) * (252.0_f64).sqrt();
        let vol = volatility(&closes, 30);
        assert!((vol - expected).abs() < 1e-10);
        assert!(vol > 0.0);
    }

    #[test]
    fn sharpe_ratio_of_degenerate_returns_is_zero() {
        assert_eq!(sharpe_ratio(&[], RISK_FREE_RATE), 0.0);
        assert_eq!(sharpe_ratio(&[0.01], RISK_FREE_RATE), 0.0);
        assert_eq!(sharpe_ratio(&[0.0, 0.0, 0.0], RISK_FREE_RATE), 0.0);
    }

    #[test]
    fn sharpe_ratio_known_value() {
        let returns = vec![0.01, 0.02, -0.01, 0.015];
        let expected = (mean(&returns) * 252.0 - RISK_FREE_RATE)
            / (sample_std(&returns) * 252.0_f64.sqrt());
        assert!((sharpe_ratio_default(&returns) - expected).abs() < 1e-10);
    }
}
