//! Degenerate-input sweep over the analytics engine.
//!
//! Every derived-statistics function must stay total for empty, single-row,
//! and all-NaN input: no panics, no NaN/Inf leaking past the boundary.

use tickerscope_core::analytics::{
    bollinger_bands, daily_returns, max_drawdown, moving_average, percent_change,
    performance_over_horizons, price_change, returns_analysis, rsi, sharpe_ratio,
    support_resistance, volatility, DEFAULT_BOLLINGER_STD_MULT, DEFAULT_BOLLINGER_WINDOW,
    DEFAULT_LEVEL_WINDOW, DEFAULT_RSI_PERIOD, DEFAULT_VOLATILITY_WINDOW, RISK_FREE_RATE,
};

fn degenerate_inputs() -> Vec<Vec<f64>> {
    vec![
        vec![],
        vec![100.0],
        vec![f64::NAN],
        vec![f64::NAN, f64::NAN, f64::NAN],
        vec![0.0, 0.0, 0.0],
        vec![f64::INFINITY, 100.0],
    ]
}

#[test]
fn scalar_functions_resolve_to_sentinels() {
    for closes in degenerate_inputs() {
        let (absolute, percent) = price_change(&closes);
        assert!(absolute.is_finite(), "price_change abs for {closes:?}");
        assert!(percent.is_finite(), "price_change pct for {closes:?}");

        let drawdown = max_drawdown(&closes);
        assert!(drawdown.is_finite() && drawdown <= 0.0, "drawdown for {closes:?}");

        let vol = volatility(&closes, DEFAULT_VOLATILITY_WINDOW);
        assert_eq!(vol, 0.0, "volatility for {closes:?}");

        let sharpe = sharpe_ratio(&daily_returns(&closes), RISK_FREE_RATE);
        assert!(sharpe.is_finite(), "sharpe for {closes:?}");
    }
}

#[test]
fn mapping_functions_resolve_to_empty_or_none() {
    for closes in degenerate_inputs() {
        let analysis = returns_analysis(&closes);
        assert!(
            analysis.values().all(|value| value.is_finite()),
            "returns_analysis for {closes:?}"
        );

        let levels = support_resistance(&closes, DEFAULT_LEVEL_WINDOW);
        assert_eq!(levels.support, None, "support for {closes:?}");
        assert_eq!(levels.resistance, None, "resistance for {closes:?}");

        assert!(
            performance_over_horizons(&closes).is_empty(),
            "horizons for {closes:?}"
        );
    }
}

#[test]
fn indicator_functions_leave_points_undefined() {
    for closes in degenerate_inputs() {
        let ma = moving_average(&closes, 20);
        assert_eq!(ma.len(), closes.len());
        assert!(ma.iter().all(Option::is_none), "ma for {closes:?}");

        let rsi_values = rsi(&closes, DEFAULT_RSI_PERIOD);
        assert_eq!(rsi_values.len(), closes.len());
        assert!(rsi_values.iter().all(Option::is_none), "rsi for {closes:?}");

        let bands = bollinger_bands(&closes, DEFAULT_BOLLINGER_WINDOW, DEFAULT_BOLLINGER_STD_MULT);
        assert_eq!(bands.len(), closes.len());
        assert!(bands.iter().all(Option::is_none), "bands for {closes:?}");
    }
}

#[test]
fn percent_change_never_divides_by_zero() {
    for (old, new) in [
        (0.0, 0.0),
        (0.0, 100.0),
        (f64::NAN, 1.0),
        (1.0, f64::NAN),
        (f64::INFINITY, 1.0),
    ] {
        assert_eq!(percent_change(old, new), 0.0);
    }
}

#[test]
fn all_nan_series_yield_empty_analysis() {
    let closes = vec![f64::NAN; 50];
    assert!(returns_analysis(&closes).is_empty());
    assert_eq!(max_drawdown(&closes), 0.0);
    assert_eq!(volatility(&closes, DEFAULT_VOLATILITY_WINDOW), 0.0);
}
