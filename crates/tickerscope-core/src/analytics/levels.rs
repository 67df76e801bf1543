use serde::{Deserialize, Serialize};

use super::percent_change;

/// Trailing-window support/resistance levels. All fields are `None` when
/// the series is shorter than the window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub range: Option<f64>,
}

/// Min/max/range over the trailing `window` closes. NaN closes are ignored;
/// a window with no finite close leaves the levels undefined.
pub fn support_resistance(closes: &[f64], window: usize) -> SupportResistance {
    if window == 0 || closes.len() < window {
        return SupportResistance::default();
    }

    let recent = &closes[closes.len() - window..];
    let mut support: Option<f64> = None;
    let mut resistance: Option<f64> = None;
    for close in recent {
        if !close.is_finite() {
            continue;
        }
        support = Some(support.map_or(*close, |s| s.min(*close)));
        resistance = Some(resistance.map_or(*close, |r| r.max(*close)));
    }

    let range = match (support, resistance) {
        (Some(s), Some(r)) => Some(r - s),
        _ => None,
    };

    SupportResistance {
        support,
        resistance,
        range,
    }
}

/// One named lookback horizon's realized performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonPerformance {
    pub label: &'static str,
    pub trading_days: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub change_pct: f64,
}

/// Named horizons in trading days.
pub const PERFORMANCE_HORIZONS: [(&str, usize); 5] = [
    ("1w", 7),
    ("1mo", 30),
    ("3mo", 90),
    ("6mo", 180),
    ("1y", 252),
];

/// Percent change from the close `N` trading days back to the current
/// close, for each named horizon. Horizons the series cannot cover are
/// skipped rather than extrapolated.
pub fn performance_over_horizons(closes: &[f64]) -> Vec<HorizonPerformance> {
    let Some(current) = closes.last().copied() else {
        return Vec::new();
    };

    PERFORMANCE_HORIZONS
        .into_iter()
        .filter_map(|(label, days)| {
            if closes.len() <= days {
                return None;
            }
            let start = closes[closes.len() - 1 - days];
            if !start.is_finite() || !current.is_finite() {
                return None;
            }
            Some(HorizonPerformance {
                label,
                trading_days: days,
                start_price: start,
                end_price: current,
                change_pct: percent_change(start, current),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_has_no_levels() {
        let levels = support_resistance(&[1.0, 2.0, 3.0, 4.0, 5.0], 20);
        assert_eq!(levels.support, None);
        assert_eq!(levels.resistance, None);
        assert_eq!(levels.range, None);
    }

    #[test]
    fn levels_span_trailing_window() {
        let closes = [50.0, 1.0, 10.0, 30.0, 20.0];
        let levels = support_resistance(&closes, 3);
        assert_eq!(levels.support, Some(10.0));
        assert_eq!(levels.resistance, Some(30.0));
        assert_eq!(levels.range, Some(20.0));
    }

    #[test]
    fn levels_ignore_nan_closes() {
        let levels = support_resistance(&[10.0, f64::NAN, 30.0], 3);
        assert_eq!(levels.support, Some(10.0));
        assert_eq!(levels.resistance, Some(30.0));

        let all_nan = support_resistance(&[f64::NAN, f64::NAN], 2);
        assert_eq!(all_nan.support, None);
        assert_eq!(all_nan.range, None);
    }

    #[test]
    fn horizons_skip_uncovered_lookbacks() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let horizons = performance_over_horizons(&closes);
        // only the 7 and 30 day horizons fit into 40 closes
        assert_eq!(horizons.len(), 2);
        assert_eq!(horizons[0].label, "1w");
        assert_eq!(horizons[1].label, "1mo");
    }

    #[test]
    fn horizon_change_is_percent_from_past_close() {
        let mut closes = vec![100.0; 8];
        closes[0] = 80.0;
        let horizons = performance_over_horizons(&closes);
        assert_eq!(horizons.len(), 1);
        assert_eq!(horizons[0].start_price, 80.0);
        assert!((horizons[0].change_pct - 25.0).abs() < 1e-10);
    }

    #[test]
    fn empty_series_has_no_horizons() {
        assert!(performance_over_horizons(&[]).is_empty());
    }
}
