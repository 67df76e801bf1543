use serde::{Deserialize, Serialize};

use super::{mean, sample_std};

/// Rolling arithmetic mean over `window` closes.
///
/// The leading `window - 1` points are undefined (`None`); no early values
/// are fabricated. A zero window, or a window longer than the series,
/// leaves every point undefined.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || window > closes.len() {
        return out;
    }

    for i in (window - 1)..closes.len() {
        let avg = mean(&closes[i + 1 - window..=i]);
        if avg.is_finite() {
            out[i] = Some(avg);
        }
    }
    out
}

/// Relative Strength Index over rolling simple averages of gains/losses.
///
/// `RSI = 100 - 100 / (1 + avg_gain / avg_loss)`. A zero average loss
/// saturates the oscillator at 100. The first `period` points are
/// undefined: one price change is consumed per bar and the rolling average
/// needs `period` of them.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for i in period..closes.len() {
        let avg_gain = mean(&gains[i - period..i]);
        let avg_loss = mean(&losses[i - period..i]);
        if !avg_gain.is_finite() || !avg_loss.is_finite() {
            continue;
        }

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out[i] = Some(value.clamp(0.0, 100.0));
    }
    out
}

/// One Bollinger point: moving average ± k standard deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over `window` closes with multiplier `std_mult`.
/// Undefined for the leading `window - 1` points.
pub fn bollinger_bands(closes: &[f64], window: usize, std_mult: f64) -> Vec<Option<BollingerBand>> {
    let mut out = vec![None; closes.len()];
    if window == 0 || window > closes.len() || !std_mult.is_finite() {
        return out;
    }

    for i in (window - 1)..closes.len() {
        let slice = &closes[i + 1 - window..=i];
        let middle = mean(slice);
        let std = sample_std(slice);
        if !middle.is_finite() || !std.is_finite() {
            continue;
        }

        out[i] = Some(BollingerBand {
            upper: middle + std_mult * std,
            middle,
            lower: middle - std_mult * std,
        });
    }
    out
}
