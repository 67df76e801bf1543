//! Raw provider table to canonical OHLCV series.
//!
//! Providers disagree on column casing, whether the date axis is a column
//! or the table index, and how nulls are spelled. Normalization settles all
//! of that once so the analytics engine only ever sees a clean series.

use thiserror::Error;

use crate::{Bar, PriceSeries, RawCells, RawTable, UtcDateTime};

/// Normalization failure: the schema is unusable, not merely sparse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("raw table is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}

const REQUIRED_PRICE_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// Produce a canonical [`PriceSeries`] from a raw provider table.
///
/// Column names are trimmed and capitalized before matching. If no `Date`
/// column exists the table index is promoted to the date axis. Rows with a
/// null or non-finite value in any of Open/High/Low/Close are dropped.
/// A schema that still lacks any of Date/Open/High/Low/Close fails with
/// [`NormalizeError::MissingColumns`]; the caller never receives a series
/// built from a partial schema.
pub fn normalize(raw: &RawTable) -> Result<PriceSeries, NormalizeError> {
    let mut dates: Option<&[Option<UtcDateTime>]> = None;
    let mut open: Option<&[Option<f64>]> = None;
    let mut high: Option<&[Option<f64>]> = None;
    let mut low: Option<&[Option<f64>]> = None;
    let mut close: Option<&[Option<f64>]> = None;
    let mut volume: Option<&[Option<f64>]> = None;

    for column in &raw.columns {
        match (canonical_name(&column.name).as_str(), &column.cells) {
            ("Date", RawCells::Timestamps(cells)) => dates = Some(cells),
            ("Open", RawCells::Numbers(cells)) => open = Some(cells),
            ("High", RawCells::Numbers(cells)) => high = Some(cells),
            ("Low", RawCells::Numbers(cells)) => low = Some(cells),
            ("Close", RawCells::Numbers(cells)) => close = Some(cells),
            ("Volume", RawCells::Numbers(cells)) => volume = Some(cells),
            _ => {}
        }
    }

    // No Date column: promote the index to the date axis.
    let dates = dates.or(raw.index.as_deref());

    let mut missing = Vec::new();
    if dates.is_none() {
        missing.push("Date");
    }
    for (name, cells) in REQUIRED_PRICE_COLUMNS
        .iter()
        .zip([&open, &high, &low, &close])
    {
        if cells.is_none() {
            missing.push(*name);
        }
    }
    let (Some(dates), Some(open), Some(high), Some(low), Some(close)) =
        (dates, open, high, low, close)
    else {
        return Err(NormalizeError::MissingColumns { missing });
    };

    let mut bars = Vec::new();
    for row in 0..raw.row_count() {
        let Some(ts) = cell(dates, row) else {
            continue;
        };
        let (Some(o), Some(h), Some(l), Some(c)) = (
            price_cell(open, row),
            price_cell(high, row),
            price_cell(low, row),
            price_cell(close, row),
        ) else {
            continue;
        };

        let bar_volume = cell(volume.unwrap_or(&[]), row)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64);

        // Out-of-domain prices (negative, after the finite check above) are
        // treated like nulls and drop the row.
        if let Ok(bar) = Bar::new(ts, o, h, l, c, bar_volume) {
            bars.push(bar);
        }
    }

    Ok(PriceSeries::new(bars))
}

/// Trim and capitalize for matching: `" close "` and `"CLOSE"` both read
/// as `Close`.
fn canonical_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

fn cell<T: Copy>(cells: &[Option<T>], row: usize) -> Option<T> {
    cells.get(row).copied().flatten()
}

fn price_cell(cells: &[Option<f64>], row: usize) -> Option<f64> {
    cell(cells, row).filter(|value| value.is_finite())
}
