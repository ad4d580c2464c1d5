//! Time-series analysis over OHLC history.
//!
//! Computes short/long simple moving averages, trend direction and
//! strength, and the cycle phase of the latest close within the recent
//! high/low range. Pure functions; identical input always yields
//! identical output.

use crate::types::{Candle, CyclePhase, TimeSeriesAnalysis, Trend};

/// Default short moving-average period.
pub const DEFAULT_SHORT_PERIOD: usize = 10;
/// 20 points so one month of daily candles (~22 trading days) is enough
/// for silver/platinum history.
pub const DEFAULT_LONG_PERIOD: usize = 20;
/// Lookback window for the cycle phase range.
const CYCLE_LOOKBACK: usize = 20;

/// Trend is only called up/down when the short MA leaves this band
/// around the long MA; the ±0.1% band absorbs noise.
const TREND_BAND: f64 = 0.001;

/// Analyze a candle series with the default periods.
pub fn analyze(candles: &[Candle]) -> Option<TimeSeriesAnalysis> {
    analyze_with_periods(candles, DEFAULT_SHORT_PERIOD, DEFAULT_LONG_PERIOD)
}

/// Analyze a candle series.
///
/// Returns `None` when the series is shorter than `long_period`. That is
/// a valid "insufficient history" outcome, not an error; callers degrade
/// to showing no analysis.
pub fn analyze_with_periods(
    candles: &[Candle],
    short_period: usize,
    long_period: usize,
) -> Option<TimeSeriesAnalysis> {
    if candles.is_empty() || candles.len() < long_period {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let last_close = *closes.last()?;

    let ma_short = sma(&closes, short_period);
    let ma_long = sma(&closes, long_period);

    let trend = if ma_short > ma_long * (1.0 + TREND_BAND) {
        Trend::Up
    } else if ma_short < ma_long * (1.0 - TREND_BAND) {
        Trend::Down
    } else {
        Trend::Sideways
    };

    let diff_pct = if ma_long != 0.0 {
        (ma_short - ma_long).abs() / ma_long * 100.0
    } else {
        0.0
    };
    let trend_strength = (diff_pct * 10.0).round().min(100.0);

    let cycle_start = closes.len().saturating_sub(CYCLE_LOOKBACK);
    let cycle_closes = &closes[cycle_start..];
    let min_close = cycle_closes.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_close = cycle_closes
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let range_position = if max_close > min_close {
        (last_close - min_close) / (max_close - min_close)
    } else {
        0.5
    };

    let cycle_phase = if range_position < 0.33 {
        CyclePhase::Trough
    } else if range_position > 0.67 {
        CyclePhase::Peak
    } else {
        CyclePhase::Mid
    };

    Some(TimeSeriesAnalysis {
        trend,
        trend_strength,
        ma_short,
        ma_long,
        cycle_phase,
        range_position,
        periods_used: candles.len(),
    })
}

/// Simple moving average over the trailing `period` points.
///
/// Degrades to the average of all available points when the series is
/// shorter than `period`, and to the last point for a single-element
/// series. Returns 0 for an empty slice.
fn sma(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if values.len() < period {
        return *values.last().unwrap_or(&0.0);
    }
    let slice = &values[values.len() - period..];
    slice.iter().sum::<f64>() / slice.len() as f64
}
