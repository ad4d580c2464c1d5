//! Combined bias computation.
//!
//! Weights the time-series trend against the three exogenous categories
//! into one directional score. This duplicates what the backend bias
//! endpoint computes; the server result is authoritative when available
//! and this path is the documented fallback.

use crate::services::signals::{self, SignalKey};
use crate::types::{
    Bias, Contributions, ExogenousSignal, Metal, MetalAnalysis, Prediction, SignalImpact,
    TimeSeriesAnalysis, Trend,
};
use tracing::warn;

/// Fixed factor weights. They sum to 1.0 so the combined score stays
/// within [-1, 1].
pub const WEIGHT_TREND: f64 = 0.40;
pub const WEIGHT_USD: f64 = 0.30;
pub const WEIGHT_FED: f64 = 0.20;
pub const WEIGHT_INFLATION: f64 = 0.10;

/// Scores inside ±0.15 classify as neutral, so near-zero noise cannot
/// flip the call.
pub const BIAS_THRESHOLD: f64 = 0.15;

/// Trend factor at zero strength; a weak trend still contributes half
/// weight, scaling linearly to full weight at strength 100.
const TREND_STRENGTH_MIN_FACTOR: f64 = 0.5;

/// Compute the weighted prediction for a metal from an already-loaded
/// analysis and signal list.
pub fn predict(
    metal: Metal,
    series: &TimeSeriesAnalysis,
    exogenous: &[ExogenousSignal],
) -> Prediction {
    let trend_score = trend_to_weighted_score(series.trend, series.trend_strength);
    let usd = signal_score(exogenous, SignalKey::UsdIndex);
    let fed = signal_score(exogenous, SignalKey::FedRates);
    let inflation = signal_score(exogenous, SignalKey::Inflation);

    let missing = signals::missing_keys(exogenous);
    if !missing.is_empty() {
        let received: Vec<&str> = exogenous.iter().map(|s| s.name.as_str()).collect();
        warn!(
            %metal,
            missing = ?missing.iter().map(|k| k.canonical_name()).collect::<Vec<_>>(),
            received = ?received,
            "Exogenous signals missing or misnamed"
        );
    }

    let contributions = Contributions {
        trend: trend_score * WEIGHT_TREND,
        usd: usd * WEIGHT_USD,
        fed: fed * WEIGHT_FED,
        inflation: inflation * WEIGHT_INFLATION,
    };

    let weighted_score =
        contributions.trend + contributions.usd + contributions.fed + contributions.inflation;

    Prediction {
        metal,
        weighted_score: (weighted_score * 100.0).round() / 100.0,
        combined_bias: score_to_bias(weighted_score),
        contributions,
        missing_signals: missing
            .into_iter()
            .map(|k| k.canonical_name().to_string())
            .collect(),
    }
}

/// Prediction from a full analysis bundle.
pub fn predict_from_analysis(analysis: &MetalAnalysis) -> Prediction {
    predict(analysis.metal, &analysis.series, &analysis.signals)
}

/// Unweighted combination of trend and signal impacts, used for the
/// coarse bullish/bearish/neutral call on the full analysis bundle.
pub fn combine_bias(series: &TimeSeriesAnalysis, exogenous: &[ExogenousSignal]) -> Bias {
    let mut score: i32 = match series.trend {
        Trend::Up => 1,
        Trend::Down => -1,
        Trend::Sideways => 0,
    };
    for signal in exogenous {
        score += match signal.impact {
            SignalImpact::Bullish => 1,
            SignalImpact::Bearish => -1,
            SignalImpact::Neutral => 0,
        };
    }
    match score.cmp(&0) {
        std::cmp::Ordering::Greater => Bias::Bullish,
        std::cmp::Ordering::Less => Bias::Bearish,
        std::cmp::Ordering::Equal => Bias::Neutral,
    }
}

/// Trend contribution in [-1, 1]: zero when sideways, otherwise the
/// direction sign scaled by strength.
fn trend_to_weighted_score(trend: Trend, trend_strength: f64) -> f64 {
    let direction = match trend {
        Trend::Up => 1.0,
        Trend::Down => -1.0,
        Trend::Sideways => return 0.0,
    };
    let strength = trend_strength.clamp(0.0, 100.0) / 100.0;
    direction * (TREND_STRENGTH_MIN_FACTOR + strength * (1.0 - TREND_STRENGTH_MIN_FACTOR))
}

fn impact_to_score(impact: SignalImpact) -> f64 {
    match impact {
        SignalImpact::Bullish => 1.0,
        SignalImpact::Bearish => -1.0,
        SignalImpact::Neutral => 0.0,
    }
}

/// Impact score for a canonical key; 0 when the signal is missing.
fn signal_score(exogenous: &[ExogenousSignal], key: SignalKey) -> f64 {
    signals::resolve(exogenous, key)
        .map(|s| impact_to_score(s.impact))
        .unwrap_or(0.0)
}

/// Map a weighted score to its bias label. The ±0.15 deadband is
/// inclusive: exactly 0.15 is still neutral.
pub fn score_to_bias(score: f64) -> Bias {
    if score > BIAS_THRESHOLD {
        Bias::Bullish
    } else if score < -BIAS_THRESHOLD {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}
