use crate::types::Metal;
use serde::{Deserialize, Serialize};

/// Trend direction over the analyzed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

/// Position within the recent price cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Trough,
    Mid,
    Peak,
}

/// Result of analyzing a close-price series: moving averages, trend
/// direction and strength, and where the latest close sits in the
/// recent high/low range. Recomputed per request, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesAnalysis {
    pub trend: Trend,
    /// Trend strength, 0-100. Scaled from the gap between the two
    /// moving averages; saturates at 100.
    pub trend_strength: f64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub cycle_phase: CyclePhase,
    /// Position of the last close within the lookback range (0 = low,
    /// 1 = high; 0.5 when the range is flat).
    pub range_position: f64,
    pub periods_used: usize,
}

/// Expected directional pressure of an exogenous signal on metal prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalImpact {
    Bullish,
    Bearish,
    Neutral,
}

/// A macro-economic signal supplied by the backend (dollar index, central
/// bank rates, inflation). Keyed by `name`, but backends are inconsistent
/// about naming; see the signal normalizer for alias resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExogenousSignal {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    pub impact: SignalImpact,
    #[serde(default)]
    pub description: String,
}

/// Combined directional call for a metal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

/// Weighted contribution of each factor to the combined score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contributions {
    pub trend: f64,
    pub usd: f64,
    pub fed: f64,
    pub inflation: f64,
}

/// Client-side combined bias for a metal. This is the fallback path; the
/// backend bias endpoint is authoritative when reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub metal: Metal,
    /// Weighted score in [-1, 1], rounded to two decimals.
    pub weighted_score: f64,
    pub combined_bias: Bias,
    pub contributions: Contributions,
    /// Canonical signal names that could not be resolved from the
    /// backend's signal list.
    pub missing_signals: Vec<String>,
}

/// Full client-side analysis bundle for one metal: the time-series view
/// of the past plus the exogenous view of the present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalAnalysis {
    pub metal: Metal,
    pub series: TimeSeriesAnalysis,
    pub signals: Vec<ExogenousSignal>,
    pub combined_bias: Bias,
    pub last_price: f64,
}

/// Past (time-series) breakdown in the backend bias response.
#[derive(Debug, Clone, Deserialize)]
pub struct BiasPast {
    pub trend: String,
    pub strength_pct: f64,
    pub phase: String,
    pub ma_short: f64,
    pub ma_long: f64,
    pub score: f64,
}

/// Present (exogenous) entry in the backend bias response. The backend
/// sends `value` as either a number or a string depending on the signal.
#[derive(Debug, Clone, Deserialize)]
pub struct BiasSignal {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub unit: String,
    pub impact: SignalImpact,
    #[serde(default)]
    pub description: String,
}

/// Response of `GET /api/market/bias?metal=...`: the server-computed
/// combined bias, treated as authoritative over the client calculation.
#[derive(Debug, Clone, Deserialize)]
pub struct BiasResponse {
    pub combined_bias: f64,
    pub past: Option<BiasPast>,
    #[serde(default)]
    pub present: Vec<BiasSignal>,
    #[serde(default)]
    pub present_score: f64,
    #[serde(default)]
    pub computed_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exogenous_signal_minimal_payload() {
        // Backend may omit everything except name and impact.
        let json = r#"{"name": "usd_index", "impact": "bearish"}"#;
        let signal: ExogenousSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.name, "usd_index");
        assert_eq!(signal.impact, SignalImpact::Bearish);
        assert_eq!(signal.label, "");
        assert_eq!(signal.value, 0.0);
    }

    #[test]
    fn test_bias_response_with_null_past() {
        let json = r#"{
            "combined_bias": 0.42,
            "past": null,
            "present": [],
            "present_score": 0.0,
            "computed_at": "2025-01-01T00:00:00Z"
        }"#;
        let bias: BiasResponse = serde_json::from_str(json).unwrap();
        assert!(bias.past.is_none());
        assert_eq!(bias.combined_bias, 0.42);
    }

    #[test]
    fn test_bias_signal_accepts_string_value() {
        let json = r#"{"name": "fed_rates", "value": "5.25", "impact": "neutral"}"#;
        let signal: BiasSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.value.as_str(), Some("5.25"));
    }

    #[test]
    fn test_prediction_serializes_camel_case() {
        let prediction = Prediction {
            metal: Metal::Gold,
            weighted_score: 0.4,
            combined_bias: Bias::Bullish,
            contributions: Contributions {
                trend: 0.4,
                usd: 0.0,
                fed: 0.0,
                inflation: 0.0,
            },
            missing_signals: vec!["inflation".to_string()],
        };
        let json = serde_json::to_string(&prediction).unwrap();
        assert!(json.contains("weightedScore"));
        assert!(json.contains("combinedBias"));
        assert!(json.contains("missingSignals"));
    }
}
