use crate::types::Metal;
use serde::{Deserialize, Serialize};

/// Trading bot thresholds, mirrored from `GET /api/bot/status`.
/// Percentage fields are decimals (0.005 = 0.5%). The backend may send
/// camelCase or snake_case; the normalizer produces this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub trailing_activation_pct: f64,
    pub trailing_drop_pct: f64,
    pub spread_pct: f64,
    pub min_hold_minutes: f64,
    pub cooldown_minutes: f64,
    /// Minimum profit in EUR for the auto take-profit, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_min_eur: Option<f64>,
    /// Leverage multiplier (1 = none, 10 = 1:10).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    pub lots: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metals: Option<Vec<Metal>>,
}

/// An open position held by the bot, one per metal at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTrade {
    pub id: String,
    pub metal: Metal,
    pub entry_price: f64,
    pub invested_amount: f64,
    pub open_date: String,
    /// Live price for this metal at status time.
    pub current_price_usdt: Option<f64>,
    /// Unrealized PnL as a fraction (0.008 = +0.8%).
    pub current_pnl_pct: Option<f64>,
    /// Net gain/loss in EUR after spread, leverage applied.
    pub current_realized_pnl_eur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    pub lots: Option<f64>,
}

/// A closed trade, from `lastClosedTrades` or `GET /api/bot/history`.
/// Records without a resolvable realized PnL never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTrade {
    pub id: String,
    pub metal: Metal,
    pub entry_price: f64,
    pub exit_price: f64,
    pub invested_amount: f64,
    pub realized_pnl: f64,
    pub open_date: String,
    pub close_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    pub lots: Option<f64>,
}

/// Canonical bot status after normalization. Replaced wholesale on each
/// poll; this layer never mutates trade state itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub running: bool,
    pub allocated_amount: Option<f64>,
    /// All open positions. Legacy single-trade payloads are synthesized
    /// into this list so consumers handle one shape only.
    pub open_trades: Vec<OpenTrade>,
    pub last_closed_trades: Vec<ClosedTrade>,
    /// Absent when any required threshold failed to resolve.
    pub config: Option<BotConfig>,
    /// Gold price seen by the bot (legacy top-level field).
    pub current_price_usdt: Option<f64>,
    /// Gold position PnL fraction (legacy top-level field).
    pub current_pnl_pct: Option<f64>,
}

impl BotStatus {
    /// An empty, not-running status. Used before the first poll succeeds.
    pub fn empty() -> Self {
        Self {
            running: false,
            allocated_amount: None,
            open_trades: Vec::new(),
            last_closed_trades: Vec::new(),
            config: None,
            current_price_usdt: None,
            current_pnl_pct: None,
        }
    }
}

/// Body of `POST /api/bot/start`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Capital to allocate, in EUR.
    pub capital: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metals: Option<Vec<Metal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lots: Option<f64>,
}

impl StartRequest {
    pub fn new(capital: f64) -> Self {
        Self {
            capital,
            metals: None,
            leverage: None,
            lots: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status() {
        let status = BotStatus::empty();
        assert!(!status.running);
        assert!(status.open_trades.is_empty());
        assert!(status.config.is_none());
    }

    #[test]
    fn test_start_request_omits_unset_fields() {
        let body = serde_json::to_value(StartRequest::new(500.0)).unwrap();
        assert_eq!(body["capital"], 500.0);
        assert!(body.get("metals").is_none());
        assert!(body.get("leverage").is_none());
    }

    #[test]
    fn test_start_request_with_options() {
        let request = StartRequest {
            capital: 1000.0,
            metals: Some(vec![Metal::Gold, Metal::Silver]),
            leverage: Some(10.0),
            lots: Some(0.5),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["metals"][0], "gold");
        assert_eq!(body["leverage"], 10.0);
    }

    #[test]
    fn test_bot_status_serializes_camel_case() {
        let json = serde_json::to_string(&BotStatus::empty()).unwrap();
        assert!(json.contains("allocatedAmount"));
        assert!(json.contains("openTrades"));
        assert!(json.contains("lastClosedTrades"));
    }
}
