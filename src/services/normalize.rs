//! Bot payload normalization.
//!
//! The backend sends bot status, trades, and config with inconsistent
//! field naming (camelCase from newer revisions, snake_case from older
//! ones) and occasionally as legacy single-position payloads. Everything
//! here is total and defensive: a malformed record is dropped or mapped
//! to `None`, never a panic, and numeric coercion never fails.

use crate::types::{BotConfig, BotStatus, ClosedTrade, Metal, OpenTrade};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// Result of looking up a logical field through its name candidates.
/// An explicit JSON `null` is preserved as `Null`, distinct from a key
/// that is absent altogether.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> FieldValue<T> {
    /// Collapse to an option, treating explicit null as absent.
    pub fn into_option(self) -> Option<T> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn or_default(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }
}

/// Resolve a numeric field through an ordered list of name candidates
/// (camelCase first, then snake_case by convention). Accepts JSON
/// numbers and numeric strings; anything else is skipped.
pub fn num_from(obj: &Value, keys: &[&str]) -> FieldValue<f64> {
    for key in keys {
        match obj.get(key) {
            Some(Value::Null) => return FieldValue::Null,
            Some(value) => {
                if let Some(n) = coerce_f64(value) {
                    return FieldValue::Value(n);
                }
            }
            None => {}
        }
    }
    FieldValue::Absent
}

/// Resolve a string field through an ordered list of name candidates.
pub fn str_from(obj: &Value, keys: &[&str]) -> FieldValue<String> {
    for key in keys {
        match obj.get(key) {
            Some(Value::Null) => return FieldValue::Null,
            Some(Value::String(s)) => return FieldValue::Value(s.clone()),
            Some(_) => {}
            None => {}
        }
    }
    FieldValue::Absent
}

/// Lenient f64 coercion: JSON number, or a string that parses as one.
/// Never panics; unparseable input is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize the bot config object. All-or-nothing: when any of the four
/// required thresholds fails to resolve as a number the whole config is
/// absent, so stale or partial thresholds are never displayed.
pub fn normalize_config(raw: &Value) -> Option<BotConfig> {
    if !raw.is_object() {
        return None;
    }

    let take_profit_pct = num_from(raw, &["takeProfitPct", "take_profit_pct"]).into_option();
    let stop_loss_pct = num_from(raw, &["stopLossPct", "stop_loss_pct"]).into_option();
    let min_hold_minutes = num_from(raw, &["minHoldMinutes", "min_hold_minutes"]).into_option();
    let cooldown_minutes = num_from(raw, &["cooldownMinutes", "cooldown_minutes"]).into_option();

    let (take_profit_pct, stop_loss_pct, min_hold_minutes, cooldown_minutes) = match (
        take_profit_pct,
        stop_loss_pct,
        min_hold_minutes,
        cooldown_minutes,
    ) {
        (Some(tp), Some(sl), Some(hold), Some(cooldown)) => (tp, sl, hold, cooldown),
        _ => return None,
    };

    let metals = raw.get("metals").and_then(Value::as_array).map(|list| {
        list.iter()
            .filter_map(Value::as_str)
            .filter_map(|s| Metal::from_str(s).ok())
            .collect::<Vec<_>>()
    });

    Some(BotConfig {
        take_profit_pct,
        stop_loss_pct,
        trailing_activation_pct: num_from(raw, &["trailingActivationPct", "trailing_activation_pct"])
            .or_default(0.0),
        trailing_drop_pct: num_from(raw, &["trailingDropPct", "trailing_drop_pct"]).or_default(0.0),
        spread_pct: num_from(raw, &["spreadPct", "spread_pct"]).or_default(0.0),
        min_hold_minutes,
        cooldown_minutes,
        take_profit_min_eur: num_from(raw, &["takeProfitMinEur", "take_profit_min_eur"])
            .into_option(),
        leverage: num_from(raw, &["leverage"]).into_option(),
        lots: num_from(raw, &["lots"]).into_option(),
        metals: metals.filter(|m| !m.is_empty()),
    })
}

/// Normalize one open-trade record. Dropped when the metal is unknown;
/// an unrecognized metal means the record belongs to a newer backend
/// this client does not understand.
pub fn normalize_open_trade(raw: &Value) -> Option<OpenTrade> {
    if !raw.is_object() {
        return None;
    }

    let metal_str = str_from(raw, &["metal"]).or_default("gold".to_string());
    let metal = Metal::from_str(&metal_str).ok()?;

    Some(OpenTrade {
        id: str_from(raw, &["id"]).or_default(String::new()),
        metal,
        entry_price: num_from(raw, &["entryPrice", "entry_price"]).or_default(0.0),
        invested_amount: num_from(raw, &["investedAmount", "invested_amount"]).or_default(0.0),
        open_date: str_from(raw, &["openDate", "open_date"]).or_default(String::new()),
        current_price_usdt: num_from(raw, &["currentPriceUsdt", "current_price_usdt"])
            .into_option(),
        current_pnl_pct: num_from(raw, &["currentPnlPct", "current_pnl_pct"]).into_option(),
        current_realized_pnl_eur: num_from(
            raw,
            &["currentRealizedPnlEur", "current_realized_pnl_eur"],
        )
        .into_option(),
        leverage: num_from(raw, &["leverage"]).into_option(),
        lots: num_from(raw, &["lots"]).into_option(),
    })
}

/// Normalize one closed-trade record. A record without a resolvable,
/// non-null realized PnL is corrupt or still open and is dropped rather
/// than entering history half-populated.
pub fn normalize_closed_trade(raw: &Value) -> Option<ClosedTrade> {
    if !raw.is_object() {
        return None;
    }

    let metal_str = str_from(raw, &["metal"]).or_default("gold".to_string());
    let metal = Metal::from_str(&metal_str).ok()?;

    let realized_pnl = num_from(raw, &["realizedPnl", "realized_pnl"]).into_option()?;

    Some(ClosedTrade {
        id: str_from(raw, &["id"]).or_default(String::new()),
        metal,
        entry_price: num_from(raw, &["entryPrice", "entry_price"]).or_default(0.0),
        exit_price: num_from(raw, &["exitPrice", "exit_price"]).or_default(0.0),
        invested_amount: num_from(raw, &["investedAmount", "invested_amount"]).or_default(0.0),
        realized_pnl,
        open_date: str_from(raw, &["openDate", "open_date"]).or_default(String::new()),
        close_date: str_from(raw, &["closeDate", "close_date"]).or_default(String::new()),
        leverage: num_from(raw, &["leverage"]).into_option(),
        lots: num_from(raw, &["lots"]).into_option(),
    })
}

/// Normalize a list of closed trades, dropping rejected records.
pub fn normalize_closed_trades(raw: &Value) -> Vec<ClosedTrade> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    let trades: Vec<ClosedTrade> = items.iter().filter_map(normalize_closed_trade).collect();
    if trades.len() < items.len() {
        debug!(
            dropped = items.len() - trades.len(),
            "Dropped closed trades without realized PnL"
        );
    }
    trades
}

/// Normalize the bot history payload: either a bare array or the
/// wrapped `{ "trades": [...] }` shape.
pub fn normalize_history(raw: &Value) -> Vec<ClosedTrade> {
    if raw.is_array() {
        return normalize_closed_trades(raw);
    }
    match raw.get("trades") {
        Some(trades) => normalize_closed_trades(trades),
        None => Vec::new(),
    }
}

/// Normalize the full `GET /api/bot/status` payload into the canonical
/// status shape. Legacy single-position payloads (`currentOpenTrade`
/// object, no array) are synthesized into the same list form.
pub fn normalize_status(raw: &Value) -> BotStatus {
    let running = raw
        .get("running")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let allocated_amount = num_from(raw, &["allocatedAmount", "allocated_amount"]).into_option();
    let current_price_usdt = num_from(raw, &["currentPriceUsdt", "current_price_usdt"])
        .into_option();
    let current_pnl_pct = num_from(raw, &["currentPnlPct", "current_pnl_pct"]).into_option();

    let mut open_trades: Vec<OpenTrade> = raw
        .get("currentOpenTrades")
        .or_else(|| raw.get("current_open_trades"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_open_trade).collect())
        .unwrap_or_default();

    // Legacy payload: one open trade, no array. Synthesize a one-element
    // list, inheriting the top-level price/PnL fields when the item
    // itself lacks them.
    if open_trades.is_empty() {
        let single = raw
            .get("currentOpenTrade")
            .or_else(|| raw.get("current_open_trade"));
        if let Some(trade) = single.and_then(normalize_open_trade) {
            let mut trade = trade;
            if trade.current_price_usdt.is_none() {
                trade.current_price_usdt = current_price_usdt;
            }
            if trade.current_pnl_pct.is_none() {
                trade.current_pnl_pct = current_pnl_pct;
            }
            open_trades.push(trade);
        }
    }

    let last_closed_trades = raw
        .get("lastClosedTrades")
        .or_else(|| raw.get("last_closed_trades"))
        .map(normalize_closed_trades)
        .unwrap_or_default();

    let config = raw.get("config").and_then(|c| normalize_config(c));

    BotStatus {
        running,
        allocated_amount,
        open_trades,
        last_closed_trades,
        config,
        current_price_usdt,
        current_pnl_pct,
    }
}
