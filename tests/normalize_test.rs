/**
 * Bot Payload Normalization Tests
 *
 * Backend-shaped JSON fixtures pushed through the public normalizer:
 * - camelCase / snake_case field resolution
 * - record acceptance rules (realized PnL, known metals)
 * - legacy single-position synthesis
 * - last-known-good retention in the state store
 */

use ingot::services::normalize::{normalize_history, normalize_status};
use ingot::services::BotStateStore;
use ingot::types::Metal;
use serde_json::json;

#[test]
fn snake_case_status_fully_resolves() {
    let raw = json!({
        "running": true,
        "allocated_amount": 2500.0,
        "current_open_trades": [{
            "id": "t-17",
            "metal": "platinum",
            "entry_price": 912.3,
            "invested_amount": 400.0,
            "open_date": "2025-03-01T09:30:00Z",
            "current_price_usdt": 915.8,
            "current_pnl_pct": 0.0038,
            "current_realized_pnl_eur": 1.31,
            "leverage": 10,
            "lots": null
        }],
        "last_closed_trades": [{
            "id": "t-16",
            "metal": "gold",
            "entry_price": 1890.0,
            "exit_price": 1902.5,
            "invested_amount": 300.0,
            "realized_pnl": 1.98,
            "open_date": "2025-02-28T10:00:00Z",
            "close_date": "2025-02-28T16:45:00Z"
        }],
        "config": {
            "take_profit_pct": 0.01,
            "stop_loss_pct": 0.005,
            "trailing_activation_pct": 0.008,
            "trailing_drop_pct": 0.002,
            "spread_pct": 0.001,
            "min_hold_minutes": 15,
            "cooldown_minutes": 30,
            "take_profit_min_eur": 3,
            "metals": ["gold", "platinum"]
        }
    });

    let status = normalize_status(&raw);
    assert!(status.running);
    assert_eq!(status.allocated_amount, Some(2500.0));

    let trade = &status.open_trades[0];
    assert_eq!(trade.metal, Metal::Platinum);
    assert_eq!(trade.entry_price, 912.3);
    assert_eq!(trade.current_realized_pnl_eur, Some(1.31));
    assert_eq!(trade.leverage, Some(10.0));
    // Explicit null preserved as None rather than defaulted.
    assert_eq!(trade.lots, None);

    assert_eq!(status.last_closed_trades[0].realized_pnl, 1.98);

    let config = status.config.expect("all required thresholds present");
    assert_eq!(config.take_profit_min_eur, Some(3.0));
    assert_eq!(config.metals, Some(vec![Metal::Gold, Metal::Platinum]));
}

#[test]
fn closed_trade_without_pnl_is_dropped() {
    let raw = json!({
        "running": false,
        "lastClosedTrades": [
            {"id": "keep", "metal": "silver", "realizedPnl": -2.4,
             "entryPrice": 24.1, "exitPrice": 23.9},
            {"id": "drop", "metal": "silver", "entryPrice": 24.0, "exitPrice": 24.2}
        ]
    });
    let status = normalize_status(&raw);
    // Output list shrinks by one compared to the payload.
    assert_eq!(status.last_closed_trades.len(), 1);
    assert_eq!(status.last_closed_trades[0].id, "keep");
}

#[test]
fn legacy_single_position_payload_becomes_list() {
    let raw = json!({
        "running": true,
        "allocatedAmount": 500.0,
        "currentOpenTrade": {
            "metal": "gold",
            "entryPrice": 1885.5,
            "investedAmount": 500.0
        },
        "currentPriceUsdt": 1890.2,
        "currentPnlPct": 0.0025
    });

    let status = normalize_status(&raw);
    assert_eq!(status.open_trades.len(), 1);
    let position = &status.open_trades[0];
    assert_eq!(position.entry_price, 1885.5);
    assert_eq!(position.invested_amount, 500.0);
    assert_eq!(position.current_price_usdt, Some(1890.2));
    assert_eq!(position.current_pnl_pct, Some(0.0025));
}

#[test]
fn unknown_metal_positions_are_dropped_silently() {
    let raw = json!({
        "running": true,
        "currentOpenTrades": [
            {"id": "ok", "metal": "silver", "entryPrice": 24.0},
            {"id": "bad", "metal": "palladium", "entryPrice": 950.0}
        ]
    });
    let status = normalize_status(&raw);
    assert_eq!(status.open_trades.len(), 1);
    assert_eq!(status.open_trades[0].metal, Metal::Silver);
}

#[test]
fn partial_config_means_no_config() {
    let raw = json!({
        "running": true,
        "config": {"takeProfitPct": 0.01, "minHoldMinutes": 15}
    });
    // Missing stop loss and cooldown: better no thresholds than wrong ones.
    assert!(normalize_status(&raw).config.is_none());
}

#[test]
fn history_accepts_both_shapes() {
    let wrapped = json!({"trades": [
        {"id": "h1", "metal": "gold", "realized_pnl": 4.2},
        {"id": "h2", "metal": "gold", "realized_pnl": null}
    ]});
    let trades = normalize_history(&wrapped);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].id, "h1");

    let bare = json!([{"id": "h3", "metal": "platinum", "realizedPnl": -1.1}]);
    assert_eq!(normalize_history(&bare).len(), 1);
}

#[test]
fn store_retains_status_across_poll_failures() {
    let store = BotStateStore::new();
    let status = normalize_status(&json!({
        "running": true,
        "currentOpenTrades": [{"id": "t", "metal": "gold", "entryPrice": 1900.0}]
    }));
    store.apply_status(status);

    store.set_error("connect timeout".to_string());

    // Error flag is visible, but the data the panel shows is intact.
    assert_eq!(store.error().as_deref(), Some("connect timeout"));
    assert!(store.is_running());
    assert_eq!(store.active_positions().len(), 1);
}
