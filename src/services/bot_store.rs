//! Last-known-good bot state with change notification.

use crate::types::{BotConfig, BotStatus, ClosedTrade, OpenTrade};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tokio::sync::broadcast;

/// State container for the bot panel.
///
/// The status is replaced wholesale on every successful poll. Errors are
/// tracked separately so consumers can show stale-but-valid data next to
/// an error indicator instead of a blank panel.
pub struct BotStateStore {
    status: RwLock<Option<BotStatus>>,
    error: RwLock<Option<String>>,
    history: RwLock<Vec<ClosedTrade>>,
    history_loaded: AtomicBool,
    tx: broadcast::Sender<BotStatus>,
}

impl BotStateStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            status: RwLock::new(None),
            error: RwLock::new(None),
            history: RwLock::new(Vec::new()),
            history_loaded: AtomicBool::new(false),
            tx,
        }
    }

    /// Subscribe to accepted status updates.
    pub fn subscribe(&self) -> broadcast::Receiver<BotStatus> {
        self.tx.subscribe()
    }

    /// Accept a new status, clear the error flag, and notify observers.
    pub fn apply_status(&self, status: BotStatus) {
        if let Ok(mut guard) = self.status.write() {
            *guard = Some(status.clone());
        }
        if let Ok(mut guard) = self.error.write() {
            *guard = None;
        }
        let _ = self.tx.send(status);
    }

    /// Record a poll failure. Previously known status is retained.
    pub fn set_error(&self, message: String) {
        if let Ok(mut guard) = self.error.write() {
            *guard = Some(message);
        }
    }

    pub fn clear_error(&self) {
        if let Ok(mut guard) = self.error.write() {
            *guard = None;
        }
    }

    /// Last accepted status, if any poll has succeeded.
    pub fn status(&self) -> Option<BotStatus> {
        self.status.read().ok().and_then(|guard| guard.clone())
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().ok().and_then(|guard| guard.clone())
    }

    pub fn is_running(&self) -> bool {
        self.status().map(|s| s.running).unwrap_or(false)
    }

    pub fn config(&self) -> Option<BotConfig> {
        self.status().and_then(|s| s.config)
    }

    /// All open positions from the last status.
    pub fn active_positions(&self) -> Vec<OpenTrade> {
        self.status().map(|s| s.open_trades).unwrap_or_default()
    }

    /// Replace the closed-trade history (from `GET /api/bot/history`).
    pub fn set_history(&self, trades: Vec<ClosedTrade>) {
        if let Ok(mut guard) = self.history.write() {
            *guard = trades;
        }
        self.history_loaded.store(true, Ordering::Release);
    }

    /// Closed trades to display: the full history once loaded, otherwise
    /// the short `last_closed_trades` list from the status.
    pub fn displayed_closed_trades(&self) -> Vec<ClosedTrade> {
        if self.history_loaded.load(Ordering::Acquire) {
            return self
                .history
                .read()
                .map(|guard| guard.clone())
                .unwrap_or_default();
        }
        self.status()
            .map(|s| s.last_closed_trades)
            .unwrap_or_default()
    }
}

impl Default for BotStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metal;

    fn status_with_closed(id: &str) -> BotStatus {
        let mut status = BotStatus::empty();
        status.running = true;
        status.last_closed_trades.push(ClosedTrade {
            id: id.to_string(),
            metal: Metal::Gold,
            entry_price: 1900.0,
            exit_price: 1910.0,
            invested_amount: 100.0,
            realized_pnl: 0.5,
            open_date: String::new(),
            close_date: String::new(),
            leverage: None,
            lots: None,
        });
        status
    }

    #[test]
    fn test_error_retains_last_status() {
        let store = BotStateStore::new();
        store.apply_status(status_with_closed("a"));
        assert!(store.is_running());
        assert!(store.error().is_none());

        store.set_error("backend down".to_string());
        // Status survives, error is flagged separately.
        assert!(store.is_running());
        assert_eq!(store.error().as_deref(), Some("backend down"));

        // A later successful poll clears the flag.
        store.apply_status(status_with_closed("b"));
        assert!(store.error().is_none());
    }

    #[test]
    fn test_displayed_trades_prefer_loaded_history() {
        let store = BotStateStore::new();
        store.apply_status(status_with_closed("from-status"));
        assert_eq!(store.displayed_closed_trades()[0].id, "from-status");

        store.set_history(Vec::new());
        // History loaded (even empty) wins over the status excerpt.
        assert!(store.displayed_closed_trades().is_empty());
    }

    #[test]
    fn test_subscribers_see_updates() {
        let store = BotStateStore::new();
        let mut rx = store.subscribe();
        store.apply_status(status_with_closed("x"));
        let update = tokio_test::block_on(rx.recv()).unwrap();
        assert!(update.running);
    }
}
