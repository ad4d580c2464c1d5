//! Trading bot client state.
//!
//! `BotStateStore` is the explicit state container behind the bot panel:
//! it keeps the last-known-good status, a separate error flag, and the
//! closed-trade history, and broadcasts every accepted update. A failed
//! poll never clears previously known state; it only raises the flag.

use crate::error::Result;
use crate::services::bot_store::BotStateStore;
use crate::sources::BackendClient;
use crate::types::{BotStatus, ClosedTrade, Metal, StartRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// High-level bot control service: wraps the backend client and keeps
/// the state store current.
#[derive(Clone)]
pub struct TradingBotService {
    client: Arc<BackendClient>,
    store: Arc<BotStateStore>,
    poll_interval: Duration,
}

impl TradingBotService {
    pub fn new(client: Arc<BackendClient>, store: Arc<BotStateStore>) -> Self {
        Self {
            client,
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> Arc<BotStateStore> {
        Arc::clone(&self.store)
    }

    /// Fetch the status once and update the store. On failure the store
    /// keeps its last-known-good status and records the error.
    pub async fn fetch_status(&self) -> Option<BotStatus> {
        match self.client.bot_status().await {
            Ok(status) => {
                self.store.apply_status(status.clone());
                Some(status)
            }
            Err(e) => {
                warn!("Bot status fetch failed: {}", e);
                self.store.set_error(e.to_string());
                None
            }
        }
    }

    /// Start the bot. The response carries the refreshed status.
    pub async fn start(&self, request: StartRequest) -> Result<BotStatus> {
        self.store.clear_error();
        let status = self.client.bot_start(&request).await?;
        self.store.apply_status(status.clone());
        Ok(status)
    }

    /// Stop the bot.
    pub async fn stop(&self) -> Result<BotStatus> {
        self.store.clear_error();
        let status = self.client.bot_stop().await?;
        self.store.apply_status(status.clone());
        Ok(status)
    }

    /// Manually close the position for one metal. On success the full
    /// history is reloaded so the new closed trade appears immediately.
    pub async fn sell(&self, metal: Metal) -> Result<BotStatus> {
        self.store.clear_error();
        let status = self.client.bot_sell(metal).await?;
        self.store.apply_status(status.clone());
        if let Err(e) = self.load_history().await {
            warn!("History reload after sell failed: {}", e);
        }
        Ok(status)
    }

    /// Load the full closed-trade history. Until this has succeeded once
    /// the store serves the status-derived `last_closed_trades` instead.
    pub async fn load_history(&self) -> Result<Vec<ClosedTrade>> {
        let trades = self.client.bot_history().await?;
        self.store.set_history(trades.clone());
        Ok(trades)
    }

    /// Metals the bot supports. Falls back to the full list only when
    /// the endpoint is unreachable; a successful response is passed
    /// through as-is, even empty.
    pub async fn available_metals(&self) -> Vec<Metal> {
        match self.client.bot_available_metals().await {
            Ok(metals) => metals,
            Err(e) => {
                debug!("available-metals fetch failed, using defaults: {}", e);
                Metal::ALL.to_vec()
            }
        }
    }

    /// Poll the status on a fixed interval. Sequential by construction:
    /// the next request is only issued after the previous response (or
    /// error) resolves, so at most one status request is in flight.
    pub async fn run_polling(&self) {
        loop {
            self.fetch_status().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
