//! Last-write-wins live price state.
//!
//! Holds the most recent price seen per metal, whatever the transport:
//! the gold kline stream, or prices embedded in bot status polls for
//! silver and platinum. No ordering guarantee beyond arrival order;
//! consumers only care about the latest value.

use crate::types::{BotStatus, Metal};
use dashmap::DashMap;
use tokio::sync::broadcast;

/// A price observation for one metal.
#[derive(Debug, Clone, Copy)]
pub struct LivePrice {
    pub metal: Metal,
    pub price: f64,
    /// Unix timestamp (seconds) of the observation.
    pub time: i64,
}

/// Concurrent price cache with update fan-out.
pub struct LivePriceCache {
    prices: DashMap<Metal, LivePrice>,
    tx: broadcast::Sender<LivePrice>,
}

impl LivePriceCache {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            prices: DashMap::new(),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LivePrice> {
        self.tx.subscribe()
    }

    /// Record a price. Later writes win regardless of source.
    pub fn update(&self, metal: Metal, price: f64, time: i64) {
        if !price.is_finite() || price <= 0.0 {
            return;
        }
        let observation = LivePrice { metal, price, time };
        self.prices.insert(metal, observation);
        let _ = self.tx.send(observation);
    }

    /// Fold the per-position prices of a bot status into the cache.
    pub fn update_from_status(&self, status: &BotStatus) {
        let now = chrono::Utc::now().timestamp();
        for trade in &status.open_trades {
            if let Some(price) = trade.current_price_usdt {
                self.update(trade.metal, price, now);
            }
        }
    }

    pub fn price(&self, metal: Metal) -> Option<f64> {
        self.prices.get(&metal).map(|entry| entry.price)
    }

    pub fn all_prices(&self) -> Vec<LivePrice> {
        self.prices.iter().map(|entry| *entry.value()).collect()
    }
}

impl Default for LivePriceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OpenTrade;

    #[test]
    fn test_last_write_wins() {
        let cache = LivePriceCache::new();
        cache.update(Metal::Gold, 1900.0, 1);
        cache.update(Metal::Gold, 1901.5, 2);
        assert_eq!(cache.price(Metal::Gold), Some(1901.5));
        assert_eq!(cache.price(Metal::Silver), None);
    }

    #[test]
    fn test_garbage_prices_ignored() {
        let cache = LivePriceCache::new();
        cache.update(Metal::Gold, 0.0, 1);
        cache.update(Metal::Gold, f64::NAN, 2);
        cache.update(Metal::Gold, -5.0, 3);
        assert_eq!(cache.price(Metal::Gold), None);
    }

    #[test]
    fn test_status_prices_folded_in() {
        let cache = LivePriceCache::new();
        let mut status = BotStatus::empty();
        status.open_trades.push(OpenTrade {
            id: "s".to_string(),
            metal: Metal::Silver,
            entry_price: 24.0,
            invested_amount: 100.0,
            open_date: String::new(),
            current_price_usdt: Some(24.6),
            current_pnl_pct: None,
            current_realized_pnl_eur: None,
            leverage: None,
            lots: None,
        });
        cache.update_from_status(&status);
        assert_eq!(cache.price(Metal::Silver), Some(24.6));
    }
}
