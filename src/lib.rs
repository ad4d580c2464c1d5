//! Ingot - Precious-metals market analysis and trading-bot client
//!
//! Client library for the precious-metals dashboard backend:
//! normalization of its loosely-typed bot payloads, time-series analysis
//! over OHLC history, a weighted fallback bias computation, sequential
//! status polling, and a live gold price stream.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used items
pub use config::Config;
pub use error::{AppError, Result};
pub use services::{BotStateStore, TradingBotService};
pub use sources::{BackendClient, GoldStream};
pub use types::*;
