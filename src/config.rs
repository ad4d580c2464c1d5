use crate::sources::binance_ws::DEFAULT_GOLD_STREAM_URL;
use std::env;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (no trailing slash).
    pub api_url: String,
    /// Gold live kline stream URL.
    pub gold_stream_url: String,
    /// Bot status poll interval.
    pub poll_interval: Duration,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Login credentials for the monitor binary, if provided.
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let api_url = env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let poll_interval_ms: u64 = env::var("BOT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        let request_timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            api_url,
            gold_stream_url: env::var("GOLD_STREAM_URL")
                .unwrap_or_else(|_| DEFAULT_GOLD_STREAM_URL.to_string()),
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            email: env::var("INGOT_EMAIL").ok(),
            password: env::var("INGOT_PASSWORD").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            gold_stream_url: DEFAULT_GOLD_STREAM_URL.to_string(),
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            email: None,
            password: None,
        }
    }
}
