//! Backend REST client.
//!
//! Thin client over the dashboard backend: market data (bias, exogenous
//! signals, OHLC history), the trading bot endpoints, and auth. Attaches
//! the bearer token from the injected session store; any 401 clears the
//! session and flips the auth watch before surfacing `Unauthorized`.

use crate::error::{AppError, Result};
use crate::services::normalize;
use crate::services::{analysis, prediction};
use crate::services::{AuthWatch, SessionStore};
use crate::types::{
    BiasResponse, BotStatus, Candle, ClosedTrade, ExogenousSignal, LoginRequest, LoginResponse,
    Metal, MetalAnalysis, Prediction, SignupRequest, StartRequest, Timeframe,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo-style chart response served by `/api/market/metal/{metal}`.
/// Quote arrays are nullable per point; a null close drops the point.
#[derive(Debug, Deserialize)]
struct YahooChart {
    chart: YahooChartBody,
}

#[derive(Debug, Deserialize)]
struct YahooChartBody {
    #[serde(default)]
    result: Option<Vec<YahooResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize, Default)]
struct YahooQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

/// First 200 bytes of an error body for logging, truncated on a char
/// boundary so multibyte text (accented backend messages) cannot panic
/// the slice.
fn body_snippet(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// REST client for the dashboard backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    auth: Arc<AuthWatch>,
}

impl BackendClient {
    /// Create a new client against the given base URL.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
        auth: Arc<AuthWatch>,
    ) -> Self {
        let client = Client::builder()
            .user_agent("Ingot/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            session,
            auth,
        }
    }

    pub fn auth_watch(&self) -> Arc<AuthWatch> {
        Arc::clone(&self.auth)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request, handling 401 and non-success statuses uniformly.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Global side effect: the session is dead, drop it.
            self.session.clear();
            self.auth.set_authenticated(false);
            return Err(AppError::Unauthorized);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("Backend returned {}: {}", status, body_snippet(&text));
            return Err(AppError::ExternalApi(format!("HTTP {}", status)));
        }

        Ok(response)
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST /auth/login`. Stores the returned token on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .send(self.request(Method::POST, "/auth/login").json(&body))
            .await?;
        let login: LoginResponse = response.json().await?;
        self.session.set_token(login.token.clone());
        self.auth.set_authenticated(true);
        Ok(login)
    }

    /// `POST /users` (signup). Does not log in.
    pub async fn signup(&self, request: &SignupRequest) -> Result<()> {
        self.send(self.request(Method::POST, "/users").json(request))
            .await?;
        Ok(())
    }

    /// Drop the local session. No backend call; tokens are stateless.
    pub fn logout(&self) {
        self.session.clear();
        self.auth.set_authenticated(false);
    }

    // ------------------------------------------------------------------
    // Market data
    // ------------------------------------------------------------------

    /// Server-computed combined bias for a metal (authoritative).
    pub async fn bias(&self, metal: Metal) -> Result<BiasResponse> {
        let path = format!("/api/market/bias?metal={}", metal);
        let response = self.send(self.request(Method::GET, &path)).await?;
        Ok(response.json().await?)
    }

    /// Current macro signals.
    pub async fn exogenous_signals(&self) -> Result<Vec<ExogenousSignal>> {
        let response = self
            .send(self.request(Method::GET, "/api/market/exogenous-signals"))
            .await?;
        Ok(response.json().await?)
    }

    /// OHLC history for a metal. Gold goes through the Binance proxy,
    /// silver and platinum through the Yahoo-backed metal endpoint.
    pub async fn history(&self, metal: Metal, timeframe: Timeframe) -> Result<Vec<Candle>> {
        match metal {
            Metal::Gold => self.gold_history(timeframe).await,
            Metal::Silver | Metal::Platinum => self.metal_history(metal, timeframe).await,
        }
    }

    /// `GET /api/market/binance/gold?range=...` returns raw kline rows
    /// (`[openTimeMs, "open", "high", "low", "close", ...]`). Prices
    /// arrive as strings; rows that fail to coerce are skipped.
    async fn gold_history(&self, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let path = format!(
            "/api/market/binance/gold?range={}",
            timeframe.binance_range()
        );
        let response = self.send(self.request(Method::GET, &path)).await?;
        let rows: Vec<Vec<Value>> = response.json().await?;

        let candles: Vec<Candle> = rows
            .iter()
            .filter_map(|row| {
                let time_ms = row.first().and_then(Value::as_i64)?;
                Some(Candle {
                    time: time_ms / 1000,
                    open: normalize::coerce_f64(row.get(1)?)?,
                    high: normalize::coerce_f64(row.get(2)?)?,
                    low: normalize::coerce_f64(row.get(3)?)?,
                    close: normalize::coerce_f64(row.get(4)?)?,
                })
            })
            .collect();

        debug!("Gold history: {} candles ({})", candles.len(), timeframe);
        Ok(candles)
    }

    /// `GET /api/market/metal/{metal}?interval=...&range=...`
    async fn metal_history(&self, metal: Metal, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let (range, interval) = timeframe.yahoo_range_interval();
        let path = format!(
            "/api/market/metal/{}?interval={}&range={}",
            metal, interval, range
        );
        let response = self.send(self.request(Method::GET, &path)).await?;
        let chart: YahooChart = response.json().await?;

        let result = chart
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| AppError::InvalidResponse("empty chart result".to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let closes = quote.close.unwrap_or_default();
        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();

        let at = |list: &[Option<f64>], i: usize| list.get(i).copied().flatten();

        let candles: Vec<Candle> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &time)| {
                // A null close invalidates the point; missing open/high/
                // low backfill from the close.
                let close = at(&closes, i)?;
                Some(Candle {
                    time,
                    open: at(&opens, i).unwrap_or(close),
                    high: at(&highs, i).unwrap_or(close),
                    low: at(&lows, i).unwrap_or(close),
                    close,
                })
            })
            .collect();

        debug!("{} history: {} candles ({})", metal, candles.len(), timeframe);
        Ok(candles)
    }

    /// Full client-side analysis for a metal over one month of history.
    ///
    /// Returns `Ok(None)` when history is too short to analyze. Signal
    /// fetch failures degrade to an empty signal list, as the dashboard
    /// did. The server bias endpoint supersedes this path when reachable.
    pub async fn full_analysis(&self, metal: Metal) -> Result<Option<MetalAnalysis>> {
        let history = self.history(metal, Timeframe::OneMonth).await?;
        let Some(series) = analysis::analyze(&history) else {
            return Ok(None);
        };
        let last_price = history.last().map(|c| c.close).unwrap_or(0.0);

        let signals = match self.exogenous_signals().await {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Exogenous signal fetch failed: {}", e);
                Vec::new()
            }
        };

        let combined_bias = prediction::combine_bias(&series, &signals);
        Ok(Some(MetalAnalysis {
            metal,
            series,
            signals,
            combined_bias,
            last_price,
        }))
    }

    /// Weighted client-side prediction (fallback path).
    pub async fn prediction(&self, metal: Metal) -> Result<Option<Prediction>> {
        let analysis = self.full_analysis(metal).await?;
        Ok(analysis.map(|a| prediction::predict_from_analysis(&a)))
    }

    // ------------------------------------------------------------------
    // Trading bot
    // ------------------------------------------------------------------

    /// `GET /api/bot/status`, normalized.
    pub async fn bot_status(&self) -> Result<BotStatus> {
        let response = self.send(self.request(Method::GET, "/api/bot/status")).await?;
        let raw: Value = response.json().await?;
        Ok(normalize::normalize_status(&raw))
    }

    /// `POST /api/bot/start`.
    pub async fn bot_start(&self, request: &StartRequest) -> Result<BotStatus> {
        let response = self
            .send(self.request(Method::POST, "/api/bot/start").json(request))
            .await?;
        let raw: Value = response.json().await?;
        Ok(normalize::normalize_status(&raw))
    }

    /// `POST /api/bot/stop`.
    pub async fn bot_stop(&self) -> Result<BotStatus> {
        let response = self
            .send(
                self.request(Method::POST, "/api/bot/stop")
                    .json(&serde_json::json!({})),
            )
            .await?;
        let raw: Value = response.json().await?;
        Ok(normalize::normalize_status(&raw))
    }

    /// `POST /api/bot/sell` for one metal's position.
    pub async fn bot_sell(&self, metal: Metal) -> Result<BotStatus> {
        let response = self
            .send(
                self.request(Method::POST, "/api/bot/sell")
                    .json(&serde_json::json!({ "metal": metal })),
            )
            .await?;
        let raw: Value = response.json().await?;
        Ok(normalize::normalize_status(&raw))
    }

    /// `GET /api/bot/history`, normalized and filtered.
    pub async fn bot_history(&self) -> Result<Vec<ClosedTrade>> {
        let response = self
            .send(self.request(Method::GET, "/api/bot/history"))
            .await?;
        let raw: Value = response.json().await?;
        Ok(normalize::normalize_history(&raw))
    }

    /// `GET /api/bot/available-metals`. Unknown metal names are skipped.
    pub async fn bot_available_metals(&self) -> Result<Vec<Metal>> {
        let response = self
            .send(self.request(Method::GET, "/api/bot/available-metals"))
            .await?;
        let names: Vec<String> = response.json().await?;
        Ok(names
            .iter()
            .filter_map(|name| Metal::from_str(name).ok())
            .collect())
    }
}
