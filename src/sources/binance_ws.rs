//! Live gold price stream.
//!
//! Consumes 1-minute kline updates for PAXG/USDT directly from the
//! exchange WebSocket; this is the only metal with a live feed. Updates
//! fan out on a broadcast channel last-write-wins; consumers only care
//! about the latest value. The stream reconnects on failure and must be
//! torn down explicitly via its handle when no view consumes it.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub const DEFAULT_GOLD_STREAM_URL: &str = "wss://stream.binance.com:9443/ws/paxgusdt@kline_1m";

const RECONNECT_DELAY_SECS: u64 = 5;

/// One live kline update.
#[derive(Debug, Clone, Copy)]
pub struct LiveKline {
    /// Kline open time, unix seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Whether this kline is final (minute rolled over).
    pub closed: bool,
}

/// Raw kline event frame.
#[derive(Debug, Deserialize)]
struct KlineEvent {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "k")]
    kline: KlineData,
}

/// Kline payload; prices arrive as strings.
#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(rename = "t")]
    open_time_ms: i64,
    #[serde(rename = "o")]
    open: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "x")]
    closed: bool,
}

impl KlineData {
    fn to_live(&self) -> Option<LiveKline> {
        Some(LiveKline {
            time: self.open_time_ms / 1000,
            open: self.open.parse().ok()?,
            high: self.high.parse().ok()?,
            low: self.low.parse().ok()?,
            close: self.close.parse().ok()?,
            closed: self.closed,
        })
    }
}

/// Handle for an active live stream. Dropping the handle does not stop
/// the stream; call [`StreamHandle::shutdown`] to tear the connection
/// down when the consuming view goes away.
pub struct StreamHandle {
    tx: broadcast::Sender<LiveKline>,
    shutdown: watch::Sender<bool>,
}

impl StreamHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<LiveKline> {
        self.tx.subscribe()
    }

    /// Stop the stream task and close the connection.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Gold live-stream client.
#[derive(Clone)]
pub struct GoldStream {
    url: String,
}

impl GoldStream {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Spawn the stream task and return its handle.
    pub fn start(&self) -> StreamHandle {
        let (tx, _) = broadcast::channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let client = self.clone();
        let stream_tx = tx.clone();
        tokio::spawn(async move {
            client.run(stream_tx, shutdown_rx).await;
        });

        StreamHandle {
            tx,
            shutdown: shutdown_tx,
        }
    }

    /// Connect-and-reconnect loop; exits when shutdown is signalled.
    async fn run(&self, tx: broadcast::Sender<LiveKline>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_connection(&tx, &mut shutdown).await {
                Ok(true) => {
                    info!("Gold stream shut down");
                    break;
                }
                Ok(false) => {
                    warn!("Gold stream disconnected, reconnecting...");
                }
                Err(e) => {
                    error!("Gold stream error: {}, reconnecting...", e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(RECONNECT_DELAY_SECS)) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// One connection lifetime. Returns `Ok(true)` when shutdown was
    /// requested, `Ok(false)` on a clean disconnect.
    async fn run_connection(
        &self,
        tx: &broadcast::Sender<LiveKline>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> anyhow::Result<bool> {
        info!("Connecting to gold kline stream");
        let (ws_stream, _) = connect_async(&self.url).await?;
        let (mut write, mut read) = ws_stream.split();
        info!("Connected to gold kline stream");

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_message(&text, tx);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("Gold stream closed by remote");
                            return Ok(false);
                        }
                        Some(Err(e)) => {
                            error!("Gold stream read error: {}", e);
                            return Ok(false);
                        }
                        None => return Ok(false),
                        _ => {}
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        let _ = write.send(Message::Close(None)).await;
                        return Ok(true);
                    }
                }
            }
        }
    }

    fn handle_message(&self, text: &str, tx: &broadcast::Sender<LiveKline>) {
        let Ok(event) = serde_json::from_str::<KlineEvent>(text) else {
            return;
        };
        if event.event_type != "kline" {
            return;
        }
        if let Some(kline) = event.kline.to_live() {
            debug!("Gold kline: close={} final={}", kline.close, kline.closed);
            let _ = tx.send(kline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KLINE_FRAME: &str = r#"{
        "e": "kline",
        "E": 1700000000123,
        "s": "PAXGUSDT",
        "k": {
            "t": 1700000000000,
            "T": 1700000059999,
            "s": "PAXGUSDT",
            "i": "1m",
            "o": "1975.20",
            "c": "1976.45",
            "h": "1977.00",
            "l": "1975.00",
            "v": "12.5",
            "x": false
        }
    }"#;

    #[test]
    fn test_kline_frame_parses() {
        let event: KlineEvent = serde_json::from_str(KLINE_FRAME).unwrap();
        assert_eq!(event.event_type, "kline");
        let live = event.kline.to_live().unwrap();
        assert_eq!(live.time, 1_700_000_000);
        assert_eq!(live.close, 1976.45);
        assert!(!live.closed);
    }

    #[test]
    fn test_bad_price_string_is_skipped() {
        let data = KlineData {
            open_time_ms: 0,
            open: "x".to_string(),
            high: "1".to_string(),
            low: "1".to_string(),
            close: "1".to_string(),
            closed: true,
        };
        assert!(data.to_live().is_none());
    }

    #[test]
    fn test_non_kline_frame_ignored() {
        let stream = GoldStream::new(DEFAULT_GOLD_STREAM_URL);
        let (tx, mut rx) = broadcast::channel(8);
        stream.handle_message(r#"{"e": "trade", "k": null}"#, &tx);
        stream.handle_message("not json", &tx);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_shutdown_signal() {
        let stream = GoldStream::new("ws://127.0.0.1:1/unreachable");
        let handle = stream.start();
        handle.shutdown();
        // The run loop observes the flag and exits; nothing to assert
        // beyond not hanging.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}
