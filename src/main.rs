//! Headless monitor: polls the trading bot and tails the gold stream,
//! logging updates instead of rendering them.

use ingot::services::{
    AuthWatch, BotStateStore, LivePriceCache, MemorySessionStore, TradingBotService,
};
use ingot::sources::{BackendClient, GoldStream};
use ingot::types::Metal;
use ingot::Config;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Starting ingot monitor against {}", config.api_url);

    let session = Arc::new(MemorySessionStore::new());
    let auth = Arc::new(AuthWatch::new());
    let client = Arc::new(BackendClient::new(
        config.api_url.clone(),
        config.request_timeout,
        session.clone(),
        auth.clone(),
    ));

    if let (Some(email), Some(password)) = (&config.email, &config.password) {
        match client.login(email, password).await {
            Ok(_) => info!("Logged in as {}", email),
            Err(e) => warn!("Login failed: {}", e),
        }
    }

    // Trading bot: state store + sequential polling.
    let store = Arc::new(BotStateStore::new());
    let bot = TradingBotService::new(client.clone(), store.clone())
        .with_poll_interval(config.poll_interval);

    let metals = bot.available_metals().await;
    info!("Bot supports: {:?}", metals);

    if let Err(e) = bot.load_history().await {
        warn!("Initial history load failed: {}", e);
    }

    let prices = Arc::new(LivePriceCache::new());

    let mut status_rx = store.subscribe();
    let status_prices = prices.clone();
    tokio::spawn(async move {
        while let Ok(status) = status_rx.recv().await {
            status_prices.update_from_status(&status);
            info!(
                running = status.running,
                open = status.open_trades.len(),
                closed = status.last_closed_trades.len(),
                "Bot status"
            );
        }
    });

    let poller = bot.clone();
    tokio::spawn(async move {
        poller.run_polling().await;
    });

    // Server bias snapshot for each metal, once at startup.
    for metal in Metal::ALL {
        match client.bias(metal).await {
            Ok(bias) => info!("{} bias: {:.2}", metal, bias.combined_bias),
            Err(e) => warn!("{} bias fetch failed: {}", metal, e),
        }
    }

    // Live gold stream; silver/platinum have no live feed.
    let stream = GoldStream::new(config.gold_stream_url.clone());
    let handle = stream.start();
    let mut kline_rx = handle.subscribe();
    let kline_prices = prices.clone();
    tokio::spawn(async move {
        while let Ok(kline) = kline_rx.recv().await {
            kline_prices.update(Metal::Gold, kline.close, kline.time);
            info!("Gold live: {:.2}", kline.close);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.shutdown();
    Ok(())
}
