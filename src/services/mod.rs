pub mod analysis;
pub mod bot;
pub mod bot_store;
pub mod normalize;
pub mod prediction;
pub mod price_cache;
pub mod session;
pub mod signals;

pub use bot::TradingBotService;
pub use bot_store::BotStateStore;
pub use price_cache::{LivePrice, LivePriceCache};
pub use session::{AuthWatch, MemorySessionStore, SessionStore};
pub use signals::SignalKey;
