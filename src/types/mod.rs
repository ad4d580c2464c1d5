pub mod analysis;
pub mod auth;
pub mod bot;
pub mod candle;
pub mod metal;

pub use analysis::*;
pub use auth::*;
pub use bot::*;
pub use candle::*;
pub use metal::*;
