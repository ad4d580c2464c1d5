pub mod backend;
pub mod binance_ws;

pub use backend::BackendClient;
pub use binance_ws::{GoldStream, LiveKline, StreamHandle, DEFAULT_GOLD_STREAM_URL};
