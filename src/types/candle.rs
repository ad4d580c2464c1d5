use serde::{Deserialize, Serialize};

/// A single OHLC candle. Time is a unix timestamp in seconds; history
/// fetches return candles ordered by time ascending with no duplicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// History timeframe selectable by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    /// Range parameter for the Binance gold proxy endpoint.
    pub fn binance_range(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::OneYear => "1y",
            Timeframe::All => "max",
        }
    }

    /// Range and interval parameters for the Yahoo-backed metal endpoint.
    pub fn yahoo_range_interval(&self) -> (&'static str, &'static str) {
        match self {
            Timeframe::OneDay => ("1d", "5m"),
            Timeframe::OneWeek => ("5d", "15m"),
            Timeframe::OneMonth => ("1mo", "1d"),
            Timeframe::OneYear => ("1y", "1d"),
            Timeframe::All => ("max", "1wk"),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::OneDay => write!(f, "1D"),
            Timeframe::OneWeek => write!(f, "1W"),
            Timeframe::OneMonth => write!(f, "1M"),
            Timeframe::OneYear => write!(f, "1Y"),
            Timeframe::All => write!(f, "ALL"),
        }
    }
}
