use serde::{Deserialize, Serialize};
use std::fmt;

/// Precious metal tracked by the dashboard and traded by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
}

impl Metal {
    /// All supported metals, in display order.
    pub const ALL: [Metal; 3] = [Metal::Gold, Metal::Silver, Metal::Platinum];

    /// Whether a live price stream exists for this metal.
    /// Only gold has a direct exchange feed (PAXG/USDT); silver and
    /// platinum history comes from the backend proxy only.
    pub fn has_live_stream(&self) -> bool {
        matches!(self, Metal::Gold)
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metal::Gold => write!(f, "gold"),
            Metal::Silver => write!(f, "silver"),
            Metal::Platinum => write!(f, "platinum"),
        }
    }
}

impl std::str::FromStr for Metal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gold" => Ok(Metal::Gold),
            "silver" => Ok(Metal::Silver),
            "platinum" => Ok(Metal::Platinum),
            _ => Err(format!("Unknown metal: {}", s)),
        }
    }
}
