use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predicted price direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

/// Move under which a neutral call counts as correct, in percent.
pub const NEUTRAL_BAND_PCT: f64 = 1.0;

impl Direction {
    /// Whether this call matched a realized move of `price_change_pct`.
    pub fn is_correct(&self, price_change_pct: f64) -> bool {
        match self {
            Direction::Bullish => price_change_pct > 0.0,
            Direction::Bearish => price_change_pct < 0.0,
            Direction::Neutral => price_change_pct.abs() < NEUTRAL_BAND_PCT,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bullish" => Ok(Direction::Bullish),
            "bearish" => Ok(Direction::Bearish),
            "neutral" => Ok(Direction::Neutral),
            _ => Err(format!("Unknown direction: {s}")),
        }
    }
}
