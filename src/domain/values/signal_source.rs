use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which slice of the cycle context a signal was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Technical,
    Onchain,
    Sentiment,
    Macro,
    /// The external decision itself.
    Brain,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Technical => write!(f, "technical"),
            Self::Onchain => write!(f, "onchain"),
            Self::Sentiment => write!(f, "sentiment"),
            Self::Macro => write!(f, "macro"),
            Self::Brain => write!(f, "brain"),
        }
    }
}

impl FromStr for SignalSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "onchain" => Ok(Self::Onchain),
            "sentiment" => Ok(Self::Sentiment),
            "macro" => Ok(Self::Macro),
            "brain" => Ok(Self::Brain),
            _ => Err(format!("Invalid signal source: '{}'", s)),
        }
    }
}
