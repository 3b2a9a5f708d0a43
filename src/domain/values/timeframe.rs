use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizon after which a signal is scored against realized price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::FourHours, Timeframe::OneDay, Timeframe::SevenDays];

    /// Minimum signal age before this timeframe may be evaluated.
    pub fn min_age(&self) -> Duration {
        match self {
            Timeframe::FourHours => Duration::hours(4),
            Timeframe::OneDay => Duration::hours(24),
            Timeframe::SevenDays => Duration::hours(168),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "24h",
            Timeframe::SevenDays => "7d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "4h" => Ok(Timeframe::FourHours),
            "24h" | "1d" => Ok(Timeframe::OneDay),
            "7d" | "168h" => Ok(Timeframe::SevenDays),
            _ => Err(format!("Unknown timeframe: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_ages() {
        assert_eq!(Timeframe::FourHours.min_age(), Duration::hours(4));
        assert_eq!(Timeframe::OneDay.min_age(), Duration::hours(24));
        assert_eq!(Timeframe::SevenDays.min_age(), Duration::days(7));
    }

    #[test]
    fn test_labels_roundtrip_through_from_str() {
        for tf in Timeframe::ALL {
            assert_eq!(Timeframe::from_str(tf.label()).unwrap(), tf);
        }
        assert_eq!(serde_json::to_string(&Timeframe::OneDay).unwrap(), "\"24h\"");
    }
}
