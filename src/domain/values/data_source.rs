use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provenance marker on provider snapshots. Anything other than `Real` is
/// treated as absent by the regime classifier and the signal extractors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Real,
    /// Placeholder values substituted after a provider failure.
    Stub,
    Error,
}

impl DataSource {
    pub fn is_usable(&self) -> bool {
        matches!(self, DataSource::Real)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "real"),
            Self::Stub => write!(f, "stub"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "stub" => Ok(Self::Stub),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid data source: '{}'", s)),
        }
    }
}
