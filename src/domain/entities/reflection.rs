use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level 1 is the per-cycle lesson, level 2 the periodic cross-cycle review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ReflectionLevel {
    Cycle,
    CrossTrial,
}

impl ReflectionLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            ReflectionLevel::Cycle => 1,
            ReflectionLevel::CrossTrial => 2,
        }
    }
}

impl From<ReflectionLevel> for u8 {
    fn from(level: ReflectionLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for ReflectionLevel {
    type Error = String;
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(ReflectionLevel::Cycle),
            2 => Ok(ReflectionLevel::CrossTrial),
            _ => Err(format!("Reflection level must be 1 or 2, got {v}")),
        }
    }
}

impl fmt::Display for ReflectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub level: ReflectionLevel,
    pub text: String,
    pub regime: String,
    pub performance_summary: Option<String>,
}

impl ReflectionEntry {
    pub fn new(level: ReflectionLevel, text: String, regime: String) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            level,
            text,
            regime,
            performance_summary: None,
        }
    }

    pub fn with_performance_summary(mut self, summary: Option<String>) -> Self {
        self.performance_summary = summary;
        self
    }
}
