use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Parse(e.to_string())
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

/// Failures of the simulated execution engine. Never coerced into a trade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Insufficient cash: need ${needed:.2}, have ${available:.2}")]
    InsufficientCash { needed: f64, available: f64 },

    #[error("No {0} holdings to sell")]
    NoHoldings(String),

    #[error("Invalid size: {0}% (must be non-negative)")]
    InvalidSize(f64),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown execution mode: {0}")]
    UnknownMode(String),

    #[error("Live trading is not implemented, use paper mode")]
    LiveTradingUnsupported,
}
