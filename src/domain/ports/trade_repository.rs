use crate::domain::entities::trade::TradeLogEntry;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub limit: Option<usize>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub instrument: Option<String>,
}

pub trait TradeRepository: Send + Sync {
    /// Insert one trade row; returns its id.
    fn add_trade(&self, trade: &TradeLogEntry) -> Result<i64, DomainError>;
    /// Rows matching `filter`, oldest first.
    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<TradeLogEntry>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}
