use crate::domain::entities::trade::TradeLogEntry;
use crate::domain::error::DomainError;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

pub struct TradeUseCase {
    repo: Arc<dyn TradeRepository>,
}

impl TradeUseCase {
    pub fn new(repo: Arc<dyn TradeRepository>) -> Self {
        Self { repo }
    }

    pub fn log(&self, entry: &TradeLogEntry) -> Result<i64, DomainError> {
        let id = self.repo.add_trade(entry)?;
        info!(
            id,
            action = %entry.record.action,
            instrument = %entry.record.instrument,
            quantity = entry.record.quantity,
            price = entry.record.price,
            "Trade logged"
        );
        Ok(id)
    }

    /// Most recent `limit` trades, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<TradeLogEntry>, DomainError> {
        self.repo.list_trades(&TradeFilter {
            limit: Some(limit),
            ..TradeFilter::default()
        })
    }

    pub fn list(&self, filter: &TradeFilter) -> Result<Vec<TradeLogEntry>, DomainError> {
        self.repo.list_trades(filter)
    }

    pub fn daily_pnl(&self) -> Result<f64, DomainError> {
        self.daily_pnl_at(Utc::now())
    }

    /// Net worth after the last trade of `now`'s UTC day minus net worth
    /// after the first. Zero with fewer than two trades that day.
    pub fn daily_pnl_at(&self, now: DateTime<Utc>) -> Result<f64, DomainError> {
        let start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| DomainError::InvalidInput("Invalid day boundary".into()))?;
        let trades = self.repo.list_trades(&TradeFilter {
            since: Some(start),
            until: Some(start + Duration::days(1)),
            ..TradeFilter::default()
        })?;
        match (trades.first(), trades.last()) {
            (Some(first), Some(last)) if trades.len() >= 2 => Ok(last.net_worth_after - first.net_worth_after),
            _ => Ok(0.0),
        }
    }

    pub fn count(&self) -> Result<usize, DomainError> {
        self.repo.count()
    }
}
