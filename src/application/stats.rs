use crate::domain::error::DomainError;
use crate::domain::ports::reflection_repository::ReflectionRepository;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::ports::trade_repository::TradeRepository;
use serde::Serialize;
use std::sync::Arc;

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub trades: usize,
    pub reflections: usize,
    pub signals: usize,
    pub price_snapshots: usize,
    pub signal_outcomes: usize,
    pub cycles_since_last_review: usize,
}

pub struct StatsUseCase {
    trades: Arc<dyn TradeRepository>,
    signals: Arc<dyn SignalRepository>,
    reflections: Arc<dyn ReflectionRepository>,
}

impl StatsUseCase {
    pub fn new(
        trades: Arc<dyn TradeRepository>,
        signals: Arc<dyn SignalRepository>,
        reflections: Arc<dyn ReflectionRepository>,
    ) -> Self {
        Self {
            trades,
            signals,
            reflections,
        }
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        let counts = self.signals.counts()?;
        Ok(StoreStats {
            trades: self.trades.count()?,
            reflections: self.reflections.count()?,
            signals: counts.signals,
            price_snapshots: counts.price_snapshots,
            signal_outcomes: counts.signal_outcomes,
            cycles_since_last_review: self.reflections.count_since_last_cross_trial()?,
        })
    }
}
