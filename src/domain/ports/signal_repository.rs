use crate::domain::entities::signal::{LoggedSignal, PriceSnapshot, Signal, SignalOutcome};
use crate::domain::error::DomainError;
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};

/// Outcome aggregate for one `(signal name, timeframe)` group.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AccuracyRow {
    pub name: String,
    pub timeframe: Timeframe,
    pub samples: usize,
    pub correct: usize,
    pub avg_change_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SignalCounts {
    pub signals: usize,
    pub price_snapshots: usize,
    pub signal_outcomes: usize,
}

pub trait SignalRepository: Send + Sync {
    /// Persist a price snapshot and its signal batch atomically, all stamped
    /// with the snapshot's timestamp and instrument. Returns the signal ids.
    fn log_batch(&self, snapshot: &PriceSnapshot, signals: &[Signal]) -> Result<Vec<i64>, DomainError>;

    /// Signals for `instrument` logged at or before `logged_before` that have
    /// no outcome for `timeframe` yet, oldest first.
    fn unevaluated(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        logged_before: DateTime<Utc>,
    ) -> Result<Vec<LoggedSignal>, DomainError>;

    /// Most recent snapshot price at or before `at`.
    fn price_at_or_before(&self, instrument: &str, at: DateTime<Utc>) -> Result<Option<f64>, DomainError>;

    /// Insert a batch of outcomes in one transaction. Pairs that already have
    /// an outcome are skipped; returns how many rows were written.
    fn insert_outcomes(&self, outcomes: &[SignalOutcome]) -> Result<usize, DomainError>;

    fn count_outcomes(&self, instrument: &str, evaluated_since: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Groups evaluated since `evaluated_since` with at least `min_samples` rows.
    fn accuracy(
        &self,
        instrument: &str,
        evaluated_since: DateTime<Utc>,
        min_samples: usize,
    ) -> Result<Vec<AccuracyRow>, DomainError>;

    fn outcomes_for(&self, signal_id: i64) -> Result<Vec<SignalOutcome>, DomainError>;

    fn counts(&self) -> Result<SignalCounts, DomainError>;
}
