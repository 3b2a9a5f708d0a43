//! Deferred scoring of logged signals against later prices.

use crate::domain::entities::signal::SignalOutcome;
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub instrument: String,
    pub evaluated: usize,
    pub by_timeframe: BTreeMap<Timeframe, usize>,
    /// Signals without a usable reference price.
    pub skipped: usize,
}

pub struct EvaluateSignalsUseCase {
    repo: Arc<dyn SignalRepository>,
}

impl EvaluateSignalsUseCase {
    pub fn new(repo: Arc<dyn SignalRepository>) -> Self {
        Self { repo }
    }

    pub fn evaluate_pending(&self, instrument: &str, current_price: f64) -> Result<EvaluationReport, DomainError> {
        self.evaluate_pending_at(instrument, current_price, Utc::now())
    }

    /// Score every signal old enough for a timeframe it has no outcome for
    /// yet. Safe to call repeatedly: already-scored pairs are never selected
    /// and the store ignores duplicates.
    pub fn evaluate_pending_at(
        &self,
        instrument: &str,
        current_price: f64,
        now: DateTime<Utc>,
    ) -> Result<EvaluationReport, DomainError> {
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(DomainError::InvalidInput(format!(
                "Evaluation price must be positive, got {current_price}"
            )));
        }
        let instrument = instrument.trim().to_uppercase();
        let mut report = EvaluationReport {
            instrument: instrument.clone(),
            ..EvaluationReport::default()
        };

        for timeframe in Timeframe::ALL {
            let pending = self.repo.unevaluated(&instrument, timeframe, now - timeframe.min_age())?;
            let mut outcomes = Vec::with_capacity(pending.len());
            for logged in &pending {
                let reference = self.repo.price_at_or_before(&instrument, logged.timestamp)?;
                let outcome = reference.and_then(|p0| {
                    SignalOutcome::score(
                        logged.id,
                        timeframe,
                        logged.signal.direction,
                        p0,
                        current_price,
                        now,
                    )
                });
                match outcome {
                    Some(o) => outcomes.push(o),
                    None => report.skipped += 1,
                }
            }
            let written = self.repo.insert_outcomes(&outcomes)?;
            debug!(%instrument, %timeframe, pending = pending.len(), written, "Timeframe evaluated");
            report.by_timeframe.insert(timeframe, written);
            report.evaluated += written;
        }

        if report.evaluated > 0 {
            info!(%instrument, evaluated = report.evaluated, "Evaluated signal outcomes");
        }
        Ok(report)
    }
}
