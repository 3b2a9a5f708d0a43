use crate::domain::entities::signal::{PriceSnapshot, Signal};
use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::SignalRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SignalLogUseCase {
    repo: Arc<dyn SignalRepository>,
}

impl SignalLogUseCase {
    pub fn new(repo: Arc<dyn SignalRepository>) -> Self {
        Self { repo }
    }

    pub fn log(
        &self,
        instrument: &str,
        price: f64,
        volume_24h: Option<f64>,
        signals: &[Signal],
    ) -> Result<Vec<i64>, DomainError> {
        self.log_at(instrument, price, volume_24h, signals, Utc::now())
    }

    /// Persist one price snapshot and the batch that goes with it, both
    /// stamped `at`. Nothing is written without a usable price, since such a
    /// batch could never be scored.
    pub fn log_at(
        &self,
        instrument: &str,
        price: f64,
        volume_24h: Option<f64>,
        signals: &[Signal],
        at: DateTime<Utc>,
    ) -> Result<Vec<i64>, DomainError> {
        let instrument = instrument.trim().to_uppercase();
        if instrument.is_empty() {
            return Err(DomainError::InvalidInput("Instrument is required".into()));
        }
        if !(price.is_finite() && price > 0.0) {
            warn!(%instrument, price, "No usable price, signal batch not logged");
            return Ok(Vec::new());
        }
        let snapshot = PriceSnapshot {
            timestamp: at,
            instrument: instrument.clone(),
            price,
            volume_24h,
        };
        let ids = self.repo.log_batch(&snapshot, signals)?;
        info!(%instrument, price, count = ids.len(), "Logged signal batch");
        Ok(ids)
    }
}
