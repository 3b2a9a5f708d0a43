//! Per-signal hit-rate report fed back into the decision step.

use crate::domain::error::DomainError;
use crate::domain::ports::signal_repository::{AccuracyRow, SignalRepository};
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const MIN_SAMPLES: usize = 5;
pub const LOOKBACK_DAYS: i64 = 90;

pub struct AccuracyReportUseCase {
    repo: Arc<dyn SignalRepository>,
}

impl AccuracyReportUseCase {
    pub fn new(repo: Arc<dyn SignalRepository>) -> Self {
        Self { repo }
    }

    pub fn report(&self, instrument: &str) -> Result<Option<String>, DomainError> {
        self.report_at(instrument, Utc::now())
    }

    /// `None` until the instrument has enough scored history.
    pub fn report_at(&self, instrument: &str, now: DateTime<Utc>) -> Result<Option<String>, DomainError> {
        let instrument = instrument.trim().to_uppercase();
        let since = now - Duration::days(LOOKBACK_DAYS);
        if self.repo.count_outcomes(&instrument, since)? < MIN_SAMPLES {
            return Ok(None);
        }
        let rows = self.repo.accuracy(&instrument, since, MIN_SAMPLES)?;
        if rows.is_empty() {
            return Ok(None);
        }
        let report = render(&instrument, &rows);
        info!(%instrument, rows = rows.len(), "Generated signal accuracy report");
        Ok(Some(report))
    }
}

/// Hit rate as a whole percentage.
pub fn hit_rate(row: &AccuracyRow) -> u32 {
    if row.samples == 0 {
        return 0;
    }
    (row.correct as f64 / row.samples as f64 * 100.0).round() as u32
}

pub fn render(instrument: &str, rows: &[AccuracyRow]) -> String {
    let mut by_name: BTreeMap<&str, BTreeMap<Timeframe, &AccuracyRow>> = BTreeMap::new();
    for row in rows {
        by_name.entry(row.name.as_str()).or_default().insert(row.timeframe, row);
    }

    let mut lines = vec![
        format!("SIGNAL ACCURACY REPORT for {instrument} (last {LOOKBACK_DAYS} days):"),
        format!("{:<20}| {:<10}| {:<10}| {:<10}| Samples", "Signal", "4h acc.", "24h acc.", "7d acc."),
        "-".repeat(72),
    ];
    for (name, per_tf) in &by_name {
        let cells: Vec<String> = Timeframe::ALL
            .iter()
            .map(|tf| {
                per_tf
                    .get(tf)
                    .map(|r| format!("{}%", hit_rate(r)))
                    .unwrap_or_else(|| "N/A".into())
            })
            .collect();
        let samples = per_tf.values().map(|r| r.samples).max().unwrap_or(0);
        lines.push(format!(
            "{:<20}| {:<10}| {:<10}| {:<10}| {}",
            name, cells[0], cells[1], cells[2], samples
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Note: Accuracy based on evaluated cycles. Minimum {MIN_SAMPLES} samples required."
    ));
    lines.join("\n")
}
