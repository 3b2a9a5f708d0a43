use crate::domain::values::confidence::Confidence;
use crate::domain::values::direction::Direction;
use crate::domain::values::signal_source::SignalSource;
use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single directional micro-prediction extracted from a cycle.
///
/// Extraction does not know when the batch will be logged, so the timestamp
/// and instrument are stamped by the logger; both are identical for every
/// signal in a batch and for the companion [`PriceSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub source: SignalSource,
    pub direction: Direction,
    pub confidence: Confidence,
    pub raw_value: Option<f64>,
}

impl Signal {
    pub fn new(
        name: &str,
        source: SignalSource,
        direction: Direction,
        confidence: f64,
        raw_value: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            direction,
            confidence: Confidence::saturating(confidence),
            raw_value: Some(raw_value),
        }
    }
}

/// A signal as persisted, with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSignal {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub price: f64,
    pub volume_24h: Option<f64>,
}

/// The score of one signal over one timeframe. At most one per
/// `(signal_id, timeframe)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutcome {
    pub signal_id: i64,
    pub timeframe: Timeframe,
    pub price_at_signal: f64,
    pub price_at_eval: f64,
    pub price_change_pct: f64,
    pub direction_correct: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl SignalOutcome {
    /// Score a signal's call against the move from `price_at_signal` to
    /// `price_at_eval`. `None` when the reference price is unusable.
    pub fn score(
        signal_id: i64,
        timeframe: Timeframe,
        direction: Direction,
        price_at_signal: f64,
        price_at_eval: f64,
        evaluated_at: DateTime<Utc>,
    ) -> Option<Self> {
        if price_at_signal <= 0.0 || !price_at_signal.is_finite() {
            return None;
        }
        let change = (price_at_eval - price_at_signal) / price_at_signal * 100.0;
        let price_change_pct = (change * 10_000.0).round() / 10_000.0;
        Some(Self {
            signal_id,
            timeframe,
            price_at_signal,
            price_at_eval,
            price_change_pct,
            direction_correct: direction.is_correct(change),
            evaluated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bullish_rise() {
        let o = SignalOutcome::score(1, Timeframe::OneDay, Direction::Bullish, 100.0, 105.0, Utc::now())
            .unwrap();
        assert!((o.price_change_pct - 5.0).abs() < 1e-9);
        assert!(o.direction_correct);
    }

    #[test]
    fn test_score_bearish_rise_is_wrong() {
        let o = SignalOutcome::score(1, Timeframe::FourHours, Direction::Bearish, 100.0, 101.0, Utc::now())
            .unwrap();
        assert!(!o.direction_correct);
    }

    #[test]
    fn test_score_rejects_zero_reference() {
        assert!(SignalOutcome::score(1, Timeframe::OneDay, Direction::Neutral, 0.0, 5.0, Utc::now()).is_none());
    }

    #[test]
    fn test_new_saturates_confidence() {
        let s = Signal::new("x", SignalSource::Technical, Direction::Neutral, 1.7, 0.0);
        assert_eq!(s.confidence.value(), 1.0);
    }
}
