use crate::application::extractors::macro_regime::regime_direction;
use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::direction::Direction;
use crate::domain::values::regime::MarketRegime;
use crate::domain::values::signal_source::SignalSource;
use crate::domain::values::trade_action::TradeAction;

/// Treats the decision itself as a set of predictions.
pub struct DecisionExtractor;

impl SignalExtractor for DecisionExtractor {
    fn name(&self) -> &'static str {
        "brain"
    }

    fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
        let Some(decision) = &ctx.decision else {
            return Vec::new();
        };
        let (direction, raw_action) = match decision.action {
            TradeAction::Buy => (Direction::Bullish, 1.0),
            TradeAction::Sell => (Direction::Bearish, -1.0),
            TradeAction::Hold => (Direction::Neutral, 0.0),
        };
        let confidence = f64::from(decision.confidence) / 10.0;

        let mut signals = vec![Signal::new("brain_action", SignalSource::Brain, direction, confidence, raw_action)];
        if decision.confidence > 0 {
            signals.push(Signal::new(
                "brain_confidence",
                SignalSource::Brain,
                direction,
                confidence,
                f64::from(decision.confidence),
            ));
        }
        if decision.size_pct > 0.0 {
            signals.push(Signal::new(
                "brain_size_pct",
                SignalSource::Brain,
                direction,
                (decision.size_pct / 50.0).min(1.0),
                decision.size_pct,
            ));
        }
        if decision.regime != MarketRegime::Unknown {
            let (regime_dir, raw) = regime_direction(decision.regime);
            let conf = if decision.confidence > 0 { confidence } else { 0.5 };
            signals.push(Signal::new("brain_regime", SignalSource::Brain, regime_dir, conf, raw));
        }
        signals
    }
}
