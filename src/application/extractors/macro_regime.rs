use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::direction::Direction;
use crate::domain::values::regime::{MacroRegime, MarketRegime};
use crate::domain::values::signal_source::SignalSource;

/// Macro backdrop and the cycle's market regime classification.
pub struct MacroRegimeExtractor;

pub(crate) fn regime_direction(regime: MarketRegime) -> (Direction, f64) {
    match regime {
        MarketRegime::Bull => (Direction::Bullish, 1.0),
        MarketRegime::Bear => (Direction::Bearish, -1.0),
        MarketRegime::Sideways | MarketRegime::Unknown => (Direction::Neutral, 0.0),
    }
}

impl SignalExtractor for MacroRegimeExtractor {
    fn name(&self) -> &'static str {
        "macro"
    }

    fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
        let mut signals = Vec::new();

        if ctx.macro_data.source.is_usable() {
            let macro_call = match ctx.macro_data.macro_regime {
                MacroRegime::RiskOn => Some((Direction::Bullish, 1.0)),
                MacroRegime::RiskOff => Some((Direction::Bearish, -1.0)),
                MacroRegime::Neutral => Some((Direction::Neutral, 0.0)),
                MacroRegime::Unknown => None,
            };
            if let Some((direction, raw)) = macro_call {
                signals.push(Signal::new("macro_regime", SignalSource::Macro, direction, 0.6, raw));
            }
        }

        let regime = &ctx.regime;
        if regime.regime != MarketRegime::Unknown {
            let (direction, raw) = regime_direction(regime.regime);
            let confidence = f64::from(regime.confidence) / 10.0;
            signals.push(Signal::new("market_regime", SignalSource::Macro, direction, confidence, raw));
            if regime.confidence > 0 {
                signals.push(Signal::new(
                    "regime_confidence",
                    SignalSource::Macro,
                    Direction::Neutral,
                    confidence,
                    f64::from(regime.confidence),
                ));
            }
        }

        signals
    }
}
