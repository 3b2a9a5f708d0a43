use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::direction::Direction;
use crate::domain::values::market::SmaPosition;
use crate::domain::values::signal_source::SignalSource;

/// RSI, MACD histogram, SMA position and Bollinger band signals.
pub struct TechnicalExtractor;

fn rsi_direction(rsi: f64) -> Direction {
    if rsi < 30.0 {
        Direction::Bullish
    } else if rsi > 70.0 {
        Direction::Bearish
    } else {
        Direction::Neutral
    }
}

fn sma_signal(name: &str, position: SmaPosition, confidence: f64) -> Signal {
    let (direction, raw) = match position {
        SmaPosition::Above => (Direction::Bullish, 1.0),
        SmaPosition::Below => (Direction::Bearish, -1.0),
        SmaPosition::At => (Direction::Neutral, -1.0),
    };
    Signal::new(name, SignalSource::Technical, direction, confidence, raw)
}

impl SignalExtractor for TechnicalExtractor {
    fn name(&self) -> &'static str {
        "technical"
    }

    fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
        let market = &ctx.market;
        if !market.source.is_usable() {
            return Vec::new();
        }
        let ind = &market.indicators;
        let mut signals = Vec::new();

        if let Some(rsi) = ind.rsi_14.filter(|v| *v > 0.0) {
            signals.push(Signal::new(
                "rsi_14",
                SignalSource::Technical,
                rsi_direction(rsi),
                ((rsi - 50.0).abs() / 50.0).min(1.0),
                rsi,
            ));
        }

        if let Some(hist) = ind.macd_histogram {
            let direction = if hist > 0.0 {
                Direction::Bullish
            } else if hist < 0.0 {
                Direction::Bearish
            } else {
                Direction::Neutral
            };
            signals.push(Signal::new(
                "macd_histogram",
                SignalSource::Technical,
                direction,
                (hist.abs() / 5.0).min(1.0),
                hist,
            ));
        }

        if let Some(pos) = market.price_vs_sma20() {
            signals.push(sma_signal("price_vs_sma20", pos, 0.6));
        }
        if let Some(pos) = market.price_vs_sma50() {
            signals.push(sma_signal("price_vs_sma50", pos, 0.7));
        }

        let price = market.current_price;
        if let (Some(lower), Some(upper)) = (ind.bb_lower, ind.bb_upper) {
            if price > 0.0 && lower > 0.0 && upper > 0.0 {
                let direction = if price < lower {
                    Direction::Bullish
                } else if price > upper {
                    Direction::Bearish
                } else {
                    Direction::Neutral
                };
                let range = upper - lower;
                let mid = (upper + lower) / 2.0;
                let confidence = if range > 0.0 {
                    ((price - mid).abs() / range).min(1.0)
                } else {
                    0.5
                };
                signals.push(Signal::new("bb_position", SignalSource::Technical, direction, confidence, price));
            }
        }

        signals
    }
}
