use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::direction::Direction;
use crate::domain::values::market::WhaleActivity;
use crate::domain::values::signal_source::SignalSource;

/// TVL trend, whale activity and DEX volume signals.
pub struct OnchainExtractor;

fn trend(name: &str, change_pct: f64, full_scale: f64) -> Signal {
    let direction = if change_pct > 0.0 {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    Signal::new(
        name,
        SignalSource::Onchain,
        direction,
        (change_pct.abs() / full_scale).min(1.0),
        change_pct,
    )
}

impl SignalExtractor for OnchainExtractor {
    fn name(&self) -> &'static str {
        "onchain"
    }

    fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
        let onchain = &ctx.onchain;
        if !onchain.source.is_usable() {
            return Vec::new();
        }
        let mut signals = Vec::new();

        if let Some(change) = onchain.tvl_change_7d_pct.filter(|v| *v != 0.0) {
            signals.push(trend("tvl_trend", change, 20.0));
        }

        let whale = match onchain.whale_activity {
            Some(WhaleActivity::High) => Some((Direction::Bullish, 1.0)),
            Some(WhaleActivity::Moderate) => Some((Direction::Neutral, 0.0)),
            Some(WhaleActivity::Low) => Some((Direction::Bearish, -1.0)),
            Some(WhaleActivity::Unknown) | None => None,
        };
        if let Some((direction, raw)) = whale {
            signals.push(Signal::new("whale_activity", SignalSource::Onchain, direction, 0.5, raw));
        }

        if let Some(change) = onchain.dex_volume_change_7d_pct.filter(|v| *v != 0.0) {
            signals.push(trend("dex_volume", change, 30.0));
        }

        signals
    }
}
