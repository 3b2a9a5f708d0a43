//! Signal extraction.
//!
//! One [`SignalExtractor`] per source. [`extract_signals`] runs them all in a
//! fixed order, so a batch always lists technical signals first and the
//! decision's own signals last.

pub mod decision;
pub mod macro_regime;
pub mod onchain;
pub mod sentiment;
pub mod technical;

use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use tracing::debug;

pub fn default_extractors() -> Vec<Box<dyn SignalExtractor>> {
    vec![
        Box::new(technical::TechnicalExtractor),
        Box::new(onchain::OnchainExtractor),
        Box::new(sentiment::SentimentExtractor),
        Box::new(macro_regime::MacroRegimeExtractor),
        Box::new(decision::DecisionExtractor),
    ]
}

pub fn extract_with(extractors: &[Box<dyn SignalExtractor>], ctx: &CycleContext) -> Vec<Signal> {
    let mut signals = Vec::new();
    for extractor in extractors {
        let found = extractor.extract(ctx);
        debug!(extractor = extractor.name(), count = found.len(), "Signals extracted");
        signals.extend(found);
    }
    signals
}

pub fn extract_signals(ctx: &CycleContext) -> Vec<Signal> {
    extract_with(&default_extractors(), ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::data_source::DataSource;
    use crate::domain::values::decision::Decision;
    use crate::domain::values::direction::Direction;
    use crate::domain::values::market::{Indicators, MarketSnapshot, WhaleActivity};
    use crate::domain::values::portfolio::PortfolioSnapshot;
    use crate::domain::values::regime::{classify_snapshot, MacroRegime, MarketRegime};
    use crate::domain::values::trade_action::TradeAction;

    fn names(signals: &[Signal]) -> Vec<&str> {
        signals.iter().map(|s| s.name.as_str()).collect()
    }

    fn find<'a>(signals: &'a [Signal], name: &str) -> &'a Signal {
        signals.iter().find(|s| s.name == name).unwrap()
    }

    fn live_market() -> MarketSnapshot {
        MarketSnapshot {
            instrument: "SOL".into(),
            source: DataSource::Real,
            current_price: 95.0,
            volume_24h: Some(1.0e9),
            price_change_24h_pct: Some(-3.0),
            indicators: Indicators {
                rsi_14: Some(25.0),
                macd_histogram: Some(-2.5),
                sma_20: Some(100.0),
                sma_50: Some(90.0),
                atr_14: Some(3.0),
                bb_upper: Some(110.0),
                bb_lower: Some(98.0),
            },
        }
    }

    fn ctx() -> CycleContext {
        let market = live_market();
        let regime = classify_snapshot(&market);
        let mut ctx = CycleContext::new("SOL", PortfolioSnapshot::new(10_000.0), regime);
        ctx.market = market;
        ctx
    }

    #[test]
    fn test_stub_sources_yield_nothing() {
        let ctx = CycleContext::new(
            "SOL",
            PortfolioSnapshot::new(10_000.0),
            classify_snapshot(&MarketSnapshot::stub("SOL")),
        );
        assert!(extract_signals(&ctx).is_empty());
    }

    #[test]
    fn test_technical_rules() {
        let signals = extract_signals(&ctx());
        let rsi = find(&signals, "rsi_14");
        assert_eq!(rsi.direction, Direction::Bullish);
        assert!((rsi.confidence.value() - 0.5).abs() < 1e-9);

        let macd = find(&signals, "macd_histogram");
        assert_eq!(macd.direction, Direction::Bearish);
        assert!((macd.confidence.value() - 0.5).abs() < 1e-9);

        assert_eq!(find(&signals, "price_vs_sma20").direction, Direction::Bearish);
        assert_eq!(find(&signals, "price_vs_sma50").direction, Direction::Bullish);

        let bb = find(&signals, "bb_position");
        assert_eq!(bb.direction, Direction::Bullish);
        assert_eq!(bb.raw_value, Some(95.0));
        // |95 - 104| / 12 = 0.75
        assert!((bb.confidence.value() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_onchain_and_sentiment() {
        let mut ctx = ctx();
        ctx.onchain.source = DataSource::Real;
        ctx.onchain.tvl_change_7d_pct = Some(-30.0);
        ctx.onchain.whale_activity = Some(WhaleActivity::High);
        ctx.onchain.dex_volume_change_7d_pct = Some(0.0);
        ctx.sentiment.source = DataSource::Real;
        ctx.sentiment.fear_greed_index = Some(80);
        ctx.sentiment_report = Some("Overall: Strong Bearish, intensity 7".into());

        let signals = extract_signals(&ctx);
        let tvl = find(&signals, "tvl_trend");
        assert_eq!(tvl.direction, Direction::Bearish);
        assert_eq!(tvl.confidence.value(), 1.0);
        assert_eq!(find(&signals, "whale_activity").direction, Direction::Bullish);
        assert!(!names(&signals).contains(&"dex_volume"));

        let fng = find(&signals, "fear_greed");
        assert_eq!(fng.direction, Direction::Bearish);
        assert!((fng.confidence.value() - 0.6).abs() < 1e-9);
        assert_eq!(find(&signals, "reddit_sentiment").direction, Direction::Bearish);
    }

    #[test]
    fn test_macro_and_decision() {
        let mut ctx = ctx();
        ctx.macro_data.source = DataSource::Real;
        ctx.macro_data.macro_regime = MacroRegime::RiskOff;
        ctx.decision = Some(Decision {
            action: TradeAction::Buy,
            asset: "SOL".into(),
            size_pct: 10.0,
            stop_loss_pct: None,
            take_profit_pct: None,
            confidence: 8,
            regime: MarketRegime::Bull,
            rationale: "oversold bounce".into(),
        });

        let signals = extract_signals(&ctx);
        assert_eq!(find(&signals, "macro_regime").direction, Direction::Bearish);
        assert!(names(&signals).contains(&"market_regime"));
        assert_eq!(find(&signals, "regime_confidence").direction, Direction::Neutral);

        let action = find(&signals, "brain_action");
        assert_eq!(action.direction, Direction::Bullish);
        assert!((action.confidence.value() - 0.8).abs() < 1e-9);
        assert!((find(&signals, "brain_size_pct").confidence.value() - 0.2).abs() < 1e-9);
        assert_eq!(find(&signals, "brain_regime").raw_value, Some(1.0));
        assert_eq!(names(&signals).last(), Some(&"brain_regime"));
    }
}
