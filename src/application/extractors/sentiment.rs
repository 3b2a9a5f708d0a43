use crate::domain::entities::signal::Signal;
use crate::domain::ports::signal_extractor::SignalExtractor;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::direction::Direction;
use crate::domain::values::signal_source::SignalSource;

/// Fear & Greed (read contrarian) and the tone of the sentiment report.
pub struct SentimentExtractor;

impl SignalExtractor for SentimentExtractor {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    fn extract(&self, ctx: &CycleContext) -> Vec<Signal> {
        let mut signals = Vec::new();

        if ctx.sentiment.source.is_usable() {
            if let Some(index) = ctx.sentiment.fear_greed_index {
                let v = f64::from(index.min(100));
                // Extreme fear is a buying opportunity, extreme greed a warning.
                let direction = if v < 25.0 {
                    Direction::Bullish
                } else if v > 75.0 {
                    Direction::Bearish
                } else {
                    Direction::Neutral
                };
                signals.push(Signal::new(
                    "fear_greed",
                    SignalSource::Sentiment,
                    direction,
                    (v - 50.0).abs() / 50.0,
                    v,
                ));
            }
        }

        if let Some(report) = &ctx.sentiment_report {
            let lower = report.to_lowercase();
            let tone = if lower.contains("bullish") {
                Some((Direction::Bullish, 1.0))
            } else if lower.contains("bearish") {
                Some((Direction::Bearish, -1.0))
            } else {
                None
            };
            if let Some((direction, raw)) = tone {
                signals.push(Signal::new("reddit_sentiment", SignalSource::Sentiment, direction, 0.4, raw));
            }
        }

        signals
    }
}
