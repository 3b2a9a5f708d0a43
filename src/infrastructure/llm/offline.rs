//! Collaborators used when no LLM endpoint is configured.

use crate::domain::error::DomainError;
use crate::domain::ports::collaborators::*;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::decision::Decision;
use async_trait::async_trait;

/// Writes a one-line report from the snapshots it was given.
pub struct PlaceholderAnalyst {
    name: &'static str,
}

impl PlaceholderAnalyst {
    pub fn research() -> Self {
        Self { name: "research" }
    }

    pub fn sentiment() -> Self {
        Self { name: "sentiment" }
    }
}

#[async_trait]
impl Analyst for PlaceholderAnalyst {
    fn name(&self) -> &str {
        self.name
    }

    async fn report(&self, ctx: &CycleContext) -> Result<String, DomainError> {
        Ok(match self.name {
            "sentiment" => format!(
                "[Offline] Sentiment for {}: fear & greed {} ({}).",
                ctx.instrument,
                ctx.sentiment
                    .fear_greed_index
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "N/A".into()),
                ctx.sentiment.source,
            ),
            _ => format!(
                "[Offline] Research for {}: price ${:.2}, regime {} ({}/10).",
                ctx.instrument, ctx.market.current_price, ctx.regime.regime, ctx.regime.confidence,
            ),
        })
    }
}

/// Always proposes HOLD.
pub struct HoldDecisionMaker;

#[async_trait]
impl DecisionMaker for HoldDecisionMaker {
    async fn decide(&self, ctx: &CycleContext) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::json!({
            "action": "HOLD",
            "asset": ctx.instrument,
            "size_pct": 0,
            "confidence": 1,
            "regime": ctx.regime.regime.to_string(),
            "rationale": "No decision model configured.",
        }))
    }
}

/// Approves the proposal unchanged.
pub struct PassThroughValidator;

#[async_trait]
impl TradeValidator for PassThroughValidator {
    async fn validate(&self, decision: &Decision, _ctx: &CycleContext) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::json!({
            "execute": true,
            "modified_size_pct": decision.size_pct,
            "order_type": "market",
            "reason": "Offline validator approves as proposed.",
        }))
    }
}

/// Always fails so reflections use their templated fallback.
pub struct OfflineSummarizer;

#[async_trait]
impl Summarizer for OfflineSummarizer {
    async fn summarize(&self, _request: &SummaryRequest) -> Result<String, DomainError> {
        Err(DomainError::Provider("No summarizer configured".into()))
    }
}
