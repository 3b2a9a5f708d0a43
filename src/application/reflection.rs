//! Two-level reflection memory.
//!
//! Level 1 is written every cycle. Level 2 is written once enough level-1
//! entries have accumulated since the last one; the count is always derived
//! from the store, never held in memory.

use crate::domain::entities::reflection::{ReflectionEntry, ReflectionLevel};
use crate::domain::entities::trade::TradeRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::collaborators::{Summarizer, SummaryRequest};
use crate::domain::ports::reflection_repository::ReflectionRepository;
use crate::domain::values::decision::Decision;
use std::sync::Arc;
use tracing::{info, warn};

/// One-line description of what happened to the decision.
pub fn execution_info(trade: Option<&TradeRecord>, not_executed_reason: Option<&str>) -> String {
    match trade {
        Some(t) => format!(
            "Trade executed: {} {:.4} @ ${:.2}",
            t.action, t.quantity, t.price
        ),
        None => format!(
            "Trade not executed: {}",
            not_executed_reason.unwrap_or("unknown")
        ),
    }
}

pub fn fallback_text(decision: &Decision, execution_info: &str) -> String {
    format!(
        "[Auto] {} decision with confidence {}. {}",
        decision.action, decision.confidence, execution_info
    )
}

pub struct ReflectionManager {
    repo: Arc<dyn ReflectionRepository>,
    summarizer: Arc<dyn Summarizer>,
    cycle_length: usize,
}

impl ReflectionManager {
    pub fn new(repo: Arc<dyn ReflectionRepository>, summarizer: Arc<dyn Summarizer>, cycle_length: usize) -> Self {
        Self {
            repo,
            summarizer,
            cycle_length: cycle_length.max(1),
        }
    }

    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// Write this cycle's lesson. Summarizer failures fall back to a
    /// template; only a failed insert is an error.
    pub async fn level1(&self, decision: &Decision, execution_info: &str, regime: &str) -> Result<String, DomainError> {
        let prompt = format!(
            "Decision: {} (confidence {}/10)\nRationale: {}\nRegime: {}\nOutcome: {}\n\n\
             Summarize the lesson from this cycle.",
            decision.action, decision.confidence, decision.rationale, regime, execution_info
        );
        let request = SummaryRequest {
            level: ReflectionLevel::Cycle,
            prompt,
        };
        let text = match self.summarizer.summarize(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Level 1 summary was empty, using template");
                fallback_text(decision, execution_info)
            }
            Err(e) => {
                warn!(error = %e, "Level 1 summary failed, using template");
                fallback_text(decision, execution_info)
            }
        };

        let entry = ReflectionEntry::new(ReflectionLevel::Cycle, text.clone(), regime.to_string())
            .with_performance_summary(Some(execution_info.to_string()));
        self.repo.insert(&entry)?;
        info!("Level 1 reflection stored");
        Ok(text)
    }

    /// Write a strategic review if `cycle_length` level-1 entries have
    /// piled up since the last one. `Ok(None)` when not due or when the
    /// summarizer could not produce one.
    pub async fn maybe_level2(&self, regime: &str) -> Result<Option<String>, DomainError> {
        let since = self.repo.count_since_last_cross_trial()?;
        if since < self.cycle_length {
            info!(since, cycle_length = self.cycle_length, "Level 2 not due");
            return Ok(None);
        }

        let recent = self.repo.latest(ReflectionLevel::Cycle, self.cycle_length * 2)?;
        if recent.is_empty() {
            return Ok(None);
        }
        let bullets: Vec<String> = recent.iter().map(|r| format!("- {}", r.text)).collect();
        let prompt = format!(
            "## Recent Per-Cycle Reflections ({} cycles)\n{}\n\nCurrent regime: {}\n\n\
             Produce your strategic cross-trial review.",
            recent.len(),
            bullets.join("\n"),
            regime
        );

        let review = match self
            .summarizer
            .summarize(&SummaryRequest {
                level: ReflectionLevel::CrossTrial,
                prompt,
            })
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Level 2 review was empty, skipping");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "Level 2 review failed, skipping");
                return Ok(None);
            }
        };

        let entry = ReflectionEntry::new(ReflectionLevel::CrossTrial, review.clone(), regime.to_string())
            .with_performance_summary(Some(format!("{} cycles reviewed", recent.len())));
        self.repo.insert(&entry)?;
        info!("Level 2 cross-trial review stored");
        Ok(Some(review))
    }

    /// Latest level-2 texts, newest first.
    pub fn cross_trial(&self, limit: usize) -> Result<Vec<String>, DomainError> {
        Ok(self
            .repo
            .latest(ReflectionLevel::CrossTrial, limit)?
            .into_iter()
            .map(|r| r.text)
            .collect())
    }

    pub fn recent(&self, level: ReflectionLevel, limit: usize) -> Result<Vec<ReflectionEntry>, DomainError> {
        self.repo.latest(level, limit)
    }

    pub fn cycles_since_last_review(&self) -> Result<usize, DomainError> {
        self.repo.count_since_last_cross_trial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::regime::MarketRegime;
    use crate::domain::values::trade_action::TradeAction;
    use chrono::Utc;

    #[test]
    fn test_execution_info() {
        let trade = TradeRecord {
            timestamp: Utc::now(),
            action: TradeAction::Buy,
            instrument: "SOL".into(),
            price: 100.0,
            quantity: 9.99,
            fee: 1.0,
            cost: Some(1000.0),
            proceeds: None,
        };
        assert_eq!(execution_info(Some(&trade), None), "Trade executed: BUY 9.9900 @ $100.00");
        assert_eq!(
            execution_info(None, Some("HOLD — no trade needed")),
            "Trade not executed: HOLD — no trade needed"
        );
    }

    #[test]
    fn test_fallback_text() {
        let d = Decision::hold("SOL", MarketRegime::Sideways, "flat".into());
        assert_eq!(
            fallback_text(&d, "Trade not executed: quiet"),
            "[Auto] HOLD decision with confidence 1. Trade not executed: quiet"
        );
    }
}
