//! Ports for the out-of-process collaborators a cycle consults.
//!
//! All of them may fail; callers degrade instead of aborting the cycle.

use async_trait::async_trait;

use crate::domain::entities::reflection::ReflectionLevel;
use crate::domain::error::DomainError;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::decision::Decision;

/// Produces a free-text report (research or sentiment) for a cycle.
#[async_trait]
pub trait Analyst: Send + Sync {
    fn name(&self) -> &str;
    async fn report(&self, ctx: &CycleContext) -> Result<String, DomainError>;
}

/// Proposes an action. Returns the raw payload; validation happens in
/// [`Decision::from_json`].
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    async fn decide(&self, ctx: &CycleContext) -> Result<serde_json::Value, DomainError>;
}

/// Second opinion on a proposed trade: execute or not, and at what size.
#[async_trait]
pub trait TradeValidator: Send + Sync {
    async fn validate(&self, decision: &Decision, ctx: &CycleContext) -> Result<serde_json::Value, DomainError>;
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub level: ReflectionLevel,
    pub prompt: String,
}

/// Condenses cycle outcomes into reflection text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DomainError>;
}
