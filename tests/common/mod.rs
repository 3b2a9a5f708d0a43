//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tradecycle::application::cycle::Collaborators;
use tradecycle::config::AppConfig;
use tradecycle::domain::error::DomainError;
use tradecycle::domain::ports::collaborators::{
    Analyst, DecisionMaker, Summarizer, SummaryRequest, TradeValidator,
};
use tradecycle::domain::ports::market_feed::MarketFeed;
use tradecycle::domain::values::cycle_context::CycleContext;
use tradecycle::domain::values::data_source::DataSource;
use tradecycle::domain::values::decision::Decision;
use tradecycle::domain::values::market::{FeedBundle, Indicators, MarketSnapshot};
use tradecycle::infrastructure::feeds::StubFeed;
use tradecycle::TradeCycle;

pub fn config() -> AppConfig {
    AppConfig {
        db_path: ":memory:".into(),
        reflection_cycle_length: 3,
        ..AppConfig::default()
    }
}

/// Feed that always answers with the same bundle.
pub struct FixedFeed(pub FeedBundle);

#[async_trait]
impl MarketFeed for FixedFeed {
    fn name(&self) -> &str {
        "fixed"
    }
    async fn fetch(&self, _instrument: &str) -> Result<FeedBundle, DomainError> {
        Ok(self.0.clone())
    }
}

pub fn real_market(instrument: &str, price: f64) -> FeedBundle {
    FeedBundle {
        market: MarketSnapshot {
            instrument: instrument.to_string(),
            source: DataSource::Real,
            current_price: price,
            volume_24h: Some(1_000_000.0),
            price_change_24h_pct: Some(1.5),
            indicators: Indicators {
                rsi_14: Some(25.0),
                macd_histogram: Some(0.4),
                sma_20: Some(price * 0.97),
                sma_50: Some(price * 0.95),
                atr_14: Some(price * 0.02),
                ..Indicators::default()
            },
        },
        ..FeedBundle::default()
    }
}

pub struct FixedAnalyst(pub &'static str);

#[async_trait]
impl Analyst for FixedAnalyst {
    fn name(&self) -> &str {
        self.0
    }
    async fn report(&self, _ctx: &CycleContext) -> Result<String, DomainError> {
        Ok(format!("{} report", self.0))
    }
}

pub struct FailingAnalyst;

#[async_trait]
impl Analyst for FailingAnalyst {
    fn name(&self) -> &str {
        "research"
    }
    async fn report(&self, _ctx: &CycleContext) -> Result<String, DomainError> {
        Err(DomainError::Provider("timeout".into()))
    }
}

/// Decision maker that always proposes the same payload.
pub struct ScriptedDecision(pub Value);

#[async_trait]
impl DecisionMaker for ScriptedDecision {
    async fn decide(&self, _ctx: &CycleContext) -> Result<Value, DomainError> {
        Ok(self.0.clone())
    }
}

pub struct ApprovingValidator;

#[async_trait]
impl TradeValidator for ApprovingValidator {
    async fn validate(&self, decision: &Decision, _ctx: &CycleContext) -> Result<Value, DomainError> {
        Ok(json!({
            "execute": true,
            "modified_size_pct": decision.size_pct,
            "order_type": "market",
            "reason": "ok"
        }))
    }
}

pub struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DomainError> {
        Ok(format!("lesson (level {})", request.level.as_u8()))
    }
}

pub struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _request: &SummaryRequest) -> Result<String, DomainError> {
        Err(DomainError::Provider("rate limited".into()))
    }
}

pub fn collaborators(feed: Arc<dyn MarketFeed>, decision: Value) -> Collaborators {
    Collaborators {
        feed,
        research: Arc::new(FixedAnalyst("research")),
        sentiment: Arc::new(FixedAnalyst("sentiment")),
        decision_maker: Arc::new(ScriptedDecision(decision)),
        validator: Arc::new(ApprovingValidator),
    }
}

pub fn hold_json() -> Value {
    json!({
        "action": "HOLD",
        "asset": "SOL",
        "size_pct": 0,
        "confidence": 4,
        "regime": "sideways",
        "rationale": "Nothing to do"
    })
}

pub fn buy_json(size_pct: f64) -> Value {
    json!({
        "action": "BUY",
        "asset": "SOL",
        "size_pct": size_pct,
        "confidence": 7,
        "regime": "bull",
        "rationale": "Oversold bounce"
    })
}

pub fn sell_json(size_pct: f64) -> Value {
    json!({
        "action": "SELL",
        "asset": "SOL",
        "size_pct": size_pct,
        "confidence": 6,
        "regime": "bear",
        "rationale": "Taking profit"
    })
}

/// In-memory store with offline-style collaborators and a stub feed.
pub fn setup() -> TradeCycle {
    TradeCycle::with_providers(
        &config(),
        collaborators(Arc::new(StubFeed), hold_json()),
        Arc::new(EchoSummarizer),
    )
    .unwrap()
}

pub fn setup_with(collaborators: Collaborators, summarizer: Arc<dyn Summarizer>) -> TradeCycle {
    TradeCycle::with_providers(&config(), collaborators, summarizer).unwrap()
}
