//! The structured context a cycle accumulates as it runs.
//!
//! Each phase fills in its own optional slot. An absent slot (no macro
//! report, no decision yet) is a normal, representable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::values::decision::Decision;
use crate::domain::values::market::{FeedBundle, MarketSnapshot, MacroSnapshot, OnchainSnapshot, SentimentSnapshot};
use crate::domain::values::portfolio::PortfolioSnapshot;
use crate::domain::values::regime::RegimeResult;

pub const CONTEXT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleContext {
    pub version: u32,
    pub cycle_id: Uuid,
    pub instrument: String,
    pub started_at: DateTime<Utc>,
    pub portfolio: PortfolioSnapshot,
    pub market: MarketSnapshot,
    pub onchain: OnchainSnapshot,
    pub sentiment: SentimentSnapshot,
    #[serde(rename = "macro")]
    pub macro_data: MacroSnapshot,
    pub regime: RegimeResult,
    pub research_report: Option<String>,
    pub sentiment_report: Option<String>,
    pub decision: Option<Decision>,
    /// Most recent level-2 reviews, newest first. Read-only here.
    pub cross_trial_reflections: Vec<String>,
    /// Level-1 lessons carried over from earlier cycles in this run.
    pub reflection_memory: Vec<String>,
    pub signal_accuracy_report: Option<String>,
}

impl CycleContext {
    pub fn new(instrument: &str, portfolio: PortfolioSnapshot, regime: RegimeResult) -> Self {
        let instrument = instrument.to_uppercase();
        Self {
            version: CONTEXT_VERSION,
            cycle_id: Uuid::new_v4(),
            market: MarketSnapshot::stub(&instrument),
            instrument,
            started_at: Utc::now(),
            portfolio,
            onchain: OnchainSnapshot::default(),
            sentiment: SentimentSnapshot::default(),
            macro_data: MacroSnapshot::default(),
            regime,
            research_report: None,
            sentiment_report: None,
            decision: None,
            cross_trial_reflections: Vec::new(),
            reflection_memory: Vec::new(),
            signal_accuracy_report: None,
        }
    }

    pub fn with_feeds(mut self, feeds: FeedBundle) -> Self {
        self.market = feeds.market;
        self.onchain = feeds.onchain;
        self.sentiment = feeds.sentiment;
        self.macro_data = feeds.macro_data;
        self
    }
}
