pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::accuracy_report::AccuracyReportUseCase;
use crate::application::cycle::{
    Collaborators, CycleError, CycleOrchestrator, CycleOutcome, CycleRequest, CycleSettings,
};
use crate::application::evaluate_signals::{EvaluateSignalsUseCase, EvaluationReport};
use crate::application::reflection::ReflectionManager;
use crate::application::signal_log::SignalLogUseCase;
use crate::application::stats::{StatsUseCase, StoreStats};
use crate::application::trade::TradeUseCase;
use crate::config::AppConfig;
use crate::domain::entities::reflection::{ReflectionEntry, ReflectionLevel};
use crate::domain::entities::signal::{Signal, SignalOutcome};
use crate::domain::entities::trade::TradeLogEntry;
use crate::domain::error::DomainError;
use crate::domain::ports::collaborators::Summarizer;
use crate::domain::ports::market_feed::MarketFeed;
use crate::domain::ports::reflection_repository::ReflectionRepository;
use crate::domain::ports::signal_repository::SignalRepository;
use crate::domain::ports::trade_repository::{TradeFilter, TradeRepository};
use crate::domain::values::decision::Decision;
use crate::domain::values::execution::ExecutionEngine;
use crate::domain::values::portfolio::PortfolioSnapshot;
use crate::domain::values::risk::RiskSentinel;
use crate::infrastructure::feeds::StubFeed;
use crate::infrastructure::llm::offline::{
    HoldDecisionMaker, OfflineSummarizer, PassThroughValidator, PlaceholderAnalyst,
};
use crate::infrastructure::llm::openai::{
    AnalystKind, LlmAnalyst, LlmDecisionMaker, LlmSummarizer, LlmTradeValidator, OpenAiChat,
};
use crate::infrastructure::sqlite;
use crate::infrastructure::sqlite::reflection_repo::SqliteReflectionRepo;
use crate::infrastructure::sqlite::signal_repo::SqliteSignalRepo;
use crate::infrastructure::sqlite::trade_repo::SqliteTradeRepo;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Collaborators picked from configuration: the chat endpoint when an API key
/// is set, the offline set otherwise.
pub fn default_collaborators(
    config: &AppConfig,
    feed: Arc<dyn MarketFeed>,
) -> (Collaborators, Arc<dyn Summarizer>) {
    if config.llm_api_key.is_empty() {
        info!("No LLM API key, using offline collaborators");
        let collaborators = Collaborators {
            feed,
            research: Arc::new(PlaceholderAnalyst::research()),
            sentiment: Arc::new(PlaceholderAnalyst::sentiment()),
            decision_maker: Arc::new(HoldDecisionMaker),
            validator: Arc::new(PassThroughValidator),
        };
        return (collaborators, Arc::new(OfflineSummarizer));
    }

    let chat = Arc::new(OpenAiChat::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
    ));
    info!(model = chat.model(), "Using LLM collaborators");
    let collaborators = Collaborators {
        feed,
        research: Arc::new(LlmAnalyst::new(chat.clone(), AnalystKind::Research)),
        sentiment: Arc::new(LlmAnalyst::new(chat.clone(), AnalystKind::Sentiment)),
        decision_maker: Arc::new(LlmDecisionMaker::new(chat.clone())),
        validator: Arc::new(LlmTradeValidator::new(chat.clone())),
    };
    (collaborators, Arc::new(LlmSummarizer::new(chat)))
}

pub struct TradeCycle {
    config: AppConfig,
    orchestrator: CycleOrchestrator,
    trade_uc: TradeUseCase,
    signal_log_uc: SignalLogUseCase,
    evaluate_uc: EvaluateSignalsUseCase,
    accuracy_uc: AccuracyReportUseCase,
    reflections: ReflectionManager,
    stats_uc: StatsUseCase,
    signal_repo: Arc<dyn SignalRepository>,
}

impl TradeCycle {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let (collaborators, summarizer) = default_collaborators(config, Arc::new(StubFeed));
        Self::with_providers(config, collaborators, summarizer)
    }

    pub fn with_providers(
        config: &AppConfig,
        collaborators: Collaborators,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self, DomainError> {
        let mode = config
            .execution_mode()
            .map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        let conn = sqlite::open(&config.db_path)?;

        let trade_repo: Arc<dyn TradeRepository> = Arc::new(SqliteTradeRepo::new(conn.clone()));
        let signal_repo: Arc<dyn SignalRepository> = Arc::new(SqliteSignalRepo::new(conn.clone()));
        let reflection_repo: Arc<dyn ReflectionRepository> = Arc::new(SqliteReflectionRepo::new(conn));
        let reflections = || {
            ReflectionManager::new(
                reflection_repo.clone(),
                summarizer.clone(),
                config.reflection_cycle_length,
            )
        };

        let orchestrator = CycleOrchestrator::new(
            RiskSentinel::new(config.risk_limits()),
            ExecutionEngine::new(mode, config.trading_fee_pct),
            CycleSettings {
                max_position_pct: config.max_position_pct,
                cross_trial_limit: config.cross_trial_limit,
            },
            collaborators,
            TradeUseCase::new(trade_repo.clone()),
            SignalLogUseCase::new(signal_repo.clone()),
            EvaluateSignalsUseCase::new(signal_repo.clone()),
            AccuracyReportUseCase::new(signal_repo.clone()),
            reflections(),
        );

        Ok(Self {
            config: config.clone(),
            orchestrator,
            trade_uc: TradeUseCase::new(trade_repo.clone()),
            signal_log_uc: SignalLogUseCase::new(signal_repo.clone()),
            evaluate_uc: EvaluateSignalsUseCase::new(signal_repo.clone()),
            accuracy_uc: AccuracyReportUseCase::new(signal_repo.clone()),
            reflections: reflections(),
            stats_uc: StatsUseCase::new(trade_repo, signal_repo.clone(), reflection_repo.clone()),
            signal_repo,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn initial_portfolio(&self) -> PortfolioSnapshot {
        PortfolioSnapshot::new(self.config.initial_capital)
    }

    // Cycles

    pub async fn run_cycle(&self, request: CycleRequest) -> Result<CycleOutcome, CycleError> {
        self.orchestrator.run(request).await
    }

    /// Run `cycles` cycles back to back, handing each one the previous
    /// cycle's portfolio and reflection memory.
    pub async fn run_cycles(
        &self,
        instrument: &str,
        portfolio: PortfolioSnapshot,
        cycles: usize,
    ) -> Result<Vec<CycleOutcome>, CycleError> {
        let mut outcomes = Vec::with_capacity(cycles);
        let mut request = CycleRequest {
            instrument: instrument.to_string(),
            portfolio,
            reflection_memory: Vec::new(),
        };
        for _ in 0..cycles {
            let outcome = self.orchestrator.run(request.clone()).await?;
            request.portfolio = outcome.portfolio.clone();
            request.reflection_memory = outcome.reflection_memory.clone();
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    // Signals

    pub fn log_signals(
        &self,
        instrument: &str,
        price: f64,
        volume_24h: Option<f64>,
        signals: &[Signal],
    ) -> Result<Vec<i64>, DomainError> {
        self.signal_log_uc.log(instrument, price, volume_24h, signals)
    }

    pub fn log_signals_at(
        &self,
        instrument: &str,
        price: f64,
        volume_24h: Option<f64>,
        signals: &[Signal],
        at: DateTime<Utc>,
    ) -> Result<Vec<i64>, DomainError> {
        self.signal_log_uc.log_at(instrument, price, volume_24h, signals, at)
    }

    pub fn evaluate_pending(&self, instrument: &str, current_price: f64) -> Result<EvaluationReport, DomainError> {
        self.evaluate_uc.evaluate_pending(instrument, current_price)
    }

    pub fn evaluate_pending_at(
        &self,
        instrument: &str,
        current_price: f64,
        now: DateTime<Utc>,
    ) -> Result<EvaluationReport, DomainError> {
        self.evaluate_uc.evaluate_pending_at(instrument, current_price, now)
    }

    pub fn signal_outcomes(&self, signal_id: i64) -> Result<Vec<SignalOutcome>, DomainError> {
        self.signal_repo.outcomes_for(signal_id)
    }

    pub fn accuracy_report(&self, instrument: &str) -> Result<Option<String>, DomainError> {
        self.accuracy_uc.report(instrument)
    }

    pub fn accuracy_report_at(&self, instrument: &str, now: DateTime<Utc>) -> Result<Option<String>, DomainError> {
        self.accuracy_uc.report_at(instrument, now)
    }

    // Trades

    pub fn log_trade(&self, entry: &TradeLogEntry) -> Result<i64, DomainError> {
        self.trade_uc.log(entry)
    }

    pub fn recent_trades(&self, limit: usize) -> Result<Vec<TradeLogEntry>, DomainError> {
        self.trade_uc.recent(limit)
    }

    pub fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<TradeLogEntry>, DomainError> {
        self.trade_uc.list(filter)
    }

    pub fn daily_pnl(&self) -> Result<f64, DomainError> {
        self.trade_uc.daily_pnl()
    }

    pub fn daily_pnl_at(&self, now: DateTime<Utc>) -> Result<f64, DomainError> {
        self.trade_uc.daily_pnl_at(now)
    }

    // Reflections

    pub async fn reflect(&self, decision: &Decision, execution_info: &str, regime: &str) -> Result<String, DomainError> {
        self.reflections.level1(decision, execution_info, regime).await
    }

    pub async fn maybe_review(&self, regime: &str) -> Result<Option<String>, DomainError> {
        self.reflections.maybe_level2(regime).await
    }

    pub fn recent_reflections(&self, level: ReflectionLevel, limit: usize) -> Result<Vec<ReflectionEntry>, DomainError> {
        self.reflections.recent(level, limit)
    }

    pub fn cross_trial_reflections(&self, limit: usize) -> Result<Vec<String>, DomainError> {
        self.reflections.cross_trial(limit)
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        self.stats_uc.stats()
    }
}
