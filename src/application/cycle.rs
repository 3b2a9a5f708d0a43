//! One trading cycle, end to end.
//!
//! ```text
//! reflections ─ daily pnl ─ pre_check ─ feeds/regime ─┬─ halt ──────────────> Halted
//!                                                     └─ evaluate ─ report ─ research ┐
//!                                                                            sentiment ┴─ decide
//!   ─ validate ─ post_check ─ execute ─ log trade ─ log signals ─ level 1 ─ level 2 ─> Completed
//! ```
//!
//! Collaborator failures degrade the cycle. Store failures abort it with a
//! [`CycleError`] that still carries the portfolio the cycle produced.

use crate::application::accuracy_report::AccuracyReportUseCase;
use crate::application::evaluate_signals::EvaluateSignalsUseCase;
use crate::application::extractors::extract_signals;
use crate::application::reflection::{execution_info, ReflectionManager};
use crate::application::signal_log::SignalLogUseCase;
use crate::application::trade::TradeUseCase;
use crate::domain::entities::trade::{TradeLogEntry, TradeRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::collaborators::{Analyst, DecisionMaker, TradeValidator};
use crate::domain::ports::market_feed::MarketFeed;
use crate::domain::values::cycle_context::CycleContext;
use crate::domain::values::decision::{Decision, TradeValidation};
use crate::domain::values::execution::ExecutionEngine;
use crate::domain::values::market::{FeedBundle, MarketSnapshot};
use crate::domain::values::portfolio::PortfolioSnapshot;
use crate::domain::values::regime::{classify_snapshot, MarketRegime, RegimeResult};
use crate::domain::values::risk::{RiskSentinel, RiskVerdict};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub const HOLD_NO_TRADE: &str = "HOLD — no trade needed";

/// The out-of-process parties a cycle consults.
#[derive(Clone)]
pub struct Collaborators {
    pub feed: Arc<dyn MarketFeed>,
    pub research: Arc<dyn Analyst>,
    pub sentiment: Arc<dyn Analyst>,
    pub decision_maker: Arc<dyn DecisionMaker>,
    pub validator: Arc<dyn TradeValidator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleSettings {
    /// Hard cap on any single trade, percent of available capacity.
    pub max_position_pct: f64,
    pub cross_trial_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Completed,
    Halted,
}

#[derive(Debug, Clone)]
pub struct CycleRequest {
    pub instrument: String,
    pub portfolio: PortfolioSnapshot,
    /// Level-1 lessons from earlier cycles of the same run.
    pub reflection_memory: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    pub cycle_id: Uuid,
    pub instrument: String,
    pub status: CycleStatus,
    pub portfolio: PortfolioSnapshot,
    pub regime: RegimeResult,
    pub pre_check: RiskVerdict,
    pub post_check: Option<RiskVerdict>,
    pub decision: Decision,
    pub validation: Option<TradeValidation>,
    pub trade: Option<TradeRecord>,
    pub trade_id: Option<i64>,
    pub not_executed_reason: Option<String>,
    pub research_report: Option<String>,
    pub sentiment_report: Option<String>,
    pub signal_accuracy_report: Option<String>,
    pub signals_logged: usize,
    pub outcomes_evaluated: usize,
    /// Collaborators that failed and were substituted.
    pub degraded: Vec<String>,
    pub reflection_memory: Vec<String>,
    pub level1: Option<String>,
    pub level2: Option<String>,
}

impl CycleOutcome {
    pub fn is_halted(&self) -> bool {
        self.status == CycleStatus::Halted
    }

    /// The verdict that governed the cycle: post-check when it ran.
    pub fn risk_verdict(&self) -> &RiskVerdict {
        self.post_check.as_ref().unwrap_or(&self.pre_check)
    }
}

#[derive(Debug, Error)]
#[error("Cycle {cycle_id} aborted: {source}")]
pub struct CycleError {
    pub cycle_id: Uuid,
    pub source: DomainError,
    /// Portfolio as it stood when the cycle stopped.
    pub portfolio: PortfolioSnapshot,
}

pub struct CycleOrchestrator {
    sentinel: RiskSentinel,
    engine: ExecutionEngine,
    settings: CycleSettings,
    collaborators: Collaborators,
    trades: TradeUseCase,
    signal_log: SignalLogUseCase,
    evaluator: EvaluateSignalsUseCase,
    accuracy: AccuracyReportUseCase,
    reflections: ReflectionManager,
}

impl CycleOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sentinel: RiskSentinel,
        engine: ExecutionEngine,
        settings: CycleSettings,
        collaborators: Collaborators,
        trades: TradeUseCase,
        signal_log: SignalLogUseCase,
        evaluator: EvaluateSignalsUseCase,
        accuracy: AccuracyReportUseCase,
        reflections: ReflectionManager,
    ) -> Self {
        Self {
            sentinel,
            engine,
            settings,
            collaborators,
            trades,
            signal_log,
            evaluator,
            accuracy,
            reflections,
        }
    }

    pub async fn run(&self, request: CycleRequest) -> Result<CycleOutcome, CycleError> {
        let instrument = request.instrument.trim().to_uppercase();
        let cycle_id = Uuid::new_v4();
        let mut portfolio = request.portfolio;
        info!(%cycle_id, %instrument, "Starting cycle");

        macro_rules! store {
            ($e:expr) => {
                match $e {
                    Ok(v) => v,
                    Err(source) => {
                        return Err(CycleError {
                            cycle_id,
                            source,
                            portfolio,
                        })
                    }
                }
            };
        }

        let cross_trial = store!(self.reflections.cross_trial(self.settings.cross_trial_limit));
        let daily_pnl = store!(self.trades.daily_pnl());
        let pre_check = self.sentinel.pre_check(&portfolio, daily_pnl);

        let mut degraded = Vec::new();
        let (feeds, regime) = match self.collaborators.feed.fetch(&instrument).await {
            Ok(bundle) => {
                let regime = classify_snapshot(&bundle.market);
                (bundle, regime)
            }
            Err(e) => {
                warn!(feed = self.collaborators.feed.name(), error = %e, "Market feed unavailable");
                degraded.push(format!("feed: {e}"));
                let bundle = FeedBundle {
                    market: MarketSnapshot::stub(&instrument),
                    ..FeedBundle::default()
                };
                (bundle, RegimeResult::unavailable(&e.to_string()))
            }
        };
        info!(regime = %regime.regime, confidence = regime.confidence, "Market regime");

        if pre_check.is_halt() {
            let reason = format!("Risk Sentinel halt: {}", pre_check.reasons.join("; "));
            warn!(%cycle_id, "{reason}");
            let decision = Decision::hold(&instrument, regime.regime, reason.clone());
            return Ok(CycleOutcome {
                cycle_id,
                instrument,
                status: CycleStatus::Halted,
                portfolio,
                regime,
                pre_check,
                post_check: None,
                decision,
                validation: None,
                trade: None,
                trade_id: None,
                not_executed_reason: Some(reason),
                research_report: None,
                sentiment_report: None,
                signal_accuracy_report: None,
                signals_logged: 0,
                outcomes_evaluated: 0,
                degraded,
                reflection_memory: request.reflection_memory,
                level1: None,
                level2: None,
            });
        }

        let market_price = if feeds.market.source.is_usable() && feeds.market.current_price > 0.0 {
            Some(feeds.market.current_price)
        } else {
            None
        };

        let outcomes_evaluated = match market_price {
            Some(price) => store!(self.evaluator.evaluate_pending(&instrument, price)).evaluated,
            None => 0,
        };
        let signal_accuracy_report = store!(self.accuracy.report(&instrument));

        let mut ctx = CycleContext::new(&instrument, portfolio.clone(), regime.clone()).with_feeds(feeds);
        ctx.cycle_id = cycle_id;
        ctx.cross_trial_reflections = cross_trial;
        ctx.reflection_memory = request.reflection_memory.clone();
        ctx.signal_accuracy_report = signal_accuracy_report.clone();

        let (research, sentiment) = tokio::join!(
            self.collaborators.research.report(&ctx),
            self.collaborators.sentiment.report(&ctx)
        );
        ctx.research_report = keep_report(self.collaborators.research.name(), research, &mut degraded);
        ctx.sentiment_report = keep_report(self.collaborators.sentiment.name(), sentiment, &mut degraded);

        let decision = match self.collaborators.decision_maker.decide(&ctx).await {
            Ok(raw) => Decision::from_json(&raw, &instrument),
            Err(e) => {
                warn!(error = %e, "Decision step failed, holding");
                degraded.push(format!("decision: {e}"));
                let fallback_regime = match regime.regime {
                    MarketRegime::Unknown => MarketRegime::Sideways,
                    r => r,
                };
                Decision::hold(&instrument, fallback_regime, format!("Decision unavailable: {e}"))
            }
        };
        info!(action = %decision.action, size_pct = decision.size_pct, confidence = decision.confidence, "Decision");
        if decision.asset != instrument {
            warn!(asset = %decision.asset, %instrument, "Decision names another asset, trading the cycle instrument");
        }
        ctx.decision = Some(decision.clone());

        let mut validation = None;
        let mut post_check = None;
        let mut trade = None;
        let not_executed_reason;

        if decision.action.is_hold() {
            not_executed_reason = Some(HOLD_NO_TRADE.to_string());
        } else {
            let checked = match self.collaborators.validator.validate(&decision, &ctx).await {
                Ok(raw) => TradeValidation::from_json(&raw, &decision),
                Err(e) => {
                    warn!(error = %e, "Trade validation failed, rejecting");
                    degraded.push(format!("validator: {e}"));
                    TradeValidation::reject(&format!("Validation unavailable: {e}"))
                }
            };
            let verdict =
                self.sentinel
                    .post_check(decision.action, checked.modified_size_pct, &portfolio, &ctx.market);
            let mut size_pct = verdict.modified_size_pct;
            if size_pct > self.settings.max_position_pct {
                warn!(size_pct, cap = self.settings.max_position_pct, "Size exceeds max position, capping");
                size_pct = self.settings.max_position_pct;
            }

            not_executed_reason = if !checked.execute {
                Some(checked.reason.clone())
            } else if size_pct <= 0.0 {
                Some("Trade size reduced to zero".to_string())
            } else if let Some(price) = market_price {
                match self.engine.execute(decision.action, &instrument, size_pct, &portfolio, price) {
                    Ok(fill) => {
                        portfolio = fill.portfolio;
                        trade = Some(fill.trade);
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "Execution failed");
                        Some(e.to_string())
                    }
                }
            } else {
                Some("No usable market price".to_string())
            };
            validation = Some(checked);
            post_check = Some(verdict);
        }

        let mut trade_id = None;
        if let Some(record) = &trade {
            let risk_verdict = match &post_check {
                Some(v) => Some(store!(serde_json::to_value(v).map_err(DomainError::from))),
                None => None,
            };
            let entry = TradeLogEntry {
                id: None,
                record: record.clone(),
                net_worth_after: portfolio.net_worth,
                portfolio_snapshot: store!(serde_json::to_value(&portfolio).map_err(DomainError::from)),
                decision: store!(serde_json::to_value(&decision).map_err(DomainError::from)),
                regime: decision.regime.to_string(),
                confidence: decision.confidence,
                risk_verdict,
            };
            trade_id = Some(store!(self.trades.log(&entry)));
        }

        ctx.portfolio = portfolio.clone();
        let signals = extract_signals(&ctx);
        let signals_logged = store!(self.signal_log.log(
            &instrument,
            market_price.unwrap_or(0.0),
            ctx.market.volume_24h,
            &signals
        ))
        .len();

        let regime_label = decision.regime.to_string();
        let info_line = execution_info(trade.as_ref(), not_executed_reason.as_deref());
        let level1 = store!(self.reflections.level1(&decision, &info_line, &regime_label).await);
        let level2 = store!(self.reflections.maybe_level2(&regime_label).await);

        let mut reflection_memory = request.reflection_memory;
        reflection_memory.push(level1.clone());

        info!(%cycle_id, executed = trade.is_some(), signals_logged, "Cycle complete");
        Ok(CycleOutcome {
            cycle_id,
            instrument,
            status: CycleStatus::Completed,
            portfolio,
            regime,
            pre_check,
            post_check,
            decision,
            validation,
            trade,
            trade_id,
            not_executed_reason,
            research_report: ctx.research_report,
            sentiment_report: ctx.sentiment_report,
            signal_accuracy_report,
            signals_logged,
            outcomes_evaluated,
            degraded,
            reflection_memory,
            level1: Some(level1),
            level2,
        })
    }
}

fn keep_report(name: &str, result: Result<String, DomainError>, degraded: &mut Vec<String>) -> Option<String> {
    match result {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(analyst = name, error = %e, "Report unavailable");
            degraded.push(format!("{name}: {e}"));
            None
        }
    }
}
