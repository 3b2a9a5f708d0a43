mod common;

use common::{
    buy_json, collaborators, hold_json, real_market, sell_json, setup_with, EchoSummarizer, FailingAnalyst,
    FixedFeed,
};
use std::sync::Arc;
use tradecycle::application::cycle::{CycleRequest, CycleStatus, HOLD_NO_TRADE};
use tradecycle::domain::error::ExecutionError;
use tradecycle::domain::values::portfolio::PortfolioSnapshot;
use tradecycle::domain::values::risk::Verdict;
use tradecycle::domain::values::trade_action::TradeAction;
use tradecycle::infrastructure::feeds::StubFeed;
use tradecycle::TradeCycle;

fn with_market(decision: serde_json::Value) -> TradeCycle {
    setup_with(
        collaborators(Arc::new(FixedFeed(real_market("SOL", 100.0))), decision),
        Arc::new(EchoSummarizer),
    )
}

fn request(portfolio: PortfolioSnapshot) -> CycleRequest {
    CycleRequest {
        instrument: "sol".into(),
        portfolio,
        reflection_memory: Vec::new(),
    }
}

#[tokio::test]
async fn test_drawdown_halts_before_deciding() {
    let tc = with_market(buy_json(20.0));
    let mut portfolio = PortfolioSnapshot::new(8_000.0);
    portfolio.net_worth = 8_000.0;

    let outcome = tc.run_cycle(request(portfolio.clone())).await.unwrap();
    assert_eq!(outcome.status, CycleStatus::Halted);
    assert!(outcome.is_halted());
    assert_eq!(outcome.pre_check.verdict, Verdict::Halt);
    assert!(outcome.pre_check.reasons[0].starts_with("Drawdown 20.0%"));
    assert_eq!(outcome.decision.action, TradeAction::Hold);
    assert!(outcome.decision.rationale.starts_with("Risk Sentinel halt:"));
    assert_eq!(outcome.portfolio, portfolio);
    assert!(outcome.level1.is_none());

    let stats = tc.stats().unwrap();
    assert_eq!(stats.trades, 0);
    assert_eq!(stats.signals, 0);
    assert_eq!(stats.reflections, 0);
}

#[tokio::test]
async fn test_buy_executes_and_is_recorded() {
    let tc = with_market(buy_json(20.0));
    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();

    assert_eq!(outcome.status, CycleStatus::Completed);
    assert_eq!(outcome.instrument, "SOL");
    let trade = outcome.trade.as_ref().unwrap();
    assert_eq!(trade.action, TradeAction::Buy);
    assert_eq!(trade.price, 100.0);
    assert!((trade.fee - 2.0).abs() < 1e-9);
    assert!((trade.quantity - 19.98).abs() < 1e-9);
    assert!((outcome.portfolio.cash - 8_000.0).abs() < 1e-9);
    assert!((outcome.portfolio.holding("SOL") - 19.98).abs() < 1e-9);
    assert!(outcome.trade_id.is_some());
    assert!(outcome.not_executed_reason.is_none());
    assert_eq!(outcome.risk_verdict().verdict, Verdict::Proceed);

    let trades = tc.recent_trades(10).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].record.instrument, "SOL");
    assert_eq!(trades[0].regime, "bull");
    assert_eq!(trades[0].confidence, 7);
    assert_eq!(trades[0].portfolio_snapshot["cash"], 8_000.0);
    assert_eq!(trades[0].decision["action"], "BUY");
    assert_eq!(trades[0].risk_verdict.as_ref().unwrap()["verdict"], "proceed");

    assert!(outcome.signals_logged > 0);
    let stats = tc.stats().unwrap();
    assert_eq!(stats.signals, outcome.signals_logged);
    assert_eq!(stats.price_snapshots, 1);
    assert_eq!(stats.reflections, 1);
    assert_eq!(outcome.level1.as_deref(), Some("lesson (level 1)"));
    assert_eq!(outcome.reflection_memory, vec!["lesson (level 1)".to_string()]);
}

#[tokio::test]
async fn test_oversized_buy_is_capped_by_concentration() {
    let tc = with_market(buy_json(60.0));
    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();

    let post = outcome.post_check.as_ref().unwrap();
    assert_eq!(post.verdict, Verdict::Reduce);
    assert_eq!(post.modified_size_pct, 25.0);
    assert!((outcome.portfolio.cash - 7_500.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_sell_without_holdings_reports_engine_error() {
    let tc = with_market(sell_json(50.0));
    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();

    assert_eq!(outcome.status, CycleStatus::Completed);
    assert!(outcome.trade.is_none());
    assert!(outcome.trade_id.is_none());
    assert_eq!(
        outcome.not_executed_reason,
        Some(ExecutionError::NoHoldings("SOL".into()).to_string())
    );
    assert!(outcome.validation.as_ref().unwrap().execute);
    assert_eq!(outcome.portfolio, tc.initial_portfolio());
    assert_eq!(tc.stats().unwrap().trades, 0);
    assert!(outcome.level1.is_some());
}

#[tokio::test]
async fn test_hold_records_no_trade() {
    let tc = with_market(hold_json());
    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();

    assert_eq!(outcome.decision.action, TradeAction::Hold);
    assert_eq!(outcome.not_executed_reason.as_deref(), Some(HOLD_NO_TRADE));
    assert!(outcome.trade.is_none());
    assert!(outcome.validation.is_none());
    assert_eq!(outcome.portfolio, tc.initial_portfolio());
    assert_eq!(tc.stats().unwrap().trades, 0);
    // Market signals are still logged for later scoring.
    assert!(outcome.signals_logged > 0);
}

#[tokio::test]
async fn test_failed_analyst_degrades_cycle() {
    let mut collab = collaborators(Arc::new(FixedFeed(real_market("SOL", 100.0))), hold_json());
    collab.research = Arc::new(FailingAnalyst);
    let tc = setup_with(collab, Arc::new(EchoSummarizer));

    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();
    assert_eq!(outcome.status, CycleStatus::Completed);
    assert!(outcome.research_report.is_none());
    assert_eq!(outcome.sentiment_report.as_deref(), Some("sentiment report"));
    assert!(outcome.degraded.iter().any(|d| d.starts_with("research:")));
}

#[tokio::test]
async fn test_buy_without_usable_price_is_not_executed() {
    let tc = setup_with(
        collaborators(Arc::new(StubFeed), buy_json(10.0)),
        Arc::new(EchoSummarizer),
    );
    let outcome = tc.run_cycle(request(tc.initial_portfolio())).await.unwrap();

    assert!(outcome.trade.is_none());
    assert_eq!(outcome.not_executed_reason.as_deref(), Some("No usable market price"));
    assert_eq!(outcome.signals_logged, 0);
    assert_eq!(tc.stats().unwrap().price_snapshots, 0);
}

#[tokio::test]
async fn test_cycles_carry_portfolio_and_memory() {
    let tc = with_market(buy_json(10.0));
    let outcomes = tc.run_cycles("SOL", tc.initial_portfolio(), 3).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    let last = outcomes.last().unwrap();
    assert!((last.portfolio.cash - 7_290.0).abs() < 1e-6);
    assert_eq!(last.reflection_memory.len(), 3);
    assert_eq!(tc.recent_trades(10).unwrap().len(), 3);

    // Third lesson completes a review window.
    assert!(outcomes[0].level2.is_none());
    assert!(outcomes[1].level2.is_none());
    assert_eq!(last.level2.as_deref(), Some("lesson (level 2)"));
}
