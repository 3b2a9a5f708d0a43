//! Simulated execution engine.
//!
//! `size_pct` is a percentage of available capacity: of cash for a BUY, of
//! the current holding for a SELL. Execution never mutates its input; it
//! returns the superseding snapshot together with the trade record.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entities::trade::TradeRecord;
use crate::domain::error::ExecutionError;
use crate::domain::values::portfolio::PortfolioSnapshot;
use crate::domain::values::trade_action::TradeAction;

/// Holdings below this are treated as fully sold.
pub const DUST_EPSILON: f64 = 1e-10;

/// Execution venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Paper,
    Live,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Paper => write!(f, "paper"),
            ExecutionMode::Live => write!(f, "live"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = ExecutionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paper" => Ok(ExecutionMode::Paper),
            "live" => Ok(ExecutionMode::Live),
            _ => Err(ExecutionError::UnknownMode(s.to_string())),
        }
    }
}

/// A successful execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub trade: TradeRecord,
    pub portfolio: PortfolioSnapshot,
}

/// Routes orders to the venue selected by [`ExecutionMode`].
#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    mode: ExecutionMode,
    fee_pct: f64,
}

impl ExecutionEngine {
    /// `fee_pct` is a fraction: 0.001 is 0.1%.
    pub fn new(mode: ExecutionMode, fee_pct: f64) -> Self {
        Self { mode, fee_pct }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn execute(
        &self,
        action: TradeAction,
        instrument: &str,
        size_pct: f64,
        snapshot: &PortfolioSnapshot,
        current_price: f64,
    ) -> Result<Fill, ExecutionError> {
        match self.mode {
            ExecutionMode::Paper => {
                simulate(action, instrument, size_pct, snapshot, current_price, self.fee_pct)
            }
            ExecutionMode::Live => Err(ExecutionError::LiveTradingUnsupported),
        }
    }
}

/// Apply a BUY or SELL to `snapshot` at `current_price`.
///
/// A non-positive price yields a zero-quantity BUY instead of an error.
pub fn simulate(
    action: TradeAction,
    instrument: &str,
    size_pct: f64,
    snapshot: &PortfolioSnapshot,
    current_price: f64,
    fee_pct: f64,
) -> Result<Fill, ExecutionError> {
    if size_pct.is_nan() || size_pct < 0.0 {
        return Err(ExecutionError::InvalidSize(size_pct));
    }
    let instrument = instrument.to_uppercase();
    let mut portfolio = snapshot.clone();
    let fraction = size_pct / 100.0;

    let trade = match action {
        TradeAction::Buy => {
            let trade_amount = portfolio.cash * fraction;
            if trade_amount > portfolio.cash {
                return Err(ExecutionError::InsufficientCash {
                    needed: trade_amount,
                    available: portfolio.cash,
                });
            }
            let fee = trade_amount * fee_pct;
            let quantity = if current_price > 0.0 {
                (trade_amount - fee) / current_price
            } else {
                0.0
            };

            portfolio.cash -= trade_amount;
            *portfolio.holdings.entry(instrument.clone()).or_insert(0.0) += quantity;

            info!(
                "BUY {:.4} {} @ ${:.2} (cost: ${:.2}, fee: ${:.2})",
                quantity, instrument, current_price, trade_amount, fee
            );
            TradeRecord {
                timestamp: Utc::now(),
                action,
                instrument: instrument.clone(),
                price: current_price,
                quantity,
                fee,
                cost: Some(trade_amount),
                proceeds: None,
            }
        }
        TradeAction::Sell => {
            let held = portfolio.holding(&instrument);
            if held <= 0.0 {
                return Err(ExecutionError::NoHoldings(instrument));
            }
            let sell_quantity = (held * fraction).min(held);
            let gross = sell_quantity * current_price;
            let fee = gross * fee_pct;
            let net = gross - fee;

            let mut remaining = held - sell_quantity;
            if remaining < DUST_EPSILON {
                remaining = 0.0;
            }
            portfolio.holdings.insert(instrument.clone(), remaining);
            portfolio.cash += net;

            info!(
                "SELL {:.4} {} @ ${:.2} (proceeds: ${:.2}, fee: ${:.2})",
                sell_quantity, instrument, current_price, net, fee
            );
            TradeRecord {
                timestamp: Utc::now(),
                action,
                instrument: instrument.clone(),
                price: current_price,
                quantity: sell_quantity,
                fee,
                cost: None,
                proceeds: Some(net),
            }
        }
        TradeAction::Hold => return Err(ExecutionError::UnknownAction(action.to_string())),
    };

    portfolio.revalue(&instrument, current_price);
    portfolio.trade_history.push(trade.clone());

    Ok(Fill { trade, portfolio })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE: f64 = 0.001;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_buy_ten_percent_of_ten_thousand() {
        let start = PortfolioSnapshot::new(10_000.0);
        let fill = simulate(TradeAction::Buy, "x", 10.0, &start, 100.0, FEE).unwrap();

        assert!(close(fill.trade.cost.unwrap(), 1_000.0));
        assert!(close(fill.trade.fee, 1.0));
        assert!(close(fill.trade.quantity, 9.99));
        assert!(close(fill.portfolio.cash, 9_000.0));
        assert!(close(fill.portfolio.holding("X"), 9.99));
        assert!(close(fill.portfolio.net_worth, 9_999.0));
        assert_eq!(fill.portfolio.trade_history.len(), 1);
        // Input snapshot untouched
        assert_eq!(start.cash, 10_000.0);
        assert!(start.trade_history.is_empty());
    }

    #[test]
    fn test_buy_conserves_cash_and_holdings() {
        let mut start = PortfolioSnapshot::new(5_000.0);
        start.holdings.insert("SOL".into(), 3.0);
        for size in [0.0, 1.0, 33.3, 50.0, 100.0] {
            let fill = simulate(TradeAction::Buy, "SOL", size, &start, 42.0, FEE).unwrap();
            let amount = fill.trade.cost.unwrap();
            assert!(amount <= start.cash);
            assert!(close(fill.portfolio.cash, start.cash - amount));
            assert!(close(
                fill.portfolio.holding("SOL"),
                start.holding("SOL") + fill.trade.quantity
            ));
        }
    }

    #[test]
    fn test_buy_over_full_cash_is_insufficient() {
        let start = PortfolioSnapshot::new(1_000.0);
        let err = simulate(TradeAction::Buy, "SOL", 150.0, &start, 10.0, FEE).unwrap_err();
        assert!(matches!(err, ExecutionError::InsufficientCash { .. }));
    }

    #[test]
    fn test_buy_at_zero_price_fills_nothing() {
        let start = PortfolioSnapshot::new(1_000.0);
        let fill = simulate(TradeAction::Buy, "SOL", 10.0, &start, 0.0, FEE).unwrap();
        assert_eq!(fill.trade.quantity, 0.0);
        assert!(close(fill.portfolio.cash, 900.0));
    }

    #[test]
    fn test_sell_without_holdings_fails() {
        let start = PortfolioSnapshot::new(1_000.0);
        let err = simulate(TradeAction::Sell, "SOL", 50.0, &start, 10.0, FEE).unwrap_err();
        assert_eq!(err, ExecutionError::NoHoldings("SOL".into()));
    }

    #[test]
    fn test_sell_everything_leaves_exactly_zero() {
        let mut start = PortfolioSnapshot::new(0.0);
        start.holdings.insert("SOL".into(), 0.1 + 0.2);
        let fill = simulate(TradeAction::Sell, "SOL", 100.0, &start, 10.0, FEE).unwrap();
        assert_eq!(fill.portfolio.holding("SOL"), 0.0);
        let gross = (0.1 + 0.2) * 10.0;
        assert!(close(fill.trade.proceeds.unwrap(), gross - gross * FEE));
        assert!(close(fill.portfolio.cash, gross - gross * FEE));
    }

    #[test]
    fn test_partial_sell_never_goes_negative() {
        let mut start = PortfolioSnapshot::new(0.0);
        start.holdings.insert("SOL".into(), 7.0);
        for size in [0.0, 10.0, 50.0, 99.9, 100.0, 250.0] {
            let fill = simulate(TradeAction::Sell, "SOL", size, &start, 3.0, FEE).unwrap();
            assert!(fill.portfolio.holding("SOL") >= 0.0);
        }
    }

    #[test]
    fn test_hold_is_not_executable() {
        let start = PortfolioSnapshot::new(1_000.0);
        let err = simulate(TradeAction::Hold, "SOL", 10.0, &start, 10.0, FEE).unwrap_err();
        assert_eq!(err, ExecutionError::UnknownAction("HOLD".into()));
    }

    #[test]
    fn test_negative_size_rejected() {
        let start = PortfolioSnapshot::new(1_000.0);
        let err = simulate(TradeAction::Buy, "SOL", -5.0, &start, 10.0, FEE).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidSize(_)));
    }

    #[test]
    fn test_failure_records_no_trade() {
        let start = PortfolioSnapshot::new(1_000.0);
        let _ = simulate(TradeAction::Sell, "SOL", 10.0, &start, 10.0, FEE);
        assert!(start.trade_history.is_empty());
    }

    #[test]
    fn test_live_mode_is_rejected() {
        let engine = ExecutionEngine::new(ExecutionMode::Live, FEE);
        let start = PortfolioSnapshot::new(1_000.0);
        let err = engine
            .execute(TradeAction::Buy, "SOL", 10.0, &start, 10.0)
            .unwrap_err();
        assert_eq!(err, ExecutionError::LiveTradingUnsupported);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("paper".parse::<ExecutionMode>().unwrap(), ExecutionMode::Paper);
        assert_eq!(
            "margin".parse::<ExecutionMode>().unwrap_err(),
            ExecutionError::UnknownMode("margin".into())
        );
    }
}
