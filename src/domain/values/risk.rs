//! Risk Sentinel: threshold gates around the decision step.
//!
//! `pre_check` runs before the decision and is the only gate that can halt a
//! cycle. `post_check` runs on a proposed trade and may only shrink it.
//! Both accumulate every breached rule into `reasons`, in rule order.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::domain::values::market::MarketSnapshot;
use crate::domain::values::portfolio::PortfolioSnapshot;
use crate::domain::values::trade_action::TradeAction;

/// Normal ATR band (percent of price) that the spike multiplier scales.
const NORMAL_ATR_PCT: f64 = 2.5;
/// A BUY worth more than this share of net worth gets capped.
const CONCENTRATION_LIMIT_PCT: f64 = 30.0;
const CONCENTRATION_CAP_PCT: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Proceed,
    Reduce,
    Halt,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Proceed => write!(f, "proceed"),
            Verdict::Reduce => write!(f, "reduce"),
            Verdict::Halt => write!(f, "halt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub verdict: Verdict,
    pub modified_size_pct: f64,
    pub reasons: Vec<String>,
}

impl RiskVerdict {
    pub fn proceed(size_pct: f64) -> Self {
        Self {
            verdict: Verdict::Proceed,
            modified_size_pct: size_pct,
            reasons: Vec::new(),
        }
    }

    pub fn is_halt(&self) -> bool {
        self.verdict == Verdict::Halt
    }
}

/// Thresholds, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub initial_capital: f64,
    pub max_daily_loss_pct: f64,
    pub max_drawdown_pct: f64,
    pub volatility_spike_multiplier: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            max_daily_loss_pct: 5.0,
            max_drawdown_pct: 15.0,
            volatility_spike_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RiskSentinel {
    limits: RiskLimits,
}

impl RiskSentinel {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Daily loss and drawdown gate. A breach sits at or beyond its limit.
    pub fn pre_check(&self, portfolio: &PortfolioSnapshot, daily_pnl: f64) -> RiskVerdict {
        let mut reasons = Vec::new();
        let net_worth = portfolio.net_worth;

        if net_worth > 0.0 && daily_pnl < 0.0 {
            let daily_loss_pct = daily_pnl.abs() / net_worth * 100.0;
            if daily_loss_pct >= self.limits.max_daily_loss_pct {
                reasons.push(format!(
                    "Daily loss {:.1}% exceeds limit {}%",
                    daily_loss_pct, self.limits.max_daily_loss_pct
                ));
            }
        }

        let drawdown_pct = if self.limits.initial_capital > 0.0 {
            (1.0 - net_worth / self.limits.initial_capital) * 100.0
        } else {
            0.0
        };
        if drawdown_pct >= self.limits.max_drawdown_pct {
            reasons.push(format!(
                "Drawdown {:.1}% exceeds limit {}%",
                drawdown_pct, self.limits.max_drawdown_pct
            ));
        }

        if reasons.is_empty() {
            info!("Risk pre-check passed (drawdown {:.1}%)", drawdown_pct);
            RiskVerdict::proceed(0.0)
        } else {
            warn!("Risk pre-check HALT: {}", reasons.join("; "));
            RiskVerdict {
                verdict: Verdict::Halt,
                modified_size_pct: 0.0,
                reasons,
            }
        }
    }

    /// Volatility and concentration gate on a proposed trade.
    pub fn post_check(
        &self,
        action: TradeAction,
        size_pct: f64,
        portfolio: &PortfolioSnapshot,
        market: &MarketSnapshot,
    ) -> RiskVerdict {
        if action.is_hold() || size_pct == 0.0 {
            return RiskVerdict::proceed(0.0);
        }

        let mut reasons = Vec::new();
        let mut modified = size_pct;

        if let Some(atr_pct) = market.atr_pct() {
            if atr_pct > self.limits.volatility_spike_multiplier * NORMAL_ATR_PCT {
                modified = size_pct / 2.0;
                reasons.push(format!(
                    "ATR spike detected ({:.1}% of price). Position halved.",
                    atr_pct
                ));
            }
        }

        let net_worth = portfolio.net_worth;
        if action == TradeAction::Buy && net_worth > 0.0 {
            let trade_value = portfolio.cash * (modified / 100.0);
            let position_pct = trade_value / net_worth * 100.0;
            if position_pct > CONCENTRATION_LIMIT_PCT {
                modified = modified.min(CONCENTRATION_CAP_PCT);
                reasons.push(format!(
                    "Position would be {:.0}% of portfolio. Capped at {}%.",
                    position_pct, CONCENTRATION_CAP_PCT
                ));
            }
        }

        let verdict = if modified != size_pct {
            Verdict::Reduce
        } else {
            Verdict::Proceed
        };
        if reasons.is_empty() {
            info!("Risk post-check passed");
        } else {
            warn!("Risk post-check: {}", reasons.join("; "));
        }

        RiskVerdict {
            verdict,
            modified_size_pct: (modified * 100.0).round() / 100.0,
            reasons,
        }
    }
}
