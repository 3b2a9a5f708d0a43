use crate::domain::values::trade_action::TradeAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable fact produced by the execution engine for one fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub instrument: String,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
    /// Cash spent on a BUY, fee included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Cash received from a SELL, net of fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proceeds: Option<f64>,
}

impl TradeRecord {
    /// Signed cash movement: negative for buys, positive for sells.
    pub fn cash_delta(&self) -> f64 {
        match (self.cost, self.proceeds) {
            (Some(cost), _) => -cost,
            (None, Some(proceeds)) => proceeds,
            (None, None) => 0.0,
        }
    }
}

/// A trade row: the fill plus the audit context it was made in. `id` is
/// assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub id: Option<i64>,
    pub record: TradeRecord,
    /// Net worth of the portfolio right after the fill.
    pub net_worth_after: f64,
    pub portfolio_snapshot: serde_json::Value,
    pub decision: serde_json::Value,
    pub regime: String,
    pub confidence: u8,
    pub risk_verdict: Option<serde_json::Value>,
}
