//! Decisions proposed by the external decision-maker.
//!
//! The collaborator answers with loosely-shaped JSON. [`Decision::from_json`]
//! is the single ingestion point: missing fields default to a HOLD
//! equivalent, `size_pct` is clamped to `[0, 100]` and `confidence` to `[1, 10]`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::values::regime::MarketRegime;
use crate::domain::values::trade_action::TradeAction;

pub const MISSING_FIELD_RATIONALE: &str = "Missing field, defaulting to HOLD.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: TradeAction,
    pub asset: String,
    pub size_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit_pct: Option<f64>,
    /// 1-10.
    pub confidence: u8,
    pub regime: MarketRegime,
    pub rationale: String,
}

impl Decision {
    pub fn hold(asset: &str, regime: MarketRegime, rationale: String) -> Self {
        Self {
            action: TradeAction::Hold,
            asset: asset.to_uppercase(),
            size_pct: 0.0,
            stop_loss_pct: None,
            take_profit_pct: None,
            confidence: 1,
            regime,
            rationale,
        }
    }

    /// Validate a raw collaborator payload.
    pub fn from_json(value: &serde_json::Value, instrument: &str) -> Self {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                warn!("Decision payload is not an object, defaulting to HOLD");
                return Self::hold(instrument, MarketRegime::Sideways, MISSING_FIELD_RATIONALE.into());
            }
        };

        let action = obj
            .get("action")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<TradeAction>().ok());
        let asset = obj
            .get("asset")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_else(|| instrument.to_uppercase());
        let size_pct = obj.get("size_pct").and_then(number).unwrap_or(0.0);
        let confidence = obj.get("confidence").and_then(number).unwrap_or(1.0);
        let regime = obj
            .get("regime")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<MarketRegime>().ok())
            .unwrap_or(MarketRegime::Sideways);
        let rationale = obj
            .get("rationale")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| MISSING_FIELD_RATIONALE.to_string());

        let action = match action {
            Some(a) => a,
            None => {
                warn!("Decision has no valid action, defaulting to HOLD");
                TradeAction::Hold
            }
        };
        let size_pct = if action.is_hold() {
            0.0
        } else {
            clamp_or(size_pct, 0.0, 100.0, 0.0)
        };

        Self {
            action,
            asset,
            size_pct,
            stop_loss_pct: obj.get("stop_loss_pct").and_then(number),
            take_profit_pct: obj.get("take_profit_pct").and_then(number),
            confidence: clamp_or(confidence, 1.0, 10.0, 1.0).round() as u8,
            regime,
            rationale,
        }
    }
}

/// Answer of the trade validation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeValidation {
    pub execute: bool,
    pub modified_size_pct: f64,
    pub order_type: String,
    pub reason: String,
}

impl TradeValidation {
    pub fn reject(reason: &str) -> Self {
        Self {
            execute: false,
            modified_size_pct: 0.0,
            order_type: "market".into(),
            reason: reason.to_string(),
        }
    }

    /// Validate a raw collaborator payload against the decision it answers.
    pub fn from_json(value: &serde_json::Value, decision: &Decision) -> Self {
        let execute = value.get("execute").and_then(|v| v.as_bool()).unwrap_or(false);
        let size = value
            .get("modified_size_pct")
            .and_then(number)
            .unwrap_or(decision.size_pct);
        Self {
            execute,
            modified_size_pct: clamp_or(size, 0.0, 100.0, 0.0),
            order_type: value
                .get("order_type")
                .and_then(|v| v.as_str())
                .unwrap_or("market")
                .to_string(),
            reason: value
                .get("reason")
                .and_then(|v| v.as_str())
                .unwrap_or("Trade rejected by validator")
                .to_string(),
        }
    }
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn number(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn clamp_or(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_nan() {
        fallback
    } else {
        v.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let d = Decision::from_json(
            &json!({
                "action": "BUY", "asset": "sol", "size_pct": 12.5,
                "stop_loss_pct": 5, "take_profit_pct": 10,
                "confidence": 7, "regime": "bull", "rationale": "Trend up"
            }),
            "SOL",
        );
        assert_eq!(d.action, TradeAction::Buy);
        assert_eq!(d.asset, "SOL");
        assert_eq!(d.size_pct, 12.5);
        assert_eq!(d.stop_loss_pct, Some(5.0));
        assert_eq!(d.confidence, 7);
        assert_eq!(d.regime, MarketRegime::Bull);
    }

    #[test]
    fn test_missing_fields_default_to_hold() {
        let d = Decision::from_json(&json!({}), "eth");
        assert_eq!(d.action, TradeAction::Hold);
        assert_eq!(d.asset, "ETH");
        assert_eq!(d.size_pct, 0.0);
        assert_eq!(d.confidence, 1);
        assert_eq!(d.regime, MarketRegime::Sideways);
        assert_eq!(d.rationale, MISSING_FIELD_RATIONALE);
    }

    #[test]
    fn test_values_are_clamped() {
        let d = Decision::from_json(
            &json!({"action": "SELL", "size_pct": 250, "confidence": 42}),
            "SOL",
        );
        assert_eq!(d.size_pct, 100.0);
        assert_eq!(d.confidence, 10);

        let d = Decision::from_json(
            &json!({"action": "buy", "size_pct": "-3", "confidence": 0}),
            "SOL",
        );
        assert_eq!(d.size_pct, 0.0);
        assert_eq!(d.confidence, 1);
    }

    #[test]
    fn test_hold_forces_zero_size() {
        let d = Decision::from_json(&json!({"action": "HOLD", "size_pct": 30}), "SOL");
        assert_eq!(d.size_pct, 0.0);
    }

    #[test]
    fn test_non_object_payload() {
        let d = Decision::from_json(&json!("BUY everything"), "SOL");
        assert_eq!(d.action, TradeAction::Hold);
    }

    #[test]
    fn test_validation_defaults_to_decision_size() {
        let d = Decision::from_json(&json!({"action": "BUY", "size_pct": 15}), "SOL");
        let v = TradeValidation::from_json(&json!({"execute": true}), &d);
        assert!(v.execute);
        assert_eq!(v.modified_size_pct, 15.0);
        assert_eq!(v.order_type, "market");
    }
}
