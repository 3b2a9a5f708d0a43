//! Process configuration.
//!
//! Built once at start-up from `TC_*` environment variables (a `.env` file is
//! honoured) and passed by value into the components that need it.

use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

use crate::domain::error::ExecutionError;
use crate::domain::values::execution::ExecutionMode;
use crate::domain::values::risk::RiskLimits;

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub db_path: String,
    pub instrument: String,
    pub execution_mode: String,
    pub initial_capital: f64,
    /// Fraction of notional: 0.001 is 0.1%.
    pub trading_fee_pct: f64,
    /// Hard cap on a single trade, percent of available capacity.
    pub max_position_pct: f64,
    pub max_daily_loss_pct: f64,
    pub max_drawdown_pct: f64,
    pub volatility_spike_multiplier: f64,
    /// Level-1 reflections between level-2 reviews.
    pub reflection_cycle_length: usize,
    /// How many level-2 reviews are shown to the decision step.
    pub cross_trial_limit: usize,
    #[serde(skip_serializing)]
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "./tradecycle.db".into(),
            instrument: "SOL".into(),
            execution_mode: "paper".into(),
            initial_capital: 10_000.0,
            trading_fee_pct: 0.001,
            max_position_pct: 25.0,
            max_daily_loss_pct: 5.0,
            max_drawdown_pct: 15.0,
            volatility_spike_multiplier: 2.0,
            reflection_cycle_length: 5,
            cross_trial_limit: 3,
            llm_api_key: String::new(),
            llm_base_url: "https://api.openai.com/v1".into(),
            llm_model: "gpt-4o-mini".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparseable keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            db_path: lookup("TC_DB").unwrap_or(d.db_path),
            instrument: lookup("TC_INSTRUMENT")
                .map(|s| s.to_uppercase())
                .unwrap_or(d.instrument),
            execution_mode: lookup("TC_EXECUTION_MODE").unwrap_or(d.execution_mode),
            initial_capital: parse_or(&lookup, "TC_INITIAL_CAPITAL", d.initial_capital),
            trading_fee_pct: parse_or(&lookup, "TC_TRADING_FEE_PCT", d.trading_fee_pct),
            max_position_pct: parse_or(&lookup, "TC_MAX_POSITION_PCT", d.max_position_pct),
            max_daily_loss_pct: parse_or(&lookup, "TC_MAX_DAILY_LOSS_PCT", d.max_daily_loss_pct),
            max_drawdown_pct: parse_or(&lookup, "TC_MAX_DRAWDOWN_PCT", d.max_drawdown_pct),
            volatility_spike_multiplier: parse_or(
                &lookup,
                "TC_VOLATILITY_SPIKE_MULTIPLIER",
                d.volatility_spike_multiplier,
            ),
            reflection_cycle_length: parse_or(
                &lookup,
                "TC_REFLECTION_CYCLE_LENGTH",
                d.reflection_cycle_length,
            )
            .max(1),
            cross_trial_limit: parse_or(&lookup, "TC_CROSS_TRIAL_LIMIT", d.cross_trial_limit),
            llm_api_key: lookup("TC_LLM_API_KEY").unwrap_or(d.llm_api_key),
            llm_base_url: lookup("TC_LLM_BASE_URL").unwrap_or(d.llm_base_url),
            llm_model: lookup("TC_LLM_MODEL").unwrap_or(d.llm_model),
        }
    }

    pub fn risk_limits(&self) -> RiskLimits {
        RiskLimits {
            initial_capital: self.initial_capital,
            max_daily_loss_pct: self.max_daily_loss_pct,
            max_drawdown_pct: self.max_drawdown_pct,
            volatility_spike_multiplier: self.volatility_spike_multiplier,
        }
    }

    pub fn execution_mode(&self) -> Result<ExecutionMode, ExecutionError> {
        self.execution_mode.parse()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("Ignoring invalid {key}={raw:?}, using default {default}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = from_map(&[]);
        assert_eq!(c.initial_capital, 10_000.0);
        assert_eq!(c.trading_fee_pct, 0.001);
        assert_eq!(c.max_position_pct, 25.0);
        assert_eq!(c.reflection_cycle_length, 5);
        assert_eq!(c.execution_mode().unwrap(), ExecutionMode::Paper);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let c = from_map(&[
            ("TC_INITIAL_CAPITAL", "2500"),
            ("TC_MAX_DRAWDOWN_PCT", "ten"),
            ("TC_INSTRUMENT", "eth"),
            ("TC_REFLECTION_CYCLE_LENGTH", "0"),
        ]);
        assert_eq!(c.initial_capital, 2_500.0);
        assert_eq!(c.max_drawdown_pct, 15.0);
        assert_eq!(c.instrument, "ETH");
        assert_eq!(c.reflection_cycle_length, 1);
        assert_eq!(c.risk_limits().initial_capital, 2_500.0);
    }

    #[test]
    fn test_unknown_mode_surfaces() {
        let c = from_map(&[("TC_EXECUTION_MODE", "margin")]);
        assert!(matches!(c.execution_mode(), Err(ExecutionError::UnknownMode(_))));
    }
}
