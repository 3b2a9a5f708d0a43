//! Market regime classification.
//!
//! A pure heuristic over technical indicators: four binary votes (price vs
//! SMA50, RSI vs 50, MACD histogram sign, price vs SMA20) decide between
//! bull, bear and sideways, and the vote margin sets a 1-10 confidence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::values::market::{Indicators, MarketSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegime {
    Bull,
    Bear,
    Sideways,
    Unknown,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Bull => write!(f, "bull"),
            MarketRegime::Bear => write!(f, "bear"),
            MarketRegime::Sideways => write!(f, "sideways"),
            MarketRegime::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for MarketRegime {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bull" | "bullish" => Ok(MarketRegime::Bull),
            "bear" | "bearish" => Ok(MarketRegime::Bear),
            "sideways" | "range" => Ok(MarketRegime::Sideways),
            "unknown" => Ok(MarketRegime::Unknown),
            _ => Err(format!("Unknown market regime: {s}")),
        }
    }
}

/// Macro backdrop label supplied by the macro provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroRegime {
    RiskOn,
    RiskOff,
    Neutral,
    #[default]
    Unknown,
}

impl fmt::Display for MacroRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroRegime::RiskOn => write!(f, "risk_on"),
            MacroRegime::RiskOff => write!(f, "risk_off"),
            MacroRegime::Neutral => write!(f, "neutral"),
            MacroRegime::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for MacroRegime {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "risk_on" => Ok(MacroRegime::RiskOn),
            "risk_off" => Ok(MacroRegime::RiskOff),
            "neutral" => Ok(MacroRegime::Neutral),
            "unknown" => Ok(MacroRegime::Unknown),
            _ => Err(format!("Unknown macro regime: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeResult {
    pub regime: MarketRegime,
    /// 1-10 for a classification, 0 when classification could not run at all.
    pub confidence: u8,
    pub signals: BTreeMap<String, serde_json::Value>,
}

impl RegimeResult {
    /// Result used when the market snapshot could not be obtained.
    pub fn unavailable(reason: &str) -> Self {
        let mut signals = BTreeMap::new();
        signals.insert("error".to_string(), serde_json::Value::from(reason));
        Self {
            regime: MarketRegime::Unknown,
            confidence: 0,
            signals,
        }
    }
}

/// Classify from a provider snapshot; stub snapshots classify as unknown.
pub fn classify_snapshot(market: &MarketSnapshot) -> RegimeResult {
    if !market.source.is_usable() {
        return insufficient();
    }
    classify(market.current_price, &market.indicators)
}

pub fn classify(current_price: f64, indicators: &Indicators) -> RegimeResult {
    let sma50 = indicators.sma_50.unwrap_or(0.0);
    if current_price <= 0.0 || sma50 <= 0.0 {
        return insufficient();
    }

    let rsi = indicators.rsi_14;
    let macd_hist = indicators.macd_histogram;
    let votes = [
        ("price_above_sma50", current_price > sma50),
        ("rsi_above_50", rsi.is_some_and(|r| r > 50.0)),
        ("macd_positive", macd_hist.is_some_and(|m| m > 0.0)),
        (
            "price_above_sma20",
            indicators.sma_20.is_some_and(|s| s > 0.0 && current_price > s),
        ),
    ];
    let bull_count = votes.iter().filter(|(_, v)| *v).count() as u8;
    let total = votes.len() as u8;

    let atr_pct = indicators
        .atr_14
        .map(|atr| atr / current_price * 100.0)
        .unwrap_or(0.0);

    let (regime, mut confidence) = if bull_count >= 3 {
        (MarketRegime::Bull, (5 + bull_count).min(10))
    } else if bull_count <= 1 {
        (MarketRegime::Bear, (5 + (total - bull_count)).min(10))
    } else {
        let confidence = if atr_pct < 2.0 { 7 } else { 5 };
        (MarketRegime::Sideways, confidence)
    };

    match (regime, rsi) {
        (MarketRegime::Bull, Some(r)) if r > 70.0 => confidence = (confidence + 1).min(10),
        (MarketRegime::Bear, Some(r)) if r < 30.0 => confidence = (confidence + 1).min(10),
        _ => {}
    }

    let mut signals: BTreeMap<String, serde_json::Value> = votes
        .iter()
        .map(|(name, v)| (name.to_string(), serde_json::Value::Bool(*v)))
        .collect();
    if let Some(r) = rsi {
        signals.insert("rsi_value".into(), round_to(r, 2).into());
    }
    if let Some(m) = macd_hist {
        signals.insert("macd_histogram".into(), round_to(m, 4).into());
    }
    signals.insert("atr_pct_of_price".into(), round_to(atr_pct, 2).into());

    RegimeResult {
        regime,
        confidence,
        signals,
    }
}

fn insufficient() -> RegimeResult {
    let mut signals = BTreeMap::new();
    signals.insert("error".to_string(), serde_json::Value::from("insufficient data"));
    RegimeResult {
        regime: MarketRegime::Unknown,
        confidence: 1,
        signals,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(rsi: f64, macd: f64, sma20: f64, sma50: f64, atr: f64) -> Indicators {
        Indicators {
            rsi_14: Some(rsi),
            macd_histogram: Some(macd),
            sma_20: Some(sma20),
            sma_50: Some(sma50),
            atr_14: Some(atr),
            ..Indicators::default()
        }
    }

    #[test]
    fn test_missing_price_or_sma50_is_unknown() {
        let r = classify(0.0, &indicators(60.0, 1.0, 90.0, 95.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Unknown);
        assert_eq!(r.confidence, 1);

        let r = classify(100.0, &Indicators::default());
        assert_eq!(r.regime, MarketRegime::Unknown);
        assert_eq!(r.confidence, 1);
    }

    #[test]
    fn test_all_bullish_votes() {
        let r = classify(100.0, &indicators(60.0, 0.5, 95.0, 90.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Bull);
        assert_eq!(r.confidence, 9);
        assert_eq!(r.signals["price_above_sma50"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_overbought_bull_gets_extra_confidence() {
        let r = classify(100.0, &indicators(75.0, 0.5, 95.0, 90.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Bull);
        assert_eq!(r.confidence, 10);
    }

    #[test]
    fn test_three_votes_is_bull_at_eight() {
        // macd negative, everything else bullish
        let r = classify(100.0, &indicators(60.0, -0.5, 95.0, 90.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Bull);
        assert_eq!(r.confidence, 8);
    }

    #[test]
    fn test_bear_with_oversold_rsi() {
        let r = classify(80.0, &indicators(25.0, -1.0, 90.0, 95.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Bear);
        // 5 + (4 - 0) = 9, +1 for RSI < 30
        assert_eq!(r.confidence, 10);
    }

    #[test]
    fn test_one_vote_is_bear() {
        let r = classify(100.0, &indicators(40.0, -1.0, 105.0, 95.0, 1.0));
        assert_eq!(r.regime, MarketRegime::Bear);
        assert_eq!(r.confidence, 8);
    }

    #[test]
    fn test_sideways_confidence_depends_on_atr() {
        // two votes: price > sma50, rsi > 50
        let calm = classify(100.0, &indicators(55.0, -0.1, 105.0, 95.0, 1.5));
        assert_eq!(calm.regime, MarketRegime::Sideways);
        assert_eq!(calm.confidence, 7);

        let choppy = classify(100.0, &indicators(55.0, -0.1, 105.0, 95.0, 4.0));
        assert_eq!(choppy.regime, MarketRegime::Sideways);
        assert_eq!(choppy.confidence, 5);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = indicators(48.0, 0.2, 101.0, 97.0, 2.5);
        let first = classify(100.0, &input);
        for _ in 0..10 {
            let again = classify(100.0, &input);
            assert_eq!(again.regime, first.regime);
            assert_eq!(again.confidence, first.confidence);
        }
    }

    #[test]
    fn test_stub_snapshot_is_unknown() {
        let mut market = MarketSnapshot::stub("SOL");
        market.current_price = 100.0;
        market.indicators = indicators(60.0, 0.5, 95.0, 90.0, 1.0);
        assert_eq!(classify_snapshot(&market).regime, MarketRegime::Unknown);
    }

    #[test]
    fn test_macro_regime_parse() {
        assert_eq!(MacroRegime::from_str("risk-on").unwrap(), MacroRegime::RiskOn);
        assert_eq!(MacroRegime::RiskOff.to_string(), "risk_off");
    }
}
