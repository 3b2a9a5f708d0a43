//! Provider snapshots consumed by a cycle.
//!
//! Every snapshot carries a [`DataSource`] marker. Providers never fail a
//! cycle: on error they hand back a stub, and consumers treat stub data as
//! missing rather than as zero.

use serde::{Deserialize, Serialize};

use crate::domain::values::data_source::DataSource;
use crate::domain::values::regime::MacroRegime;

/// Technical indicators computed by the market data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Indicators {
    pub rsi_14: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub atr_14: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Where price sits relative to a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmaPosition {
    Above,
    Below,
    At,
}

impl SmaPosition {
    pub fn of(price: f64, sma: Option<f64>) -> Option<SmaPosition> {
        let sma = sma.filter(|v| *v > 0.0)?;
        if price <= 0.0 {
            return None;
        }
        Some(if price > sma {
            SmaPosition::Above
        } else if price < sma {
            SmaPosition::Below
        } else {
            SmaPosition::At
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub instrument: String,
    pub source: DataSource,
    pub current_price: f64,
    pub volume_24h: Option<f64>,
    pub price_change_24h_pct: Option<f64>,
    pub indicators: Indicators,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self {
            instrument: String::new(),
            source: DataSource::Stub,
            current_price: 0.0,
            volume_24h: None,
            price_change_24h_pct: None,
            indicators: Indicators::default(),
        }
    }
}

impl MarketSnapshot {
    pub fn stub(instrument: &str) -> Self {
        Self {
            instrument: instrument.to_uppercase(),
            ..Self::default()
        }
    }

    pub fn price_vs_sma20(&self) -> Option<SmaPosition> {
        SmaPosition::of(self.current_price, self.indicators.sma_20)
    }

    pub fn price_vs_sma50(&self) -> Option<SmaPosition> {
        SmaPosition::of(self.current_price, self.indicators.sma_50)
    }

    /// ATR as a percentage of price, when both are known.
    pub fn atr_pct(&self) -> Option<f64> {
        let atr = self.indicators.atr_14.filter(|v| *v > 0.0)?;
        if self.current_price <= 0.0 {
            return None;
        }
        Some(atr / self.current_price * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleActivity {
    High,
    Moderate,
    Low,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnchainSnapshot {
    pub source: DataSource,
    pub tvl_change_7d_pct: Option<f64>,
    pub dex_volume_change_7d_pct: Option<f64>,
    pub whale_activity: Option<WhaleActivity>,
}

impl Default for OnchainSnapshot {
    fn default() -> Self {
        Self {
            source: DataSource::Stub,
            tvl_change_7d_pct: None,
            dex_volume_change_7d_pct: None,
            whale_activity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentSnapshot {
    pub source: DataSource,
    /// Fear & Greed index, 0 (extreme fear) to 100 (extreme greed).
    pub fear_greed_index: Option<u8>,
    pub fear_greed_label: Option<String>,
}

impl Default for SentimentSnapshot {
    fn default() -> Self {
        Self {
            source: DataSource::Stub,
            fear_greed_index: None,
            fear_greed_label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroSnapshot {
    pub source: DataSource,
    pub macro_regime: MacroRegime,
    /// 0 when the regime could not be classified, else 1-10.
    pub confidence: u8,
}

impl Default for MacroSnapshot {
    fn default() -> Self {
        Self {
            source: DataSource::Stub,
            macro_regime: MacroRegime::Unknown,
            confidence: 0,
        }
    }
}

/// Everything the data providers return for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedBundle {
    pub market: MarketSnapshot,
    pub onchain: OnchainSnapshot,
    pub sentiment: SentimentSnapshot,
    #[serde(rename = "macro")]
    pub macro_data: MacroSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_position() {
        assert_eq!(SmaPosition::of(110.0, Some(100.0)), Some(SmaPosition::Above));
        assert_eq!(SmaPosition::of(90.0, Some(100.0)), Some(SmaPosition::Below));
        assert_eq!(SmaPosition::of(90.0, None), None);
        assert_eq!(SmaPosition::of(0.0, Some(100.0)), None);
    }

    #[test]
    fn test_defaults_are_stubs() {
        let bundle = FeedBundle::default();
        assert!(!bundle.market.source.is_usable());
        assert!(!bundle.onchain.source.is_usable());
        assert!(!bundle.sentiment.source.is_usable());
        assert!(!bundle.macro_data.source.is_usable());
    }

    #[test]
    fn test_bundle_deserializes_partial_json() {
        let json = r#"{
            "market": {"instrument": "SOL", "source": "real", "current_price": 150.0,
                       "indicators": {"rsi_14": 62.0, "atr_14": 3.0}},
            "macro": {"source": "real", "macro_regime": "risk_on", "confidence": 7}
        }"#;
        let bundle: FeedBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.market.current_price, 150.0);
        assert_eq!(bundle.market.indicators.rsi_14, Some(62.0));
        assert!((bundle.market.atr_pct().unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(bundle.macro_data.macro_regime, MacroRegime::RiskOn);
        assert_eq!(bundle.onchain.source, DataSource::Stub);
    }
}
