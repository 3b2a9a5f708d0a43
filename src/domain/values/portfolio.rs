//! Portfolio ledger.
//!
//! Cash plus per-instrument holdings, with `net_worth` kept as a cache of
//! `cash + holdings[instrument] * price` for the instrument priced last.
//! Only the traded instrument is marked to market; other holdings are
//! carried at zero value for the cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::entities::trade::TradeRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub cash: f64,
    /// Instrument symbol (uppercase) to quantity held. Never negative.
    pub holdings: BTreeMap<String, f64>,
    pub net_worth: f64,
    #[serde(default)]
    pub trade_history: Vec<TradeRecord>,
}

impl PortfolioSnapshot {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            holdings: BTreeMap::new(),
            net_worth: initial_capital,
            trade_history: Vec::new(),
        }
    }

    pub fn holding(&self, instrument: &str) -> f64 {
        self.holdings
            .get(&instrument.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    /// Cash plus the mark-to-market value of `instrument` only.
    pub fn value_at(&self, instrument: &str, price: f64) -> f64 {
        let price = if price > 0.0 { price } else { 0.0 };
        self.cash + self.holding(instrument) * price
    }

    /// Recompute the cached net worth against `price`.
    pub fn revalue(&mut self, instrument: &str, price: f64) {
        self.net_worth = self.value_at(instrument, price);
    }

    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::InvalidInput(format!("Cannot read {}: {e}", path.display())))?;
        let snapshot: PortfolioSnapshot = serde_json::from_str(&raw)?;
        if snapshot.cash < 0.0 || snapshot.holdings.values().any(|q| *q < 0.0) {
            return Err(DomainError::InvalidInput(format!(
                "Portfolio in {} has negative cash or holdings",
                path.display()
            )));
        }
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| DomainError::InvalidInput(format!("Cannot write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_portfolio_is_all_cash() {
        let p = PortfolioSnapshot::new(10_000.0);
        assert_eq!(p.cash, 10_000.0);
        assert_eq!(p.net_worth, 10_000.0);
        assert!(p.holdings.is_empty());
        assert!(p.trade_history.is_empty());
    }

    #[test]
    fn test_only_priced_instrument_counts_toward_net_worth() {
        let mut p = PortfolioSnapshot::new(1_000.0);
        p.holdings.insert("SOL".into(), 2.0);
        p.holdings.insert("ETH".into(), 1.0);
        p.revalue("sol", 50.0);
        // ETH is carried at zero while SOL is the priced instrument.
        assert_eq!(p.net_worth, 1_100.0);
    }

    #[test]
    fn test_json_roundtrip_preserves_state() {
        let mut p = PortfolioSnapshot::new(9_000.0);
        p.holdings.insert("SOL".into(), 9.99);
        p.revalue("SOL", 100.0);

        let json = serde_json::to_string(&p).unwrap();
        let back: PortfolioSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cash, p.cash);
        assert_eq!(back.holdings, p.holdings);
        assert_eq!(back.value_at("SOL", 100.0), p.net_worth);
    }
}
