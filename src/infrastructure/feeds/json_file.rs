use crate::domain::error::DomainError;
use crate::domain::ports::market_feed::MarketFeed;
use crate::domain::values::market::FeedBundle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Reads snapshots from a JSON file written by an external collector.
///
/// The file holds either a single bundle, or an object keyed by instrument
/// symbol whose values are bundles. The file is re-read on every fetch.
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarketFeed for JsonFileFeed {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self, instrument: &str) -> Result<FeedBundle, DomainError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainError::Provider(format!("Cannot read {}: {e}", self.path.display())))?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let symbol = instrument.to_uppercase();

        let mut bundle: FeedBundle = if value.get("market").is_some() {
            serde_json::from_value(value)?
        } else {
            let mut by_symbol: HashMap<String, FeedBundle> = serde_json::from_value(value)?;
            let key = by_symbol
                .keys()
                .find(|k| k.eq_ignore_ascii_case(&symbol))
                .cloned()
                .ok_or_else(|| DomainError::NotFound(format!("No feed data for {symbol}")))?;
            by_symbol
                .remove(&key)
                .ok_or_else(|| DomainError::NotFound(format!("No feed data for {symbol}")))?
        };

        if bundle.market.instrument.is_empty() {
            bundle.market.instrument = symbol.clone();
        } else if !bundle.market.instrument.eq_ignore_ascii_case(&symbol) {
            warn!(
                expected = %symbol,
                found = %bundle.market.instrument,
                "Feed file holds a different instrument"
            );
        }
        debug!(source = %bundle.market.source, price = bundle.market.current_price, "Feed loaded");
        Ok(bundle)
    }
}
