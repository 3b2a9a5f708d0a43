use crate::domain::error::DomainError;
use crate::domain::ports::market_feed::MarketFeed;
use crate::domain::values::market::{FeedBundle, MarketSnapshot};
use async_trait::async_trait;

/// Feed with no data behind it: every snapshot is marked `stub`.
pub struct StubFeed;

#[async_trait]
impl MarketFeed for StubFeed {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, instrument: &str) -> Result<FeedBundle, DomainError> {
        Ok(FeedBundle {
            market: MarketSnapshot::stub(instrument),
            ..FeedBundle::default()
        })
    }
}
