use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::values::market::FeedBundle;

/// Best-effort data provider. Implementations should return stub-marked
/// snapshots for the parts they could not fetch; an `Err` means nothing at
/// all was available.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, instrument: &str) -> Result<FeedBundle, DomainError>;
}
