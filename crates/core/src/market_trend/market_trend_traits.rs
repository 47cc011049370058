use async_trait::async_trait;

use super::MarketTrend;
use crate::errors::Result;

/// Source of market trends.
///
/// The dashboard ships with [`SimulatedMarketFeed`](super::SimulatedMarketFeed);
/// a price oracle can implement the same trait without touching valuation.
#[async_trait]
pub trait MarketTrendSource: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &'static str;

    /// Produces the next trend. Each call returns a complete replacement.
    async fn next_trend(&self) -> Result<MarketTrend>;
}
