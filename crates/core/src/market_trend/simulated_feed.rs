//! Random market trend generator.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::{MarketTrend, MarketTrendSource, Timeframe};
use crate::constants::{PRICE_CHANGE_MAX_TENTHS, PRICE_CHANGE_MIN_TENTHS};
use crate::errors::Result;

/// How the generated trend picks its timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeframePolicy {
    /// Always the given timeframe (periodic updates).
    Fixed(Timeframe),
    /// Uniformly one of 30d, 90d, 180d (on-demand updates).
    Random,
}

/// Simulated feed drawing the price change uniformly from [-5.0, +15.0]
/// with one decimal.
pub struct SimulatedMarketFeed {
    rng: Mutex<StdRng>,
    timeframe_policy: TimeframePolicy,
}

impl SimulatedMarketFeed {
    pub fn new(timeframe_policy: TimeframePolicy) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            timeframe_policy,
        }
    }

    /// Deterministic feed for tests and demos.
    pub fn with_seed(seed: u64, timeframe_policy: TimeframePolicy) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            timeframe_policy,
        }
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Market feed RNG mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Draws a new trend.
    pub fn generate(&self) -> MarketTrend {
        let mut rng = self.lock_rng();
        let tenths = rng.gen_range(PRICE_CHANGE_MIN_TENTHS..=PRICE_CHANGE_MAX_TENTHS);
        let timeframe = match self.timeframe_policy {
            TimeframePolicy::Fixed(timeframe) => timeframe,
            TimeframePolicy::Random => Timeframe::ALL[rng.gen_range(0..Timeframe::ALL.len())],
        };
        MarketTrend::derive(Decimal::new(tenths, 1), timeframe)
    }
}

#[async_trait]
impl MarketTrendSource for SimulatedMarketFeed {
    fn id(&self) -> &'static str {
        "SIMULATED"
    }

    async fn next_trend(&self) -> Result<MarketTrend> {
        let trend = self.generate();
        debug!(
            "Simulated market trend: {}% ({:?}, {} projected, {})",
            trend.price_change_pct,
            trend.sentiment,
            trend.projected_annual_return_pct,
            trend.timeframe
        );
        Ok(trend)
    }
}
