//! Periodic market trend updates.

use std::time::Duration;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::portfolio::PortfolioService;

/// Starts replacing the market trend every `period`.
///
/// The first update happens one period after start; the session begins with
/// the default trend. Failed updates keep the previous trend.
pub fn start_market_trend_ticker(service: PortfolioService, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Market trend ticker started ({:?} interval)", period);
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            if let Err(e) = service.update_market_trend().await {
                warn!("Scheduled market trend update failed: {}", e);
            }
        }
    })
}
