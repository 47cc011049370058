//! Background tasks for the web server.
//!
//! The simulated market trend is replaced on a fixed interval, and wallet
//! account or chain switches are discovered by polling the node.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use yieldfolio_chain::RpcWallet;
use yieldfolio_core::market_trend::start_market_trend_ticker;
use yieldfolio_core::transactions::RefreshTrigger;

use crate::events::{ServerEvent, ACCOUNT_CHANGED};
use crate::main_lib::AppState;

/// Starts the trend ticker, the account listener and the account change
/// forwarder.
pub fn start_background_tasks(state: Arc<AppState>, trend_interval: Duration) {
    start_market_trend_ticker(state.portfolio.clone(), trend_interval);
    state.accounts.start_listening();
    start_account_change_forwarder(state);
}

/// Publishes wallet switches to clients and re-reads the portfolio for the
/// new account.
fn start_account_change_forwarder(state: Arc<AppState>) {
    let mut events = state.accounts.wallet().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    info!("Wallet switched: {:?}", event);
                    match serde_json::to_value(&event) {
                        Ok(payload) => state
                            .event_bus
                            .publish(ServerEvent::with_payload(ACCOUNT_CHANGED, payload)),
                        Err(e) => warn!("Failed to serialize wallet event: {}", e),
                    }
                    state.portfolio.schedule_refresh();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Account change forwarder lagged, {} event(s) skipped", skipped);
                    state.portfolio.schedule_refresh();
                }
                Err(RecvError::Closed) => return,
            }
        }
    });
}

/// Polls the node for account and chain changes every `period`.
pub fn start_wallet_poller(wallet: Arc<RpcWallet>, period: Duration) {
    tokio::spawn(async move {
        info!("Wallet poller started ({:?} interval)", period);
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticks.tick().await;
            match wallet.poll_changes().await {
                Ok(changes) if !changes.is_empty() => {
                    debug!("Wallet poll found {} change(s)", changes.len())
                }
                Ok(_) => {}
                Err(e) => warn!("Wallet poll failed: {}", e),
            }
        }
    });
}
