//! Reads on-chain state, combines it with the market trend and publishes the
//! resulting portfolio snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy_primitives::{Address, U256};
use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::{OnChainState, PlatformStats, PortfolioSnapshot, PrincipalBasis, RefreshConfig};
use crate::accounts::AccountService;
use crate::contract::{filter_investors, ContractError, InvestmentContractTrait};
use crate::errors::{Error, Result};
use crate::events::{Notification, NotificationSink};
use crate::market_trend::{MarketTrend, MarketTrendSource};
use crate::portfolio::allocation::calculate_allocation;
use crate::portfolio::valuation::{
    calculate_portfolio_view, PortfolioView, PrincipalSource, RawBalances,
};
use crate::transactions::RefreshTrigger;
use crate::units::to_display;

#[derive(Debug, Default)]
struct PortfolioState {
    trend: MarketTrend,
    on_chain: Option<OnChainState>,
    principal_basis: PrincipalBasis,
    view: PortfolioView,
    /// Sequence number of the refresh that produced `on_chain`
    applied_seq: u64,
}

impl PortfolioState {
    fn recompute(&mut self) {
        let balances = self
            .on_chain
            .as_ref()
            .map(|s| s.balances.clone())
            .unwrap_or_default();
        let source = match self.principal_basis {
            PrincipalBasis::Account => PrincipalSource::Account,
            PrincipalBasis::PlatformTotal => PrincipalSource::PlatformTotal(
                self.on_chain
                    .as_ref()
                    .map(|s| s.stats.total_invested)
                    .unwrap_or_default(),
            ),
        };
        self.view = calculate_portfolio_view(&balances, &self.trend, &source);
    }

    fn snapshot(&self) -> PortfolioSnapshot {
        let balances = self
            .on_chain
            .as_ref()
            .map(|s| s.balances.clone())
            .unwrap_or_default();
        PortfolioSnapshot {
            on_chain: self.on_chain.clone(),
            simulated_market_trend: self.trend.clone(),
            principal_basis: self.principal_basis,
            view: self.view.clone(),
            formatted: self.view.formatted(),
            allocation: calculate_allocation(&balances),
        }
    }
}

/// Owns the dashboard's view of the portfolio.
///
/// Every update (refresh, trend change, principal basis change) replaces the
/// whole state under one write lock, so readers never see balances from one
/// refresh mixed with figures derived from another.
#[derive(Clone)]
pub struct PortfolioService {
    contract: Arc<dyn InvestmentContractTrait>,
    accounts: AccountService,
    trend_source: Arc<dyn MarketTrendSource>,
    sink: Arc<dyn NotificationSink>,
    config: RefreshConfig,
    state: Arc<RwLock<PortfolioState>>,
    next_seq: Arc<AtomicU64>,
}

impl PortfolioService {
    pub fn new(
        contract: Arc<dyn InvestmentContractTrait>,
        accounts: AccountService,
        trend_source: Arc<dyn MarketTrendSource>,
        sink: Arc<dyn NotificationSink>,
        config: RefreshConfig,
    ) -> Self {
        let mut state = PortfolioState {
            principal_basis: config.principal_basis,
            ..PortfolioState::default()
        };
        state.recompute();
        Self {
            contract,
            accounts,
            trend_source,
            sink,
            config,
            state: Arc::new(RwLock::new(state)),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PortfolioState> {
        self.state.read().unwrap_or_else(|poisoned| {
            warn!("Portfolio state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PortfolioState> {
        self.state.write().unwrap_or_else(|poisoned| {
            warn!("Portfolio state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        self.read_state().snapshot()
    }

    pub fn current_view(&self) -> PortfolioView {
        self.read_state().view.clone()
    }

    pub fn current_trend(&self) -> MarketTrend {
        self.read_state().trend.clone()
    }

    /// Platform figures from the last successful refresh.
    pub fn platform_stats(&self) -> Option<PlatformStats> {
        self.read_state().on_chain.as_ref().map(|s| s.stats.clone())
    }

    /// Investor list from the last successful refresh, zero addresses removed.
    pub fn investors(&self) -> Vec<Address> {
        self.platform_stats()
            .map(|s| s.investors)
            .unwrap_or_default()
    }

    /// Switches the principal figure and recomputes from cached balances.
    pub fn set_principal_basis(&self, basis: PrincipalBasis) -> PortfolioSnapshot {
        let mut state = self.write_state();
        state.principal_basis = basis;
        state.recompute();
        debug!("Principal basis set to {:?}", basis);
        state.snapshot()
    }

    /// Reads balances and platform statistics and replaces the cached state.
    ///
    /// Without a connected account only platform statistics are read and the
    /// balances are zero. On failure the previous state is kept, a single
    /// `RefreshFailed` notification is emitted and no retry is attempted.
    pub async fn refresh(&self) -> Result<PortfolioSnapshot> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let investor = self.accounts.investor();
        debug!("Refreshing portfolio (#{}, investor {:?})", seq, investor);

        let on_chain = match self.read_on_chain(investor).await {
            Ok(on_chain) => on_chain,
            Err(e) => {
                warn!("Portfolio refresh #{} failed: {}", seq, e);
                self.sink.notify(Notification::RefreshFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let fetched_at = on_chain.fetched_at;
        let snapshot = {
            let mut state = self.write_state();
            if seq < state.applied_seq {
                debug!(
                    "Discarding refresh #{}; #{} is already applied",
                    seq, state.applied_seq
                );
                return Ok(state.snapshot());
            }
            state.applied_seq = seq;
            state.on_chain = Some(on_chain);
            state.recompute();
            state.snapshot()
        };

        self.sink
            .notify(Notification::PortfolioRefreshed { fetched_at });
        Ok(snapshot)
    }

    /// Replaces the market trend and recomputes from cached balances.
    ///
    /// Never reads the contract. A failing trend source keeps the previous
    /// trend.
    pub async fn update_market_trend(&self) -> Result<MarketTrend> {
        let trend = self.trend_source.next_trend().await?;
        {
            let mut state = self.write_state();
            state.trend = trend.clone();
            state.recompute();
        }
        info!(
            "{} market trend: {}% ({:?}, {})",
            self.trend_source.id(),
            trend.price_change_pct,
            trend.sentiment,
            trend.timeframe
        );
        self.sink.notify(Notification::MarketTrendUpdated {
            trend: trend.clone(),
        });
        Ok(trend)
    }

    async fn read_on_chain(&self, investor: Option<Address>) -> Result<OnChainState> {
        let contract = self.contract.as_ref();
        let stats_reads = async {
            tokio::try_join!(
                contract.total_invested(),
                contract.total_yield_farming(),
                contract.get_investors(),
            )
        };

        let (balances, (total_invested, total_yield_farming, investors)) = match investor {
            Some(investor) => {
                tokio::try_join!(self.read_balances(investor), stats_reads)
                    .map_err(Error::from_read_failure)?
            }
            None => (
                RawBalances::default(),
                stats_reads.await.map_err(Error::from_read_failure)?,
            ),
        };

        let stats = PlatformStats {
            total_invested: display_or_read_failure(total_invested)?,
            total_yield_farming: display_or_read_failure(total_yield_farming)?,
            investors: filter_investors(investors),
        };

        Ok(OnChainState {
            investor,
            balances,
            stats,
            fetched_at: Utc::now(),
        })
    }

    async fn read_balances(&self, investor: Address) -> std::result::Result<RawBalances, ContractError> {
        let contract = self.contract.as_ref();
        let (principal, rewards, yf_principal, yf_rewards) = tokio::try_join!(
            contract.investments(investor),
            contract.rewards(investor),
            contract.yield_farming_balances(investor),
            contract.yield_farming_rewards(investor),
        )?;

        let has_position =
            !yf_principal.is_zero() || yf_rewards.is_some_and(|r| !r.is_zero());
        let (yf_principal, yf_rewards) = if has_position {
            (Some(yf_principal), Some(yf_rewards.unwrap_or(U256::ZERO)))
        } else {
            (None, None)
        };

        RawBalances::from_base_units(principal, rewards, yf_principal, yf_rewards)
            .map_err(|e| ContractError::Decode(e.to_string()))
    }
}

fn display_or_read_failure(value: U256) -> Result<Decimal> {
    to_display(value).map_err(|e| Error::ReadFailure(e.to_string()))
}

impl RefreshTrigger for PortfolioService {
    /// Refreshes once after the configured delay. Failures are already
    /// reported through the notification sink.
    fn schedule_refresh(&self) {
        let service = self.clone();
        let delay = self.config.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = service.refresh().await {
                debug!("Scheduled refresh failed: {}", e);
            }
        });
    }
}
