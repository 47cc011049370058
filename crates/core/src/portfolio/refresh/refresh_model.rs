//! Models for on-chain state and the combined portfolio snapshot.

use std::time::Duration;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REFRESH_DELAY;
use crate::market_trend::MarketTrend;
use crate::portfolio::allocation::PortfolioAllocation;
use crate::portfolio::valuation::{FormattedPortfolioView, PortfolioView, RawBalances};

/// Platform-wide figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_invested: Decimal,
    pub total_yield_farming: Decimal,
    /// Investor list with zero-address entries removed
    pub investors: Vec<Address>,
}

/// Everything read from the contract in one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainState {
    /// Investor the balances belong to; `None` when no wallet is connected
    pub investor: Option<Address>,
    pub balances: RawBalances,
    pub stats: PlatformStats,
    pub fetched_at: DateTime<Utc>,
}

/// Which figure the valuation treats as principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalBasis {
    /// The connected investor's principal
    #[default]
    Account,
    /// The platform's `totalInvested()`
    PlatformTotal,
}

/// What the dashboard renders. On-chain data and the simulated trend are kept
/// in separate, explicitly named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// `None` until the first successful refresh
    pub on_chain: Option<OnChainState>,
    pub simulated_market_trend: MarketTrend,
    pub principal_basis: PrincipalBasis,
    pub view: PortfolioView,
    pub formatted: FormattedPortfolioView,
    pub allocation: PortfolioAllocation,
}

/// Refresh protocol settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Wait after a confirmation before reading, to absorb node read-after-write lag
    pub delay: Duration,
    pub principal_basis: PrincipalBasis,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_REFRESH_DELAY,
            principal_basis: PrincipalBasis::Account,
        }
    }
}
