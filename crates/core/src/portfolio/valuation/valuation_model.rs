//! Portfolio valuation domain models.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::Result;
use crate::units::{format_amount, to_display};

/// Balances read from the contract for one investor, in display units.
///
/// Yield farming fields are `None` when the investor has no yield farming
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalances {
    pub principal: Decimal,
    pub pending_rewards: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub yield_farming_principal: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pending_yield_farming_rewards: Option<Decimal>,
}

impl RawBalances {
    /// Converts contract values at the boundary.
    pub fn from_base_units(
        principal: U256,
        pending_rewards: U256,
        yield_farming_principal: Option<U256>,
        pending_yield_farming_rewards: Option<U256>,
    ) -> Result<Self> {
        Ok(Self {
            principal: to_display(principal)?,
            pending_rewards: to_display(pending_rewards)?,
            yield_farming_principal: yield_farming_principal.map(to_display).transpose()?,
            pending_yield_farming_rewards: pending_yield_farming_rewards
                .map(to_display)
                .transpose()?,
        })
    }

    /// True when a yield farming position is present.
    pub fn has_yield_farming(&self) -> bool {
        self.yield_farming_principal.is_some() || self.pending_yield_farming_rewards.is_some()
    }

    /// Pending rewards across both streams.
    pub fn total_pending_rewards(&self) -> Decimal {
        self.pending_rewards + self.pending_yield_farming_rewards.unwrap_or_default()
    }
}

/// Which figure stands in for the principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "camelCase")]
pub enum PrincipalSource {
    /// The connected investor's own principal.
    #[default]
    Account,
    /// A platform-wide figure, such as `totalInvested()`.
    PlatformTotal(Decimal),
}

/// Derived portfolio figures. Never stored authoritatively; recomputed every
/// time the balances or the trend change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub investment: Decimal,
    pub base_returns: Decimal,
    pub market_adjusted_returns: Decimal,
    pub total: Decimal,
    pub potential_return: Decimal,
}

impl PortfolioView {
    /// Display strings rounded to four decimals.
    pub fn formatted(&self) -> FormattedPortfolioView {
        let fmt = |v: Decimal| format_amount(v, DISPLAY_DECIMAL_PRECISION);
        FormattedPortfolioView {
            investment: fmt(self.investment),
            base_returns: fmt(self.base_returns),
            market_adjusted_returns: fmt(self.market_adjusted_returns),
            total: fmt(self.total),
            potential_return: fmt(self.potential_return),
        }
    }
}

/// [`PortfolioView`] rounded for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPortfolioView {
    pub investment: String,
    pub base_returns: String,
    pub market_adjusted_returns: String,
    pub total: String,
    pub potential_return: String,
}
