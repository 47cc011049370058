use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::{AllocationKind, AllocationSegment, PortfolioAllocation};
use crate::constants::{BASE_APY_PCT, PERCENT_DECIMAL_PRECISION, YIELD_FARMING_APY_PCT};
use crate::portfolio::valuation::RawBalances;

/// Splits the on-chain position into basic investment, yield farming and
/// pending rewards. A zero portfolio reports 0% for every segment.
pub fn calculate_allocation(balances: &RawBalances) -> PortfolioAllocation {
    let basic = balances.principal;
    let yield_farming = balances.yield_farming_principal.unwrap_or_default();
    let rewards = balances.total_pending_rewards();
    let total_value = basic + yield_farming + rewards;

    let percentage = |amount: Decimal| {
        if total_value.is_zero() {
            Decimal::ZERO
        } else {
            (amount / total_value * dec!(100))
                .round_dp_with_strategy(PERCENT_DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero)
        }
    };

    let segments = vec![
        AllocationSegment {
            kind: AllocationKind::BasicInvestment,
            amount: basic,
            percentage: percentage(basic),
            apy_pct: Some(BASE_APY_PCT),
        },
        AllocationSegment {
            kind: AllocationKind::YieldFarming,
            amount: yield_farming,
            percentage: percentage(yield_farming),
            apy_pct: Some(YIELD_FARMING_APY_PCT),
        },
        AllocationSegment {
            kind: AllocationKind::PendingRewards,
            amount: rewards,
            percentage: percentage(rewards),
            apy_pct: None,
        },
    ];

    PortfolioAllocation {
        total_value,
        segments,
    }
}
