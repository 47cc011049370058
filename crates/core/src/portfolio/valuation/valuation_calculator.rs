use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::BASELINE_YIELD_RATE;
use crate::market_trend::MarketTrend;
use crate::portfolio::valuation::{PortfolioView, PrincipalSource, RawBalances};

/// Computes the displayed portfolio figures from on-chain balances and the
/// current market trend.
///
/// Pure and deterministic: identical inputs give identical outputs. No
/// rounding is applied here.
///
/// * `investment` is the principal (or the platform total when selected), plus
///   the yield farming principal when that position is present.
/// * `base_returns` is the 1% baseline on the investment, plus both pending
///   reward streams when a yield farming position is present.
/// * `market_adjusted_returns = base_returns * (1 + price_change_pct / 100)`.
/// * `total` adds the adjusted returns for a non-negative price change. For a
///   negative one only the adjusted baseline is subtracted; adjusted pending
///   rewards are still added since they are owed to the investor. Never
///   negative.
/// * `potential_return = investment * projected_annual_return_pct / 100 *
///   timeframe fraction`.
pub fn calculate_portfolio_view(
    balances: &RawBalances,
    trend: &MarketTrend,
    principal_source: &PrincipalSource,
) -> PortfolioView {
    let principal = match principal_source {
        PrincipalSource::Account => balances.principal,
        PrincipalSource::PlatformTotal(total) => *total,
    };

    let (investment, pending_rewards) = if balances.has_yield_farming() {
        (
            principal + balances.yield_farming_principal.unwrap_or_default(),
            balances.total_pending_rewards(),
        )
    } else {
        (principal, Decimal::ZERO)
    };
    let baseline = investment * BASELINE_YIELD_RATE;
    let base_returns = baseline + pending_rewards;

    let market_factor = market_factor(trend.price_change_pct);
    let market_adjusted_returns = base_returns * market_factor;

    let total = if trend.price_change_pct >= Decimal::ZERO {
        investment + market_adjusted_returns
    } else {
        investment - baseline * market_factor + pending_rewards * market_factor
    }
    .max(Decimal::ZERO);

    let potential_return = investment * (trend.projected_annual_return_pct / dec!(100))
        * trend.timeframe.fraction();

    PortfolioView {
        investment,
        base_returns,
        market_adjusted_returns,
        total,
        potential_return,
    }
}

/// `1 + price_change_pct / 100`
pub fn market_factor(price_change_pct: Decimal) -> Decimal {
    Decimal::ONE + price_change_pct / dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_trend::Timeframe;

    fn trend(pct: Decimal, timeframe: Timeframe) -> MarketTrend {
        MarketTrend::derive(pct, timeframe)
    }

    fn basic(principal: Decimal) -> RawBalances {
        RawBalances {
            principal,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_example() {
        let view = calculate_portfolio_view(
            &basic(dec!(4.43)),
            &trend(dec!(1.2), Timeframe::Days30),
            &PrincipalSource::Account,
        );
        assert_eq!(view.investment, dec!(4.43));
        assert_eq!(view.base_returns, dec!(0.0443));
        assert_eq!(market_factor(dec!(1.2)), dec!(1.012));
        assert_eq!(view.market_adjusted_returns, dec!(0.0448316));
        assert_eq!(view.total, dec!(4.4748316));
        assert_eq!(view.formatted().total, "4.4748");
    }

    #[test]
    fn test_negative_trend_subtracts_returns() {
        let view = calculate_portfolio_view(
            &basic(dec!(10)),
            &trend(dec!(-2.5), Timeframe::Days30),
            &PrincipalSource::Account,
        );
        assert_eq!(view.base_returns, dec!(0.1));
        assert_eq!(view.market_adjusted_returns, dec!(0.0975));
        assert_eq!(view.total, dec!(9.9025));
    }

    #[test]
    fn test_zero_trend_takes_addition_branch() {
        let view = calculate_portfolio_view(
            &basic(dec!(2)),
            &trend(Decimal::ZERO, Timeframe::Days30),
            &PrincipalSource::Account,
        );
        assert_eq!(view.total, dec!(2.02));
    }

    #[test]
    fn test_absent_balances_value_to_zero() {
        let view = calculate_portfolio_view(
            &RawBalances::default(),
            &MarketTrend::default(),
            &PrincipalSource::Account,
        );
        assert_eq!(view, PortfolioView::default());
    }

    #[test]
    fn test_potential_return_by_timeframe() {
        // projected return is 10% at a flat market
        let balances = basic(dec!(12));
        let at = |tf| {
            calculate_portfolio_view(&balances, &trend(Decimal::ZERO, tf), &PrincipalSource::Account)
                .potential_return
        };
        assert_eq!(at(Timeframe::Days90), dec!(0.3));
        assert_eq!(at(Timeframe::Days180), dec!(0.6));
        assert_eq!(at(Timeframe::Days30).round_dp(10), dec!(0.1));
    }

    #[test]
    fn test_platform_total_replaces_principal() {
        let view = calculate_portfolio_view(
            &basic(dec!(1)),
            &trend(dec!(5), Timeframe::Days30),
            &PrincipalSource::PlatformTotal(dec!(100)),
        );
        assert_eq!(view.investment, dec!(100));
        assert_eq!(view.base_returns, dec!(1));
        assert_eq!(view.market_adjusted_returns, dec!(1.05));
        assert_eq!(view.total, dec!(101.05));
    }

    #[test]
    fn test_yield_farming_combines_principal_and_rewards() {
        let balances = RawBalances {
            principal: dec!(2),
            pending_rewards: dec!(0.05),
            yield_farming_principal: Some(dec!(3)),
            pending_yield_farming_rewards: Some(dec!(0.1)),
        };
        let view = calculate_portfolio_view(
            &balances,
            &trend(dec!(10), Timeframe::Days30),
            &PrincipalSource::Account,
        );
        assert_eq!(view.investment, dec!(5));
        // 1% of 5 plus 0.15 pending
        assert_eq!(view.base_returns, dec!(0.2));
        assert_eq!(view.market_adjusted_returns, dec!(0.22));
        assert_eq!(view.total, dec!(5.22));
    }

    #[test]
    fn test_negative_trend_keeps_pending_rewards_in_total() {
        let balances = RawBalances {
            principal: dec!(0.5),
            pending_rewards: dec!(1),
            yield_farming_principal: Some(dec!(0.1)),
            pending_yield_farming_rewards: Some(Decimal::ZERO),
        };
        let view = calculate_portfolio_view(
            &balances,
            &trend(dec!(-2), Timeframe::Days30),
            &PrincipalSource::Account,
        );
        assert_eq!(view.investment, dec!(0.6));
        assert_eq!(view.base_returns, dec!(1.006));
        assert_eq!(view.market_adjusted_returns, dec!(0.98588));
        // 0.6 - 0.006 * 0.98 + 1 * 0.98
        assert_eq!(view.total, dec!(1.57412));
        assert!(view.total > view.investment);
    }

    #[test]
    fn test_total_is_never_negative_under_a_collapsing_market() {
        let balances = RawBalances {
            principal: dec!(1),
            pending_rewards: dec!(50),
            yield_farming_principal: Some(dec!(1)),
            pending_yield_farming_rewards: Some(dec!(50)),
        };
        let collapse = MarketTrend {
            price_change_pct: dec!(-250),
            ..MarketTrend::default()
        };
        let view = calculate_portfolio_view(&balances, &collapse, &PrincipalSource::Account);
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[test]
    fn test_empty_yield_farming_position_matches_basic_flow() {
        let with_empty_position = RawBalances {
            principal: dec!(7),
            yield_farming_principal: Some(Decimal::ZERO),
            pending_yield_farming_rewards: Some(Decimal::ZERO),
            ..Default::default()
        };
        let t = trend(dec!(3.3), Timeframe::Days90);
        assert_eq!(
            calculate_portfolio_view(&with_empty_position, &t, &PrincipalSource::Account),
            calculate_portfolio_view(&basic(dec!(7)), &t, &PrincipalSource::Account)
        );
    }

    #[test]
    fn test_recalculation_is_idempotent() {
        let balances = basic(dec!(4.43));
        let t = trend(dec!(-3.7), Timeframe::Days180);
        let first = calculate_portfolio_view(&balances, &t, &PrincipalSource::Account);
        let second = calculate_portfolio_view(&balances, &t, &PrincipalSource::Account);
        assert_eq!(first, second);
    }
}
