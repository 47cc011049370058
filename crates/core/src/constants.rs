use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fractional digits of the contract's fixed-point amounts
pub const BASE_UNIT_DECIMALS: u32 = 18;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 4;

/// Decimal precision for percentages shown in the allocation breakdown
pub const PERCENT_DECIMAL_PRECISION: u32 = 2;

/// Baseline yield assumed on the principal, independent of the market trend
pub const BASELINE_YIELD_RATE: Decimal = dec!(0.01);

/// Base APY the projected annual return is derived from (percent)
pub const BASE_APY_PCT: Decimal = dec!(10);

/// Advertised APY of the yield farming pool (percent)
pub const YIELD_FARMING_APY_PCT: Decimal = dec!(18);

/// Simulated price change bounds, in tenths of a percent
pub const PRICE_CHANGE_MIN_TENTHS: i64 = -50;
pub const PRICE_CHANGE_MAX_TENTHS: i64 = 150;

/// Price change above which the sentiment is positive (percent)
pub const POSITIVE_SENTIMENT_THRESHOLD: Decimal = dec!(2);

/// Price change below which the sentiment is negative (percent)
pub const NEGATIVE_SENTIMENT_THRESHOLD: Decimal = dec!(-1);

/// Delay before re-reading state after a confirmed transaction
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// How long a confirmed transaction stays visible before the tracker resets
pub const DEFAULT_CONFIRMED_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

/// Interval of the simulated market trend ticker
pub const DEFAULT_TREND_INTERVAL: Duration = Duration::from_secs(30);

/// Chain id of a local development node
pub const DEFAULT_CHAIN_ID: u64 = 31337;
