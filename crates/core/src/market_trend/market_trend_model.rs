//! Market trend domain models.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_APY_PCT, NEGATIVE_SENTIMENT_THRESHOLD, POSITIVE_SENTIMENT_THRESHOLD};

/// Classification of the simulated price change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Classifies a price change in percent.
    pub fn classify(price_change_pct: Decimal) -> Self {
        if price_change_pct > POSITIVE_SENTIMENT_THRESHOLD {
            Self::Positive
        } else if price_change_pct < NEGATIVE_SENTIMENT_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Share of the price change carried into the projected annual return.
    pub fn damping(&self) -> Decimal {
        match self {
            Self::Positive => Decimal::ONE,
            Self::Negative => dec!(0.5),
            Self::Neutral => Decimal::ONE / dec!(3),
        }
    }
}

/// Horizon of the projected return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "180d")]
    Days180,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Days30, Timeframe::Days90, Timeframe::Days180];

    pub fn days(&self) -> u32 {
        match self {
            Self::Days30 => 30,
            Self::Days90 => 90,
            Self::Days180 => 180,
        }
    }

    /// Fraction of a 360 day year the timeframe stands for.
    pub fn fraction(&self) -> Decimal {
        Decimal::from(self.days()) / dec!(360)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Days30 => "30d",
            Self::Days90 => "90d",
            Self::Days180 => "180d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a trend came from. Serialized with every trend so that logged or
/// persisted state never passes a simulation off as chain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendOrigin {
    Simulated,
    Oracle,
}

/// Market signal used to adjust displayed returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrend {
    pub price_change_pct: Decimal,
    pub sentiment: Sentiment,
    pub projected_annual_return_pct: Decimal,
    pub timeframe: Timeframe,
    pub source: TrendOrigin,
}

impl MarketTrend {
    /// Builds a simulated trend from a price change using the sentiment and
    /// damping rules.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use yieldfolio_core::market_trend::{MarketTrend, Sentiment, Timeframe};
    ///
    /// let trend = MarketTrend::derive(dec!(4.0), Timeframe::Days90);
    /// assert_eq!(trend.sentiment, Sentiment::Positive);
    /// assert_eq!(trend.projected_annual_return_pct, dec!(14));
    /// ```
    pub fn derive(price_change_pct: Decimal, timeframe: Timeframe) -> Self {
        let sentiment = Sentiment::classify(price_change_pct);
        let projected = (BASE_APY_PCT + price_change_pct * sentiment.damping())
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        Self {
            price_change_pct,
            sentiment,
            projected_annual_return_pct: projected,
            timeframe,
            source: TrendOrigin::Simulated,
        }
    }
}

impl Default for MarketTrend {
    /// Session-start trend: flat market, base APY, 30 day horizon.
    fn default() -> Self {
        Self::derive(Decimal::ZERO, Timeframe::Days30)
    }
}
