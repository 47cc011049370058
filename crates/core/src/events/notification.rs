//! Notification types.

use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;
use crate::market_trend::MarketTrend;
use crate::transactions::TransactionKind;

/// Severity used by the UI to style the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Facts the user is told about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A transaction was handed to the wallet and has a hash.
    TransactionSubmitted { kind: TransactionKind, tx_hash: B256 },

    /// A transaction was mined successfully. A refresh has been scheduled.
    TransactionConfirmed {
        kind: TransactionKind,
        tx_hash: B256,
        block_number: Option<u64>,
    },

    /// A transaction was rejected or could not reach the chain.
    TransactionFailed {
        kind: TransactionKind,
        error: ErrorKind,
        message: String,
    },

    /// On-chain state was re-read and the portfolio recomputed.
    PortfolioRefreshed { fetched_at: DateTime<Utc> },

    /// Re-reading on-chain state failed; the previous figures stay visible.
    RefreshFailed { message: String },

    /// The simulated market trend was replaced.
    MarketTrendUpdated { trend: MarketTrend },
}

impl Notification {
    pub fn level(&self) -> NotificationLevel {
        match self {
            Self::TransactionSubmitted { .. } | Self::MarketTrendUpdated { .. } => {
                NotificationLevel::Info
            }
            Self::TransactionConfirmed { .. } | Self::PortfolioRefreshed { .. } => {
                NotificationLevel::Success
            }
            Self::RefreshFailed { .. } => NotificationLevel::Warning,
            Self::TransactionFailed { .. } => NotificationLevel::Error,
        }
    }

    /// Event name used by streaming adapters.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransactionSubmitted { .. } => "transaction:submitted",
            Self::TransactionConfirmed { .. } => "transaction:confirmed",
            Self::TransactionFailed { .. } => "transaction:failed",
            Self::PortfolioRefreshed { .. } => "portfolio:refreshed",
            Self::RefreshFailed { .. } => "portfolio:refresh-failed",
            Self::MarketTrendUpdated { .. } => "market:trend-updated",
        }
    }
}
