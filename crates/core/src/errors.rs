//! Core error types for the Yieldfolio dashboard.
//!
//! The taxonomy mirrors what the dashboard shows to the user: local validation
//! problems stay inline next to the form, while wallet, network and refresh
//! failures are surfaced as notifications. None of them are fatal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::ContractError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the dashboard core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The amount could not be parsed, was not positive, or does not fit the
    /// 18-decimal fixed point representation. Never reaches the network.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The tracker already has a transaction that has not returned to idle.
    #[error("A transaction is already in progress")]
    TransactionInProgress,

    /// The wallet or node declined the transaction.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// The node is unreachable, timed out, or the wallet is on the wrong chain.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Balance or platform statistics could not be read.
    #[error("Failed to read on-chain state: {0}")]
    ReadFailure(String),
}

/// Where an error should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSurface {
    /// Shown next to the input that caused it; no notification is emitted.
    Inline,
    /// Surfaced to the user as a notification.
    Notify,
}

/// Stable, serializable discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAmount,
    TransactionInProgress,
    TransactionRejected,
    NetworkError,
    ReadFailure,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Self::TransactionInProgress => ErrorKind::TransactionInProgress,
            Self::TransactionRejected(_) => ErrorKind::TransactionRejected,
            Self::NetworkError(_) => ErrorKind::NetworkError,
            Self::ReadFailure(_) => ErrorKind::ReadFailure,
        }
    }

    /// Returns how the error is presented to the user.
    ///
    /// ```
    /// use yieldfolio_core::errors::{Error, ErrorSurface};
    ///
    /// assert_eq!(Error::TransactionInProgress.surface(), ErrorSurface::Inline);
    /// assert_eq!(
    ///     Error::NetworkError("timeout".to_string()).surface(),
    ///     ErrorSurface::Notify
    /// );
    /// ```
    pub fn surface(&self) -> ErrorSurface {
        match self {
            Self::InvalidAmount(_) | Self::TransactionInProgress => ErrorSurface::Inline,
            Self::TransactionRejected(_) | Self::NetworkError(_) | Self::ReadFailure(_) => {
                ErrorSurface::Notify
            }
        }
    }

    /// Converts a collaborator failure that happened while submitting or
    /// confirming a transaction.
    pub fn from_transaction_failure(err: ContractError) -> Self {
        if err.is_rejection() {
            Self::TransactionRejected(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }

    /// Converts a collaborator failure that happened while reading state.
    pub fn from_read_failure(err: ContractError) -> Self {
        Self::ReadFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_errors_are_inline() {
        assert_eq!(
            Error::InvalidAmount("abc".to_string()).surface(),
            ErrorSurface::Inline
        );
        assert_eq!(Error::TransactionInProgress.surface(), ErrorSurface::Inline);
    }

    #[test]
    fn test_remote_errors_are_notified() {
        assert_eq!(
            Error::TransactionRejected("user denied".to_string()).surface(),
            ErrorSurface::Notify
        );
        assert_eq!(
            Error::ReadFailure("timeout".to_string()).surface(),
            ErrorSurface::Notify
        );
    }

    #[test]
    fn test_transaction_failure_classification() {
        let rejected = Error::from_transaction_failure(ContractError::Rejected {
            code: Some(4001),
            message: "User denied transaction signature".to_string(),
        });
        assert_eq!(rejected.kind(), ErrorKind::TransactionRejected);

        let network = Error::from_transaction_failure(ContractError::Network(
            "connection refused".to_string(),
        ));
        assert_eq!(network.kind(), ErrorKind::NetworkError);
    }
}
