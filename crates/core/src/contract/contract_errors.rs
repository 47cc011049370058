//! Errors returned by the contract and wallet collaborators.

use alloy_primitives::B256;
use thiserror::Error;

/// Errors that can occur while talking to the contract or wallet.
///
/// The core maps these onto its own taxonomy: rejections and reverts become
/// `TransactionRejected`, everything else during a write becomes
/// `NetworkError`, and any failure during a read becomes `ReadFailure`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The wallet or node declined the request (user cancellation, execution
    /// error reported before inclusion).
    #[error("Request rejected: {message}")]
    Rejected {
        /// JSON-RPC / EIP-1193 error code when available
        code: Option<i64>,
        message: String,
    },

    /// The transaction was mined but reverted.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    /// The node could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Waiting for a confirmation took longer than allowed.
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    /// The node answered with data that could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The collaborator does not implement the requested method.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl ContractError {
    /// Returns true when the failure came from the wallet or the chain
    /// declining the transaction rather than from connectivity.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Reverted { .. })
    }
}
