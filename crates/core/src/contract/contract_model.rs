//! Contract interaction models.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// A state-changing contract call with its value captured in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ContractCall {
    Invest { value: U256 },
    Withdraw,
    DepositYieldFarming { value: U256 },
    WithdrawYieldFarming,
    ClaimYield,
}

impl ContractCall {
    /// Contract method name as it appears in the ABI.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Invest { .. } => "invest",
            Self::Withdraw => "withdraw",
            Self::DepositYieldFarming { .. } => "depositYieldFarming",
            Self::WithdrawYieldFarming => "withdrawYieldFarming",
            Self::ClaimYield => "claimYield",
        }
    }

    /// Native value attached to the call.
    pub fn value(&self) -> U256 {
        match self {
            Self::Invest { value } | Self::DepositYieldFarming { value } => *value,
            _ => U256::ZERO,
        }
    }
}

/// Confirmation data for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}
