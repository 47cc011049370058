//! Transaction lifecycle models.

use std::time::Duration;

use alloy_primitives::{B256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONFIRMED_DISPLAY_WINDOW;
use crate::contract::{ContractCall, TransactionReceipt};
use crate::errors::ErrorKind;

/// State-changing operations offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Invest,
    Withdraw,
    DepositYieldFarming,
    WithdrawYieldFarming,
    ClaimYield,
}

impl TransactionKind {
    /// Payable operations carry a user-entered amount.
    pub fn requires_amount(&self) -> bool {
        matches!(self, Self::Invest | Self::DepositYieldFarming)
    }

    /// Builds the contract call. `value` is ignored by non-payable kinds.
    pub fn to_call(&self, value: U256) -> ContractCall {
        match self {
            Self::Invest => ContractCall::Invest { value },
            Self::Withdraw => ContractCall::Withdraw,
            Self::DepositYieldFarming => ContractCall::DepositYieldFarming { value },
            Self::WithdrawYieldFarming => ContractCall::WithdrawYieldFarming,
            Self::ClaimYield => ContractCall::ClaimYield,
        }
    }
}

/// What the user asked for. The amount is kept as entered until validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    #[serde(default)]
    pub amount: Option<String>,
}

impl TransactionRequest {
    pub fn new(kind: TransactionKind, amount: Option<String>) -> Self {
        Self { kind, amount }
    }

    pub fn invest(amount: impl Into<String>) -> Self {
        Self::new(TransactionKind::Invest, Some(amount.into()))
    }

    pub fn withdraw() -> Self {
        Self::new(TransactionKind::Withdraw, None)
    }

    pub fn deposit_yield_farming(amount: impl Into<String>) -> Self {
        Self::new(TransactionKind::DepositYieldFarming, Some(amount.into()))
    }

    pub fn withdraw_yield_farming() -> Self {
        Self::new(TransactionKind::WithdrawYieldFarming, None)
    }

    pub fn claim_yield() -> Self {
        Self::new(TransactionKind::ClaimYield, None)
    }
}

/// Lifecycle of the single transaction a tracker may have in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransactionState {
    #[default]
    Idle,
    Preparing {
        kind: TransactionKind,
    },
    Submitted {
        kind: TransactionKind,
        /// Known once the wallet accepted the transaction
        tx_hash: Option<B256>,
    },
    Confirmed {
        kind: TransactionKind,
        tx_hash: B256,
        block_number: Option<u64>,
    },
    Failed {
        kind: TransactionKind,
        error: ErrorKind,
        message: String,
    },
}

impl TransactionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Preparing or Submitted.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Preparing { .. } | Self::Submitted { .. })
    }

    /// Confirmed or Failed, waiting to be observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. })
    }
}

/// Result of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub kind: TransactionKind,
    /// Amount submitted, in display units, for payable kinds
    pub amount: Option<Decimal>,
    pub receipt: TransactionReceipt,
}

/// Tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How long Confirmed stays visible before the tracker returns to Idle.
    pub confirmed_display_window: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            confirmed_display_window: DEFAULT_CONFIRMED_DISPLAY_WINDOW,
        }
    }
}
