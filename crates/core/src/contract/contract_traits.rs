//! Traits describing the contract collaborator.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use super::{ContractCall, ContractError, TransactionReceipt};

/// Handle for a submitted transaction.
#[async_trait]
pub trait PendingTransaction: Send {
    /// Hash assigned at submission.
    fn tx_hash(&self) -> B256;

    /// Waits until the transaction is mined.
    async fn confirmation(self: Box<Self>) -> Result<TransactionReceipt, ContractError>;
}

/// Read and write surface of the investment contract.
///
/// All amounts cross this boundary as 18-decimal base units.
#[async_trait]
pub trait InvestmentContractTrait: Send + Sync {
    /// Principal deposited by `investor`.
    async fn investments(&self, investor: Address) -> Result<U256, ContractError>;

    /// Pending rewards of `investor` on the basic investment.
    async fn rewards(&self, investor: Address) -> Result<U256, ContractError>;

    /// Principal deposited by `investor` into yield farming.
    async fn yield_farming_balances(&self, investor: Address) -> Result<U256, ContractError>;

    /// Pending yield farming rewards of `investor`.
    ///
    /// Not every deployment exposes this figure; the default reports it as
    /// unavailable.
    async fn yield_farming_rewards(&self, _investor: Address) -> Result<Option<U256>, ContractError> {
        Ok(None)
    }

    async fn total_invested(&self) -> Result<U256, ContractError>;

    async fn total_yield_farming(&self) -> Result<U256, ContractError>;

    /// Raw investor list. May contain zero-address entries.
    async fn get_investors(&self) -> Result<Vec<Address>, ContractError>;

    /// Submits a state-changing call.
    async fn submit(&self, call: ContractCall) -> Result<Box<dyn PendingTransaction>, ContractError>;
}
