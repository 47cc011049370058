//! Wallet collaborator traits.

use alloy_primitives::Address;
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::WalletEvent;
use crate::contract::ContractError;

/// Injected wallet capability. Replaces any ambient, page-level provider.
#[async_trait]
pub trait WalletProviderTrait: Send + Sync {
    /// Requests access to the wallet and returns the selected account.
    async fn connect(&self) -> Result<Address, ContractError>;

    /// Accounts currently exposed without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ContractError>;

    async fn chain_id(&self) -> Result<u64, ContractError>;

    /// Stream of account and chain changes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}
