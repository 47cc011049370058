//! Account domain models.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Wallet context the dashboard operates in. Read-only for the core; it only
/// changes through wallet responses and wallet events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub connected: bool,
}

impl Account {
    /// Applies a wallet event, returning the updated account.
    pub fn with_event(&self, event: &WalletEvent) -> Self {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let address = accounts.first().copied();
                Self {
                    address,
                    chain_id: self.chain_id,
                    connected: address.is_some(),
                }
            }
            WalletEvent::ChainChanged(chain_id) => Self {
                chain_id: Some(*chain_id),
                ..self.clone()
            },
        }
    }
}

/// Change notifications pushed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum WalletEvent {
    /// The exposed account list changed; empty means disconnected.
    AccountsChanged(Vec<Address>),
    /// The wallet switched networks.
    ChainChanged(u64),
}
