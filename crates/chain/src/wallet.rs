//! Wallet backed by the node's managed accounts.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::Address;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::json;
use tokio::sync::broadcast;
use yieldfolio_core::accounts::{WalletEvent, WalletProviderTrait};
use yieldfolio_core::contract::ContractError;

use crate::rpc_client::{parse_quantity, JsonRpcClient, UNAUTHORIZED_CODE};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct Observed {
    /// Set once `connect` succeeded. Account changes are only reported from
    /// then on.
    connected: bool,
    accounts: Vec<Address>,
    chain_id: Option<u64>,
}

/// Wallet provider over `eth_requestAccounts` / `eth_accounts` / `eth_chainId`.
///
/// A plain node has no push channel, so account and chain changes are
/// discovered by [`poll_changes`](Self::poll_changes) and published to
/// subscribers.
pub struct RpcWallet {
    rpc: Arc<JsonRpcClient>,
    events: broadcast::Sender<WalletEvent>,
    observed: Mutex<Observed>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            rpc,
            events,
            observed: Mutex::new(Observed::default()),
        }
    }

    fn observed(&self) -> MutexGuard<'_, Observed> {
        self.observed.lock().unwrap_or_else(|poisoned| {
            warn!("Wallet state mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Account transactions are sent from, once connected.
    pub fn selected_account(&self) -> Option<Address> {
        let observed = self.observed();
        if observed.connected {
            observed.accounts.first().copied()
        } else {
            None
        }
    }

    /// Re-reads accounts and chain and publishes what changed since the last
    /// observation.
    pub async fn poll_changes(&self) -> Result<Vec<WalletEvent>, ContractError> {
        let accounts = self.accounts().await?;
        let chain_id = self.chain_id().await?;

        let mut changes = Vec::new();
        {
            let mut observed = self.observed();
            if observed.connected && observed.accounts != accounts {
                changes.push(WalletEvent::AccountsChanged(accounts.clone()));
            }
            if observed.chain_id.is_some_and(|known| known != chain_id) {
                changes.push(WalletEvent::ChainChanged(chain_id));
            }
            observed.accounts = accounts;
            observed.chain_id = Some(chain_id);
        }

        for event in &changes {
            info!("Wallet change detected: {:?}", event);
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
        Ok(changes)
    }
}

#[async_trait]
impl WalletProviderTrait for RpcWallet {
    async fn connect(&self) -> Result<Address, ContractError> {
        let accounts: Vec<Address> = match self
            .rpc
            .request("eth_requestAccounts", json!([]))
            .await
        {
            Ok(accounts) => accounts,
            Err(ContractError::NotSupported(_)) => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.accounts().await?
            }
            Err(e) => return Err(e),
        };

        let address = accounts.first().copied().ok_or_else(|| ContractError::Rejected {
            code: Some(UNAUTHORIZED_CODE),
            message: "the node exposes no accounts".to_string(),
        })?;

        let mut observed = self.observed();
        observed.connected = true;
        observed.accounts = accounts;
        Ok(address)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ContractError> {
        self.rpc.request("eth_accounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ContractError> {
        let raw: String = self.rpc.request("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
