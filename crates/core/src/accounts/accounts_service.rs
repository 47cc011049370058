use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy_primitives::Address;
use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::{Account, WalletEvent, WalletProviderTrait};
use crate::errors::{Error, Result};

/// Holds the wallet account the dashboard is bound to.
///
/// The account is replaced atomically on every update and never partially
/// mutated.
#[derive(Clone)]
pub struct AccountService {
    wallet: Arc<dyn WalletProviderTrait>,
    account: Arc<RwLock<Account>>,
}

impl AccountService {
    pub fn new(wallet: Arc<dyn WalletProviderTrait>) -> Self {
        Self {
            wallet,
            account: Arc::new(RwLock::new(Account::default())),
        }
    }

    fn read_account(&self) -> RwLockReadGuard<'_, Account> {
        self.account.read().unwrap_or_else(|poisoned| {
            warn!("Account lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_account(&self) -> RwLockWriteGuard<'_, Account> {
        self.account.write().unwrap_or_else(|poisoned| {
            warn!("Account lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn wallet(&self) -> Arc<dyn WalletProviderTrait> {
        self.wallet.clone()
    }

    pub fn current(&self) -> Account {
        self.read_account().clone()
    }

    /// Address whose balances are displayed, if connected.
    pub fn investor(&self) -> Option<Address> {
        let account = self.read_account();
        if account.connected {
            account.address
        } else {
            None
        }
    }

    /// Requests wallet access and records the selected account and chain.
    pub async fn connect(&self) -> Result<Account> {
        let address = self
            .wallet
            .connect()
            .await
            .map_err(Error::from_transaction_failure)?;
        let chain_id = self
            .wallet
            .chain_id()
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;

        let account = Account {
            address: Some(address),
            chain_id: Some(chain_id),
            connected: true,
        };
        *self.write_account() = account.clone();
        info!("Wallet connected: {} on chain {}", address, chain_id);
        Ok(account)
    }

    /// Applies a wallet event and returns the new account.
    pub fn apply_event(&self, event: &WalletEvent) -> Account {
        let mut guard = self.write_account();
        let updated = guard.with_event(event);
        debug!("Wallet event {:?} applied", event);
        *guard = updated.clone();
        updated
    }

    /// Re-reads accounts and chain from the wallet after missed events.
    async fn resync(&self) {
        match self.wallet.accounts().await {
            Ok(accounts) => {
                self.apply_event(&WalletEvent::AccountsChanged(accounts));
            }
            Err(e) => warn!("Failed to re-read wallet accounts: {}", e),
        }
        match self.wallet.chain_id().await {
            Ok(chain_id) => {
                self.apply_event(&WalletEvent::ChainChanged(chain_id));
            }
            Err(e) => warn!("Failed to re-read wallet chain: {}", e),
        }
    }

    /// Follows the wallet's event stream until it closes.
    pub fn start_listening(&self) -> JoinHandle<()> {
        let service = self.clone();
        let mut events = self.wallet.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        service.apply_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Wallet event listener lagged, {} event(s) skipped", skipped);
                        service.resync().await;
                    }
                    Err(RecvError::Closed) => {
                        debug!("Wallet event stream closed");
                        return;
                    }
                }
            }
        })
    }
}
