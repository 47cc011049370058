use log::warn;
use serde::{Deserialize, Serialize};

use super::WalletProviderTrait;
use crate::errors::{Error, Result};

/// Gates write calls on the wallet being connected to the expected chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGuard {
    pub expected_chain_id: u64,
}

impl NetworkGuard {
    pub fn new(expected_chain_id: u64) -> Self {
        Self { expected_chain_id }
    }

    pub fn check(&self, chain_id: u64) -> Result<()> {
        if chain_id == self.expected_chain_id {
            Ok(())
        } else {
            warn!(
                "Wallet is on chain {} but the dashboard expects chain {}",
                chain_id, self.expected_chain_id
            );
            Err(Error::NetworkError(format!(
                "wrong network: expected chain {}, wallet is on chain {}",
                self.expected_chain_id, chain_id
            )))
        }
    }

    /// Asks the wallet for its chain and compares it to the expected one.
    pub async fn verify(&self, wallet: &dyn WalletProviderTrait) -> Result<()> {
        let chain_id = wallet
            .chain_id()
            .await
            .map_err(|e| Error::NetworkError(e.to_string()))?;
        self.check(chain_id)
    }
}
