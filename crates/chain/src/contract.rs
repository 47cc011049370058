//! Investment contract over JSON-RPC.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;
use yieldfolio_core::contract::{
    ContractCall, ContractError, InvestmentContractTrait, PendingTransaction, TransactionReceipt,
};

use crate::abi::{decode_address_array, decode_uint256, encode_address_call, encode_call};
use crate::rpc_client::{parse_quantity, JsonRpcClient, UNAUTHORIZED_CODE};
use crate::wallet::RpcWallet;

/// How confirmations are awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    block_number: Option<String>,
    /// `0x1` on success, `0x0` on revert
    status: Option<String>,
}

/// The deployed investment contract. Writes are sent from the wallet's
/// selected account.
pub struct RpcInvestmentContract {
    rpc: Arc<JsonRpcClient>,
    address: Address,
    wallet: Arc<RpcWallet>,
    polling: ReceiptPolling,
}

impl RpcInvestmentContract {
    pub fn new(
        rpc: Arc<JsonRpcClient>,
        address: Address,
        wallet: Arc<RpcWallet>,
        polling: ReceiptPolling,
    ) -> Self {
        Self {
            rpc,
            address,
            wallet,
            polling,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn call(&self, data: Bytes) -> Result<Bytes, ContractError> {
        self.rpc
            .request(
                "eth_call",
                json!([{ "to": self.address, "data": data }, "latest"]),
            )
            .await
    }

    async fn read_uint(&self, signature: &str) -> Result<U256, ContractError> {
        decode_uint256(&self.call(encode_call(signature)).await?)
    }

    async fn read_investor_uint(
        &self,
        signature: &str,
        investor: Address,
    ) -> Result<U256, ContractError> {
        decode_uint256(&self.call(encode_address_call(signature, investor)).await?)
    }
}

#[async_trait]
impl InvestmentContractTrait for RpcInvestmentContract {
    async fn investments(&self, investor: Address) -> Result<U256, ContractError> {
        self.read_investor_uint("investments(address)", investor).await
    }

    async fn rewards(&self, investor: Address) -> Result<U256, ContractError> {
        self.read_investor_uint("rewards(address)", investor).await
    }

    async fn yield_farming_balances(&self, investor: Address) -> Result<U256, ContractError> {
        self.read_investor_uint("yieldFarmingBalances(address)", investor)
            .await
    }

    async fn total_invested(&self) -> Result<U256, ContractError> {
        self.read_uint("totalInvested()").await
    }

    async fn total_yield_farming(&self) -> Result<U256, ContractError> {
        self.read_uint("totalYieldFarming()").await
    }

    async fn get_investors(&self) -> Result<Vec<Address>, ContractError> {
        decode_address_array(&self.call(encode_call("getInvestors()")).await?)
    }

    async fn submit(&self, call: ContractCall) -> Result<Box<dyn PendingTransaction>, ContractError> {
        let from = self
            .wallet
            .selected_account()
            .ok_or_else(|| ContractError::Rejected {
                code: Some(UNAUTHORIZED_CODE),
                message: "no wallet account connected".to_string(),
            })?;

        let signature = format!("{}()", call.method_name());
        let tx = json!({
            "from": from,
            "to": self.address,
            "data": encode_call(&signature),
            "value": format!("{:#x}", call.value()),
        });

        let tx_hash: B256 = self
            .rpc
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        info!("Sent {} from {}: {}", signature, from, tx_hash);

        Ok(Box::new(RpcPendingTransaction {
            rpc: self.rpc.clone(),
            tx_hash,
            polling: self.polling,
        }))
    }
}

struct RpcPendingTransaction {
    rpc: Arc<JsonRpcClient>,
    tx_hash: B256,
    polling: ReceiptPolling,
}

#[async_trait]
impl PendingTransaction for RpcPendingTransaction {
    fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Polls for the receipt. Transient node errors are retried until the
    /// deadline; a revert or the deadline ends the wait.
    async fn confirmation(self: Box<Self>) -> Result<TransactionReceipt, ContractError> {
        let deadline = Instant::now() + self.polling.timeout;
        loop {
            match self
                .rpc
                .request::<Option<RpcReceipt>>("eth_getTransactionReceipt", json!([self.tx_hash]))
                .await
            {
                Ok(Some(receipt)) => return self.finish(receipt),
                Ok(None) => debug!("Receipt for {} not available yet", self.tx_hash),
                Err(e @ (ContractError::Network(_) | ContractError::Timeout(_))) => {
                    warn!("Polling receipt for {} failed: {}", self.tx_hash, e)
                }
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline {
                return Err(ContractError::Timeout(format!(
                    "receipt of {} after {:?}",
                    self.tx_hash, self.polling.timeout
                )));
            }
            tokio::time::sleep(self.polling.interval).await;
        }
    }
}

impl RpcPendingTransaction {
    fn finish(&self, receipt: RpcReceipt) -> Result<TransactionReceipt, ContractError> {
        if receipt.status.as_deref() == Some("0x0") {
            return Err(ContractError::Reverted {
                tx_hash: self.tx_hash,
            });
        }
        let block_number = receipt
            .block_number
            .as_deref()
            .map(parse_quantity)
            .transpose()?;
        Ok(TransactionReceipt {
            tx_hash: self.tx_hash,
            block_number,
        })
    }
}
