//! JSON-RPC 2.0 client for an Ethereum node.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use yieldfolio_core::contract::ContractError;

/// EIP-1193: the user rejected the request
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193: the requested account or method has not been authorized
pub const UNAUTHORIZED_CODE: i64 = 4100;
/// EIP-1474: execution reverted
const EXECUTION_REVERTED_CODE: i64 = 3;
const METHOD_NOT_FOUND_CODE: i64 = -32601;
/// Generic server error; nodes use it for reverts during gas estimation
const SERVER_ERROR_CODE: i64 = -32000;

// ============================================================================
// Wire Structures
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Maps a JSON-RPC error object onto the collaborator error taxonomy.
///
/// Declines and reverts become `Rejected`; everything else is treated as a
/// node problem.
pub fn classify_rpc_error(code: i64, message: &str) -> ContractError {
    let lower = message.to_ascii_lowercase();
    let declined = matches!(
        code,
        USER_REJECTED_CODE | UNAUTHORIZED_CODE | EXECUTION_REVERTED_CODE
    ) || (code == SERVER_ERROR_CODE
        && ["revert", "insufficient funds", "denied", "rejected"]
            .iter()
            .any(|needle| lower.contains(needle)));

    if declined {
        ContractError::Rejected {
            code: Some(code),
            message: message.to_string(),
        }
    } else if code == METHOD_NOT_FOUND_CODE {
        ContractError::NotSupported(message.to_string())
    } else {
        ContractError::Network(format!("node error {}: {}", code, message))
    }
}

// ============================================================================
// JsonRpcClient
// ============================================================================

/// Thin JSON-RPC client. One HTTP request per call, no batching.
pub struct JsonRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one request and deserializes its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ContractError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!("RPC #{} {}", id, method);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ContractError::Timeout(method.to_string())
                } else {
                    ContractError::Network(format!("{} request failed: {}", method, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("RPC {} answered HTTP {}: {}", method, status, text);
            return Err(ContractError::Network(format!("HTTP {} - {}", status, text)));
        }

        let payload: RpcResponse = response
            .json()
            .await
            .map_err(|e| ContractError::Decode(format!("{} response: {}", method, e)))?;

        if let Some(error) = payload.error {
            debug!("RPC {} returned error {}: {}", method, error.code, error.message);
            return Err(classify_rpc_error(error.code, &error.message));
        }

        serde_json::from_value(payload.result)
            .map_err(|e| ContractError::Decode(format!("{} result: {}", method, e)))
    }
}

/// Parses a hex quantity such as `"0x7a69"`.
pub fn parse_quantity(value: &str) -> Result<u64, ContractError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::Decode(format!("'{}' is not a hex quantity", value)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Decode(format!("'{}' is not a hex quantity: {}", value, e)))
}
