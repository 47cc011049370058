//! Integration tests against an in-process fake JSON-RPC node.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{address, hex, Address, U256};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use yieldfolio_chain::abi::selector;
use yieldfolio_chain::{JsonRpcClient, ReceiptPolling, RpcInvestmentContract, RpcWallet};
use yieldfolio_core::accounts::{WalletEvent, WalletProviderTrait};
use yieldfolio_core::contract::{ContractCall, ContractError, InvestmentContractTrait};

const CONTRACT: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
const ACCOUNT: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");

// ============================================================================
// Fake node
// ============================================================================

#[derive(Default)]
struct FakeNode {
    chain_id: Mutex<u64>,
    accounts: Mutex<Vec<Address>>,
    reject_sends: AtomicBool,
    revert_sends: AtomicBool,
    receipt_polls: AtomicUsize,
    sent: Mutex<Vec<Value>>,
}

fn word(value: U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<32>()))
}

fn address_array(addresses: &[Address]) -> String {
    let mut data = Vec::new();
    data.extend_from_slice(&U256::from(32u8).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(addresses.len()).to_be_bytes::<32>());
    for address in addresses {
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(address.as_slice());
    }
    format!("0x{}", hex::encode(data))
}

fn ether(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}

fn answer(node: &FakeNode, method: &str, params: &Value) -> Result<Value, (i64, &'static str)> {
    match method {
        "eth_chainId" => Ok(json!(format!("{:#x}", *node.chain_id.lock().unwrap()))),
        "eth_accounts" => Ok(json!(*node.accounts.lock().unwrap())),
        "eth_requestAccounts" => Err((-32601, "Method eth_requestAccounts not found")),
        "eth_call" => {
            let data = params[0]["data"].as_str().unwrap_or_default();
            let bytes = hex::decode(data).unwrap_or_default();
            let sel: [u8; 4] = bytes[..4].try_into().unwrap();
            if sel == selector("investments(address)") {
                let investor = Address::from_slice(&bytes[16..36]);
                let value = if investor == ACCOUNT { ether(4) } else { U256::ZERO };
                Ok(json!(word(value)))
            } else if sel == selector("totalInvested()") {
                Ok(json!(word(ether(20))))
            } else if sel == selector("getInvestors()") {
                Ok(json!(address_array(&[ACCOUNT, Address::ZERO])))
            } else {
                Err((3, "execution reverted"))
            }
        }
        "eth_sendTransaction" => {
            if node.reject_sends.load(Ordering::SeqCst) {
                return Err((4001, "User denied transaction signature"));
            }
            node.sent.lock().unwrap().push(params[0].clone());
            Ok(json!(format!("0x{}", "11".repeat(32))))
        }
        "eth_getTransactionReceipt" => {
            // Pending on the first poll
            if node.receipt_polls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(Value::Null);
            }
            let status = if node.revert_sends.load(Ordering::SeqCst) {
                "0x0"
            } else {
                "0x1"
            };
            Ok(json!({ "blockNumber": "0x2a", "status": status }))
        }
        _ => Err((-32601, "method not found")),
    }
}

async fn rpc(State(node): State<Arc<FakeNode>>, Json(request): Json<Value>) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let id = request["id"].clone();
    match answer(&node, method, &request["params"]) {
        Ok(result) => Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
        Err((code, message)) => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        })),
    }
}

struct Harness {
    node: Arc<FakeNode>,
    wallet: Arc<RpcWallet>,
    contract: RpcInvestmentContract,
}

async fn start() -> Harness {
    let node = Arc::new(FakeNode::default());
    *node.chain_id.lock().unwrap() = 31337;
    *node.accounts.lock().unwrap() = vec![ACCOUNT];

    let app = Router::new().route("/", post(rpc)).with_state(node.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, app).await });

    let client = Arc::new(JsonRpcClient::new(url, Duration::from_secs(5)));
    let wallet = Arc::new(RpcWallet::new(client.clone()));
    let contract = RpcInvestmentContract::new(
        client,
        CONTRACT,
        wallet.clone(),
        ReceiptPolling {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        },
    );
    Harness {
        node,
        wallet,
        contract,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_reads_decode_contract_values() {
    let h = start().await;

    assert_eq!(h.contract.investments(ACCOUNT).await.unwrap(), ether(4));
    assert_eq!(h.contract.investments(Address::ZERO).await.unwrap(), U256::ZERO);
    assert_eq!(h.contract.total_invested().await.unwrap(), ether(20));
    assert_eq!(
        h.contract.get_investors().await.unwrap(),
        vec![ACCOUNT, Address::ZERO]
    );
    assert_eq!(h.contract.yield_farming_rewards(ACCOUNT).await.unwrap(), None);
}

#[tokio::test]
async fn test_unknown_read_is_rejected_by_the_node() {
    let h = start().await;
    let err = h.contract.total_yield_farming().await.unwrap_err();
    assert!(matches!(err, ContractError::Rejected { code: Some(3), .. }));
}

#[tokio::test]
async fn test_connect_falls_back_to_node_accounts() {
    let h = start().await;

    assert_eq!(h.wallet.selected_account(), None);
    assert_eq!(h.wallet.connect().await.unwrap(), ACCOUNT);
    assert_eq!(h.wallet.selected_account(), Some(ACCOUNT));
    assert_eq!(h.wallet.chain_id().await.unwrap(), 31337);
}

#[tokio::test]
async fn test_submit_requires_a_connected_account() {
    let h = start().await;
    let err = h.contract.submit(ContractCall::Withdraw).await.err().unwrap();
    assert!(err.is_rejection());
    assert!(h.node.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invest_is_sent_and_confirmed() {
    let h = start().await;
    h.wallet.connect().await.unwrap();

    let pending = h
        .contract
        .submit(ContractCall::Invest { value: ether(1) })
        .await
        .unwrap();
    let tx_hash = pending.tx_hash();
    let receipt = pending.confirmation().await.unwrap();

    assert_eq!(receipt.tx_hash, tx_hash);
    assert_eq!(receipt.block_number, Some(42));
    assert_eq!(h.node.receipt_polls.load(Ordering::SeqCst), 2);

    let sent = h.node.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["value"], "0xde0b6b3a7640000");
    assert_eq!(
        sent[0]["data"],
        format!("0x{}", hex::encode(selector("invest()")))
    );
}

#[tokio::test]
async fn test_user_rejection_and_revert() {
    let h = start().await;
    h.wallet.connect().await.unwrap();

    h.node.reject_sends.store(true, Ordering::SeqCst);
    let err = h.contract.submit(ContractCall::ClaimYield).await.err().unwrap();
    assert!(matches!(err, ContractError::Rejected { code: Some(4001), .. }));

    h.node.reject_sends.store(false, Ordering::SeqCst);
    h.node.revert_sends.store(true, Ordering::SeqCst);
    let pending = h.contract.submit(ContractCall::ClaimYield).await.unwrap();
    let err = pending.confirmation().await.unwrap_err();
    assert!(matches!(err, ContractError::Reverted { .. }));
}

#[tokio::test]
async fn test_poll_changes_reports_account_and_chain_switches() {
    let h = start().await;
    let mut events = h.wallet.subscribe();

    // First observation only records the baseline
    assert!(h.wallet.poll_changes().await.unwrap().is_empty());

    h.wallet.connect().await.unwrap();
    *h.node.chain_id.lock().unwrap() = 1;
    *h.node.accounts.lock().unwrap() = vec![Address::repeat_byte(0xbb)];

    let changes = h.wallet.poll_changes().await.unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(
        events.recv().await.unwrap(),
        WalletEvent::AccountsChanged(vec![Address::repeat_byte(0xbb)])
    );
    assert_eq!(
        events.recv().await.unwrap(),
        WalletEvent::ChainChanged(1)
    );
    assert_eq!(h.wallet.selected_account(), Some(Address::repeat_byte(0xbb)));

    assert!(h.wallet.poll_changes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_account_changes_before_connect_are_not_reported() {
    let h = start().await;
    assert!(h.wallet.poll_changes().await.unwrap().is_empty());

    *h.node.accounts.lock().unwrap() = vec![Address::repeat_byte(0xbb)];
    assert!(h.wallet.poll_changes().await.unwrap().is_empty());
    assert_eq!(h.wallet.selected_account(), None);

    h.wallet.connect().await.unwrap();
    *h.node.accounts.lock().unwrap() = vec![ACCOUNT];
    assert_eq!(
        h.wallet.poll_changes().await.unwrap(),
        vec![WalletEvent::AccountsChanged(vec![ACCOUNT])]
    );
}

#[tokio::test]
async fn test_unreachable_node_is_a_network_error() {
    let client = Arc::new(JsonRpcClient::new(
        "http://127.0.0.1:9",
        Duration::from_secs(2),
    ));
    let wallet = Arc::new(RpcWallet::new(client.clone()));
    let contract = RpcInvestmentContract::new(client, CONTRACT, wallet, ReceiptPolling::default());

    let err = contract.total_invested().await.unwrap_err();
    assert!(matches!(
        err,
        ContractError::Network(_) | ContractError::Timeout(_)
    ));
}
