//! Yieldfolio Chain - JSON-RPC implementations of the core's contract and
//! wallet collaborators.
//!
//! Targets a node with managed accounts (e.g. a local development node on
//! chain 31337): transactions are sent with `eth_sendTransaction` and signed
//! by the node.

pub mod abi;
pub mod contract;
pub mod rpc_client;
pub mod wallet;

pub use contract::{ReceiptPolling, RpcInvestmentContract};
pub use rpc_client::JsonRpcClient;
pub use wallet::RpcWallet;
