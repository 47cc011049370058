//! In-memory collaborators for tests.
//!
//! Available to this crate's unit tests and, through the `test-utils`
//! feature, to downstream test suites.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tokio::sync::{broadcast, watch, Notify};

use crate::accounts::{WalletEvent, WalletProviderTrait};
use crate::contract::{
    ContractCall, ContractError, InvestmentContractTrait, PendingTransaction, TransactionReceipt,
};
use crate::errors::{Error, Result};
use crate::market_trend::{MarketTrend, MarketTrendSource};
use crate::transactions::RefreshTrigger;

/// Whole display units to base units.
pub fn units(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}

/// Display units given in thousandths, to base units.
pub fn milli_units(thousandths: u64) -> U256 {
    U256::from(thousandths) * U256::from(10u64).pow(U256::from(15u64))
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

// ============================================================================
// Contract
// ============================================================================

/// How the mock answers `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBehavior {
    /// Accepted and mined in block 1
    Confirm,
    /// Declined by the wallet with code 4001
    Reject,
    /// The node cannot be reached
    Unreachable,
    /// Accepted, then reverted when mined
    Revert,
    /// Accepted, confirmation waits until [`MockContract::release`]
    Hold,
}

#[derive(Debug, Clone, Default)]
pub struct MockPosition {
    pub principal: U256,
    pub rewards: U256,
    pub yield_farming: U256,
    pub yield_farming_rewards: Option<U256>,
}

#[derive(Default)]
struct MockContractState {
    positions: HashMap<Address, MockPosition>,
    total_invested: U256,
    total_yield_farming: U256,
    investors: Vec<Address>,
    submitted: Vec<ContractCall>,
}

/// Investment contract backed by in-memory state. Counts every call.
pub struct MockContract {
    state: Mutex<MockContractState>,
    behavior: Mutex<SubmitBehavior>,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
    release: Arc<Notify>,
    hold_reads: AtomicBool,
    parked: AtomicUsize,
    resume: watch::Sender<u64>,
}

impl Default for MockContract {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockContractState::default()),
            behavior: Mutex::new(SubmitBehavior::Confirm),
            fail_reads: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            release: Arc::new(Notify::new()),
            hold_reads: AtomicBool::new(false),
            parked: AtomicUsize::new(0),
            resume: watch::Sender::new(0),
        }
    }
}

impl MockContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, investor: Address, position: MockPosition) {
        self.state.lock().unwrap().positions.insert(investor, position);
    }

    pub fn set_totals(&self, total_invested: U256, total_yield_farming: U256) {
        let mut state = self.state.lock().unwrap();
        state.total_invested = total_invested;
        state.total_yield_farming = total_yield_farming;
    }

    pub fn set_investors(&self, investors: Vec<Address>) {
        self.state.lock().unwrap().investors = investors;
    }

    pub fn set_submit_behavior(&self, behavior: SubmitBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Lets a held confirmation complete.
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn submitted(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// While set, reads capture the current state and then wait for
    /// [`MockContract::release_parked_reads`] before returning it.
    pub fn set_hold_reads(&self, hold: bool) {
        self.hold_reads.store(hold, Ordering::SeqCst);
    }

    /// Number of reads currently waiting to be released.
    pub fn parked_reads(&self) -> usize {
        self.parked.load(Ordering::SeqCst)
    }

    pub fn release_parked_reads(&self) {
        self.resume.send_modify(|generation| *generation += 1);
    }

    async fn read<T>(
        &self,
        f: impl FnOnce(&MockContractState) -> T,
    ) -> std::result::Result<T, ContractError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ContractError::Network("node unreachable".to_string()));
        }
        let value = f(&self.state.lock().unwrap());
        if self.hold_reads.load(Ordering::SeqCst) {
            let mut resume = self.resume.subscribe();
            self.parked.fetch_add(1, Ordering::SeqCst);
            let _ = resume.changed().await;
            self.parked.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(value)
    }

    async fn position(&self, investor: Address) -> std::result::Result<MockPosition, ContractError> {
        self.read(|s| s.positions.get(&investor).cloned().unwrap_or_default())
            .await
    }
}

struct MockPending {
    tx_hash: B256,
    behavior: SubmitBehavior,
    release: Arc<Notify>,
}

#[async_trait]
impl PendingTransaction for MockPending {
    fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    async fn confirmation(self: Box<Self>) -> std::result::Result<TransactionReceipt, ContractError> {
        match self.behavior {
            SubmitBehavior::Revert => Err(ContractError::Reverted {
                tx_hash: self.tx_hash,
            }),
            SubmitBehavior::Hold => {
                self.release.notified().await;
                Ok(TransactionReceipt {
                    tx_hash: self.tx_hash,
                    block_number: Some(1),
                })
            }
            _ => Ok(TransactionReceipt {
                tx_hash: self.tx_hash,
                block_number: Some(1),
            }),
        }
    }
}

#[async_trait]
impl InvestmentContractTrait for MockContract {
    async fn investments(&self, investor: Address) -> std::result::Result<U256, ContractError> {
        Ok(self.position(investor).await?.principal)
    }

    async fn rewards(&self, investor: Address) -> std::result::Result<U256, ContractError> {
        Ok(self.position(investor).await?.rewards)
    }

    async fn yield_farming_balances(
        &self,
        investor: Address,
    ) -> std::result::Result<U256, ContractError> {
        Ok(self.position(investor).await?.yield_farming)
    }

    async fn yield_farming_rewards(
        &self,
        investor: Address,
    ) -> std::result::Result<Option<U256>, ContractError> {
        Ok(self.position(investor).await?.yield_farming_rewards)
    }

    async fn total_invested(&self) -> std::result::Result<U256, ContractError> {
        self.read(|s| s.total_invested).await
    }

    async fn total_yield_farming(&self) -> std::result::Result<U256, ContractError> {
        self.read(|s| s.total_yield_farming).await
    }

    async fn get_investors(&self) -> std::result::Result<Vec<Address>, ContractError> {
        self.read(|s| s.investors.clone()).await
    }

    async fn submit(
        &self,
        call: ContractCall,
    ) -> std::result::Result<Box<dyn PendingTransaction>, ContractError> {
        let behavior = *self.behavior.lock().unwrap();
        let count = {
            let mut state = self.state.lock().unwrap();
            state.submitted.push(call);
            state.submitted.len()
        };
        match behavior {
            SubmitBehavior::Reject => Err(ContractError::Rejected {
                code: Some(4001),
                message: "User denied transaction signature".to_string(),
            }),
            SubmitBehavior::Unreachable => {
                Err(ContractError::Network("connection refused".to_string()))
            }
            _ => Ok(Box::new(MockPending {
                tx_hash: B256::with_last_byte(count as u8),
                behavior,
                release: self.release.clone(),
            })),
        }
    }
}

// ============================================================================
// Wallet
// ============================================================================

/// Wallet with a single account and a settable chain.
pub struct MockWallet {
    address: Address,
    chain_id: Mutex<u64>,
    reject_connect: AtomicBool,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(address: Address, chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            address,
            chain_id: Mutex::new(chain_id),
            reject_connect: AtomicBool::new(false),
            events,
        }
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    pub fn set_reject_connect(&self, reject: bool) {
        self.reject_connect.store(reject, Ordering::SeqCst);
    }

    /// Publishes an event to subscribers. Returns the number of receivers.
    pub fn emit(&self, event: WalletEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}

#[async_trait]
impl WalletProviderTrait for MockWallet {
    async fn connect(&self) -> std::result::Result<Address, ContractError> {
        if self.reject_connect.load(Ordering::SeqCst) {
            return Err(ContractError::Rejected {
                code: Some(4001),
                message: "User rejected the request".to_string(),
            });
        }
        Ok(self.address)
    }

    async fn accounts(&self) -> std::result::Result<Vec<Address>, ContractError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> std::result::Result<u64, ContractError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

// ============================================================================
// Refresh and trend
// ============================================================================

/// Counts scheduled refreshes.
#[derive(Default)]
pub struct CountingRefreshTrigger {
    count: AtomicUsize,
}

impl CountingRefreshTrigger {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RefreshTrigger for CountingRefreshTrigger {
    fn schedule_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Replays a queue of trends; fails once the queue is empty.
#[derive(Default)]
pub struct ScriptedTrendSource {
    trends: Mutex<VecDeque<MarketTrend>>,
}

impl ScriptedTrendSource {
    pub fn new(trends: impl IntoIterator<Item = MarketTrend>) -> Self {
        Self {
            trends: Mutex::new(trends.into_iter().collect()),
        }
    }
}

#[async_trait]
impl MarketTrendSource for ScriptedTrendSource {
    fn id(&self) -> &'static str {
        "SCRIPTED"
    }

    async fn next_trend(&self) -> Result<MarketTrend> {
        self.trends
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::ReadFailure("no scripted trend left".to_string()))
    }
}
