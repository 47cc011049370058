//! Single-flight transaction state machine.
//!
//! ```text
//! Idle -> Preparing -> Submitted -> Confirmed | Failed -> Idle
//! ```
//!
//! Invalid input fails during `Preparing` and drops straight back to `Idle`
//! without touching the network. A second request while the tracker is not
//! `Idle` fails with `TransactionInProgress`. `Confirmed` returns to `Idle`
//! after the display window; `Failed` returns to `Idle` once acknowledged.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::U256;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use super::{
    RefreshTrigger, TrackerConfig, TransactionKind, TransactionOutcome, TransactionRequest,
    TransactionState,
};
use crate::accounts::{NetworkGuard, WalletProviderTrait};
use crate::contract::{ContractCall, InvestmentContractTrait};
use crate::errors::{Error, Result};
use crate::events::{Notification, NotificationSink};
use crate::units::{parse_amount, to_base_units};

#[derive(Debug, Default)]
struct TrackerInner {
    state: TransactionState,
    /// Bumped for every accepted request so that delayed resets and drop
    /// guards never touch a newer transaction.
    generation: u64,
}

type SharedInner = Arc<Mutex<TrackerInner>>;

fn lock_inner(inner: &SharedInner) -> MutexGuard<'_, TrackerInner> {
    inner.lock().unwrap_or_else(|poisoned| {
        warn!("Transaction tracker mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Marks the transaction failed if the caller stops awaiting it mid-flight.
struct InFlightGuard {
    inner: SharedInner,
    generation: u64,
    kind: TransactionKind,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut inner = lock_inner(&self.inner);
        if inner.generation == self.generation && inner.state.is_in_flight() {
            warn!(
                "{:?} transaction abandoned before reaching a terminal state",
                self.kind
            );
            let error = Error::NetworkError("transaction tracking was cancelled".to_string());
            inner.state = TransactionState::Failed {
                kind: self.kind,
                error: error.kind(),
                message: error.to_string(),
            };
        }
    }
}

/// Wraps state-changing contract calls for one dashboard section.
///
/// Independent trackers (e.g. basic investment and yield farming) can run
/// concurrently; each one allows a single transaction at a time.
pub struct TransactionTracker {
    label: String,
    contract: Arc<dyn InvestmentContractTrait>,
    network_gate: Option<(NetworkGuard, Arc<dyn WalletProviderTrait>)>,
    refresh: Arc<dyn RefreshTrigger>,
    sink: Arc<dyn NotificationSink>,
    config: TrackerConfig,
    inner: SharedInner,
}

impl TransactionTracker {
    pub fn new(
        label: impl Into<String>,
        contract: Arc<dyn InvestmentContractTrait>,
        refresh: Arc<dyn RefreshTrigger>,
        sink: Arc<dyn NotificationSink>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            label: label.into(),
            contract,
            network_gate: None,
            refresh,
            sink,
            config,
            inner: Arc::new(Mutex::new(TrackerInner::default())),
        }
    }

    /// Requires the wallet to be on the expected chain before any write.
    pub fn with_network_guard(
        mut self,
        guard: NetworkGuard,
        wallet: Arc<dyn WalletProviderTrait>,
    ) -> Self {
        self.network_gate = Some((guard, wallet));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> TransactionState {
        lock_inner(&self.inner).state.clone()
    }

    /// Dismisses a terminal state. Idle is left untouched; an in-flight
    /// transaction cannot be dismissed.
    pub fn acknowledge(&self) -> Result<TransactionState> {
        let mut inner = lock_inner(&self.inner);
        if inner.state.is_in_flight() {
            return Err(Error::TransactionInProgress);
        }
        if inner.state.is_terminal() {
            debug!("[{}] acknowledged {:?}", self.label, inner.state);
            inner.state = TransactionState::Idle;
        }
        Ok(inner.state.clone())
    }

    /// Runs a transaction through the full lifecycle.
    ///
    /// Returns once the transaction is confirmed or has failed. The amount is
    /// captured when the request is prepared; later changes elsewhere in the
    /// dashboard never alter what was submitted.
    pub async fn execute(&self, request: TransactionRequest) -> Result<TransactionOutcome> {
        let kind = request.kind;
        let generation = self.begin(kind)?;
        let _guard = InFlightGuard {
            inner: self.inner.clone(),
            generation,
            kind,
        };

        let (amount, call) = match prepare_call(&request) {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!("[{}] rejected {:?} request: {}", self.label, kind, e);
                self.set_state(generation, TransactionState::Idle);
                return Err(e);
            }
        };

        if let Some((guard, wallet)) = &self.network_gate {
            if let Err(e) = guard.verify(wallet.as_ref()).await {
                return Err(self.fail(generation, kind, e));
            }
        }

        self.set_state(generation, TransactionState::Submitted { kind, tx_hash: None });
        info!(
            "[{}] submitting {} (value {} base units)",
            self.label,
            call.method_name(),
            call.value()
        );

        let pending = match self.contract.submit(call).await {
            Ok(pending) => pending,
            Err(e) => return Err(self.fail(generation, kind, Error::from_transaction_failure(e))),
        };

        let tx_hash = pending.tx_hash();
        self.set_state(
            generation,
            TransactionState::Submitted {
                kind,
                tx_hash: Some(tx_hash),
            },
        );
        self.sink
            .notify(Notification::TransactionSubmitted { kind, tx_hash });

        let receipt = match pending.confirmation().await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(generation, kind, Error::from_transaction_failure(e))),
        };

        self.set_state(
            generation,
            TransactionState::Confirmed {
                kind,
                tx_hash: receipt.tx_hash,
                block_number: receipt.block_number,
            },
        );
        info!(
            "[{}] {:?} confirmed in block {:?} ({})",
            self.label, kind, receipt.block_number, receipt.tx_hash
        );

        self.refresh.schedule_refresh();
        self.sink.notify(Notification::TransactionConfirmed {
            kind,
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
        });
        self.schedule_reset(generation);

        Ok(TransactionOutcome {
            kind,
            amount,
            receipt,
        })
    }

    /// Idle -> Preparing, or `TransactionInProgress`.
    fn begin(&self, kind: TransactionKind) -> Result<u64> {
        let mut inner = lock_inner(&self.inner);
        if !inner.state.is_idle() {
            debug!(
                "[{}] {:?} refused, tracker is {:?}",
                self.label, kind, inner.state
            );
            return Err(Error::TransactionInProgress);
        }
        inner.generation += 1;
        inner.state = TransactionState::Preparing { kind };
        Ok(inner.generation)
    }

    fn set_state(&self, generation: u64, state: TransactionState) {
        let mut inner = lock_inner(&self.inner);
        if inner.generation == generation {
            inner.state = state;
        }
    }

    fn fail(&self, generation: u64, kind: TransactionKind, error: Error) -> Error {
        warn!("[{}] {:?} failed: {}", self.label, kind, error);
        self.set_state(
            generation,
            TransactionState::Failed {
                kind,
                error: error.kind(),
                message: error.to_string(),
            },
        );
        self.sink.notify(Notification::TransactionFailed {
            kind,
            error: error.kind(),
            message: error.to_string(),
        });
        error
    }

    fn schedule_reset(&self, generation: u64) {
        let inner = self.inner.clone();
        let window = self.config.confirmed_display_window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut inner = lock_inner(&inner);
            if inner.generation == generation
                && matches!(inner.state, TransactionState::Confirmed { .. })
            {
                inner.state = TransactionState::Idle;
            }
        });
    }
}

/// Validates the request and captures the amount by value.
fn prepare_call(request: &TransactionRequest) -> Result<(Option<Decimal>, ContractCall)> {
    if !request.kind.requires_amount() {
        return Ok((None, request.kind.to_call(U256::ZERO)));
    }
    let raw = request
        .amount
        .as_deref()
        .ok_or_else(|| Error::InvalidAmount("amount is required".to_string()))?;
    let amount = parse_amount(raw)?;
    let value = to_base_units(amount)?;
    Ok((Some(amount), request.kind.to_call(value)))
}
