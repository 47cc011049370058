//! Tests for the transaction tracker.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use super::*;
use crate::accounts::NetworkGuard;
use crate::contract::ContractCall;
use crate::errors::{Error, ErrorKind};
use crate::events::{MockNotificationSink, Notification};
use crate::test_support::{
    address, milli_units, units, CountingRefreshTrigger, MockContract, MockWallet, SubmitBehavior,
};

struct Harness {
    contract: Arc<MockContract>,
    refresh: Arc<CountingRefreshTrigger>,
    sink: MockNotificationSink,
    tracker: Arc<TransactionTracker>,
}

fn harness() -> Harness {
    let contract = Arc::new(MockContract::new());
    let refresh = Arc::new(CountingRefreshTrigger::default());
    let sink = MockNotificationSink::new();
    let tracker = Arc::new(TransactionTracker::new(
        "basic",
        contract.clone(),
        refresh.clone(),
        Arc::new(sink.clone()),
        TrackerConfig::default(),
    ));
    Harness {
        contract,
        refresh,
        sink,
        tracker,
    }
}

async fn wait_for_hash(tracker: &TransactionTracker) {
    while !matches!(
        tracker.state(),
        TransactionState::Submitted {
            tx_hash: Some(_),
            ..
        }
    ) {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_invest_confirms_and_schedules_refresh() {
    let h = harness();

    let outcome = h
        .tracker
        .execute(TransactionRequest::invest("1.5"))
        .await
        .unwrap();

    assert_eq!(outcome.kind, TransactionKind::Invest);
    assert_eq!(outcome.amount, Some(dec!(1.5)));
    assert_eq!(outcome.receipt.block_number, Some(1));
    assert_eq!(
        h.contract.submitted(),
        vec![ContractCall::Invest {
            value: milli_units(1500)
        }]
    );
    assert!(matches!(
        h.tracker.state(),
        TransactionState::Confirmed {
            kind: TransactionKind::Invest,
            ..
        }
    ));
    assert_eq!(h.refresh.count(), 1);

    let names: Vec<_> = h.sink.notifications().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["transaction:submitted", "transaction:confirmed"]);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_returns_to_idle_after_display_window() {
    let h = harness();
    h.tracker
        .execute(TransactionRequest::withdraw())
        .await
        .unwrap();
    assert!(matches!(h.tracker.state(), TransactionState::Confirmed { .. }));

    tokio::time::sleep(Duration::from_millis(2_900)).await;
    assert!(matches!(h.tracker.state(), TransactionState::Confirmed { .. }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.tracker.state(), TransactionState::Idle);
}

#[tokio::test]
async fn test_invalid_amount_never_reaches_the_network() {
    let h = harness();

    for input in ["", "abc", "0", "-2", "1e3"] {
        let err = h
            .tracker
            .execute(TransactionRequest::invest(input))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)), "input '{}'", input);
        assert_eq!(h.tracker.state(), TransactionState::Idle);
    }

    let missing = TransactionRequest::new(TransactionKind::DepositYieldFarming, None);
    assert!(matches!(
        h.tracker.execute(missing).await,
        Err(Error::InvalidAmount(_))
    ));

    assert!(h.contract.submitted().is_empty());
    assert!(h.sink.is_empty());
    assert_eq!(h.refresh.count(), 0);
}

#[tokio::test]
async fn test_second_request_while_in_flight_is_refused() {
    let h = harness();
    h.contract.set_submit_behavior(SubmitBehavior::Hold);

    let first = {
        let tracker = h.tracker.clone();
        tokio::spawn(async move { tracker.execute(TransactionRequest::invest("2")).await })
    };
    wait_for_hash(&h.tracker).await;

    let err = h
        .tracker
        .execute(TransactionRequest::invest("3"))
        .await
        .unwrap_err();
    assert_eq!(err, Error::TransactionInProgress);
    assert_eq!(h.contract.submitted().len(), 1);
    assert_eq!(h.tracker.acknowledge(), Err(Error::TransactionInProgress));

    h.contract.release();
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.amount, Some(dec!(2)));
    assert_eq!(h.contract.submitted().len(), 1);
}

#[tokio::test]
async fn test_rejection_fails_until_acknowledged() {
    let h = harness();
    h.contract.set_submit_behavior(SubmitBehavior::Reject);

    let err = h
        .tracker
        .execute(TransactionRequest::claim_yield())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransactionRejected(_)));
    assert!(matches!(
        h.tracker.state(),
        TransactionState::Failed {
            kind: TransactionKind::ClaimYield,
            error: ErrorKind::TransactionRejected,
            ..
        }
    ));
    assert_eq!(h.refresh.count(), 0);
    assert!(matches!(
        h.sink.notifications().as_slice(),
        [Notification::TransactionFailed {
            error: ErrorKind::TransactionRejected,
            ..
        }]
    ));

    // Failed blocks new requests until dismissed
    assert_eq!(
        h.tracker.execute(TransactionRequest::claim_yield()).await,
        Err(Error::TransactionInProgress)
    );

    assert_eq!(h.tracker.acknowledge(), Ok(TransactionState::Idle));
    h.contract.set_submit_behavior(SubmitBehavior::Confirm);
    assert!(h
        .tracker
        .execute(TransactionRequest::claim_yield())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_revert_is_a_rejection_and_unreachable_node_a_network_error() {
    let h = harness();

    h.contract.set_submit_behavior(SubmitBehavior::Revert);
    let err = h
        .tracker
        .execute(TransactionRequest::withdraw_yield_farming())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransactionRejected);
    // The hash was known before the revert
    let names: Vec<_> = h.sink.notifications().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["transaction:submitted", "transaction:failed"]);
    h.tracker.acknowledge().unwrap();

    h.contract.set_submit_behavior(SubmitBehavior::Unreachable);
    let err = h
        .tracker
        .execute(TransactionRequest::withdraw())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
    assert_eq!(h.refresh.count(), 0);
}

#[tokio::test]
async fn test_wrong_network_fails_without_submitting() {
    let contract = Arc::new(MockContract::new());
    let wallet = Arc::new(MockWallet::new(address(0xaa), 1));
    let sink = MockNotificationSink::new();
    let tracker = TransactionTracker::new(
        "basic",
        contract.clone(),
        Arc::new(CountingRefreshTrigger::default()),
        Arc::new(sink.clone()),
        TrackerConfig::default(),
    )
    .with_network_guard(NetworkGuard::new(31337), wallet.clone());

    let err = tracker
        .execute(TransactionRequest::invest("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NetworkError(_)));
    assert!(contract.submitted().is_empty());
    assert!(matches!(
        tracker.state(),
        TransactionState::Failed {
            error: ErrorKind::NetworkError,
            ..
        }
    ));
    assert_eq!(sink.len(), 1);

    tracker.acknowledge().unwrap();
    wallet.set_chain_id(31337);
    assert!(tracker.execute(TransactionRequest::invest("1")).await.is_ok());
    assert_eq!(contract.submitted().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_transaction_is_marked_failed() {
    let h = harness();
    h.contract.set_submit_behavior(SubmitBehavior::Hold);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        h.tracker.execute(TransactionRequest::deposit_yield_farming("0.25")),
    )
    .await;
    assert!(result.is_err());

    assert!(matches!(
        h.tracker.state(),
        TransactionState::Failed {
            kind: TransactionKind::DepositYieldFarming,
            error: ErrorKind::NetworkError,
            ..
        }
    ));
    assert_eq!(
        h.contract.submitted(),
        vec![ContractCall::DepositYieldFarming {
            value: milli_units(250)
        }]
    );
}

#[tokio::test]
async fn test_independent_trackers_run_concurrently() {
    let contract = Arc::new(MockContract::new());
    contract.set_submit_behavior(SubmitBehavior::Hold);
    let refresh = Arc::new(CountingRefreshTrigger::default());
    let sink = Arc::new(MockNotificationSink::new());

    let basic = Arc::new(TransactionTracker::new(
        "basic",
        contract.clone(),
        refresh.clone(),
        sink.clone(),
        TrackerConfig::default(),
    ));
    let farming = TransactionTracker::new(
        "yield-farming",
        contract.clone(),
        refresh.clone(),
        sink.clone(),
        TrackerConfig::default(),
    );

    let held = {
        let basic = basic.clone();
        tokio::spawn(async move { basic.execute(TransactionRequest::invest("1")).await })
    };
    wait_for_hash(&basic).await;

    contract.set_submit_behavior(SubmitBehavior::Confirm);
    let outcome = farming
        .execute(TransactionRequest::deposit_yield_farming("4"))
        .await
        .unwrap();
    assert_eq!(outcome.amount, Some(dec!(4)));
    assert!(basic.state().is_in_flight());

    contract.release();
    held.await.unwrap().unwrap();
    assert_eq!(refresh.count(), 2);
    assert_eq!(
        contract.submitted(),
        vec![
            ContractCall::Invest { value: units(1) },
            ContractCall::DepositYieldFarming { value: units(4) },
        ]
    );
}

#[test]
fn test_acknowledge_on_idle_is_a_no_op() {
    let h = harness();
    assert_eq!(h.tracker.acknowledge(), Ok(TransactionState::Idle));
    assert_eq!(h.tracker.label(), "basic");
}
