use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use yieldfolio_core::transactions::{
    TransactionOutcome, TransactionRequest, TransactionState, TransactionTracker,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct AmountBody {
    amount: String,
}

/// Runs the transaction on its own task so a client hanging up does not
/// abandon it halfway through.
async fn execute(
    tracker: Arc<TransactionTracker>,
    request: TransactionRequest,
) -> ApiResult<Json<TransactionOutcome>> {
    let outcome = tokio::spawn(async move { tracker.execute(request).await })
        .await
        .map_err(|e| ApiError::Internal(format!("Transaction task failed: {}", e)))??;
    Ok(Json(outcome))
}

async fn invest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AmountBody>,
) -> ApiResult<Json<TransactionOutcome>> {
    execute(
        state.basic_tracker.clone(),
        TransactionRequest::invest(body.amount),
    )
    .await
}

async fn withdraw(State(state): State<Arc<AppState>>) -> ApiResult<Json<TransactionOutcome>> {
    execute(state.basic_tracker.clone(), TransactionRequest::withdraw()).await
}

async fn basic_status(State(state): State<Arc<AppState>>) -> Json<TransactionState> {
    Json(state.basic_tracker.state())
}

async fn basic_acknowledge(State(state): State<Arc<AppState>>) -> ApiResult<Json<TransactionState>> {
    Ok(Json(state.basic_tracker.acknowledge()?))
}

async fn deposit_yield_farming(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AmountBody>,
) -> ApiResult<Json<TransactionOutcome>> {
    execute(
        state.yield_farming_tracker.clone(),
        TransactionRequest::deposit_yield_farming(body.amount),
    )
    .await
}

async fn withdraw_yield_farming(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TransactionOutcome>> {
    execute(
        state.yield_farming_tracker.clone(),
        TransactionRequest::withdraw_yield_farming(),
    )
    .await
}

async fn claim_yield(State(state): State<Arc<AppState>>) -> ApiResult<Json<TransactionOutcome>> {
    execute(
        state.yield_farming_tracker.clone(),
        TransactionRequest::claim_yield(),
    )
    .await
}

async fn yield_farming_status(State(state): State<Arc<AppState>>) -> Json<TransactionState> {
    Json(state.yield_farming_tracker.state())
}

async fn yield_farming_acknowledge(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<TransactionState>> {
    Ok(Json(state.yield_farming_tracker.acknowledge()?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/investments", post(invest))
        .route("/investments/withdraw", post(withdraw))
        .route("/investments/status", get(basic_status))
        .route("/investments/acknowledge", post(basic_acknowledge))
        .route("/yield-farming/deposit", post(deposit_yield_farming))
        .route("/yield-farming/withdraw", post(withdraw_yield_farming))
        .route("/yield-farming/claim", post(claim_yield))
        .route("/yield-farming/status", get(yield_farming_status))
        .route("/yield-farming/acknowledge", post(yield_farming_acknowledge))
}
