use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use yieldfolio_core::accounts::Account;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_account(State(state): State<Arc<AppState>>) -> Json<Account> {
    Json(state.accounts.current())
}

/// Connecting reads the new account's balances right away.
async fn connect_account(State(state): State<Arc<AppState>>) -> ApiResult<Json<Account>> {
    let account = state.accounts.connect().await?;
    if let Err(e) = state.portfolio.refresh().await {
        tracing::warn!("Refresh after connect failed: {}", e);
    }
    Ok(Json(account))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/account", get(get_account))
        .route("/account/connect", post(connect_account))
}
