use std::sync::Arc;

use alloy_primitives::Address;
use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use yieldfolio_core::{
    market_trend::MarketTrend,
    portfolio::{PlatformStats, PortfolioSnapshot, PrincipalBasis},
};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalBasisBody {
    basis: PrincipalBasis,
}

async fn get_portfolio(State(state): State<Arc<AppState>>) -> Json<PortfolioSnapshot> {
    Json(state.portfolio.snapshot())
}

async fn refresh_portfolio(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioSnapshot>> {
    Ok(Json(state.portfolio.refresh().await?))
}

async fn set_principal_basis(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PrincipalBasisBody>,
) -> Json<PortfolioSnapshot> {
    Json(state.portfolio.set_principal_basis(body.basis))
}

/// `null` until the first successful refresh.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Option<PlatformStats>> {
    Json(state.portfolio.platform_stats())
}

async fn get_investors(State(state): State<Arc<AppState>>) -> Json<Vec<Address>> {
    Json(state.portfolio.investors())
}

async fn get_market_trend(State(state): State<Arc<AppState>>) -> Json<MarketTrend> {
    Json(state.portfolio.current_trend())
}

async fn refresh_market_trend(State(state): State<Arc<AppState>>) -> ApiResult<Json<MarketTrend>> {
    Ok(Json(state.portfolio.update_market_trend().await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/refresh", post(refresh_portfolio))
        .route("/portfolio/principal-basis", put(set_principal_basis))
        .route("/stats", get(get_stats))
        .route("/investors", get(get_investors))
        .route("/market-trend", get(get_market_trend))
        .route("/market-trend/refresh", post(refresh_market_trend))
}
