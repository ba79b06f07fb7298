//! HTTP surface: routes, shared state, and error-to-status mapping.
//! Handlers translate between JSON and the core; no ledger logic lives here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::error::{LedgerError, OracleError, ValuationError};
use crate::oracle::{NewsAggregator, PriceOracle};
use crate::persistence::{self, SqlitePool};
use crate::types::position::UserId;
use crate::types::valuation::NewsDigest;
use crate::valuation::ValuationEngine;

const DEFAULT_NEWS_LIMIT: usize = 3;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub engine: Arc<ValuationEngine>,
    pub prices: Arc<dyn PriceOracle>,
    pub news: Arc<dyn NewsAggregator>,
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub limit: Option<usize>,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users/{user_id}/holdings/buy", post(buy))
        .route("/users/{user_id}/holdings/sell", post(sell))
        .route("/users/{user_id}/portfolio", get(portfolio).delete(reset))
        .route("/users/{user_id}/news", get(user_news))
        .route("/price/{symbol}", get(symbol_price))
        .route("/news/{symbol}", get(symbol_news))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

async fn buy(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    persistence::buy(&state.pool, user_id, &req.symbol, req.amount).await?;
    Ok(Json(json!({
        "user_id": user_id,
        "symbol": req.symbol.trim().to_uppercase(),
        "bought": req.amount,
    })))
}

async fn sell(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    persistence::sell(&state.pool, user_id, &req.symbol, req.amount).await?;
    Ok(Json(json!({
        "user_id": user_id,
        "symbol": req.symbol.trim().to_uppercase(),
        "sold": req.amount,
    })))
}

async fn portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.engine.valuate(user_id).await?;
    // Rounding happens here only; the engine keeps full precision.
    let holdings: Vec<serde_json::Value> = report
        .lines
        .iter()
        .map(|line| {
            json!({
                "symbol": line.symbol,
                "shares": line.shares,
                "unit_price": line.unit_price.map(round2),
                "value": line.line_value.map(round2),
            })
        })
        .collect();
    Ok(Json(json!({
        "holdings": holdings,
        "total_value": round2(report.total_value),
    })))
}

async fn reset(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
    persistence::reset(&state.pool, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn user_news(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<NewsParams>,
) -> Result<Json<HashMap<String, NewsDigest>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_NEWS_LIMIT);
    let digests = state.engine.portfolio_news(user_id, limit).await?;
    Ok(Json(digests))
}

async fn symbol_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let symbol = symbol.trim().to_uppercase();
    let quote = state.prices.get_price(&symbol).await?;
    Ok(Json(json!({
        "symbol": symbol,
        "price": round2(quote.price),
        "currency": quote.currency,
    })))
}

async fn symbol_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<NewsParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let symbol = symbol.trim().to_uppercase();
    let limit = params.limit.unwrap_or(DEFAULT_NEWS_LIMIT);
    let headlines = state.news.get_headlines(&symbol, limit).await?;
    Ok(Json(json!({ "symbol": symbol, "headlines": headlines })))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Maps core errors onto HTTP statuses; bodies are `{"error": message}`.
pub enum ApiError {
    Ledger(LedgerError),
    EmptyPortfolio,
    Oracle(OracleError),
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl From<ValuationError> for ApiError {
    fn from(e: ValuationError) -> Self {
        match e {
            ValuationError::EmptyPortfolio => Self::EmptyPortfolio,
            ValuationError::Ledger(inner) => Self::Ledger(inner),
        }
    }
}

impl From<OracleError> for ApiError {
    fn from(e: OracleError) -> Self {
        Self::Oracle(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(
                e @ (LedgerError::InvalidAmount { .. } | LedgerError::InvalidSymbol),
            ) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Ledger(e @ LedgerError::InsufficientShares { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            ApiError::Ledger(LedgerError::Store(e)) => {
                error!("storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage unavailable".to_string(),
                )
            }
            ApiError::EmptyPortfolio => (StatusCode::NOT_FOUND, "portfolio is empty".to_string()),
            ApiError::Oracle(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
