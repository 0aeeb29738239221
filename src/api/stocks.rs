//! Stock signal endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{ApiResponse, MessageResponse};
use crate::error::{AppError, Result};
use crate::types::{normalize_symbol, BatchResult, Signal, SignalFilter};
use crate::AppState;

/// Body of `POST /api/stocks/fetch-multiple`.
#[derive(Debug, Deserialize)]
pub struct FetchMultipleRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Create the stocks router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/refetch/:symbol", get(refetch_stock))
        .route("/fetch-multiple", post(fetch_multiple))
        .route("/:symbol", delete(delete_stock))
}

/// List active signals, newest first.
async fn list_stocks(
    State(state): State<AppState>,
    query: std::result::Result<Query<SignalFilter>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Signal>>>> {
    let Query(filter) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let signals = state.signals.list_signals(&filter)?;
    let count = signals.len();
    Ok(Json(ApiResponse::new(signals).with_count(count)))
}

/// Recompute and persist one symbol.
async fn refetch_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Signal>>> {
    let signal = state.executor.refetch_symbol(&symbol).await?;
    let message = format!("Stock {} refetched successfully", signal.symbol);
    Ok(Json(ApiResponse::new(signal).with_message(message)))
}

async fn fetch_multiple(
    State(state): State<AppState>,
    body: std::result::Result<Json<FetchMultipleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResult>>> {
    let Json(request) = body.map_err(|_| {
        AppError::BadRequest("Please provide an array of stock symbols".to_string())
    })?;

    let result = state.executor.compute_and_persist(&request.symbols).await?;
    let message = result.summary();
    Ok(Json(ApiResponse::new(result).with_message(message)))
}

async fn delete_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<MessageResponse>> {
    let symbol = normalize_symbol(&symbol)
        .ok_or_else(|| AppError::BadRequest("Symbol is required".to_string()))?;
    state.signals.delete_signal(&symbol)?;
    Ok(Json(MessageResponse::new(format!("Stock {} deleted successfully", symbol))))
}
