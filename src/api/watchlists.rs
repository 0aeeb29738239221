//! Watchlist endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{ApiResponse, MessageResponse};
use crate::error::{AppError, Result};
use crate::types::{BatchResult, CreateWatchlist, UpdateWatchlist, WatchlistView};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_watchlists).post(create_watchlist))
        .route(
            "/:id",
            get(get_watchlist).put(update_watchlist).delete(delete_watchlist),
        )
        .route("/:id/refetch", get(refetch_watchlist))
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("Watchlist not found".to_string()))
}

async fn create_watchlist(
    State(state): State<AppState>,
    Json(request): Json<CreateWatchlist>,
) -> Result<(StatusCode, Json<ApiResponse<WatchlistView>>)> {
    let view = state.watchlists.create(request)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(view))))
}

async fn list_watchlists(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WatchlistView>>>> {
    let watchlists = state.watchlists.list()?;
    let count = watchlists.len();
    Ok(Json(ApiResponse::new(watchlists).with_count(count)))
}

async fn get_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WatchlistView>>> {
    let view = state.watchlists.get(parse_id(&id)?)?;
    Ok(Json(ApiResponse::new(view)))
}

async fn update_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateWatchlist>,
) -> Result<Json<ApiResponse<WatchlistView>>> {
    let view = state.watchlists.update(parse_id(&id)?, request)?;
    Ok(Json(ApiResponse::new(view)))
}

async fn refetch_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BatchResult>>> {
    let result = state.watchlists.refetch(parse_id(&id)?).await?;
    let message = format!(
        "Refetched {} out of {} stocks",
        result.succeeded.len(),
        result.total()
    );
    Ok(Json(ApiResponse::new(result).with_message(message)))
}

async fn delete_watchlist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.watchlists.delete(parse_id(&id)?)?;
    Ok(Json(MessageResponse::new("Watchlist deleted successfully")))
}
