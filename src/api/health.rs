use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness plus the ingestion settings the server is running with.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    provider: String,
    calls_per_minute: u32,
    persistent: bool,
    checked_at: DateTime<Utc>,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.config.provider.to_string(),
        calls_per_minute: state.executor.calls_per_minute(),
        persistent: !state.config.is_in_memory(),
        checked_at: Utc::now(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
