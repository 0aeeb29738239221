use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::SymbolStage;

/// Failures raised by a market data provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NoData(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Errors of the fetch-compute-persist pipeline.
///
/// `DataUnavailable`, `MalformedSeries` and `PersistenceFailure` are
/// recovered per symbol by the batch executor. `InvalidRequest` is the only
/// structural failure and is raised before the executor loop starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    DataUnavailable(String),

    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Failed to fetch {symbol} while {stage}: {reason}")]
    SymbolFailed {
        symbol: String,
        stage: SymbolStage,
        reason: String,
    },
}

impl From<ProviderError> for PipelineError {
    fn from(err: ProviderError) -> Self {
        PipelineError::DataUnavailable(err.to_string())
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::PersistenceFailure(err.to_string())
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest(msg) => AppError::BadRequest(msg),
            PipelineError::PersistenceFailure(msg) => AppError::Internal(msg),
            failed @ PipelineError::SymbolFailed {
                stage: SymbolStage::Persisting,
                ..
            } => AppError::Internal(failed.to_string()),
            other => AppError::ExternalApi(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::SerdeJson(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
