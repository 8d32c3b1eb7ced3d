use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use log::*;
use serde_json::json;
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("SQL query failed: {0}")]
    Diesel(#[from] diesel::result::Error),
    #[error("R2D2 pool error: {0}")]
    Pool(#[from] r2d2::PoolError),
    #[error("database migration error: {0}")]
    Migration(String),
    #[error("field {0} is not an integer")]
    NotAnInteger(&'static str),
}

/// Errors surfaced at the HTTP boundary.
///
/// `NotFound` renders as `404 {"error": msg}`, `InvalidArgument` as
/// `400 {"errors": [msg]}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Internal server error")]
    Internal,
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Validation(msg) => ApiError::InvalidArgument(msg),
            other => {
                error!("storage failure: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("blocking task failed: {}", err);
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, json!({ "errors": [msg] })),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
