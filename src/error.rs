//! Error types for the cache service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Error type surfaced by the cache administration API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Storage Error Enum ==
/// Failure inside the persistent tier.
///
/// Never crosses the coordinator boundary: callers see "absent" or
/// "write skipped" instead.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure (permissions, missing directory, disk full)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unserializable JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for API handlers.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type for persistent-tier operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
