//! Error types for agora-reader
//!
//! Structural failures (transport, rejected status, malformed body) surface
//! as errors. A missing topic is a 404, not a fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::record_store::StoreError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Record store call failed (502)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Store(StoreError::Unavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "STORE_UNAVAILABLE")
            }
            ApiError::Store(StoreError::RemoteRejected { .. }) => {
                (StatusCode::BAD_GATEWAY, "STORE_REJECTED")
            }
            ApiError::Store(StoreError::MalformedResponse(_)) => {
                (StatusCode::BAD_GATEWAY, "STORE_MALFORMED")
            }
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
