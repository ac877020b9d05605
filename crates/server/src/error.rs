//! API error type and its HTTP mapping.

use agentops_core::CoreError;
use agentops_reporting::MonitorError;
use agentops_storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Errors returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing record, or one owned by another tenant
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Request conflicts with the record's current state
    #[error("{0}")]
    Conflict(String),

    /// The inference backend failed
    #[error("inference failed: {0}")]
    BadGateway(String),

    /// Lifecycle rule violation
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reporting failure
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status and machine-readable code.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "inference_error"),
            ApiError::Core(CoreError::InvalidTransition { .. }) => (StatusCode::CONFLICT, "invalid_transition"),
            ApiError::Core(CoreError::UnknownStatus(_)) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Storage(_) | ApiError::Monitor(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string(), "code": code }))).into_response()
    }
}
