use crate::persistence::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for TcelFlow operations
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid import format: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TaskNotFound(_) | Self::PersonNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidValue(_) | Self::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::QuotaExceeded { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Implement IntoResponse for Axum integration
impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for TcelFlow operations
pub type Result<T> = std::result::Result<T, FlowError>;
