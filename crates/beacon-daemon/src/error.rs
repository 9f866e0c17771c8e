//! Error types for beacon-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use beacon_registry::RegistryError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No instance matched a find request; carries the service name
    #[error("{0} not found")]
    ServiceNotFound(String),

    /// Bad request (e.g. malformed version range)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { name } => ApiError::ServiceNotFound(name),
            RegistryError::InvalidVersionRange { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

/// Generic error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Message payload of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Existing clients expect the not-found shape under "result".
            ApiError::ServiceNotFound(name) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "result": format!("{name} not found") })),
            )
                .into_response(),
            ApiError::BadRequest(_) => error_response(StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let body = ErrorResponse {
        error: ErrorBody { message },
    };
    (status, Json(body)).into_response()
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
