//! Unified error types for the items service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Process-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage backend error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend errors.
///
/// The message is the driver's own, and is what clients see in 500 bodies.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection or query failure.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// No id left to assign.
    #[error("item id space exhausted")]
    IdsExhausted,
}

/// Reasons a create body is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NewItemError {
    /// Body was not parseable JSON.
    #[error("invalid JSON body: {0}")]
    Malformed(String),

    /// Body parsed but was not a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// A field held an array or object.
    #[error("field '{0}' must be a string")]
    InvalidField(&'static str),
}

/// Errors returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested item does not exist.
    #[error("Item not found")]
    NotFound,

    /// Backend failed while serving the request.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Backend unreachable during the readiness probe.
    #[error("not ready")]
    NotReady,

    /// Create body could not be used.
    #[error(transparent)]
    BadRequest(#[from] NewItemError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
            Self::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "status": "not ready" }),
            ),
            Self::BadRequest(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
