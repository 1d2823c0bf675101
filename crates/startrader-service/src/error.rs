//! Error types for the StarTrader service

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use trade_tools::ToolError;

/// Startup failures
#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Io(Box<std::io::Error>),
    Store(blob_store::StoreError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
            ServiceError::Store(err) => write!(f, "Cache store error: {}", err),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Io(err) => Some(err.as_ref()),
            ServiceError::Store(err) => Some(err),
            ServiceError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(Box::new(err))
    }
}

impl From<blob_store::StoreError> for ServiceError {
    fn from(err: blob_store::StoreError) -> Self {
        ServiceError::Store(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ServiceError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Request error that converts to an HTTP response
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    BadGateway(String),
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            AppError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Upstream failure");
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<ToolError> for AppError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::UnknownTool(_) => AppError::NotFound(e.to_string()),
            ToolError::MissingParameter(_) | ToolError::InvalidArgument { .. } => {
                AppError::BadRequest(e.to_string())
            }
            ToolError::Upstream(_) => AppError::BadGateway(e.to_string()),
        }
    }
}
