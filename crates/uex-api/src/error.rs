//! Error types for the UEX API client

use std::fmt;

/// Errors that can occur when fetching from the trading-data API
#[derive(Debug)]
pub enum UpstreamError {
    /// Non-2xx response
    Status {
        status: u16,
        reason: String,
        url: String,
    },
    /// Transport failure
    Http(reqwest::Error),
    /// Body was not valid JSON
    Json(serde_json::Error),
}

impl UpstreamError {
    /// HTTP status of the failed response, if the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) => None,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status {
                status,
                reason,
                url,
            } => write!(f, "Failed to fetch {}: {} {}", url, status, reason),
            Self::Http(e) => write!(f, "UEX HTTP error: {}", e),
            Self::Json(e) => write!(f, "UEX JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for UEX API operations
pub type Result<T> = std::result::Result<T, UpstreamError>;
