//! Cron-triggered sweep of stale cache entries

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::error::AppError;
use crate::server::SharedState;
use crate::types::CleanupResponse;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Compare secrets without an early exit on the first differing byte.
/// Hashing first gives both sides the same length.
fn secrets_match(expected: &str, supplied: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let supplied = Sha256::digest(supplied.as_bytes());
    expected
        .iter()
        .zip(supplied.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Delete cache entries older than the TTL.
///
/// Requires `Authorization: Bearer <CRON_SECRET>`. With no secret configured
/// every request is rejected.
pub async fn cleanup(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let authorized = match (&state.cron_secret, bearer_token(&headers)) {
        (Some(secret), Some(token)) => secrets_match(secret, token),
        _ => false,
    };
    if !authorized {
        warn!("Rejected cleanup request");
        return AppError::Unauthorized.into_response();
    }

    match state.sweeper.sweep(Utc::now()).await {
        Ok(report) => Json(CleanupResponse {
            message: "Cleanup complete".to_string(),
            scanned: report.scanned,
            deleted_files: report.deleted,
            failed_files: report.failed,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, "Cache sweep failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to clean up files",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
