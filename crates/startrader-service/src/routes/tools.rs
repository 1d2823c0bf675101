//! Tool catalogue and direct tool invocation

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::{json, Value};
use tracing::info;
use trade_tools::ToolArgs;

use crate::error::AppError;
use crate::server::SharedState;

/// List the tool catalogue as function specs
pub async fn list_tools(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(state.registry.function_specs())
}

/// Run one tool. An empty body means no arguments.
pub async fn call_tool(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let args: ToolArgs = if body.iter().all(u8::is_ascii_whitespace) {
        ToolArgs::new()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            AppError::BadRequest(format!("Arguments must be a JSON object: {}", e))
        })?
    };

    info!(tool = %name, args = args.len(), "Running tool");
    let result = state.registry.run_function(&name, args).await?;

    Ok(Json(json!({ "result": result.into_value() })))
}
