//! HTTP server for the StarTrader service
//!
//! Provides /health, /api/tools, /api/tools/{name}, /api/cleanup and /api/chat.

use std::sync::Arc;

use axum::http::{header, Method};
use axum::response::Json;
use axum::routing::{get, post};
use axum::{extract::State, Router};
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use trade_tools::{CachedFetchProxy, Sweeper, ToolRegistry};

use crate::chat::ChatRelay;
use crate::routes;
use crate::types::HealthResponse;

/// Shared state for the HTTP server
pub struct ServerState {
    pub registry: ToolRegistry,
    pub proxy: Arc<CachedFetchProxy>,
    pub sweeper: Sweeper,
    pub cron_secret: Option<String>,
    pub chat: Option<ChatRelay>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(
        registry: ToolRegistry,
        proxy: Arc<CachedFetchProxy>,
        cron_secret: Option<String>,
        chat: Option<ChatRelay>,
    ) -> Self {
        let sweeper = proxy.sweeper();
        Self {
            registry,
            proxy,
            sweeper,
            cron_secret,
            chat,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// CORS policy from the configured origins (`*` allows any origin)
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the HTTP router
pub fn create_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tools", get(routes::tools::list_tools))
        .route("/api/tools/{name}", post(routes::tools::call_tool))
        .route("/api/cleanup", get(routes::cleanup::cleanup))
        .route("/api/chat", post(routes::chat::chat))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, cors: CorsLayer, port: u16) -> std::io::Result<()> {
    let router = create_router(state, cors);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        tools: state.registry.len(),
        cache: state.proxy.stats(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use blob_store::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trade_tools::{Payload, ResponseFormat, DEFAULT_TTL_SECS};
    use uex_api::{Upstream, UpstreamError};

    pub const BASE: &str = "https://api.uexcorp.space/2.0";

    /// Upstream that counts calls; moons always fail
    #[derive(Default)]
    pub struct FakeUpstream {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl Upstream for FakeUpstream {
        async fn get(
            &self,
            url: &str,
            query: &[(String, String)],
            format: ResponseFormat,
        ) -> uex_api::Result<Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.ends_with("/moons") {
                return Err(UpstreamError::Status {
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                    url: url.to_string(),
                });
            }
            Ok(match format {
                ResponseFormat::Text => Payload::Text("top routes".to_string()),
                ResponseFormat::Json => Payload::Json(json!({ "status": "ok", "query": query })),
            })
        }
    }

    pub fn create_test_state(
        store: Arc<MemoryStore>,
        upstream: Arc<FakeUpstream>,
        cron_secret: Option<&str>,
    ) -> SharedState {
        let proxy = Arc::new(CachedFetchProxy::new(store, upstream, DEFAULT_TTL_SECS));
        let registry = ToolRegistry::standard(proxy.clone(), BASE);
        Arc::new(ServerState::new(
            registry,
            proxy,
            cron_secret.map(str::to_string),
            None,
        ))
    }

    pub fn test_router(state: SharedState) -> Router {
        create_router(state, cors_layer(&["*".to_string()]))
    }
}
