//! StarTrader Service - trade-data tools, cache sweeping and chat relay
//!
//! Fronts the UEX trading API with a TTL cache, exposes each endpoint as a
//! callable tool, and relays chat to an OpenAI-compatible model that can
//! call those tools.

mod chat;
mod config;
mod error;
mod knowledge;
mod routes;
mod server;
mod types;

use std::sync::Arc;

use blob_store::{CacheStore, FileStore, MemoryStore};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};
use trade_tools::{CachedFetchProxy, ToolRegistry};
use uex_api::UexClient;

use crate::chat::{ChatRelay, DEFAULT_SYSTEM_PROMPT};
use crate::config::{Config, LlmConfig};
use crate::error::{Result, ServiceError};
use crate::server::{cors_layer, start_server, ServerState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("startrader_service=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting StarTrader service...");

    let config = Config::from_env();
    info!("Port: {}", config.port);
    info!("UEX API: {}", config.uex_base_url);
    info!("Cache prefix: {}", config.cache_prefix);

    let store: Arc<dyn CacheStore> = match &config.cache_dir {
        Some(dir) => {
            info!("Cache dir: {:?}", dir);
            let store = FileStore::new(dir.clone());
            store.init().await?;
            Arc::new(store)
        }
        None => {
            info!("Cache dir not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let upstream = Arc::new(UexClient::with_base_url(&config.uex_base_url));
    let proxy = Arc::new(
        CachedFetchProxy::new(store, upstream, config.cache_ttl_secs)
            .with_prefix(&config.cache_prefix)
            .with_sweep_on_write(config.sweep_on_write),
    );
    info!("Cache TTL: {} seconds", proxy.ttl().num_seconds());

    let registry = ToolRegistry::standard(proxy.clone(), &config.uex_base_url);
    info!("Registered {} tools", registry.len());

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET not set, /api/cleanup will reject every request");
    }

    let chat = build_chat_relay(&config.llm).await?;
    let cors = cors_layer(&config.cors_origins);

    let state: SharedState = Arc::new(ServerState::new(
        registry,
        proxy,
        config.cron_secret.clone(),
        chat,
    ));

    // Start HTTP server (blocking)
    start_server(state, cors, config.port)
        .await
        .map_err(|e| ServiceError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn build_chat_relay(llm: &LlmConfig) -> Result<Option<ChatRelay>> {
    let Some(api_key) = llm.api_key.clone() else {
        warn!("OPENAI_API_KEY not set, /api/chat is disabled");
        return Ok(None);
    };

    let system_prompt = match &llm.system_prompt_file {
        Some(path) => {
            info!("System prompt: {:?}", path);
            tokio::fs::read_to_string(path).await?
        }
        None => DEFAULT_SYSTEM_PROMPT.to_string(),
    };

    info!("Chat model: {}", llm.model);
    Ok(Some(ChatRelay::new(llm, api_key, system_prompt)))
}
