//! Knowledge base text prepended to the system prompt

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::chat::ChatError;

const CACHE_TTL_SECS: u64 = 300; // 5 minutes

/// Fetches the knowledge base document and keeps it in memory for a few minutes
pub struct KnowledgeBase {
    client: reqwest::Client,
    url: String,
    cache: Cache<String, Arc<str>>,
}

impl KnowledgeBase {
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Self {
            client,
            url: url.to_string(),
            cache,
        }
    }

    pub async fn load(&self) -> Result<Arc<str>, ChatError> {
        if let Some(cached) = self.cache.get(&self.url).await {
            return Ok(cached);
        }

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: format!("knowledge base fetch from {} failed", self.url),
            });
        }

        let text: Arc<str> = response.text().await?.into();
        debug!(url = %self.url, size = text.len(), "Loaded knowledge base");

        self.cache.insert(self.url.clone(), text.clone()).await;
        Ok(text)
    }
}
