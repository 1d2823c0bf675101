//! UEX API HTTP client

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Result, UpstreamError};
use crate::types::{Endpoint, Payload, ResponseFormat};

/// Source of upstream responses for the fetch proxy.
///
/// Implemented by [`UexClient`] over HTTP; tests substitute counting fakes.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue a `GET` to `url` with `query` appended and decode the body
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        format: ResponseFormat,
    ) -> Result<Payload>;
}

/// Percent-encode query pairs in the given order
pub fn encode_query(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Client for the UEX trading-data API
pub struct UexClient {
    http: reqwest::Client,
    base_url: String,
}

impl UexClient {
    /// Base URL for UEX API v2
    pub const BASE_URL: &'static str = "https://api.uexcorp.space/2.0";

    /// Create a new client with default settings (30 second timeout)
    pub fn new() -> Self {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Create a new client against a different deployment of the API
    pub fn with_base_url(base_url: &str) -> Self {
        Self::with_base_url_and_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_base_url_and_timeout(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }
}

impl Default for UexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for UexClient {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        format: ResponseFormat,
    ) -> Result<Payload> {
        let full_url = if query.is_empty() {
            url.to_string()
        } else {
            format!("{}?{}", url, encode_query(query))
        };

        debug!(url = %full_url, "Fetching from UEX");

        let response = self.http.get(&full_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = %status, url = %full_url, "UEX returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                url: full_url,
            });
        }

        let body = response.text().await?;
        debug!(size = body.len(), url = %full_url, "Fetched from UEX");

        match format {
            ResponseFormat::Text => Ok(Payload::Text(body)),
            ResponseFormat::Json => Ok(Payload::Json(serde_json::from_str(&body)?)),
        }
    }
}
