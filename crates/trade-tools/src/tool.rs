use std::sync::Arc;

use async_trait::async_trait;
use uex_api::{Payload, QueryParams, ResponseFormat};

use crate::error::Result;
use crate::proxy::CachedFetchProxy;
use crate::schema::ToolDescriptor;

/// A named operation the LLM can call
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    /// Run with already-validated query parameters
    async fn execute(&self, query: QueryParams) -> Result<Payload>;
}

/// Tool backed by one UEX endpoint read through the cached proxy
pub struct UexQueryTool {
    descriptor: ToolDescriptor,
    url: String,
    fixed_query: QueryParams,
    format: ResponseFormat,
    proxy: Arc<CachedFetchProxy>,
}

impl UexQueryTool {
    pub fn new(
        descriptor: ToolDescriptor,
        url: String,
        format: ResponseFormat,
        proxy: Arc<CachedFetchProxy>,
    ) -> Self {
        Self {
            descriptor,
            url,
            fixed_query: Vec::new(),
            format,
            proxy,
        }
    }

    /// Parameters always sent ahead of the caller's
    pub fn with_fixed_query(mut self, name: &str, value: &str) -> Self {
        self.fixed_query.push((name.to_string(), value.to_string()));
        self
    }
}

#[async_trait]
impl Tool for UexQueryTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, query: QueryParams) -> Result<Payload> {
        let mut full_query = self.fixed_query.clone();
        full_query.extend(query);

        Ok(self.proxy.fetch(&self.url, &full_query, self.format).await?)
    }
}
