//! Tool registry and cached fetch proxy for the StarTrader assistant
//!
//! The LLM calls tools by name with a bag of primitive arguments. The
//! [`ToolRegistry`] validates the call and hands it to the backing [`Tool`],
//! which for the standard catalogue is a single read through the
//! [`CachedFetchProxy`]. The proxy keeps upstream responses in a blob store
//! for a fixed TTL, and the [`Sweeper`] reclaims entries that outlived it.

mod catalog;
mod entry;
mod error;
mod proxy;
mod registry;
mod schema;
mod sweeper;
mod tool;

pub use catalog::uex_tools;
pub use entry::{CacheEntry, CacheKey};
pub use error::{Result, ToolError};
pub use proxy::{
    CachedFetchProxy, ProxyStats, DEFAULT_CACHE_PREFIX, DEFAULT_TTL_SECS, MAX_TTL_SECS,
};
pub use registry::{validate, ToolArgs, ToolRegistry};
pub use schema::{ParameterKind, ParameterSchema, ParameterSpec, ToolDescriptor};
pub use sweeper::{SweepReport, Sweeper};
pub use tool::{Tool, UexQueryTool};

pub use uex_api::{Payload, QueryParams, ResponseFormat};
