//! Cache entries and keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A cached upstream response.
///
/// Only trusted while `now < expiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub expiry: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(data: Value, expiry: DateTime<Utc>) -> Self {
        Self { data, expiry }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }

    /// Object body written to the blob store
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

/// Store key for a cached response: `<prefix><sha256 of endpoint?canonical-query>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a request. Query pairs are sorted before hashing, so
    /// the same parameters in a different order share a key.
    pub fn derive(prefix: &str, endpoint: &str, query: &[(String, String)]) -> Self {
        let mut canonical = query.to_vec();
        canonical.sort();

        let mut hasher = Sha256::new();
        hasher.update(endpoint.as_bytes());
        hasher.update(b"?");
        hasher.update(uex_api::encode_query(&canonical).as_bytes());

        Self(format!("{}{}", prefix, hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
