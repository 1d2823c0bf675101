use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::types::StoredObject;

/// Blob storage capability shared by the fetch proxy and the sweeper.
///
/// Writes are last-write-wins and there is no locking between callers: a read
/// may observe an object that a concurrent delete is about to remove.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read an object body, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace an object
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Remove an object. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List every object whose key starts with `prefix`
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>>;
}

/// Reject keys that cannot be mapped safely onto a path-like namespace
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        // Dot-prefixed segments are reserved for in-flight temp files
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment.starts_with('.'));

    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
