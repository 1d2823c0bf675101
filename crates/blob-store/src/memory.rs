//! In-process blob store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{validate_key, CacheStore};
use crate::types::StoredObject;

struct MemoryObject {
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// Blob store held in memory. Used for local development and tests.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with an explicit last-modified time
    pub async fn insert_with_modified(
        &self,
        key: &str,
        body: Vec<u8>,
        last_modified: DateTime<Utc>,
    ) -> Result<()> {
        validate_key(key)?;
        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                body,
                last_modified,
            },
        );
        Ok(())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|object| object.body.clone()))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.insert_with_modified(key, body, Utc::now()).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let objects = self.objects.read().await;
        let mut listing: Vec<StoredObject> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| StoredObject {
                key: key.clone(),
                last_modified: object.last_modified,
                size: object.body.len() as u64,
            })
            .collect();
        listing.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store.put("cache/a", b"hello".to_vec()).await.unwrap();

        assert_eq!(store.get("cache/a").await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(store.len().await, 1);

        store.delete("cache/a").await.unwrap();
        assert_eq!(store.get("cache/a").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("cache/missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("cache/a", b"one".to_vec()).await.unwrap();
        store.put("cache/a", b"two".to_vec()).await.unwrap();
        assert_eq!(store.get("cache/a").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let store = MemoryStore::new();
        let modified = Utc::now() - Duration::minutes(5);
        store
            .insert_with_modified("cache/b", b"bb".to_vec(), modified)
            .await
            .unwrap();
        store.put("cache/a", b"a".to_vec()).await.unwrap();
        store.put("other/c", b"c".to_vec()).await.unwrap();

        let listing = store.list_by_prefix("cache/").await.unwrap();
        let keys: Vec<&str> = listing.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["cache/a", "cache/b"]);
        assert_eq!(listing[1].last_modified, modified);
        assert_eq!(listing[1].size, 2);
    }

    #[tokio::test]
    async fn test_rejects_invalid_key() {
        let store = MemoryStore::new();
        assert!(store.put("../escape", vec![]).await.is_err());
    }
}
