//! Filesystem-backed blob store
//!
//! Keys map onto paths below a root directory (`cache/ab12` becomes
//! `<root>/cache/ab12`). Writes go to a dot-prefixed temp file in the same
//! directory and are renamed into place, so readers never observe a partial
//! body. Last-modified times come from file metadata.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info};

use crate::error::Result;
use crate::store::{validate_key, CacheStore};
use crate::types::StoredObject;

/// Blob store rooted at a directory on local disk
pub struct FileStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Create the root directory if needed
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!(root = ?self.root, "Initialized file store");
        Ok(())
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    fn tmp_path(&self, path: &Path) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
    }

    /// Deepest directory that can hold keys starting with `prefix`
    fn listing_root(&self, prefix: &str) -> PathBuf {
        match prefix.rsplit_once('/') {
            Some((dir, _)) if validate_key(dir).is_ok() => {
                dir.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
            }
            _ => self.root.clone(),
        }
    }

    fn relative_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(key)?;
        match fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path(&path);
        fs::write(&tmp, &body).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(key, size = body.len(), "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let mut listing = Vec::new();
        let mut pending = vec![self.listing_root(prefix)];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }

                let metadata = entry.metadata().await?;
                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }

                let Some(key) = self.relative_key(&path) else {
                    continue;
                };
                if !key.starts_with(prefix) {
                    continue;
                }

                let last_modified: DateTime<Utc> = metadata.modified()?.into();
                listing.push(StoredObject {
                    key,
                    last_modified,
                    size: metadata.len(),
                });
            }
        }

        listing.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("cache/abc", b"{\"a\":1}".to_vec()).await.unwrap();
        assert!(dir.path().join("cache").join("abc").exists());
        assert_eq!(
            store.get("cache/abc").await.unwrap(),
            Some(b"{\"a\":1}".to_vec())
        );

        store.delete("cache/abc").await.unwrap();
        assert_eq!(store.get("cache/abc").await.unwrap(), None);
        assert!(store.delete("cache/abc").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert_eq!(store.get("cache/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_by_prefix_walks_subdirectories() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("cache/one", b"1".to_vec()).await.unwrap();
        store.put("cache/nested/two", b"22".to_vec()).await.unwrap();
        store.put("unrelated/three", b"3".to_vec()).await.unwrap();

        let listing = store.list_by_prefix("cache/").await.unwrap();
        let keys: Vec<&str> = listing.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["cache/nested/two", "cache/one"]);
        assert_eq!(listing[0].size, 2);

        let age = Utc::now() - listing[1].last_modified;
        assert!(age.num_seconds() < 60);
    }

    #[tokio::test]
    async fn test_list_starts_at_prefix_directory() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("cache/one", b"1".to_vec()).await.unwrap();
        store.put("cache/nested/two", b"2".to_vec()).await.unwrap();
        store.put("cached/three", b"3".to_vec()).await.unwrap();

        assert_eq!(
            store.listing_root("cache/nested/"),
            dir.path().join("cache").join("nested")
        );
        assert_eq!(store.listing_root("cache"), dir.path().to_path_buf());
        assert_eq!(store.listing_root("../"), dir.path().to_path_buf());

        let nested = store.list_by_prefix("cache/nested/").await.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].key, "cache/nested/two");

        let partial = store.list_by_prefix("cache/o").await.unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].key, "cache/one");

        let bare = store.list_by_prefix("cache").await.unwrap();
        let keys: Vec<&str> = bare.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["cache/nested/two", "cache/one", "cached/three"]);
    }

    #[tokio::test]
    async fn test_list_on_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert!(store.list_by_prefix("cache/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.put("cache/../../etc/passwd", vec![]).await.is_err());
        assert!(store.get("/absolute").await.is_err());
    }
}
