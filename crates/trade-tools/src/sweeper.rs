//! Stale-entry sweeps over the cache namespace

use std::sync::Arc;

use blob_store::CacheStore;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

/// Deletes cache objects older than the TTL.
///
/// Age comes from the store's last-modified metadata. A failed delete is
/// logged and recorded without stopping the rest of the sweep.
#[derive(Clone)]
pub struct Sweeper {
    store: Arc<dyn CacheStore>,
    prefix: String,
    ttl: Duration,
}

impl Sweeper {
    pub fn new(store: Arc<dyn CacheStore>, prefix: &str, ttl: Duration) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
            ttl,
        }
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> blob_store::Result<SweepReport> {
        let objects = self.store.list_by_prefix(&self.prefix).await?;
        info!(prefix = %self.prefix, count = objects.len(), "Sweeping cache");

        let mut report = SweepReport {
            scanned: objects.len(),
            ..Default::default()
        };

        for object in objects {
            let age = object.age(now);
            debug!(key = %object.key, age_secs = age.num_seconds(), "Checking cache entry");

            if age <= self.ttl {
                continue;
            }

            match self.store.delete(&object.key).await {
                Ok(()) => {
                    debug!(key = %object.key, "Deleted stale cache entry");
                    report.deleted.push(object.key);
                }
                Err(e) => {
                    warn!(key = %object.key, error = %e, "Failed to delete stale cache entry");
                    report.failed.push(object.key);
                }
            }
        }

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Cache sweep complete"
        );
        Ok(report)
    }
}
