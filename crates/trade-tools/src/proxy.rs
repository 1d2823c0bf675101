//! TTL-cached fetch proxy in front of the trading-data API

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use blob_store::CacheStore;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uex_api::{Payload, ResponseFormat, Upstream};

use crate::entry::{CacheEntry, CacheKey};
use crate::sweeper::Sweeper;

/// Namespace for cache objects in the blob store
pub const DEFAULT_CACHE_PREFIX: &str = "cache/";
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;
/// Longest TTL the proxy accepts (one year); larger values are clamped
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Counters reported on the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyStats {
    pub hits: u64,
    pub misses: u64,
    pub upstream_errors: u64,
    pub store_errors: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    upstream_errors: AtomicU64,
    store_errors: AtomicU64,
}

/// Caches upstream `GET` responses in a blob store for a fixed TTL.
///
/// Store failures never fail a fetch: a failed read is a miss and a failed
/// write is dropped. Concurrent misses for the same key are not coalesced;
/// each one reaches upstream and the last write wins.
pub struct CachedFetchProxy {
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn Upstream>,
    prefix: String,
    ttl: Duration,
    sweep_on_write: bool,
    sweeping: Arc<AtomicBool>,
    counters: Counters,
}

impl CachedFetchProxy {
    pub fn new(store: Arc<dyn CacheStore>, upstream: Arc<dyn Upstream>, ttl_secs: u64) -> Self {
        if ttl_secs > MAX_TTL_SECS {
            warn!(ttl_secs, max = MAX_TTL_SECS, "Cache TTL out of range, clamping");
        }
        let ttl = i64::try_from(ttl_secs.min(MAX_TTL_SECS))
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TTL_SECS as i64));

        Self {
            store,
            upstream,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
            ttl,
            sweep_on_write: false,
            sweeping: Arc::new(AtomicBool::new(false)),
            counters: Counters::default(),
        }
    }

    /// Namespace keys under a different prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Run a background sweep after cache writes. At most one runs at a time;
    /// writes that land while a sweep is running do not start another.
    pub fn with_sweep_on_write(mut self, enabled: bool) -> Self {
        self.sweep_on_write = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sweeper over the same store, prefix and TTL
    pub fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.store.clone(), &self.prefix, self.ttl)
    }

    pub fn stats(&self) -> ProxyStats {
        ProxyStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            upstream_errors: self.counters.upstream_errors.load(Ordering::Relaxed),
            store_errors: self.counters.store_errors.load(Ordering::Relaxed),
        }
    }

    /// Fetch `endpoint?query`, serving from cache while the entry is fresh
    pub async fn fetch(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        format: ResponseFormat,
    ) -> uex_api::Result<Payload> {
        let key = CacheKey::derive(&self.prefix, endpoint, query);

        if let Some(payload) = self.lookup(&key, format, Utc::now()).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, endpoint, "Cache hit");
            return Ok(payload);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, endpoint, "Cache miss");

        let payload = match self.upstream.get(endpoint, query, format).await {
            Ok(payload) => payload,
            Err(e) => {
                self.counters.upstream_errors.fetch_add(1, Ordering::Relaxed);
                warn!(endpoint, error = %e, "Upstream fetch failed");
                return Err(e);
            }
        };

        self.store_entry(&key, &payload, Utc::now()).await;
        Ok(payload)
    }

    async fn lookup(
        &self,
        key: &CacheKey,
        format: ResponseFormat,
        now: DateTime<Utc>,
    ) -> Option<Payload> {
        let body = match self.store.get(key.as_str()).await {
            Ok(Some(body)) => body,
            Ok(None) => return None,
            Err(e) => {
                self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Cache read failed, fetching directly");
                return None;
            }
        };

        let entry = match CacheEntry::decode(&body) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring undecodable cache entry");
                return None;
            }
        };

        if !entry.is_fresh(now) {
            debug!(key = %key, expiry = %entry.expiry, "Evicting expired cache entry");
            if let Err(e) = self.store.delete(key.as_str()).await {
                self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Failed to evict expired cache entry");
            }
            return None;
        }

        let payload = Payload::from_value(format, entry.data);
        if payload.is_none() {
            warn!(key = %key, "Cached entry does not match response format");
        }
        payload
    }

    async fn store_entry(&self, key: &CacheKey, payload: &Payload, now: DateTime<Utc>) {
        let Some(expiry) = now.checked_add_signed(self.ttl) else {
            warn!(key = %key, "Cache expiry out of range, not caching");
            return;
        };
        let entry = CacheEntry::new(payload.clone().into_value(), expiry);
        let body = match entry.encode() {
            Ok(body) => body,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.store.put(key.as_str(), body).await {
            self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
            warn!(key = %key, error = %e, "Failed to cache response");
            return;
        }
        debug!(key = %key, expiry = %entry.expiry, "Cached response");

        if self.sweep_on_write {
            if self
                .sweeping
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!("Cache sweep already running");
                return;
            }

            let sweeper = self.sweeper();
            let sweeping = self.sweeping.clone();
            tokio::spawn(async move {
                if let Err(e) = sweeper.sweep(Utc::now()).await {
                    warn!(error = %e, "Background cache sweep failed");
                }
                sweeping.store(false, Ordering::Release);
            });
        }
    }
}
