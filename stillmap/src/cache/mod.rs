//! TTL byte-buffer cache for fetched tiles.
//!
//! Backed by `moka::future::Cache`, which uses lock-free structures
//! internally and is safe to share across concurrent renders without
//! starving the Tokio runtime. Entries expire on a time-to-live basis;
//! an optional entry-capacity bound adds LRU-style eviction on top for
//! deployments that cannot run unbounded.

use std::time::Duration;

use bytes::Bytes;
use moka::future::Cache;

/// Default entry time-to-live: one hour.
pub const DEFAULT_TILE_TTL: Duration = Duration::from_secs(3600);

/// Builds the cache key for a tile request.
///
/// Keys are the normalized method plus URL; only GET is ever issued.
pub fn cache_key(url: &str) -> String {
    format!("GET {url}")
}

/// A shared TTL cache for tile bodies.
///
/// The disabled mode makes every `get` a miss and every `insert` a no-op,
/// so call sites never need to know whether caching is on.
pub struct TileCache {
    inner: Option<Cache<String, Bytes>>,
}

impl TileCache {
    /// Creates a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().time_to_live(ttl).build();
        Self { inner: Some(cache) }
    }

    /// Creates a TTL cache additionally bounded to `max_entries`, evicting
    /// least-recently-used entries once full.
    pub fn with_capacity(ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_entries)
            .build();
        Self { inner: Some(cache) }
    }

    /// Creates a disabled cache: always misses, never stores.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// True unless this cache was created with [`TileCache::disabled`].
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Looks up a cached body. Expired entries are never returned.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Stores a body under `key`. No-op when disabled.
    pub async fn insert(&self, key: String, body: Bytes) {
        if let Some(cache) = &self.inner {
            cache.insert(key, body).await;
        }
    }

    /// Drops every entry.
    pub async fn flush(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
            // Make the invalidation visible to subsequent gets.
            cache.run_pending_tasks().await;
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_TTL)
    }
}
