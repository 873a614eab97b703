//! Keyed, time-boxed cache for rendered feed pages.
//!
//! The global feed is served from this cache for a short configured
//! interval: a request landing inside the window gets the exact bytes the
//! first request rendered, even if the underlying rows changed in between.
//! Keys are route-plus-query strings, values are rendered response bodies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::RwLock;

/// A cached response body with its expiry deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    body: Bytes,
    expires_at: Instant,
}

/// Keyed TTL cache for rendered response bodies.
#[derive(Clone)]
pub struct PageCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl PageCache {
    /// Create a cache whose entries expire `ttl_secs` seconds after insertion.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a cache with an explicit [`Duration`] TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up a live entry. Expired entries are treated as absent.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.body.clone())
    }

    /// Store a rendered body under `key`, replacing any previous entry.
    ///
    /// Dead entries are pruned on the same write lock, so the map stays
    /// bounded by the number of distinct keys seen within one TTL window.
    pub async fn put(&self, key: impl Into<String>, body: Bytes) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.into(),
            CacheEntry {
                body,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Number of stored entries, live or expired.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_within_ttl() {
        let cache = PageCache::new(60);
        cache.put("/", Bytes::from_static(b"feed page")).await;

        let hit = cache.get("/").await;
        assert_eq!(hit, Some(Bytes::from_static(b"feed page")));
    }

    #[tokio::test]
    async fn test_miss_on_unknown_key() {
        let cache = PageCache::new(60);
        assert!(cache.get("/?page=2").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = PageCache::new(60);
        cache.put("/", Bytes::from_static(b"page one")).await;
        cache.put("/?page=2", Bytes::from_static(b"page two")).await;

        assert_eq!(cache.get("/").await, Some(Bytes::from_static(b"page one")));
        assert_eq!(
            cache.get("/?page=2").await,
            Some(Bytes::from_static(b"page two"))
        );
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = PageCache::with_ttl(Duration::from_millis(20));
        cache.put("/", Bytes::from_static(b"stale soon")).await;

        assert!(cache.get("/").await.is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("/").await.is_none());
    }

    #[tokio::test]
    async fn test_cached_bytes_survive_source_changes() {
        // The cache answers from stored bytes alone; whatever happened to
        // the rows behind them is invisible until the entry expires.
        let cache = PageCache::new(60);
        cache.put("/", Bytes::from_static(b"thirteen posts")).await;

        let first = cache.get("/").await;
        let second = cache.get("/").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_put_replaces_and_prunes() {
        let cache = PageCache::with_ttl(Duration::from_millis(10));
        cache.put("/a", Bytes::from_static(b"a")).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        cache.put("/b", Bytes::from_static(b"b")).await;
        // The expired "/a" entry was pruned by the write.
        assert_eq!(cache.len().await, 1);
    }
}
