//! Read-mostly, single-writer-multiple-reader cache shared by the
//! enrichment clients (§4.4, §5 shared-resource policy).
//!
//! Grounded in the teacher's `StewardshipState.channels` pattern
//! (`api/stewardship_routes.rs`): a double-checked `RwLock<HashMap<_>>`
//! with writes resolved last-write-wins by a version timestamp.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Clone)]
struct Entry<V> {
    value: V,
    cached_at: Instant,
}

/// A cache keyed by `K`, optionally expiring entries after a TTL.
/// `ttl = None` means entries never expire (place identity, coordinates).
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    ttl: Option<Duration>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the cached value if present and, when a TTL is configured,
    /// still fresh. A stale entry is treated as absent so the caller
    /// refreshes it before use (§8: "cached_at is within its TTL when
    /// read, else it is refreshed before use").
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if let Some(ttl) = self.ttl {
            if entry.cached_at.elapsed() > ttl {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    /// Last-write-wins insert, versioned by wall-clock order of arrival.
    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                cached_at: Instant::now(),
            },
        );
    }
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expires_after_ttl() {
        let cache: TtlCache<String, i32> = TtlCache::new(Some(Duration::from_millis(10)));
        cache.put("k".to_string(), 1).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn no_ttl_never_expires() {
        let cache: TtlCache<String, i32> = TtlCache::new(None);
        cache.put("k".to_string(), 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some(1));
    }

    #[tokio::test]
    async fn put_overwrites_last_write_wins() {
        let cache: TtlCache<String, i32> = TtlCache::new(None);
        cache.put("k".to_string(), 1).await;
        cache.put("k".to_string(), 2).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some(2));
    }
}
