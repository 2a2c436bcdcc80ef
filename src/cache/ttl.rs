//! TTL Cache
//!
//! A thread-safe map whose entries expire a fixed time after insertion.
//! There is no capacity bound and no recency ordering.

use parking_lot::RwLock;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A cache entry with value and metadata
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,
    /// When the entry was created
    pub created_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create a new cache entry living for `ttl`
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if this entry has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Get the age of this entry
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Cache with per-entry time-to-live
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a new cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get an unexpired entry. An expired entry is dropped and counts as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write();
            // Another caller may have refreshed it between the two locks.
            if entries.get(key).map_or(false, |e| e.is_expired()) {
                entries.remove(key);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or overwrite an entry with a fresh expiry
    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(key, CacheEntry::new(value, self.ttl));
    }

    /// Remove an entry from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().remove(key).map(|e| e.value)
    }

    /// Check if an unexpired entry exists
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .read()
            .get(key)
            .map_or(false, |e| !e.is_expired())
    }

    /// Number of stored entries, expired ones included until pruned
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Prune expired entries, returning how many were dropped
    pub fn prune_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired());
        before - entries.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        CacheStats { hits, misses, hit_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_ttl_cache_basic() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_no_capacity_bound() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(60));
        for i in 0..1000 {
            cache.insert(i, i);
        }
        assert_eq!(cache.len(), 1000);
        assert_eq!(cache.get(&0), Some(0));
    }

    #[test]
    fn test_ttl_expiration() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_millis(50));

        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), Some(1));

        thread::sleep(Duration::from_millis(80));

        assert!(!cache.contains("a"));
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_refreshes_expiry() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(60));
        cache.insert("a", 1);
        thread::sleep(Duration::from_millis(40));
        cache.insert("a", 2);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn test_prune_expired() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(30));
        cache.insert("a", 1);
        cache.insert("b", 2);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.prune_expired(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_stats() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));

        cache.insert("a".to_string(), 1);
        cache.get("a"); // Hit
        cache.get("a"); // Hit
        cache.get("b"); // Miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.666).abs() < 0.01);
    }
}
