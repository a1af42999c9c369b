//! Memoization layer
//!
//! Reductions are pure functions of `(input, type)` over an immutable table
//! snapshot, so results never go stale: entries leave the cache only under
//! capacity pressure. The cache must tolerate concurrent reads and
//! concurrent first-writes for the same key; duplicate computation is
//! acceptable (results are deterministic), a torn map is not.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::config::ReductionType;
use crate::error::HlaError;

/// Statistics for cache usage
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of items currently in cache
    pub size: usize,
    /// Maximum cache capacity
    pub capacity: usize,
    /// Number of evictions
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Thread-safe bounded LRU cache
///
/// Reads take the shared lock only; access times are stamped at insert, not
/// on read, trading exact recency for uncontended lookups. Counter updates
/// use `Relaxed` ordering; statistics may drift slightly under load.
#[derive(Debug)]
pub struct LruCache<K: Hash + Eq + Clone, V: Clone> {
    entries: RwLock<HashMap<K, (V, u64)>>,
    capacity: usize,
    access_counter: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Create a cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Look up a value
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap();
        if let Some((value, _)) = entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(value.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a value, evicting the least recently inserted entry at capacity
    pub fn insert(&self, key: K, value: V) {
        let access = self.access_counter.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.write().unwrap();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            if let Some(lru_key) = entries
                .iter()
                .min_by_key(|(_, (_, stamp))| *stamp)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&lru_key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        entries.insert(key, (value, access));
    }

    /// Return the cached value, or compute it; only `Ok` results are cached
    /// so error paths always re-derive their full context.
    pub fn get_or_try_compute<F>(&self, key: K, compute: F) -> Result<V, HlaError>
    where
        F: FnOnce() -> Result<V, HlaError>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Current statistics snapshot
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: entries.len(),
            capacity: self.capacity,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The engine's memoization caches, one per memoized operation
#[derive(Debug)]
pub struct ReduceCache {
    /// Full GL String reductions keyed by `(input, type)`
    pub reduce: LruCache<(String, ReductionType), String>,
    /// Single-allele reductions keyed by `(allele, type)`
    pub allele: LruCache<(String, ReductionType), String>,
    /// MAC recognition results keyed by token
    pub mac: LruCache<String, bool>,
}

impl ReduceCache {
    /// Create the cache set, each cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            reduce: LruCache::new(capacity),
            allele: LruCache::new(capacity),
            mac: LruCache::new(capacity),
        }
    }

    /// Drop every entry in every cache
    pub fn clear(&self) {
        self.reduce.clear();
        self.allele.clear();
        self.mac.clear();
    }

    /// Statistics for all caches, keyed by operation name
    pub fn stats(&self) -> HashMap<&'static str, CacheStats> {
        let mut stats = HashMap::new();
        stats.insert("reduce", self.reduce.stats());
        stats.insert("reduce_allele", self.allele.stats());
        stats.insert("is_mac", self.mac.stats());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_insert() {
        let cache: LruCache<String, i32> = LruCache::new(4);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        assert_eq!(cache.get(&"a".into()), Some(1));
        assert_eq!(cache.get(&"b".into()), Some(2));
        assert_eq!(cache.get(&"c".into()), None);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let cache: LruCache<String, i32> = LruCache::new(2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("c".into(), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".into()), None);
        assert_eq!(cache.get(&"c".into()), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_update_existing_does_not_evict() {
        let cache: LruCache<String, i32> = LruCache::new(2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        cache.insert("a".into(), 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".into()), Some(10));
        assert_eq!(cache.get(&"b".into()), Some(2));
    }

    #[test]
    fn test_get_or_try_compute_caches_ok() {
        let cache: LruCache<String, i32> = LruCache::new(4);
        let v = cache.get_or_try_compute("k".into(), || Ok(7)).unwrap();
        assert_eq!(v, 7);
        // second call hits the cache
        let v = cache
            .get_or_try_compute("k".into(), || panic!("should not recompute"))
            .unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn test_get_or_try_compute_skips_err() {
        let cache: LruCache<String, i32> = LruCache::new(4);
        let err = cache
            .get_or_try_compute("k".into(), || Err(HlaError::invalid_allele("A*99:99")))
            .unwrap_err();
        assert!(matches!(err, HlaError::InvalidAllele { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats() {
        let cache: LruCache<String, i32> = LruCache::new(8);
        cache.insert("a".into(), 1);
        cache.get(&"a".into());
        cache.get(&"b".into());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_hit_rate_zero_total() {
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reduce_cache_clear() {
        let cache = ReduceCache::new(8);
        cache
            .reduce
            .insert(("A*01:01".into(), ReductionType::Lgx), "A*01:01".into());
        cache.mac.insert("A*01:AB".into(), true);
        cache.clear();
        assert!(cache.reduce.is_empty());
        assert!(cache.mac.is_empty());
    }

    #[test]
    fn test_reduce_cache_stats_keys() {
        let stats = ReduceCache::new(8).stats();
        assert!(stats.contains_key("reduce"));
        assert!(stats.contains_key("reduce_allele"));
        assert!(stats.contains_key("is_mac"));
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(64));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200u32 {
                        let key = i % 32;
                        cache.insert(key, key * t);
                        let _ = cache.get(&key);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 64);
    }
}
