//! LRU cache for decoded volume bricks.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::CacheStats;

/// Cache key for bricks: (dataset_id_hash, level, brick coords `[t, z, y, x]`).
pub type BrickKey = (u64, u32, [u64; 4]);

/// LRU cache for decoded bricks with memory-bounded eviction.
pub struct BrickCache {
    cache: LruCache<BrickKey, Vec<f32>>,
    memory_limit: usize,
    current_memory: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl BrickCache {
    /// Create a new brick cache with the given memory limit in bytes.
    pub fn new(memory_limit: usize) -> Self {
        // Estimate max entries assuming ~1MB per brick
        let brick_size_estimate = 1024 * 1024;
        let max_entries = (memory_limit / brick_size_estimate).max(16);

        Self {
            cache: LruCache::new(NonZeroUsize::new(max_entries).unwrap()),
            memory_limit,
            current_memory: 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Try to get a brick from the cache.
    ///
    /// Returns `Some(data)` if found (cache hit), `None` if not found (cache miss).
    pub fn get(&mut self, key: &BrickKey) -> Option<&Vec<f32>> {
        if let Some(data) = self.cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(data)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert a brick into the cache.
    ///
    /// If the cache is at capacity, the least recently used entries
    /// will be evicted to make room.
    pub fn insert(&mut self, key: BrickKey, data: Vec<f32>) {
        let data_size = data.len() * std::mem::size_of::<f32>();

        // Evict if necessary to make room
        while self.current_memory + data_size > self.memory_limit && !self.cache.is_empty() {
            if let Some((_, evicted)) = self.cache.pop_lru() {
                let evicted_size = evicted.len() * std::mem::size_of::<f32>();
                self.current_memory = self.current_memory.saturating_sub(evicted_size);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        // Only insert if the data fits (or cache was empty)
        if data_size <= self.memory_limit {
            self.cache.put(key, data);
            self.current_memory += data_size;
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
            memory_bytes: self.current_memory as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_memory = 0;
    }

    /// Get the current memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Compute a hash for a dataset identifier.
/// Used as part of the cache key to distinguish bricks from different datasets.
pub fn hash_dataset_id(id: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = BrickCache::new(1024 * 1024); // 1MB

        let key = (123, 0, [0, 0, 0, 0]);
        let data: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0];

        assert!(cache.get(&key).is_none());
        cache.insert(key, data.clone());
        assert_eq!(cache.get(&key), Some(&data));
    }

    #[test]
    fn test_cache_lru_eviction() {
        // Small cache that can only hold a few entries
        let mut cache = BrickCache::new(64); // 64 bytes = 16 f32s max

        // Insert entries that will fill the cache
        for i in 0..10 {
            let key = (0, 0, [0, 0, i, 0]);
            let data: Vec<f32> = vec![i as f32; 4]; // 16 bytes each
            cache.insert(key, data);
        }

        // Earlier entries should have been evicted
        assert!(cache.get(&(0, 0, [0, 0, 0, 0])).is_none());

        // Later entries should still be present
        assert!(cache.get(&(0, 0, [0, 0, 9, 0])).is_some());

        // Check eviction count
        let stats = cache.stats();
        assert!(stats.evictions > 0);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = BrickCache::new(1024 * 1024);

        let key1 = (0, 0, [0, 0, 0, 0]);
        let key2 = (0, 1, [0, 0, 0, 0]);
        let data: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0];

        cache.insert(key1, data.clone());

        // Hit
        cache.get(&key1);
        // Miss
        cache.get(&key2);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_level_distinguishes_keys() {
        let mut cache = BrickCache::new(1024 * 1024);

        cache.insert((7, 0, [0, 0, 0, 0]), vec![1.0]);
        assert!(cache.get(&(7, 1, [0, 0, 0, 0])).is_none());
        assert!(cache.get(&(7, 0, [0, 0, 0, 0])).is_some());
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = BrickCache::new(1024 * 1024);

        cache.insert((0, 0, [0, 0, 0, 0]), vec![1.0, 2.0]);
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.memory_usage(), 0);
    }

    #[test]
    fn test_hash_dataset_id() {
        let hash1 = hash_dataset_id("endpoint/utah/nasa/llc2160_u");
        let hash2 = hash_dataset_id("endpoint/utah/nasa/llc2160_u");
        let hash3 = hash_dataset_id("endpoint/utah/nasa/llc2160_w");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }
}
