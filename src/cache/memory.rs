//! Memory Cache Layer
//!
//! The fast tier: an in-process bounded store with no added latency.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{
    BoundedStore, CacheLayer, CacheMetrics, CacheStatistics, LayerType, StoreMiss,
    DEFAULT_MEMORY_MAX_ENTRIES,
};
use crate::error::Result;

/// Name reported by the fast layer.
pub const MEMORY_CACHE_NAME: &str = "memoryCache";

/// Fast layer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayerConfig {
    pub max_entries: usize,
    pub ttl: Option<Duration>,
}

impl Default for MemoryLayerConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MEMORY_MAX_ENTRIES,
            ttl: None,
        }
    }
}

// == Memory Cache Layer ==
/// Process-local cache tier backed by an LRU-bounded map.
#[derive(Debug)]
pub struct MemoryCacheLayer<K, V> {
    store: Mutex<BoundedStore<K, V>>,
    metrics: CacheMetrics,
}

impl<K, V> MemoryCacheLayer<K, V>
where
    K: Hash + Eq + Clone + Debug + Send,
    V: Clone + Send,
{
    pub fn new(config: MemoryLayerConfig) -> Self {
        info!(
            "Memory cache layer initialized: {} (max_entries={}, ttl={:?})",
            MEMORY_CACHE_NAME, config.max_entries, config.ttl
        );
        Self {
            store: Mutex::new(BoundedStore::new(config.max_entries, config.ttl)),
            metrics: CacheMetrics::new(MEMORY_CACHE_NAME, LayerType::Memory),
        }
    }

    /// Checks presence without recording a hit or miss.
    pub fn contains(&self, key: &K) -> bool {
        self.store.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

impl<K, V> CacheLayer<K, V> for MemoryCacheLayer<K, V>
where
    K: Hash + Eq + Clone + Debug + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Result<Option<V>> {
        let start = Instant::now();
        let lookup = self.store.lock().get(key).cloned();
        let elapsed = start.elapsed();

        match lookup {
            Ok(value) => {
                self.metrics.record_hit(elapsed);
                debug!(layer = "MEMORY", "Memory cache HIT for key: {:?} ({:?})", key, elapsed);
                Ok(Some(value))
            }
            Err(miss) => {
                if miss == StoreMiss::Expired {
                    self.metrics.record_eviction();
                }
                self.metrics.record_miss(elapsed);
                debug!(layer = "MEMORY", "Memory cache MISS for key: {:?} ({:?})", key, elapsed);
                Ok(None)
            }
        }
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        let start = Instant::now();
        let evicted = self.store.lock().insert(key.clone(), value);
        if let Some(evicted) = evicted {
            self.metrics.record_eviction();
            debug!(layer = "MEMORY", "Capacity eviction from memory cache - key: {:?}", evicted);
        }
        let elapsed = start.elapsed();
        self.metrics.record_put(elapsed);
        debug!(layer = "MEMORY", "Stored in memory cache - key: {:?} ({:?})", key, elapsed);
        Ok(())
    }

    fn invalidate(&self, key: &K) -> Result<()> {
        let existed = self.store.lock().remove(key);
        self.metrics.record_eviction();
        debug!(
            layer = "MEMORY",
            "Evicted from memory cache - key: {:?} (present: {})", key, existed
        );
        Ok(())
    }

    fn invalidate_all(&self) -> Result<()> {
        self.store.lock().clear();
        self.metrics.reset();
        info!(layer = "MEMORY", "Cleared all entries from memory cache");
        Ok(())
    }

    fn stats(&self) -> CacheStatistics {
        let (size, max_size) = {
            let store = self.store.lock();
            (store.len(), store.max_entries())
        };
        self.metrics.snapshot(size, max_size)
    }

    fn name(&self) -> &str {
        MEMORY_CACHE_NAME
    }

    fn layer_type(&self) -> LayerType {
        LayerType::Memory
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn layer(max_entries: usize) -> MemoryCacheLayer<String, Vec<u32>> {
        MemoryCacheLayer::new(MemoryLayerConfig {
            max_entries,
            ttl: None,
        })
    }

    #[test]
    fn test_get_miss_then_hit() {
        let cache = layer(10);
        let key = r#"states:code="CA""#.to_string();

        assert_eq!(cache.get(&key).unwrap(), None);
        cache.put(key.clone(), vec![1]).unwrap();
        assert_eq!(cache.get(&key).unwrap(), Some(vec![1]));

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_ratio, 0.5);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.max_size, 10);
        assert_eq!(stats.cache_type, LayerType::Memory);
    }

    #[test]
    fn test_invalidate_counts_eviction_even_when_absent() {
        let cache = layer(10);
        cache.put("present".to_string(), vec![1]).unwrap();

        cache.invalidate(&"present".to_string()).unwrap();
        cache.invalidate(&"never-stored".to_string()).unwrap();

        assert!(!cache.contains(&"present".to_string()));
        assert_eq!(cache.stats().eviction_count, 2);
    }

    #[test]
    fn test_invalidate_all_clears_and_resets() {
        let cache = layer(10);
        cache.put("a".to_string(), vec![1]).unwrap();
        cache.get(&"a".to_string()).unwrap();
        cache.get(&"b".to_string()).unwrap();
        cache.invalidate(&"a".to_string()).unwrap();

        cache.invalidate_all().unwrap();

        let stats = cache.stats();
        assert!(cache.is_empty());
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.eviction_count, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_capacity_eviction_is_counted() {
        let cache = layer(2);
        cache.put("a".to_string(), vec![1]).unwrap();
        cache.put("b".to_string(), vec![2]).unwrap();
        cache.put("c".to_string(), vec![3]).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"a".to_string()));
        assert_eq!(cache.stats().eviction_count, 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache: MemoryCacheLayer<String, Vec<u32>> = MemoryCacheLayer::new(MemoryLayerConfig {
            max_entries: 10,
            ttl: Some(Duration::from_millis(10)),
        });
        cache.put("a".to_string(), vec![1]).unwrap();
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.get(&"a".to_string()).unwrap(), None);
        let stats = cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.eviction_count, 1);
    }

    #[test]
    fn test_concurrent_gets_record_every_request() {
        let cache = Arc::new(layer(100));
        cache.put("hot".to_string(), vec![7]).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..250 {
                        let key = if i % 2 == 0 { "hot" } else { "cold" };
                        cache.get(&key.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 500);
        assert_eq!(stats.miss_count, 500);
    }
}
