//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the counting, capacity and ordering rules of the
//! cache layers across generated operation sequences.

use proptest::prelude::*;
use std::time::Duration;

use crate::cache::{
    hit_ratio, BoundedStore, CacheLayer, MemoryCacheLayer, MemoryLayerConfig, NetworkCacheLayer,
    NetworkLayerConfig,
};
use crate::service::Query;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 20;

// == Strategies ==
/// Small key space so sequences revisit keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}".prop_map(|s| s)
}

/// Generates a sequence of layer operations for testing
#[derive(Debug, Clone)]
enum LayerOp {
    Put { key: String, value: String },
    Get { key: String },
    Invalidate { key: String },
}

fn layer_op_strategy() -> impl Strategy<Value = LayerOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| LayerOp::Put { key, value }),
        key_strategy().prop_map(|key| LayerOp::Get { key }),
        key_strategy().prop_map(|key| LayerOp::Invalidate { key }),
    ]
}

fn memory_layer(max_entries: usize) -> MemoryCacheLayer<String, String> {
    MemoryCacheLayer::new(MemoryLayerConfig {
        max_entries,
        ttl: None,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits, misses and evictions reported by a layer match the operations
    // performed on it. Capacity evictions and invalidations both count.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(layer_op_strategy(), 1..80)) {
        let layer = memory_layer(TEST_MAX_ENTRIES / 4);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_evictions: u64 = 0;

        for op in ops {
            match op {
                LayerOp::Put { key, value } => {
                    if !layer.contains(&key) && layer.len() == TEST_MAX_ENTRIES / 4 {
                        expected_evictions += 1;
                    }
                    layer.put(key, value).unwrap();
                }
                LayerOp::Get { key } => {
                    match layer.get(&key).unwrap() {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                LayerOp::Invalidate { key } => {
                    layer.invalidate(&key).unwrap();
                    expected_evictions += 1;
                }
            }
        }

        let stats = layer.stats();
        prop_assert_eq!(stats.hit_count, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.miss_count, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.eviction_count, expected_evictions, "Evictions mismatch");
        prop_assert_eq!(stats.size, layer.len(), "Size mismatch");
        prop_assert_eq!(stats.hit_ratio, hit_ratio(expected_hits, expected_misses));
    }

    // A value put into a layer is returned by the next get.
    #[test]
    fn prop_put_then_get(key in key_strategy(), value in value_strategy()) {
        let layer = memory_layer(TEST_MAX_ENTRIES);

        layer.put(key.clone(), value.clone()).unwrap();

        prop_assert_eq!(layer.get(&key).unwrap(), Some(value));
    }

    // Storing V1 then V2 under one key leaves a single entry holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = BoundedStore::new(TEST_MAX_ENTRIES, None);

        store.insert(key.clone(), value1);
        let evicted = store.insert(key.clone(), value2.clone());

        prop_assert!(evicted.is_none(), "Overwrite must not evict");
        prop_assert_eq!(store.get(&key).ok(), Some(&value2));
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // The number of entries never exceeds the configured capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..200),
        max_entries in 1usize..10
    ) {
        let mut store = BoundedStore::new(max_entries, None);

        for (key, value) in entries {
            store.insert(key, value);
            prop_assert!(
                store.len() <= max_entries,
                "Store size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Reading an entry protects it from the next capacity eviction; the
    // least recently used entry goes instead.
    #[test]
    fn prop_lru_evicts_least_recently_used(max_entries in 2usize..20) {
        let mut store = BoundedStore::new(max_entries, None);
        for i in 0..max_entries {
            store.insert(i, i);
        }

        prop_assert!(store.get(&0).is_ok());
        let evicted = store.insert(max_entries, max_entries);

        prop_assert_eq!(evicted, Some(1));
        prop_assert!(store.contains(&0));
        prop_assert!(!store.contains(&1));
    }

    // hit ratio is hits / (hits + misses), bounded to [0, 1], and zero
    // when there were no requests.
    #[test]
    fn prop_hit_ratio_definition(hits in 0u64..10_000, misses in 0u64..10_000) {
        let ratio = hit_ratio(hits, misses);

        prop_assert!((0.0..=1.0).contains(&ratio));
        if hits + misses == 0 {
            prop_assert_eq!(ratio, 0.0);
        } else {
            prop_assert!((ratio - hits as f64 / (hits + misses) as f64).abs() < f64::EPSILON);
        }
    }

    // Cache keys are a pure function of the query, and distinct filter
    // values produce distinct keys.
    #[test]
    fn prop_cache_keys_are_deterministic(
        collection in "[a-z][a-z-]{0,12}",
        key in "[a-zA-Z][a-zA-Z.]{0,12}",
        value1 in "[A-Z]{1,4}",
        value2 in "[A-Z]{1,4}"
    ) {
        let first = Query::key_equals(collection.as_str(), key.as_str(), value1.clone().into());
        let again = Query::key_equals(collection.as_str(), key.as_str(), value1.clone().into());
        let other = Query::key_equals(collection.as_str(), key.as_str(), value2.clone().into());

        prop_assert_eq!(first.cache_key(), again.cache_key());
        prop_assert_eq!(first.cache_key() == other.cache_key(), value1 == value2);
        prop_assert_ne!(
            Query::collection(collection.as_str()).cache_key(),
            Query::key_exists(collection.as_str(), key.as_str()).cache_key()
        );
    }
}

// Separate proptest block with fewer cases for latency-sensitive tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(3))]

    // Over the same reads, the simulated shared layer is slower on average
    // than the in-process layer.
    #[test]
    fn prop_network_slower_than_memory(keys in prop::collection::vec(key_strategy(), 5..15)) {
        let memory = memory_layer(TEST_MAX_ENTRIES);
        let network: NetworkCacheLayer<String, String> = NetworkCacheLayer::new(NetworkLayerConfig {
            max_entries: TEST_MAX_ENTRIES,
            ttl: None,
            base_latency: Duration::from_millis(2),
            jitter: Duration::from_millis(1),
            simulation_enabled: true,
        });

        for key in &keys {
            memory.put(key.clone(), key.clone()).unwrap();
            network.put(key.clone(), key.clone()).unwrap();
        }
        for key in &keys {
            memory.get(key).unwrap();
            network.get(key).unwrap();
        }

        let memory_stats = memory.stats();
        let network_stats = network.stats();
        prop_assert!(
            network_stats.avg_get_time_ms > memory_stats.avg_get_time_ms,
            "network {}ms should exceed memory {}ms",
            network_stats.avg_get_time_ms,
            memory_stats.avg_get_time_ms
        );
    }
}
