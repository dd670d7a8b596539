//! Network Cache Layer
//!
//! The shared tier. Values are held serialized, as a remote cache would hold
//! them, and every operation pays a simulated network round trip.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::cache::{
    BoundedStore, CacheLayer, CacheMetrics, CacheStatistics, LayerType, StoreMiss,
    DEFAULT_NETWORK_MAX_ENTRIES,
};
use crate::error::{CacheError, Result};

/// Name reported by the shared layer.
pub const NETWORK_CACHE_NAME: &str = "networkCache";

/// Shared layer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkLayerConfig {
    pub max_entries: usize,
    pub ttl: Option<Duration>,
    /// Fixed part of the simulated round trip
    pub base_latency: Duration,
    /// Upper bound (exclusive) of the random part of the round trip
    pub jitter: Duration,
    pub simulation_enabled: bool,
}

impl Default for NetworkLayerConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_NETWORK_MAX_ENTRIES,
            ttl: None,
            base_latency: Duration::from_millis(50),
            jitter: Duration::from_millis(30),
            simulation_enabled: true,
        }
    }
}

// == Latency Simulator ==
/// Blocks the calling thread for `base + random[0, jitter)`.
#[derive(Debug)]
pub struct LatencySimulator {
    base: Duration,
    jitter: Duration,
    enabled: AtomicBool,
}

impl LatencySimulator {
    pub fn new(base: Duration, jitter: Duration, enabled: bool) -> Self {
        Self {
            base,
            jitter,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Picks the next round-trip latency without sleeping.
    pub fn next_latency(&self) -> Duration {
        let jitter_us = u64::try_from(self.jitter.as_micros()).unwrap_or(u64::MAX);
        let extra = if jitter_us == 0 {
            0
        } else {
            fastrand::u64(0..jitter_us)
        };
        self.base + Duration::from_micros(extra)
    }

    /// Sleeps for one simulated round trip. Returns the time slept.
    pub fn delay(&self) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }
        let latency = self.next_latency();
        thread::sleep(latency);
        latency
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

// == Network Cache Layer ==
/// Larger, slower cache tier standing in for a remote shared cache.
#[derive(Debug)]
pub struct NetworkCacheLayer<K, V> {
    store: Mutex<BoundedStore<K, Vec<u8>>>,
    latency: LatencySimulator,
    metrics: CacheMetrics,
    _value: PhantomData<fn() -> V>,
}

impl<K, V> NetworkCacheLayer<K, V>
where
    K: Hash + Eq + Clone + Debug + Send,
    V: Serialize + DeserializeOwned,
{
    pub fn new(config: NetworkLayerConfig) -> Self {
        info!(
            "Network cache layer initialized: {} (max_entries={}, latency={:?}+{:?}, simulation: {})",
            NETWORK_CACHE_NAME,
            config.max_entries,
            config.base_latency,
            config.jitter,
            config.simulation_enabled
        );
        Self {
            store: Mutex::new(BoundedStore::new(config.max_entries, config.ttl)),
            latency: LatencySimulator::new(
                config.base_latency,
                config.jitter,
                config.simulation_enabled,
            ),
            metrics: CacheMetrics::new(NETWORK_CACHE_NAME, LayerType::Network),
            _value: PhantomData,
        }
    }

    /// Enables or disables the simulated round trip.
    pub fn set_simulation_enabled(&self, enabled: bool) {
        self.latency.set_enabled(enabled);
        info!(
            "Network cache simulation {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn simulation_enabled(&self) -> bool {
        self.latency.is_enabled()
    }

    /// Checks presence without latency and without recording a hit or miss.
    pub fn contains(&self, key: &K) -> bool {
        self.store.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    fn decode(&self, key: &K, bytes: &[u8]) -> Result<V> {
        serde_json::from_slice(bytes).map_err(|e| {
            // An undecodable payload will never become readable; drop it.
            if self.store.lock().remove(key) {
                self.metrics.record_eviction();
            }
            CacheError::layer(NETWORK_CACHE_NAME, format!("decode failed for {:?}: {}", key, e))
        })
    }
}

impl<K, V> CacheLayer<K, V> for NetworkCacheLayer<K, V>
where
    K: Hash + Eq + Clone + Debug + Send,
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &K) -> Result<Option<V>> {
        let start = Instant::now();
        self.latency.delay();

        let lookup = self.store.lock().get(key).cloned();
        let bytes = match lookup {
            Ok(bytes) => bytes,
            Err(miss) => {
                if miss == StoreMiss::Expired {
                    self.metrics.record_eviction();
                }
                let elapsed = start.elapsed();
                self.metrics.record_miss(elapsed);
                debug!(layer = "NETWORK", "Network cache MISS for key: {:?} ({:?})", key, elapsed);
                return Ok(None);
            }
        };

        match self.decode(key, &bytes) {
            Ok(value) => {
                let elapsed = start.elapsed();
                self.metrics.record_hit(elapsed);
                debug!(layer = "NETWORK", "Network cache HIT for key: {:?} ({:?})", key, elapsed);
                Ok(Some(value))
            }
            Err(e) => {
                let elapsed = start.elapsed();
                self.metrics.record_miss(elapsed);
                error!(layer = "NETWORK", "Error retrieving from network cache ({:?}): {}", elapsed, e);
                Err(e)
            }
        }
    }

    fn put(&self, key: K, value: V) -> Result<()> {
        let start = Instant::now();
        self.latency.delay();

        let bytes = serde_json::to_vec(&value).map_err(|e| {
            let err = CacheError::layer(
                NETWORK_CACHE_NAME,
                format!("encode failed for {:?}: {}", key, e),
            );
            self.metrics.record_put(start.elapsed());
            error!(layer = "NETWORK", "Error storing in network cache: {}", err);
            err
        })?;
        let size = bytes.len();

        let evicted = self.store.lock().insert(key.clone(), bytes);
        if let Some(evicted) = evicted {
            self.metrics.record_eviction();
            debug!(layer = "NETWORK", "Capacity eviction from network cache - key: {:?}", evicted);
        }

        let elapsed = start.elapsed();
        self.metrics.record_put(elapsed);
        debug!(
            layer = "NETWORK",
            "Stored in network cache - key: {:?}, {} bytes ({:?})", key, size, elapsed
        );
        Ok(())
    }

    fn invalidate(&self, key: &K) -> Result<()> {
        self.latency.delay();
        let existed = self.store.lock().remove(key);
        self.metrics.record_eviction();
        debug!(
            layer = "NETWORK",
            "Evicted from network cache - key: {:?} (present: {})", key, existed
        );
        Ok(())
    }

    fn invalidate_all(&self) -> Result<()> {
        self.latency.delay();
        self.store.lock().clear();
        self.metrics.reset();
        info!(layer = "NETWORK", "Cleared all entries from network cache");
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
        NETWORK_CACHE_NAME
    }

    fn layer_type(&self) -> LayerType {
        LayerType::Network
    }
}
