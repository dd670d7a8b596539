//! Cache Metrics Module
//!
//! Concurrent hit/miss/eviction/latency accounting for a single cache layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::cache::stats::hit_ratio;
use crate::cache::{CacheStatistics, LayerType};

/// One generation of counters. `reset` swaps in a fresh generation.
#[derive(Debug)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    get_time_us: AtomicU64,
    put_time_us: AtomicU64,
    get_ops: AtomicU64,
    put_ops: AtomicU64,
    last_accessed: Mutex<DateTime<Utc>>,
}

impl Counters {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            get_time_us: AtomicU64::new(0),
            put_time_us: AtomicU64::new(0),
            get_ops: AtomicU64::new(0),
            put_ops: AtomicU64::new(0),
            last_accessed: Mutex::new(Utc::now()),
        }
    }

    fn record_get(&self, elapsed: Duration) {
        self.get_time_us
            .fetch_add(duration_us(elapsed), Ordering::Relaxed);
        self.get_ops.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    fn touch(&self) {
        *self.last_accessed.lock() = Utc::now();
    }
}

// == Cache Metrics ==
/// Per-layer metrics collector.
///
/// Recording takes a shared lock on the current counter generation and bumps
/// atomics, so concurrent recorders never block each other. `reset` takes
/// the exclusive lock and replaces the whole generation: every record lands
/// either entirely before or entirely after a reset.
#[derive(Debug)]
pub struct CacheMetrics {
    cache_name: String,
    cache_type: LayerType,
    created_at: DateTime<Utc>,
    counters: RwLock<Counters>,
}

impl CacheMetrics {
    pub fn new(cache_name: impl Into<String>, cache_type: LayerType) -> Self {
        Self {
            cache_name: cache_name.into(),
            cache_type,
            created_at: Utc::now(),
            counters: RwLock::new(Counters::new()),
        }
    }

    pub fn record_hit(&self, elapsed: Duration) {
        let counters = self.counters.read();
        counters.hits.fetch_add(1, Ordering::Relaxed);
        counters.record_get(elapsed);
    }

    pub fn record_miss(&self, elapsed: Duration) {
        let counters = self.counters.read();
        counters.misses.fetch_add(1, Ordering::Relaxed);
        counters.record_get(elapsed);
    }

    pub fn record_put(&self, elapsed: Duration) {
        let counters = self.counters.read();
        counters
            .put_time_us
            .fetch_add(duration_us(elapsed), Ordering::Relaxed);
        counters.put_ops.fetch_add(1, Ordering::Relaxed);
        counters.touch();
    }

    pub fn record_eviction(&self) {
        self.counters
            .read()
            .evictions
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Zeroes every counter in one atomic step.
    pub fn reset(&self) {
        *self.counters.write() = Counters::new();
    }

    // == Snapshot ==
    /// Converts the current counters into a `CacheStatistics` snapshot.
    pub fn snapshot(&self, current_size: usize, max_size: usize) -> CacheStatistics {
        let counters = self.counters.read();
        let hits = counters.hits.load(Ordering::Relaxed);
        let misses = counters.misses.load(Ordering::Relaxed);
        let last_accessed = *counters.last_accessed.lock();

        CacheStatistics {
            cache_name: self.cache_name.clone(),
            cache_type: self.cache_type,
            hit_count: hits,
            miss_count: misses,
            eviction_count: counters.evictions.load(Ordering::Relaxed),
            hit_ratio: hit_ratio(hits, misses),
            size: current_size,
            max_size,
            avg_get_time_ms: average_ms(
                counters.get_time_us.load(Ordering::Relaxed),
                counters.get_ops.load(Ordering::Relaxed),
            ),
            avg_put_time_ms: average_ms(
                counters.put_time_us.load(Ordering::Relaxed),
                counters.put_ops.load(Ordering::Relaxed),
            ),
            last_accessed,
            created_at: self.created_at,
        }
    }
}

fn duration_us(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn average_ms(total_us: u64, ops: u64) -> f64 {
    if ops == 0 {
        0.0
    } else {
        total_us as f64 / ops as f64 / 1000.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn metrics() -> CacheMetrics {
        CacheMetrics::new("memoryCache", LayerType::Memory)
    }

    #[test]
    fn test_metrics_new_is_zeroed() {
        let stats = metrics().snapshot(0, 1000);
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.eviction_count, 0);
        assert_eq!(stats.hit_ratio, 0.0);
        assert_eq!(stats.avg_get_time_ms, 0.0);
        assert_eq!(stats.avg_put_time_ms, 0.0);
        assert_eq!(stats.max_size, 1000);
    }

    #[test]
    fn test_metrics_average_latency() {
        let metrics = metrics();
        metrics.record_hit(Duration::from_millis(2));
        metrics.record_miss(Duration::from_millis(4));
        metrics.record_put(Duration::from_millis(10));

        let stats = metrics.snapshot(1, 10);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_ratio, 0.5);
        assert!((stats.avg_get_time_ms - 3.0).abs() < 1e-9);
        assert!((stats.avg_put_time_ms - 10.0).abs() < 1e-9);
        assert_eq!(stats.cache_name, "memoryCache");
        assert_eq!(stats.cache_type, LayerType::Memory);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = metrics();
        metrics.record_hit(Duration::ZERO);
        metrics.record_miss(Duration::ZERO);
        metrics.record_eviction();

        metrics.reset();

        let stats = metrics.snapshot(0, 10);
        assert_eq!(stats.hit_count, 0);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.eviction_count, 0);
        assert_eq!(stats.avg_get_time_ms, 0.0);
    }

    #[test]
    fn test_metrics_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(metrics());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_hit(Duration::from_micros(1));
                        metrics.record_miss(Duration::from_micros(1));
                        metrics.record_eviction();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = metrics.snapshot(0, 1);
        assert_eq!(stats.hit_count, 8000);
        assert_eq!(stats.miss_count, 8000);
        assert_eq!(stats.eviction_count, 8000);
    }

    #[test]
    fn test_reset_racing_with_recorders_keeps_counters_consistent() {
        let metrics = Arc::new(metrics());
        let recorder = {
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                for _ in 0..5000 {
                    metrics.record_hit(Duration::ZERO);
                }
            })
        };
        for _ in 0..50 {
            metrics.reset();
        }
        recorder.join().unwrap();

        let stats = metrics.snapshot(0, 1);
        assert!(stats.hit_count <= 5000);
        assert_eq!(stats.miss_count, 0);
        assert_eq!(stats.hit_ratio, if stats.hit_count > 0 { 1.0 } else { 0.0 });
    }
}
