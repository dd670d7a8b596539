//! Aggregate statistics across every cache layer
//!
//! Observability only; the lookup path never reads these.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{hit_ratio, CacheStatistics};

/// Hits, misses and mean get latency for one layer type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerBreakdown {
    pub hits: u64,
    pub misses: u64,
    pub avg_response_time_ms: f64,
}

/// Overall cache statistics for the reference-data service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateCacheStatistics {
    pub total_hit_count: u64,
    pub total_miss_count: u64,
    /// total hits / (total hits + total misses)
    pub overall_hit_ratio: f64,
    pub total_eviction_count: u64,
    pub total_size: usize,
    pub total_max_size: usize,
    /// One snapshot per layer, fastest first
    pub layer_stats: Vec<CacheStatistics>,
    /// Keyed by layer type name (`MEMORY`, `NETWORK`)
    pub layer_breakdown: BTreeMap<String, LayerBreakdown>,
    pub timestamp: DateTime<Utc>,
}

impl AggregateCacheStatistics {
    /// Sums the given layer snapshots.
    pub fn from_layers(layer_stats: Vec<CacheStatistics>) -> Self {
        let total_hit_count = layer_stats.iter().map(|s| s.hit_count).sum();
        let total_miss_count = layer_stats.iter().map(|s| s.miss_count).sum();

        let mut layer_breakdown: BTreeMap<String, LayerBreakdown> = BTreeMap::new();
        for stats in &layer_stats {
            let entry = layer_breakdown
                .entry(stats.cache_type.to_string())
                .or_default();
            entry.hits += stats.hit_count;
            entry.misses += stats.miss_count;
            entry.avg_response_time_ms = stats.avg_get_time_ms;
        }

        Self {
            total_hit_count,
            total_miss_count,
            overall_hit_ratio: hit_ratio(total_hit_count, total_miss_count),
            total_eviction_count: layer_stats.iter().map(|s| s.eviction_count).sum(),
            total_size: layer_stats.iter().map(|s| s.size).sum(),
            total_max_size: layer_stats.iter().map(|s| s.max_size).sum(),
            layer_stats,
            layer_breakdown,
            timestamp: Utc::now(),
        }
    }

    pub fn hits_for_layer(&self, layer_type: &str) -> u64 {
        self.layer_breakdown
            .get(layer_type)
            .map_or(0, |layer| layer.hits)
    }

    pub fn misses_for_layer(&self, layer_type: &str) -> u64 {
        self.layer_breakdown
            .get(layer_type)
            .map_or(0, |layer| layer.misses)
    }

    pub fn avg_response_time_for_layer(&self, layer_type: &str) -> f64 {
        self.layer_breakdown
            .get(layer_type)
            .map_or(0.0, |layer| layer.avg_response_time_ms)
    }
}
