//! Cache Statistics Module
//!
//! Point-in-time view of one cache layer's performance.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::LayerType;

// == Cache Statistics ==
/// Immutable snapshot of a layer's metrics plus its current size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    /// Stable layer identifier, e.g. `memoryCache`
    pub cache_name: String,
    /// Kind of layer, used as the aggregate breakdown key
    pub cache_type: LayerType,
    /// Number of successful retrievals
    pub hit_count: u64,
    /// Number of failed retrievals
    pub miss_count: u64,
    /// Number of entries removed by invalidation, expiry or capacity pressure
    pub eviction_count: u64,
    /// hits / (hits + misses), 0 when no requests were made
    pub hit_ratio: f64,
    /// Entries currently held
    pub size: usize,
    /// Capacity of the layer
    pub max_size: usize,
    /// Mean wall time of a get, in milliseconds
    pub avg_get_time_ms: f64,
    /// Mean wall time of a put, in milliseconds
    pub avg_put_time_ms: f64,
    pub last_accessed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// == Hit Ratio ==
/// Calculates hits / (hits + misses), or 0.0 if no requests have been made.
pub fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio_no_requests() {
        let ratio = hit_ratio(0, 0);
        assert_eq!(ratio, 0.0);
        assert!(!ratio.is_nan());
    }

    #[test]
    fn test_hit_ratio_all_hits() {
        assert_eq!(hit_ratio(3, 0), 1.0);
    }

    #[test]
    fn test_hit_ratio_all_misses() {
        assert_eq!(hit_ratio(0, 2), 0.0);
    }

    #[test]
    fn test_hit_ratio_mixed() {
        assert_eq!(hit_ratio(1, 1), 0.5);
        assert_eq!(hit_ratio(3, 1), 0.75);
    }
}
