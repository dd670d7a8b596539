//! Cache Module
//!
//! Cache layers for the tiered lookup hierarchy: a fast in-process layer and
//! a slower shared layer behind one `CacheLayer` contract, each with its own
//! metrics.

mod entry;
mod layer;
mod lru;
mod memory;
mod metrics;
mod network;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use layer::{CacheLayer, LayerType};
pub use lru::LruTracker;
pub use memory::{MemoryCacheLayer, MemoryLayerConfig, MEMORY_CACHE_NAME};
pub use metrics::CacheMetrics;
pub use network::{LatencySimulator, NetworkCacheLayer, NetworkLayerConfig, NETWORK_CACHE_NAME};
pub use stats::{hit_ratio, CacheStatistics};
pub use store::{BoundedStore, StoreMiss};

// == Public Constants ==
/// Default capacity of the fast layer
pub const DEFAULT_MEMORY_MAX_ENTRIES: usize = 1000;

/// Default capacity of the shared layer
pub const DEFAULT_NETWORK_MAX_ENTRIES: usize = 5000;
