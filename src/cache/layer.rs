//! Cache Layer Module
//!
//! The uniform contract every tier of the hierarchy implements.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheStatistics;
use crate::error::Result;

// == Layer Type ==
/// Kind of cache layer. Its name keys the aggregate statistics breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerType {
    /// In-process, small and fast
    Memory,
    /// Shared tier with a network round trip per operation
    Network,
}

impl LayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Memory => "MEMORY",
            LayerType::Network => "NETWORK",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Cache Layer ==
/// A thread-safe key/value tier.
///
/// Every `get` records exactly one hit or one miss with its elapsed time
/// before returning, including when it returns `Err`. Implementations log
/// their own faults; an `Err` from `put` means the write silently did not
/// take effect, and callers treat an `Err` from `get` as a miss.
pub trait CacheLayer<K, V>: Send + Sync {
    /// Returns the value for `key`, or `None` on a miss.
    fn get(&self, key: &K) -> Result<Option<V>>;

    /// Unconditional upsert.
    fn put(&self, key: K, value: V) -> Result<()>;

    /// Removes one entry. Counts an eviction whether or not the key existed.
    fn invalidate(&self, key: &K) -> Result<()>;

    /// Clears the layer and resets its metrics to zero.
    fn invalidate_all(&self) -> Result<()>;

    fn stats(&self) -> CacheStatistics;

    /// Stable identifier used in aggregate reporting.
    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;
}
