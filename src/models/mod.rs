//! Data models for the reference-data cache
//!
//! Records read from collection files and the statistics reported back to
//! callers.

pub mod record;
pub mod statistics;

// Re-export commonly used types
pub use record::{has_path, lookup_path, matches_path, Record, Records};
pub use statistics::{AggregateCacheStatistics, LayerBreakdown};
