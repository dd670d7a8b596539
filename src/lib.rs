//! refcache - Tiered lookup cache for reference data
//!
//! Serves slow-changing reference collections (jurisdiction rules, license
//! classes, fee schedules) stored as JSON files through a memory cache and a
//! shared network cache, with per-layer statistics and explicit invalidation.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod storage;
pub mod tasks;

pub use config::Config;
pub use error::{CacheError, Result};
pub use service::{ExternalDataService, Query, ReferenceData};
pub use tasks::spawn_refresh_task;
