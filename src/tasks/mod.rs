//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the process is up.
//!
//! # Tasks
//! - Collection refresh: re-warms collections whose files changed on disk

mod refresh;

pub use refresh::{refresh_modified_collections, spawn_refresh_task};
