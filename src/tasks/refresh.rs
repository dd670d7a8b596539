//! Collection Refresh Task
//!
//! Background task that re-warms the cache when collection files change on
//! disk. The lookup path itself never checks for modifications; this task is
//! the only thing that turns a file change into an invalidation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::service::ExternalDataService;

/// Runs one refresh pass. Returns the collections that were re-warmed.
///
/// Invalidation is whole-hierarchy, so the hierarchy is cleared once and
/// every modified collection is warmed afterwards.
pub fn refresh_modified_collections(service: &ExternalDataService) -> Vec<String> {
    let modified: Vec<String> = service
        .available_collections()
        .into_iter()
        .filter(|collection| service.storage().is_modified(collection))
        .collect();

    if modified.is_empty() {
        return modified;
    }

    service.invalidate_all_caches();
    for collection in &modified {
        service.warm_up_cache(collection);
    }
    modified
}

/// Spawns a background task that periodically refreshes modified collections.
///
/// Lookups block (the shared layer sleeps), so each pass runs on the blocking
/// pool.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_refresh_task(service: Arc<ExternalDataService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting collection refresh task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let service = Arc::clone(&service);
            match tokio::task::spawn_blocking(move || refresh_modified_collections(&service)).await {
                Ok(refreshed) if refreshed.is_empty() => {
                    debug!("Collection refresh: no modified collections");
                }
                Ok(refreshed) => {
                    info!("Collection refresh: re-warmed {:?}", refreshed);
                }
                Err(e) => {
                    warn!("Collection refresh pass failed: {}", e);
                }
            }
        }
    })
}
