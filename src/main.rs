//! refcache - Reference data cache daemon
//!
//! Builds the lookup hierarchy over a directory of collection files, warms
//! every collection, and keeps the cache fresh until shut down.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refcache::{spawn_refresh_task, Config, ExternalDataService};

/// Main entry point for the refcache daemon.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the memory, network and storage tiers
/// 4. Warm every available collection
/// 5. Start the background refresh task when an interval is configured
/// 6. Wait for SIGINT/SIGTERM and log the final statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reference data cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: data_directory={}, fast_max_entries={}, shared_max_entries={}, shared_latency={}ms+{}ms (enabled={}), refresh_interval={}s",
        config.data_directory.display(),
        config.fast_max_entries,
        config.shared_max_entries,
        config.shared_base_latency_ms,
        config.shared_jitter_ms,
        config.shared_latency_enabled,
        config.refresh_interval_secs
    );

    let service = Arc::new(
        ExternalDataService::from_config(&config).context("failed to build cache hierarchy")?,
    );

    let warm = Arc::clone(&service);
    let warmed = tokio::task::spawn_blocking(move || {
        let collections = warm.available_collections();
        for collection in &collections {
            warm.warm_up_cache(collection);
        }
        collections.len()
    })
    .await
    .context("warm-up task failed")?;
    info!("Warmed {} collections", warmed);

    log_statistics(&service)?;

    let refresh_handle = config.refresh_interval().map(|interval| {
        let handle = spawn_refresh_task(Arc::clone(&service), interval);
        info!("Background refresh task started");
        handle
    });

    shutdown_signal().await;

    if let Some(handle) = refresh_handle {
        handle.abort();
        warn!("Refresh task aborted");
    }

    log_statistics(&service)?;
    info!("Shutdown complete");
    Ok(())
}

fn log_statistics(service: &ExternalDataService) -> anyhow::Result<()> {
    let stats = serde_json::to_string(&service.cache_statistics())
        .context("failed to serialize cache statistics")?;
    info!("Cache statistics: {}", stats);
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
