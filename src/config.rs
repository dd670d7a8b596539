//! Configuration Module
//!
//! Handles loading and managing cache hierarchy configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{MemoryLayerConfig, NetworkLayerConfig};
use crate::error::{CacheError, Result};

/// Cache hierarchy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one `<collection>.json` file per collection
    pub data_directory: PathBuf,
    /// Maximum number of entries in the fast (memory) layer
    pub fast_max_entries: usize,
    /// Fast layer entry age limit in seconds, 0 = no expiry
    pub fast_ttl_secs: u64,
    /// Maximum number of entries in the shared (network) layer
    pub shared_max_entries: usize,
    /// Shared layer entry age limit in seconds, 0 = no expiry
    pub shared_ttl_secs: u64,
    /// Simulated round-trip base latency of the shared layer
    pub shared_base_latency_ms: u64,
    /// Random jitter added on top of the base latency
    pub shared_jitter_ms: u64,
    /// Whether the shared layer sleeps at all
    pub shared_latency_enabled: bool,
    /// Refresh task interval in seconds, 0 = disabled
    pub refresh_interval_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATA_DIRECTORY` - Collection directory (default: data)
    /// - `FAST_MAX_ENTRIES` - Fast layer capacity (default: 1000)
    /// - `FAST_TTL_SECS` - Fast layer entry age limit (default: 0, none)
    /// - `SHARED_MAX_ENTRIES` - Shared layer capacity (default: 5000)
    /// - `SHARED_TTL_SECS` - Shared layer entry age limit (default: 0, none)
    /// - `SHARED_BASE_LATENCY_MS` - Simulated base latency (default: 50)
    /// - `SHARED_JITTER_MS` - Simulated latency jitter (default: 30)
    /// - `SHARED_LATENCY_ENABLED` - Latency simulation switch (default: true)
    /// - `REFRESH_INTERVAL_SECS` - Refresh task period (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_directory: env::var("DATA_DIRECTORY")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.data_directory),
            fast_max_entries: env_or("FAST_MAX_ENTRIES", defaults.fast_max_entries),
            fast_ttl_secs: env_or("FAST_TTL_SECS", defaults.fast_ttl_secs),
            shared_max_entries: env_or("SHARED_MAX_ENTRIES", defaults.shared_max_entries),
            shared_ttl_secs: env_or("SHARED_TTL_SECS", defaults.shared_ttl_secs),
            shared_base_latency_ms: env_or(
                "SHARED_BASE_LATENCY_MS",
                defaults.shared_base_latency_ms,
            ),
            shared_jitter_ms: env_or("SHARED_JITTER_MS", defaults.shared_jitter_ms),
            shared_latency_enabled: env_or(
                "SHARED_LATENCY_ENABLED",
                defaults.shared_latency_enabled,
            ),
            refresh_interval_secs: env_or(
                "REFRESH_INTERVAL_SECS",
                defaults.refresh_interval_secs,
            ),
        }
    }

    /// Rejects configurations the cache hierarchy cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.fast_max_entries == 0 {
            return Err(CacheError::Configuration(
                "FAST_MAX_ENTRIES must be greater than zero".to_string(),
            ));
        }
        if self.shared_max_entries == 0 {
            return Err(CacheError::Configuration(
                "SHARED_MAX_ENTRIES must be greater than zero".to_string(),
            ));
        }
        if self.data_directory.as_os_str().is_empty() {
            return Err(CacheError::Configuration(
                "DATA_DIRECTORY must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Fast layer settings derived from this config.
    pub fn memory_layer(&self) -> MemoryLayerConfig {
        MemoryLayerConfig {
            max_entries: self.fast_max_entries,
            ttl: secs_to_ttl(self.fast_ttl_secs),
        }
    }

    /// Shared layer settings derived from this config.
    pub fn network_layer(&self) -> NetworkLayerConfig {
        NetworkLayerConfig {
            max_entries: self.shared_max_entries,
            ttl: secs_to_ttl(self.shared_ttl_secs),
            base_latency: Duration::from_millis(self.shared_base_latency_ms),
            jitter: Duration::from_millis(self.shared_jitter_ms),
            simulation_enabled: self.shared_latency_enabled,
        }
    }

    /// Refresh period, or None when the refresh task is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data"),
            fast_max_entries: 1000,
            fast_ttl_secs: 0,
            shared_max_entries: 5000,
            shared_ttl_secs: 0,
            shared_base_latency_ms: 50,
            shared_jitter_ms: 30,
            shared_latency_enabled: true,
            refresh_interval_secs: 0,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn secs_to_ttl(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
