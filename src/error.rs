//! Error types for the reference-data cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for storage, cache layers and configuration.
///
/// None of these ever reach a caller of the lookup surface: storage and layer
/// errors are logged and degraded to "no data at this tier" by the
/// orchestrator. Only `Configuration` is fatal, and only at startup.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Collection file exists but could not be read
    #[error("Failed to read collection '{collection}': {source}")]
    StorageRead {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    /// Collection file is not a JSON array of objects
    #[error("Corrupt collection '{collection}': {source}")]
    StorageCorrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Internal fault inside a cache layer
    #[error("Cache layer '{layer}' failed: {message}")]
    LayerOperation { layer: String, message: String },

    /// Invalid configuration or unusable startup resource
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    /// Builds a `LayerOperation` error for the named layer.
    pub fn layer(layer: impl Into<String>, message: impl Into<String>) -> Self {
        CacheError::LayerOperation {
            layer: layer.into(),
            message: message.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_error_message() {
        let err = CacheError::layer("networkCache", "decode failed");
        assert_eq!(
            err.to_string(),
            "Cache layer 'networkCache' failed: decode failed"
        );
    }

    #[test]
    fn test_storage_read_keeps_source() {
        let err = CacheError::StorageRead {
            collection: "states".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("states"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
