//! JSON File Storage
//!
//! Reads collections from `<data_directory>/<collection>.json`. Each file
//! holds a JSON array of objects.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::error::{CacheError, Result};
use crate::models::Records;
use crate::storage::CollectionSource;

const COLLECTION_EXTENSION: &str = "json";

// == JSON File Storage ==
/// Storage reader over a directory of collection files.
#[derive(Debug)]
pub struct JsonFileStorage {
    data_directory: PathBuf,
    /// Modification time observed at the last load of each collection
    modification_times: DashMap<String, SystemTime>,
}

impl JsonFileStorage {
    // == Constructor ==
    /// Opens a data directory, creating it when missing.
    ///
    /// Fails with `Configuration` when the directory cannot be created or is
    /// not a directory.
    pub fn new(data_directory: impl Into<PathBuf>) -> Result<Self> {
        let data_directory = data_directory.into();

        if !data_directory.exists() {
            fs::create_dir_all(&data_directory).map_err(|e| {
                CacheError::Configuration(format!(
                    "cannot create data directory {}: {}",
                    data_directory.display(),
                    e
                ))
            })?;
            info!("Created data directory: {}", data_directory.display());
        } else if !data_directory.is_dir() {
            return Err(CacheError::Configuration(format!(
                "data directory {} is not a directory",
                data_directory.display()
            )));
        }

        info!(
            "JSON file storage initialized with directory: {}",
            data_directory.display()
        );
        Ok(Self {
            data_directory,
            modification_times: DashMap::new(),
        })
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    // == Modification Tracking ==
    /// Checks whether a collection file changed since it was last loaded.
    ///
    /// A collection that was never loaded counts as modified; a missing file
    /// or an invalid name does not. When the file time cannot be read, assume
    /// it changed.
    pub fn is_collection_modified(&self, collection: &str) -> bool {
        if !is_valid_collection_name(collection) {
            return false;
        }
        let path = self.collection_path(collection);
        let modified = match fs::metadata(&path) {
            Ok(meta) => meta.modified(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return false,
            Err(e) => Err(e),
        };

        match modified {
            Ok(modified) => self
                .modification_times
                .get(collection)
                .map_or(true, |seen| modified > *seen),
            Err(e) => {
                error!(
                    "Error checking file modification time for collection {}: {}",
                    collection, e
                );
                true
            }
        }
    }

    /// Current modification time of a collection file, None if absent.
    pub fn collection_modified_at(&self, collection: &str) -> Option<DateTime<Utc>> {
        if !is_valid_collection_name(collection) {
            return None;
        }
        fs::metadata(self.collection_path(collection))
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_directory
            .join(format!("{}.{}", collection, COLLECTION_EXTENSION))
    }
}

/// Collection names are bare file stems; anything that could escape the data
/// directory is rejected.
fn is_valid_collection_name(collection: &str) -> bool {
    !collection.is_empty()
        && collection != "."
        && collection != ".."
        && !collection.contains(['/', '\\'])
}

impl CollectionSource for JsonFileStorage {
    fn load_collection(&self, collection: &str) -> Result<Records> {
        if !is_valid_collection_name(collection) {
            warn!("Rejected invalid collection name: {:?}", collection);
            return Ok(Vec::new());
        }

        let path = self.collection_path(collection);
        let modified = match fs::metadata(&path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Collection file not found: {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(read_error(collection, e)),
        };

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Collection file vanished before read: {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(read_error(collection, e)),
        };

        if let Some(modified) = modified {
            self.modification_times
                .insert(collection.to_string(), modified);
        }

        let records: Records = serde_json::from_slice(&bytes).map_err(|source| {
            error!("Error parsing collection {}: {}", collection, source);
            CacheError::StorageCorrupt {
                collection: collection.to_string(),
                source,
            }
        })?;

        debug!(
            "Loaded {} entries from collection: {}",
            records.len(),
            collection
        );
        Ok(records)
    }

    fn list_collections(&self) -> Result<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.data_directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                error!("Error listing collections: {}", e);
                return Err(CacheError::StorageRead {
                    collection: self.data_directory.display().to_string(),
                    source: e,
                });
            }
        };

        let collections = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(COLLECTION_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        Ok(collections)
    }

    fn is_modified(&self, collection: &str) -> bool {
        self.is_collection_modified(collection)
    }
}

fn read_error(collection: &str, source: io::Error) -> CacheError {
    error!("Error loading collection {}: {}", collection, source);
    CacheError::StorageRead {
        collection: collection.to_string(),
        source,
    }
}
