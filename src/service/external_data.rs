//! External Data Service
//!
//! The tiered lookup: memory cache, then network cache, then collection
//! files. Any tier that missed is backfilled with the answer found below it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, MemoryCacheLayer, NetworkCacheLayer};
use crate::config::Config;
use crate::error::Result;
use crate::models::{AggregateCacheStatistics, Records};
use crate::service::Query;
use crate::storage::{CollectionSource, JsonFileStorage};

/// A cache tier holding lookup results keyed by cache key.
pub type RecordLayer = dyn CacheLayer<String, Records>;

// == Cache Tier ==
/// Where a lookup was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Network,
    Storage,
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTier::Memory => write!(f, "memory cache"),
            CacheTier::Network => write!(f, "network cache"),
            CacheTier::Storage => write!(f, "JSON storage"),
        }
    }
}

/// Lookup result along with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub records: Records,
    pub tier: CacheTier,
}

// == External Data Service ==
/// Reference-data lookups with multi-layer caching.
///
/// Each layer is internally synchronized; the service adds no locking of its
/// own. Concurrent misses for the same key may both reach storage and both
/// backfill.
pub struct ExternalDataService {
    memory: Arc<RecordLayer>,
    network: Arc<RecordLayer>,
    storage: Arc<dyn CollectionSource>,
}

impl ExternalDataService {
    pub fn new(
        memory: Arc<RecordLayer>,
        network: Arc<RecordLayer>,
        storage: Arc<dyn CollectionSource>,
    ) -> Self {
        info!(
            "External data service initialized with multi-layer caching: {} -> {} -> storage",
            memory.name(),
            network.name()
        );
        Self {
            memory,
            network,
            storage,
        }
    }

    /// Builds the whole hierarchy from configuration.
    ///
    /// Fails with `Configuration` if any tier cannot be constructed; the
    /// hierarchy is never partially built.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let storage = JsonFileStorage::new(&config.data_directory)?;
        Ok(Self::new(
            Arc::new(MemoryCacheLayer::new(config.memory_layer())),
            Arc::new(NetworkCacheLayer::new(config.network_layer())),
            Arc::new(storage),
        ))
    }

    pub fn storage(&self) -> &Arc<dyn CollectionSource> {
        &self.storage
    }

    // == Lookup ==
    /// Resolves a query through the tiers.
    ///
    /// Always produces an answer. A memory hit touches nothing else; a network
    /// hit backfills memory; a storage read backfills network first and then
    /// memory. An empty storage answer is cached like any other, including
    /// the empty answer served when storage fails.
    pub fn lookup(&self, query: &Query) -> Lookup {
        let key = query.cache_key();

        if let Some(records) = probe(&*self.memory, &key) {
            debug!("Data retrieved from memory cache for key: {}", key);
            return Lookup {
                records,
                tier: CacheTier::Memory,
            };
        }

        if let Some(records) = probe(&*self.network, &key) {
            debug!("Data retrieved from network cache for key: {}", key);
            backfill(&*self.memory, &key, &records);
            return Lookup {
                records,
                tier: CacheTier::Network,
            };
        }

        debug!("Loading data from JSON storage for key: {}", key);
        let records = self.load(query).unwrap_or_else(|e| {
            warn!("Storage read failed for key {}, serving empty result: {}", key, e);
            Vec::new()
        });
        backfill(&*self.network, &key, &records);
        backfill(&*self.memory, &key, &records);

        debug!(
            "Loaded {} entries from collection '{}' for key: {}",
            records.len(),
            query.collection_name(),
            key
        );
        Lookup {
            records,
            tier: CacheTier::Storage,
        }
    }

    fn load(&self, query: &Query) -> Result<Records> {
        match query {
            Query::Collection { collection } => self.storage.load_collection(collection),
            Query::KeyEquals {
                collection,
                key,
                value,
            } => self.storage.find_by_key(collection, key, value),
            Query::KeyExists { collection, key } => {
                self.storage.find_by_key_exists(collection, key)
            }
        }
    }

    // == Lookup Surface ==
    /// All records of a collection.
    pub fn find_by_collection(&self, collection: &str) -> Records {
        self.lookup(&Query::collection(collection)).records
    }

    /// Records whose `key` (dot notation allowed) equals `value`.
    pub fn find_by_collection_and_key(
        &self,
        collection: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Records {
        self.lookup(&Query::key_equals(collection, key, value.into()))
            .records
    }

    /// Records in which `key` (dot notation allowed) is present.
    pub fn find_by_collection_and_key_exists(&self, collection: &str, key: &str) -> Records {
        self.lookup(&Query::key_exists(collection, key)).records
    }

    // == Administration ==
    /// Invalidates the cached data of a collection.
    ///
    /// Cache keys are opaque, so this clears every entry in both layers, not
    /// only the ones belonging to `collection`.
    pub fn invalidate_cache(&self, collection: &str) {
        info!("Invalidating cache for collection: {}", collection);
        self.clear_layers();
        info!("Cache invalidated for collection: {}", collection);
    }

    pub fn invalidate_all_caches(&self) {
        info!("Invalidating all caches");
        self.clear_layers();
        info!("All caches invalidated");
    }

    /// Loads a full collection through the tiered path so both layers hold it.
    pub fn warm_up_cache(&self, collection: &str) {
        info!("Warming up cache for collection: {}", collection);
        let lookup = self.lookup(&Query::collection(collection));
        info!(
            "Cache warmed up for collection: {} ({} entries, served from {})",
            collection,
            lookup.records.len(),
            lookup.tier
        );
    }

    pub fn cache_statistics(&self) -> AggregateCacheStatistics {
        AggregateCacheStatistics::from_layers(vec![self.memory.stats(), self.network.stats()])
    }

    /// Collection names currently present in storage.
    pub fn available_collections(&self) -> BTreeSet<String> {
        self.storage.list_collections().unwrap_or_else(|e| {
            warn!("Could not list collections: {}", e);
            BTreeSet::new()
        })
    }

    fn clear_layers(&self) {
        for layer in [&self.memory, &self.network] {
            if let Err(e) = layer.invalidate_all() {
                warn!("Failed to clear {}: {}", layer.name(), e);
            }
        }
    }
}

impl fmt::Debug for ExternalDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalDataService")
            .field("memory", &self.memory.name())
            .field("network", &self.network.name())
            .finish_non_exhaustive()
    }
}

/// A layer error counts as a miss.
fn probe(layer: &RecordLayer, key: &String) -> Option<Records> {
    match layer.get(key) {
        Ok(found) => found,
        Err(e) => {
            warn!("Treating {} failure as a miss for key {}: {}", layer.name(), key, e);
            None
        }
    }
}

/// A failed backfill is skipped; the lookup still succeeds.
fn backfill(layer: &RecordLayer, key: &str, records: &Records) {
    if let Err(e) = layer.put(key.to_string(), records.clone()) {
        warn!("Skipped backfill of {} for key {}: {}", layer.name(), key, e);
    }
}
