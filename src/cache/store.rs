//! Cache Store Module
//!
//! Bounded key/value storage combining a HashMap with LRU tracking and optional
//! age-based expiry. The store is single-threaded; layers wrap it in a lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{CacheEntry, LruTracker};

// == Store Miss ==
/// Why a `get` produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMiss {
    /// Key was never stored or has been removed
    NotFound,
    /// Key was present but outlived its age limit; it has now been dropped
    Expired,
}

// == Bounded Store ==
/// Capacity-bounded storage with LRU eviction and optional TTL.
#[derive(Debug)]
pub struct BoundedStore<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    lru: LruTracker<K>,
    max_entries: usize,
    ttl: Option<Duration>,
}

impl<K: Hash + Eq + Clone, V> BoundedStore<K, V> {
    // == Constructor ==
    /// Creates a new store.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries held at once
    /// * `ttl` - Optional age limit applied to every entry
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
            ttl,
        }
    }

    // == Insert ==
    /// Upserts a value, resetting its age.
    ///
    /// If the key is new and the store is full, the least recently used entry
    /// is evicted first and its key returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, self.ttl));
        evicted
    }

    // == Get ==
    /// Retrieves a value and marks it most recently used.
    ///
    /// Expired entries are removed on access.
    pub fn get(&mut self, key: &K) -> Result<&V, StoreMiss> {
        let expired = match self.entries.get(key) {
            None => return Err(StoreMiss::NotFound),
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            return Err(StoreMiss::Expired);
        }

        self.lru.touch(key);
        self.entries
            .get(key)
            .map(|entry| &entry.value)
            .ok_or(StoreMiss::NotFound)
    }

    // == Remove ==
    /// Removes an entry, returning whether it existed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Checks presence without touching recency. Expired entries count as absent.
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }
}
