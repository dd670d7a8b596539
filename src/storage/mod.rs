//! Storage Module
//!
//! The lowest tier of the lookup hierarchy and its source of truth.

mod json_file;

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::Result;
use crate::models::{has_path, matches_path, Records};

pub use json_file::JsonFileStorage;

// == Collection Source ==
/// Loads whole collections and filters them by flat or dot-path keys.
///
/// `load_collection` returns an empty sequence for a collection that does not
/// exist; `Err` is reserved for read failures and corrupt data.
pub trait CollectionSource: Send + Sync {
    fn load_collection(&self, collection: &str) -> Result<Records>;

    /// Collection names currently available. Re-scanned on every call.
    fn list_collections(&self) -> Result<BTreeSet<String>>;

    /// Whether a collection changed since it was last loaded. Sources that
    /// cannot tell report `false`.
    fn is_modified(&self, _collection: &str) -> bool {
        false
    }

    /// Records whose `key` equals `value`. Records missing the key are skipped.
    fn find_by_key(&self, collection: &str, key: &str, value: &Value) -> Result<Records> {
        Ok(self
            .load_collection(collection)?
            .into_iter()
            .filter(|record| matches_path(record, key, value))
            .collect())
    }

    /// Records in which `key` is present.
    fn find_by_key_exists(&self, collection: &str, key: &str) -> Result<Records> {
        Ok(self
            .load_collection(collection)?
            .into_iter()
            .filter(|record| has_path(record, key))
            .collect())
    }
}
