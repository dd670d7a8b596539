//! Service Module
//!
//! The lookup surface used by rule execution: query keys, the tiered
//! orchestrator, and typed reference-data accessors.

mod external_data;
mod query;
mod reference;

pub use external_data::{CacheTier, ExternalDataService, Lookup, RecordLayer};
pub use query::Query;
pub use reference::{ReferenceData, LICENSE_CLASSES_COLLECTION, STATES_COLLECTION};
