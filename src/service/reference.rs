//! Reference Data Accessors
//!
//! Typed lookups over the `states` and `license-classes` collections, as
//! consumed by rule evaluation. Absent data reads as `None`, `false` or zero.

use std::sync::Arc;

use serde_json::Value;

use crate::models::{lookup_path, Record};
use crate::service::ExternalDataService;

pub const STATES_COLLECTION: &str = "states";
pub const LICENSE_CLASSES_COLLECTION: &str = "license-classes";

/// Convenience accessors on top of the cached lookup surface.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    service: Arc<ExternalDataService>,
}

impl ReferenceData {
    pub fn new(service: Arc<ExternalDataService>) -> Self {
        Self { service }
    }

    /// First state whose `code` matches.
    pub fn state_by_code(&self, state_code: &str) -> Option<Record> {
        self.service
            .find_by_collection_and_key(STATES_COLLECTION, "code", state_code)
            .into_iter()
            .next()
    }

    /// First license class whose `class` matches.
    pub fn license_class_by_code(&self, class_code: &str) -> Option<Record> {
        self.service
            .find_by_collection_and_key(LICENSE_CLASSES_COLLECTION, "class", class_code)
            .into_iter()
            .next()
    }

    pub fn is_online_renewal_available(&self, state_code: &str) -> bool {
        self.state_by_code(state_code)
            .and_then(|state| bool_at(&state, "dmv.onlineRenewalAvailable"))
            .unwrap_or(false)
    }

    pub fn late_fee(&self, state_code: &str) -> f64 {
        self.state_by_code(state_code)
            .and_then(|state| number_at(&state, "dmv.lateFee"))
            .unwrap_or(0.0)
    }

    pub fn requires_driving_test(&self, class_code: &str) -> bool {
        self.license_class_by_code(class_code)
            .and_then(|class| bool_at(&class, "testRequirements.driving"))
            .unwrap_or(false)
    }

    pub fn renewal_fee(&self, class_code: &str) -> f64 {
        self.license_class_by_code(class_code)
            .and_then(|class| number_at(&class, "renewalFee"))
            .unwrap_or(0.0)
    }

    /// Minimum age in whole years; fractional values are truncated.
    pub fn minimum_age(&self, class_code: &str) -> u32 {
        self.license_class_by_code(class_code)
            .and_then(|class| number_at(&class, "minAge"))
            .map(|age| age.max(0.0) as u32)
            .unwrap_or(0)
    }
}

fn bool_at(record: &Record, path: &str) -> Option<bool> {
    lookup_path(record, path).and_then(Value::as_bool)
}

fn number_at(record: &Record, path: &str) -> Option<f64> {
    lookup_path(record, path).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCacheLayer, MemoryLayerConfig, NetworkCacheLayer, NetworkLayerConfig};
    use crate::storage::JsonFileStorage;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn reference_data() -> (TempDir, ReferenceData) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("states.json"),
            r#"[
                {"code": "CA", "name": "California", "dmv": {"onlineRenewalAvailable": true, "lateFee": 10.0}},
                {"code": "TX", "name": "Texas", "dmv": {"onlineRenewalAvailable": false}},
                {"code": "NV", "name": "Nevada"}
            ]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("license-classes.json"),
            r#"[
                {"class": "C", "renewalFee": 35.5, "minAge": 16, "testRequirements": {"driving": true}},
                {"class": "M", "renewalFee": 20}
            ]"#,
        )
        .unwrap();

        let service = ExternalDataService::new(
            Arc::new(MemoryCacheLayer::new(MemoryLayerConfig::default())),
            Arc::new(NetworkCacheLayer::new(NetworkLayerConfig {
                base_latency: Duration::ZERO,
                jitter: Duration::ZERO,
                simulation_enabled: false,
                ..NetworkLayerConfig::default()
            })),
            Arc::new(JsonFileStorage::new(dir.path()).unwrap()),
        );
        (dir, ReferenceData::new(Arc::new(service)))
    }

    #[test]
    fn test_state_accessors() {
        let (_dir, data) = reference_data();

        assert_eq!(
            data.state_by_code("CA").unwrap()["name"],
            Value::from("California")
        );
        assert!(data.state_by_code("ZZ").is_none());
        assert!(data.is_online_renewal_available("CA"));
        assert!(!data.is_online_renewal_available("TX"));
        assert!(!data.is_online_renewal_available("NV"));
        assert_eq!(data.late_fee("CA"), 10.0);
        assert_eq!(data.late_fee("TX"), 0.0);
    }

    #[test]
    fn test_license_class_accessors() {
        let (_dir, data) = reference_data();

        assert!(data.requires_driving_test("C"));
        assert!(!data.requires_driving_test("M"));
        assert_eq!(data.renewal_fee("C"), 35.5);
        assert_eq!(data.renewal_fee("M"), 20.0);
        assert_eq!(data.renewal_fee("X"), 0.0);
        assert_eq!(data.minimum_age("C"), 16);
        assert_eq!(data.minimum_age("M"), 0);
    }
}
