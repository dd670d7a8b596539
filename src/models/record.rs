//! Record model
//!
//! Collections are sequences of schemaless JSON objects. Keys may address
//! nested values with dot notation (`fee.base`).

use serde_json::{Map, Value};

/// One entry of a collection.
pub type Record = Map<String, Value>;

/// The cached unit: a full collection or a filtered slice of one.
pub type Records = Vec<Record>;

// == Path Lookup ==
/// Resolves a flat or dot-path key inside a record.
///
/// Returns `None` when any segment is missing or an intermediate value is not
/// an object.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// True when the (possibly nested) key is present, even if its value is null.
pub fn has_path(record: &Record, path: &str) -> bool {
    lookup_path(record, path).is_some()
}

/// True when the (possibly nested) key is present and equal to `expected`.
///
/// Numbers compare by numeric value, so `35` matches `35.0`.
pub fn matches_path(record: &Record, path: &str, expected: &Value) -> bool {
    lookup_path(record, path).is_some_and(|actual| values_equal(actual, expected))
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}
