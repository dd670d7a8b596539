//! Lookup queries and their cache keys

use std::fmt;

use serde_json::Value;

// == Query ==
/// The three lookup shapes served by the tiered cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every record of a collection
    Collection { collection: String },
    /// Records whose (possibly nested) `key` equals `value`
    KeyEquals {
        collection: String,
        key: String,
        value: Value,
    },
    /// Records in which the (possibly nested) `key` is present
    KeyExists { collection: String, key: String },
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Query::Collection {
            collection: collection.into(),
        }
    }

    pub fn key_equals(collection: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Query::KeyEquals {
            collection: collection.into(),
            key: key.into(),
            value,
        }
    }

    pub fn key_exists(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Query::KeyExists {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Name of the collection this query reads.
    pub fn collection_name(&self) -> &str {
        match self {
            Query::Collection { collection }
            | Query::KeyEquals { collection, .. }
            | Query::KeyExists { collection, .. } => collection,
        }
    }

    // == Cache Key ==
    /// Deterministic cache key; a pure function of the query.
    ///
    /// - `COLLECTION:{collection}`
    /// - `{collection}:{key}={value}` (value JSON-encoded)
    /// - `{collection}:EXISTS:{key}`
    ///
    /// `\`, `:` and `=` inside collection names and keys are escaped with a
    /// backslash; keys of different shapes never collide. Numbers render by
    /// numeric value, so `35` and `35.0` share a key exactly when they match
    /// the same records.
    pub fn cache_key(&self) -> String {
        match self {
            Query::Collection { collection } => {
                format!("COLLECTION:{}", Segment(collection))
            }
            Query::KeyEquals {
                collection,
                key,
                value,
            } => format!(
                "{}:{}={}",
                Segment(collection),
                Segment(key),
                KeyValue(value)
            ),
            Query::KeyExists { collection, key } => {
                format!("{}:EXISTS:{}", Segment(collection), Segment(key))
            }
        }
    }
}

/// A collection name or key with the key delimiters escaped.
struct Segment<'a>(&'a str);

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if matches!(c, '\\' | ':' | '=') {
                f.write_str("\\")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Renders a filter value as JSON, with numbers normalized to their numeric
/// value.
struct KeyValue<'a>(&'a Value);

impl fmt::Display for KeyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Number(n) => match n.as_f64() {
                // -0.0 == 0.0 when matching
                Some(x) if x == 0.0 => f.write_str("0"),
                Some(x) => write!(f, "{}", x),
                None => write!(f, "{}", n),
            },
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
