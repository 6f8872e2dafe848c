//! Result shape for the GET operation
//!
//! Misses are values, not errors: every lookup resolves to a `CacheResult`
//! whose `found` flag distinguishes hits from "never existed", "expired" and
//! "non-functional instance" alike, so callers can destructure uniformly.

use serde_json::Value;

use crate::models::{CacheValue, Namespace};

// == Cache Result ==
/// The outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheResult {
    /// The key that was looked up (as stored, for hits)
    pub key: String,
    /// The namespace that was looked up (as stored, for hits)
    pub namespace: Option<Namespace>,
    /// true when a live entry was found
    pub found: bool,
    /// The stored payload, absent on a miss or for metadata-only entries
    pub data: Option<CacheValue>,
    /// The stored caller metadata, absent on a miss
    pub metadata: Option<Value>,
    /// The absolute expiration in epoch ms, absent on a miss
    pub expiration: Option<i64>,
}

impl CacheResult {
    /// A not-found result for the given identifier.
    pub fn not_found(key: impl Into<String>, namespace: Option<&Namespace>) -> Self {
        Self {
            key: key.into(),
            namespace: namespace.cloned(),
            found: false,
            data: None,
            metadata: None,
            expiration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_shape() {
        let namespace = Namespace::from("products");
        let result = CacheResult::not_found("hash123", Some(&namespace));

        assert!(!result.found);
        assert_eq!(result.key, "hash123");
        assert_eq!(result.namespace, Some(namespace));
        assert!(result.data.is_none());
        assert!(result.metadata.is_none());
        assert!(result.expiration.is_none());
    }
}
