//! Cache payload values
//!
//! A payload is either raw bytes, stored verbatim, or an opaque
//! JSON-serializable value, stored JSON-encoded. The distinction is recorded
//! in the entry metadata (`isJSON`) so that `get` can return the same shape
//! that was stored.
//!
//! The recommended way to cache an HTTP response is to keep the status and
//! headers in the entry metadata and pass the body as bytes; JSON-encoding a
//! large body is slow and inflates the stored size.

use bytes::Bytes;

// == Cache Value ==
/// A payload stored in, or retrieved from, the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Raw bytes, round-tripped byte-exact
    Bytes(Bytes),
    /// A JSON value, round-tripped as a structurally equal value
    Json(serde_json::Value),
}

impl CacheValue {
    /// Returns the raw bytes, if this is a byte payload.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            CacheValue::Bytes(b) => Some(b),
            CacheValue::Json(_) => None,
        }
    }

    /// Returns the JSON value, if this is a JSON payload.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            CacheValue::Bytes(_) => None,
            CacheValue::Json(v) => Some(v),
        }
    }
}

impl From<Bytes> for CacheValue {
    fn from(b: Bytes) -> Self {
        CacheValue::Bytes(b)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(b: Vec<u8>) -> Self {
        CacheValue::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for CacheValue {
    fn from(b: &[u8]) -> Self {
        CacheValue::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<serde_json::Value> for CacheValue {
    fn from(v: serde_json::Value) -> Self {
        CacheValue::Json(v)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytes_accessors() {
        let value = CacheValue::from(b"abc".as_slice());
        assert_eq!(value.as_bytes().unwrap().as_ref(), b"abc");
        assert!(value.as_json().is_none());
    }

    #[test]
    fn test_json_accessors() {
        let value = CacheValue::from(json!({"price": 10}));
        assert!(value.as_bytes().is_none());
        assert_eq!(value.as_json().unwrap()["price"], 10);
    }
}
