//! Error types for the persistent cache
//!
//! Provides unified error handling using thiserror.
//!
//! Cache misses are never errors: `get` resolves to a result record with
//! `found == false` for "never existed", "expired" and "non-functional
//! instance" alike. The variants here cover construction problems and the
//! I/O failures that do propagate.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the persistent cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid construction options (e.g. missing metrics sink)
    #[error("configuration error: {0}")]
    Config(String),

    /// Entry metadata does not fit the 16-bit frame length prefix
    #[error("entry metadata is {size} bytes; the frame limit is {limit}")]
    MetadataTooLarge { size: usize, limit: usize },

    /// A stored frame could not be decoded
    #[error("corrupt cache record: {0}")]
    CorruptRecord(String),

    /// JSON encode/decode failure for payloads or metadata
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O failure (other than a missing file, which is a miss)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Object store failure on the remote write path
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the persistent cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CacheError = io.into();
        assert!(matches!(err, CacheError::Io(_)));
    }

    #[test]
    fn test_metadata_too_large_message() {
        let err = CacheError::MetadataTooLarge {
            size: 70_000,
            limit: 65_535,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65535"));
    }
}
