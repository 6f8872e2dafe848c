//! Cache Entry Module
//!
//! The stored metadata record and the local backend's framed on-disk
//! encoding: a 2-byte little-endian length prefix, exactly that many bytes
//! of JSON-encoded metadata, then the raw payload (possibly zero-length).

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::cache::METADATA_FRAME_LIMIT;
use crate::error::{CacheError, Result};
use crate::models::Namespace;

// == Entry Metadata ==
/// Metadata stored alongside every cache entry.
///
/// The `metadata` field is the caller's own JSON-serializable value; the
/// rest is what the cache needs to reconstruct a result and to enforce
/// expiration. Field names match the stored JSON (`isJSON`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// The key as supplied by the caller
    pub key: String,
    /// The namespace as supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Namespace>,
    /// Opaque caller metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Absolute expiration, epoch milliseconds
    pub expiration: i64,
    /// true when the payload is JSON-encoded rather than raw bytes
    #[serde(rename = "isJSON")]
    pub is_json: bool,
}

// == Frame Codec ==
/// Encodes an entry as a framed record.
///
/// Fails with [`CacheError::MetadataTooLarge`] when the metadata JSON does
/// not fit the 16-bit length prefix; this bounds metadata size at 65535
/// bytes.
pub fn encode_frame(metadata: &EntryMetadata, data: Option<&[u8]>) -> Result<Bytes> {
    let metadata_json = serde_json::to_vec(metadata)?;
    if metadata_json.len() > METADATA_FRAME_LIMIT {
        return Err(CacheError::MetadataTooLarge {
            size: metadata_json.len(),
            limit: METADATA_FRAME_LIMIT,
        });
    }

    let data_len = data.map_or(0, <[u8]>::len);
    let mut frame = BytesMut::with_capacity(2 + metadata_json.len() + data_len);
    frame.put_u16_le(metadata_json.len() as u16);
    frame.put_slice(&metadata_json);
    if let Some(data) = data {
        frame.put_slice(data);
    }
    Ok(frame.freeze())
}

/// Decodes a framed record into metadata and payload.
///
/// An empty payload slice decodes as "no data".
pub fn decode_frame(raw: &[u8]) -> Result<(EntryMetadata, Option<Bytes>)> {
    if raw.len() < 2 {
        return Err(CacheError::CorruptRecord(
            "frame shorter than its length prefix".to_string(),
        ));
    }
    let metadata_len = u16::from_le_bytes([raw[0], raw[1]]) as usize;
    let metadata_end = 2 + metadata_len;
    if raw.len() < metadata_end {
        return Err(CacheError::CorruptRecord(format!(
            "frame of {} bytes truncates its {}-byte metadata",
            raw.len(),
            metadata_len
        )));
    }

    let metadata: EntryMetadata = serde_json::from_slice(&raw[2..metadata_end])?;
    let payload = &raw[metadata_end..];
    let data = if payload.is_empty() {
        None
    } else {
        Some(Bytes::copy_from_slice(payload))
    };
    Ok((metadata, data))
}

// == Utility Functions ==
/// Returns the current epoch timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
