//! Cache Module
//!
//! The public cache façade plus the stored-entry encoding it is built on.

pub mod entry;
mod facade;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{EntryMetadata, now_ms};
pub use facade::PersistentCache;

// == Public Constants ==
/// The timestamp value for 1980-01-01T00:00:00, in epoch milliseconds.
/// Expirations below this are interpreted as deltas added to the current
/// time, which allows for deltas up to roughly ten years.
pub const DELTA_THRESHOLD: i64 = 315_561_600_000;

/// Default entry lifetime when the caller supplies no expiration.
pub const ONE_YEAR_MS: i64 = 365 * 24 * 3600 * 1000;

/// Upper bound on encoded entry metadata: it must fit the frame's 16-bit
/// length prefix.
pub const METADATA_FRAME_LIMIT: usize = u16::MAX as usize;
