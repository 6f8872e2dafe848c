//! Models Module
//!
//! Caller-facing data types for the cache contract: namespaces, payload
//! values, the `put` request shape and the uniform `get` result.

mod namespace;
mod requests;
mod responses;
mod value;

pub use namespace::Namespace;
pub use requests::PutRequest;
pub use responses::CacheResult;
pub use value::CacheValue;
