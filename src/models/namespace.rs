//! Cache namespaces
//!
//! A namespace is a hierarchical qualifier that partitions the key space:
//! identical keys under different namespaces address unrelated entries.
//! Callers may pass a single string, an ordered list of segments, or nothing
//! at all. A slash-joined string and the equivalent list sanitize to the
//! same path.

use serde::{Deserialize, Serialize};

// == Namespace ==
/// The cache namespace, as supplied by the caller.
///
/// Serializes untagged so that stored metadata carries the namespace in the
/// same shape the caller used (string or array).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Namespace {
    /// A single namespace string (may itself contain `/` separators)
    Single(String),
    /// An ordered sequence of namespace segments
    List(Vec<String>),
}

impl Namespace {
    /// The raw namespace elements in order, before sanitization.
    ///
    /// A single string splits on `/`, so `"a/b"` and `["a", "b"]` produce
    /// the same elements.
    pub fn elements(&self) -> Vec<&str> {
        match self {
            Namespace::Single(s) => s.split('/').collect(),
            Namespace::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Namespace::Single(s.to_string())
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Namespace::Single(s)
    }
}

impl From<Vec<String>> for Namespace {
    fn from(list: Vec<String>) -> Self {
        Namespace::List(list)
    }
}

impl From<Vec<&str>> for Namespace {
    fn from(list: Vec<&str>) -> Self {
        Namespace::List(list.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Namespace {
    fn from(list: [&str; N]) -> Self {
        Namespace::List(list.iter().map(|s| s.to_string()).collect())
    }
}
