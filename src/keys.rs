//! Key Sanitizer Module
//!
//! Converts caller-supplied keys and namespaces into backend-safe forms.
//! Namespaces and keys face different character restrictions on the local
//! filesystem and in the object store; sanitizing here means callers can use
//! any characters without caring about either.
//!
//! The last `/`-separated segment of the key is a hash pre-computed by the
//! caller and is used verbatim. Any leading segments fold into the
//! namespace, so key values may embed `/`.

use std::path::{Path, PathBuf};

use crate::models::Namespace;

// == Sanitized Identifier ==
/// The backend-safe form of a key/namespace pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedIdentifier {
    /// The caller's pre-computed hash: the final segment of the key,
    /// never reprocessed
    pub safe_key: String,
    /// Cleaned namespace elements, in path order
    pub elements: Vec<String>,
    /// The namespace as a path string, ending in the separator
    pub safe_namespace: String,
    /// Full remote key (namespace path plus safe key)
    pub remote_key: String,
    /// Remote key for the data half of the paired objects
    pub remote_data_key: String,
    /// Remote key for the metadata half of the paired objects
    pub remote_metadata_key: String,
}

impl SanitizedIdentifier {
    /// The directory holding this entry's file under the given local root.
    pub fn namespace_dir(&self, root: &Path) -> PathBuf {
        let mut dir = root.to_path_buf();
        for element in &self.elements {
            dir.push(element);
        }
        dir
    }

    /// The full local file path for this entry under the given root.
    pub fn file_path(&self, root: &Path) -> PathBuf {
        self.namespace_dir(root).join(&self.safe_key)
    }
}

// == Sanitizer ==
/// Pure key/namespace sanitizer for one backend.
///
/// The separator is the platform path separator for the local backend and
/// `/` for the remote backend. The optional prefix becomes the leading path
/// element of every identifier (remote only).
#[derive(Debug, Clone)]
pub struct Sanitizer {
    prefix: Option<String>,
    separator: char,
}

impl Sanitizer {
    /// Sanitizer for the local filesystem backend.
    pub fn local() -> Self {
        Self {
            prefix: None,
            separator: std::path::MAIN_SEPARATOR,
        }
    }

    /// Sanitizer for the remote object-store backend.
    pub fn remote(prefix: Option<String>) -> Self {
        Self {
            prefix,
            separator: '/',
        }
    }

    /// Produces the backend-safe identifier for a key/namespace pair.
    pub fn sanitize(&self, key: &str, namespace: Option<&Namespace>) -> SanitizedIdentifier {
        let mut key_elements: Vec<&str> = key.split('/').collect();
        // The final segment is the hash chosen by the caller.
        let safe_key = key_elements.pop().unwrap_or_default().to_string();

        // Working list: instance prefix, namespace elements, then any
        // leading key path segments.
        let mut working: Vec<&str> = Vec::new();
        if let Some(prefix) = &self.prefix {
            working.push(prefix);
        }
        if let Some(namespace) = namespace {
            working.extend(namespace.elements());
        }
        working.extend(key_elements);

        let elements: Vec<String> = working
            .into_iter()
            .filter(|element| !element.is_empty())
            .map(|element| clean_element(element))
            .collect();

        let separator = self.separator.to_string();
        let safe_namespace = format!("{}{}", elements.join(&separator), separator);

        // With no real namespace and no prefix the namespace path reduces to
        // the bare separator; the remote key is then the safe key alone.
        let remote_key = if safe_namespace == separator {
            safe_key.clone()
        } else {
            format!("{safe_namespace}{safe_key}")
        };

        SanitizedIdentifier {
            remote_data_key: format!("{remote_key}.data"),
            remote_metadata_key: format!("{remote_key}.metadata"),
            remote_key,
            safe_key,
            elements,
            safe_namespace,
        }
    }
}

/// Replaces every whitespace, `/`, `\` or `*` character with `_`.
fn clean_element(element: &str) -> String {
    element
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' || c == '*' {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
