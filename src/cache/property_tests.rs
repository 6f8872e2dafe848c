//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify sanitization, framing and expiration-resolution
//! invariants across arbitrary inputs.

use proptest::prelude::*;
use serde_json::json;

use crate::cache::entry::{decode_frame, encode_frame, EntryMetadata};
use crate::cache::{DELTA_THRESHOLD, ONE_YEAR_MS};
use crate::keys::Sanitizer;
use crate::models::Namespace;

// == Strategies ==
/// Hash-like key segments, as callers are expected to supply
fn key_hash_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{8,40}"
}

/// Namespace elements including characters that need sanitization
fn namespace_element_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /\\\\*_.-]{1,16}"
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The final key segment is the caller's hash and is never reprocessed.
    #[test]
    fn prop_safe_key_is_final_segment_verbatim(
        leading in prop::collection::vec("[a-z]{1,8}", 0..3),
        hash in key_hash_strategy(),
    ) {
        let key = if leading.is_empty() {
            hash.clone()
        } else {
            format!("{}/{}", leading.join("/"), hash)
        };
        let id = Sanitizer::remote(None).sanitize(&key, None);
        prop_assert_eq!(id.safe_key, hash);
    }

    // Sanitized namespace elements never contain separators, wildcards or
    // whitespace, whatever the caller supplied.
    #[test]
    fn prop_elements_are_backend_safe(elements in prop::collection::vec(namespace_element_strategy(), 1..4)) {
        let ns = Namespace::List(elements);
        let id = Sanitizer::remote(None).sanitize("hash123", Some(&ns));
        for element in &id.elements {
            prop_assert!(!element.contains('/'));
            prop_assert!(!element.contains('\\'));
            prop_assert!(!element.contains('*'));
            prop_assert!(!element.chars().any(char::is_whitespace));
        }
    }

    // A slash-joined namespace string addresses the same identifier as the
    // equivalent element list.
    #[test]
    fn prop_string_and_list_namespaces_agree(elements in prop::collection::vec("[a-z]{1,8}", 1..4)) {
        let sanitizer = Sanitizer::remote(None);
        let joined = Namespace::Single(elements.join("/"));
        let list = Namespace::List(elements);

        let a = sanitizer.sanitize("hash123", Some(&joined));
        let b = sanitizer.sanitize("hash123", Some(&list));
        prop_assert_eq!(a.remote_key, b.remote_key);
        prop_assert_eq!(a.safe_namespace, b.safe_namespace);
    }

    // Framed records decode to exactly what was encoded.
    #[test]
    fn prop_frame_roundtrip(
        key in key_hash_strategy(),
        caller_metadata in "[a-zA-Z0-9 ]{0,64}",
        expiration in 0i64..4_000_000_000_000,
        is_json in any::<bool>(),
        payload in payload_strategy(),
    ) {
        let metadata = EntryMetadata {
            key,
            namespace: Some(Namespace::from("products")),
            metadata: Some(json!({ "note": caller_metadata })),
            expiration,
            is_json,
        };

        let frame = encode_frame(&metadata, Some(&payload)).unwrap();
        let (decoded, data) = decode_frame(&frame).unwrap();

        prop_assert_eq!(decoded, metadata);
        if payload.is_empty() {
            prop_assert!(data.is_none());
        } else {
            let data = data.unwrap();
            prop_assert_eq!(data.as_ref(), payload.as_slice());
        }
    }

    // Below the threshold an expiration is a delta from now; at or above,
    // it is absolute. Resolution never yields a timestamp before the
    // requested delta offset.
    #[test]
    fn prop_expiration_boundary(value in 0i64..(DELTA_THRESHOLD * 2)) {
        let now = 1_700_000_000_000;
        let resolved = super::facade::resolve_expiration(Some(value), now);
        if value < DELTA_THRESHOLD {
            prop_assert_eq!(resolved, now + value);
        } else {
            prop_assert_eq!(resolved, value);
        }
    }

    // Absent expirations always resolve one year out.
    #[test]
    fn prop_default_expiration(now in 1_000_000_000_000i64..2_000_000_000_000) {
        prop_assert_eq!(super::facade::resolve_expiration(None, now), now + ONE_YEAR_MS);
    }
}
