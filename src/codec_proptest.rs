//! Property-based tests for the stream codec, field stripping, and rendering.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use crate::codec::{chunks_to_stream, stream_to_chunks};
    use crate::diff::{render, DiffOptions};
    use crate::manifest::{canonicalize, IdentityKey, SnapshotIndex};
    use crate::resource::ResourceHandle;
    use crate::sanitize::FieldSanitizer;
    use proptest::prelude::*;
    use serde_json::{json, Value as JsonValue};

    fn flat_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("[a-z]{1,8}", "[a-zA-Z0-9 .:-]{0,12}", 0..6)
    }

    fn resource() -> impl Strategy<Value = JsonValue> {
        (
            "[a-z][a-z0-9-]{0,10}",
            flat_map(),
            flat_map(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(name, labels, data, with_status, with_uid)| {
                let mut doc = json!({
                    "apiVersion": "v1",
                    "kind": "ConfigMap",
                    "metadata": {"name": name, "labels": labels},
                    "data": data,
                });
                if with_status {
                    doc["status"] = json!({"phase": "Active"});
                }
                if with_uid {
                    doc["metadata"]["uid"] = json!("0d6c1f38");
                }
                doc
            })
    }

    // ============================================================================
    // Stream codec property tests
    // ============================================================================

    proptest! {
        /// Property: joining chunks and splitting the stream gives the chunks back
        #[test]
        fn chunks_round_trip(maps in prop::collection::vec(flat_map(), 0..6)) {
            let chunks: Vec<String> = maps
                .iter()
                .map(|m| serde_json::to_string(m).unwrap())
                .collect();

            let stream = chunks_to_stream(&chunks).unwrap();
            let decoded = stream_to_chunks(&stream).unwrap();
            prop_assert_eq!(decoded, chunks);
        }

        /// Property: a separator is only recognized at the start of a line
        #[test]
        fn inline_dashes_never_split(prefix in "[a-z]{1,6}", suffix in "[a-z]{0,6}") {
            let stream = format!("value: {}---{}\nother: x\n", prefix, suffix);
            let decoded = stream_to_chunks(&stream).unwrap();
            prop_assert_eq!(decoded.len(), 1);
        }
    }

    // ============================================================================
    // Field sanitizer property tests
    // ============================================================================

    proptest! {
        /// Property: stripping twice is the same as stripping once
        #[test]
        fn strip_is_idempotent(doc in resource()) {
            let sanitizer = FieldSanitizer::default();
            let once = sanitizer.strip(&doc);
            let twice = sanitizer.strip(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: documents without volatile fields pass through unchanged
        #[test]
        fn strip_without_volatile_fields_is_noop(labels in flat_map(), data in flat_map()) {
            let doc = json!({"metadata": {"labels": labels}, "data": data});
            prop_assert_eq!(FieldSanitizer::default().strip(&doc), doc);
        }
    }

    // ============================================================================
    // Rendering property tests
    // ============================================================================

    fn index_of(docs: &[JsonValue]) -> SnapshotIndex {
        let sanitizer = FieldSanitizer::default();
        docs.iter()
            .map(|doc| {
                let handle = ResourceHandle::from_object(doc.clone()).unwrap();
                (
                    IdentityKey::new(handle.kind(), handle.name()),
                    canonicalize(&handle, &sanitizer).unwrap(),
                )
            })
            .collect()
    }

    proptest! {
        /// Property: an index compared with itself renders nothing
        #[test]
        fn identical_indices_render_empty(docs in prop::collection::vec(resource(), 0..5)) {
            let index = index_of(&docs);
            prop_assert!(render(&index, &index, &DiffOptions::default()).unwrap().is_empty());
        }

        /// Property: rendering is deterministic
        #[test]
        fn render_is_deterministic(
            old in prop::collection::vec(resource(), 0..4),
            new in prop::collection::vec(resource(), 0..4),
        ) {
            let old = index_of(&old);
            let new = index_of(&new);
            let options = DiffOptions::default();
            prop_assert_eq!(
                render(&old, &new, &options).unwrap(),
                render(&old, &new, &options).unwrap()
            );
        }
    }
}
