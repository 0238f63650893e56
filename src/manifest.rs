//! Snapshot indices for diffing
//!
//! An [`UpdateResult`] lists what an operation creates, updates, and deletes.
//! [`build_indices`] turns it into two [`SnapshotIndex`] maps, "old" and
//! "new", keyed by [`IdentityKey`] and holding [`CanonicalDocument`]s, which is
//! the shape the diff engine compares.
//!
//! ## Identity
//!
//! Keys are `Kind/name`. They are not namespace-scoped: two resources with
//! the same kind and name in different namespaces collide, and the later one
//! overwrites the earlier (a warning is logged).
//!
//! ## Force Replace
//!
//! When an update replaces a resource instead of patching it, the two sides
//! get different key prefixes so they never pair up. The diff then shows the
//! old resource removed and the new one added in full.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::{debug, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::sanitize::FieldSanitizer;

/// Key prefix for the removed side of a force-replaced resource.
pub const FORCE_REPLACE_OLD: &str = "[FORCE REPLACE 1/2] ";

/// Key prefix for the added side of a force-replaced resource.
pub const FORCE_REPLACE_NEW: &str = "[FORCE REPLACE 2/2] ";

/// The key that correlates one resource across the old and new snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// `Kind/name`, with the kind's case preserved.
    pub fn new(kind: &str, name: &str) -> Self {
        Self(format!("{}/{}", kind, name))
    }

    /// `Kind/name` behind a marker prefix.
    pub fn with_prefix(prefix: &str, kind: &str, name: &str) -> Self {
        Self(format!("{}{}/{}", prefix, kind, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sanitized resource rendered as canonical YAML.
///
/// Mapping keys are emitted in sorted order, so two documents that differ
/// only in source key order produce the same `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDocument {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub content: String,
}

/// Identity key to canonical document, iterated in key order.
pub type SnapshotIndex = BTreeMap<IdentityKey, CanonicalDocument>;

/// One side-by-side update. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatedResource {
    pub from: Option<ResourceHandle>,
    pub to: Option<ResourceHandle>,
}

impl UpdatedResource {
    pub fn new(from: Option<ResourceHandle>, to: Option<ResourceHandle>) -> Self {
        Self { from, to }
    }
}

/// The resources an operation creates, updates, and deletes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub created: Vec<ResourceHandle>,
    pub updated: Vec<UpdatedResource>,
    pub deleted: Vec<ResourceHandle>,
}

impl UpdateResult {
    /// Returns true if nothing is created, updated, or deleted.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Classify two resource lists, for example two rendered manifests.
    ///
    /// Resources are matched by namespace, kind, and name. A match whose
    /// sanitized documents are equal is unchanged and left out.
    pub fn between(
        old: Vec<ResourceHandle>,
        new: Vec<ResourceHandle>,
        sanitizer: &FieldSanitizer,
    ) -> Self {
        let mut positions: HashMap<(String, String, String), usize> = HashMap::new();
        let mut old_slots: Vec<Option<ResourceHandle>> = Vec::with_capacity(old.len());
        for handle in old {
            let id = identity(&handle);
            if let Some(earlier) = positions.insert(id, old_slots.len()) {
                warn!("old manifest lists {} more than once; using the last copy", handle);
                old_slots[earlier] = None;
            }
            old_slots.push(Some(handle));
        }

        let mut result = UpdateResult::default();
        for handle in new {
            let matched = positions
                .remove(&identity(&handle))
                .and_then(|pos| old_slots[pos].take());
            match matched {
                None => result.created.push(handle),
                Some(from) => {
                    if sanitizer.strip(from.object()) == sanitizer.strip(handle.object()) {
                        debug!("{} is unchanged", handle);
                    } else {
                        result.updated.push(UpdatedResource::new(Some(from), Some(handle)));
                    }
                }
            }
        }
        result.deleted = old_slots.into_iter().flatten().collect();
        result
    }

    /// Build the old and new snapshot indices for this result.
    pub fn indices(
        &self,
        force_replace: bool,
        sanitizer: &FieldSanitizer,
    ) -> Result<(SnapshotIndex, SnapshotIndex)> {
        build_indices(
            &self.created,
            &self.updated,
            &self.deleted,
            force_replace,
            sanitizer,
        )
    }
}

fn identity(handle: &ResourceHandle) -> (String, String, String) {
    (
        handle.namespace().to_string(),
        handle.kind().to_string(),
        handle.name().to_string(),
    )
}

/// Sanitize a resource and render it as a canonical document.
///
/// # Errors
///
/// Returns [`Error::Resource`] wrapping an encoding error if the document
/// cannot be rendered.
pub fn canonicalize(
    handle: &ResourceHandle,
    sanitizer: &FieldSanitizer,
) -> Result<CanonicalDocument> {
    let stripped = sanitizer.strip(handle.object());
    let content = codec::value_to_yaml(&stripped).map_err(|e| {
        Error::encoding(format!("failed to encode resource as yaml, {}", e))
            .for_resource(handle.to_string())
    })?;

    Ok(CanonicalDocument {
        kind: handle.kind().to_string(),
        name: handle.name().to_string(),
        namespace: handle.namespace().to_string(),
        content,
    })
}

fn insert(index: &mut SnapshotIndex, side: &str, key: IdentityKey, document: CanonicalDocument) {
    let namespace = document.namespace.clone();
    if let Some(previous) = index.insert(key.clone(), document) {
        warn!(
            "{} snapshot already holds `{}` from namespace `{}`; replacing it with the one from namespace `{}`",
            side, key, previous.namespace, namespace
        );
    }
}

/// Build the old and new snapshot indices.
///
/// - created resources go into the new index
/// - deleted resources go into the old index
/// - each update puts `from` into the old index and `to` into the new one
///
/// With `force_replace`, update keys get [`FORCE_REPLACE_OLD`] and
/// [`FORCE_REPLACE_NEW`] prefixes. Absent update sides are skipped.
///
/// # Errors
///
/// The first resource that fails to canonicalize aborts the whole build.
pub fn build_indices(
    created: &[ResourceHandle],
    updated: &[UpdatedResource],
    deleted: &[ResourceHandle],
    force_replace: bool,
    sanitizer: &FieldSanitizer,
) -> Result<(SnapshotIndex, SnapshotIndex)> {
    let mut old_index = SnapshotIndex::new();
    let mut new_index = SnapshotIndex::new();

    for handle in created {
        let key = IdentityKey::new(handle.kind(), handle.name());
        insert(&mut new_index, "new", key, canonicalize(handle, sanitizer)?);
    }

    for handle in deleted {
        let key = IdentityKey::new(handle.kind(), handle.name());
        insert(&mut old_index, "old", key, canonicalize(handle, sanitizer)?);
    }

    for update in updated {
        if let Some(from) = &update.from {
            let key = if force_replace {
                IdentityKey::with_prefix(FORCE_REPLACE_OLD, from.kind(), from.name())
            } else {
                IdentityKey::new(from.kind(), from.name())
            };
            insert(&mut old_index, "old", key, canonicalize(from, sanitizer)?);
        }
        if let Some(to) = &update.to {
            let key = if force_replace {
                IdentityKey::with_prefix(FORCE_REPLACE_NEW, to.kind(), to.name())
            } else {
                IdentityKey::new(to.kind(), to.name())
            };
            insert(&mut new_index, "new", key, canonicalize(to, sanitizer)?);
        }
    }

    debug!(
        "built snapshot indices: {} old, {} new",
        old_index.len(),
        new_index.len()
    );
    Ok((old_index, new_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};

    fn handle(kind: &str, name: &str, namespace: &str, spec: JsonValue) -> ResourceHandle {
        let mut metadata = json!({"name": name});
        if !namespace.is_empty() {
            metadata["namespace"] = json!(namespace);
        }
        ResourceHandle::from_object(json!({
            "apiVersion": "v1",
            "kind": kind,
            "metadata": metadata,
            "spec": spec,
        }))
        .unwrap()
    }

    fn key(s: &str) -> IdentityKey {
        IdentityKey(s.to_string())
    }

    #[test]
    fn test_identity_key_format() {
        assert_eq!(IdentityKey::new("Deployment", "web").as_str(), "Deployment/web");
        assert_eq!(
            IdentityKey::with_prefix(FORCE_REPLACE_OLD, "Deployment", "web").to_string(),
            "[FORCE REPLACE 1/2] Deployment/web"
        );
    }

    #[test]
    fn test_force_replace_old_side_sorts_first() {
        let old = IdentityKey::with_prefix(FORCE_REPLACE_OLD, "Service", "z");
        let new = IdentityKey::with_prefix(FORCE_REPLACE_NEW, "Service", "a");
        assert!(old < new);
    }

    #[test]
    fn test_canonicalize_strips_and_sorts() {
        let h = ResourceHandle::from_object(json!({
            "kind": "ConfigMap",
            "metadata": {"uid": "123", "name": "cfg"},
            "apiVersion": "v1",
            "data": {"b": "2", "a": "1"},
            "status": {"phase": "x"}
        }))
        .unwrap();
        let doc = canonicalize(&h, &FieldSanitizer::default()).unwrap();
        assert_eq!(
            doc.content,
            "apiVersion: v1\ndata:\n  a: '1'\n  b: '2'\nkind: ConfigMap\nmetadata:\n  name: cfg\n"
        );
        assert_eq!(doc.kind, "ConfigMap");
        assert_eq!(doc.name, "cfg");
    }

    #[test]
    fn test_build_indices_places_each_list() {
        let created = vec![handle("Service", "new-svc", "default", json!({}))];
        let deleted = vec![handle("Service", "old-svc", "default", json!({}))];
        let updated = vec![UpdatedResource::new(
            Some(handle("Deployment", "web", "default", json!({"replicas": 1}))),
            Some(handle("Deployment", "web", "default", json!({"replicas": 2}))),
        )];

        let (old, new) =
            build_indices(&created, &updated, &deleted, false, &FieldSanitizer::default()).unwrap();

        assert_eq!(old.keys().collect::<Vec<_>>(), vec![&key("Deployment/web"), &key("Service/old-svc")]);
        assert_eq!(new.keys().collect::<Vec<_>>(), vec![&key("Deployment/web"), &key("Service/new-svc")]);
        assert!(old[&key("Deployment/web")].content.contains("replicas: 1"));
        assert!(new[&key("Deployment/web")].content.contains("replicas: 2"));
    }

    #[test]
    fn test_build_indices_force_replace_prefixes_both_sides() {
        let updated = vec![UpdatedResource::new(
            Some(handle("Deployment", "web", "", json!({"replicas": 1}))),
            Some(handle("Deployment", "web", "", json!({"replicas": 2}))),
        )];
        let (old, new) = build_indices(&[], &updated, &[], true, &FieldSanitizer::default()).unwrap();

        assert!(old.contains_key(&key("[FORCE REPLACE 1/2] Deployment/web")));
        assert!(new.contains_key(&key("[FORCE REPLACE 2/2] Deployment/web")));
        assert!(!old.contains_key(&key("Deployment/web")));
    }

    #[test]
    fn test_build_indices_skips_absent_sides() {
        let updated = vec![
            UpdatedResource::new(None, Some(handle("Pod", "a", "", json!({})))),
            UpdatedResource::new(Some(handle("Pod", "b", "", json!({}))), None),
            UpdatedResource::new(None, None),
        ];
        let (old, new) = build_indices(&[], &updated, &[], false, &FieldSanitizer::default()).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(new.len(), 1);
        assert!(old.contains_key(&key("Pod/b")));
        assert!(new.contains_key(&key("Pod/a")));
    }

    #[test]
    fn test_build_indices_collision_overwrites_and_warns() {
        testing_logger::setup();
        let created = vec![
            handle("ConfigMap", "settings", "team-a", json!({"v": "a"})),
            handle("ConfigMap", "settings", "team-b", json!({"v": "b"})),
        ];
        let (_, new) = build_indices(&created, &[], &[], false, &FieldSanitizer::default()).unwrap();

        assert_eq!(new.len(), 1);
        assert_eq!(new[&key("ConfigMap/settings")].namespace, "team-b");
        testing_logger::validate(|logs| {
            assert!(logs
                .iter()
                .any(|l| l.level == log::Level::Warn && l.body.contains("ConfigMap/settings")));
        });
    }

    #[test]
    fn test_between_classifies_changes() {
        let old = vec![
            handle("Deployment", "web", "default", json!({"replicas": 1})),
            handle("Service", "web", "default", json!({"port": 80})),
            handle("ConfigMap", "gone", "default", json!({})),
        ];
        let new = vec![
            handle("Deployment", "web", "default", json!({"replicas": 2})),
            handle("Service", "web", "default", json!({"port": 80})),
            handle("Secret", "fresh", "default", json!({})),
        ];

        let result = UpdateResult::between(old, new, &FieldSanitizer::default());

        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].name(), "fresh");
        assert_eq!(result.updated.len(), 1);
        assert_eq!(result.updated[0].to.as_ref().unwrap().kind(), "Deployment");
        assert_eq!(result.deleted.len(), 1);
        assert_eq!(result.deleted[0].name(), "gone");
    }

    #[test]
    fn test_between_ignores_volatile_fields() {
        let mut live = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "c", "resourceVersion": "99"},
            "data": {"k": "v"}
        });
        let desired = ResourceHandle::from_object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "c"},
            "data": {"k": "v"}
        }))
        .unwrap();
        live["status"] = json!({"observed": true});
        let live = ResourceHandle::from_object(live).unwrap();

        let result = UpdateResult::between(vec![live], vec![desired], &FieldSanitizer::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_between_namespaces_are_distinct() {
        let old = vec![handle("ConfigMap", "c", "a", json!({}))];
        let new = vec![handle("ConfigMap", "c", "b", json!({}))];
        let result = UpdateResult::between(old, new, &FieldSanitizer::default());
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.deleted.len(), 1);
        assert!(result.updated.is_empty());
    }
}
