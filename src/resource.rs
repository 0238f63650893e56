//! Resource handles and the fetch-layer contract
//!
//! A [`ResourceHandle`] is one already-decoded resource: its identity
//! (`apiVersion`, `kind`, `metadata.name`, `metadata.namespace`) and the full
//! document. Handles are produced by whoever read the resource (a rendered
//! manifest stream, or the cluster via a fetch layer) and are never mutated.
//!
//! This crate performs no network I/O. The fetch layer is represented by the
//! [`LiveStateSource`] trait: given a [`ResourceLocator`] it returns the live
//! document, or `None` when the resource does not exist.

use std::fmt;
use std::io::Read;

use log::debug;
use serde_json::Value as JsonValue;

use crate::codec;
use crate::dictionary::ResourceDictionary;
use crate::error::{Error, Result};
use crate::manifest::{UpdateResult, UpdatedResource};

/// One decoded resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHandle {
    api_version: String,
    kind: String,
    name: String,
    namespace: String,
    object: JsonValue,
}

impl ResourceHandle {
    /// Build a handle from explicit identity parts.
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        object: JsonValue,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: namespace.into(),
            object,
        }
    }

    /// Build a handle from a decoded document, reading its identity fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the document is not a mapping or if
    /// `apiVersion`, `kind`, or `metadata.name` is missing or empty.
    pub fn from_object(object: JsonValue) -> Result<Self> {
        if !object.is_object() {
            return Err(Error::validation("manifest document must be a mapping"));
        }

        let api_version = required_str(&object, &["apiVersion"], "apiVersion")?;
        let kind = required_str(&object, &["kind"], "kind")?;
        let name = required_str(&object, &["metadata", "name"], "resource name")?;
        let namespace = lookup(&object, &["metadata", "namespace"])
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            api_version,
            kind,
            name,
            namespace,
            object,
        })
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, empty for cluster-scoped resources.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The full decoded document.
    pub fn object(&self) -> &JsonValue {
        &self.object
    }

    /// Resolve where the fetch layer should look for this resource.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a malformed `apiVersion`, and
    /// [`Error::UnknownKind`] when the dictionary has no entry for the kind.
    pub fn locate(&self, dictionary: &dyn ResourceDictionary) -> Result<ResourceLocator> {
        let (group, version) = parse_group_version(&self.api_version)?;
        let resource = dictionary.kind_to_resource(&self.kind)?;
        Ok(ResourceLocator {
            group,
            version,
            resource,
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        })
    }
}

impl fmt::Display for ResourceHandle {
    /// `namespace/Kind/name`, or `Kind/name` for cluster-scoped resources.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}/{}", self.kind, self.name)
        } else {
            write!(f, "{}/{}/{}", self.namespace, self.kind, self.name)
        }
    }
}

fn lookup<'a>(object: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    path.iter().try_fold(object, |current, key| current.get(key))
}

fn required_str(object: &JsonValue, path: &[&str], label: &str) -> Result<String> {
    match lookup(object, path).and_then(JsonValue::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Error::validation(format!(
            "{} cannot be empty in manifest",
            label
        ))),
    }
}

/// Split an `apiVersion` into group and version. The core group is empty.
pub fn parse_group_version(api_version: &str) -> Result<(String, String)> {
    let invalid = || Error::validation(format!("invalid apiVersion value `{}`", api_version));
    match api_version.split_once('/') {
        None if !api_version.is_empty() => Ok((String::new(), api_version.to_string())),
        None => Err(invalid()),
        Some((group, version)) => {
            if group.is_empty() || version.is_empty() || version.contains('/') {
                return Err(invalid());
            }
            Ok((group.to_string(), version.to_string()))
        }
    }
}

/// Everything the fetch layer needs to query one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceLocator {
    /// The REST path of the resource on a cluster API server.
    pub fn api_path(&self) -> String {
        let mut path = if self.group.is_empty() {
            format!("/api/{}", self.version)
        } else {
            format!("/apis/{}/{}", self.group, self.version)
        };
        if !self.namespace.is_empty() {
            path.push_str(&format!("/namespaces/{}", self.namespace));
        }
        path.push_str(&format!("/{}/{}", self.resource, self.name));
        path
    }
}

/// Source of live resource state, implemented by the fetch layer.
pub trait LiveStateSource {
    /// Fetch the live document for `locator`.
    ///
    /// Returns `Ok(None)` when the resource does not exist; that is a normal
    /// outcome, not an error.
    fn get(&self, locator: &ResourceLocator) -> Result<Option<JsonValue>>;
}

/// Outcome of [`plan_update`].
#[derive(Debug, Default)]
pub struct Plan {
    /// Created and updated resources.
    pub result: UpdateResult,
    /// Desired resources whose kind the dictionary could not resolve. They
    /// are left out of `result`; the caller decides whether that is fatal.
    pub unknown_kinds: Vec<ResourceHandle>,
}

/// Compare desired resources with live state.
///
/// A desired resource with no live counterpart is created; one that exists is
/// an update from the live document to the desired one.
///
/// # Errors
///
/// Fetch errors abort the plan, wrapped with the resource identity.
pub fn plan_update(
    desired: &[ResourceHandle],
    source: &dyn LiveStateSource,
    dictionary: &dyn ResourceDictionary,
) -> Result<Plan> {
    let mut plan = Plan::default();

    for handle in desired {
        let locator = match handle.locate(dictionary) {
            Ok(locator) => locator,
            Err(e) if e.is_unknown_kind() => {
                debug!("no resource mapping for {}, leaving it to the caller", handle);
                plan.unknown_kinds.push(handle.clone());
                continue;
            }
            Err(e) => return Err(e.for_resource(handle.to_string())),
        };

        let live = source
            .get(&locator)
            .map_err(|e| e.for_resource(handle.to_string()))?;

        match live {
            None => plan.result.created.push(handle.clone()),
            Some(object) => {
                let from = ResourceHandle::new(
                    handle.api_version(),
                    handle.kind(),
                    handle.name(),
                    handle.namespace(),
                    object,
                );
                plan.result
                    .updated
                    .push(UpdatedResource::new(Some(from), Some(handle.clone())));
            }
        }
    }

    Ok(plan)
}

/// Decode a manifest stream into resource handles.
///
/// # Errors
///
/// Fails on the first document that cannot be decoded or lacks an identity,
/// naming its 1-based position among the non-empty documents.
pub fn read_handles<R: Read>(reader: R, max_document_size: usize) -> Result<Vec<ResourceHandle>> {
    codec::read_values(reader, max_document_size)?
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            ResourceHandle::from_object(value)
                .map_err(|e| e.for_resource(format!("document {}", idx + 1)))
        })
        .collect()
}
