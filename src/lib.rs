//! # Manifest Diff Library
//!
//! This library compares two snapshots of declarative configuration resources
//! (the state before an operation and the state after it) and renders a
//! deterministic, human-readable diff. It is used by the `manifest-diff`
//! command-line tool but works equally well embedded in a deployment tool that
//! wants to preview an update.
//!
//! ## Quick Example
//!
//! ```
//! use manifest_diff::defaults::MAX_DOCUMENT_SIZE;
//! use manifest_diff::diff::{diff_update_result, DiffOptions};
//! use manifest_diff::manifest::UpdateResult;
//! use manifest_diff::resource::read_handles;
//! use manifest_diff::sanitize::FieldSanitizer;
//!
//! let before = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app\ndata:\n  mode: slow\n";
//! let after = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: app\ndata:\n  mode: fast\n";
//!
//! let old = read_handles(before.as_bytes(), MAX_DOCUMENT_SIZE).unwrap();
//! let new = read_handles(after.as_bytes(), MAX_DOCUMENT_SIZE).unwrap();
//!
//! let sanitizer = FieldSanitizer::default();
//! let result = UpdateResult::between(old, new, &sanitizer);
//! let diff = diff_update_result(&result, false, &DiffOptions::default(), &sanitizer).unwrap();
//!
//! let text = String::from_utf8(diff).unwrap();
//! assert!(text.starts_with("ConfigMap/app has changed:"));
//! assert!(text.contains("-   mode: slow\n+   mode: fast\n"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Stream Codec (`codec`)**: splits multi-document YAML streams into
//!   single-document JSON chunks and joins them back.
//! - **Field Sanitizer (`sanitize`)**: removes fields that change on every
//!   apply (managed fields, resource versions, status) before comparison.
//! - **Resource Dictionary (`dictionary`)**: maps a resource kind to its plural
//!   resource name for the layer that fetches live state.
//! - **Manifest Indexer (`manifest`)**: turns the resources an update creates,
//!   updates, and deletes into "old" and "new" snapshot indices.
//! - **Diff Engine (`diff`)**: compares the two indices and renders the diff,
//!   redacting Secret contents unless asked not to.
//! - **Summary (`summary`)**: the same information as structured JSON.
//!
//! ## Execution Flow
//!
//! 1.  **Decode**: read both snapshots into [`resource::ResourceHandle`]s.
//! 2.  **Classify**: build a [`manifest::UpdateResult`], either by matching two
//!     decoded manifests or by asking a [`resource::LiveStateSource`] for the
//!     live counterpart of each desired resource.
//! 3.  **Index**: sanitize and canonicalize every resource into two sorted
//!     indices.
//! 4.  **Render**: walk the union of keys and print added, removed, and
//!     changed blocks.

pub mod codec;
pub mod config;
pub mod defaults;
pub mod diff;
pub mod dictionary;
pub mod error;
pub mod manifest;
pub mod output;
pub mod resource;
pub mod sanitize;
pub mod suggestions;
pub mod summary;

#[cfg(test)]
mod codec_proptest;
