//! Default values for manifest-diff configuration.
//!
//! This module provides centralized default values used across the library
//! and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Number of unchanged lines shown around each changed region.
pub const CONTEXT_LINES: usize = 6;

/// Upper bound on the size of one document in a manifest stream (5 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 5 * 1024 * 1024;

/// Initial read size used when scanning a stream (4 KiB).
pub const SCAN_BUFFER_SIZE: usize = 4 * 1024;

/// Dotted paths removed from every document before comparison.
///
/// These fields are written by the cluster and change on every apply, so
/// leaving them in would bury the real change in noise.
pub const STRIP_FIELDS: &[&str] = &[
    "metadata.managedFields",
    "metadata.creationTimestamp",
    "metadata.resourceVersion",
    "metadata.selfLink",
    "metadata.uid",
    "spec.finalizers",
    "status",
];

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".manifest-diff.yaml";

/// Returns the default configuration file path.
///
/// This can be overridden by the `--config` CLI flag or the
/// `MANIFEST_DIFF_CONFIG` environment variable.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}
