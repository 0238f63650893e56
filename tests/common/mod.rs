//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and manifest
//! snippets to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_file("old.yaml", manifests::DEPLOYMENT_V1)
//!         .with_file("new.yaml", manifests::DEPLOYMENT_V2);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest streams used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// A Deployment with one replica, as read back from a cluster.
    pub const DEPLOYMENT_V1: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: default
  uid: 2f1b8a6e-90c4-4d3b-8f52-7c0f6f1a9e11
  resourceVersion: "4182"
  creationTimestamp: "2024-05-01T10:00:00Z"
spec:
  replicas: 1
status:
  readyReplicas: 1
"#;

    /// The same Deployment scaled to two replicas, as rendered locally.
    pub const DEPLOYMENT_V2: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: default
spec:
  replicas: 2
"#;

    /// A Service.
    pub const SERVICE: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: default
spec:
  type: ClusterIP
"#;

    /// A Secret whose token is `s3cr3t`.
    pub const SECRET: &str = r#"apiVersion: v1
kind: Secret
metadata:
  name: api
  namespace: default
stringData:
  token: s3cr3t
"#;

    /// Join documents into a stream.
    pub fn stream(documents: &[&str]) -> String {
        documents.join("---\n")
    }
}

/// A test fixture that provides a temporary directory with input files.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_file("old.yaml", manifests::SERVICE);
///
/// fixture
///     .command()
///     .args(["convert", "--to", "json", "old.yaml"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.manifest-diff.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".manifest-diff.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to a file in the temporary directory.
    pub fn file(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create a command for the manifest-diff binary, running in this
    /// fixture's directory with colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("manifest-diff");
        cmd.current_dir(self.path())
            .env_remove("MANIFEST_DIFF_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("old.yaml", manifests::SERVICE);
        assert!(fixture.file("old.yaml").exists());
    }

    #[test]
    fn test_manifests_are_valid_yaml() {
        for manifest in [
            manifests::DEPLOYMENT_V1,
            manifests::DEPLOYMENT_V2,
            manifests::SERVICE,
            manifests::SECRET,
        ] {
            serde_yaml::from_str::<serde_yaml::Value>(manifest).expect("Manifest should be valid YAML");
        }
    }
}
