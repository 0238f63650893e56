//! # Configuration File
//!
//! This module defines the optional `.manifest-diff.yaml` file and the logic for
//! turning it into the values the library works with.
//!
//! ```yaml
//! context: 3
//! max_document_size: 10485760
//! strip_fields:
//!   - metadata.managedFields
//!   - status
//!   - metadata.annotations["deploy.example.com/revision"]
//! resource_kinds:
//!   Widget: widgets
//! ```
//!
//! Every field is optional. Missing fields fall back to the values in
//! [`crate::defaults`]; command-line flags take precedence over the file.
//! `strip_fields` replaces the default list rather than extending it, and
//! `resource_kinds` extends (or overrides) the built-in kind table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defaults::{CONTEXT_LINES, MAX_DOCUMENT_SIZE};
use crate::dictionary::KindTable;
use crate::diff::DiffOptions;
use crate::error::{Error, Result};
use crate::sanitize::FieldSanitizer;

/// Contents of a `.manifest-diff.yaml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Unchanged lines shown around each change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<usize>,

    /// Field paths removed before comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_fields: Option<Vec<String>>,

    /// Extra `Kind: resource` entries for the kind table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_kinds: BTreeMap<String, String>,

    /// Largest single document accepted from a stream, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_document_size: Option<usize>,
}

/// Parse configuration from a YAML string. An empty file is an empty config.
pub fn parse(yaml_content: &str) -> Result<Config> {
    if yaml_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::Config {
        message: format!("invalid configuration, {}", e),
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from a YAML file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.max_document_size == Some(0) {
            return Err(Error::Config {
                message: "max_document_size must be greater than zero".to_string(),
            });
        }
        if let Some(kind) = self.resource_kinds.keys().find(|k| k.trim().is_empty()) {
            return Err(Error::Config {
                message: format!("resource_kinds has an empty kind `{}`", kind),
            });
        }
        Ok(())
    }

    /// The field sanitizer, built from `strip_fields` or the default list.
    pub fn sanitizer(&self) -> Result<FieldSanitizer> {
        match &self.strip_fields {
            Some(paths) => FieldSanitizer::new(paths),
            None => Ok(FieldSanitizer::default()),
        }
    }

    /// The built-in kind table with `resource_kinds` layered on top.
    pub fn dictionary(&self) -> KindTable {
        KindTable::builtin().with_overlay(&self.resource_kinds)
    }

    /// Diff options with the configured context.
    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions::default().with_context(self.context.unwrap_or(CONTEXT_LINES))
    }

    pub fn max_document_size(&self) -> usize {
        self.max_document_size.unwrap_or(MAX_DOCUMENT_SIZE)
    }
}
