//! Volatile field removal
//!
//! Documents read back from a cluster carry bookkeeping fields (managed
//! fields, resource versions, status) that change on every apply. This module
//! removes them before documents are compared.
//!
//! ## Field Paths
//!
//! Paths use dot notation with two escapes for keys that contain dots:
//!
//! - `metadata.managedFields`
//! - `metadata.annotations["example.com/owner"]`
//! - `metadata.labels.app\.kubernetes\.io/name`
//!
//! Array indices are rejected: removing "element 0" twice removes two
//! different elements, which would break idempotence.

use std::iter::Peekable;
use std::str::Chars;

use serde_json::Value as JsonValue;

use crate::defaults::STRIP_FIELDS;
use crate::error::{Error, Result};

/// A parsed, key-only field path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    keys: Vec<String>,
}

impl FieldPath {
    /// Parse a field path, rejecting empty paths and array indices.
    ///
    /// ```
    /// use manifest_diff::sanitize::FieldPath;
    ///
    /// let path = FieldPath::parse(r#"metadata.annotations["example.com/owner"]"#).unwrap();
    /// assert_eq!(path.keys(), ["metadata", "annotations", "example.com/owner"]);
    /// assert!(FieldPath::parse("spec.containers[0]").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: String| Error::Config {
            message: format!("strip path `{}` {}", raw, reason),
        };

        let mut keys = Vec::new();
        let mut key = String::new();
        let mut chars = raw.trim().chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some(escaped) => key.push(escaped),
                    None => return Err(invalid("ends with a dangling escape".to_string())),
                },
                '.' => {
                    if !key.is_empty() {
                        keys.push(std::mem::take(&mut key));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        keys.push(std::mem::take(&mut key));
                    }
                    keys.push(quoted_key(&mut chars).map_err(&invalid)?);
                }
                _ => key.push(ch),
            }
        }
        if !key.is_empty() {
            keys.push(key);
        }

        if keys.is_empty() {
            return Err(invalid("is empty".to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            keys,
        })
    }

    /// The object keys from the root down.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Remove the field this path points to. Returns true if something was
    /// removed; a missing parent or a non-object along the way is a no-op.
    fn remove_from(&self, document: &mut JsonValue) -> bool {
        let Some((last, parents)) = self.keys.split_last() else {
            return false;
        };
        let mut current = document;
        for key in parents {
            match current.get_mut(key.as_str()) {
                Some(next) => current = next,
                None => return false,
            }
        }
        match current.as_object_mut() {
            Some(map) => map.remove(last.as_str()).is_some(),
            None => false,
        }
    }
}

/// Read the `"key"]` or `'key']` that follows a `[`.
fn quoted_key(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<String, String> {
    let quote = match chars.peek() {
        Some(&q @ ('"' | '\'')) => {
            chars.next();
            q
        }
        _ => {
            let inner: String = chars.by_ref().take_while(|c| *c != ']').collect();
            let inner = inner.trim();
            return Err(if inner.parse::<usize>().is_ok() {
                format!("uses array index [{}]; only object keys can be stripped", inner)
            } else {
                format!("has unquoted bracket key [{}]", inner)
            });
        }
    };

    let mut key = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => key.extend(chars.next()),
            c if c == quote => {
                return match chars.next() {
                    Some(']') => Ok(key),
                    _ => Err(format!("is missing `]` after key \"{}\"", key)),
                };
            }
            c => key.push(c),
        }
    }
    Err("has an unterminated quoted key".to_string())
}

/// Removes a fixed set of fields from documents before comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSanitizer {
    paths: Vec<FieldPath>,
}

impl FieldSanitizer {
    /// Build a sanitizer from dotted field paths.
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| FieldPath::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { paths })
    }

    /// The configured paths, in removal order.
    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    /// Remove every configured field from `document` in place.
    pub fn strip_in_place(&self, document: &mut JsonValue) {
        for path in &self.paths {
            if path.remove_from(document) {
                log::trace!("stripped `{}`", path.as_str());
            }
        }
    }

    /// Return a copy of `document` with every configured field removed.
    ///
    /// Absent fields are ignored and no other key is touched, so
    /// `strip(strip(doc)) == strip(doc)` and a document without any of the
    /// fields comes back unchanged.
    pub fn strip(&self, document: &JsonValue) -> JsonValue {
        let mut stripped = document.clone();
        self.strip_in_place(&mut stripped);
        stripped
    }
}

impl Default for FieldSanitizer {
    fn default() -> Self {
        Self {
            paths: STRIP_FIELDS
                .iter()
                .map(|p| FieldPath {
                    raw: p.to_string(),
                    keys: p.split('.').map(str::to_string).collect(),
                })
                .collect(),
        }
    }
}
