//! Snapshot comparison and diff rendering
//!
//! [`changes`] walks the sorted union of keys in the old and new
//! [`SnapshotIndex`] and produces one [`ResourceChange`] per resource that was
//! added, removed, or changed. [`render`] turns them into plain text and
//! [`render_colored`] into terminal-styled text. Both are deterministic: the
//! same inputs always produce byte-identical output.
//!
//! ## Output Format
//!
//! ```text
//! Deployment/web has changed:
//!   kind: Deployment
//!   spec:
//! -   replicas: 1
//! +   replicas: 2
//!
//! Service/web has been added:
//! + apiVersion: v1
//! + kind: Service
//!
//! ```
//!
//! ## Secrets
//!
//! Unless [`DiffOptions::show_secrets`] is set, values under `data` and
//! `stringData` of a `Secret`, and its last-applied-configuration
//! annotation, are replaced before diffing. Unchanged values read `REDACTED`;
//! changed values read `-------- (redacted)` on the old side and
//! `++++++++ (redacted)` on the new side.
//!
//! Nothing else is redacted. A secret value placed in any other field of a
//! `Secret`, such as a label or an ordinary annotation, or in a resource of
//! another kind, is rendered as written.

use std::collections::BTreeSet;
use std::io::Write;

use console::style;
use log::debug;
use serde_json::Value as JsonValue;
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::codec;
use crate::defaults::CONTEXT_LINES;
use crate::error::Result;
use crate::manifest::{CanonicalDocument, IdentityKey, SnapshotIndex, UpdateResult};
use crate::sanitize::FieldSanitizer;

/// Replacement for a secret value that is the same on both sides.
pub const REDACTED: &str = "REDACTED";

/// Replacement for a changed secret value on the old side.
pub const REDACTED_OLD: &str = "-------- (redacted)";

/// Replacement for a changed secret value on the new side.
pub const REDACTED_NEW: &str = "++++++++ (redacted)";

const SECRET_KIND: &str = "Secret";
const SECRET_FIELDS: &[&str] = &["data", "stringData"];

// JSON pointer to metadata.annotations["kubectl.kubernetes.io/last-applied-configuration"]
const LAST_APPLIED_POINTER: &str =
    "/metadata/annotations/kubectl.kubernetes.io~1last-applied-configuration";

/// Options that control rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Unchanged lines shown around each change.
    pub context: usize,
    /// Drop `\r` at line ends before comparing.
    pub strip_trailing_cr: bool,
    /// Show Secret contents instead of redacting them.
    pub show_secrets: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context: CONTEXT_LINES,
            strip_trailing_cr: true,
            show_secrets: false,
        }
    }
}

impl DiffOptions {
    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    pub fn with_strip_trailing_cr(mut self, strip: bool) -> Self {
        self.strip_trailing_cr = strip;
        self
    }

    pub fn with_show_secrets(mut self, show: bool) -> Self {
        self.show_secrets = show;
        self
    }
}

/// How a resource differs between the two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present only in the new snapshot.
    Added,
    /// Present only in the old snapshot.
    Removed,
    /// Present in both with different content.
    Changed,
}

/// One rendered line of a resource diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Removed(String),
    Added(String),
    /// Separator between two hunks.
    Gap,
}

/// The diff for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub key: IdentityKey,
    pub kind: ChangeKind,
    pub lines: Vec<DiffLine>,
}

impl ResourceChange {
    /// The block header, e.g. `Deployment/web has changed:`.
    pub fn header(&self) -> String {
        let verb = match self.kind {
            ChangeKind::Added => "has been added",
            ChangeKind::Removed => "has been removed",
            ChangeKind::Changed => "has changed",
        };
        format!("{} {}:", self.key, verb)
    }
}

/// Compare two snapshot indices.
///
/// Keys are visited in sorted order. Entries whose content is identical on
/// both sides produce nothing.
pub fn changes(
    old: &SnapshotIndex,
    new: &SnapshotIndex,
    options: &DiffOptions,
) -> Result<Vec<ResourceChange>> {
    let keys: BTreeSet<&IdentityKey> = old.keys().chain(new.keys()).collect();
    let mut result = Vec::new();

    for key in keys {
        let (old_text, new_text) = prepare(old.get(key), new.get(key), options)?;
        let change = match (old_text, new_text) {
            (None, Some(text)) => ResourceChange {
                key: key.clone(),
                kind: ChangeKind::Added,
                lines: text.lines().map(|l| DiffLine::Added(l.to_string())).collect(),
            },
            (Some(text), None) => ResourceChange {
                key: key.clone(),
                kind: ChangeKind::Removed,
                lines: text.lines().map(|l| DiffLine::Removed(l.to_string())).collect(),
            },
            (Some(before), Some(after)) => {
                if before == after {
                    continue;
                }
                ResourceChange {
                    key: key.clone(),
                    kind: ChangeKind::Changed,
                    lines: hunks(&before, &after, options.context),
                }
            }
            (None, None) => continue,
        };
        result.push(change);
    }

    debug!("{} resource(s) differ", result.len());
    Ok(result)
}

/// Render the diff between two snapshot indices as plain text.
pub fn render(old: &SnapshotIndex, new: &SnapshotIndex, options: &DiffOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for change in changes(old, new, options)? {
        writeln!(out, "{}", change.header())?;
        for line in &change.lines {
            match line {
                DiffLine::Context(text) => writeln!(out, "  {}", text)?,
                DiffLine::Removed(text) => writeln!(out, "- {}", text)?,
                DiffLine::Added(text) => writeln!(out, "+ {}", text)?,
                DiffLine::Gap => writeln!(out, "...")?,
            }
        }
        writeln!(out)?;
    }
    Ok(out)
}

/// Render the diff with terminal colors: headers in yellow, removals in red,
/// additions in green.
///
/// Styling goes through `console`, which drops the escape codes when colors
/// are globally disabled.
pub fn render_colored(
    old: &SnapshotIndex,
    new: &SnapshotIndex,
    options: &DiffOptions,
) -> Result<String> {
    let mut out = String::new();
    for change in changes(old, new, options)? {
        out.push_str(&format!("{}\n", style(change.header()).yellow().bold()));
        for line in &change.lines {
            let styled = match line {
                DiffLine::Context(text) => format!("  {}", text),
                DiffLine::Removed(text) => style(format!("- {}", text)).red().to_string(),
                DiffLine::Added(text) => style(format!("+ {}", text)).green().to_string(),
                DiffLine::Gap => style("...").dim().to_string(),
            };
            out.push_str(&styled);
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}

/// Build both indices for `result` and render the diff between them.
pub fn diff_update_result(
    result: &UpdateResult,
    force_replace: bool,
    options: &DiffOptions,
    sanitizer: &FieldSanitizer,
) -> Result<Vec<u8>> {
    let (old, new) = result.indices(force_replace, sanitizer)?;
    render(&old, &new, options)
}

fn hunks(before: &str, after: &str, context: usize) -> Vec<DiffLine> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(before, after);

    let mut lines = Vec::new();
    for (idx, group) in diff.grouped_ops(context).iter().enumerate() {
        if idx > 0 {
            lines.push(DiffLine::Gap);
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }
    }
    lines
}

/// Produce the texts to compare for one key, applying Secret redaction and
/// carriage return stripping.
fn prepare(
    old: Option<&CanonicalDocument>,
    new: Option<&CanonicalDocument>,
    options: &DiffOptions,
) -> Result<(Option<String>, Option<String>)> {
    let (old_text, new_text) = visible_texts(old, new, options.show_secrets)?;
    if options.strip_trailing_cr {
        Ok((old_text.map(strip_cr), new_text.map(strip_cr)))
    } else {
        Ok((old_text, new_text))
    }
}

/// The content of one old/new pair as it may be shown: redacted when either
/// side is a Secret and `show_secrets` is off.
pub(crate) fn visible_texts(
    old: Option<&CanonicalDocument>,
    new: Option<&CanonicalDocument>,
    show_secrets: bool,
) -> Result<(Option<String>, Option<String>)> {
    let is_secret = old
        .into_iter()
        .chain(new)
        .any(|doc| doc.kind == SECRET_KIND);

    if is_secret && !show_secrets {
        redact_pair(old, new)
    } else {
        Ok((
            old.map(|doc| doc.content.clone()),
            new.map(|doc| doc.content.clone()),
        ))
    }
}

fn strip_cr(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        match line.strip_suffix('\n') {
            Some(body) => {
                out.push_str(body.strip_suffix('\r').unwrap_or(body));
                out.push('\n');
            }
            None => out.push_str(line.strip_suffix('\r').unwrap_or(line)),
        }
    }
    out
}

fn redact_pair(
    old: Option<&CanonicalDocument>,
    new: Option<&CanonicalDocument>,
) -> Result<(Option<String>, Option<String>)> {
    let mut old_value = old
        .map(|doc| serde_yaml::from_str::<JsonValue>(&doc.content))
        .transpose()?;
    let mut new_value = new
        .map(|doc| serde_yaml::from_str::<JsonValue>(&doc.content))
        .transpose()?;

    for field in SECRET_FIELDS {
        redact_values(
            old_value.as_mut().and_then(|v| v.get_mut(*field)),
            new_value.as_mut().and_then(|v| v.get_mut(*field)),
        );
    }
    redact_scalar(
        old_value.as_mut().and_then(|v| v.pointer_mut(LAST_APPLIED_POINTER)),
        new_value.as_mut().and_then(|v| v.pointer_mut(LAST_APPLIED_POINTER)),
    );

    let old_text = old_value.as_ref().map(codec::value_to_yaml).transpose()?;
    let new_text = new_value.as_ref().map(codec::value_to_yaml).transpose()?;
    Ok((old_text, new_text))
}

/// Redact the entries of a `data`-style map. Anything that is not a map on
/// both sides is replaced wholesale.
fn redact_values(old: Option<&mut JsonValue>, new: Option<&mut JsonValue>) {
    match (old, new) {
        (Some(JsonValue::Object(old_map)), Some(JsonValue::Object(new_map))) => {
            for (key, old_entry) in old_map.iter_mut() {
                let replacement = match new_map.get_mut(key) {
                    Some(new_entry) if *new_entry == *old_entry => {
                        *new_entry = JsonValue::from(REDACTED);
                        REDACTED
                    }
                    Some(new_entry) => {
                        *new_entry = JsonValue::from(REDACTED_NEW);
                        REDACTED_OLD
                    }
                    None => REDACTED_OLD,
                };
                *old_entry = JsonValue::from(replacement);
            }
            for (key, new_entry) in new_map.iter_mut() {
                if !old_map.contains_key(key) {
                    *new_entry = JsonValue::from(REDACTED_NEW);
                }
            }
        }
        (Some(JsonValue::Object(old_map)), None) => {
            old_map
                .values_mut()
                .for_each(|v| *v = JsonValue::from(REDACTED_OLD));
        }
        (None, Some(JsonValue::Object(new_map))) => {
            new_map
                .values_mut()
                .for_each(|v| *v = JsonValue::from(REDACTED_NEW));
        }
        (old, new) => redact_scalar(old, new),
    }
}

fn redact_scalar(old: Option<&mut JsonValue>, new: Option<&mut JsonValue>) {
    match (old, new) {
        (Some(old), Some(new)) if *old == *new => {
            *old = JsonValue::from(REDACTED);
            *new = JsonValue::from(REDACTED);
        }
        (old, new) => {
            if let Some(old) = old {
                *old = JsonValue::from(REDACTED_OLD);
            }
            if let Some(new) = new {
                *new = JsonValue::from(REDACTED_NEW);
            }
        }
    }
}
