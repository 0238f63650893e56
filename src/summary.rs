//! Structured summary of an update result
//!
//! The summary carries the canonical text of every resource involved in an
//! update, grouped the same way as [`UpdateResult`]. It is meant for machine
//! consumers, so it serializes to JSON.

use serde::{Deserialize, Serialize};

use crate::diff::visible_texts;
use crate::error::Result;
use crate::manifest::{canonicalize, UpdateResult};
use crate::resource::ResourceHandle;
use crate::sanitize::FieldSanitizer;

/// Canonical texts for one update. An absent side is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedSummary {
    pub from: String,
    pub to: String,
}

/// Canonical texts of everything an update creates, changes, and deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub created: Vec<String>,
    pub updated: Vec<UpdatedSummary>,
    pub deleted: Vec<String>,
}

impl UpdateSummary {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl UpdateResult {
    /// Summarize this result. Secret contents are redacted unless
    /// `show_secrets` is set, the same way the rendered diff redacts them.
    pub fn summary(&self, sanitizer: &FieldSanitizer, show_secrets: bool) -> Result<UpdateSummary> {
        let texts = |from: Option<&ResourceHandle>, to: Option<&ResourceHandle>| {
            let from = from.map(|h| canonicalize(h, sanitizer)).transpose()?;
            let to = to.map(|h| canonicalize(h, sanitizer)).transpose()?;
            let (from, to) = visible_texts(from.as_ref(), to.as_ref(), show_secrets)?;
            Ok::<_, crate::error::Error>((from.unwrap_or_default(), to.unwrap_or_default()))
        };

        let mut summary = UpdateSummary::default();
        for handle in &self.created {
            summary.created.push(texts(None, Some(handle))?.1);
        }
        for update in &self.updated {
            let (from, to) = texts(update.from.as_ref(), update.to.as_ref())?;
            summary.updated.push(UpdatedSummary { from, to });
        }
        for handle in &self.deleted {
            summary.deleted.push(texts(Some(handle), None)?.0);
        }
        Ok(summary)
    }
}
