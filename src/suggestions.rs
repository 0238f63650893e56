//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use manifest_diff::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Manifest file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::manifest_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for when a manifest input file is not found.
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest file not found: {path}\n\n\
         hint: Pass a rendered manifest stream (YAML documents separated by ---)\n\
         hint: Use - to read the stream from stdin",
        path = path.display()
    )
}

/// Generate an error for when an explicitly requested config file is missing.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .manifest-diff.yaml file in the working directory\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set MANIFEST_DIFF_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a document that exceeded the size limit.
pub fn document_too_large(limit: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "A document in the manifest stream is larger than {limit} bytes\n\n\
         hint: Raise the limit with --max-document-size <BYTES>\n\
         hint: Check that documents are separated by a line containing only ---"
    )
}

/// Generate an error for a kind missing from the resource dictionary.
pub fn unknown_kind(kind: &str, suggestion: Option<&str>) -> anyhow::Error {
    let did_you_mean = suggestion
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown resource kind: {kind}{did_you_mean}\n\n\
         hint: Add custom kinds under 'resource_kinds:' in .manifest-diff.yaml"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut row = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        row[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            row[j] = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[b_len]
}
