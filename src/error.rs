//! # Error Handling
//!
//! This module defines the centralized error type for `manifest-diff`. It uses
//! the `thiserror` library to describe every failure the diff core can report,
//! with enough context to locate the offending resource or document.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! ## Propagation
//!
//! Validation and encoding failures abort the whole diff or conversion call.
//! A partial diff is never returned: the output feeds human review and
//! automated gating, where a silently incomplete diff is worse than a failure.
//! When the failure belongs to a specific resource it is wrapped in
//! [`Error::Resource`] so the message names that resource.
//!
//! [`Error::UnknownKind`] is the exception: it is surfaced to the caller, which
//! decides whether to skip the resource or abort.

use thiserror::Error;

/// Main error type for manifest-diff operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required identity field (`apiVersion`, `kind`, or `metadata.name`)
    /// is missing or malformed in a supplied document.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A document could not be encoded or decoded, or a stream failed its
    /// round-trip verification.
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// A single document in a stream exceeded the configured size bound.
    #[error("Document too large: a single document exceeds the {limit} byte limit")]
    DocumentTooLarge { limit: usize },

    /// The resource dictionary has no entry for a kind.
    ///
    /// May carry the closest known kind as a suggestion.
    #[error("Unknown resource kind `{kind}`{}", suggestion.as_ref().map(|s| format!("\n  hint: did you mean `{}`?", s)).unwrap_or_default())]
    UnknownKind {
        kind: String,
        /// A known kind that is a likely typo match
        suggestion: Option<String>,
    },

    /// An invalid configuration value, such as a malformed strip path.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A failure while processing one resource, wrapped with its identity.
    #[error("Failed to process `{resource}`: {source}")]
    Resource {
        /// `namespace/Kind/name`, or `Kind/name` for cluster-scoped resources
        resource: String,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [`Error::Encoding`] with the given message.
    pub fn encoding(message: impl Into<String>) -> Self {
        Error::Encoding {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Wrap this error with the identity of the resource it belongs to.
    pub fn for_resource(self, resource: impl Into<String>) -> Self {
        Error::Resource {
            resource: resource.into(),
            source: Box::new(self),
        }
    }

    /// Returns true for [`Error::UnknownKind`], including when wrapped.
    pub fn is_unknown_kind(&self) -> bool {
        match self {
            Error::UnknownKind { .. } => true,
            Error::Resource { source, .. } => source.is_unknown_kind(),
            _ => false,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
