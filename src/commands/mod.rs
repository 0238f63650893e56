//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `manifest-diff` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `manifest_diff` library.
//!
//! Helpers shared by several commands (config loading, input reading) live here.

pub mod convert;
pub mod diff;
pub mod lookup;

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use manifest_diff::config::{self, Config};
use manifest_diff::defaults;
use manifest_diff::error::Error;
use manifest_diff::suggestions;

/// Load the configuration file.
///
/// An explicitly named file must exist. Without one, `.manifest-diff.yaml` in
/// the working directory is used when present, and defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(suggestions::config_not_found(path));
            }
            path.to_path_buf()
        }
        None => {
            let path = defaults::default_config_path();
            if !path.exists() {
                log::debug!("no {} found, using defaults", path.display());
                return Ok(Config::default());
            }
            path
        }
    };

    log::debug!("loading configuration from {}", path.display());
    config::from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Open an input path, with `-` meaning stdin.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    if !path.exists() {
        return Err(suggestions::manifest_not_found(path));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(file))
}

/// Turn a library error into a user-facing one, adding hints where there
/// is something the user can do about it.
pub fn explain(err: Error, input: &Path) -> anyhow::Error {
    match err {
        Error::DocumentTooLarge { limit } => suggestions::document_too_large(limit),
        Error::UnknownKind { kind, suggestion } => {
            suggestions::unknown_kind(&kind, suggestion.as_deref())
        }
        other => anyhow::Error::new(other).context(format!("Failed to read {}", display(input))),
    }
}

fn display(path: &Path) -> String {
    if path == Path::new("-") {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Reject more than one `-` among the inputs, since stdin can only be read once.
pub fn ensure_single_stdin(paths: &[&PathBuf]) -> Result<()> {
    let count = paths.iter().filter(|p| p.as_path() == Path::new("-")).count();
    if count > 1 {
        anyhow::bail!("Only one input can be read from stdin (-)");
    }
    Ok(())
}
