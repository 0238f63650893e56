//! # Lookup Command Implementation
//!
//! Prints the resource name a kind resolves to, using the built-in kind table
//! plus any `resource_kinds` from the configuration file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use manifest_diff::dictionary::ResourceDictionary;
use manifest_diff::error::Error;
use manifest_diff::suggestions;

use super::load_config;

/// Resolve resource kinds to their plural resource names
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Kinds to resolve, e.g. `Deployment`.
    #[arg(value_name = "KIND", required = true)]
    pub kinds: Vec<String>,

    /// Path to the configuration file.
    #[arg(short, long, value_name = "FILE", env = "MANIFEST_DIFF_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute the `lookup` command.
///
/// Every kind is looked up; if any is unknown the command fails after
/// printing the ones it could resolve.
pub fn execute(args: LookupArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let dictionary = config.dictionary();

    let mut first_error = None;
    for kind in &args.kinds {
        match dictionary.kind_to_resource(kind) {
            Ok(resource) => println!("{} -> {}", kind, resource),
            Err(Error::UnknownKind { kind, suggestion }) => {
                log::warn!("unknown kind `{}`", kind);
                if first_error.is_none() {
                    first_error = Some(suggestions::unknown_kind(&kind, suggestion.as_deref()));
                }
            }
            Err(other) => return Err(other.into()),
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
