//! # Diff Command Implementation
//!
//! This module implements the `diff` subcommand, which compares two rendered
//! manifest streams and shows which resources would be added, removed, or
//! changed.
//!
//! ## Functionality
//!
//! - **Change Detection**: Matches resources across the two streams by
//!   namespace, kind, and name, ignoring fields that change on every apply
//! - **Output Formats**: A unified text diff, or a JSON summary with
//!   `--format json`
//! - **Exit Codes**: Returns 0 if nothing changed, 1 if changes exist
//!
//! This command is read-only.
//!
//! ## Namespaces
//!
//! Change detection is namespace-aware, but text output keys each block by
//! `Kind/name` alone. A resource that keeps its kind and name while moving to
//! another namespace is one deletion plus one creation in the JSON summary,
//! yet renders as a single `has changed` block. The `Summary:` line counts
//! the rendered blocks, so it always agrees with the text above it.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use manifest_diff::diff::{changes, ChangeKind, DiffOptions, ResourceChange};
use manifest_diff::manifest::UpdateResult;
use manifest_diff::output::OutputConfig;
use manifest_diff::resource::read_handles;

use super::{ensure_single_stdin, explain, load_config, open_input};

/// Show differences between two manifest streams
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Manifest stream before the change (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub old: PathBuf,

    /// Manifest stream after the change (`-` reads stdin).
    #[arg(long, value_name = "FILE")]
    pub new: PathBuf,

    /// Number of unchanged lines shown around each change.
    #[arg(short = 'C', long, value_name = "LINES")]
    pub context: Option<usize>,

    /// Show Secret contents instead of redacting them.
    #[arg(long)]
    pub show_secrets: bool,

    /// Present every update as a full removal followed by a full addition.
    #[arg(long)]
    pub force_replace: bool,

    /// Keep carriage returns at line ends when comparing.
    #[arg(long)]
    pub keep_carriage_returns: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = DiffFormat::Text)]
    pub format: DiffFormat,

    /// Largest single document accepted from a stream, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_document_size: Option<usize>,

    /// Path to the configuration file.
    ///
    /// Defaults to `.manifest-diff.yaml` in the working directory when present.
    #[arg(short, long, value_name = "FILE", env = "MANIFEST_DIFF_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format for `diff`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiffFormat {
    /// Unified text diff.
    Text,
    /// JSON summary of created, updated, and deleted resources.
    Json,
}

/// Execute the `diff` command.
///
/// Returns `Ok(())` when nothing changed. When changes exist it prints them
/// and returns an error so the process exits with code 1.
pub fn execute(args: DiffArgs, output: &OutputConfig) -> Result<()> {
    ensure_single_stdin(&[&args.old, &args.new])?;

    let config = load_config(args.config.as_deref())?;
    let sanitizer = config.sanitizer()?;
    let max_document_size = args
        .max_document_size
        .unwrap_or_else(|| config.max_document_size());
    let options = options_for(&args, config.diff_options());

    let old = read_handles(open_input(&args.old)?, max_document_size)
        .map_err(|e| explain(e, &args.old))?;
    let new = read_handles(open_input(&args.new)?, max_document_size)
        .map_err(|e| explain(e, &args.new))?;
    log::info!(
        "comparing {} old and {} new resource(s)",
        old.len(),
        new.len()
    );

    let result = UpdateResult::between(old, new, &sanitizer);
    if result.is_empty() {
        if args.format == DiffFormat::Json {
            println!("{}", result.summary(&sanitizer, options.show_secrets)?.to_json()?);
        } else {
            println!("No changes detected.");
        }
        return Ok(());
    }

    match args.format {
        DiffFormat::Text => {
            let (old_index, new_index) = result.indices(args.force_replace, &sanitizer)?;
            let text = output.render(&old_index, &new_index, &options)?;
            let blocks = changes(&old_index, &new_index, &options)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            writeln!(stdout, "{}", summary_line(&blocks))?;
        }
        DiffFormat::Json => {
            println!("{}", result.summary(&sanitizer, options.show_secrets)?.to_json()?);
        }
    }

    Err(anyhow::anyhow!("Changes detected"))
}

fn options_for(args: &DiffArgs, base: DiffOptions) -> DiffOptions {
    let context = args.context.unwrap_or(base.context);
    base.with_context(context)
        .with_show_secrets(args.show_secrets)
        .with_strip_trailing_cr(!args.keep_carriage_returns)
}

/// The closing `Summary:` line, counted over rendered blocks.
fn summary_line(blocks: &[ResourceChange]) -> String {
    let count = |kind: ChangeKind| blocks.iter().filter(|b| b.kind == kind).count();
    format!(
        "Summary: {} added, {} changed, {} removed",
        count(ChangeKind::Added),
        count(ChangeKind::Changed),
        count(ChangeKind::Removed)
    )
}
