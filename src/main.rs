//! # Manifest Diff CLI
//!
//! This is the binary entry point for the `manifest-diff` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting errors; any error, including "Changes detected" from `diff`,
//!   exits with code 1.
//!
//! The core logic is defined in the `lib.rs` library crate, so the binary is a
//! thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
