//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use manifest_diff::output::OutputConfig;

use crate::commands;

/// Manifest Diff - Preview how a set of configuration resources will change
#[derive(Parser, Debug)]
#[command(name = "manifest-diff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show differences between two manifest streams
    Diff(commands::diff::DiffArgs),

    /// Convert between YAML streams and JSON lines
    Convert(commands::convert::ConvertArgs),

    /// Resolve resource kinds to their plural resource names
    Lookup(commands::lookup::LookupArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        let output = OutputConfig::from_env_and_flag(&self.color);
        output.apply();

        match self.command {
            Commands::Diff(args) => commands::diff::execute(args, &output),
            Commands::Convert(args) => commands::convert::execute(args),
            Commands::Lookup(args) => commands::lookup::execute(args),
        }
    }
}

/// Initialize `env_logger` on stderr. `RUST_LOG` still refines the filter.
fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level
        .parse()
        .with_context(|| format!("Invalid log level: {}", level))?;

    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
    Ok(())
}
