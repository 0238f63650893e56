//! # Convert Command Implementation
//!
//! Converts between a multi-document YAML stream and JSON lines (one compact
//! JSON document per line).

use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use manifest_diff::codec;
use manifest_diff::suggestions;

use super::{explain, load_config, open_input};

/// Convert between YAML streams and JSON lines
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Target format.
    #[arg(long, value_enum)]
    pub to: TargetFormat,

    /// Input file (`-` or omitted reads stdin).
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathBuf,

    /// Largest single document accepted from a stream, in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_document_size: Option<usize>,

    /// Path to the configuration file.
    #[arg(short, long, value_name = "FILE", env = "MANIFEST_DIFF_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    /// YAML stream in, JSON lines out.
    Json,
    /// JSON lines in, YAML stream out.
    Yaml,
}

/// Execute the `convert` command.
///
/// The document size limit applies in both directions: to each document of
/// a YAML stream and to each JSON line.
pub fn execute(args: ConvertArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let max_document_size = args
        .max_document_size
        .unwrap_or_else(|| config.max_document_size());

    let mut stdout = std::io::stdout().lock();
    let reader = open_input(&args.input)?;

    match args.to {
        TargetFormat::Json => {
            let chunks = codec::read_chunks(reader, max_document_size)
                .map_err(|e| explain(e, &args.input))?;
            for chunk in chunks {
                writeln!(stdout, "{}", chunk)?;
            }
        }
        TargetFormat::Yaml => {
            let chunks = json_lines(BufReader::new(reader), max_document_size)?;
            let stream = codec::chunks_to_stream(&chunks)?;
            if !stream.is_empty() {
                writeln!(stdout, "{}", stream.trim_end_matches('\n'))?;
            }
        }
    }

    Ok(())
}

/// Read non-blank lines, checking that each is a JSON document no longer
/// than `max_document_size` bytes.
fn json_lines<R: BufRead>(mut reader: R, max_document_size: usize) -> Result<Vec<String>> {
    // Room for one byte past the limit plus a CRLF ending.
    let bound = max_document_size.saturating_add(3) as u64;
    let mut chunks = Vec::new();
    let mut line = Vec::new();
    let mut number = 0;

    loop {
        line.clear();
        let read = reader.by_ref().take(bound).read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        number += 1;
        if read as u64 == bound && !line.ends_with(b"\n") {
            return Err(suggestions::document_too_large(max_document_size));
        }

        let text = std::str::from_utf8(&line)
            .with_context(|| format!("Line {} is not valid UTF-8", number))?
            .trim();
        if text.is_empty() {
            continue;
        }
        if text.len() > max_document_size {
            return Err(suggestions::document_too_large(max_document_size));
        }
        serde_json::from_str::<serde_json::Value>(text)
            .with_context(|| format!("Line {} is not a JSON document", number))?;
        chunks.push(text.to_string());
    }
    Ok(chunks)
}
