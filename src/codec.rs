//! Multi-document stream codec
//!
//! This module converts between a multi-document YAML stream and a sequence
//! of single-document JSON strings.
//!
//! ## Splitting
//!
//! A document boundary is the byte sequence `"\n---"` followed immediately by
//! a newline (`\n` or `\r\n`) or by the end of input. A `---` anywhere else,
//! for example inside a scalar value, is document content. Splitting is done
//! by [`DocumentScanner`], which reads incrementally from any `std::io::Read`
//! and refuses to buffer more than one bounded document at a time.
//!
//! ## Example
//!
//! ```
//! use manifest_diff::codec::{chunks_to_stream, stream_to_chunks};
//!
//! let stream = chunks_to_stream(&[r#"{"hello":"world"}"#, r#"{"world":"hello"}"#]).unwrap();
//! let chunks = stream_to_chunks(&stream).unwrap();
//! assert_eq!(chunks, vec![r#"{"hello":"world"}"#, r#"{"world":"hello"}"#]);
//! ```

use std::io::{ErrorKind, Read};

use log::debug;
use serde_json::Value as JsonValue;

use crate::defaults::{MAX_DOCUMENT_SIZE, SCAN_BUFFER_SIZE};
use crate::error::{Error, Result};

const SEPARATOR: &[u8] = b"\n---";

/// Incremental splitter for multi-document streams.
///
/// Yields the raw bytes of each document, excluding the separator. At most
/// one document plus one read buffer is held in memory; a document longer
/// than `max_document_size` yields [`Error::DocumentTooLarge`] and ends the
/// iteration.
pub struct DocumentScanner<R> {
    reader: R,
    buf: Vec<u8>,
    scan_from: usize,
    max_document_size: usize,
    eof: bool,
    done: bool,
}

impl<R: Read> DocumentScanner<R> {
    /// Create a scanner with the default 5 MiB document limit.
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_DOCUMENT_SIZE)
    }

    /// Create a scanner with a custom document limit in bytes.
    pub fn with_limit(reader: R, max_document_size: usize) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(SCAN_BUFFER_SIZE),
            scan_from: 0,
            max_document_size,
            eof: false,
            done: false,
        }
    }

    fn next_document(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some((end, advance)) = self.find_separator() {
                let mut document: Vec<u8> = self.buf.drain(..advance).collect();
                document.truncate(end);
                self.scan_from = 0;
                self.check_size(document.len())?;
                return Ok(Some(document));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let document = std::mem::take(&mut self.buf);
                self.scan_from = 0;
                self.check_size(document.len())?;
                return Ok(Some(document));
            }

            // Whatever is buffered belongs to one unfinished document.
            let slack = SEPARATOR.len() + 2;
            if self.buf.len() > self.max_document_size.saturating_add(slack) {
                return Err(Error::DocumentTooLarge {
                    limit: self.max_document_size,
                });
            }

            self.fill()?;
        }
    }

    /// Locate the next complete separator. Returns the document end and the
    /// number of bytes to consume, or `None` when more input is needed.
    fn find_separator(&mut self) -> Option<(usize, usize)> {
        let mut start = self.scan_from;
        while let Some(offset) = find_subslice(&self.buf[start..], SEPARATOR) {
            let pos = start + offset;
            let after = pos + SEPARATOR.len();
            match (self.buf.get(after), self.buf.get(after + 1)) {
                (Some(b'\n'), _) => return Some((pos, after + 1)),
                (Some(b'\r'), Some(b'\n')) => return Some((pos, after + 2)),
                (None, _) if self.eof => return Some((pos, after)),
                (None, _) | (Some(b'\r'), None) if !self.eof => {
                    self.scan_from = pos;
                    return None;
                }
                _ => start = pos + 1,
            }
        }
        // Keep a tail so a separator split across reads is still found.
        self.scan_from = self.buf.len().saturating_sub(SEPARATOR.len() - 1);
        None
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; SCAN_BUFFER_SIZE];
        let read = loop {
            match self.reader.read(&mut chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if read == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..read]);
        }
        Ok(())
    }

    fn check_size(&self, len: usize) -> Result<()> {
        if len > self.max_document_size {
            return Err(Error::DocumentTooLarge {
                limit: self.max_document_size,
            });
        }
        Ok(())
    }
}

impl<R: Read> Iterator for DocumentScanner<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_document() {
            Ok(Some(document)) => Some(Ok(document)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strip a leading `---` marker line and report whether anything but blank
/// lines and comments remains.
fn document_body(raw: &[u8]) -> Option<&[u8]> {
    let body = if raw.starts_with(b"---") {
        match raw.get(3) {
            None => &raw[3..],
            Some(b'\n') => &raw[4..],
            Some(b'\r') if raw.get(4) == Some(&b'\n') => &raw[5..],
            Some(_) => raw,
        }
    } else {
        raw
    };

    let has_content = body.split(|b| *b == b'\n').any(|line| {
        let trimmed = line.trim_ascii();
        !trimmed.is_empty() && !trimmed.starts_with(b"#")
    });
    has_content.then_some(body)
}

/// Decode one raw document into a JSON value.
///
/// Returns `Ok(None)` for documents that carry no content (blank, comments
/// only, or an explicit null), which are not emitted as chunks.
pub fn decode_document(raw: &[u8]) -> Result<Option<JsonValue>> {
    let Some(body) = document_body(raw) else {
        return Ok(None);
    };
    let value: JsonValue = serde_yaml::from_slice(body)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Read every document of a stream as a JSON value.
///
/// Errors name the 1-based segment that failed.
pub fn read_values<R: Read>(reader: R, max_document_size: usize) -> Result<Vec<JsonValue>> {
    let mut values = Vec::new();
    for (idx, raw) in DocumentScanner::with_limit(reader, max_document_size).enumerate() {
        let raw = raw?;
        let segment = idx + 1;
        match decode_document(&raw) {
            Ok(Some(value)) => values.push(value),
            Ok(None) => debug!("skipping empty document at segment {}", segment),
            Err(e) => {
                return Err(Error::encoding(format!(
                    "failed to convert yaml document at segment {} to json, {}",
                    segment, e
                )))
            }
        }
    }
    Ok(values)
}

/// Read a stream into compact single-document JSON strings.
pub fn read_chunks<R: Read>(reader: R, max_document_size: usize) -> Result<Vec<String>> {
    read_values(reader, max_document_size)?
        .iter()
        .map(|value| serde_json::to_string(value).map_err(Error::from))
        .collect()
}

/// Split an in-memory YAML stream into single-document JSON strings.
pub fn stream_to_chunks(stream: &str) -> Result<Vec<String>> {
    read_chunks(stream.as_bytes(), MAX_DOCUMENT_SIZE)
}

/// Join single-document JSON strings into a YAML stream.
///
/// The produced stream is decoded again before it is returned; if it does
/// not yield exactly one document per input chunk the call fails with
/// [`Error::Encoding`].
pub fn chunks_to_stream<S: AsRef<str>>(chunks: &[S]) -> Result<String> {
    if chunks.is_empty() {
        return Ok(String::new());
    }

    let mut stream = String::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        if idx == 0 {
            stream.push_str("---\n");
        } else {
            stream.push_str("\n---\n");
        }
        stream.push_str(chunk.as_ref());
    }

    let decoded = read_chunks(stream.as_bytes(), usize::MAX).map_err(|e| {
        Error::encoding(format!(
            "failed to convert json chunks to yaml stream, {}",
            e
        ))
    })?;
    if decoded.len() != chunks.len() {
        return Err(Error::encoding(format!(
            "yaml stream decodes to {} documents, expected {}",
            decoded.len(),
            chunks.len()
        )));
    }

    Ok(stream)
}

/// Convert a single YAML document into compact JSON.
pub fn yaml_to_json(yaml: &str) -> Result<String> {
    let value: JsonValue = serde_yaml::from_str(yaml)?;
    Ok(serde_json::to_string(&value)?)
}

/// Convert a single JSON document into YAML.
pub fn json_to_yaml(json: &str) -> Result<String> {
    let value: JsonValue = serde_json::from_str(json)?;
    value_to_yaml(&value)
}

/// Render a JSON value as YAML with sorted mapping keys.
pub fn value_to_yaml(value: &JsonValue) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
