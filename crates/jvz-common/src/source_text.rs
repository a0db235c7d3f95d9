//! Reading `.java` files: byte order marks, the configured encoding and
//! binary detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::diagnostics::{Diagnostic, diagnostic_codes};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Encoding assumed for files without a byte order mark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceEncoding {
    #[default]
    #[serde(rename = "UTF-8", alias = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "ISO-8859-1", alias = "iso-8859-1", alias = "latin1")]
    Latin1,
    #[serde(rename = "UTF-16", alias = "utf-16", alias = "utf16")]
    Utf16,
}

impl SourceEncoding {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Latin1 => "ISO-8859-1",
            SourceEncoding::Utf16 => "UTF-16",
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(SourceEncoding::Latin1),
            "utf-16" | "utf16" => Ok(SourceEncoding::Utf16),
            other => Err(format!(
                "unsupported encoding '{other}' (expected UTF-8, ISO-8859-1 or UTF-16)"
            )),
        }
    }
}

/// Decoded text of one file plus any warnings produced while decoding.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read and decode `path`. Unreadable and binary files are reported as a
/// single diagnostic.
pub fn read_source(path: &Path, encoding: SourceEncoding) -> Result<DecodedSource, Diagnostic> {
    let file = path.display().to_string();
    match std::fs::read(path) {
        Ok(bytes) => decode_source(&file, &bytes, encoding),
        Err(err) => {
            debug!(path = %file, error = %err, "cannot read source file");
            Err(Diagnostic::from_code(
                &file,
                0,
                0,
                diagnostic_codes::CANNOT_READ_FILE,
                &[&file, &err.to_string()],
            ))
        }
    }
}

/// Decode the bytes of `file`. A byte order mark overrides `encoding`.
pub fn decode_source(file: &str, bytes: &[u8], encoding: SourceEncoding) -> Result<DecodedSource, Diagnostic> {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return Ok(decode_utf16(file, rest, u16::from_be_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return Ok(decode_utf16(file, rest, u16::from_le_bytes));
    }
    if encoding == SourceEncoding::Utf16 {
        return Ok(decode_utf16(file, bytes, u16::from_be_bytes));
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    if is_binary(bytes) {
        return Err(Diagnostic::from_code(file, 0, 0, diagnostic_codes::BINARY_FILE, &[file]));
    }

    let text = match encoding {
        SourceEncoding::Latin1 => DecodedSource {
            text: bytes.iter().map(|&b| char::from(b)).collect(),
            diagnostics: Vec::new(),
        },
        SourceEncoding::Utf8 | SourceEncoding::Utf16 => match std::str::from_utf8(bytes) {
            Ok(text) => DecodedSource {
                text: text.to_string(),
                diagnostics: Vec::new(),
            },
            Err(err) => {
                debug!(file, valid_up_to = err.valid_up_to(), "invalid UTF-8, decoding lossily");
                DecodedSource {
                    text: String::from_utf8_lossy(bytes).into_owned(),
                    diagnostics: vec![invalid_encoding(file, SourceEncoding::Utf8)],
                }
            }
        },
    };
    Ok(text)
}

fn decode_utf16(file: &str, bytes: &[u8], word: fn([u8; 2]) -> u16) -> DecodedSource {
    let chunks = bytes.chunks_exact(2);
    let odd_length = !chunks.remainder().is_empty();
    let words: Vec<u16> = chunks.map(|pair| word([pair[0], pair[1]])).collect();
    let mut diagnostics = Vec::new();
    let text = match String::from_utf16(&words) {
        Ok(text) if !odd_length => text,
        _ => {
            diagnostics.push(invalid_encoding(file, SourceEncoding::Utf16));
            String::from_utf16_lossy(&words)
        }
    };
    DecodedSource { text, diagnostics }
}

fn invalid_encoding(file: &str, encoding: SourceEncoding) -> Diagnostic {
    Diagnostic::from_code(file, 0, 0, diagnostic_codes::INVALID_ENCODING, &[file, encoding.name()])
}

/// Heuristic for class files and other binaries passed as sources: NUL bytes
/// never occur in 8-bit Java text.
fn is_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    memchr::memchr(0, head).is_some()
}
