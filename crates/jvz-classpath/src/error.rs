//! Error types for classpath construction and class file decoding.

use std::path::PathBuf;

use jvz_common::Diagnostic;
use thiserror::Error;

/// Run-wide failure to build a usable classpath.
///
/// Individual bad entries are not errors; they are recorded as diagnostics
/// on the index. This error is returned only when entries were supplied and
/// none of them could be used.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("none of the {supplied} configured classpath entries could be used")]
    NoUsableEntries {
        supplied: usize,
        /// Why each entry was skipped.
        diagnostics: Vec<Diagnostic>,
    },
}

impl ConfigurationError {
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ConfigurationError::NoUsableEntries { diagnostics, .. } => diagnostics,
        }
    }
}

/// Failure to decode one class file.
#[derive(Debug, Error)]
pub enum ClassFileError {
    #[error("not a class file (bad magic {0:#010x})")]
    BadMagic(u32),
    #[error("truncated class file at offset {0}")]
    Truncated(usize),
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },
    #[error("constant pool index {0} is invalid")]
    BadConstantIndex(u16),
    #[error("malformed signature `{signature}` at position {position}")]
    BadSignature { signature: String, position: usize },
    #[error("class file is larger than {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read archive entry {entry}: {source}")]
    Archive {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
}
