//! Java scanner/tokenizer for the jvz front end.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types and classification helpers
//! - `ScannerState` - Tokenizer state machine with lookahead snapshots
//! - `tokenize` - Lazy, owned token stream for one file
//! - Unicode escape pre-translation with offset mapping

pub mod scanner;
pub mod syntax_kind;
pub mod tokens;
pub mod unicode_escapes;

pub use scanner::{ScannerDiagnostic, ScannerSnapshot, ScannerState};
pub use syntax_kind::*;
pub use tokens::{Token, Tokens, tokenize, tokenize_with_comments};

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;
