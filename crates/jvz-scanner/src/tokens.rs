//! Lazy token stream over one file.

use jvz_common::Span;
use serde::Serialize;

use crate::scanner::{ScannerDiagnostic, ScannerState};
use crate::syntax_kind::SyntaxKind;

/// An owned token: kind, original-text span and lexeme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
    pub text: String,
}

/// Iterator returned by [`tokenize`].
///
/// Yields every token up to and including a single `EndOfFileToken`, then
/// stops. Lexical diagnostics accumulate as tokens are pulled.
pub struct Tokens {
    scanner: ScannerState,
    done: bool,
}

impl Tokens {
    /// Lexical diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[ScannerDiagnostic] {
        self.scanner.get_scanner_diagnostics()
    }

    /// Stop iterating and return the diagnostics.
    #[must_use]
    pub fn into_diagnostics(mut self) -> Vec<ScannerDiagnostic> {
        self.scanner.take_diagnostics()
    }
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let kind = self.scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            self.done = true;
        }
        Some(Token {
            kind,
            span: Span::new(self.scanner.token_start(), self.scanner.token_end()),
            text: self.scanner.token_text().to_string(),
        })
    }
}

impl std::iter::FusedIterator for Tokens {}

/// Tokenize `text`, skipping comments.
#[must_use]
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        scanner: ScannerState::new(text, true),
        done: false,
    }
}

/// Tokenize `text`, yielding comments as tokens.
#[must_use]
pub fn tokenize_with_comments(text: &str) -> Tokens {
    Tokens {
        scanner: ScannerState::new(text, false),
        done: false,
    }
}
