//! Diagnostic types, message lookup and the per-file collector.
//!
//! Codes are grouped by the phase that reports them:
//! - 1xxx lexical errors (scanner)
//! - 2xxx syntax errors (parser)
//! - 3xxx reference resolution (binder)
//! - 4xxx type checking (binder)
//! - 5xxx classpath configuration
//! - 6xxx file input

use crate::position::{LineMap, Range};
use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Info,
}

impl DiagnosticCategory {
    /// Ordering weight used by the collector; higher sorts first at equal offsets.
    #[must_use]
    pub const fn severity_rank(self) -> u8 {
        match self {
            DiagnosticCategory::Error => 2,
            DiagnosticCategory::Warning => 1,
            DiagnosticCategory::Info => 0,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Info => "info",
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, DiagnosticCategory::Error)
    }
}

impl std::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What part of the front end a diagnostic came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    LexicalError,
    SyntaxError,
    UnresolvedReferenceError,
    AmbiguousReferenceError,
    TypeMismatchError,
    ConfigurationError,
    IoError,
}

impl DiagnosticKind {
    /// Derive the kind from a diagnostic code.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1000..=1999 => DiagnosticKind::LexicalError,
            2000..=2999 => DiagnosticKind::SyntaxError,
            diagnostic_codes::AMBIGUOUS_REFERENCE | diagnostic_codes::AMBIGUOUS_METHOD_CALL => {
                DiagnosticKind::AmbiguousReferenceError
            }
            3000..=3999 => DiagnosticKind::UnresolvedReferenceError,
            4000..=4999 => DiagnosticKind::TypeMismatchError,
            5000..=5999 => DiagnosticKind::ConfigurationError,
            _ => DiagnosticKind::IoError,
        }
    }
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

/// A diagnostic message attached to a file location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub kind: DiagnosticKind,
    /// Line/column range, filled in by [`resolve_ranges`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    #[must_use]
    pub const fn new(
        category: DiagnosticCategory,
        file: String,
        start: u32,
        length: u32,
        message: String,
        code: u32,
    ) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category,
            code,
            kind: DiagnosticKind::from_code(code),
            range: None,
            related_information: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self::new(DiagnosticCategory::Error, file, start, length, message, code)
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub const fn warning(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self::new(DiagnosticCategory::Warning, file, start, length, message, code)
    }

    /// Create a diagnostic from the message table, filling `{0}`, `{1}`, ...
    /// with `args`. Unknown codes produce an error with the code as message.
    #[must_use]
    pub fn from_code(file: &str, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        match get_diagnostic_message(code) {
            Some(msg) => Self::new(
                msg.category,
                file.to_string(),
                start,
                length,
                format_message(msg.message, args),
                code,
            ),
            None => Self::error(
                file.to_string(),
                start,
                length,
                format!("JV{code}"),
                code,
            ),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
        });
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.category.is_error()
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Message Table
// =============================================================================

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    // Lexical
    pub const INVALID_CHARACTER: u32 = 1001;
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const UNTERMINATED_CHAR_LITERAL: u32 = 1003;
    pub const UNTERMINATED_COMMENT: u32 = 1004;
    pub const EMPTY_CHAR_LITERAL: u32 = 1005;
    pub const ILLEGAL_ESCAPE_CHARACTER: u32 = 1006;
    pub const MALFORMED_NUMBER: u32 = 1007;
    pub const ILLEGAL_UNICODE_ESCAPE: u32 = 1008;
    pub const UNCLOSED_CHAR_LITERAL_MULTIPLE: u32 = 1009;
    pub const INTEGER_TOO_LARGE: u32 = 1010;

    // Syntax
    pub const TOKEN_EXPECTED: u32 = 2001;
    pub const IDENTIFIER_EXPECTED: u32 = 2002;
    pub const ILLEGAL_START_OF_EXPRESSION: u32 = 2003;
    pub const ILLEGAL_START_OF_TYPE: u32 = 2004;
    pub const TYPE_DECLARATION_EXPECTED: u32 = 2005;
    pub const ILLEGAL_START_OF_STATEMENT: u32 = 2006;
    pub const ILLEGAL_START_OF_MEMBER: u32 = 2007;
    pub const REPEATED_MODIFIER: u32 = 2008;
    pub const NOT_SUPPORTED_AT_SOURCE_LEVEL: u32 = 2009;
    pub const WITHOUT_ENCLOSING: u32 = 2010;
    pub const NOT_A_STATEMENT: u32 = 2011;
    pub const NESTING_TOO_DEEP: u32 = 2012;
    pub const TRY_WITHOUT_CATCH_OR_FINALLY: u32 = 2013;
    pub const UNEXPECTED_TOKEN: u32 = 2014;
    pub const ORPHANED_ELSE: u32 = 2015;

    // Resolution
    pub const CANNOT_FIND_SYMBOL: u32 = 3001;
    pub const PACKAGE_DOES_NOT_EXIST: u32 = 3002;
    pub const AMBIGUOUS_REFERENCE: u32 = 3003;
    pub const NO_SUITABLE_METHOD: u32 = 3004;
    pub const NO_SUITABLE_CONSTRUCTOR: u32 = 3005;
    pub const CANNOT_RESOLVE_IMPORT: u32 = 3006;
    pub const AMBIGUOUS_METHOD_CALL: u32 = 3007;
    pub const NON_STATIC_FROM_STATIC_CONTEXT: u32 = 3008;
    pub const DUPLICATE_CLASS: u32 = 3009;
    pub const UNUSED_IMPORT: u32 = 3100;
    pub const DUPLICATE_IMPORT: u32 = 3101;

    // Types
    pub const INCOMPATIBLE_TYPES: u32 = 4001;
    pub const UNEXPECTED_RETURN_VALUE: u32 = 4002;
    pub const MISSING_RETURN_VALUE: u32 = 4003;
    pub const BAD_OPERAND_TYPES: u32 = 4004;
    pub const CANNOT_DEREFERENCE_PRIMITIVE: u32 = 4005;

    // Configuration
    pub const CLASSPATH_ENTRY_NOT_FOUND: u32 = 5001;
    pub const CANNOT_READ_ARCHIVE: u32 = 5002;
    pub const CANNOT_READ_CLASS_FILE: u32 = 5003;
    pub const SOURCE_ROOT_NOT_FOUND: u32 = 5004;
    pub const DUPLICATE_TYPE_IN_CLASSPATH: u32 = 5005;

    // Input
    pub const CANNOT_READ_FILE: u32 = 6001;
    pub const INVALID_ENCODING: u32 = 6002;
    pub const BINARY_FILE: u32 = 6003;
}

use DiagnosticCategory::{Error, Info, Warning};

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage { code: 1001, category: Error, message: "illegal character: '{0}'" },
    DiagnosticMessage { code: 1002, category: Error, message: "unclosed string literal" },
    DiagnosticMessage { code: 1003, category: Error, message: "unclosed character literal" },
    DiagnosticMessage { code: 1004, category: Error, message: "unclosed comment" },
    DiagnosticMessage { code: 1005, category: Error, message: "empty character literal" },
    DiagnosticMessage { code: 1006, category: Error, message: "illegal escape character: '{0}'" },
    DiagnosticMessage { code: 1007, category: Error, message: "malformed number literal: '{0}'" },
    DiagnosticMessage { code: 1008, category: Error, message: "illegal unicode escape" },
    DiagnosticMessage { code: 1009, category: Error, message: "character literal contains more than one character" },
    DiagnosticMessage { code: 1010, category: Error, message: "integer number too large: {0}" },
    DiagnosticMessage { code: 2001, category: Error, message: "'{0}' expected but found '{1}'" },
    DiagnosticMessage { code: 2002, category: Error, message: "<identifier> expected but found '{0}'" },
    DiagnosticMessage { code: 2003, category: Error, message: "illegal start of expression: '{0}'" },
    DiagnosticMessage { code: 2004, category: Error, message: "illegal start of type: '{0}'" },
    DiagnosticMessage { code: 2005, category: Error, message: "class, interface, enum, or annotation type expected but found '{0}'" },
    DiagnosticMessage { code: 2006, category: Error, message: "illegal start of statement: '{0}'" },
    DiagnosticMessage { code: 2007, category: Error, message: "illegal start of class member: '{0}'" },
    DiagnosticMessage { code: 2008, category: Error, message: "repeated modifier: '{0}'" },
    DiagnosticMessage { code: 2009, category: Error, message: "'{0}' is not supported at source level 1.7" },
    DiagnosticMessage { code: 2010, category: Error, message: "'{0}' without '{1}'" },
    DiagnosticMessage { code: 2011, category: Error, message: "not a statement" },
    DiagnosticMessage { code: 2012, category: Error, message: "nesting too deep; construct skipped" },
    DiagnosticMessage { code: 2013, category: Error, message: "'try' without 'catch', 'finally' or resource declarations" },
    DiagnosticMessage { code: 2014, category: Error, message: "unexpected token: '{0}'" },
    DiagnosticMessage { code: 2015, category: Error, message: "'else' without 'if'" },
    DiagnosticMessage { code: 3001, category: Error, message: "cannot find symbol: {0} {1}" },
    DiagnosticMessage { code: 3002, category: Error, message: "package {0} does not exist" },
    DiagnosticMessage { code: 3003, category: Error, message: "reference to {0} is ambiguous: both {1} and {2} match" },
    DiagnosticMessage { code: 3004, category: Error, message: "no suitable method found for {0}({1})" },
    DiagnosticMessage { code: 3005, category: Error, message: "no suitable constructor found for {0}({1})" },
    DiagnosticMessage { code: 3006, category: Error, message: "cannot resolve import {0}" },
    DiagnosticMessage { code: 3007, category: Error, message: "reference to {0} is ambiguous: both {1} and {2} match" },
    DiagnosticMessage { code: 3008, category: Error, message: "non-static {0} {1} cannot be referenced from a static context" },
    DiagnosticMessage { code: 3009, category: Error, message: "duplicate class: {0}" },
    DiagnosticMessage { code: 3100, category: Warning, message: "the import {0} is never used" },
    DiagnosticMessage { code: 3101, category: Warning, message: "duplicate import {0}" },
    DiagnosticMessage { code: 4001, category: Error, message: "incompatible types: {0} cannot be converted to {1}" },
    DiagnosticMessage { code: 4002, category: Error, message: "incompatible types: unexpected return value" },
    DiagnosticMessage { code: 4003, category: Error, message: "missing return value" },
    DiagnosticMessage { code: 4004, category: Error, message: "bad operand types for binary operator '{0}'" },
    DiagnosticMessage { code: 4005, category: Error, message: "{0} cannot be dereferenced" },
    DiagnosticMessage { code: 5001, category: Error, message: "classpath entry {0} does not exist" },
    DiagnosticMessage { code: 5002, category: Error, message: "cannot read archive {0}: {1}" },
    DiagnosticMessage { code: 5003, category: Error, message: "cannot read class file {0}: {1}" },
    DiagnosticMessage { code: 5004, category: Error, message: "source root {0} does not exist" },
    DiagnosticMessage { code: 5005, category: Info, message: "type {0} in {1} is shadowed by an earlier classpath entry" },
    DiagnosticMessage { code: 6001, category: Error, message: "cannot read file {0}: {1}" },
    DiagnosticMessage { code: 6002, category: Warning, message: "file {0} is not valid {1}; invalid sequences were replaced" },
    DiagnosticMessage { code: 6003, category: Error, message: "file {0} appears to be binary" },
];

/// Look up a diagnostic message definition by code.
///
/// Returns the `DiagnosticMessage` with template string containing `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

// =============================================================================
// Collector
// =============================================================================

/// Merge parser and binder diagnostics for one file.
///
/// The result is ordered by start offset, with higher severity first at the
/// same offset. The sort is stable, so diagnostics that tie keep the order in
/// which they were produced (parser before binder).
#[must_use]
pub fn merge_diagnostics(parser: Vec<Diagnostic>, binder: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut merged = parser;
    merged.extend(binder);
    merged.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.category.severity_rank().cmp(&a.category.severity_rank()))
    });
    merged
}

/// Fill in line/column ranges for diagnostics belonging to `source`.
pub fn resolve_ranges(diagnostics: &mut [Diagnostic], line_map: &LineMap, source: &str) {
    for diag in diagnostics.iter_mut() {
        diag.range = Some(line_map.range(diag.start, diag.length, source));
    }
}

/// Count of (errors, warnings) in a diagnostic list.
#[must_use]
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize) {
    diagnostics
        .iter()
        .fold((0, 0), |(errors, warnings), d| match d.category {
            DiagnosticCategory::Error => (errors + 1, warnings),
            DiagnosticCategory::Warning => (errors, warnings + 1),
            DiagnosticCategory::Info => (errors, warnings),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(start: u32, category: DiagnosticCategory, code: u32) -> Diagnostic {
        Diagnostic::new(category, "A.java".into(), start, 1, format!("m{code}"), code)
    }

    #[test]
    fn test_merge_orders_by_offset_then_severity() {
        let parser = vec![diag(10, Warning, 6002), diag(3, Error, 2001)];
        let binder = vec![diag(10, Error, 3001), diag(1, Warning, 3100)];
        let merged = merge_diagnostics(parser, binder);
        let order: Vec<(u32, u32)> = merged.iter().map(|d| (d.start, d.code)).collect();
        assert_eq!(order, vec![(1, 3100), (3, 2001), (10, 3001), (10, 6002)]);
    }

    #[test]
    fn test_merge_is_stable_for_ties() {
        let parser = vec![diag(5, Error, 2001)];
        let binder = vec![diag(5, Error, 3001)];
        let merged = merge_diagnostics(parser, binder);
        assert_eq!(merged[0].code, 2001);
        assert_eq!(merged[1].code, 3001);
    }

    #[test]
    fn test_merge_empty_inputs() {
        assert!(merge_diagnostics(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(DiagnosticKind::from_code(1001), DiagnosticKind::LexicalError);
        assert_eq!(DiagnosticKind::from_code(2001), DiagnosticKind::SyntaxError);
        assert_eq!(
            DiagnosticKind::from_code(3001),
            DiagnosticKind::UnresolvedReferenceError
        );
        assert_eq!(
            DiagnosticKind::from_code(3003),
            DiagnosticKind::AmbiguousReferenceError
        );
        assert_eq!(
            DiagnosticKind::from_code(3007),
            DiagnosticKind::AmbiguousReferenceError
        );
        assert_eq!(DiagnosticKind::from_code(4002), DiagnosticKind::TypeMismatchError);
        assert_eq!(DiagnosticKind::from_code(5001), DiagnosticKind::ConfigurationError);
        assert_eq!(DiagnosticKind::from_code(6001), DiagnosticKind::IoError);
    }

    #[test]
    fn test_from_code_fills_template() {
        let d = Diagnostic::from_code("A.java", 0, 1, diagnostic_codes::TOKEN_EXPECTED, &[";", "}"]);
        assert_eq!(d.message_text, "';' expected but found '}'");
        assert_eq!(d.category, DiagnosticCategory::Error);
        assert_eq!(d.kind, DiagnosticKind::SyntaxError);

        let w = Diagnostic::from_code("A.java", 0, 1, diagnostic_codes::UNUSED_IMPORT, &["java.util.List"]);
        assert_eq!(w.category, DiagnosticCategory::Warning);
    }

    #[test]
    fn test_message_codes_are_unique() {
        let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
        codes.sort_unstable();
        let len = codes.len();
        codes.dedup();
        assert_eq!(codes.len(), len);
    }

    #[test]
    fn test_resolve_ranges() {
        let source = "class A {\n  int x = ;\n}";
        let map = LineMap::build(source);
        let mut diags = vec![diag(source.find(';').unwrap() as u32, Error, 2003)];
        resolve_ranges(&mut diags, &map, source);
        let range = diags[0].range.unwrap();
        assert_eq!(range.start.line, 1);
        assert_eq!(range.start.character, 10);
    }

    #[test]
    fn test_count_by_severity() {
        let diags = vec![diag(0, Error, 2001), diag(1, Warning, 3100), diag(2, Info, 5005)];
        assert_eq!(count_by_severity(&diags), (1, 1));
    }
}
