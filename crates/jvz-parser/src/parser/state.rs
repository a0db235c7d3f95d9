//! Parser state and shared parsing infrastructure.
//!
//! `ParserState` owns the scanner, the node arena and the diagnostics of one
//! compilation unit. Grammar rules live in the `state_*` modules; this file
//! holds token access, expectation helpers, lookahead and error recovery.
//!
//! Recovery model:
//! - A missing expected token is reported and treated as inserted; nothing
//!   is consumed.
//! - A token that cannot start the construct being parsed is reported and
//!   skipped up to a synchronizing token.
//! - After an error, further errors are suppressed until recovery has passed
//!   a `;`, `{` or `}` and then the grammar consumes a token or starts a new
//!   statement or member, so one bad token produces one diagnostic. A
//!   boundary token at the error position does not count: it is likely the
//!   bad token itself. A lexical error starts recovery the same way.
//! - Statement-level skipping stops at any token that can begin a statement
//!   or local declaration.
//! - Every list loop forces progress; recursion depth is capped.

use jvz_common::diagnostics::{Diagnostic, diagnostic_codes};
use jvz_common::limits::{MAX_PARSER_RECURSION_DEPTH, MAX_RESYNC_SKIP};
use jvz_scanner::{ScannerState, SyntaxKind, token_to_text};
use tracing::trace;

use super::base::NodeIndex;
use super::node::{NodeArena, NodeData};

/// Output of parsing one file.
#[derive(Debug)]
pub struct ParseResult {
    pub arena: NodeArena,
    pub root: NodeIndex,
    /// Lexical and syntax diagnostics ordered by start offset.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse one compilation unit.
///
/// Never fails: the returned tree always has a `CompilationUnit` root that
/// spans the whole input, and every problem is a diagnostic.
#[must_use]
pub fn parse(file_name: &str, text: &str) -> ParseResult {
    let mut parser = ParserState::new(file_name.to_string(), text);
    let root = parser.parse_compilation_unit();
    parser.into_result(root)
}

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) file_name: String,
    pub(crate) source_len: u32,
    pub(crate) parse_diagnostics: Vec<Diagnostic>,
    pub(crate) current_token: SyntaxKind,
    /// End offset of the last consumed token.
    pub(crate) prev_token_end: u32,
    pub(crate) recursion_depth: u32,
    /// Set when an error is reported; further errors are suppressed.
    pub(crate) in_error_recovery: bool,
    /// A `;`, `{` or `}` was passed since the last error. The next token the
    /// grammar consumes ends recovery.
    pub(crate) recovery_boundary_passed: bool,
    /// Start of the most recent error.
    pub(crate) recovery_error_pos: u32,
    /// Start of an integer literal that is the operand of unary minus.
    pub(crate) negated_literal_pos: Option<u32>,
}

impl ParserState {
    #[must_use]
    pub fn new(file_name: String, source: &str) -> Self {
        // Rough heuristic: one node per 4 bytes of source.
        let arena = NodeArena::with_capacity(source.len() / 4);
        ParserState {
            scanner: ScannerState::new(source, true),
            arena,
            file_name,
            source_len: source.len() as u32,
            parse_diagnostics: Vec::new(),
            current_token: SyntaxKind::Unknown,
            prev_token_end: 0,
            recursion_depth: 0,
            in_error_recovery: false,
            recovery_boundary_passed: false,
            recovery_error_pos: 0,
            negated_literal_pos: None,
        }
    }

    #[must_use]
    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    #[must_use]
    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.parse_diagnostics
    }

    #[must_use]
    pub fn into_result(self, root: NodeIndex) -> ParseResult {
        ParseResult {
            arena: self.arena,
            root,
            diagnostics: self.parse_diagnostics,
        }
    }

    /// Move the scanner's lexical diagnostics into the parse diagnostics and
    /// order everything by position.
    pub(crate) fn collect_scanner_diagnostics(&mut self) {
        for diag in self.scanner.take_diagnostics() {
            self.parse_diagnostics.push(Diagnostic::error(
                self.file_name.clone(),
                diag.start,
                diag.length,
                diag.message,
                diag.code,
            ));
        }
        self.parse_diagnostics.sort_by_key(|d| d.start);
    }

    // =========================================================================
    // Token access
    // =========================================================================

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_start()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    #[inline]
    pub(crate) fn token_text(&self) -> &str {
        self.scanner.token_text()
    }

    /// Text shown as "found" in diagnostics.
    pub(crate) fn found_text(&self) -> String {
        match self.current_token {
            SyntaxKind::EndOfFileToken => token_to_text(SyntaxKind::EndOfFileToken).to_string(),
            _ => self.token_text().to_string(),
        }
    }

    /// Consume the current token as part of the grammar.
    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.resume_after_boundary();
        self.advance()
    }

    /// End recovery if a boundary was passed since the last error. Called
    /// when a token is consumed and when a statement or member starts.
    pub(crate) fn resume_after_boundary(&mut self) {
        if self.recovery_boundary_passed {
            self.in_error_recovery = false;
        }
    }

    /// Discard the current token during recovery.
    pub(crate) fn skip_token(&mut self) -> SyntaxKind {
        self.advance()
    }

    fn advance(&mut self) -> SyntaxKind {
        if matches!(
            self.current_token,
            SyntaxKind::SemicolonToken | SyntaxKind::OpenBraceToken | SyntaxKind::CloseBraceToken
        ) && self.token_pos() != self.recovery_error_pos
        {
            self.recovery_boundary_passed = true;
        }
        self.prev_token_end = self.scanner.token_end();
        // Invalid characters were reported by the scanner and are dropped.
        let reported = self.scanner.get_scanner_diagnostics().len();
        let mut kind = self.scanner.scan();
        while kind == SyntaxKind::Unknown {
            kind = self.scanner.scan();
        }
        self.current_token = kind;
        if self.scanner.get_scanner_diagnostics().len() > reported {
            self.enter_error_recovery(self.token_pos());
        }
        kind
    }

    /// Re-scan `>` as a compound operator when the source has one.
    pub(crate) fn re_scan_greater_token(&mut self) -> SyntaxKind {
        if self.current_token == SyntaxKind::GreaterThanToken {
            self.current_token = self.scanner.re_scan_greater_token();
        }
        self.current_token
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report it missing. A missing token is treated as
    /// inserted: nothing is consumed.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            return true;
        }
        let found = self.found_text();
        self.parse_error_at_current_token(
            diagnostic_codes::TOKEN_EXPECTED,
            &[token_to_text(kind), &found],
        );
        false
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at_current_token(&mut self, code: u32, args: &[&str]) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, code, args);
    }

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, code: u32, args: &[&str]) {
        if self.in_error_recovery {
            trace!(code, start, "suppressed cascading parse error");
            return;
        }
        self.enter_error_recovery(start);
        self.parse_diagnostics
            .push(Diagnostic::from_code(&self.file_name, start, length, code, args));
    }

    fn enter_error_recovery(&mut self, pos: u32) {
        self.in_error_recovery = true;
        self.recovery_boundary_passed = false;
        self.recovery_error_pos = pos;
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// Run `f` speculatively and rewind the scanner, arena and diagnostics.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.scanner.save_state();
        let current = self.current_token;
        let prev_end = self.prev_token_end;
        let recovering = self.in_error_recovery;
        let boundary_passed = self.recovery_boundary_passed;
        let error_pos = self.recovery_error_pos;
        let depth = self.recursion_depth;
        let diagnostics_len = self.parse_diagnostics.len();
        let arena_len = self.arena.nodes.len();

        let result = f(self);

        self.scanner.restore_state(snapshot);
        self.current_token = current;
        self.prev_token_end = prev_end;
        self.in_error_recovery = recovering;
        self.recovery_boundary_passed = boundary_passed;
        self.recovery_error_pos = error_pos;
        self.recursion_depth = depth;
        self.parse_diagnostics.truncate(diagnostics_len);
        self.arena.nodes.truncate(arena_len);
        result
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    // =========================================================================
    // Recursion guard
    // =========================================================================

    /// Enter a nested construct. Returns false (after reporting) when the
    /// nesting limit is reached; the caller must not call `exit_recursion`.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_PARSER_RECURSION_DEPTH {
            self.parse_error_at_current_token(diagnostic_codes::NESTING_TOO_DEEP, &[]);
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Skip tokens until `is_sync` holds for the current token or EOF.
    /// Skips at least one token unless already at EOF.
    pub(crate) fn resync(&mut self, is_sync: fn(SyntaxKind) -> bool) {
        let mut skipped = 0u32;
        while !self.is_token(SyntaxKind::EndOfFileToken) && skipped < MAX_RESYNC_SKIP {
            if skipped > 0 && is_sync(self.token()) {
                break;
            }
            if self.is_token(SyntaxKind::SemicolonToken) {
                self.skip_token();
                break;
            }
            self.skip_token();
            skipped += 1;
        }
    }

    /// Skip the rest of a construct that could not be parsed (too deep, or
    /// unsupported syntax), stopping after the next `;` or before a `}`
    /// that closes a brace opened outside the construct.
    pub(crate) fn skip_to_construct_end(&mut self) {
        let mut braces = 0u32;
        let mut skipped = 0u32;
        while !self.is_token(SyntaxKind::EndOfFileToken) && skipped < MAX_RESYNC_SKIP {
            match self.token() {
                SyntaxKind::OpenBraceToken => braces += 1,
                SyntaxKind::CloseBraceToken => {
                    if braces == 0 {
                        return;
                    }
                    braces -= 1;
                }
                SyntaxKind::SemicolonToken if braces == 0 => return,
                _ => {}
            }
            self.skip_token();
            skipped += 1;
        }
    }

    // =========================================================================
    // Node helpers
    // =========================================================================

    /// Add a node spanning from `start` to the end of the last consumed token.
    pub(crate) fn finish_node(&mut self, start: u32, data: NodeData) -> NodeIndex {
        let end = self.prev_token_end.max(start);
        self.arena.add(start, end, data)
    }

    /// Add an error placeholder at the current token without consuming it.
    pub(crate) fn missing_node(&mut self, data: NodeData) -> NodeIndex {
        let pos = self.token_pos();
        self.arena.add_missing(pos, data)
    }

    /// Parse an identifier, or report and synthesize a missing one.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::Identifier) {
            let start = self.token_pos();
            let text = self.token_text().to_string();
            self.next_token();
            return self.finish_node(start, NodeData::Identifier { text });
        }
        let found = self.found_text();
        self.parse_error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[&found]);
        self.missing_node(NodeData::Identifier {
            text: String::new(),
        })
    }

    /// Dotted name such as a package or import name. Stops before `.*`.
    pub(crate) fn parse_qualified_name(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut name = self.parse_identifier();
        while self.is_token(SyntaxKind::DotToken)
            && self.look_ahead(|p| p.next_token() == SyntaxKind::Identifier)
        {
            self.next_token();
            let right = self.parse_identifier();
            name = self.finish_node(
                start,
                NodeData::QualifiedName {
                    qualifier: name,
                    name: right,
                },
            );
        }
        name
    }
}
