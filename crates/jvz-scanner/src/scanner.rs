//! Scanner state machine.
//!
//! `ScannerState` turns Java source into tokens on demand. It never fails:
//! malformed input yields a best-effort token plus a `ScannerDiagnostic`.
//! Offsets exposed by the scanner always refer to the ORIGINAL text, even
//! when unicode escapes were translated before scanning.

use std::sync::Arc;

use jvz_common::diagnostics::{diagnostic_codes, format_message, get_message_template};

use crate::syntax_kind::{SyntaxKind, text_to_keyword};
use crate::unicode_escapes::{OffsetMap, translate_unicode_escapes};

/// A lexical error, positioned in the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerDiagnostic {
    pub start: u32,
    pub length: u32,
    pub code: u32,
    pub message: String,
}

impl ScannerDiagnostic {
    #[must_use]
    pub fn new(start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let message = get_message_template(code)
            .map(|template| format_message(template, args))
            .unwrap_or_default();
        ScannerDiagnostic {
            start,
            length,
            code,
            message,
        }
    }
}

/// Saved scanner position for lookahead.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    diagnostics_len: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Radix {
    Decimal,
    Hex,
    Binary,
}

pub struct ScannerState {
    /// Source text after unicode escape translation.
    text: Arc<str>,
    offsets: OffsetMap,
    pos: usize,
    end: usize,
    token: SyntaxKind,
    token_start: usize,
    skip_trivia: bool,
    diagnostics: Vec<ScannerDiagnostic>,
}

impl ScannerState {
    /// Create a scanner over `source`. When `skip_trivia` is false, comments
    /// are returned as tokens.
    #[must_use]
    pub fn new(source: &str, skip_trivia: bool) -> Self {
        let translated = translate_unicode_escapes(source);
        let text: Arc<str> = Arc::from(translated.text.as_ref());
        let end = text.len();
        ScannerState {
            text,
            offsets: translated.offsets,
            pos: 0,
            end,
            token: SyntaxKind::Unknown,
            token_start: 0,
            skip_trivia,
            diagnostics: translated.diagnostics,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    #[must_use]
    pub fn get_token(&self) -> SyntaxKind {
        self.token
    }

    /// Start of the current token in the original text.
    #[inline]
    #[must_use]
    pub fn token_start(&self) -> u32 {
        self.offsets.to_original(self.token_start as u32)
    }

    /// End of the current token in the original text.
    #[inline]
    #[must_use]
    pub fn token_end(&self) -> u32 {
        self.offsets.to_original(self.pos as u32)
    }

    /// Text of the current token, after escape translation.
    #[inline]
    #[must_use]
    pub fn token_text(&self) -> &str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    /// Translated source text.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn get_scanner_diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScannerDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    #[must_use]
    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            diagnostics_len: self.diagnostics.len(),
        }
    }

    /// Restore a snapshot. Diagnostics reported after the snapshot was taken
    /// are discarded; they will be reported again when rescanned.
    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    #[inline]
    fn byte_at(&self, index: usize) -> u8 {
        if index < self.end {
            self.text.as_bytes()[index]
        } else {
            0
        }
    }

    #[inline]
    fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index..).and_then(|rest| rest.chars().next())
    }

    #[inline]
    fn advance_char(&mut self) {
        let len = self.char_at(self.pos).map_or(1, char::len_utf8);
        self.pos = (self.pos + len).min(self.end);
    }

    fn error(&mut self, start: usize, end: usize, code: u32, args: &[&str]) {
        let start = self.offsets.to_original(start as u32);
        let end = self.offsets.to_original(end as u32);
        self.diagnostics.push(ScannerDiagnostic::new(
            start,
            end.saturating_sub(start),
            code,
            args,
        ));
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        loop {
            self.token_start = self.pos;
            if self.pos >= self.end {
                self.token = SyntaxKind::EndOfFileToken;
                return self.token;
            }

            let ch = self.byte_at(self.pos);
            let next = self.byte_at(self.pos + 1);
            let kind = match ch {
                b' ' | b'\t' | b'\x0C' | b'\n' | b'\r' => {
                    self.pos += 1;
                    continue;
                }
                // ASCII SUB is permitted as the last character of a file.
                b'\x1A' if self.pos + 1 == self.end => {
                    self.pos += 1;
                    continue;
                }
                b'/' if next == b'/' => self.scan_line_comment(),
                b'/' if next == b'*' => self.scan_block_comment(),
                b'"' => self.scan_string_literal(),
                b'\'' => self.scan_char_literal(),
                b'0'..=b'9' => self.scan_number(),
                b'.' if next.is_ascii_digit() => self.scan_number(),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.scan_identifier(),
                0x80..=0xFF => {
                    if self.char_at(self.pos).is_some_and(char::is_alphabetic) {
                        self.scan_identifier()
                    } else {
                        self.scan_invalid_character()
                    }
                }
                _ => self.scan_punctuation(ch, next),
            };

            if self.skip_trivia && crate::syntax_kind::token_is_comment(kind) {
                continue;
            }
            self.token = kind;
            return kind;
        }
    }

    /// Re-scan a `>` token as the longest `>`-operator starting at it.
    ///
    /// Called by the parser where a binary or assignment operator may appear.
    pub fn re_scan_greater_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::GreaterThanToken {
            return self.token;
        }
        let kind = match (self.byte_at(self.pos), self.byte_at(self.pos + 1)) {
            (b'>', b'>') => {
                if self.byte_at(self.pos + 2) == b'=' {
                    self.pos += 3;
                    SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
                } else {
                    self.pos += 2;
                    SyntaxKind::GreaterThanGreaterThanGreaterThanToken
                }
            }
            (b'>', b'=') => {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanEqualsToken
            }
            (b'>', _) => {
                self.pos += 1;
                SyntaxKind::GreaterThanGreaterThanToken
            }
            (b'=', _) => {
                self.pos += 1;
                SyntaxKind::GreaterThanEqualsToken
            }
            _ => SyntaxKind::GreaterThanToken,
        };
        self.token = kind;
        kind
    }

    fn scan_line_comment(&mut self) -> SyntaxKind {
        let rest = &self.text.as_bytes()[self.pos..self.end];
        self.pos = match memchr::memchr2(b'\n', b'\r', rest) {
            Some(offset) => self.pos + offset,
            None => self.end,
        };
        SyntaxKind::SingleLineCommentTrivia
    }

    fn scan_block_comment(&mut self) -> SyntaxKind {
        let start = self.pos;
        let is_doc = self.byte_at(start + 2) == b'*' && self.byte_at(start + 3) != b'/';
        let body = &self.text.as_bytes()[start + 2..self.end];
        match memchr::memmem::find(body, b"*/") {
            Some(offset) => self.pos = start + 2 + offset + 2,
            None => {
                self.pos = self.end;
                self.error(start, start + 2, diagnostic_codes::UNTERMINATED_COMMENT, &[]);
            }
        }
        if is_doc {
            SyntaxKind::DocCommentTrivia
        } else {
            SyntaxKind::MultiLineCommentTrivia
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        loop {
            let b = self.byte_at(self.pos);
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.pos += 1;
            } else if b >= 0x80
                && self
                    .char_at(self.pos)
                    .is_some_and(|c| c.is_alphanumeric())
            {
                self.advance_char();
            } else {
                break;
            }
        }
        text_to_keyword(self.token_text()).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_invalid_character(&mut self) -> SyntaxKind {
        let start = self.pos;
        let ch = self.char_at(start).unwrap_or(char::REPLACEMENT_CHARACTER);
        self.advance_char();
        let shown = if ch.is_control() {
            format!("\\u{:04x}", ch as u32)
        } else {
            ch.to_string()
        };
        self.error(start, self.pos, diagnostic_codes::INVALID_CHARACTER, &[&shown]);
        SyntaxKind::Unknown
    }

    fn scan_punctuation(&mut self, ch: u8, next: u8) -> SyntaxKind {
        let third = self.byte_at(self.pos + 2);
        let (kind, len) = match ch {
            b'(' => (SyntaxKind::OpenParenToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b'@' => (SyntaxKind::AtToken, 1),
            b'~' => (SyntaxKind::TildeToken, 1),
            b'?' => (SyntaxKind::QuestionToken, 1),
            b'.' if next == b'.' && third == b'.' => (SyntaxKind::DotDotDotToken, 3),
            b'.' => (SyntaxKind::DotToken, 1),
            b':' if next == b':' => (SyntaxKind::ColonColonToken, 2),
            b':' => (SyntaxKind::ColonToken, 1),
            b'=' if next == b'=' => (SyntaxKind::EqualsEqualsToken, 2),
            b'=' => (SyntaxKind::EqualsToken, 1),
            b'!' if next == b'=' => (SyntaxKind::ExclamationEqualsToken, 2),
            b'!' => (SyntaxKind::ExclamationToken, 1),
            b'>' => (SyntaxKind::GreaterThanToken, 1),
            b'<' if next == b'<' && third == b'=' => (SyntaxKind::LessThanLessThanEqualsToken, 3),
            b'<' if next == b'<' => (SyntaxKind::LessThanLessThanToken, 2),
            b'<' if next == b'=' => (SyntaxKind::LessThanEqualsToken, 2),
            b'<' => (SyntaxKind::LessThanToken, 1),
            b'&' if next == b'&' => (SyntaxKind::AmpersandAmpersandToken, 2),
            b'&' if next == b'=' => (SyntaxKind::AmpersandEqualsToken, 2),
            b'&' => (SyntaxKind::AmpersandToken, 1),
            b'|' if next == b'|' => (SyntaxKind::BarBarToken, 2),
            b'|' if next == b'=' => (SyntaxKind::BarEqualsToken, 2),
            b'|' => (SyntaxKind::BarToken, 1),
            b'+' if next == b'+' => (SyntaxKind::PlusPlusToken, 2),
            b'+' if next == b'=' => (SyntaxKind::PlusEqualsToken, 2),
            b'+' => (SyntaxKind::PlusToken, 1),
            b'-' if next == b'-' => (SyntaxKind::MinusMinusToken, 2),
            b'-' if next == b'=' => (SyntaxKind::MinusEqualsToken, 2),
            b'-' if next == b'>' => (SyntaxKind::MinusGreaterThanToken, 2),
            b'-' => (SyntaxKind::MinusToken, 1),
            b'*' if next == b'=' => (SyntaxKind::AsteriskEqualsToken, 2),
            b'*' => (SyntaxKind::AsteriskToken, 1),
            b'/' if next == b'=' => (SyntaxKind::SlashEqualsToken, 2),
            b'/' => (SyntaxKind::SlashToken, 1),
            b'^' if next == b'=' => (SyntaxKind::CaretEqualsToken, 2),
            b'^' => (SyntaxKind::CaretToken, 1),
            b'%' if next == b'=' => (SyntaxKind::PercentEqualsToken, 2),
            b'%' => (SyntaxKind::PercentToken, 1),
            _ => return self.scan_invalid_character(),
        };
        self.pos += len;
        kind
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn scan_string_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        loop {
            if self.pos >= self.end {
                self.error(start, self.pos, diagnostic_codes::UNTERMINATED_STRING_LITERAL, &[]);
                break;
            }
            match self.byte_at(self.pos) {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\n' | b'\r' => {
                    self.error(start, self.pos, diagnostic_codes::UNTERMINATED_STRING_LITERAL, &[]);
                    break;
                }
                b'\\' => self.scan_escape_sequence(),
                _ => self.advance_char(),
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_char_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.pos += 1;
        if self.pos >= self.end || matches!(self.byte_at(self.pos), b'\n' | b'\r') {
            self.error(start, self.pos, diagnostic_codes::UNTERMINATED_CHAR_LITERAL, &[]);
            return SyntaxKind::CharacterLiteral;
        }
        match self.byte_at(self.pos) {
            b'\'' => {
                self.pos += 1;
                self.error(start, self.pos, diagnostic_codes::EMPTY_CHAR_LITERAL, &[]);
                return SyntaxKind::CharacterLiteral;
            }
            b'\\' => self.scan_escape_sequence(),
            _ => self.advance_char(),
        }
        if self.byte_at(self.pos) == b'\'' {
            self.pos += 1;
            return SyntaxKind::CharacterLiteral;
        }

        // Look for a closing quote on the same line.
        let rest = &self.text.as_bytes()[self.pos..self.end];
        let line_end = memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
        match memchr::memchr(b'\'', &rest[..line_end]) {
            Some(offset) => {
                self.pos += offset + 1;
                self.error(start, self.pos, diagnostic_codes::UNCLOSED_CHAR_LITERAL_MULTIPLE, &[]);
            }
            None => {
                self.error(start, self.pos, diagnostic_codes::UNTERMINATED_CHAR_LITERAL, &[]);
            }
        }
        SyntaxKind::CharacterLiteral
    }

    /// Scan an escape sequence starting at a backslash.
    fn scan_escape_sequence(&mut self) {
        let start = self.pos;
        self.pos += 1;
        match self.byte_at(self.pos) {
            b'b' | b't' | b'n' | b'f' | b'r' | b'"' | b'\'' | b'\\' => self.pos += 1,
            first @ b'0'..=b'7' => {
                let max_len = if first <= b'3' { 3 } else { 2 };
                let mut len = 0;
                while len < max_len && matches!(self.byte_at(self.pos), b'0'..=b'7') {
                    self.pos += 1;
                    len += 1;
                }
            }
            b'\n' | b'\r' => {}
            _ if self.pos >= self.end => {}
            _ => {
                let shown = self.char_at(self.pos).map(String::from).unwrap_or_default();
                self.advance_char();
                self.error(start, self.pos, diagnostic_codes::ILLEGAL_ESCAPE_CHARACTER, &[&shown]);
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        let mut malformed = false;
        let first = self.byte_at(self.pos);
        let second = self.byte_at(self.pos + 1);

        if first == b'0' && matches!(second, b'x' | b'X') {
            self.pos += 2;
            let digits = self.scan_digits(|b| b.is_ascii_hexdigit(), &mut malformed);
            let mut is_float = false;
            let mut fraction = 0;
            if self.byte_at(self.pos) == b'.' {
                is_float = true;
                self.pos += 1;
                fraction = self.scan_digits(|b| b.is_ascii_hexdigit(), &mut malformed);
            }
            if digits == 0 && fraction == 0 {
                malformed = true;
            }
            if matches!(self.byte_at(self.pos), b'p' | b'P') {
                is_float = true;
                self.scan_exponent(&mut malformed);
            } else if is_float {
                malformed = true;
            }
            return self.finish_number(start, Radix::Hex, is_float, malformed);
        }

        if first == b'0' && matches!(second, b'b' | b'B') {
            self.pos += 2;
            if self.scan_digits(|b| b == b'0' || b == b'1', &mut malformed) == 0 {
                malformed = true;
            }
            return self.finish_number(start, Radix::Binary, false, malformed);
        }

        let mut is_float = false;
        if first != b'.' {
            self.scan_digits(|b| b.is_ascii_digit(), &mut malformed);
        }
        if self.byte_at(self.pos) == b'.' {
            is_float = true;
            self.pos += 1;
            self.scan_digits(|b| b.is_ascii_digit(), &mut malformed);
        }
        if matches!(self.byte_at(self.pos), b'e' | b'E') {
            is_float = true;
            self.scan_exponent(&mut malformed);
        }
        self.finish_number(start, Radix::Decimal, is_float, malformed)
    }

    /// Scan a run of digits and underscores; returns the digit count.
    /// Underscores may only appear between digits.
    fn scan_digits(&mut self, is_digit: fn(u8) -> bool, malformed: &mut bool) -> usize {
        let run_start = self.pos;
        let mut count = 0;
        loop {
            let b = self.byte_at(self.pos);
            if is_digit(b) {
                count += 1;
                self.pos += 1;
            } else if b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos > run_start
            && (self.byte_at(run_start) == b'_' || self.byte_at(self.pos - 1) == b'_')
        {
            *malformed = true;
        }
        count
    }

    fn scan_exponent(&mut self, malformed: &mut bool) {
        self.pos += 1;
        if matches!(self.byte_at(self.pos), b'+' | b'-') {
            self.pos += 1;
        }
        if self.scan_digits(|b| b.is_ascii_digit(), malformed) == 0 {
            *malformed = true;
        }
    }

    fn finish_number(
        &mut self,
        start: usize,
        radix: Radix,
        is_float: bool,
        mut malformed: bool,
    ) -> SyntaxKind {
        let kind = match self.byte_at(self.pos) {
            b'l' | b'L' if !is_float => {
                self.pos += 1;
                SyntaxKind::LongLiteral
            }
            b'f' | b'F' if radix == Radix::Decimal || is_float => {
                self.pos += 1;
                SyntaxKind::FloatLiteral
            }
            b'd' | b'D' if radix == Radix::Decimal || is_float => {
                self.pos += 1;
                SyntaxKind::DoubleLiteral
            }
            _ if is_float => SyntaxKind::DoubleLiteral,
            _ => SyntaxKind::IntegerLiteral,
        };

        // Octal literals may not contain 8 or 9.
        if radix == Radix::Decimal
            && matches!(kind, SyntaxKind::IntegerLiteral | SyntaxKind::LongLiteral)
            && self.byte_at(start) == b'0'
            && self.text[start..self.pos]
                .bytes()
                .any(|b| b == b'8' || b == b'9')
        {
            malformed = true;
        }

        // Identifier characters glued to a number are part of the bad literal.
        loop {
            let b = self.byte_at(self.pos);
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                malformed = true;
                self.pos += 1;
            } else {
                break;
            }
        }

        if malformed {
            let text = self.text[start..self.pos].to_string();
            self.error(start, self.pos, diagnostic_codes::MALFORMED_NUMBER, &[&text]);
        } else if matches!(kind, SyntaxKind::IntegerLiteral | SyntaxKind::LongLiteral)
            && !integer_literal_fits(&self.text[start..self.pos], radix, kind)
        {
            let text = self.text[start..self.pos].to_string();
            self.error(start, self.pos, diagnostic_codes::INTEGER_TOO_LARGE, &[&text]);
        }
        kind
    }
}

/// Whether a well-formed integer literal is in range for its type.
///
/// Decimal literals may reach `2^31` (`2^63` for `long`): that value is only
/// legal as the operand of unary minus, which the parser checks. Hex, octal
/// and binary literals may use every bit.
fn integer_literal_fits(text: &str, radix: Radix, kind: SyntaxKind) -> bool {
    let body = text.trim_end_matches(['l', 'L']);
    let (digits, base) = match radix {
        Radix::Hex => (&body[2..], 16),
        Radix::Binary => (&body[2..], 2),
        Radix::Decimal if body.len() > 1 && body.starts_with('0') => (&body[1..], 8),
        Radix::Decimal => (body, 10),
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    let Ok(value) = u128::from_str_radix(&digits, base) else {
        return false;
    };
    let long = kind == SyntaxKind::LongLiteral;
    let max = match (base, long) {
        (10, false) => 1u128 << 31,
        (10, true) => 1u128 << 63,
        (_, false) => u128::from(u32::MAX),
        (_, true) => u128::from(u64::MAX),
    };
    value <= max
}
