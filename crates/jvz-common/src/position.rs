//! Position and location utilities.
//!
//! Diagnostics and syntax nodes carry byte offsets; reporting wants
//! line/column pairs. `LineMap` converts between the two.

use serde::Serialize;

/// Zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    /// Counted in UTF-16 code units, as `javac` reports columns.
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Byte offset of every line start in one file. `\n`, `\r\n` and a lone
/// `\r` all end a line, matching the Java line terminator rule.
#[derive(Debug, Clone)]
pub struct LineMap {
    starts: Vec<u32>,
}

impl LineMap {
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut starts = Vec::with_capacity(bytes.len() / 32 + 1);
        starts.push(0);
        starts.extend(
            memchr::memchr2_iter(b'\n', b'\r', bytes)
                .filter(|&at| !(bytes[at] == b'\r' && bytes.get(at + 1) == Some(&b'\n')))
                .map(|at| (at + 1) as u32),
        );
        Self { starts }
    }

    /// Line index containing `offset`; offsets past the end land on the
    /// last line.
    fn line_of(&self, offset: u32) -> usize {
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = self.line_of(offset);
        let end = (offset as usize).min(source.len());
        let begin = self.starts.get(line).map_or(0, |&s| (s as usize).min(end));
        let character = source
            .get(begin..end)
            .map_or(0, |prefix| prefix.encode_utf16().count() as u32);
        Position::new(line as u32, character)
    }

    /// Line/column range of the byte span `[start, start + length)`.
    pub fn range(&self, start: u32, length: u32, source: &str) -> Range {
        Range {
            start: self.offset_to_position(start, source),
            end: self.offset_to_position(start.saturating_add(length), source),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.starts.get(line).copied()
    }

    /// Text of `line`, terminator excluded.
    pub fn line_text<'a>(&self, line: usize, source: &'a str) -> &'a str {
        let Some(start) = self.line_start(line) else {
            return "";
        };
        let end = self.line_start(line + 1).map_or(source.len(), |next| next as usize);
        source
            .get(start as usize..end)
            .map_or("", |text| text.trim_end_matches(['\n', '\r']))
    }
}
