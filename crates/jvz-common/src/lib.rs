//! Common types and utilities for the jvz Java front end.
//!
//! This crate provides foundational types used across all jvz crates:
//! - Source spans (`Span`)
//! - Position/Range types and the per-file `LineMap`
//! - Diagnostics, message templates and the diagnostics collector
//! - Front-end limits and thresholds
//! - Source file decoding (`SourceEncoding`)

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, Range};

// Byte order marks, source encodings and binary detection
pub mod source_text;
pub use source_text::SourceEncoding;

// Diagnostics and message lookup
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticKind, diagnostic_codes, format_message,
    merge_diagnostics,
};
