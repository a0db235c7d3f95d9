//! Shared helpers for binder tests: parse and bind sources against the boot
//! library, optionally with sibling units.

use std::path::PathBuf;

use jvz_classpath::ClasspathIndex;
use jvz_common::Diagnostic;
use jvz_parser::{NodeData, NodeIndex, ParseResult, parse};

use crate::{BindEnv, BindResult, SiblingDecls, SiblingUnit, bind};

pub struct Bound {
    pub source: String,
    pub parsed: ParseResult,
    pub result: BindResult,
}

impl Bound {
    pub fn codes(&self) -> Vec<u32> {
        self.result.diagnostics.iter().map(|d| d.code).collect()
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.result.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    /// Text covered by a diagnostic.
    pub fn span_text(&self, diagnostic: &Diagnostic) -> &str {
        let start = diagnostic.start as usize;
        &self.source[start..start + diagnostic.length as usize]
    }

    /// The `n`th identifier node (0-based) with the given text.
    pub fn identifier(&self, text: &str, n: usize) -> NodeIndex {
        let arena = &self.parsed.arena;
        arena
            .indices()
            .filter(|&idx| matches!(arena.data(idx), Some(NodeData::Identifier { text: t }) if t == text))
            .nth(n)
            .unwrap_or_else(|| panic!("no identifier {text} #{n}"))
    }

    /// First node of the given kind whose source text equals `text`.
    pub fn node(&self, kind: &str, text: &str) -> NodeIndex {
        let arena = &self.parsed.arena;
        arena
            .indices()
            .find(|&idx| {
                let Some(node) = arena.get(idx) else {
                    return false;
                };
                node.data.kind_name() == kind && &self.source[node.pos as usize..node.end as usize] == text
            })
            .unwrap_or_else(|| panic!("no {kind} node `{text}`"))
    }
}

/// Bind one file against the boot library.
pub fn bind_source(source: &str) -> Bound {
    let index = ClasspathIndex::boot_only();
    let siblings = SiblingDecls::new();
    bind_with(source, "Test.java", &index, &siblings)
}

pub fn bind_with(source: &str, file_name: &str, index: &ClasspathIndex, siblings: &SiblingDecls) -> Bound {
    let parsed = parse(file_name, source);
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected syntax errors: {:?}",
        parsed.diagnostics
    );
    let result = bind(&parsed.arena, parsed.root, file_name, BindEnv::new(index, siblings));
    Bound {
        source: source.to_string(),
        parsed,
        result,
    }
}

/// Bind every file of a batch with the others as siblings. Returns the
/// results in input order.
pub fn bind_batch(files: &[(&str, &str)]) -> Vec<Bound> {
    let index = ClasspathIndex::boot_only();
    let parsed: Vec<(PathBuf, ParseResult)> = files
        .iter()
        .map(|(path, text)| (PathBuf::from(path), parse(path, text)))
        .collect();
    let units: Vec<SiblingUnit<'_>> = parsed
        .iter()
        .map(|(path, p)| SiblingUnit {
            arena: &p.arena,
            root: p.root,
            path,
        })
        .collect();
    let siblings = SiblingDecls::collect(&units, &index);
    files
        .iter()
        .map(|(path, text)| bind_with(text, path, &index, &siblings))
        .collect()
}
