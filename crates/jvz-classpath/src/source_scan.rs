//! Token-level header scan of a source file.
//!
//! Indexing a source root must not parse every file, so this pass only
//! tracks braces and type declaration keywords to recover the package name
//! and the names of top-level and member types.

use jvz_scanner::{SyntaxKind, tokenize};

/// What the index needs to know about a source file up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceHeader {
    /// Empty for the unnamed package.
    pub package: String,
    /// Type names relative to the package, outermost first (`Outer`,
    /// `Outer.Inner`). Local and anonymous classes are not listed.
    pub types: Vec<String>,
}

enum Frame {
    /// Body of a named type; `listed` is false for local classes.
    Type { name: String, listed: bool },
    Other,
}

#[must_use]
pub fn scan_header(text: &str) -> SourceHeader {
    let mut header = SourceHeader::default();
    let mut frames: Vec<Frame> = Vec::new();
    // Name of a type whose header has been seen but whose body has not opened.
    let mut pending: Option<(String, bool)> = None;
    let mut prev = SyntaxKind::Unknown;
    let mut tokens = tokenize(text).peekable();

    while let Some(token) = tokens.next() {
        match token.kind {
            SyntaxKind::EndOfFileToken => break,
            SyntaxKind::PackageKeyword if frames.is_empty() && header.package.is_empty() => {
                let mut name = String::new();
                while let Some(next) = tokens.peek() {
                    match next.kind {
                        SyntaxKind::Identifier | SyntaxKind::DotToken => {
                            name.push_str(&next.text);
                            tokens.next();
                        }
                        _ => break,
                    }
                }
                header.package = name;
            }
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword
                if prev != SyntaxKind::DotToken =>
            {
                if let Some(next) = tokens.peek() {
                    if next.kind == SyntaxKind::Identifier {
                        let (qualified, listed) = match frames.last() {
                            None => (next.text.clone(), true),
                            Some(Frame::Type { name, listed }) => {
                                (format!("{name}.{}", next.text), *listed)
                            }
                            Some(Frame::Other) => (next.text.clone(), false),
                        };
                        if listed {
                            header.types.push(qualified.clone());
                        }
                        pending = Some((qualified, listed));
                    }
                }
            }
            SyntaxKind::OpenBraceToken => match pending.take() {
                Some((name, listed)) => frames.push(Frame::Type { name, listed }),
                None => frames.push(Frame::Other),
            },
            SyntaxKind::CloseBraceToken => {
                frames.pop();
            }
            _ => {}
        }
        prev = token.kind;
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_top_level_types() {
        let header = scan_header(
            "package com.example;\nimport java.util.List;\npublic class A {}\ninterface B {}\nenum C { X }\n@interface D {}\n",
        );
        assert_eq!(header.package, "com.example");
        assert_eq!(header.types, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_member_types_are_qualified_and_local_types_skipped() {
        let header = scan_header(
            r#"
class Outer<T extends Comparable<T>> {
    static class Nested { interface Deep {} }
    void m() {
        class Local { class InLocal {} }
        Object o = new Object() { };
        Class<?> c = String.class;
    }
    enum Mode { ON { void f() {} }, OFF }
}
"#,
        );
        assert_eq!(header.package, "");
        assert_eq!(
            header.types,
            vec!["Outer", "Outer.Nested", "Outer.Nested.Deep", "Outer.Mode"]
        );
    }

    #[test]
    fn test_comments_and_strings_are_ignored() {
        let header = scan_header("// class Fake {}\n/* interface No {} */\nclass Real { String s = \"class X {\"; }");
        assert_eq!(header.types, vec!["Real"]);
    }

    #[test]
    fn test_broken_source_still_scans() {
        let header = scan_header("package p;\nclass A {\n  void m( {\n}\nclass B {}");
        assert_eq!(header.package, "p");
        assert!(header.types.contains(&"A".to_string()));
    }
}
