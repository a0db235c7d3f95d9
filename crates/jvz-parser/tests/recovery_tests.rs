//! Error recovery: every input yields a tree, errors stay local, and one
//! bad token produces one diagnostic.
use crate::parser::{NodeIndex, ParserState, parse};

fn parse_source(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("Test.java".to_string(), source);
    let root = parser.parse_compilation_unit();
    (parser, root)
}

fn codes(parser: &ParserState) -> Vec<u32> {
    parser.get_diagnostics().iter().map(|d| d.code).collect()
}

const VALID: &str = r#"package demo;

import java.util.ArrayList;
import java.util.List;

public class Inventory<T extends Comparable<T>> {
    private final List<T> items = new ArrayList<T>();
    private int limit;

    public Inventory(int limit) {
        this.limit = limit;
    }

    public boolean add(T item) {
        if (items.size() >= limit) {
            return false;
        }
        for (T existing : items) {
            if (existing.compareTo(item) == 0) {
                return false;
            }
        }
        items.add(item);
        return true;
    }

    public int count() {
        int total = 0;
        for (int i = 0; i < items.size(); i++) {
            total += 1;
        }
        return total;
    }
}
"#;

#[test]
fn valid_source_has_no_diagnostics_and_full_span() {
    let result = parse("Inventory.java", VALID);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let root = result.arena.get(result.root).unwrap();
    assert_eq!(root.pos, 0);
    assert_eq!(root.end as usize, VALID.len());
    assert!(!result.arena.contains_error(result.root));
}

#[test]
fn injected_bad_token_yields_one_diagnostic_at_that_token() {
    // (original, replacement, offset of the offending token in the replacement)
    let cases = [
        ("int total = 0;", "int total = ;", 12),
        ("items.add(item);", "items.add(item));", 15),
        ("return true;", "return true", 11),
        ("this.limit = limit;", "this.limit = limit = ;", 21),
    ];
    for (original, replacement, offset) in cases {
        let source = VALID.replacen(original, replacement, 1);
        let (parser, root) = parse_source(&source);
        let diagnostics = parser.get_diagnostics();
        assert_eq!(
            diagnostics.len(),
            1,
            "`{replacement}` should give one diagnostic, got {diagnostics:?}"
        );
        // A missing token is reported at whatever token follows.
        let at = source.find(replacement).unwrap() + offset;
        let rest = &source[at..];
        let expected = at + (rest.len() - rest.trim_start().len());
        assert_eq!(
            diagnostics[0].start as usize, expected,
            "`{replacement}` reported at the wrong offset: {diagnostics:?}"
        );
        let node = parser.get_arena().get(root).unwrap();
        assert_eq!(node.end as usize, source.len());
    }
}

#[test]
fn stray_token_before_statements_and_members_yields_one_diagnostic() {
    // (original, replacement, offset of the offending token in the replacement)
    let cases = [
        ("int total = 0;", ") int total = 0;", 0),
        ("items.add(item);", "] items.add(item);", 0),
        ("return total;", ", return total;", 0),
        ("total += 1;", "total += 1; )", 12),
        ("items.add(item);", "items.add(item) ) ;", 16),
        ("int total = 0;", "int total = ; 0;", 12),
        ("private int limit;", ") private int limit;", 0),
        ("public int count() {", "] public int count() {", 0),
        // Lexical errors start recovery like syntax errors do.
        ("return false;", "return \"false;", 7),
        ("int total = 0;", "int total = 0x;", 12),
        ("int total = 0;", "int total = 2147483649;", 12),
        ("items.add(item);", "items.add(# item);", 10),
    ];
    for (original, replacement, offset) in cases {
        let source = VALID.replacen(original, replacement, 1);
        let (parser, root) = parse_source(&source);
        let diagnostics = parser.get_diagnostics();
        assert_eq!(
            diagnostics.len(),
            1,
            "`{replacement}` should give one diagnostic, got {diagnostics:?}"
        );
        let at = source.find(replacement).unwrap() + offset;
        assert_eq!(
            diagnostics[0].start as usize, at,
            "`{replacement}` reported at the wrong offset: {diagnostics:?}"
        );
        let node = parser.get_arena().get(root).unwrap();
        assert_eq!(node.end as usize, source.len());
    }
}

#[test]
fn stray_token_before_local_array_declaration() {
    let source = "class A { void m() { ) int[] a = new int[] {1, 2}; } }";
    let (parser, _root) = parse_source(source);
    assert_eq!(codes(&parser), vec![2006]);
    assert_eq!(parser.get_diagnostics()[0].start, 21);
}

#[test]
fn independent_errors_on_separate_statements_are_both_reported() {
    let source = "class A { void m() {
  ) int a = 1;
  ) foo();
} }";
    let (parser, _root) = parse_source(source);
    assert_eq!(codes(&parser), vec![2006, 2006]);
}

#[test]
fn unterminated_string_is_a_single_lexical_error() {
    let (parser, _root) = parse_source("class A { void m() { String s = \"abc; } }");
    assert_eq!(codes(&parser), vec![1002]);
}

#[test]
fn invalid_character_is_a_single_lexical_error() {
    let (parser, _root) = parse_source("class A { int x = 1 # ; }");
    let codes = codes(&parser);
    assert_eq!(codes, vec![1001], "Expected only 1001, got codes: {codes:?}");
    assert_eq!(parser.get_diagnostics()[0].start, 20);
}

#[test]
fn errors_in_one_member_do_not_hide_later_members() {
    let source = "class A {\n  void broken( { }\n  int ok;\n  void fine() { }\n}";
    let (parser, root) = parse_source(source);
    assert!(!parser.get_diagnostics().is_empty());
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let class = arena.get_type_declaration(unit.types.nodes[0]).unwrap();
    let names: Vec<&str> = class
        .members
        .iter()
        .filter_map(|m| match arena.data(m) {
            Some(crate::parser::NodeData::MethodDeclaration(method)) => {
                arena.identifier_text(method.name)
            }
            _ => None,
        })
        .collect();
    assert!(names.contains(&"fine"), "members after the error: {names:?}");
}

#[test]
fn garbage_member_is_skipped_to_next_member() {
    let source = "class A {\n  ) ) ) ;\n  int ok;\n}";
    let (parser, root) = parse_source(source);
    let codes = codes(&parser);
    assert_eq!(codes, vec![2007], "Expected only 2007, got codes: {codes:?}");
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let class = arena.get_type_declaration(unit.types.nodes[0]).unwrap();
    assert_eq!(class.members.len(), 1);
}

#[test]
fn unterminated_constructs_still_produce_a_tree() {
    for source in [
        "class A {",
        "class A { void m() {",
        "class A { void m() { if (x",
        "class A { String s = \"open",
        "class A { /* open comment",
        "package",
        "import java.util.",
        "@",
        "class",
        "enum E { A(",
    ] {
        let result = parse("Test.java", source);
        assert!(!result.diagnostics.is_empty(), "`{source}` should report errors");
        let root = result.arena.get(result.root).unwrap();
        assert_eq!(root.pos, 0);
        assert_eq!(root.end as usize, source.len(), "`{source}`");
    }
}

#[test]
fn random_token_soup_terminates() {
    let fragments = [
        "class", "{", "}", "(", ")", ";", "int", "x", "=", "new", "[", "]", "<", ">", ".", ",",
        "if", "else", "try", "catch", "@", "?", ":", "->", "::", "\"s\"", "1", "+", "static",
    ];
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..50 {
        let mut source = String::new();
        for _ in 0..200 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            source.push_str(fragments[(seed as usize) % fragments.len()]);
            source.push(' ');
        }
        let result = parse("Soup.java", &source);
        let root = result.arena.get(result.root).unwrap();
        assert_eq!(root.end as usize, source.len());
        for pair in result.diagnostics.windows(2) {
            assert!(pair[0].start <= pair[1].start, "diagnostics out of order");
        }
    }
}

#[test]
fn deeply_nested_expression_reports_nesting_limit() {
    // Run on a thread with a generous stack; debug frames are large.
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let depth = 5_000;
            let source = format!(
                "class A {{ int x = {}1{}; int after; }}",
                "(".repeat(depth),
                ")".repeat(depth)
            );
            let result = parse("Deep.java", &source);
            let codes: Vec<u32> = result.diagnostics.iter().map(|d| d.code).collect();
            assert!(codes.contains(&2012), "Expected 2012, got codes: {codes:?}");
            let root = result.arena.get(result.root).unwrap();
            assert_eq!(root.end as usize, source.len());
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn deeply_nested_blocks_report_nesting_limit() {
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let depth = 2_000;
            let source = format!(
                "class A {{ void m() {{ {}{} }} void after() {{ }} }}",
                "{".repeat(depth),
                "}".repeat(depth)
            );
            let result = parse("Deep.java", &source);
            let codes: Vec<u32> = result.diagnostics.iter().map(|d| d.code).collect();
            assert_eq!(codes, vec![2012], "Expected only 2012, got codes: {codes:?}");
        })
        .unwrap();
    handle.join().unwrap();
}
