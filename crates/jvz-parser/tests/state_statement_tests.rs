//! Tests for statement parsing in the parser.
use crate::parser::{NodeData, NodeIndex, ParserState};

fn parse_source(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("Test.java".to_string(), source);
    let root = parser.parse_compilation_unit();
    (parser, root)
}

/// Wrap statements in a method body.
fn parse_body(body: &str) -> (ParserState, NodeIndex) {
    parse_source(&format!("class T {{ void m() {{\n{body}\n}} }}"))
}

fn codes(parser: &ParserState) -> Vec<u32> {
    parser.get_diagnostics().iter().map(|d| d.code).collect()
}

/// Kind names of the statements in the body of `T.m`.
fn body_statement_kinds(parser: &ParserState, root: NodeIndex) -> Vec<&'static str> {
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let class = arena.get_type_declaration(unit.types.nodes[0]).unwrap();
    let method = arena.get_method_declaration(class.members.nodes[0]).unwrap();
    let Some(NodeData::Block { statements }) = arena.data(method.body) else {
        panic!("expected method body");
    };
    statements
        .iter()
        .map(|idx| arena.data(idx).unwrap().kind_name())
        .collect()
}

fn count_kind(parser: &ParserState, kind: &str) -> usize {
    let arena = parser.get_arena();
    arena
        .indices()
        .filter(|&idx| arena.data(idx).is_some_and(|d| d.kind_name() == kind))
        .count()
}

#[test]
fn parse_local_declarations_and_expression_statements() {
    let (parser, root) = parse_body(
        "int a = 1, b[] = {2};\n\
         final java.util.List<String> names = new java.util.ArrayList<>();\n\
         Map<String, List<Integer>> m = null;\n\
         a = b[0];\n\
         a++;\n\
         --a;\n\
         names.add(\"x\");\n\
         new Object();\n",
    );
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(
        body_statement_kinds(&parser, root),
        vec![
            "LocalVariableDeclaration",
            "LocalVariableDeclaration",
            "LocalVariableDeclaration",
            "ExpressionStatement",
            "ExpressionStatement",
            "ExpressionStatement",
            "ExpressionStatement",
            "ExpressionStatement",
        ]
    );
}

#[test]
fn parse_control_flow_statements() {
    let (parser, root) = parse_body(
        "if (a) b(); else if (c) d(); else { e(); }\n\
         while (x < 10) x++;\n\
         do { x--; } while (x > 0);\n\
         for (int i = 0, j = 1; i < j; i++, j--) {}\n\
         for (;;) break;\n\
         for (String s : list) continue;\n\
         outer: for (final int v : values) { break outer; }\n\
         switch (k) { case 1: case 2: f(); break; default: g(); }\n\
         synchronized (this) { return; }\n\
         throw new RuntimeException();\n",
    );
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(
        body_statement_kinds(&parser, root),
        vec![
            "IfStatement",
            "WhileStatement",
            "DoStatement",
            "ForStatement",
            "ForStatement",
            "ForEachStatement",
            "LabeledStatement",
            "SwitchStatement",
            "SynchronizedStatement",
            "ThrowStatement",
        ]
    );
    assert_eq!(count_kind(&parser, "SwitchCase"), 3);
}

#[test]
fn parse_try_forms() {
    let (parser, _root) = parse_body(
        "try { a(); } catch (IOException | RuntimeException e) { b(); } finally { c(); }\n\
         try (InputStream in = open(); final Reader r = wrap(in);) { read(in); }\n\
         try { a(); } finally { }\n",
    );
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(count_kind(&parser, "TryStatement"), 3);
    assert_eq!(count_kind(&parser, "UnionType"), 1);
    assert_eq!(count_kind(&parser, "CatchClause"), 1);
}

#[test]
fn parse_try_without_catch_or_finally_reports_error() {
    let (parser, _root) = parse_body("try { a(); }\nb();");
    let codes = codes(&parser);
    assert_eq!(codes, vec![2013], "Expected only 2013, got codes: {codes:?}");
}

#[test]
fn parse_assert_and_empty_statements() {
    let (parser, root) = parse_body("assert x > 0 : \"positive\";\n;\nassert y;");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(
        body_statement_kinds(&parser, root),
        vec!["AssertStatement", "EmptyStatement", "AssertStatement"]
    );
}

#[test]
fn parse_local_class_declaration() {
    let (parser, root) = parse_body("class Local { int f; }\nfinal class Other {}\nnew Local();");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(
        body_statement_kinds(&parser, root),
        vec!["TypeDeclaration", "TypeDeclaration", "ExpressionStatement"]
    );
}

#[test]
fn parse_expression_that_is_not_a_statement() {
    let (parser, _root) = parse_body("a + 1;\nb();");
    let codes = codes(&parser);
    assert_eq!(codes, vec![2011], "Expected only 2011, got codes: {codes:?}");
}

#[test]
fn parse_orphaned_else_reports_error_and_keeps_following_statement() {
    let (parser, _root) = parse_body("else x = 1;\ny = 2;");
    let codes = codes(&parser);
    assert_eq!(codes, vec![2015], "Expected only 2015, got codes: {codes:?}");
    assert_eq!(count_kind(&parser, "Assignment"), 2);
}

#[test]
fn parse_catch_without_try_reports_error() {
    let (parser, _root) = parse_body("catch (Exception e) { }\nok();");
    let codes = codes(&parser);
    assert_eq!(codes, vec![2010], "Expected only 2010, got codes: {codes:?}");
    assert_eq!(count_kind(&parser, "MethodInvocation"), 1);
}

#[test]
fn parse_case_outside_switch_reports_error() {
    let (parser, _root) = parse_body("case 1: ok();");
    let codes = codes(&parser);
    assert_eq!(codes, vec![2010], "Expected only 2010, got codes: {codes:?}");
}

#[test]
fn parse_explicit_constructor_invocations() {
    let source = "class A extends B { A() { super(1); } A(int x) { this(); } A(O o) { o.super(); } }";
    let (parser, _root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(count_kind(&parser, "ExplicitConstructorInvocation"), 3);
}

#[test]
fn statements_after_a_stray_token_are_kept() {
    let (parser, root) = parse_body(") int[] a = new int[] {1, 2};\nfoo(a);");
    assert_eq!(codes(&parser), vec![2006]);
    assert_eq!(
        body_statement_kinds(&parser, root),
        vec!["Error", "LocalVariableDeclaration", "ExpressionStatement"]
    );
}
