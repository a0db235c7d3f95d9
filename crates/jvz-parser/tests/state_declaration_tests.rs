//! Tests for compilation unit and declaration parsing.
use crate::parser::node::{TypeDeclarationKind, WildcardBound};
use crate::parser::{ModifierFlags, NodeData, NodeIndex, ParserState};

fn parse_source(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("Test.java".to_string(), source);
    let root = parser.parse_compilation_unit();
    (parser, root)
}

fn codes(parser: &ParserState) -> Vec<u32> {
    parser.get_diagnostics().iter().map(|d| d.code).collect()
}

fn find_all(parser: &ParserState, kind: &str) -> Vec<NodeIndex> {
    let arena = parser.get_arena();
    arena
        .indices()
        .filter(|&idx| arena.data(idx).is_some_and(|d| d.kind_name() == kind))
        .collect()
}

#[test]
fn parse_empty_file_yields_empty_compilation_unit() {
    let (parser, root) = parse_source("");
    let unit = parser.get_arena().get_compilation_unit(root).unwrap();
    assert!(unit.package.is_none());
    assert!(unit.imports.is_empty());
    assert!(unit.types.is_empty());
    assert!(parser.get_diagnostics().is_empty());
}

#[test]
fn parse_root_spans_whole_input() {
    let source = "package a.b;\n\nclass A {}\n// trailing comment\n";
    let (parser, root) = parse_source(source);
    let node = parser.get_arena().get(root).unwrap();
    assert_eq!(node.pos, 0);
    assert_eq!(node.end as usize, source.len());
}

#[test]
fn parse_package_and_imports() {
    let source = "package com.example.app;\n\
                  import java.util.List;\n\
                  import java.util.*;\n\
                  import static java.lang.Math.max;\n\
                  import static java.lang.Math.*;\n\
                  class A {}";
    let (parser, root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();

    let Some(NodeData::PackageDeclaration { name, .. }) = arena.data(unit.package) else {
        panic!("expected package declaration");
    };
    assert_eq!(arena.dotted_name(*name).as_deref(), Some("com.example.app"));

    let imports: Vec<(String, bool, bool)> = unit
        .imports
        .iter()
        .map(|idx| match arena.data(idx) {
            Some(NodeData::ImportDeclaration {
                name,
                is_static,
                on_demand,
            }) => (arena.dotted_name(*name).unwrap(), *is_static, *on_demand),
            other => panic!("unexpected import node {other:?}"),
        })
        .collect();
    assert_eq!(
        imports,
        vec![
            ("java.util.List".to_string(), false, false),
            ("java.util".to_string(), false, true),
            ("java.lang.Math.max".to_string(), true, false),
            ("java.lang.Math".to_string(), true, true),
        ]
    );
}

#[test]
fn parse_annotated_package_declaration() {
    let (parser, root) = parse_source("@Deprecated\npackage a.b;\n");
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let Some(NodeData::PackageDeclaration { annotations, .. }) = arena.data(unit.package) else {
        panic!("expected package declaration");
    };
    assert_eq!(annotations.len(), 1);
}

#[test]
fn parse_class_with_generics_extends_and_implements() {
    let source = "public abstract class Box<T extends Comparable<? super T>, U> \
                  extends Base<T> implements Runnable, java.io.Serializable {}";
    let (parser, root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let decl = arena.get_type_declaration(unit.types.nodes[0]).unwrap();

    assert_eq!(decl.kind, TypeDeclarationKind::Class);
    assert_eq!(arena.identifier_text(decl.name), Some("Box"));
    assert!(decl.modifiers.flags.contains(ModifierFlags::PUBLIC | ModifierFlags::ABSTRACT));
    assert_eq!(decl.type_parameters.len(), 2);
    assert_eq!(decl.extends.len(), 1);
    assert_eq!(decl.implements.len(), 2);

    let wildcards = find_all(&parser, "WildcardType");
    assert_eq!(wildcards.len(), 1);
    assert!(matches!(
        arena.data(wildcards[0]),
        Some(NodeData::WildcardType {
            bound_kind: WildcardBound::Super,
            ..
        })
    ));
}

#[test]
fn parse_interface_enum_and_annotation_types() {
    let source = r#"
interface Shape extends Comparable<Shape> {
    double area();
    int SIDES = 0;
}
enum Color implements Named {
    RED, GREEN("g"), BLUE { public String name2() { return "b"; } };
    private final String code;
    Color() { this("x"); }
    Color(String code) { this.code = code; }
}
@interface Marker {
    String value() default "";
    int[] sizes() default {1, 2};
}
"#;
    let (parser, root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let kinds: Vec<TypeDeclarationKind> = unit
        .types
        .iter()
        .map(|idx| arena.get_type_declaration(idx).unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TypeDeclarationKind::Interface,
            TypeDeclarationKind::Enum,
            TypeDeclarationKind::Annotation
        ]
    );

    let color = arena.get_type_declaration(unit.types.nodes[1]).unwrap();
    assert_eq!(color.enum_constants.len(), 3);
    assert_eq!(color.members.len(), 3);

    let marker = arena.get_type_declaration(unit.types.nodes[2]).unwrap();
    let value = arena.get_method_declaration(marker.members.nodes[0]).unwrap();
    assert!(value.default_value.is_some());
}

#[test]
fn parse_members_fields_methods_constructors_initializers() {
    let source = r"
class A {
    static int count = 0, other[] = {1, 2};
    private final java.util.Map<String, java.util.List<Integer>> map;
    static { count = 1; }
    { count++; }
    A() { super(); }
    <T> A(T seed) { this(); }
    public static <T extends Number> T pick(T a, T... rest) throws Exception, Error { return a; }
    abstract void run();
    int matrix()[] { return null; }
    class Inner {}
    enum Mode { ON, OFF }
}
";
    let (parser, root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let class = arena.get_type_declaration(unit.types.nodes[0]).unwrap();
    let member_kinds: Vec<&str> = class
        .members
        .iter()
        .map(|idx| arena.data(idx).unwrap().kind_name())
        .collect();
    assert_eq!(
        member_kinds,
        vec![
            "FieldDeclaration",
            "FieldDeclaration",
            "Initializer",
            "Initializer",
            "MethodDeclaration",
            "MethodDeclaration",
            "MethodDeclaration",
            "MethodDeclaration",
            "MethodDeclaration",
            "TypeDeclaration",
            "TypeDeclaration",
        ]
    );

    let ctor = arena.get_method_declaration(class.members.nodes[4]).unwrap();
    assert!(ctor.is_constructor);
    assert!(ctor.return_type.is_none());

    let generic_ctor = arena.get_method_declaration(class.members.nodes[5]).unwrap();
    assert!(generic_ctor.is_constructor);
    assert_eq!(generic_ctor.type_parameters.len(), 1);

    let pick = arena.get_method_declaration(class.members.nodes[6]).unwrap();
    assert!(!pick.is_constructor);
    assert_eq!(pick.parameters.len(), 2);
    assert_eq!(pick.throws.len(), 2);
    let Some(NodeData::Parameter { is_varargs, .. }) = arena.data(pick.parameters.nodes[1]) else {
        panic!("expected parameter");
    };
    assert!(*is_varargs);

    let run = arena.get_method_declaration(class.members.nodes[7]).unwrap();
    assert!(run.body.is_none());

    let matrix = arena.get_method_declaration(class.members.nodes[8]).unwrap();
    assert_eq!(matrix.extra_dimensions, 1);
}

#[test]
fn parse_annotations_with_element_values() {
    let source = r#"
@SuppressWarnings({"unchecked", "rawtypes"})
@Target(value = ElementType.TYPE, other = @Inner(1))
class A {
    @Override public String toString() { return ""; }
}
"#;
    let (parser, _root) = parse_source(source);
    assert!(parser.get_diagnostics().is_empty(), "{:?}", codes(&parser));
    assert_eq!(find_all(&parser, "Annotation").len(), 4);
    assert_eq!(find_all(&parser, "ElementValuePair").len(), 2);
    assert_eq!(find_all(&parser, "ElementValueArrayInitializer").len(), 1);
}

#[test]
fn parse_repeated_modifier_reports_error() {
    let (parser, _root) = parse_source("class A { public public int x; }");
    let codes = codes(&parser);
    assert!(codes.contains(&2008), "Expected repeated modifier, got codes: {codes:?}");
    assert_eq!(codes.len(), 1);
}

#[test]
fn parse_stray_top_level_tokens_report_type_declaration_expected() {
    let (parser, root) = parse_source("int x;\nclass A {}");
    let codes = codes(&parser);
    assert!(codes.contains(&2005), "Expected 2005, got codes: {codes:?}");
    let unit = parser.get_arena().get_compilation_unit(root).unwrap();
    assert_eq!(unit.types.len(), 1, "class after the error should still parse");
}

#[test]
fn parse_node_spans_are_nested() {
    let source = "class A { void m() { int x = 1 + 2; } }";
    let (parser, root) = parse_source(source);
    let arena = parser.get_arena();
    for idx in arena.descendants(root) {
        let node = arena.get(idx).unwrap();
        assert!(node.pos <= node.end, "{} has inverted span", node.data.kind_name());
        for child in arena.children(idx) {
            let child_node = arena.get(child).unwrap();
            assert!(
                child_node.pos >= node.pos && child_node.end <= node.end,
                "{} [{}, {}) escapes parent {} [{}, {})",
                child_node.data.kind_name(),
                child_node.pos,
                child_node.end,
                node.data.kind_name(),
                node.pos,
                node.end
            );
        }
    }
}
