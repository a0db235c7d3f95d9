//! Tests for expression parsing: precedence, casts, creation and selectors.
use crate::parser::node::LiteralKind;
use crate::parser::{NodeArena, NodeData, NodeIndex, ParserState};
use jvz_scanner::SyntaxKind;

fn parse_source(source: &str) -> (ParserState, NodeIndex) {
    let mut parser = ParserState::new("Test.java".to_string(), source);
    let root = parser.parse_compilation_unit();
    (parser, root)
}

/// Parse `expr` as the initializer of a field and return it.
fn parse_initializer(expr: &str) -> (ParserState, NodeIndex) {
    let (parser, root) = parse_source(&format!("class T {{ Object f = {expr}; }}"));
    assert!(
        parser.get_diagnostics().is_empty(),
        "unexpected diagnostics for `{expr}`: {:?}",
        parser.get_diagnostics()
    );
    let arena = parser.get_arena();
    let unit = arena.get_compilation_unit(root).unwrap();
    let class = arena.get_type_declaration(unit.types.nodes[0]).unwrap();
    let Some(NodeData::FieldDeclaration { declarators, .. }) = arena.data(class.members.nodes[0])
    else {
        panic!("expected field");
    };
    let Some(NodeData::VariableDeclarator { initializer, .. }) = arena.data(declarators.nodes[0])
    else {
        panic!("expected declarator");
    };
    let initializer = *initializer;
    (parser, initializer)
}

/// Fully parenthesized rendering used to check tree shape.
fn render(arena: &NodeArena, idx: NodeIndex) -> String {
    match arena.data(idx) {
        Some(NodeData::Identifier { text }) => text.clone(),
        Some(NodeData::Literal { text, .. }) => text.clone(),
        Some(NodeData::Binary {
            operator,
            left,
            right,
        }) => format!(
            "({} {} {})",
            render(arena, *left),
            jvz_scanner::token_to_text(*operator),
            render(arena, *right)
        ),
        Some(NodeData::Assignment {
            operator,
            target,
            value,
        }) => format!(
            "({} {} {})",
            render(arena, *target),
            jvz_scanner::token_to_text(*operator),
            render(arena, *value)
        ),
        Some(NodeData::Conditional {
            condition,
            when_true,
            when_false,
        }) => format!(
            "({} ? {} : {})",
            render(arena, *condition),
            render(arena, *when_true),
            render(arena, *when_false)
        ),
        Some(NodeData::PrefixUnary { operator, operand }) => {
            format!("({}{})", jvz_scanner::token_to_text(*operator), render(arena, *operand))
        }
        Some(NodeData::PostfixUnary { operator, operand }) => {
            format!("({}{})", render(arena, *operand), jvz_scanner::token_to_text(*operator))
        }
        Some(NodeData::Parenthesized { expression }) => render(arena, *expression),
        Some(NodeData::Cast { expression, .. }) => format!("(cast {})", render(arena, *expression)),
        Some(NodeData::InstanceOf { expression, .. }) => {
            format!("({} instanceof)", render(arena, *expression))
        }
        Some(other) => other.kind_name().to_string(),
        None => "<none>".to_string(),
    }
}

fn render_initializer(expr: &str) -> String {
    let (parser, idx) = parse_initializer(expr);
    render(parser.get_arena(), idx)
}

#[test]
fn parse_binary_precedence() {
    assert_eq!(render_initializer("a + b * c"), "(a + (b * c))");
    assert_eq!(render_initializer("a * b + c"), "((a * b) + c)");
    assert_eq!(render_initializer("a - b - c"), "((a - b) - c)");
    assert_eq!(render_initializer("a || b && c | d"), "(a || (b && (c | d)))");
    assert_eq!(render_initializer("a == b < c"), "(a == (b < c))");
    assert_eq!(render_initializer("a << 2 + 1"), "(a << (2 + 1))");
}

#[test]
fn parse_shift_operators_from_split_greater_tokens() {
    assert_eq!(render_initializer("a >> 2"), "(a >> 2)");
    assert_eq!(render_initializer("a >>> 2"), "(a >>> 2)");
    assert_eq!(render_initializer("a >= b"), "(a >= b)");
    assert_eq!(render_initializer("a > b"), "(a > b)");
}

#[test]
fn parse_assignment_is_right_associative() {
    assert_eq!(render_initializer("a = b = c"), "(a = (b = c))");
    assert_eq!(render_initializer("a += b -= 1"), "(a += (b -= 1))");
    assert_eq!(render_initializer("a >>>= 3"), "(a >>>= 3)");
    assert_eq!(render_initializer("a >>= 3"), "(a >>= 3)");
}

#[test]
fn parse_conditional_and_instanceof() {
    assert_eq!(render_initializer("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
    assert_eq!(
        render_initializer("o instanceof String && ok"),
        "((o instanceof) && ok)"
    );
}

#[test]
fn parse_unary_and_postfix() {
    assert_eq!(render_initializer("-a * !b"), "((-a) * (!b))");
    assert_eq!(render_initializer("i++ + ++j"), "((i++) + (++j))");
    assert_eq!(render_initializer("~x"), "(~x)");
}

#[test]
fn parse_casts_versus_parenthesized_expressions() {
    assert_eq!(render_initializer("(int) x + 1"), "((cast x) + 1)");
    assert_eq!(render_initializer("(String) o"), "(cast o)");
    assert_eq!(render_initializer("(java.util.List<String>) o"), "(cast o)");
    assert_eq!(render_initializer("(int[]) arr"), "(cast arr)");
    assert_eq!(render_initializer("(a) - b"), "(a - b)");
    assert_eq!(render_initializer("(a) + b"), "(a + b)");
    assert_eq!(render_initializer("(a < b)"), "(a < b)");
    assert_eq!(render_initializer("(double) -x"), "(cast (-x))");
}

#[test]
fn parse_literals() {
    let cases = [
        ("42", LiteralKind::Integer),
        ("42L", LiteralKind::Long),
        ("1.5f", LiteralKind::Float),
        ("1.5", LiteralKind::Double),
        ("'c'", LiteralKind::Character),
        ("\"s\"", LiteralKind::String),
        ("true", LiteralKind::Boolean),
        ("null", LiteralKind::Null),
    ];
    for (text, expected) in cases {
        let (parser, idx) = parse_initializer(text);
        match parser.get_arena().data(idx) {
            Some(NodeData::Literal { kind, text: lit }) => {
                assert_eq!(*kind, expected, "literal {text}");
                assert_eq!(lit, text);
            }
            other => panic!("expected literal for {text}, got {other:?}"),
        }
    }
}

#[test]
fn parse_method_invocations_and_field_access() {
    let (parser, idx) = parse_initializer("a.b.c(1, x).d");
    let arena = parser.get_arena();
    let Some(NodeData::FieldAccess { expression, name }) = arena.data(idx) else {
        panic!("expected field access");
    };
    assert_eq!(arena.identifier_text(*name), Some("d"));
    let Some(NodeData::MethodInvocation {
        expression: receiver,
        name,
        arguments,
        ..
    }) = arena.data(*expression)
    else {
        panic!("expected method invocation");
    };
    assert_eq!(arena.identifier_text(*name), Some("c"));
    assert_eq!(arguments.len(), 2);
    assert_eq!(arena.dotted_name(*receiver).as_deref(), Some("a.b"));
}

#[test]
fn parse_generic_method_invocation() {
    let (parser, idx) = parse_initializer("Collections.<String>emptyList()");
    let Some(NodeData::MethodInvocation { type_arguments, .. }) = parser.get_arena().data(idx)
    else {
        panic!("expected method invocation");
    };
    assert_eq!(type_arguments.len(), 1);
}

#[test]
fn parse_instance_creation_forms() {
    let (parser, idx) = parse_initializer("new java.util.HashMap<String, Integer>(16)");
    let Some(NodeData::ClassInstanceCreation {
        arguments, body, ..
    }) = parser.get_arena().data(idx)
    else {
        panic!("expected creation");
    };
    assert_eq!(arguments.len(), 1);
    assert!(body.is_none());

    let (parser, idx) = parse_initializer("new Runnable() { public void run() {} }");
    let Some(NodeData::ClassInstanceCreation { body, .. }) = parser.get_arena().data(idx) else {
        panic!("expected creation");
    };
    assert_eq!(body.as_ref().map(|b| b.len()), Some(1));

    let (parser, idx) = parse_initializer("new ArrayList<>()");
    let arena = parser.get_arena();
    let Some(NodeData::ClassInstanceCreation { ty, .. }) = arena.data(idx) else {
        panic!("expected creation");
    };
    assert!(matches!(
        arena.data(*ty),
        Some(NodeData::ClassType {
            type_arguments: Some(args),
            ..
        }) if args.is_empty()
    ));

    let (parser, idx) = parse_initializer("outer.new Inner()");
    let Some(NodeData::ClassInstanceCreation { outer, .. }) = parser.get_arena().data(idx) else {
        panic!("expected creation");
    };
    assert!(outer.is_some());
}

#[test]
fn parse_array_creation_forms() {
    let (parser, idx) = parse_initializer("new int[3][]");
    let Some(NodeData::ArrayCreation {
        dimensions,
        extra_dimensions,
        initializer,
        ..
    }) = parser.get_arena().data(idx)
    else {
        panic!("expected array creation");
    };
    assert_eq!(dimensions.len(), 1);
    assert_eq!(*extra_dimensions, 1);
    assert!(initializer.is_none());

    let (parser, idx) = parse_initializer("new String[] { \"a\", \"b\", }");
    let arena = parser.get_arena();
    let Some(NodeData::ArrayCreation { initializer, .. }) = arena.data(idx) else {
        panic!("expected array creation");
    };
    let Some(NodeData::ArrayInitializer { elements }) = arena.data(*initializer) else {
        panic!("expected array initializer");
    };
    assert_eq!(elements.len(), 2);
}

#[test]
fn parse_class_literals_and_qualified_this() {
    for expr in ["String.class", "int.class", "int[].class", "void.class", "String[].class"] {
        let (parser, idx) = parse_initializer(expr);
        assert_eq!(
            parser.get_arena().data(idx).map(NodeData::kind_name),
            Some("ClassLiteral"),
            "{expr}"
        );
    }
    let (parser, idx) = parse_initializer("Outer.this");
    assert!(matches!(
        parser.get_arena().data(idx),
        Some(NodeData::ThisExpression { qualifier }) if qualifier.is_some()
    ));
}

#[test]
fn parse_array_access_chain() {
    let (parser, idx) = parse_initializer("grid[i][j + 1]");
    let arena = parser.get_arena();
    let Some(NodeData::ArrayAccess { array, .. }) = arena.data(idx) else {
        panic!("expected array access");
    };
    assert!(matches!(arena.data(*array), Some(NodeData::ArrayAccess { .. })));
}

#[test]
fn parse_lambda_reports_unsupported_source_level() {
    let (parser, _root) = parse_source("class T { Runnable r = () -> run(); int after; }");
    let codes: Vec<u32> = parser.get_diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2009], "Expected only 2009, got codes: {codes:?}");
}

#[test]
fn parse_method_reference_reports_unsupported_source_level() {
    let (parser, _root) = parse_source("class T { Object r = String::valueOf; }");
    let codes: Vec<u32> = parser.get_diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2009], "Expected only 2009, got codes: {codes:?}");
    let diag = &parser.get_diagnostics()[0];
    assert_eq!(diag.start, "class T { Object r = String".len() as u32);
}

#[test]
fn parse_operator_kinds_are_recorded() {
    let (parser, idx) = parse_initializer("a & b");
    assert!(matches!(
        parser.get_arena().data(idx),
        Some(NodeData::Binary {
            operator: SyntaxKind::AmpersandToken,
            ..
        })
    ));
}

#[test]
fn parse_integer_literal_range() {
    let (parser, _root) = parse_source(
        "class T { int a = -2147483648; long b = -9223372036854775808L; int c = 2147483647; }",
    );
    assert!(parser.get_diagnostics().is_empty(), "{:?}", parser.get_diagnostics());

    for (source, at) in [
        ("class T { int c = 2147483648; }", 18),
        ("class T { long c = 9223372036854775808L; }", 19),
        ("class T { int c = -(2147483648); }", 20),
        ("class T { long c = 2147483649; }", 19),
    ] {
        let (parser, _root) = parse_source(source);
        let diagnostics = parser.get_diagnostics();
        assert_eq!(diagnostics.len(), 1, "{source}: {diagnostics:?}");
        assert_eq!(diagnostics[0].code, 1010, "{source}");
        assert_eq!(diagnostics[0].start, at, "{source}");
    }
}
