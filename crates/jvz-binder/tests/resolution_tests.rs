//! Name resolution: locals, fields, types, packages and siblings.

use crate::binding::{Binding, SymbolRef};
use crate::test_support::{bind_batch, bind_source};
use crate::types::ResolvedType;
use jvz_common::diagnostic_codes;

#[test]
fn undeclared_field_type_is_reported_once() {
    let bound = bind_source("class A { B b; void m() { b.toString(); } }");
    let errors = bound.errors();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].code, diagnostic_codes::CANNOT_FIND_SYMBOL);
    assert_eq!(bound.span_text(errors[0]), "B");
    assert_eq!(errors[0].message_text, "cannot find symbol: class B");
}

#[test]
fn locals_shadow_fields() {
    let source = "class A { int x; void m() { String x = null; x.length(); } }";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let usage = bound.identifier("x", 2);
    match bound.result.bindings.get(usage) {
        Some(Binding::Symbol {
            symbol: SymbolRef::Local { name, .. },
            ty,
        }) => {
            assert_eq!(name, "x");
            assert!(ty.is_string());
        }
        other => panic!("expected a local binding, got {other:?}"),
    }
}

#[test]
fn field_binding_names_owner_and_index() {
    let source = "package p; class A { int a; String b; void m() { b = null; } }";
    let bound = bind_source(source);
    let usage = bound.identifier("b", 1);
    assert_eq!(
        bound.result.bindings.symbol_of(usage),
        Some(&SymbolRef::Field {
            owner: "p.A".to_string(),
            index: 1,
        })
    );
}

#[test]
fn inherited_fields_resolve_through_superclass() {
    let source = "class Base { protected int count; } class A extends Base { int m() { return count; } }";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let usage = bound.identifier("count", 1);
    assert!(matches!(
        bound.result.bindings.symbol_of(usage),
        Some(SymbolRef::Field { owner, index: 0 }) if owner == "Base"
    ));
}

#[test]
fn qualified_type_names_resolve_through_packages() {
    let source = "class A { java.util.List<String> names; }";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let ty = bound.node("ClassType", "java.util.List<String>");
    assert_eq!(
        bound.result.bindings.type_of(ty).map(ResolvedType::display_qualified),
        Some("java.util.List<java.lang.String>".to_string())
    );
}

#[test]
fn missing_package_is_reported_on_the_qualifier() {
    let bound = bind_source("class A { nope.Thing t; }");
    let errors = bound.errors();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].code, diagnostic_codes::PACKAGE_DOES_NOT_EXIST);
    assert_eq!(bound.span_text(errors[0]), "nope");
}

#[test]
fn static_field_access_through_type_name() {
    let source = "class A { void m() { System.out.println(\"hi\"); } }";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let out = bound.identifier("out", 0);
    assert!(matches!(
        bound.result.bindings.symbol_of(out),
        Some(SymbolRef::Field { owner, .. }) if owner == "java.lang.System"
    ));
}

#[test]
fn instance_field_from_static_method_is_reported() {
    let source = "class A { int n; static int m() { return n; } }";
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::NON_STATIC_FROM_STATIC_CONTEXT]);
    assert_eq!(
        bound.result.diagnostics[0].message_text,
        "non-static variable n cannot be referenced from a static context"
    );
}

#[test]
fn instance_method_from_static_method_is_reported() {
    let source = "class A { void run() {} static void main() { run(); } }";
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::NON_STATIC_FROM_STATIC_CONTEXT]);
}

#[test]
fn array_length_is_a_pseudo_field() {
    let source = "class A { int m(int[] xs) { return xs.length; } }";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let length = bound.identifier("length", 0);
    assert_eq!(bound.result.bindings.symbol_of(length), Some(&SymbolRef::ArrayLength));
}

#[test]
fn primitive_receiver_cannot_be_dereferenced() {
    let source = "class A { void m(int i) { i.toString(); } }";
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::CANNOT_DEREFERENCE_PRIMITIVE]);
    assert_eq!(bound.result.diagnostics[0].message_text, "int cannot be dereferenced");
}

#[test]
fn enum_constants_and_switch_labels() {
    let source = r"
enum Color { RED, GREEN; }
class A {
    int m(Color c) {
        switch (c) {
            case RED: return 1;
            case GREEN: return 2;
            default: return 0;
        }
    }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let label = bound.identifier("GREEN", 1);
    assert_eq!(
        bound.result.bindings.symbol_of(label),
        Some(&SymbolRef::Field {
            owner: "Color".to_string(),
            index: 1,
        })
    );
}

#[test]
fn unknown_switch_label_is_reported() {
    let source = "enum Color { RED } class A { void m(Color c) { switch (c) { case BLUE: break; } } }";
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::CANNOT_FIND_SYMBOL]);
}

#[test]
fn local_and_anonymous_classes_bind_their_members() {
    let source = r"
class A {
    Runnable make() {
        class Local { int v; int get() { return v; } }
        final Local l = new Local();
        return new Runnable() {
            public void run() { l.get(); }
        };
    }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let get = bound.identifier("get", 1);
    assert!(matches!(
        bound.result.bindings.symbol_of(get),
        Some(SymbolRef::Method { owner, index: 0 }) if owner.ends_with(".Local")
    ));
}

#[test]
fn generic_member_types_follow_type_arguments() {
    let source = r"
import java.util.List;
class A {
    int m(List<String> names) { return names.get(0).length(); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let call = bound.node("MethodInvocation", "names.get(0)");
    assert!(bound.result.bindings.type_of(call).is_some_and(ResolvedType::is_string));
}

#[test]
fn sibling_units_resolve_each_other() {
    let results = bind_batch(&[
        ("a/A.java", "package a; import b.B; public class A { B b; int n() { return b.count(); } }"),
        ("b/B.java", "package b; public class B { public int count() { return 0; } }"),
    ]);
    for bound in &results {
        assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    }
    let call = results[0].identifier("count", 0);
    assert!(matches!(
        results[0].result.bindings.symbol_of(call),
        Some(SymbolRef::Method { owner, .. }) if owner == "b.B"
    ));
}

#[test]
fn same_type_in_two_batch_files_is_a_duplicate_class() {
    let results = bind_batch(&[
        ("one/A.java", "package p; public class A { }"),
        ("two/A.java", "package p; public class A { int extra; }"),
        ("B.java", "package p; class B { A a; }"),
    ]);
    assert!(results[0].result.diagnostics.is_empty(), "{:?}", results[0].result.diagnostics);
    let errors = results[1].errors();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].code, diagnostic_codes::DUPLICATE_CLASS);
    assert_eq!(results[1].span_text(errors[0]), "A");
    assert_eq!(errors[0].message_text, "duplicate class: p.A");
    assert!(results[2].result.diagnostics.is_empty(), "{:?}", results[2].result.diagnostics);
}

#[test]
fn binding_twice_gives_identical_results() {
    let source = r"
import java.util.*;
class A<T extends Comparable<T>> {
    List<T> items = new ArrayList<T>();
    T first() { return items.isEmpty() ? null : items.get(0); }
    void add(T t) { items.add(t); undefined(t); }
}
";
    let first = bind_source(source);
    let second = bind_source(source);
    assert_eq!(first.result.bindings, second.result.bindings);
    assert_eq!(first.result.diagnostics, second.result.diagnostics);
    assert_eq!(first.codes(), vec![diagnostic_codes::CANNOT_FIND_SYMBOL]);
}

#[test]
fn bindings_serialize_with_qualified_types() {
    let bound = bind_source("package p; class A { int a; String b; void m() { b = null; } }");
    let usage = bound.identifier("b", 1);
    let json = serde_json::to_value(bound.result.bindings.get(usage)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "symbol",
            "symbol": { "kind": "field", "owner": "p.A", "index": 1 },
            "ty": "java.lang.String",
        })
    );
}
