//! Overload resolution across the strict, loose and variable-arity phases.

use jvz_common::diagnostic_codes;

use crate::binding::{Binding, SymbolRef, UnresolvedReason};
use crate::test_support::bind_source;

fn selected_index(bound: &crate::test_support::Bound, call_name: &str, n: usize) -> Option<usize> {
    let name = bound.identifier(call_name, n);
    match bound.result.bindings.symbol_of(name) {
        Some(SymbolRef::Method { index, .. }) => Some(*index),
        _ => None,
    }
}

#[test]
fn strict_phase_prefers_widening_over_boxing() {
    let source = r"
class A {
    void f(long x) {}
    void f(Integer x) {}
    void m() { f(1); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    assert_eq!(selected_index(&bound, "f", 2), Some(0));
}

#[test]
fn loose_phase_boxes_when_nothing_is_strictly_applicable() {
    let source = r"
class A {
    void f(Object x) {}
    void f(String x) {}
    void m() { f(1); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    assert_eq!(selected_index(&bound, "f", 2), Some(0));
}

#[test]
fn most_specific_method_wins() {
    let source = r"
class A {
    void f(Object x) {}
    void f(String x) {}
    void m() { f(null); f(new Object()); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    assert_eq!(selected_index(&bound, "f", 2), Some(1));
    assert_eq!(selected_index(&bound, "f", 3), Some(0));
}

#[test]
fn varargs_apply_only_in_the_last_phase() {
    let source = r"
class A {
    int f(int... xs) { return 0; }
    int f(int a, int b) { return 1; }
    void m() { f(1, 2); f(1, 2, 3); f(); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    assert_eq!(selected_index(&bound, "f", 2), Some(1));
    assert_eq!(selected_index(&bound, "f", 3), Some(0));
    assert_eq!(selected_index(&bound, "f", 4), Some(0));
}

#[test]
fn ambiguous_call_is_reported_and_left_unresolved() {
    let source = r"
class A {
    void f(Integer a, int b) {}
    void f(int a, Integer b) {}
    void m() { f(1, 1); }
}
";
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::AMBIGUOUS_METHOD_CALL]);
    assert_eq!(
        bound.result.diagnostics[0].message_text,
        "reference to f is ambiguous: both method f(Integer,int) in A and method f(int,Integer) in A match"
    );
    let call = bound.node("MethodInvocation", "f(1, 1)");
    assert_eq!(
        bound.result.bindings.get(call),
        Some(&Binding::Unresolved {
            reason: UnresolvedReason::Ambiguous,
        })
    );
}

#[test]
fn no_applicable_method_is_reported() {
    let source = r#"
class A {
    void f(int x) {}
    void m() { f("s"); }
}
"#;
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::NO_SUITABLE_METHOD]);
    assert_eq!(bound.result.diagnostics[0].message_text, "no suitable method found for f(String)");
}

#[test]
fn constructors_are_selected_like_methods() {
    let source = r#"
class P {
    P(int x) {}
    P(String s) {}
}
class A {
    P a = new P(1);
    P b = new P("s");
    P c = new P(1.5);
}
"#;
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::NO_SUITABLE_CONSTRUCTOR]);
    assert_eq!(
        bound.result.diagnostics[0].message_text,
        "no suitable constructor found for P(double)"
    );
    let first = bound.node("ClassInstanceCreation", "new P(1)");
    assert_eq!(
        bound.result.bindings.symbol_of(first),
        Some(&SymbolRef::Constructor {
            owner: "P".to_string(),
            index: 0,
        })
    );
}

#[test]
fn generic_methods_infer_from_arguments() {
    let source = r#"
import java.util.*;
class A {
    static <T> List<T> listOf(T first) { return null; }
    void m() { List<String> names = listOf(""); String s = listOf("").get(0); }
}
"#;
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
}

#[test]
fn overridden_methods_are_not_ambiguous() {
    let source = r"
class Base { Object get() { return null; } }
class A extends Base {
    Object get() { return this; }
    void m() { get(); }
}
";
    let bound = bind_source(source);
    assert!(bound.result.diagnostics.is_empty(), "{:?}", bound.result.diagnostics);
    let call = bound.identifier("get", 2);
    assert!(matches!(
        bound.result.bindings.symbol_of(call),
        Some(SymbolRef::Method { owner, .. }) if owner == "A"
    ));
}

#[test]
fn enum_constant_arguments_select_a_constructor() {
    let source = r#"
enum Planet {
    EARTH(1.0), MARS("red");
    Planet(double mass) {}
}
"#;
    let bound = bind_source(source);
    assert_eq!(bound.codes(), vec![diagnostic_codes::NO_SUITABLE_CONSTRUCTOR]);
}
