//! Type relations: subtyping, type argument containment and the
//! assignment and method invocation conversions.
//!
//! Every relation is lenient where information is missing: an unknown type,
//! a missing declaration or an uninferred type variable never produces a
//! mismatch.

use jvz_parser::node::{PrimitiveKind, WildcardBound};

use crate::state::BinderState;
use crate::state_hierarchy::SuperSearch;
use crate::types::{JAVA_LANG_OBJECT, ResolvedType, boxed, constant_fits, widens_to};

/// Conversion allowed for a method argument in one overload phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Identity, widening and subtyping only.
    Strict,
    /// Strict plus boxing and unboxing.
    Loose,
    /// Loose, with a variable-arity tail.
    Varargs,
}

impl BinderState<'_> {
    pub(crate) fn is_subtype(&self, sub: &ResolvedType, sup: &ResolvedType) -> bool {
        use ResolvedType as T;
        if sub.contains_unknown() || sup.contains_unknown() {
            return true;
        }
        match (sub, sup) {
            (T::Primitive(a), T::Primitive(b)) => a == b,
            (T::Primitive(_), _) | (_, T::Primitive(_)) => false,
            (T::Void, _) | (_, T::Void) => false,
            (T::Null, _) => sup.is_reference(),
            (_, T::Null) => false,
            (T::TypeVar { name: a, .. }, T::TypeVar { name: b, .. }) if a == b => true,
            (T::TypeVar { bound, .. }, _) => {
                self.is_subtype(bound, sup) || matches!(sup, T::TypeVar { .. })
            }
            // Inference is approximate: a type variable target accepts any
            // reference.
            (_, T::TypeVar { .. }) => true,
            (_, T::Wildcard { .. }) => self.is_subtype(sub, &sup.capture_upper()),
            (T::Wildcard { .. }, _) => self.is_subtype(&sub.capture_upper(), sup),
            (_, T::Class { name, .. }) if name == JAVA_LANG_OBJECT => true,
            (T::Array(a), T::Array(b)) => match (a.as_ref(), b.as_ref()) {
                (T::Primitive(x), T::Primitive(y)) => x == y,
                (T::Primitive(_), _) | (_, T::Primitive(_)) => false,
                _ => self.is_subtype(a, b),
            },
            (T::Array(_), T::Class { name, .. }) => {
                name == "java.lang.Cloneable" || name == "java.io.Serializable"
            }
            (T::Class { .. }, T::Array(_)) => false,
            (T::Class { .. }, T::Class { name, args }) => match self.as_super(sub, name) {
                SuperSearch::Found(found) => {
                    let ResolvedType::Class { args: found_args, .. } = &found else {
                        return true;
                    };
                    self.arguments_contained(found_args, args)
                }
                SuperSearch::NotFound => false,
                SuperSearch::Incomplete => true,
            },
            _ => true,
        }
    }

    /// Whether `sub`'s type arguments are contained by `sup`'s. Raw types on
    /// either side convert without checks.
    fn arguments_contained(&self, sub: &[ResolvedType], sup: &[ResolvedType]) -> bool {
        if sub.is_empty() || sup.is_empty() || sub.len() != sup.len() {
            return true;
        }
        sub.iter().zip(sup).all(|(s, t)| self.contains_argument(s, t))
    }

    fn contains_argument(&self, sub: &ResolvedType, sup: &ResolvedType) -> bool {
        use ResolvedType as T;
        match sup {
            T::Wildcard { bound: None, .. } => true,
            T::Wildcard {
                bound_kind: WildcardBound::Extends,
                bound: Some(bound),
            } => self.is_subtype(&sub.capture_upper(), bound),
            T::Wildcard {
                bound_kind: WildcardBound::Super,
                bound: Some(bound),
            } => match sub {
                T::Wildcard {
                    bound_kind: WildcardBound::Super,
                    bound: Some(lower),
                } => self.is_subtype(bound, lower),
                T::Wildcard { .. } => false,
                _ => self.is_subtype(bound, sub),
            },
            T::Wildcard { .. } => true,
            T::TypeVar { .. } | T::Unknown => true,
            _ => match sub {
                T::TypeVar { .. } | T::Unknown => true,
                T::Wildcard { .. } => false,
                _ => self.same_type(sub, sup),
            },
        }
    }

    fn same_type(&self, a: &ResolvedType, b: &ResolvedType) -> bool {
        use ResolvedType as T;
        match (a, b) {
            (T::Unknown, _) | (_, T::Unknown) => true,
            (T::TypeVar { .. }, _) | (_, T::TypeVar { .. }) => true,
            (T::Class { name: n1, args: a1 }, T::Class { name: n2, args: a2 }) => {
                n1 == n2
                    && (a1.is_empty()
                        || a2.is_empty()
                        || (a1.len() == a2.len()
                            && a1.iter().zip(a2).all(|(x, y)| self.contains_argument(x, y))))
            }
            (T::Array(x), T::Array(y)) => self.same_type(x, y),
            _ => a == b,
        }
    }

    /// Assignment conversion. `constant` is the value of an integral constant
    /// expression, which may narrow to `byte`, `short` or `char`.
    pub(crate) fn is_assignable(
        &self,
        value: &ResolvedType,
        target: &ResolvedType,
        constant: Option<i64>,
    ) -> bool {
        use ResolvedType as T;
        if value.contains_unknown() || target.contains_unknown() {
            return true;
        }
        match (value, target) {
            (T::Void, _) | (_, T::Void) => false,
            (T::Primitive(from), T::Primitive(to)) => {
                widens_to(*from, *to) || narrows_constant(*from, *to, constant)
            }
            (T::Primitive(from), _) => {
                if let Some(to) = target.unboxed()
                    && target.is_class(crate::types::box_name(to))
                    && narrows_constant(*from, to, constant)
                {
                    return true;
                }
                self.is_subtype(&boxed(*from), target)
            }
            (_, T::Primitive(to)) => value.unboxed().is_some_and(|from| widens_to(from, *to)),
            _ => self.is_subtype(value, target),
        }
    }

    /// Method invocation conversion in `phase`.
    pub(crate) fn is_convertible(&self, arg: &ResolvedType, param: &ResolvedType, phase: Phase) -> bool {
        use ResolvedType as T;
        if arg.contains_unknown() || param.contains_unknown() {
            return true;
        }
        match (arg, param) {
            (T::Primitive(from), T::Primitive(to)) => widens_to(*from, *to),
            (T::Primitive(from), _) => phase != Phase::Strict && self.is_subtype(&boxed(*from), param),
            (_, T::Primitive(to)) => {
                phase != Phase::Strict && arg.unboxed().is_some_and(|from| widens_to(from, *to))
            }
            _ => self.is_subtype(arg, param),
        }
    }
}

fn narrows_constant(from: PrimitiveKind, to: PrimitiveKind, constant: Option<i64>) -> bool {
    let Some(value) = constant else {
        return false;
    };
    matches!(
        from,
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char | PrimitiveKind::Int
    ) && matches!(
        to,
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char
    ) && constant_fits(value, to)
}
