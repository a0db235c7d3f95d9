//! Resolved types and the primitive conversion tables.
//!
//! `ResolvedType` is the binder's view of a type after every name in it has
//! been resolved against the unit's scopes. It differs from the declaration
//! model's `TypeRef` in two ways: type variables carry their erased bound so
//! member lookup can proceed through them, and `Unknown` is a single
//! poisoned value that suppresses follow-on diagnostics.

use std::fmt;

use jvz_classpath::TypeRef;
use jvz_classpath::decl::simple_name;
use jvz_parser::node::{PrimitiveKind, WildcardBound};
use serde::{Serialize, Serializer};

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
pub const JAVA_LANG_STRING: &str = "java.lang.String";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    Primitive(PrimitiveKind),
    Void,
    /// Type of the `null` literal.
    Null,
    Class {
        name: String,
        args: Vec<ResolvedType>,
    },
    Array(Box<ResolvedType>),
    TypeVar {
        name: String,
        /// Erased upper bound.
        bound: Box<ResolvedType>,
    },
    Wildcard {
        bound_kind: WildcardBound,
        bound: Option<Box<ResolvedType>>,
    },
    /// A type that could not be resolved. Never reported twice.
    Unknown,
}

impl ResolvedType {
    #[must_use]
    pub fn class(name: impl Into<String>) -> ResolvedType {
        ResolvedType::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn object() -> ResolvedType {
        ResolvedType::class(JAVA_LANG_OBJECT)
    }

    #[must_use]
    pub fn string() -> ResolvedType {
        ResolvedType::class(JAVA_LANG_STRING)
    }

    #[must_use]
    pub const fn int() -> ResolvedType {
        ResolvedType::Primitive(PrimitiveKind::Int)
    }

    #[must_use]
    pub const fn boolean() -> ResolvedType {
        ResolvedType::Primitive(PrimitiveKind::Boolean)
    }

    #[must_use]
    pub fn array_of(element: ResolvedType) -> ResolvedType {
        ResolvedType::Array(Box::new(element))
    }

    /// Whether the type is, or is built on, an unresolved type.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        match self {
            ResolvedType::Unknown => true,
            ResolvedType::Array(element) => element.is_unknown(),
            _ => false,
        }
    }

    /// Unknown anywhere, type arguments included.
    #[must_use]
    pub fn contains_unknown(&self) -> bool {
        match self {
            ResolvedType::Unknown => true,
            ResolvedType::Array(element) => element.contains_unknown(),
            ResolvedType::Class { args, .. } => args.iter().any(ResolvedType::contains_unknown),
            ResolvedType::Wildcard { bound, .. } => {
                bound.as_deref().is_some_and(ResolvedType::contains_unknown)
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, ResolvedType::Primitive(_))
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, ResolvedType::Void)
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(
            self,
            ResolvedType::Class { .. }
                | ResolvedType::Array(_)
                | ResolvedType::TypeVar { .. }
                | ResolvedType::Null
        )
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ResolvedType::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_class(&self, expected: &str) -> bool {
        self.class_name() == Some(expected)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.is_class(JAVA_LANG_STRING)
    }

    /// The primitive this type converts to by unboxing, or itself.
    #[must_use]
    pub fn unboxed(&self) -> Option<PrimitiveKind> {
        match self {
            ResolvedType::Primitive(kind) => Some(*kind),
            ResolvedType::Class { name, .. } => unbox_name(name),
            ResolvedType::TypeVar { bound, .. } => bound.unboxed(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_boolean_like(&self) -> bool {
        self.unboxed() == Some(PrimitiveKind::Boolean)
    }

    #[must_use]
    pub fn is_numeric_like(&self) -> bool {
        self.unboxed().is_some_and(is_numeric)
    }

    #[must_use]
    pub fn is_integral_like(&self) -> bool {
        self.unboxed().is_some_and(is_integral)
    }

    /// Upper bound used when a wildcard is read: `? extends T` reads as `T`,
    /// anything else as `Object`.
    #[must_use]
    pub fn capture_upper(&self) -> ResolvedType {
        match self {
            ResolvedType::Wildcard {
                bound_kind: WildcardBound::Extends,
                bound: Some(bound),
            } => bound.as_ref().clone(),
            ResolvedType::Wildcard { .. } => ResolvedType::object(),
            other => other.clone(),
        }
    }

    /// Erasure: type arguments dropped, type variables replaced by their
    /// bound.
    #[must_use]
    pub fn erasure(&self) -> ResolvedType {
        match self {
            ResolvedType::Class { name, .. } => ResolvedType::class(name.clone()),
            ResolvedType::Array(element) => ResolvedType::array_of(element.erasure()),
            ResolvedType::TypeVar { bound, .. } => bound.erasure(),
            ResolvedType::Wildcard { .. } => self.capture_upper().erasure(),
            other => other.clone(),
        }
    }

    /// Declaration-model form, used as the supertype of an anonymous class.
    #[must_use]
    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            ResolvedType::Primitive(kind) => TypeRef::Primitive(*kind),
            ResolvedType::Void => TypeRef::Void,
            ResolvedType::Class { name, args } => TypeRef::Class {
                name: name.clone(),
                args: args.iter().map(ResolvedType::to_type_ref).collect(),
            },
            ResolvedType::Array(element) => TypeRef::array_of(element.to_type_ref()),
            ResolvedType::TypeVar { name, .. } => TypeRef::TypeVar(name.clone()),
            ResolvedType::Wildcard { bound_kind, bound } => TypeRef::Wildcard {
                bound_kind: *bound_kind,
                bound: bound.as_deref().map(|b| Box::new(b.to_type_ref())),
            },
            ResolvedType::Null | ResolvedType::Unknown => TypeRef::Unknown(String::new()),
        }
    }

    /// Key used to detect overriding: erased, qualified.
    #[must_use]
    pub fn erased_key(&self) -> String {
        self.erasure().display_qualified()
    }

    #[must_use]
    pub fn display_simple(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, false);
        out
    }

    #[must_use]
    pub fn display_qualified(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut String, qualified: bool) {
        match self {
            ResolvedType::Primitive(kind) => out.push_str(kind.name()),
            ResolvedType::Void => out.push_str("void"),
            ResolvedType::Null => out.push_str("<null>"),
            ResolvedType::Class { name, args } => {
                out.push_str(if qualified { name } else { simple_name(name) });
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        arg.write(out, qualified);
                    }
                    out.push('>');
                }
            }
            ResolvedType::Array(element) => {
                element.write(out, qualified);
                out.push_str("[]");
            }
            ResolvedType::TypeVar { name, .. } => out.push_str(name),
            ResolvedType::Wildcard { bound_kind, bound } => {
                out.push('?');
                if let Some(bound) = bound {
                    match bound_kind {
                        WildcardBound::Extends => out.push_str(" extends "),
                        WildcardBound::Super => out.push_str(" super "),
                        WildcardBound::None => return,
                    }
                    bound.write(out, qualified);
                }
            }
            ResolvedType::Unknown => out.push_str("<any>"),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_simple())
    }
}

impl Serialize for ResolvedType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display_qualified())
    }
}

/// Argument list rendering used in messages: `int,String`.
#[must_use]
pub fn display_list(types: &[ResolvedType]) -> String {
    types
        .iter()
        .map(ResolvedType::display_simple)
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Primitive tables
// =============================================================================

#[must_use]
pub const fn is_numeric(kind: PrimitiveKind) -> bool {
    !matches!(kind, PrimitiveKind::Boolean)
}

#[must_use]
pub const fn is_integral(kind: PrimitiveKind) -> bool {
    matches!(
        kind,
        PrimitiveKind::Byte
            | PrimitiveKind::Short
            | PrimitiveKind::Int
            | PrimitiveKind::Long
            | PrimitiveKind::Char
    )
}

#[must_use]
pub const fn box_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "java.lang.Boolean",
        PrimitiveKind::Byte => "java.lang.Byte",
        PrimitiveKind::Short => "java.lang.Short",
        PrimitiveKind::Int => "java.lang.Integer",
        PrimitiveKind::Long => "java.lang.Long",
        PrimitiveKind::Char => "java.lang.Character",
        PrimitiveKind::Float => "java.lang.Float",
        PrimitiveKind::Double => "java.lang.Double",
    }
}

#[must_use]
pub fn unbox_name(name: &str) -> Option<PrimitiveKind> {
    Some(match name {
        "java.lang.Boolean" => PrimitiveKind::Boolean,
        "java.lang.Byte" => PrimitiveKind::Byte,
        "java.lang.Short" => PrimitiveKind::Short,
        "java.lang.Integer" => PrimitiveKind::Int,
        "java.lang.Long" => PrimitiveKind::Long,
        "java.lang.Character" => PrimitiveKind::Char,
        "java.lang.Float" => PrimitiveKind::Float,
        "java.lang.Double" => PrimitiveKind::Double,
        _ => return None,
    })
}

#[must_use]
pub fn boxed(kind: PrimitiveKind) -> ResolvedType {
    ResolvedType::class(box_name(kind))
}

/// Identity or widening primitive conversion.
#[must_use]
pub const fn widens_to(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::{Boolean, Byte, Char, Double, Float, Int, Long, Short};
    matches!(
        (from, to),
        (Boolean, Boolean)
            | (Byte, Byte | Short | Int | Long | Float | Double)
            | (Short, Short | Int | Long | Float | Double)
            | (Char, Char | Int | Long | Float | Double)
            | (Int, Int | Long | Float | Double)
            | (Long, Long | Float | Double)
            | (Float, Float | Double)
            | (Double, Double)
    )
}

/// Unary numeric promotion.
#[must_use]
pub const fn unary_promotion(kind: PrimitiveKind) -> PrimitiveKind {
    match kind {
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Char => PrimitiveKind::Int,
        other => other,
    }
}

/// Binary numeric promotion.
#[must_use]
pub const fn binary_promotion(left: PrimitiveKind, right: PrimitiveKind) -> PrimitiveKind {
    use PrimitiveKind::{Double, Float, Int, Long};
    match (left, right) {
        (Double, _) | (_, Double) => Double,
        (Float, _) | (_, Float) => Float,
        (Long, _) | (_, Long) => Long,
        _ => Int,
    }
}

/// Whether an `int` constant fits the target of an assignment context
/// narrowing (`byte b = 10;`).
#[must_use]
pub fn constant_fits(value: i64, target: PrimitiveKind) -> bool {
    match target {
        PrimitiveKind::Byte => i8::try_from(value).is_ok(),
        PrimitiveKind::Short => i16::try_from(value).is_ok(),
        PrimitiveKind::Char => u16::try_from(value).is_ok(),
        PrimitiveKind::Int => i32::try_from(value).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_simple_names() {
        let ty = ResolvedType::Class {
            name: "java.util.Map".to_string(),
            args: vec![ResolvedType::string(), boxed(PrimitiveKind::Int)],
        };
        assert_eq!(ty.display_simple(), "Map<String,Integer>");
        assert_eq!(
            ty.display_qualified(),
            "java.util.Map<java.lang.String,java.lang.Integer>"
        );
        assert_eq!(ResolvedType::array_of(ResolvedType::int()).to_string(), "int[]");
    }

    #[test]
    fn promotion_and_widening() {
        assert_eq!(
            binary_promotion(PrimitiveKind::Byte, PrimitiveKind::Char),
            PrimitiveKind::Int
        );
        assert_eq!(
            binary_promotion(PrimitiveKind::Int, PrimitiveKind::Float),
            PrimitiveKind::Float
        );
        assert!(widens_to(PrimitiveKind::Char, PrimitiveKind::Long));
        assert!(!widens_to(PrimitiveKind::Char, PrimitiveKind::Short));
        assert!(!widens_to(PrimitiveKind::Boolean, PrimitiveKind::Int));
        assert!(constant_fits(127, PrimitiveKind::Byte));
        assert!(!constant_fits(128, PrimitiveKind::Byte));
        assert!(constant_fits(65535, PrimitiveKind::Char));
    }

    #[test]
    fn erasure_drops_arguments_and_variables() {
        let var = ResolvedType::TypeVar {
            name: "T".to_string(),
            bound: Box::new(ResolvedType::class("java.lang.Number")),
        };
        let list = ResolvedType::Class {
            name: "java.util.List".to_string(),
            args: vec![var.clone()],
        };
        assert_eq!(list.erasure(), ResolvedType::class("java.util.List"));
        assert_eq!(var.erasure(), ResolvedType::class("java.lang.Number"));
        assert_eq!(boxed(PrimitiveKind::Char).unboxed(), Some(PrimitiveKind::Char));
        assert!(!var.is_numeric_like());
    }
}
