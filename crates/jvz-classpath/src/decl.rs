//! Declarations: the canonical record of a type and its members.
//!
//! Declarations come from three places: parsed source files, decoded class
//! files and the embedded boot library. They are shared read-only through
//! `Arc` once built.

use std::fmt;
use std::path::PathBuf;

use jvz_parser::ModifierFlags;
use jvz_parser::node::{PrimitiveKind, TypeDeclarationKind, WildcardBound};
use serde::Serialize;

/// Where a declaration was found.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeclOrigin {
    /// A `.java` file under a source root, or a file of the current batch.
    Source { path: PathBuf },
    /// A `.class` file under a class directory.
    ClassFile { path: PathBuf },
    /// An entry of a `.jar`/`.zip` archive.
    Archive { archive: PathBuf, entry: String },
    /// The embedded boot library.
    Boot { file_name: String },
}

impl DeclOrigin {
    #[must_use]
    pub fn is_boot(&self) -> bool {
        matches!(self, DeclOrigin::Boot { .. })
    }
}

impl fmt::Display for DeclOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclOrigin::Source { path } | DeclOrigin::ClassFile { path } => {
                write!(f, "{}", path.display())
            }
            DeclOrigin::Archive { archive, entry } => {
                write!(f, "{}!/{}", archive.display(), entry)
            }
            DeclOrigin::Boot { file_name } => write!(f, "<boot>/{file_name}"),
        }
    }
}

/// A type as written in a declaration signature, with names resolved to
/// canonical fully-qualified form (`java.util.Map.Entry`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Void,
    Class { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    TypeVar(String),
    Wildcard {
        bound_kind: WildcardBound,
        bound: Option<Box<TypeRef>>,
    },
    /// A name that could not be resolved when the declaration was built.
    Unknown(String),
}

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
pub const JAVA_LANG_STRING: &str = "java.lang.String";

impl TypeRef {
    #[must_use]
    pub fn class(name: impl Into<String>) -> TypeRef {
        TypeRef::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn object() -> TypeRef {
        TypeRef::class(JAVA_LANG_OBJECT)
    }

    #[must_use]
    pub fn array_of(element: TypeRef) -> TypeRef {
        TypeRef::Array(Box::new(element))
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        match self {
            TypeRef::Unknown(_) => true,
            TypeRef::Array(element) => element.is_unknown(),
            _ => false,
        }
    }

    /// Canonical name of a class type, ignoring type arguments.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rendering with simple class names, the form used in messages.
    #[must_use]
    pub fn display_simple(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, false);
        out
    }

    /// Rendering with fully-qualified class names.
    #[must_use]
    pub fn display_qualified(&self) -> String {
        let mut out = String::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut String, qualified: bool) {
        match self {
            TypeRef::Primitive(kind) => out.push_str(kind.name()),
            TypeRef::Void => out.push_str("void"),
            TypeRef::Class { name, args } => {
                if qualified {
                    out.push_str(name);
                } else {
                    out.push_str(simple_name(name));
                }
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
            TypeRef::Array(element) => {
                element.write(out, qualified);
                out.push_str("[]");
            }
            TypeRef::TypeVar(name) => out.push_str(name),
            TypeRef::Wildcard { bound_kind, bound } => {
                out.push('?');
                match (bound_kind, bound) {
                    (WildcardBound::Extends, Some(bound)) => {
                        out.push_str(" extends ");
                        bound.write(out, qualified);
                    }
                    (WildcardBound::Super, Some(bound)) => {
                        out.push_str(" super ");
                        bound.write(out, qualified);
                    }
                    _ => {}
                }
            }
            TypeRef::Unknown(name) => out.push_str(name),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_simple())
    }
}

/// Last segment of a dotted name.
#[must_use]
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

impl TypeParam {
    /// First bound, or `Object`.
    #[must_use]
    pub fn erasure(&self) -> TypeRef {
        self.bounds.first().cloned().unwrap_or_else(TypeRef::object)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: ModifierFlags,
}

impl FieldDecl {
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    /// `<init>` is never used; constructors carry the type's simple name.
    pub name: String,
    pub type_parameters: Vec<TypeParam>,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
    pub modifiers: ModifierFlags,
    pub is_varargs: bool,
    pub is_constructor: bool,
}

impl MethodDecl {
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }

    /// `name(T1,T2)` with simple type names.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(TypeRef::display_simple).collect();
        format!("{}({})", self.name, params.join(","))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    /// Canonical name (`java.util.Map.Entry`).
    pub name: String,
    /// Binary name (`java.util.Map$Entry`).
    pub binary_name: String,
    pub package: String,
    pub kind: TypeDeclarationKind,
    pub modifiers: ModifierFlags,
    pub type_parameters: Vec<TypeParam>,
    /// `None` for `java.lang.Object` and for interfaces.
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    /// Canonical names of member types.
    pub member_types: Vec<String>,
    /// Canonical name of the enclosing type for member types.
    pub enclosing: Option<String>,
    pub origin: DeclOrigin,
}

impl TypeDecl {
    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(
            self.kind,
            TypeDeclarationKind::Interface | TypeDeclarationKind::Annotation
        )
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }

    /// The declared type with its own type parameters as arguments.
    #[must_use]
    pub fn this_type(&self) -> TypeRef {
        TypeRef::Class {
            name: self.name.clone(),
            args: self
                .type_parameters
                .iter()
                .map(|p| TypeRef::TypeVar(p.name.clone()))
                .collect(),
        }
    }

    /// Direct supertypes, superclass first. Classes without an explicit
    /// superclass report `Object`; interfaces report `Object` last so member
    /// lookup on an interface still finds `Object` methods.
    #[must_use]
    pub fn supertypes(&self) -> Vec<TypeRef> {
        let mut out = Vec::with_capacity(self.interfaces.len() + 1);
        if let Some(superclass) = &self.superclass {
            out.push(superclass.clone());
        }
        out.extend(self.interfaces.iter().cloned());
        if self.superclass.is_none() && self.name != JAVA_LANG_OBJECT {
            out.push(TypeRef::object());
        }
        out
    }

    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (usize, &'a FieldDecl)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.name == name)
    }

    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (usize, &'a MethodDecl)> {
        self.methods
            .iter()
            .enumerate()
            .filter(move |(_, m)| !m.is_constructor && m.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = (usize, &MethodDecl)> {
        self.methods.iter().enumerate().filter(|(_, m)| m.is_constructor)
    }
}

/// Canonical name from a binary name: `$` separators become `.`.
#[must_use]
pub fn canonical_from_binary(binary: &str) -> String {
    binary.replace(['/', '$'], ".")
}
