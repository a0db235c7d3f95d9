//! Declarations extracted from a parsed compilation unit.
//!
//! Type names in signatures are resolved against the unit's own types, its
//! imports, its package and `java.lang`, using a caller-supplied existence
//! check so the same code serves the index (lazy loading) and the binder
//! (sibling units of a batch).

use indexmap::IndexMap;
use jvz_parser::node::{TypeDeclaration, TypeDeclarationKind};
use jvz_parser::{ModifierFlags, NodeArena, NodeData, NodeIndex};
use rustc_hash::FxHashMap;

use crate::decl::{DeclOrigin, FieldDecl, MethodDecl, TypeDecl, TypeParam, TypeRef};

pub const JAVA_LANG: &str = "java.lang";

/// Name resolution context of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct ImportContext {
    pub package: String,
    /// Single-type imports: simple name to canonical name. First wins.
    pub single_type: IndexMap<String, String>,
    /// Type-import-on-demand prefixes (packages or types).
    pub on_demand: Vec<String>,
    /// Every type declared in the unit (including member types) by simple
    /// name. The outermost declaration wins on collisions.
    pub unit_types: FxHashMap<String, String>,
}

impl ImportContext {
    #[must_use]
    pub fn from_unit(arena: &NodeArena, root: NodeIndex) -> ImportContext {
        let mut ctx = ImportContext::default();
        let Some(unit) = arena.get_compilation_unit(root) else {
            return ctx;
        };
        if let Some(NodeData::PackageDeclaration { name, .. }) = arena.data(unit.package) {
            ctx.package = arena.dotted_name(*name).unwrap_or_default();
        }
        for import in unit.imports.iter() {
            let Some(NodeData::ImportDeclaration {
                name,
                is_static,
                on_demand,
            }) = arena.data(import)
            else {
                continue;
            };
            if *is_static {
                continue;
            }
            let Some(dotted) = arena.dotted_name(*name) else {
                continue;
            };
            if *on_demand {
                if !ctx.on_demand.contains(&dotted) {
                    ctx.on_demand.push(dotted);
                }
            } else {
                let simple = crate::decl::simple_name(&dotted).to_string();
                ctx.single_type.entry(simple).or_insert(dotted);
            }
        }
        let mut pending: Vec<(NodeIndex, String)> = unit
            .types
            .iter()
            .map(|idx| (idx, ctx.package.clone()))
            .collect();
        while !pending.is_empty() {
            let mut next = Vec::new();
            for (idx, prefix) in pending {
                let Some(decl) = arena.get_type_declaration(idx) else {
                    continue;
                };
                let Some(simple) = arena.identifier_text(decl.name) else {
                    continue;
                };
                let canonical = join(&prefix, simple);
                ctx.unit_types
                    .entry(simple.to_string())
                    .or_insert_with(|| canonical.clone());
                for member in member_type_nodes(arena, decl) {
                    next.push((member, canonical.clone()));
                }
            }
            pending = next;
        }
        ctx
    }

    /// Canonical name of `simple` in this unit's package.
    #[must_use]
    pub fn qualify(&self, simple: &str) -> String {
        join(&self.package, simple)
    }

    /// Resolve a simple type name: unit types, single-type imports, same
    /// package, on-demand imports in order, then `java.lang`.
    pub fn resolve_simple(&self, name: &str, exists: &dyn Fn(&str) -> bool) -> Option<String> {
        if let Some(found) = self.unit_types.get(name) {
            return Some(found.clone());
        }
        if let Some(found) = self.single_type.get(name) {
            return Some(found.clone());
        }
        let same_package = self.qualify(name);
        if exists(&same_package) {
            return Some(same_package);
        }
        for prefix in &self.on_demand {
            let candidate = join(prefix, name);
            if exists(&candidate) {
                return Some(candidate);
            }
        }
        let lang = join(JAVA_LANG, name);
        exists(&lang).then_some(lang)
    }

    /// Resolve a type name as written (`List`, `Map.Entry`, `java.io.File`).
    pub fn resolve_type_name(
        &self,
        written: &str,
        exists: &dyn Fn(&str) -> bool,
    ) -> Option<String> {
        match written.split_once('.') {
            None => self.resolve_simple(written, exists),
            Some((first, rest)) => {
                if let Some(head) = self.resolve_simple(first, exists) {
                    let candidate = format!("{head}.{rest}");
                    if exists(&candidate) {
                        return Some(candidate);
                    }
                }
                exists(written).then(|| written.to_string())
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn member_type_nodes<'a>(
    arena: &'a NodeArena,
    decl: &'a TypeDeclaration,
) -> impl Iterator<Item = NodeIndex> + 'a {
    decl.members
        .iter()
        .filter(|&m| matches!(arena.data(m), Some(NodeData::TypeDeclaration(_))))
}

/// Converts syntax types to `TypeRef`s for one unit.
pub struct TypeConverter<'a> {
    pub arena: &'a NodeArena,
    pub ctx: &'a ImportContext,
    pub exists: &'a dyn Fn(&str) -> bool,
}

impl TypeConverter<'_> {
    /// Convert the type at `node`; `type_vars` are the type parameter names
    /// in scope, innermost last.
    #[must_use]
    pub fn convert(&self, node: NodeIndex, type_vars: &[String]) -> TypeRef {
        match self.arena.data(node) {
            Some(NodeData::PrimitiveType(kind)) => TypeRef::Primitive(*kind),
            Some(NodeData::VoidType) => TypeRef::Void,
            Some(NodeData::ArrayType { element }) => {
                TypeRef::array_of(self.convert(*element, type_vars))
            }
            Some(NodeData::WildcardType { bound_kind, bound }) => TypeRef::Wildcard {
                bound_kind: *bound_kind,
                bound: bound
                    .to_option()
                    .map(|b| Box::new(self.convert(b, type_vars))),
            },
            Some(NodeData::ClassType { .. }) => {
                let (written, args) = self.class_type_parts(node);
                if !written.contains('.') && type_vars.iter().any(|v| *v == written) {
                    return TypeRef::TypeVar(written);
                }
                let args = args
                    .iter()
                    .map(|&arg| self.convert(arg, type_vars))
                    .collect();
                match self.ctx.resolve_type_name(&written, self.exists) {
                    Some(name) => TypeRef::Class { name, args },
                    None => TypeRef::Unknown(written),
                }
            }
            Some(NodeData::Identifier { .. } | NodeData::QualifiedName { .. }) => {
                let written = self.arena.dotted_name(node).unwrap_or_default();
                if type_vars.iter().any(|v| *v == written) {
                    return TypeRef::TypeVar(written);
                }
                match self.ctx.resolve_type_name(&written, self.exists) {
                    Some(name) => TypeRef::class(name),
                    None => TypeRef::Unknown(written),
                }
            }
            _ => TypeRef::Unknown("<error>".to_string()),
        }
    }

    /// Dotted name of a `ClassType` chain and the type arguments of its last
    /// segment.
    #[must_use]
    pub fn class_type_parts(&self, node: NodeIndex) -> (String, Vec<NodeIndex>) {
        let mut segments = Vec::new();
        let mut args = Vec::new();
        let mut current = node;
        let mut first = true;
        while let Some(NodeData::ClassType {
            qualifier,
            name,
            type_arguments,
        }) = self.arena.data(current)
        {
            segments.push(self.arena.identifier_text(*name).unwrap_or("<error>"));
            if first {
                if let Some(list) = type_arguments {
                    args = list.nodes.clone();
                }
                first = false;
            }
            current = *qualifier;
        }
        segments.reverse();
        (segments.join("."), args)
    }
}

/// Extract every type declared in the unit, member types included, in
/// declaration order (outer before inner).
#[must_use]
pub fn extract_type_decls(
    arena: &NodeArena,
    root: NodeIndex,
    origin: &DeclOrigin,
    exists: &dyn Fn(&str) -> bool,
) -> Vec<TypeDecl> {
    let ctx = ImportContext::from_unit(arena, root);
    let converter = TypeConverter {
        arena,
        ctx: &ctx,
        exists,
    };
    let mut out = Vec::new();
    let Some(unit) = arena.get_compilation_unit(root) else {
        return out;
    };
    for idx in unit.types.iter() {
        extract_type(&converter, idx, None, None, &[], origin, &mut out);
    }
    out
}

/// Canonical names of every type declared in the unit, member types
/// included, without extracting their members.
#[must_use]
pub fn declared_type_names(arena: &NodeArena, root: NodeIndex) -> Vec<String> {
    let mut out = Vec::new();
    let Some(unit) = arena.get_compilation_unit(root) else {
        return out;
    };
    let package = match arena.data(unit.package) {
        Some(NodeData::PackageDeclaration { name, .. }) => arena.dotted_name(*name).unwrap_or_default(),
        _ => String::new(),
    };
    let mut pending: Vec<(NodeIndex, String)> =
        unit.types.iter().map(|idx| (idx, package.clone())).collect();
    while let Some((idx, prefix)) = pending.pop() {
        let Some(decl) = arena.get_type_declaration(idx) else {
            continue;
        };
        let Some(simple) = arena.identifier_text(decl.name) else {
            continue;
        };
        let name = join(&prefix, simple);
        pending.extend(member_type_nodes(arena, decl).map(|m| (m, name.clone())));
        out.push(name);
    }
    out
}

/// Declarations of a local class and its member types. `name` and
/// `binary_name` are chosen by the caller since local classes have no
/// canonical name.
#[must_use]
pub fn extract_local_type_decls(
    converter: &TypeConverter<'_>,
    idx: NodeIndex,
    name: &str,
    binary_name: &str,
    outer_vars: &[String],
    origin: &DeclOrigin,
) -> Vec<TypeDecl> {
    let mut out = Vec::new();
    extract_type(
        converter,
        idx,
        None,
        Some((name.to_string(), binary_name.to_string())),
        outer_vars,
        origin,
        &mut out,
    );
    out
}

/// Declaration of an anonymous class body extending (or implementing)
/// `super_type`.
#[must_use]
pub fn anonymous_type_decl(
    converter: &TypeConverter<'_>,
    name: &str,
    super_type: TypeRef,
    super_is_interface: bool,
    members: &[NodeIndex],
    outer_vars: &[String],
    origin: &DeclOrigin,
) -> TypeDecl {
    let (superclass, interfaces) = if super_is_interface {
        (TypeRef::object(), vec![super_type])
    } else {
        (super_type, Vec::new())
    };
    let mut this = TypeDecl {
        name: name.to_string(),
        binary_name: name.to_string(),
        package: converter.ctx.package.clone(),
        kind: TypeDeclarationKind::Class,
        modifiers: ModifierFlags::FINAL,
        type_parameters: Vec::new(),
        superclass: Some(superclass),
        interfaces,
        fields: Vec::new(),
        methods: Vec::new(),
        member_types: Vec::new(),
        enclosing: None,
        origin: origin.clone(),
    };
    let constructor_name = crate::decl::simple_name(name).to_string();
    add_members(
        converter,
        &mut this,
        members.iter().copied(),
        &constructor_name,
        false,
        outer_vars,
    );
    this
}

fn extract_type(
    converter: &TypeConverter<'_>,
    idx: NodeIndex,
    enclosing: Option<&TypeDecl>,
    local_name: Option<(String, String)>,
    outer_vars: &[String],
    origin: &DeclOrigin,
    out: &mut Vec<TypeDecl>,
) {
    let arena = converter.arena;
    let Some(decl) = arena.get_type_declaration(idx) else {
        return;
    };
    let Some(simple) = arena.identifier_text(decl.name) else {
        return;
    };
    let (name, binary_name) = match (local_name, enclosing) {
        (Some(names), _) => names,
        (None, Some(outer)) => (
            format!("{}.{simple}", outer.name),
            format!("{}${simple}", outer.binary_name),
        ),
        (None, None) => {
            let name = converter.ctx.qualify(simple);
            (name.clone(), name)
        }
    };
    let is_interface = matches!(
        decl.kind,
        TypeDeclarationKind::Interface | TypeDeclarationKind::Annotation
    );

    let mut modifiers = decl.modifiers.flags;
    if enclosing.is_some_and(TypeDecl::is_interface) {
        modifiers |= ModifierFlags::PUBLIC | ModifierFlags::STATIC;
    }
    if is_interface || decl.kind == TypeDeclarationKind::Enum {
        if enclosing.is_some() {
            modifiers |= ModifierFlags::STATIC;
        }
    }

    // Static member types do not see the enclosing type's parameters.
    let mut type_vars: Vec<String> = if modifiers.contains(ModifierFlags::STATIC) {
        Vec::new()
    } else {
        outer_vars.to_vec()
    };
    let type_parameters = convert_type_parameters(converter, &decl.type_parameters.nodes, &mut type_vars);

    let mut this = TypeDecl {
        name: name.clone(),
        binary_name,
        package: converter.ctx.package.clone(),
        kind: decl.kind,
        modifiers,
        type_parameters,
        superclass: None,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        member_types: Vec::new(),
        enclosing: enclosing.map(|e| e.name.clone()),
        origin: origin.clone(),
    };

    match decl.kind {
        TypeDeclarationKind::Class => {
            this.superclass = decl
                .extends
                .iter()
                .next()
                .map(|t| converter.convert(t, &type_vars))
                .or_else(|| (name != crate::decl::JAVA_LANG_OBJECT).then(TypeRef::object));
            this.interfaces = convert_all(converter, &decl.implements.nodes, &type_vars);
        }
        TypeDeclarationKind::Interface => {
            this.interfaces = convert_all(converter, &decl.extends.nodes, &type_vars);
        }
        TypeDeclarationKind::Enum => {
            this.superclass = Some(TypeRef::Class {
                name: "java.lang.Enum".to_string(),
                args: vec![TypeRef::class(name.clone())],
            });
            this.interfaces = convert_all(converter, &decl.implements.nodes, &type_vars);
            this.modifiers |= ModifierFlags::FINAL;
            add_enum_members(&mut this, arena, decl);
        }
        TypeDeclarationKind::Annotation => {
            this.interfaces = vec![TypeRef::class("java.lang.annotation.Annotation")];
        }
    }

    let (member_nodes, has_constructor) = add_members(
        converter,
        &mut this,
        decl.members.iter(),
        simple,
        is_interface,
        &type_vars,
    );

    if !has_constructor && !is_interface {
        let modifiers = if decl.kind == TypeDeclarationKind::Enum {
            ModifierFlags::PRIVATE
        } else {
            modifiers & (ModifierFlags::PUBLIC | ModifierFlags::PROTECTED | ModifierFlags::PRIVATE)
        };
        this.methods.push(MethodDecl {
            name: simple.to_string(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: TypeRef::Void,
            throws: Vec::new(),
            modifiers,
            is_varargs: false,
            is_constructor: true,
        });
    }

    this.member_types = member_nodes
        .iter()
        .filter_map(|&m| {
            let member = arena.get_type_declaration(m)?;
            Some(format!("{name}.{}", arena.identifier_text(member.name)?))
        })
        .collect();

    let position = out.len();
    out.push(this);
    for member in member_nodes {
        // The parent is already in `out`; clone it so children can borrow it
        // while `out` grows.
        let parent = out[position].clone();
        extract_type(converter, member, Some(&parent), None, &type_vars, origin, out);
    }
}

/// Add the fields and methods among `members` to `this`. Returns the member
/// type nodes and whether a constructor was declared.
fn add_members(
    converter: &TypeConverter<'_>,
    this: &mut TypeDecl,
    members: impl Iterator<Item = NodeIndex>,
    constructor_name: &str,
    is_interface: bool,
    type_vars: &[String],
) -> (Vec<NodeIndex>, bool) {
    let arena = converter.arena;
    let mut member_nodes = Vec::new();
    let mut has_constructor = false;
    for member in members {
        match arena.data(member) {
            Some(NodeData::FieldDeclaration {
                modifiers,
                ty,
                declarators,
            }) => {
                let base = converter.convert(*ty, type_vars);
                let mut flags = modifiers.flags;
                if is_interface {
                    flags |= ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL;
                }
                for declarator in declarators.iter() {
                    if let Some(NodeData::VariableDeclarator {
                        name,
                        extra_dimensions,
                        ..
                    }) = arena.data(declarator)
                    {
                        let Some(field_name) = arena.identifier_text(*name) else {
                            continue;
                        };
                        this.fields.push(FieldDecl {
                            name: field_name.to_string(),
                            ty: with_dimensions(base.clone(), *extra_dimensions),
                            modifiers: flags,
                        });
                    }
                }
            }
            Some(NodeData::MethodDeclaration(method)) => {
                let Some(method_name) = arena.identifier_text(method.name) else {
                    continue;
                };
                has_constructor |= method.is_constructor;
                let mut method_vars = if method.modifiers.flags.contains(ModifierFlags::STATIC) {
                    Vec::new()
                } else {
                    type_vars.to_vec()
                };
                let method_type_parameters = convert_type_parameters(
                    converter,
                    &method.type_parameters.nodes,
                    &mut method_vars,
                );
                let (parameters, is_varargs) =
                    convert_parameters(converter, &method.parameters.nodes, &method_vars);
                let return_type = if method.is_constructor {
                    TypeRef::Void
                } else {
                    with_dimensions(
                        converter.convert(method.return_type, &method_vars),
                        method.extra_dimensions,
                    )
                };
                let mut flags = method.modifiers.flags;
                if is_interface {
                    flags |= ModifierFlags::PUBLIC | ModifierFlags::ABSTRACT;
                }
                this.methods.push(MethodDecl {
                    name: if method.is_constructor {
                        constructor_name.to_string()
                    } else {
                        method_name.to_string()
                    },
                    type_parameters: method_type_parameters,
                    parameters,
                    return_type,
                    throws: convert_all(converter, &method.throws.nodes, &method_vars),
                    modifiers: flags,
                    is_varargs,
                    is_constructor: method.is_constructor,
                });
            }
            Some(NodeData::TypeDeclaration(_)) => member_nodes.push(member),
            _ => {}
        }
    }
    (member_nodes, has_constructor)
}

fn add_enum_members(this: &mut TypeDecl, arena: &NodeArena, decl: &TypeDeclaration) {
    let self_type = TypeRef::class(this.name.clone());
    let constant_flags = ModifierFlags::PUBLIC | ModifierFlags::STATIC | ModifierFlags::FINAL;
    for constant in decl.enum_constants.iter() {
        if let Some(NodeData::EnumConstant { name, .. }) = arena.data(constant) {
            if let Some(text) = arena.identifier_text(*name) {
                this.fields.push(FieldDecl {
                    name: text.to_string(),
                    ty: self_type.clone(),
                    modifiers: constant_flags,
                });
            }
        }
    }
    let statics = ModifierFlags::PUBLIC | ModifierFlags::STATIC;
    this.methods.push(MethodDecl {
        name: "values".to_string(),
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: TypeRef::array_of(self_type.clone()),
        throws: Vec::new(),
        modifiers: statics,
        is_varargs: false,
        is_constructor: false,
    });
    this.methods.push(MethodDecl {
        name: "valueOf".to_string(),
        type_parameters: Vec::new(),
        parameters: vec![TypeRef::class(crate::decl::JAVA_LANG_STRING)],
        return_type: self_type,
        throws: Vec::new(),
        modifiers: statics,
        is_varargs: false,
        is_constructor: false,
    });
}

/// Convert type parameters, adding their names to `type_vars` first so that
/// bounds may refer to them (`<T extends Comparable<T>>`).
pub fn convert_type_parameters(
    converter: &TypeConverter<'_>,
    nodes: &[NodeIndex],
    type_vars: &mut Vec<String>,
) -> Vec<TypeParam> {
    let arena = converter.arena;
    let names: Vec<(NodeIndex, String)> = nodes
        .iter()
        .filter_map(|&idx| match arena.data(idx) {
            Some(NodeData::TypeParameter { name, .. }) => {
                Some((idx, arena.identifier_text(*name)?.to_string()))
            }
            _ => None,
        })
        .collect();
    type_vars.extend(names.iter().map(|(_, name)| name.clone()));
    names
        .into_iter()
        .map(|(idx, name)| {
            let bounds = match arena.data(idx) {
                Some(NodeData::TypeParameter { bounds, .. }) => {
                    convert_all(converter, &bounds.nodes, type_vars)
                }
                _ => Vec::new(),
            };
            TypeParam { name, bounds }
        })
        .collect()
}

fn convert_all(converter: &TypeConverter<'_>, nodes: &[NodeIndex], type_vars: &[String]) -> Vec<TypeRef> {
    nodes
        .iter()
        .map(|&idx| converter.convert(idx, type_vars))
        .collect()
}

/// Parameter types (varargs become arrays) and whether the last is varargs.
pub fn convert_parameters(
    converter: &TypeConverter<'_>,
    nodes: &[NodeIndex],
    type_vars: &[String],
) -> (Vec<TypeRef>, bool) {
    let mut is_varargs = false;
    let parameters = nodes
        .iter()
        .filter_map(|&idx| match converter.arena.data(idx) {
            Some(NodeData::Parameter {
                ty,
                is_varargs: varargs,
                extra_dimensions,
                ..
            }) => {
                let mut converted =
                    with_dimensions(converter.convert(*ty, type_vars), *extra_dimensions);
                if *varargs {
                    is_varargs = true;
                    converted = TypeRef::array_of(converted);
                }
                Some(converted)
            }
            _ => None,
        })
        .collect();
    (parameters, is_varargs)
}

#[must_use]
pub fn with_dimensions(mut ty: TypeRef, dimensions: u32) -> TypeRef {
    for _ in 0..dimensions {
        ty = TypeRef::array_of(ty);
    }
    ty
}
