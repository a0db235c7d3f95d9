//! Type, member and local class declarations.

use std::sync::Arc;

use jvz_classpath::{TypeConverter, TypeDecl, anonymous_type_decl, extract_local_type_decls};
use jvz_common::diagnostic_codes;
use jvz_parser::node::TypeDeclarationKind;
use jvz_parser::{ModifierFlags, NodeData, NodeIndex};
use tracing::{debug, trace};

use crate::binding::{Binding, SymbolRef};
use crate::scope::{LocalVar, ScopeKind};
use crate::state::BinderState;
use crate::state_imports::qualify;
use crate::types::ResolvedType;

impl BinderState<'_> {
    pub(crate) fn bind_top_level_type(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(decl) = arena.get_type_declaration(idx) else {
            return;
        };
        let Some(simple) = arena.identifier_text(decl.name) else {
            return;
        };
        let name = qualify(&self.imports.package, simple);
        // An earlier unit of the batch declared the same type.
        if let Some(first) = self.env.siblings.get(&name)
            && first.origin != self.origin
        {
            self.error_at(decl.name, diagnostic_codes::DUPLICATE_CLASS, &[&name]);
        }
        match self.unit_decls.get(&name).cloned() {
            Some(type_decl) => self.bind_type_body(idx, &type_decl, true),
            None => debug!(name = %name, "no declaration extracted for top-level type"),
        }
    }

    /// Bind a class, interface, enum or annotation type body against its
    /// declaration.
    pub(crate) fn bind_type_body(&mut self, idx: NodeIndex, type_decl: &Arc<TypeDecl>, is_static: bool) {
        let arena = self.arena;
        let Some(syntax) = arena.get_type_declaration(idx) else {
            return;
        };
        trace!(name = %type_decl.name, "bind type");
        let this_type = ResolvedType::class(type_decl.name.clone());
        let symbol = Binding::Symbol {
            symbol: SymbolRef::Type {
                name: type_decl.name.clone(),
            },
            ty: this_type.clone(),
        };
        self.record(idx, symbol.clone());
        self.record(syntax.name, symbol);
        self.bind_annotations(&syntax.modifiers.annotations.nodes);

        self.push_scope(ScopeKind::Class {
            decl: Arc::clone(type_decl),
            is_static,
        });
        self.bind_type_parameters(&syntax.type_parameters.nodes);
        for &super_type in syntax.extends.nodes.iter().chain(&syntax.implements.nodes) {
            self.resolve_type(super_type);
        }

        let mut field_index = 0;
        if syntax.kind == TypeDeclarationKind::Enum {
            field_index = self.bind_enum_constants(&syntax.enum_constants.nodes, type_decl);
        }
        let method_index = if syntax.kind == TypeDeclarationKind::Enum {
            // `values` and `valueOf` come first.
            2
        } else {
            0
        };
        self.bind_members(&syntax.members.nodes, type_decl, field_index, method_index);
        self.pop_scope();
    }

    /// Declare type parameters in the current frame, then resolve their
    /// bounds so a bound may mention any of them.
    pub(crate) fn bind_type_parameters(&mut self, nodes: &[NodeIndex]) {
        let arena = self.arena;
        for &node in nodes {
            if let Some(NodeData::TypeParameter { name, .. }) = arena.data(node)
                && let Some(text) = arena.identifier_text(*name)
            {
                self.declare_type_var(text, ResolvedType::object());
            }
        }
        for &node in nodes {
            let Some(NodeData::TypeParameter { name, bounds }) = arena.data(node) else {
                continue;
            };
            let resolved: Vec<ResolvedType> = bounds.nodes.iter().map(|&b| self.resolve_type(b)).collect();
            let Some(text) = arena.identifier_text(*name) else {
                continue;
            };
            let bound = resolved
                .first()
                .map_or_else(ResolvedType::object, ResolvedType::erasure);
            self.declare_type_var(text, bound.clone());
            self.record(
                node,
                Binding::Symbol {
                    symbol: SymbolRef::Type {
                        name: text.to_string(),
                    },
                    ty: ResolvedType::TypeVar {
                        name: text.to_string(),
                        bound: Box::new(bound),
                    },
                },
            );
        }
    }

    /// Bind enum constants; returns the number of fields they declare.
    fn bind_enum_constants(&mut self, constants: &[NodeIndex], enum_decl: &Arc<TypeDecl>) -> usize {
        let arena = self.arena;
        let enum_type = ResolvedType::class(enum_decl.name.clone());
        let mut index = 0;
        for &constant in constants {
            let Some(NodeData::EnumConstant {
                annotations,
                name,
                arguments,
                body,
            }) = arena.data(constant)
            else {
                continue;
            };
            if arena.identifier_text(*name).is_none() {
                continue;
            }
            self.bind_annotations(&annotations.nodes);
            let symbol = Binding::Symbol {
                symbol: SymbolRef::Field {
                    owner: enum_decl.name.clone(),
                    index,
                },
                ty: enum_type.clone(),
            };
            self.record(constant, symbol.clone());
            self.record(*name, symbol);
            index += 1;

            // Constant arguments are evaluated in a static context.
            self.push_scope(ScopeKind::Method {
                is_static: true,
                return_type: ResolvedType::Void,
            });
            let argument_nodes = arguments.as_ref().map(|l| l.nodes.clone()).unwrap_or_default();
            let args = self.check_arguments(&argument_nodes);
            if let Some(candidates) = self.constructors_of(&enum_type, false)
                && !candidates.is_empty()
            {
                self.select_constructor(constant, *name, &enum_type, &candidates, &args, &[]);
            }
            if let Some(members) = body {
                self.bind_anonymous_body(&members.nodes, &enum_type, false);
            }
            self.pop_scope();
        }
        index
    }

    /// Bind the members of a type body. Field and method indices follow the
    /// declaration's member order, starting at the given offsets.
    pub(crate) fn bind_members(
        &mut self,
        members: &[NodeIndex],
        owner: &Arc<TypeDecl>,
        mut field_index: usize,
        mut method_index: usize,
    ) {
        let arena = self.arena;
        for &member in members {
            match arena.data(member) {
                Some(NodeData::FieldDeclaration {
                    modifiers,
                    ty,
                    declarators,
                }) => {
                    self.bind_annotations(&modifiers.annotations.nodes);
                    let base = self.resolve_type(*ty);
                    let is_static =
                        modifiers.flags.contains(ModifierFlags::STATIC) || owner.is_interface();
                    for &declarator in &declarators.nodes {
                        let Some(&NodeData::VariableDeclarator {
                            name,
                            extra_dimensions,
                            initializer,
                        }) = arena.data(declarator)
                        else {
                            continue;
                        };
                        if arena.identifier_text(name).is_none() {
                            continue;
                        }
                        let field_type = with_dimensions(base.clone(), extra_dimensions);
                        let symbol = Binding::Symbol {
                            symbol: SymbolRef::Field {
                                owner: owner.name.clone(),
                                index: field_index,
                            },
                            ty: field_type.clone(),
                        };
                        self.record(declarator, symbol.clone());
                        self.record(name, symbol);
                        field_index += 1;
                        if initializer.is_some() {
                            self.push_scope(ScopeKind::Method {
                                is_static,
                                return_type: ResolvedType::Void,
                            });
                            self.check_initializer(initializer, &field_type);
                            self.pop_scope();
                        }
                    }
                }
                Some(NodeData::MethodDeclaration(method)) => {
                    if arena.identifier_text(method.name).is_none() {
                        continue;
                    }
                    self.bind_method(member, owner, method_index);
                    method_index += 1;
                }
                Some(&NodeData::Initializer { is_static, body }) => {
                    self.push_scope(ScopeKind::Method {
                        is_static,
                        return_type: ResolvedType::Void,
                    });
                    self.bind_statement(body);
                    self.pop_scope();
                }
                Some(NodeData::TypeDeclaration(nested)) => {
                    let Some(simple) = arena.identifier_text(nested.name) else {
                        continue;
                    };
                    let name = format!("{}.{simple}", owner.name);
                    if let Some(decl) = self.lookup_decl(&name) {
                        let is_static = decl.is_static();
                        self.bind_type_body(member, &decl, is_static);
                    }
                }
                _ => {}
            }
        }
    }

    fn bind_method(&mut self, idx: NodeIndex, owner: &Arc<TypeDecl>, index: usize) {
        let arena = self.arena;
        let Some(method) = arena.get_method_declaration(idx) else {
            return;
        };
        self.bind_annotations(&method.modifiers.annotations.nodes);
        let is_static = method.modifiers.flags.contains(ModifierFlags::STATIC);
        self.push_scope(ScopeKind::Method {
            is_static,
            return_type: ResolvedType::Void,
        });
        self.bind_type_parameters(&method.type_parameters.nodes);

        let return_type = if method.is_constructor {
            ResolvedType::Void
        } else {
            with_dimensions(self.resolve_type(method.return_type), method.extra_dimensions)
        };
        if let Some(scope) = self.scopes.last_mut()
            && let ScopeKind::Method {
                return_type: slot, ..
            } = &mut scope.kind
        {
            *slot = return_type.clone();
        }
        let symbol = if method.is_constructor {
            SymbolRef::Constructor {
                owner: owner.name.clone(),
                index,
            }
        } else {
            SymbolRef::Method {
                owner: owner.name.clone(),
                index,
            }
        };
        let binding = Binding::Symbol {
            symbol,
            ty: return_type,
        };
        self.record(idx, binding.clone());
        self.record(method.name, binding);

        for &parameter in &method.parameters.nodes {
            self.bind_parameter(parameter);
        }
        for &thrown in &method.throws.nodes {
            self.resolve_type(thrown);
        }
        if method.body.is_some() {
            self.bind_statement(method.body);
        }
        if method.default_value.is_some() {
            self.bind_element_value(method.default_value);
        }
        self.pop_scope();
    }

    /// Declare a formal, catch or for-each parameter in the current frame.
    pub(crate) fn bind_parameter(&mut self, parameter: NodeIndex) -> ResolvedType {
        let arena = self.arena;
        let Some(NodeData::Parameter {
            modifiers,
            ty,
            name,
            is_varargs,
            extra_dimensions,
        }) = arena.data(parameter)
        else {
            return ResolvedType::Unknown;
        };
        self.bind_annotations(&modifiers.annotations.nodes);
        let mut resolved = with_dimensions(self.resolve_type(*ty), *extra_dimensions);
        if *is_varargs {
            resolved = ResolvedType::array_of(resolved);
        }
        if let Some(text) = arena.identifier_text(*name) {
            self.declare_local(
                text,
                LocalVar {
                    declaration: parameter,
                    ty: resolved.clone(),
                    is_final: modifiers.flags.contains(ModifierFlags::FINAL),
                },
            );
            let binding = Binding::Symbol {
                symbol: SymbolRef::Local {
                    declaration: parameter,
                    name: text.to_string(),
                },
                ty: resolved.clone(),
            };
            self.record(parameter, binding.clone());
            self.record(*name, binding);
        }
        resolved
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    pub(crate) fn bind_annotations(&mut self, annotations: &[NodeIndex]) {
        for &annotation in annotations {
            self.bind_element_value(annotation);
        }
    }

    fn bind_element_value(&mut self, node: NodeIndex) {
        let arena = self.arena;
        match arena.data(node) {
            Some(NodeData::Annotation { name, arguments }) => {
                self.resolve_type(*name);
                for &argument in &arguments.nodes {
                    self.bind_element_value(argument);
                }
            }
            Some(&NodeData::ElementValuePair { value, .. }) => self.bind_element_value(value),
            Some(NodeData::ElementValueArrayInitializer { values }) => {
                for &value in &values.nodes {
                    self.bind_element_value(value);
                }
            }
            Some(_) => {
                self.check_expression(node);
            }
            None => {}
        }
    }

    // =========================================================================
    // Local and anonymous classes
    // =========================================================================

    /// Type variable names visible at the current position.
    fn visible_type_vars(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for scope in self.scopes.iter() {
            out.extend(scope.type_vars.iter().map(|(name, _)| name.clone()));
        }
        out
    }

    fn synthetic_names(&mut self, simple: Option<&str>) -> (String, String) {
        let id = self.next_synthetic_id();
        let (outer_name, outer_binary) = match self.current_class() {
            Some(decl) => (decl.name.clone(), decl.binary_name.clone()),
            None => (self.imports.package.clone(), self.imports.package.clone()),
        };
        match simple {
            Some(simple) => (
                format!("{outer_name}${id}.{simple}"),
                format!("{outer_binary}${id}{simple}"),
            ),
            None => (format!("{outer_name}${id}"), format!("{outer_binary}${id}")),
        }
    }

    /// Declare and bind a local class declaration statement.
    pub(crate) fn bind_local_class(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(syntax) = arena.get_type_declaration(idx) else {
            return;
        };
        let Some(simple) = arena.identifier_text(syntax.name) else {
            return;
        };
        let (name, binary_name) = self.synthetic_names(Some(simple));
        let outer_vars = self.visible_type_vars();
        let decls = {
            let exists = |n: &str| self.type_exists(n);
            let converter = TypeConverter {
                arena,
                ctx: &self.import_context,
                exists: &exists,
            };
            extract_local_type_decls(&converter, idx, &name, &binary_name, &outer_vars, &self.origin)
        };
        for decl in decls {
            self.local_decls.insert(decl.name.clone(), Arc::new(decl));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.local_types.push((simple.to_string(), name.clone()));
        }
        if let Some(decl) = self.lookup_decl(&name) {
            self.bind_type_body(idx, &decl, false);
        }
    }

    /// Declare and bind an anonymous class body extending `super_type`.
    /// Returns the anonymous class type.
    pub(crate) fn bind_anonymous_body(
        &mut self,
        members: &[NodeIndex],
        super_type: &ResolvedType,
        super_is_interface: bool,
    ) -> ResolvedType {
        let arena = self.arena;
        let (name, _) = self.synthetic_names(None);
        let outer_vars = self.visible_type_vars();
        let decl = {
            let exists = |n: &str| self.type_exists(n);
            let converter = TypeConverter {
                arena,
                ctx: &self.import_context,
                exists: &exists,
            };
            anonymous_type_decl(
                &converter,
                &name,
                super_type.to_type_ref(),
                super_is_interface,
                members,
                &outer_vars,
                &self.origin,
            )
        };
        let decl = Arc::new(decl);
        self.local_decls.insert(name.clone(), Arc::clone(&decl));
        self.push_scope(ScopeKind::Class {
            decl: Arc::clone(&decl),
            is_static: false,
        });
        self.bind_members(members, &decl, 0, 0);
        self.pop_scope();
        ResolvedType::class(name)
    }

    /// Report use of an instance member of `owner` from a static context.
    pub(crate) fn error_static_reference(&mut self, node: NodeIndex, kind: &str, what: &str) {
        self.error_at(
            node,
            diagnostic_codes::NON_STATIC_FROM_STATIC_CONTEXT,
            &[kind, what],
        );
    }
}

pub(crate) fn with_dimensions(mut ty: ResolvedType, dimensions: u32) -> ResolvedType {
    for _ in 0..dimensions {
        ty = ResolvedType::array_of(ty);
    }
    ty
}
