//! Expressions: names, member access, invocations, instance creation,
//! operators and constant evaluation.

use std::sync::Arc;

use jvz_classpath::TypeDecl;
use jvz_common::diagnostic_codes;
use jvz_parser::node::{LiteralKind, PrimitiveKind};
use jvz_parser::{ModifierFlags, NodeData, NodeIndex};
use jvz_scanner::{SyntaxKind, token_to_text};
use tracing::trace;

use crate::binding::{Binding, SymbolRef, UnresolvedReason};
use crate::scope::ScopeKind;
use crate::state::BinderState;
use crate::state_hierarchy::{FieldLookup, MethodCandidate, Subst};
use crate::state_overload::Selection;
use crate::types::{
    ResolvedType, binary_promotion, boxed, display_list, is_integral, unary_promotion,
};

/// Recursion limit for constant folding through final variables.
const MAX_CONSTANT_DEPTH: u32 = 32;

/// What a dotted name denotes once resolved left to right.
enum NameMeaning {
    Value(ResolvedType),
    Type(ResolvedType),
    /// A package prefix, possibly nonexistent.
    Package(String),
    /// Reported or poisoned; nothing further to check.
    Error,
}

/// Where the methods of an invocation were found.
struct Receiver {
    candidates: Vec<MethodCandidate>,
    complete: bool,
    /// Only static methods may be selected.
    static_only: bool,
}

impl BinderState<'_> {
    /// Check an expression and record its type. Nodes that resolved to a
    /// symbol keep that binding.
    pub(crate) fn check_expression(&mut self, node: NodeIndex) -> ResolvedType {
        if node.is_none() {
            return ResolvedType::Unknown;
        }
        let ty = self.compute_expression(node);
        self.record_type(node, &ty);
        ty
    }

    pub(crate) fn check_arguments(&mut self, arguments: &[NodeIndex]) -> Vec<ResolvedType> {
        arguments.iter().map(|&a| self.check_expression(a)).collect()
    }

    fn compute_expression(&mut self, node: NodeIndex) -> ResolvedType {
        let arena = self.arena;
        let Some(data) = arena.data(node) else {
            return ResolvedType::Unknown;
        };
        match data {
            NodeData::Literal { kind, .. } => literal_type(*kind),
            NodeData::Identifier { .. } | NodeData::QualifiedName { .. } | NodeData::FieldAccess { .. } => {
                self.check_name_expression(node)
            }
            &NodeData::ThisExpression { qualifier } => self.check_this(node, qualifier),
            &NodeData::SuperExpression { qualifier } => self.check_super(qualifier),
            NodeData::MethodInvocation {
                expression,
                type_arguments,
                name,
                arguments,
            } => self.check_method_invocation(
                node,
                *expression,
                &type_arguments.nodes,
                *name,
                &arguments.nodes,
            ),
            NodeData::ClassInstanceCreation {
                outer,
                ty,
                arguments,
                body,
            } => {
                let body = body.as_ref().map(|b| b.nodes.as_slice());
                self.check_instance_creation(node, *outer, *ty, &arguments.nodes, body)
            }
            NodeData::ArrayCreation {
                element_type,
                dimensions,
                extra_dimensions,
                initializer,
            } => {
                let mut ty = self.resolve_type(*element_type);
                for &dimension in &dimensions.nodes {
                    let index = self.check_expression(dimension);
                    self.check_index(dimension, &index);
                }
                let depth = u32::try_from(dimensions.len()).unwrap_or(u32::MAX).saturating_add(*extra_dimensions);
                for _ in 0..depth {
                    ty = ResolvedType::array_of(ty);
                }
                if initializer.is_some() {
                    self.check_initializer(*initializer, &ty);
                }
                ty
            }
            NodeData::ArrayInitializer { elements } => {
                for &element in &elements.nodes {
                    self.check_expression(element);
                }
                ResolvedType::Unknown
            }
            &NodeData::ArrayAccess { array, index } => {
                let array_type = self.check_expression(array);
                let index_type = self.check_expression(index);
                self.check_index(index, &index_type);
                match array_type {
                    ResolvedType::Array(element) => *element,
                    _ => ResolvedType::Unknown,
                }
            }
            &NodeData::PrefixUnary { operator, operand } => self.check_unary(node, operator, operand),
            &NodeData::PostfixUnary { operator, operand } => self.check_unary(node, operator, operand),
            &NodeData::Binary {
                operator,
                left,
                right,
            } => self.check_binary(node, operator, left, right),
            &NodeData::InstanceOf { expression, ty } => {
                self.check_expression(expression);
                self.resolve_type(ty);
                ResolvedType::boolean()
            }
            &NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.check_condition(condition);
                let a = self.check_expression(when_true);
                let b = self.check_expression(when_false);
                self.conditional_type(&a, &b)
            }
            &NodeData::Assignment {
                operator,
                target,
                value,
            } => self.check_assignment(node, operator, target, value),
            &NodeData::Cast { ty, expression } => {
                let target = self.resolve_type(ty);
                self.check_expression(expression);
                target
            }
            &NodeData::Parenthesized { expression } => self.check_expression(expression),
            &NodeData::ClassLiteral { ty } => {
                let ty = self.resolve_type(ty);
                Self::class_literal_type(&ty)
            }
            _ => ResolvedType::Unknown,
        }
    }

    fn check_index(&mut self, node: NodeIndex, index: &ResolvedType) {
        let promoted = index.unboxed().map(unary_promotion);
        if !index.contains_unknown() && promoted != Some(PrimitiveKind::Int) {
            self.error_at(
                node,
                diagnostic_codes::INCOMPATIBLE_TYPES,
                &[&index.display_simple(), "int"],
            );
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn check_name_expression(&mut self, node: NodeIndex) -> ResolvedType {
        match self.resolve_name(node) {
            NameMeaning::Value(ty) => ty,
            NameMeaning::Type(_) => {
                // A type name alone is not a value.
                if let Some(text) = self.last_segment_text(node) {
                    self.error_at(node, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", &text]);
                }
                ResolvedType::Unknown
            }
            NameMeaning::Package(package) => {
                self.report_package_as_value(node, &package);
                ResolvedType::Unknown
            }
            NameMeaning::Error => ResolvedType::Unknown,
        }
    }

    fn last_segment_text(&self, node: NodeIndex) -> Option<String> {
        let name = match self.arena.data(node)? {
            NodeData::Identifier { .. } => node,
            &NodeData::QualifiedName { name, .. } | &NodeData::FieldAccess { name, .. } => name,
            _ => return None,
        };
        self.arena.identifier_text(name).map(str::to_string)
    }

    /// Report a name that resolved to no variable, type or existing member.
    fn report_package_as_value(&mut self, node: NodeIndex, package: &str) {
        let arena = self.arena;
        let qualifier = match arena.data(node) {
            Some(NodeData::Identifier { text }) => {
                self.error_at(node, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", text]);
                self.record_unresolved(node, UnresolvedReason::NotFound);
                return;
            }
            Some(&NodeData::QualifiedName { qualifier, .. } | &NodeData::FieldAccess {
                expression: qualifier,
                ..
            }) => qualifier,
            _ => return,
        };
        self.record_unresolved(node, UnresolvedReason::NotFound);
        if let Some(NodeData::Identifier { text }) = arena.data(qualifier) {
            self.error_at(qualifier, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", text]);
            return;
        }
        let (prefix, last) = package.rsplit_once('.').unwrap_or(("", package));
        if self.package_exists(prefix) {
            self.error_at(node, diagnostic_codes::CANNOT_FIND_SYMBOL, &["class", last]);
        } else {
            self.error_at(qualifier, diagnostic_codes::PACKAGE_DOES_NOT_EXIST, &[prefix]);
        }
    }

    fn resolve_name(&mut self, node: NodeIndex) -> NameMeaning {
        let arena = self.arena;
        match arena.data(node) {
            Some(NodeData::Identifier { text }) => self.resolve_simple_name(node, text),
            Some(&NodeData::QualifiedName { qualifier, name } | &NodeData::FieldAccess {
                expression: qualifier,
                name,
            }) => {
                let Some(text) = arena.identifier_text(name) else {
                    return NameMeaning::Error;
                };
                let head = match arena.data(qualifier) {
                    Some(NodeData::Identifier { .. } | NodeData::QualifiedName { .. } | NodeData::FieldAccess { .. }) => {
                        let meaning = self.resolve_name(qualifier);
                        if let NameMeaning::Value(ty) = &meaning {
                            self.record_type(qualifier, ty);
                        }
                        meaning
                    }
                    _ => NameMeaning::Value(self.check_expression(qualifier)),
                };
                match head {
                    NameMeaning::Value(receiver) => self.select_field(node, qualifier, name, text, &receiver),
                    NameMeaning::Type(owner) => self.select_static_member(node, name, text, &owner),
                    NameMeaning::Package(package) => {
                        let full = format!("{package}.{text}");
                        if self.type_exists(&full) {
                            self.record(
                                qualifier,
                                Binding::Symbol {
                                    symbol: SymbolRef::Package { name: package },
                                    ty: ResolvedType::Unknown,
                                },
                            );
                            let ty = ResolvedType::class(full.clone());
                            self.record(
                                node,
                                Binding::Symbol {
                                    symbol: SymbolRef::Type { name: full },
                                    ty: ty.clone(),
                                },
                            );
                            NameMeaning::Type(ty)
                        } else {
                            NameMeaning::Package(full)
                        }
                    }
                    NameMeaning::Error => {
                        self.record_unresolved(node, UnresolvedReason::Poisoned);
                        NameMeaning::Error
                    }
                }
            }
            _ => NameMeaning::Value(self.check_expression(node)),
        }
    }

    /// A simple name: locals, fields of enclosing classes, static imports,
    /// types, then packages.
    fn resolve_simple_name(&mut self, node: NodeIndex, text: &str) -> NameMeaning {
        let local = self
            .scopes_inner_to_outer()
            .find_map(|scope| scope.locals.get(text).cloned());
        if let Some(var) = local {
            self.record(
                node,
                Binding::Symbol {
                    symbol: SymbolRef::Local {
                        declaration: var.declaration,
                        name: text.to_string(),
                    },
                    ty: var.ty.clone(),
                },
            );
            return NameMeaning::Value(var.ty);
        }

        let mut complete = true;
        for (decl, static_context) in self.enclosing_classes() {
            match self.find_field(&self.this_type_of(&decl), text) {
                FieldLookup::Found {
                    owner,
                    index,
                    ty,
                    is_static,
                } => {
                    if static_context && !is_static {
                        self.error_static_reference(node, "variable", text);
                    }
                    self.record(
                        node,
                        Binding::Symbol {
                            symbol: SymbolRef::Field { owner, index },
                            ty: ty.clone(),
                        },
                    );
                    return NameMeaning::Value(ty);
                }
                FieldLookup::NotFound { complete: c } => complete &= c,
            }
        }

        for owner in self.static_import_owners(text) {
            if let FieldLookup::Found {
                owner,
                index,
                ty,
                is_static: true,
            } = self.find_field(&ResolvedType::class(owner), text)
            {
                self.record(
                    node,
                    Binding::Symbol {
                        symbol: SymbolRef::Field { owner, index },
                        ty: ty.clone(),
                    },
                );
                return NameMeaning::Value(ty);
            }
        }

        match self.lookup_simple_type(text) {
            crate::state_imports::TypeLookup::Found(ty) => {
                let name = match &ty {
                    ResolvedType::Class { name, .. } | ResolvedType::TypeVar { name, .. } => name.clone(),
                    _ => text.to_string(),
                };
                self.record(
                    node,
                    Binding::Symbol {
                        symbol: SymbolRef::Type { name },
                        ty: ty.clone(),
                    },
                );
                NameMeaning::Type(ty)
            }
            crate::state_imports::TypeLookup::Ambiguous(first, second) => {
                self.error_at(node, diagnostic_codes::AMBIGUOUS_REFERENCE, &[text, &first, &second]);
                self.record_unresolved(node, UnresolvedReason::Ambiguous);
                NameMeaning::Error
            }
            crate::state_imports::TypeLookup::NotFound if !complete => {
                self.record_unresolved(node, UnresolvedReason::Poisoned);
                NameMeaning::Error
            }
            crate::state_imports::TypeLookup::NotFound => NameMeaning::Package(text.to_string()),
        }
    }

    /// Enclosing class declarations from innermost outwards, each with
    /// whether the current position is a static context relative to it.
    fn enclosing_classes(&self) -> Vec<(Arc<TypeDecl>, bool)> {
        let mut out = Vec::new();
        let mut static_seen = false;
        for scope in self.scopes_inner_to_outer() {
            if scope.is_static_frame() {
                static_seen = true;
            }
            if let ScopeKind::Class { decl, is_static } = &scope.kind {
                out.push((Arc::clone(decl), static_seen));
                if *is_static {
                    static_seen = true;
                }
            }
        }
        out
    }

    /// `receiver.name` where the receiver is a value.
    fn select_field(
        &mut self,
        node: NodeIndex,
        qualifier: NodeIndex,
        name: NodeIndex,
        text: &str,
        receiver: &ResolvedType,
    ) -> NameMeaning {
        match receiver {
            ResolvedType::Unknown | ResolvedType::Null => {
                self.record_unresolved(node, UnresolvedReason::Poisoned);
                NameMeaning::Error
            }
            ResolvedType::Primitive(kind) => {
                self.error_at(qualifier, diagnostic_codes::CANNOT_DEREFERENCE_PRIMITIVE, &[kind.name()]);
                self.record_unresolved(node, UnresolvedReason::Poisoned);
                NameMeaning::Error
            }
            ResolvedType::Array(_) if text == "length" => {
                let binding = Binding::Symbol {
                    symbol: SymbolRef::ArrayLength,
                    ty: ResolvedType::int(),
                };
                self.record(node, binding.clone());
                self.record(name, binding);
                NameMeaning::Value(ResolvedType::int())
            }
            _ => match self.find_field(receiver, text) {
                FieldLookup::Found { owner, index, ty, .. } => {
                    let binding = Binding::Symbol {
                        symbol: SymbolRef::Field { owner, index },
                        ty: ty.clone(),
                    };
                    self.record(node, binding.clone());
                    self.record(name, binding);
                    NameMeaning::Value(ty)
                }
                FieldLookup::NotFound { complete } => {
                    if complete {
                        self.error_at(name, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", text]);
                    }
                    self.record_unresolved(node, UnresolvedReason::NotFound);
                    NameMeaning::Error
                }
            },
        }
    }

    /// `Type.name`: a static field or a member type.
    fn select_static_member(&mut self, node: NodeIndex, name: NodeIndex, text: &str, owner: &ResolvedType) -> NameMeaning {
        let lookup = self.find_field(owner, text);
        if let FieldLookup::Found {
            owner: field_owner,
            index,
            ty,
            is_static,
        } = lookup
        {
            if !is_static {
                self.error_static_reference(name, "variable", text);
            }
            let binding = Binding::Symbol {
                symbol: SymbolRef::Field {
                    owner: field_owner,
                    index,
                },
                ty: ty.clone(),
            };
            self.record(node, binding.clone());
            self.record(name, binding);
            return NameMeaning::Value(ty);
        }
        if let Some(member) = owner.class_name().and_then(|o| self.find_member_type(o, text)) {
            let ty = ResolvedType::class(member.clone());
            self.record(
                node,
                Binding::Symbol {
                    symbol: SymbolRef::Type { name: member },
                    ty: ty.clone(),
                },
            );
            return NameMeaning::Type(ty);
        }
        if matches!(lookup, FieldLookup::NotFound { complete: true }) {
            self.error_at(name, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", text]);
        }
        self.record_unresolved(node, UnresolvedReason::NotFound);
        NameMeaning::Error
    }

    // =========================================================================
    // this and super
    // =========================================================================

    /// The type of `this` inside `decl`: its own type variables as arguments.
    pub(crate) fn this_type_of(&self, decl: &TypeDecl) -> ResolvedType {
        let empty = Subst::default();
        ResolvedType::Class {
            name: decl.name.clone(),
            args: decl
                .type_parameters
                .iter()
                .map(|p| ResolvedType::TypeVar {
                    name: p.name.clone(),
                    bound: Box::new(self.convert_ref(&p.erasure(), &empty).erasure()),
                })
                .collect(),
        }
    }

    fn check_this(&mut self, node: NodeIndex, qualifier: NodeIndex) -> ResolvedType {
        let classes = self.enclosing_classes();
        if qualifier.is_none() {
            let Some((decl, static_context)) = classes.first() else {
                return ResolvedType::Unknown;
            };
            if *static_context {
                self.error_static_reference(node, "variable", "this");
                return ResolvedType::Unknown;
            }
            return self.this_type_of(decl);
        }
        let target = self.resolve_type(qualifier);
        let Some(name) = target.class_name() else {
            return ResolvedType::Unknown;
        };
        match classes.iter().find(|(decl, _)| decl.name == name) {
            Some((decl, static_context)) => {
                if *static_context {
                    self.error_static_reference(node, "variable", "this");
                    return ResolvedType::Unknown;
                }
                self.this_type_of(decl)
            }
            None => ResolvedType::Unknown,
        }
    }

    fn check_super(&mut self, qualifier: NodeIndex) -> ResolvedType {
        let decl = if qualifier.is_none() {
            self.current_class()
        } else {
            let target = self.resolve_type(qualifier);
            target.class_name().and_then(|name| self.lookup_decl(name))
        };
        let Some(decl) = decl else {
            return ResolvedType::Unknown;
        };
        match &decl.superclass {
            Some(superclass) => self.convert_ref(superclass, &Subst::default()),
            None => ResolvedType::object(),
        }
    }

    // =========================================================================
    // Invocations
    // =========================================================================

    fn check_method_invocation(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        type_arguments: &[NodeIndex],
        name: NodeIndex,
        arguments: &[NodeIndex],
    ) -> ResolvedType {
        let arena = self.arena;
        let explicit: Vec<ResolvedType> = type_arguments.iter().map(|&t| self.resolve_type(t)).collect();
        let Some(text) = arena.identifier_text(name) else {
            self.check_arguments(arguments);
            return ResolvedType::Unknown;
        };
        let receiver = self.invocation_receiver(expression, text);
        let args = self.check_arguments(arguments);
        let Some(receiver) = receiver else {
            self.record_unresolved(node, UnresolvedReason::Poisoned);
            return ResolvedType::Unknown;
        };
        if receiver.candidates.is_empty() {
            if receiver.complete {
                let signature = format!("{text}({})", display_list(&args));
                self.error_at(name, diagnostic_codes::CANNOT_FIND_SYMBOL, &["method", &signature]);
                self.record_unresolved(node, UnresolvedReason::NotFound);
            } else {
                self.record_unresolved(node, UnresolvedReason::Poisoned);
            }
            return ResolvedType::Unknown;
        }

        match self.select_overload(&receiver.candidates, &args, &explicit) {
            Selection::Selected(method) => {
                trace!(method = %method.signature(), owner = %method.owner, "method selected");
                if receiver.static_only && !method.is_static {
                    self.error_static_reference(name, "method", &method.signature());
                }
                let return_type = if text == "getClass" && args.is_empty() {
                    self.get_class_type(expression)
                } else {
                    method.return_type.clone()
                };
                let binding = Binding::Symbol {
                    symbol: SymbolRef::Method {
                        owner: method.owner,
                        index: method.index,
                    },
                    ty: return_type.clone(),
                };
                self.record(node, binding.clone());
                self.record(name, binding);
                return_type
            }
            Selection::NoneApplicable => {
                self.error_at(
                    name,
                    diagnostic_codes::NO_SUITABLE_METHOD,
                    &[text, &display_list(&args)],
                );
                self.record_unresolved(node, UnresolvedReason::NoApplicableMember);
                ResolvedType::Unknown
            }
            Selection::Ambiguous(a, b) => {
                self.report_ambiguous_call(name, text, "method", &a, &b);
                self.record_unresolved(node, UnresolvedReason::Ambiguous);
                ResolvedType::Unknown
            }
        }
    }

    /// `Class<? extends |T|>` for `expr.getClass()`.
    fn get_class_type(&mut self, expression: NodeIndex) -> ResolvedType {
        let receiver = if expression.is_none() {
            self.current_class()
                .map_or(ResolvedType::Unknown, |decl| ResolvedType::class(decl.name.clone()))
        } else {
            self.bindings
                .type_of(expression)
                .cloned()
                .unwrap_or(ResolvedType::Unknown)
        };
        ResolvedType::Class {
            name: "java.lang.Class".to_string(),
            args: vec![ResolvedType::Wildcard {
                bound_kind: jvz_parser::node::WildcardBound::Extends,
                bound: Some(Box::new(receiver.erasure())),
            }],
        }
    }

    /// Candidate methods named `name` for the receiver `expression`, or
    /// `None` when the receiver is poisoned or already reported.
    fn invocation_receiver(&mut self, expression: NodeIndex, name: &str) -> Option<Receiver> {
        let arena = self.arena;
        if expression.is_none() {
            return Some(self.unqualified_receiver(name));
        }
        let receiver_type = match arena.data(expression) {
            Some(NodeData::Identifier { .. } | NodeData::QualifiedName { .. } | NodeData::FieldAccess { .. }) => {
                match self.resolve_name(expression) {
                    NameMeaning::Value(ty) => {
                        self.record_type(expression, &ty);
                        ty
                    }
                    NameMeaning::Type(ty) => {
                        let (candidates, complete) = self.collect_methods(&ty, name);
                        return Some(Receiver {
                            candidates,
                            complete,
                            static_only: true,
                        });
                    }
                    NameMeaning::Package(package) => {
                        self.report_package_as_value(expression, &package);
                        return None;
                    }
                    NameMeaning::Error => return None,
                }
            }
            _ => self.check_expression(expression),
        };
        match &receiver_type {
            ResolvedType::Unknown | ResolvedType::Null | ResolvedType::Void => None,
            ResolvedType::Primitive(kind) => {
                self.error_at(expression, diagnostic_codes::CANNOT_DEREFERENCE_PRIMITIVE, &[kind.name()]);
                None
            }
            ty => {
                let (candidates, complete) = self.collect_methods(ty, name);
                Some(Receiver {
                    candidates,
                    complete,
                    static_only: false,
                })
            }
        }
    }

    /// Methods of the innermost enclosing class declaring `name`, then
    /// statically imported methods.
    fn unqualified_receiver(&mut self, name: &str) -> Receiver {
        let mut complete = true;
        for (decl, static_context) in self.enclosing_classes() {
            let (candidates, c) = self.collect_methods(&self.this_type_of(&decl), name);
            complete &= c;
            if !candidates.is_empty() {
                return Receiver {
                    candidates,
                    complete,
                    static_only: static_context,
                };
            }
        }
        let mut candidates = Vec::new();
        for owner in self.static_import_owners(name) {
            let (found, c) = self.collect_methods(&ResolvedType::class(owner), name);
            complete &= c;
            candidates.extend(found.into_iter().filter(|m| m.is_static));
        }
        Receiver {
            candidates,
            complete,
            static_only: false,
        }
    }

    fn report_ambiguous_call(
        &mut self,
        node: NodeIndex,
        name: &str,
        kind: &str,
        a: &MethodCandidate,
        b: &MethodCandidate,
    ) {
        let describe = |m: &MethodCandidate| {
            let signature = if m.is_constructor {
                format!("{}({})", jvz_classpath::decl::simple_name(&m.owner), display_list(&m.params))
            } else {
                m.signature()
            };
            format!("{kind} {signature} in {}", jvz_classpath::decl::simple_name(&m.owner))
        };
        let first = describe(a);
        let second = describe(b);
        self.error_at(node, diagnostic_codes::AMBIGUOUS_METHOD_CALL, &[name, &first, &second]);
    }

    /// Select among the constructors of `ty` and record the choice on
    /// `node`. Diagnostics go to `report_at`.
    pub(crate) fn select_constructor(
        &mut self,
        node: NodeIndex,
        report_at: NodeIndex,
        ty: &ResolvedType,
        candidates: &[MethodCandidate],
        args: &[ResolvedType],
        explicit: &[ResolvedType],
    ) -> Option<MethodCandidate> {
        let simple = ty
            .class_name()
            .map(|n| jvz_classpath::decl::simple_name(n).to_string())
            .unwrap_or_default();
        match self.select_overload(candidates, args, explicit) {
            Selection::Selected(ctor) => {
                self.record(
                    node,
                    Binding::Symbol {
                        symbol: SymbolRef::Constructor {
                            owner: ctor.owner.clone(),
                            index: ctor.index,
                        },
                        ty: ty.clone(),
                    },
                );
                Some(ctor)
            }
            Selection::NoneApplicable => {
                self.error_at(
                    report_at,
                    diagnostic_codes::NO_SUITABLE_CONSTRUCTOR,
                    &[&simple, &display_list(args)],
                );
                self.record_unresolved(node, UnresolvedReason::NoApplicableMember);
                None
            }
            Selection::Ambiguous(a, b) => {
                self.report_ambiguous_call(report_at, &simple, "constructor", &a, &b);
                self.record_unresolved(node, UnresolvedReason::Ambiguous);
                None
            }
        }
    }

    fn check_instance_creation(
        &mut self,
        node: NodeIndex,
        outer: NodeIndex,
        ty: NodeIndex,
        arguments: &[NodeIndex],
        body: Option<&[NodeIndex]>,
    ) -> ResolvedType {
        let class_type = if outer.is_some() {
            let outer_type = self.check_expression(outer);
            self.resolve_inner_creation_type(ty, &outer_type)
        } else {
            self.resolve_type(ty)
        };
        let diamond = self.is_diamond(ty);
        let args = self.check_arguments(arguments);

        let decl = class_type.class_name().and_then(|n| self.lookup_decl(n));
        let is_interface = decl.as_ref().is_some_and(|d| d.is_interface());
        let mut result = class_type.clone();
        if diamond && let (ResolvedType::Class { args: type_args, .. }, Some(decl)) = (&mut result, &decl) {
            *type_args = vec![ResolvedType::Unknown; decl.type_parameters.len()];
        }

        if !is_interface
            && let Some(candidates) = self.constructors_of(&class_type, diamond)
            && !candidates.is_empty()
        {
            self.select_constructor(node, ty, &result, &candidates, &args, &[]);
        }
        match body {
            Some(members) => self.bind_anonymous_body(members, &result, is_interface),
            None => result,
        }
    }

    /// `outer.new Inner<...>()`: `Inner` names a member type of the outer
    /// instance's class.
    fn resolve_inner_creation_type(&mut self, ty: NodeIndex, outer: &ResolvedType) -> ResolvedType {
        let arena = self.arena;
        let Some(NodeData::ClassType {
            qualifier,
            name,
            type_arguments,
        }) = arena.data(ty)
        else {
            return self.resolve_type(ty);
        };
        if qualifier.is_some() {
            return self.resolve_type(ty);
        }
        let Some(text) = arena.identifier_text(*name) else {
            return ResolvedType::Unknown;
        };
        let Some(owner) = outer.class_name() else {
            return ResolvedType::Unknown;
        };
        let Some(member) = self.find_member_type(owner, text) else {
            self.error_at(*name, diagnostic_codes::CANNOT_FIND_SYMBOL, &["class", text]);
            self.record_unresolved(ty, UnresolvedReason::NotFound);
            return ResolvedType::Unknown;
        };
        let args = type_arguments
            .as_ref()
            .map(|list| list.nodes.iter().map(|&a| self.resolve_type(a)).collect())
            .unwrap_or_default();
        let resolved = ResolvedType::Class {
            name: member.clone(),
            args,
        };
        self.record(
            ty,
            Binding::Symbol {
                symbol: SymbolRef::Type { name: member },
                ty: resolved.clone(),
            },
        );
        resolved
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn bad_operands(&mut self, node: NodeIndex, operator: SyntaxKind) -> ResolvedType {
        self.error_at(node, diagnostic_codes::BAD_OPERAND_TYPES, &[token_to_text(operator)]);
        ResolvedType::Unknown
    }

    fn check_unary(&mut self, node: NodeIndex, operator: SyntaxKind, operand: NodeIndex) -> ResolvedType {
        let ty = self.check_expression(operand);
        if ty.contains_unknown() {
            return match operator {
                SyntaxKind::ExclamationToken => ResolvedType::boolean(),
                _ => ResolvedType::Unknown,
            };
        }
        match operator {
            SyntaxKind::ExclamationToken if ty.is_boolean_like() => ResolvedType::boolean(),
            SyntaxKind::TildeToken if ty.is_integral_like() => {
                ty.unboxed().map_or(ResolvedType::Unknown, |k| ResolvedType::Primitive(unary_promotion(k)))
            }
            SyntaxKind::PlusToken | SyntaxKind::MinusToken if ty.is_numeric_like() => {
                ty.unboxed().map_or(ResolvedType::Unknown, |k| ResolvedType::Primitive(unary_promotion(k)))
            }
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken if ty.is_numeric_like() => ty,
            _ => self.bad_operands(node, operator),
        }
    }

    fn check_binary(&mut self, node: NodeIndex, operator: SyntaxKind, left: NodeIndex, right: NodeIndex) -> ResolvedType {
        let l = self.check_expression(left);
        let r = self.check_expression(right);
        use SyntaxKind as K;
        let is_comparison = matches!(
            operator,
            K::LessThanToken
                | K::GreaterThanToken
                | K::LessThanEqualsToken
                | K::GreaterThanEqualsToken
                | K::EqualsEqualsToken
                | K::ExclamationEqualsToken
                | K::AmpersandAmpersandToken
                | K::BarBarToken
        );
        if operator == K::PlusToken && (l.is_string() || r.is_string()) {
            if l.is_void() || r.is_void() {
                return self.bad_operands(node, operator);
            }
            return ResolvedType::string();
        }
        if l.contains_unknown() || r.contains_unknown() {
            return if is_comparison {
                ResolvedType::boolean()
            } else {
                ResolvedType::Unknown
            };
        }
        let numeric = || match (l.unboxed(), r.unboxed()) {
            (Some(a), Some(b)) if crate::types::is_numeric(a) && crate::types::is_numeric(b) => {
                Some(binary_promotion(a, b))
            }
            _ => None,
        };
        let ok = match operator {
            K::PlusToken | K::MinusToken | K::AsteriskToken | K::SlashToken | K::PercentToken => {
                numeric().map(ResolvedType::Primitive)
            }
            K::LessThanLessThanToken | K::GreaterThanGreaterThanToken | K::GreaterThanGreaterThanGreaterThanToken => {
                match (l.unboxed(), r.unboxed()) {
                    (Some(a), Some(b)) if is_integral(a) && is_integral(b) => {
                        Some(ResolvedType::Primitive(unary_promotion(a)))
                    }
                    _ => None,
                }
            }
            K::LessThanToken | K::GreaterThanToken | K::LessThanEqualsToken | K::GreaterThanEqualsToken => {
                numeric().map(|_| ResolvedType::boolean())
            }
            K::AmpersandAmpersandToken | K::BarBarToken => {
                (l.is_boolean_like() && r.is_boolean_like()).then(ResolvedType::boolean)
            }
            K::AmpersandToken | K::BarToken | K::CaretToken => {
                if l.is_boolean_like() && r.is_boolean_like() {
                    Some(ResolvedType::boolean())
                } else {
                    match (l.unboxed(), r.unboxed()) {
                        (Some(a), Some(b)) if is_integral(a) && is_integral(b) => {
                            Some(ResolvedType::Primitive(binary_promotion(a, b)))
                        }
                        _ => None,
                    }
                }
            }
            K::EqualsEqualsToken | K::ExclamationEqualsToken => self.equality_operands(&l, &r),
            _ => Some(ResolvedType::Unknown),
        };
        match ok {
            Some(ty) => ty,
            None => self.bad_operands(node, operator),
        }
    }

    fn equality_operands(&self, l: &ResolvedType, r: &ResolvedType) -> Option<ResolvedType> {
        let comparable = if l.is_primitive() || r.is_primitive() {
            (l.is_numeric_like() && r.is_numeric_like()) || (l.is_boolean_like() && r.is_boolean_like())
        } else {
            l.is_reference()
                && r.is_reference()
                && (matches!(l, ResolvedType::Null)
                    || matches!(r, ResolvedType::Null)
                    || self.is_subtype(l, r)
                    || self.is_subtype(r, l)
                    || l.erasure().class_name().zip(r.erasure().class_name()).is_some_and(|(a, b)| {
                        self.lookup_decl(a).is_some_and(|d| d.is_interface())
                            || self.lookup_decl(b).is_some_and(|d| d.is_interface())
                    }))
        };
        comparable.then(ResolvedType::boolean)
    }

    fn conditional_type(&self, a: &ResolvedType, b: &ResolvedType) -> ResolvedType {
        if a.contains_unknown() || b.contains_unknown() {
            return ResolvedType::Unknown;
        }
        if a == b {
            return a.clone();
        }
        if a.is_boolean_like() && b.is_boolean_like() {
            return ResolvedType::boolean();
        }
        if (a.is_primitive() || b.is_primitive())
            && let (Some(x), Some(y)) = (a.unboxed(), b.unboxed())
            && crate::types::is_numeric(x)
            && crate::types::is_numeric(y)
        {
            return ResolvedType::Primitive(binary_promotion(x, y));
        }
        match (a, b) {
            (ResolvedType::Null, ResolvedType::Primitive(kind))
            | (ResolvedType::Primitive(kind), ResolvedType::Null) => boxed(*kind),
            (ResolvedType::Null, other) | (other, ResolvedType::Null) => other.clone(),
            _ => {
                let a = match a {
                    ResolvedType::Primitive(kind) => boxed(*kind),
                    other => other.clone(),
                };
                let b = match b {
                    ResolvedType::Primitive(kind) => boxed(*kind),
                    other => other.clone(),
                };
                if self.is_subtype(&a, &b) {
                    b
                } else if self.is_subtype(&b, &a) {
                    a
                } else {
                    ResolvedType::object()
                }
            }
        }
    }

    fn check_assignment(&mut self, node: NodeIndex, operator: SyntaxKind, target: NodeIndex, value: NodeIndex) -> ResolvedType {
        let target_type = self.check_expression(target);
        let value_type = self.check_expression(value);
        if operator == SyntaxKind::EqualsToken {
            self.check_assignable(value, &value_type, &target_type);
            return target_type;
        }
        if target_type.contains_unknown() || value_type.contains_unknown() {
            return target_type;
        }
        use SyntaxKind as K;
        let ok = match operator {
            K::PlusEqualsToken if target_type.is_string() => !value_type.is_void(),
            K::AmpersandEqualsToken | K::BarEqualsToken | K::CaretEqualsToken => {
                (target_type.is_boolean_like() && value_type.is_boolean_like())
                    || (target_type.is_integral_like() && value_type.is_integral_like())
            }
            K::LessThanLessThanEqualsToken
            | K::GreaterThanGreaterThanEqualsToken
            | K::GreaterThanGreaterThanGreaterThanEqualsToken => {
                target_type.is_integral_like() && value_type.is_integral_like()
            }
            _ => target_type.is_numeric_like() && value_type.is_numeric_like(),
        };
        if !ok {
            self.bad_operands(node, operator);
        }
        target_type
    }

    // =========================================================================
    // Constants
    // =========================================================================

    /// Value of an `int`-typed (or narrower) constant expression, used for
    /// implicit narrowing in assignments.
    pub(crate) fn constant_value(&self, node: NodeIndex) -> Option<i64> {
        self.constant_value_at(node, 0)
    }

    fn constant_value_at(&self, node: NodeIndex, depth: u32) -> Option<i64> {
        if depth > MAX_CONSTANT_DEPTH {
            return None;
        }
        let arena = self.arena;
        match arena.data(node)? {
            NodeData::Literal {
                kind: LiteralKind::Integer,
                text,
            } => parse_int_literal(text),
            NodeData::Literal {
                kind: LiteralKind::Character,
                text,
            } => parse_char_literal(text).map(i64::from),
            &NodeData::Parenthesized { expression } => self.constant_value_at(expression, depth + 1),
            &NodeData::PrefixUnary { operator, operand } => {
                let value = self.constant_value_at(operand, depth + 1)?;
                match operator {
                    SyntaxKind::MinusToken => Some(wrap_int(value.wrapping_neg())),
                    SyntaxKind::PlusToken => Some(value),
                    SyntaxKind::TildeToken => Some(wrap_int(!value)),
                    _ => None,
                }
            }
            &NodeData::Binary {
                operator,
                left,
                right,
            } => {
                let a = self.constant_value_at(left, depth + 1)?;
                let b = self.constant_value_at(right, depth + 1)?;
                fold_binary(operator, a, b)
            }
            &NodeData::Cast { ty, expression } => {
                let value = self.constant_value_at(expression, depth + 1)?;
                match arena.data(ty)? {
                    NodeData::PrimitiveType(kind) => narrow_constant(value, *kind),
                    _ => None,
                }
            }
            NodeData::Identifier { .. } => {
                let SymbolRef::Local { declaration, .. } = self.bindings.symbol_of(node)? else {
                    return None;
                };
                let declaration = *declaration;
                let is_final = self
                    .scopes_inner_to_outer()
                    .flat_map(|s| s.locals.values())
                    .any(|v| v.declaration == declaration && v.is_final);
                if !is_final {
                    return None;
                }
                match arena.data(declaration)? {
                    &NodeData::VariableDeclarator { initializer, .. } if initializer.is_some() => {
                        self.constant_value_at(initializer, depth + 1)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Whether `node` names a `final` field, whose constant value may narrow
    /// implicitly but is not evaluated here.
    pub(crate) fn names_final_field(&self, node: NodeIndex) -> bool {
        let Some(SymbolRef::Field { owner, index }) = self.bindings.symbol_of(node) else {
            return false;
        };
        self.lookup_decl(owner)
            .and_then(|decl| decl.fields.get(*index).map(|f| f.modifiers.contains(ModifierFlags::FINAL)))
            .unwrap_or(false)
    }
}

fn literal_type(kind: LiteralKind) -> ResolvedType {
    match kind {
        LiteralKind::Integer => ResolvedType::int(),
        LiteralKind::Long => ResolvedType::Primitive(PrimitiveKind::Long),
        LiteralKind::Float => ResolvedType::Primitive(PrimitiveKind::Float),
        LiteralKind::Double => ResolvedType::Primitive(PrimitiveKind::Double),
        LiteralKind::Character => ResolvedType::Primitive(PrimitiveKind::Char),
        LiteralKind::String => ResolvedType::string(),
        LiteralKind::Boolean => ResolvedType::boolean(),
        LiteralKind::Null => ResolvedType::Null,
    }
}

/// Java `int` overflow semantics.
fn wrap_int(value: i64) -> i64 {
    i64::from(i32::from_ne_bytes((value as u64 as u32).to_ne_bytes()))
}

fn fold_binary(operator: SyntaxKind, a: i64, b: i64) -> Option<i64> {
    use SyntaxKind as K;
    let value = match operator {
        K::PlusToken => a.wrapping_add(b),
        K::MinusToken => a.wrapping_sub(b),
        K::AsteriskToken => a.wrapping_mul(b),
        K::SlashToken => a.checked_div(b)?,
        K::PercentToken => a.checked_rem(b)?,
        K::LessThanLessThanToken => a.wrapping_shl(u32::try_from(b & 31).ok()?),
        K::GreaterThanGreaterThanToken => a.wrapping_shr(u32::try_from(b & 31).ok()?),
        K::AmpersandToken => a & b,
        K::BarToken => a | b,
        K::CaretToken => a ^ b,
        _ => return None,
    };
    Some(wrap_int(value))
}

fn narrow_constant(value: i64, kind: PrimitiveKind) -> Option<i64> {
    let bits = value as u64;
    Some(match kind {
        PrimitiveKind::Byte => i64::from(bits as u8 as i8),
        PrimitiveKind::Short => i64::from(bits as u16 as i16),
        PrimitiveKind::Char => i64::from(bits as u16),
        PrimitiveKind::Int => wrap_int(value),
        _ => return None,
    })
}

/// Value of an `int` literal. Hexadecimal, octal and binary literals may
/// denote negative values (`0xFFFFFFFF` is `-1`).
pub(crate) fn parse_int_literal(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let (radix, body) = if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        return digits.parse::<i64>().ok().filter(|&v| v <= i64::from(i32::MAX) + 1);
    };
    let value = u32::from_str_radix(body, radix).ok()?;
    Some(i64::from(i32::from_ne_bytes(value.to_ne_bytes())))
}

/// Code unit of a character literal, quotes included in `text`.
pub(crate) fn parse_char_literal(text: &str) -> Option<u16> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    if first != '\\' {
        let mut buf = [0u16; 2];
        return first.encode_utf16(&mut buf).first().copied();
    }
    let rest: String = chars.collect();
    let value = match rest.as_str() {
        "b" => 0x08,
        "t" => 0x09,
        "n" => 0x0a,
        "f" => 0x0c,
        "r" => 0x0d,
        "\"" => 0x22,
        "'" => 0x27,
        "\\" => 0x5c,
        other if other.starts_with('u') => u16::from_str_radix(other.trim_start_matches('u'), 16).ok()?,
        other => u16::from_str_radix(other, 8).ok().filter(|&v| v <= 0o377)?,
    };
    Some(value)
}
