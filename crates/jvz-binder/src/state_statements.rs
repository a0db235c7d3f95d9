//! Statements: block scoping, local variables, control flow conditions,
//! return checks and explicit constructor invocations.

use jvz_common::diagnostic_codes;
use jvz_parser::node::TypeDeclarationKind;
use jvz_parser::{ModifierFlags, NodeData, NodeIndex};
use tracing::trace;

use crate::binding::{Binding, SymbolRef, UnresolvedReason};
use crate::scope::{LocalVar, ScopeKind};
use crate::state::BinderState;
use crate::state_declarations::with_dimensions;
use crate::state_hierarchy::{FieldLookup, Subst, SuperSearch};
use crate::types::ResolvedType;

impl BinderState<'_> {
    pub(crate) fn bind_statement(&mut self, node: NodeIndex) {
        let arena = self.arena;
        let Some(data) = arena.data(node) else {
            return;
        };
        match data {
            NodeData::Block { statements } => {
                self.push_scope(ScopeKind::Block);
                for &statement in &statements.nodes {
                    self.bind_statement(statement);
                }
                self.pop_scope();
            }
            NodeData::LocalVariableDeclaration {
                modifiers,
                ty,
                declarators,
            } => {
                self.bind_annotations(&modifiers.annotations.nodes);
                let base = self.resolve_type(*ty);
                let is_final = modifiers.flags.contains(ModifierFlags::FINAL);
                for &declarator in &declarators.nodes {
                    self.bind_local_declarator(declarator, &base, is_final);
                }
            }
            NodeData::TypeDeclaration(_) => self.bind_local_class(node),
            &NodeData::ExpressionStatement { expression } => {
                self.check_expression(expression);
            }
            &NodeData::IfStatement {
                condition,
                then_statement,
                else_statement,
            } => {
                self.check_condition(condition);
                self.bind_nested(then_statement);
                self.bind_nested(else_statement);
            }
            &NodeData::WhileStatement { condition, body } => {
                self.check_condition(condition);
                self.bind_nested(body);
            }
            &NodeData::DoStatement { body, condition } => {
                self.bind_nested(body);
                self.check_condition(condition);
            }
            NodeData::ForStatement {
                initializers,
                condition,
                updates,
                body,
            } => {
                self.push_scope(ScopeKind::Block);
                for &initializer in &initializers.nodes {
                    if matches!(arena.data(initializer), Some(NodeData::LocalVariableDeclaration { .. })) {
                        self.bind_statement(initializer);
                    } else {
                        self.check_expression(initializer);
                    }
                }
                if condition.is_some() {
                    self.check_condition(*condition);
                }
                for &update in &updates.nodes {
                    self.check_expression(update);
                }
                self.bind_nested(*body);
                self.pop_scope();
            }
            &NodeData::ForEachStatement {
                variable,
                iterable,
                body,
            } => self.bind_for_each(variable, iterable, body),
            &NodeData::ReturnStatement { expression } => self.bind_return(node, expression),
            &NodeData::ThrowStatement { expression } => {
                self.check_expression(expression);
            }
            NodeData::TryStatement {
                resources,
                block,
                catches,
                finally_block,
            } => {
                self.push_scope(ScopeKind::Block);
                for &resource in &resources.nodes {
                    self.bind_statement(resource);
                }
                self.bind_statement(*block);
                self.pop_scope();
                for &catch in &catches.nodes {
                    if let Some(&NodeData::CatchClause { parameter, block }) = arena.data(catch) {
                        self.push_scope(ScopeKind::Block);
                        self.bind_parameter(parameter);
                        self.bind_statement(block);
                        self.pop_scope();
                    }
                }
                self.bind_nested(*finally_block);
            }
            NodeData::SwitchStatement { selector, cases } => {
                let selector_type = self.check_expression(*selector);
                self.push_scope(ScopeKind::Block);
                for &case in &cases.nodes {
                    let Some(NodeData::SwitchCase { label, statements }) = arena.data(case) else {
                        continue;
                    };
                    if label.is_some() {
                        self.bind_case_label(*label, &selector_type);
                    }
                    for &statement in &statements.nodes {
                        self.bind_statement(statement);
                    }
                }
                self.pop_scope();
            }
            &NodeData::SynchronizedStatement { lock, block } => {
                let lock_type = self.check_expression(lock);
                if lock_type.is_primitive() {
                    self.error_at(
                        lock,
                        diagnostic_codes::INCOMPATIBLE_TYPES,
                        &[&lock_type.display_simple(), "Object"],
                    );
                }
                self.bind_statement(block);
            }
            &NodeData::LabeledStatement { statement, .. } => self.bind_nested(statement),
            &NodeData::AssertStatement { condition, message } => {
                self.check_condition(condition);
                if message.is_some() {
                    self.check_expression(message);
                }
            }
            NodeData::ExplicitConstructorInvocation {
                is_super,
                qualifier,
                type_arguments,
                arguments,
            } => self.bind_constructor_invocation(
                node,
                *is_super,
                *qualifier,
                &type_arguments.nodes,
                &arguments.nodes,
            ),
            NodeData::BreakStatement { .. }
            | NodeData::ContinueStatement { .. }
            | NodeData::EmptyStatement
            | NodeData::Error => {}
            _ => {
                self.check_expression(node);
            }
        }
    }

    /// Bind a sub-statement that is not itself a block in its own scope, so
    /// a declaration there never leaks into the enclosing block.
    fn bind_nested(&mut self, statement: NodeIndex) {
        if statement.is_none() {
            return;
        }
        self.push_scope(ScopeKind::Block);
        self.bind_statement(statement);
        self.pop_scope();
    }

    fn bind_local_declarator(&mut self, declarator: NodeIndex, base: &ResolvedType, is_final: bool) {
        let arena = self.arena;
        let Some(&NodeData::VariableDeclarator {
            name,
            extra_dimensions,
            initializer,
        }) = arena.data(declarator)
        else {
            return;
        };
        let ty = with_dimensions(base.clone(), extra_dimensions);
        let Some(text) = arena.identifier_text(name) else {
            if initializer.is_some() {
                self.check_initializer(initializer, &ty);
            }
            return;
        };
        // The variable is in scope in its own initializer.
        self.declare_local(
            text,
            LocalVar {
                declaration: declarator,
                ty: ty.clone(),
                is_final,
            },
        );
        let binding = Binding::Symbol {
            symbol: SymbolRef::Local {
                declaration: declarator,
                name: text.to_string(),
            },
            ty: ty.clone(),
        };
        self.record(declarator, binding.clone());
        self.record(name, binding);
        if initializer.is_some() {
            self.check_initializer(initializer, &ty);
        }
    }

    /// Check a variable initializer against the declared type. Array
    /// initializers are checked element by element.
    pub(crate) fn check_initializer(&mut self, initializer: NodeIndex, target: &ResolvedType) {
        let arena = self.arena;
        if let Some(NodeData::ArrayInitializer { elements }) = arena.data(initializer) {
            let element_type = match target {
                ResolvedType::Array(element) => element.as_ref().clone(),
                ResolvedType::Unknown => ResolvedType::Unknown,
                other => {
                    self.error_at(
                        initializer,
                        diagnostic_codes::INCOMPATIBLE_TYPES,
                        &["array initializer", &other.display_simple()],
                    );
                    ResolvedType::Unknown
                }
            };
            for &element in &elements.nodes {
                self.check_initializer(element, &element_type);
            }
            self.record_type(initializer, target);
            return;
        }
        let value = self.check_expression(initializer);
        self.check_assignable(initializer, &value, target);
    }

    /// Report 4001 at `node` unless `value` converts to `target` by
    /// assignment conversion.
    pub(crate) fn check_assignable(&mut self, node: NodeIndex, value: &ResolvedType, target: &ResolvedType) {
        let constant = self.constant_value(node);
        // Final fields are not evaluated; assume their value fits.
        let assignable = self.is_assignable(value, target, constant)
            || (constant.is_none()
                && self.names_final_field(node)
                && self.is_assignable(value, target, Some(0)));
        if !assignable {
            trace!(value = %value, target = %target, "assignment mismatch");
            self.error_at(
                node,
                diagnostic_codes::INCOMPATIBLE_TYPES,
                &[&value.display_simple(), &target.display_simple()],
            );
        }
    }

    /// Check an expression used as a condition.
    pub(crate) fn check_condition(&mut self, condition: NodeIndex) {
        if condition.is_none() {
            return;
        }
        let ty = self.check_expression(condition);
        if !ty.contains_unknown() && !ty.is_boolean_like() {
            self.error_at(
                condition,
                diagnostic_codes::INCOMPATIBLE_TYPES,
                &[&ty.display_simple(), "boolean"],
            );
        }
    }

    fn bind_for_each(&mut self, variable: NodeIndex, iterable: NodeIndex, body: NodeIndex) {
        self.push_scope(ScopeKind::Block);
        let iterable_type = self.check_expression(iterable);
        let element = match &iterable_type {
            ResolvedType::Array(element) => Some(element.as_ref().clone()),
            ResolvedType::Unknown => Some(ResolvedType::Unknown),
            ty => match self.as_super(ty, "java.lang.Iterable") {
                SuperSearch::Found(ResolvedType::Class { args, .. }) => Some(
                    args.first()
                        .map_or_else(ResolvedType::object, ResolvedType::capture_upper),
                ),
                SuperSearch::Found(_) | SuperSearch::Incomplete => Some(ResolvedType::Unknown),
                SuperSearch::NotFound => None,
            },
        };
        let declared = self.bind_parameter(variable);
        match element {
            Some(element) => {
                if !self.is_assignable(&element, &declared, None) {
                    self.error_at(
                        iterable,
                        diagnostic_codes::INCOMPATIBLE_TYPES,
                        &[&element.display_simple(), &declared.display_simple()],
                    );
                }
            }
            None => self.error_at(
                iterable,
                diagnostic_codes::INCOMPATIBLE_TYPES,
                &[&iterable_type.display_simple(), "Iterable"],
            ),
        }
        self.bind_nested(body);
        self.pop_scope();
    }

    fn bind_return(&mut self, statement: NodeIndex, expression: NodeIndex) {
        let return_type = self.current_return_type();
        if expression.is_none() {
            if let Some(ty) = return_type
                && !ty.is_void()
                && !ty.is_unknown()
            {
                self.error_at(statement, diagnostic_codes::MISSING_RETURN_VALUE, &[]);
            }
            return;
        }
        let value = self.check_expression(expression);
        match return_type {
            Some(ResolvedType::Void) => {
                self.error_at(statement, diagnostic_codes::UNEXPECTED_RETURN_VALUE, &[]);
            }
            Some(target) => self.check_assignable(expression, &value, &target),
            None => {}
        }
    }

    /// Resolve a `case` label. Labels of an enum switch are unqualified
    /// constant names of the selector's enum.
    fn bind_case_label(&mut self, label: NodeIndex, selector: &ResolvedType) {
        let arena = self.arena;
        let is_enum = selector
            .class_name()
            .and_then(|name| self.lookup_decl(name))
            .is_some_and(|decl| decl.kind == TypeDeclarationKind::Enum);
        if is_enum && let Some(text) = arena.identifier_text(label) {
            match self.find_field(selector, text) {
                FieldLookup::Found { owner, index, ty, .. } => {
                    self.record(
                        label,
                        Binding::Symbol {
                            symbol: SymbolRef::Field { owner, index },
                            ty,
                        },
                    );
                }
                FieldLookup::NotFound { complete } => {
                    if complete {
                        self.error_at(label, diagnostic_codes::CANNOT_FIND_SYMBOL, &["variable", text]);
                    }
                    self.record_unresolved(label, UnresolvedReason::NotFound);
                }
            }
            return;
        }
        let label_type = self.check_expression(label);
        let constant = self.constant_value(label);
        let target = match selector.unboxed() {
            Some(kind) => ResolvedType::Primitive(kind),
            None => selector.clone(),
        };
        if !self.is_assignable(&label_type, &target, constant) {
            self.error_at(
                label,
                diagnostic_codes::INCOMPATIBLE_TYPES,
                &[&label_type.display_simple(), &target.display_simple()],
            );
        }
    }

    /// `this(...)` or `super(...)` as the first statement of a constructor.
    fn bind_constructor_invocation(
        &mut self,
        node: NodeIndex,
        is_super: bool,
        qualifier: NodeIndex,
        type_arguments: &[NodeIndex],
        arguments: &[NodeIndex],
    ) {
        if qualifier.is_some() {
            self.check_expression(qualifier);
        }
        let explicit: Vec<ResolvedType> = type_arguments.iter().map(|&t| self.resolve_type(t)).collect();
        // Arguments cannot refer to the instance under construction.
        self.push_scope(ScopeKind::Method {
            is_static: true,
            return_type: ResolvedType::Void,
        });
        let args = self.check_arguments(arguments);
        self.pop_scope();

        let Some(class) = self.current_class() else {
            return;
        };
        if class.kind == TypeDeclarationKind::Enum {
            return;
        }
        let target = if is_super {
            match &class.superclass {
                Some(superclass) => self.convert_ref(superclass, &Subst::default()),
                None => return,
            }
        } else {
            self.this_type_of(&class)
        };
        let Some(candidates) = self.constructors_of(&target, false) else {
            return;
        };
        if candidates.is_empty() {
            return;
        }
        self.select_constructor(node, node, &target, &candidates, &args, &explicit);
    }
}
