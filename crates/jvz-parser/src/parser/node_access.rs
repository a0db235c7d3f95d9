//! NodeArena read access: typed getters, child enumeration and tree walks.

use super::base::{NodeIndex, NodeList};
use super::node::{
    CompilationUnit, MethodDeclaration, Modifiers, Node, NodeArena, NodeData, TypeDeclaration,
};

impl NodeArena {
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&NodeData> {
        self.get(index).map(|n| &n.data)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node indices in allocation order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }

    pub fn get_compilation_unit(&self, index: NodeIndex) -> Option<&CompilationUnit> {
        match self.data(index)? {
            NodeData::CompilationUnit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn get_type_declaration(&self, index: NodeIndex) -> Option<&TypeDeclaration> {
        match self.data(index)? {
            NodeData::TypeDeclaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn get_method_declaration(&self, index: NodeIndex) -> Option<&MethodDeclaration> {
        match self.data(index)? {
            NodeData::MethodDeclaration(method) => Some(method),
            _ => None,
        }
    }

    /// Text of an `Identifier` node.
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        match self.data(index)? {
            NodeData::Identifier { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Dotted text of an `Identifier`, `QualifiedName` or `FieldAccess`
    /// chain of identifiers (`java.util.List`).
    pub fn dotted_name(&self, index: NodeIndex) -> Option<String> {
        match self.data(index)? {
            NodeData::Identifier { text } => Some(text.clone()),
            NodeData::QualifiedName { qualifier, name }
            | NodeData::FieldAccess {
                expression: qualifier,
                name,
            } => {
                let mut prefix = self.dotted_name(*qualifier)?;
                prefix.push('.');
                prefix.push_str(self.identifier_text(*name)?);
                Some(prefix)
            }
            _ => None,
        }
    }

    /// Children of a node in source order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let Some(data) = self.data(index) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let push = |out: &mut Vec<NodeIndex>, idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        let push_list = |out: &mut Vec<NodeIndex>, list: &NodeList| {
            out.extend(list.iter().filter(|n| n.is_some()));
        };
        let push_modifiers = |out: &mut Vec<NodeIndex>, modifiers: &Modifiers| {
            out.extend(modifiers.annotations.iter());
        };

        match data {
            NodeData::CompilationUnit(unit) => {
                push(&mut out, unit.package);
                push_list(&mut out, &unit.imports);
                push_list(&mut out, &unit.types);
            }
            NodeData::PackageDeclaration { annotations, name } => {
                push_list(&mut out, annotations);
                push(&mut out, *name);
            }
            NodeData::ImportDeclaration { name, .. } => push(&mut out, *name),
            NodeData::TypeDeclaration(decl) => {
                push_modifiers(&mut out, &decl.modifiers);
                push(&mut out, decl.name);
                push_list(&mut out, &decl.type_parameters);
                push_list(&mut out, &decl.extends);
                push_list(&mut out, &decl.implements);
                push_list(&mut out, &decl.enum_constants);
                push_list(&mut out, &decl.members);
            }
            NodeData::EnumConstant {
                annotations,
                name,
                arguments,
                body,
            } => {
                push_list(&mut out, annotations);
                push(&mut out, *name);
                if let Some(args) = arguments {
                    push_list(&mut out, args);
                }
                if let Some(body) = body {
                    push_list(&mut out, body);
                }
            }
            NodeData::FieldDeclaration {
                modifiers,
                ty,
                declarators,
            }
            | NodeData::LocalVariableDeclaration {
                modifiers,
                ty,
                declarators,
            } => {
                push_modifiers(&mut out, modifiers);
                push(&mut out, *ty);
                push_list(&mut out, declarators);
            }
            NodeData::VariableDeclarator {
                name, initializer, ..
            } => {
                push(&mut out, *name);
                push(&mut out, *initializer);
            }
            NodeData::MethodDeclaration(method) => {
                push_modifiers(&mut out, &method.modifiers);
                push_list(&mut out, &method.type_parameters);
                push(&mut out, method.return_type);
                push(&mut out, method.name);
                push_list(&mut out, &method.parameters);
                push_list(&mut out, &method.throws);
                push(&mut out, method.body);
                push(&mut out, method.default_value);
            }
            NodeData::Parameter {
                modifiers, ty, name, ..
            } => {
                push_modifiers(&mut out, modifiers);
                push(&mut out, *ty);
                push(&mut out, *name);
            }
            NodeData::Initializer { body, .. } => push(&mut out, *body),
            NodeData::TypeParameter { name, bounds } => {
                push(&mut out, *name);
                push_list(&mut out, bounds);
            }
            NodeData::Annotation { name, arguments } => {
                push(&mut out, *name);
                push_list(&mut out, arguments);
            }
            NodeData::ElementValuePair { name, value } => {
                push(&mut out, *name);
                push(&mut out, *value);
            }
            NodeData::ElementValueArrayInitializer { values } => push_list(&mut out, values),
            NodeData::Identifier { .. }
            | NodeData::PrimitiveType(_)
            | NodeData::VoidType
            | NodeData::EmptyStatement
            | NodeData::Literal { .. }
            | NodeData::Error => {}
            NodeData::QualifiedName { qualifier, name } => {
                push(&mut out, *qualifier);
                push(&mut out, *name);
            }
            NodeData::ClassType {
                qualifier,
                name,
                type_arguments,
            } => {
                push(&mut out, *qualifier);
                push(&mut out, *name);
                if let Some(args) = type_arguments {
                    push_list(&mut out, args);
                }
            }
            NodeData::ArrayType { element } => push(&mut out, *element),
            NodeData::WildcardType { bound, .. } => push(&mut out, *bound),
            NodeData::UnionType { types } => push_list(&mut out, types),
            NodeData::Block { statements } => push_list(&mut out, statements),
            NodeData::ExpressionStatement { expression }
            | NodeData::ReturnStatement { expression }
            | NodeData::ThrowStatement { expression }
            | NodeData::Parenthesized { expression } => push(&mut out, *expression),
            NodeData::IfStatement {
                condition,
                then_statement,
                else_statement,
            } => {
                push(&mut out, *condition);
                push(&mut out, *then_statement);
                push(&mut out, *else_statement);
            }
            NodeData::WhileStatement { condition, body } => {
                push(&mut out, *condition);
                push(&mut out, *body);
            }
            NodeData::DoStatement { body, condition } => {
                push(&mut out, *body);
                push(&mut out, *condition);
            }
            NodeData::ForStatement {
                initializers,
                condition,
                updates,
                body,
            } => {
                push_list(&mut out, initializers);
                push(&mut out, *condition);
                push_list(&mut out, updates);
                push(&mut out, *body);
            }
            NodeData::ForEachStatement {
                variable,
                iterable,
                body,
            } => {
                push(&mut out, *variable);
                push(&mut out, *iterable);
                push(&mut out, *body);
            }
            NodeData::BreakStatement { label } | NodeData::ContinueStatement { label } => {
                push(&mut out, *label);
            }
            NodeData::TryStatement {
                resources,
                block,
                catches,
                finally_block,
            } => {
                push_list(&mut out, resources);
                push(&mut out, *block);
                push_list(&mut out, catches);
                push(&mut out, *finally_block);
            }
            NodeData::CatchClause { parameter, block } => {
                push(&mut out, *parameter);
                push(&mut out, *block);
            }
            NodeData::SwitchStatement { selector, cases } => {
                push(&mut out, *selector);
                push_list(&mut out, cases);
            }
            NodeData::SwitchCase { label, statements } => {
                push(&mut out, *label);
                push_list(&mut out, statements);
            }
            NodeData::SynchronizedStatement { lock, block } => {
                push(&mut out, *lock);
                push(&mut out, *block);
            }
            NodeData::LabeledStatement { label, statement } => {
                push(&mut out, *label);
                push(&mut out, *statement);
            }
            NodeData::AssertStatement { condition, message } => {
                push(&mut out, *condition);
                push(&mut out, *message);
            }
            NodeData::ExplicitConstructorInvocation {
                qualifier,
                type_arguments,
                arguments,
                ..
            } => {
                push(&mut out, *qualifier);
                push_list(&mut out, type_arguments);
                push_list(&mut out, arguments);
            }
            NodeData::ThisExpression { qualifier } | NodeData::SuperExpression { qualifier } => {
                push(&mut out, *qualifier);
            }
            NodeData::FieldAccess { expression, name } => {
                push(&mut out, *expression);
                push(&mut out, *name);
            }
            NodeData::MethodInvocation {
                expression,
                type_arguments,
                name,
                arguments,
            } => {
                push(&mut out, *expression);
                push_list(&mut out, type_arguments);
                push(&mut out, *name);
                push_list(&mut out, arguments);
            }
            NodeData::ClassInstanceCreation {
                outer,
                ty,
                arguments,
                body,
            } => {
                push(&mut out, *outer);
                push(&mut out, *ty);
                push_list(&mut out, arguments);
                if let Some(body) = body {
                    push_list(&mut out, body);
                }
            }
            NodeData::ArrayCreation {
                element_type,
                dimensions,
                initializer,
                ..
            } => {
                push(&mut out, *element_type);
                push_list(&mut out, dimensions);
                push(&mut out, *initializer);
            }
            NodeData::ArrayInitializer { elements } => push_list(&mut out, elements),
            NodeData::ArrayAccess { array, index } => {
                push(&mut out, *array);
                push(&mut out, *index);
            }
            NodeData::PrefixUnary { operand, .. } | NodeData::PostfixUnary { operand, .. } => {
                push(&mut out, *operand);
            }
            NodeData::Binary { left, right, .. } => {
                push(&mut out, *left);
                push(&mut out, *right);
            }
            NodeData::InstanceOf { expression, ty } => {
                push(&mut out, *expression);
                push(&mut out, *ty);
            }
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                push(&mut out, *condition);
                push(&mut out, *when_true);
                push(&mut out, *when_false);
            }
            NodeData::Assignment { target, value, .. } => {
                push(&mut out, *target);
                push(&mut out, *value);
            }
            NodeData::Cast { ty, expression } => {
                push(&mut out, *ty);
                push(&mut out, *expression);
            }
            NodeData::ClassLiteral { ty } => push(&mut out, *ty),
        }
        out
    }

    /// Whether any node in the subtree rooted at `index` carries an error.
    pub fn contains_error(&self, index: NodeIndex) -> bool {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if node.has_error() {
                return true;
            }
            stack.extend(self.children(current));
        }
        false
    }

    /// Pre-order traversal of the subtree rooted at `index`.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if self.get(current).is_none() {
                continue;
            }
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}
