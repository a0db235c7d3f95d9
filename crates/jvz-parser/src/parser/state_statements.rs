//! Statement grammar: blocks, local declarations and control flow.

use jvz_common::diagnostics::diagnostic_codes;
use jvz_scanner::{SyntaxKind, token_is_primitive_type};

use super::base::{NodeIndex, NodeList};
use super::node::{Modifiers, NodeData};
use super::parse_rules::{
    is_start_of_expression, is_statement_sync_token, is_switch_sync_token,
};
use super::state::ParserState;

impl ParserState {
    /// `{ statements }`
    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if !self.enter_recursion() {
            if self.is_token(SyntaxKind::OpenBraceToken) {
                self.skip_balanced(SyntaxKind::OpenBraceToken, SyntaxKind::CloseBraceToken);
            }
            return self.finish_node(start, NodeData::Error);
        }
        let statements = if self.parse_expected(SyntaxKind::OpenBraceToken) {
            let statements = self.parse_block_statements(false);
            self.parse_expected(SyntaxKind::CloseBraceToken);
            statements
        } else {
            NodeList::new()
        };
        self.exit_recursion();
        self.finish_node(start, NodeData::Block { statements })
    }

    /// Statements up to `}` (or the next label inside a switch).
    fn parse_block_statements(&mut self, in_switch: bool) -> NodeList {
        let mut statements = Vec::new();
        loop {
            match self.token() {
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword if in_switch => break,
                _ => {}
            }
            let before = self.token_pos();
            statements.push(self.parse_block_statement());
            if self.token_pos() == before && !self.is_token(SyntaxKind::CloseBraceToken) {
                self.skip_token();
            }
        }
        NodeList::from(statements)
    }

    /// A statement, local variable declaration or local class.
    fn parse_block_statement(&mut self) -> NodeIndex {
        self.resume_after_boundary();
        let start = self.token_pos();
        let kind = self.token();
        // `synchronized` here starts a statement, not a declaration.
        let has_modifiers = (self.is_modifier_token() && kind != SyntaxKind::SynchronizedKeyword)
            || (kind == SyntaxKind::AtToken && self.peek_token() != SyntaxKind::InterfaceKeyword);
        if has_modifiers || self.is_start_of_type_declaration() {
            let modifiers = self.parse_modifiers();
            if self.is_start_of_type_declaration() {
                return self.parse_type_declaration(start, modifiers);
            }
            let statement = self.parse_local_variable_declaration(start, modifiers);
            self.parse_expected(SyntaxKind::SemicolonToken);
            return self.finish_node_from(start, statement);
        }
        if (kind == SyntaxKind::Identifier || token_is_primitive_type(kind))
            && self.look_ahead_is_local_variable_declaration()
        {
            let statement = self.parse_local_variable_declaration(start, Modifiers::default());
            self.parse_expected(SyntaxKind::SemicolonToken);
            return self.finish_node_from(start, statement);
        }
        self.parse_statement()
    }

    /// Extend a node to the end of the last consumed token.
    fn finish_node_from(&mut self, start: u32, node: NodeIndex) -> NodeIndex {
        let end = self.prev_token_end.max(start);
        self.arena.set_end(node, end);
        node
    }

    /// `Type a = 1, b` without the terminating `;`.
    fn parse_local_variable_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        let ty = self.parse_type();
        let declarators = self.parse_variable_declarators();
        self.finish_node(
            start,
            NodeData::LocalVariableDeclaration {
                modifiers,
                ty,
                declarators,
            },
        )
    }

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            self.skip_to_construct_end();
            self.parse_optional(SyntaxKind::SemicolonToken);
            return self.missing_node(NodeData::Error);
        }
        let statement = self.parse_statement_worker();
        self.exit_recursion();
        statement
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                self.finish_node(start, NodeData::EmptyStatement)
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(start),
            SyntaxKind::WhileKeyword => {
                self.next_token();
                let condition = self.parse_parenthesized_expression();
                let body = self.parse_statement();
                self.finish_node(start, NodeData::WhileStatement { condition, body })
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let body = self.parse_statement();
                self.parse_expected(SyntaxKind::WhileKeyword);
                let condition = self.parse_parenthesized_expression();
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(start, NodeData::DoStatement { body, condition })
            }
            SyntaxKind::ForKeyword => self.parse_for_statement(start),
            SyntaxKind::TryKeyword => self.parse_try_statement(start),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(start),
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let expression = if self.is_token(SyntaxKind::SemicolonToken) {
                    NodeIndex::NONE
                } else {
                    self.parse_expression()
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(start, NodeData::ReturnStatement { expression })
            }
            SyntaxKind::BreakKeyword | SyntaxKind::ContinueKeyword => {
                let is_break = self.is_token(SyntaxKind::BreakKeyword);
                self.next_token();
                let label = if self.is_token(SyntaxKind::Identifier) {
                    self.parse_identifier()
                } else {
                    NodeIndex::NONE
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                if is_break {
                    self.finish_node(start, NodeData::BreakStatement { label })
                } else {
                    self.finish_node(start, NodeData::ContinueStatement { label })
                }
            }
            SyntaxKind::ThrowKeyword => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(start, NodeData::ThrowStatement { expression })
            }
            SyntaxKind::SynchronizedKeyword => {
                self.next_token();
                let lock = self.parse_parenthesized_expression();
                let block = self.parse_block();
                self.finish_node(start, NodeData::SynchronizedStatement { lock, block })
            }
            SyntaxKind::AssertKeyword => {
                self.next_token();
                let condition = self.parse_expression();
                let message = if self.parse_optional(SyntaxKind::ColonToken) {
                    self.parse_expression()
                } else {
                    NodeIndex::NONE
                };
                self.parse_expected(SyntaxKind::SemicolonToken);
                self.finish_node(start, NodeData::AssertStatement { condition, message })
            }
            SyntaxKind::ElseKeyword => {
                self.parse_error_at_current_token(diagnostic_codes::ORPHANED_ELSE, &[]);
                self.skip_token();
                self.parse_statement()
            }
            SyntaxKind::CatchKeyword | SyntaxKind::FinallyKeyword => {
                let clause = if self.is_token(SyntaxKind::CatchKeyword) {
                    "catch"
                } else {
                    "finally"
                };
                self.parse_error_at_current_token(
                    diagnostic_codes::WITHOUT_ENCLOSING,
                    &[clause, "try"],
                );
                self.skip_token();
                if self.is_token(SyntaxKind::OpenParenToken) {
                    self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
                }
                if self.is_token(SyntaxKind::OpenBraceToken) {
                    self.parse_block();
                }
                self.finish_node(start, NodeData::Error)
            }
            SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword => {
                let label = if self.is_token(SyntaxKind::CaseKeyword) {
                    "case"
                } else {
                    "default"
                };
                self.parse_error_at_current_token(
                    diagnostic_codes::WITHOUT_ENCLOSING,
                    &[label, "switch"],
                );
                self.skip_token();
                while !self.is_token(SyntaxKind::ColonToken)
                    && !is_switch_sync_token(self.token())
                {
                    self.skip_token();
                }
                self.parse_optional(SyntaxKind::ColonToken);
                self.finish_node(start, NodeData::Error)
            }
            SyntaxKind::Identifier if self.peek_token() == SyntaxKind::ColonToken => {
                let label = self.parse_identifier();
                self.next_token();
                let statement = self.parse_statement();
                self.finish_node(start, NodeData::LabeledStatement { label, statement })
            }
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => {
                // Nothing to skip here: the `}` belongs to an enclosing block.
                let found = self.found_text();
                self.parse_error_at_current_token(
                    diagnostic_codes::ILLEGAL_START_OF_STATEMENT,
                    &[&found],
                );
                self.missing_node(NodeData::Error)
            }
            kind if is_start_of_expression(kind) => {
                self.parse_expression_statement(start)
            }
            _ => {
                let found = self.found_text();
                self.parse_error_at_current_token(
                    diagnostic_codes::ILLEGAL_START_OF_STATEMENT,
                    &[&found],
                );
                self.resync(is_statement_sync_token);
                self.finish_node(start, NodeData::Error)
            }
        }
    }

    fn parse_expression_statement(&mut self, start: u32) -> NodeIndex {
        // A statement resumed by recovery may be the tail of a broken one.
        let resumed = self.in_error_recovery;
        let expression = self.parse_expression();
        if !resumed && !self.is_statement_expression(expression) {
            if let Some(node) = self.arena.get(expression) {
                let (pos, len) = (node.pos, node.len());
                self.parse_error_at(pos, len, diagnostic_codes::NOT_A_STATEMENT, &[]);
            }
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(start, NodeData::ExpressionStatement { expression })
    }

    /// Expressions allowed as statements. Erroneous expressions pass so the
    /// original error is the only one reported.
    fn is_statement_expression(&self, expression: NodeIndex) -> bool {
        let Some(node) = self.arena.get(expression) else {
            return true;
        };
        if node.has_error() {
            return true;
        }
        match &node.data {
            NodeData::Assignment { .. }
            | NodeData::PostfixUnary { .. }
            | NodeData::MethodInvocation { .. }
            | NodeData::ClassInstanceCreation { .. }
            | NodeData::ExplicitConstructorInvocation { .. } => true,
            NodeData::PrefixUnary { operator, .. } => matches!(
                operator,
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
            ),
            _ => false,
        }
    }

    /// `( expression )` as used by `if`, `while`, `switch` and friends.
    fn parse_parenthesized_expression(&mut self) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        expression
    }

    fn parse_if_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        let condition = self.parse_parenthesized_expression();
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            start,
            NodeData::IfStatement {
                condition,
                then_statement,
                else_statement,
            },
        )
    }

    /// Basic `for (init; cond; update)` or enhanced `for (T x : xs)`.
    fn parse_for_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let mut initializers = Vec::new();
        if !self.is_token(SyntaxKind::SemicolonToken) {
            let init_start = self.token_pos();
            let kind = self.token();
            let is_declaration = self.is_modifier_token()
                || kind == SyntaxKind::AtToken
                || ((kind == SyntaxKind::Identifier || token_is_primitive_type(kind))
                    && self.look_ahead_is_local_variable_declaration());
            if is_declaration {
                let modifiers = self.parse_modifiers();
                let ty = self.parse_type();
                let name = self.parse_identifier();
                if self.parse_optional(SyntaxKind::ColonToken) {
                    let variable = self.finish_node(
                        init_start,
                        NodeData::Parameter {
                            modifiers,
                            ty,
                            name,
                            is_varargs: false,
                            extra_dimensions: 0,
                        },
                    );
                    let iterable = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    let body = self.parse_statement();
                    return self.finish_node(
                        start,
                        NodeData::ForEachStatement {
                            variable,
                            iterable,
                            body,
                        },
                    );
                }
                let declarators = self.parse_variable_declarators_after_name(name);
                initializers.push(self.finish_node(
                    init_start,
                    NodeData::LocalVariableDeclaration {
                        modifiers,
                        ty,
                        declarators,
                    },
                ));
            } else {
                initializers = self.parse_statement_expression_list();
            }
        }
        self.parse_expected(SyntaxKind::SemicolonToken);

        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);

        let updates = if self.is_token(SyntaxKind::CloseParenToken) {
            Vec::new()
        } else {
            self.parse_statement_expression_list()
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_statement();
        self.finish_node(
            start,
            NodeData::ForStatement {
                initializers: NodeList::from(initializers),
                condition,
                updates: NodeList::from(updates),
                body,
            },
        )
    }

    fn parse_statement_expression_list(&mut self) -> Vec<NodeIndex> {
        let mut expressions = Vec::new();
        loop {
            let start = self.token_pos();
            let expression = self.parse_expression();
            if !self.is_statement_expression(expression) {
                let len = self.prev_token_end.saturating_sub(start);
                self.parse_error_at(start, len, diagnostic_codes::NOT_A_STATEMENT, &[]);
            }
            expressions.push(expression);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        expressions
    }

    /// `try [(resources)] block catch* [finally block]`
    fn parse_try_statement(&mut self, start: u32) -> NodeIndex {
        let try_end = self.token_end();
        self.next_token();

        let mut resources = Vec::new();
        if self.parse_optional(SyntaxKind::OpenParenToken) {
            while !self.is_token(SyntaxKind::CloseParenToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let resource_start = self.token_pos();
                let modifiers = self.parse_modifiers();
                resources.push(self.parse_local_variable_declaration(resource_start, modifiers));
                if !self.parse_optional(SyntaxKind::SemicolonToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
        }

        let block = self.parse_block();

        let mut catches = Vec::new();
        while self.is_token(SyntaxKind::CatchKeyword) {
            catches.push(self.parse_catch_clause());
        }
        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };

        if resources.is_empty() && catches.is_empty() && finally_block.is_none() {
            self.parse_error_at(
                start,
                try_end - start,
                diagnostic_codes::TRY_WITHOUT_CATCH_OR_FINALLY,
                &[],
            );
        }

        self.finish_node(
            start,
            NodeData::TryStatement {
                resources: NodeList::from(resources),
                block,
                catches: NodeList::from(catches),
                finally_block,
            },
        )
    }

    /// `catch (final A | B e) { ... }`
    fn parse_catch_clause(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        let parameter_start = self.token_pos();
        let modifiers = self.parse_modifiers();
        let type_start = self.token_pos();
        let first = self.parse_type();
        let ty = if self.is_token(SyntaxKind::BarToken) {
            let mut types = vec![first];
            while self.parse_optional(SyntaxKind::BarToken) {
                types.push(self.parse_type());
            }
            self.finish_node(
                type_start,
                NodeData::UnionType {
                    types: NodeList::from(types),
                },
            )
        } else {
            first
        };
        let name = self.parse_identifier();
        let parameter = self.finish_node(
            parameter_start,
            NodeData::Parameter {
                modifiers,
                ty,
                name,
                is_varargs: false,
                extra_dimensions: 0,
            },
        );
        self.parse_expected(SyntaxKind::CloseParenToken);

        let block = self.parse_block();
        self.finish_node(start, NodeData::CatchClause { parameter, block })
    }

    /// `switch (selector) { case X: ... default: ... }`
    fn parse_switch_statement(&mut self, start: u32) -> NodeIndex {
        self.next_token();
        let selector = self.parse_parenthesized_expression();
        let mut cases = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let case_start = self.token_pos();
                let label = match self.token() {
                    SyntaxKind::CaseKeyword => {
                        self.next_token();
                        self.parse_conditional_expression()
                    }
                    SyntaxKind::DefaultKeyword => {
                        self.next_token();
                        NodeIndex::NONE
                    }
                    _ => {
                        let found = self.found_text();
                        self.parse_error_at_current_token(
                            diagnostic_codes::TOKEN_EXPECTED,
                            &["case", &found],
                        );
                        self.resync(is_switch_sync_token);
                        continue;
                    }
                };
                self.parse_expected(SyntaxKind::ColonToken);
                let statements = self.parse_block_statements(true);
                cases.push(self.finish_node(case_start, NodeData::SwitchCase { label, statements }));
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.finish_node(
            start,
            NodeData::SwitchStatement {
                selector,
                cases: NodeList::from(cases),
            },
        )
    }
}
