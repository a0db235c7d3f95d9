//! Expression grammar.
//!
//! Precedence climbing over `binary_operator_precedence`, with assignment
//! and the conditional operator handled above it and unary, cast, postfix
//! and primary forms below it. Lambdas and method references are recognized
//! only to report them and skip their extent.

use jvz_common::diagnostics::diagnostic_codes;
use jvz_scanner::{SyntaxKind, token_is_assignment_operator, token_is_primitive_type};

use super::base::{NodeIndex, NodeList};
use super::node::{LiteralKind, NodeData};
use super::parse_rules::{
    binary_operator_precedence, can_follow_reference_cast, is_start_of_expression,
};
use super::state::ParserState;

impl ParserState {
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            self.skip_to_construct_end();
            return self.missing_node(NodeData::Error);
        }
        let expr = self.parse_assignment_expression();
        self.exit_recursion();
        expr
    }

    fn parse_assignment_expression(&mut self) -> NodeIndex {
        if self.look_ahead_is_lambda() {
            return self.parse_unsupported_lambda();
        }
        let start = self.token_pos();
        let target = self.parse_conditional_expression();
        let operator = self.re_scan_greater_token();
        if !token_is_assignment_operator(operator) {
            return target;
        }
        self.next_token();
        let value = self.parse_expression();
        self.finish_node(
            start,
            NodeData::Assignment {
                operator,
                target,
                value,
            },
        )
    }

    /// `a ? b : c` and everything that binds tighter.
    pub(crate) fn parse_conditional_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let condition = self.parse_binary_expression(0);
        if !self.is_token(SyntaxKind::QuestionToken) {
            return condition;
        }
        self.next_token();
        let when_true = self.parse_expression();
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = if self.look_ahead_is_lambda() {
            self.parse_unsupported_lambda()
        } else {
            self.parse_conditional_expression()
        };
        self.finish_node(
            start,
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            },
        )
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_pos();
        let mut left = self.parse_unary_expression();
        loop {
            let operator = self.re_scan_greater_token();
            let precedence = binary_operator_precedence(operator);
            if precedence <= min_precedence {
                break;
            }
            self.next_token();
            if operator == SyntaxKind::InstanceOfKeyword {
                let ty = self.parse_type();
                left = self.finish_node(start, NodeData::InstanceOf { expression: left, ty });
                continue;
            }
            let right = self.parse_binary_expression(precedence);
            left = self.finish_node(
                start,
                NodeData::Binary {
                    operator,
                    left,
                    right,
                },
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            self.skip_to_construct_end();
            return self.missing_node(NodeData::Error);
        }
        let expr = self.parse_unary_expression_worker();
        self.exit_recursion();
        expr
    }

    fn parse_unary_expression_worker(&mut self) -> NodeIndex {
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken => {
                let operator = self.token();
                self.next_token();
                if operator == SyntaxKind::MinusToken
                    && matches!(
                        self.token(),
                        SyntaxKind::IntegerLiteral | SyntaxKind::LongLiteral
                    )
                {
                    self.negated_literal_pos = Some(self.token_pos());
                }
                let operand = self.parse_unary_expression();
                self.finish_node(start, NodeData::PrefixUnary { operator, operand })
            }
            SyntaxKind::OpenParenToken if self.look_ahead_is_cast() => {
                self.next_token();
                let ty = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                let expression = self.parse_unary_expression();
                self.finish_node(start, NodeData::Cast { ty, expression })
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// `(Type) operand` ahead. A primitive cast may be followed by any
    /// expression; a reference cast only by tokens that cannot continue a
    /// parenthesized expression as a binary operand.
    fn look_ahead_is_cast(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            let primitive = token_is_primitive_type(p.token());
            if !p.skip_type_lookahead() || !p.is_token(SyntaxKind::CloseParenToken) {
                return false;
            }
            p.next_token();
            if primitive {
                is_start_of_expression(p.token())
            } else {
                can_follow_reference_cast(p.token())
            }
        })
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut expr = self.parse_primary_expression();
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    expr = self.parse_dot_selector(start, expr);
                }
                SyntaxKind::OpenBracketToken => {
                    if self.peek_token() == SyntaxKind::CloseBracketToken {
                        // `String[].class`
                        let ty = self.parse_array_dimensions(start, expr);
                        return self.parse_class_literal_rest(start, ty);
                    }
                    self.next_token();
                    let index = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expr = self.finish_node(start, NodeData::ArrayAccess { array: expr, index });
                }
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                    let operator = self.token();
                    self.next_token();
                    expr = self.finish_node(
                        start,
                        NodeData::PostfixUnary {
                            operator,
                            operand: expr,
                        },
                    );
                }
                SyntaxKind::ColonColonToken => {
                    expr = self.parse_unsupported_method_reference(start);
                }
                _ => return expr,
            }
        }
    }

    /// Selector after `.`: field, method call, `class`, `this`, `super` or
    /// inner class creation.
    fn parse_dot_selector(&mut self, start: u32, expr: NodeIndex) -> NodeIndex {
        self.next_token();
        match self.token() {
            SyntaxKind::LessThanToken => {
                let type_arguments = self.parse_type_arguments(false);
                let name = self.parse_identifier();
                let arguments = self.parse_arguments();
                self.finish_node(
                    start,
                    NodeData::MethodInvocation {
                        expression: expr,
                        type_arguments,
                        name,
                        arguments,
                    },
                )
            }
            SyntaxKind::ClassKeyword => {
                self.next_token();
                self.finish_node(start, NodeData::ClassLiteral { ty: expr })
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                self.finish_node(start, NodeData::ThisExpression { qualifier: expr })
            }
            SyntaxKind::SuperKeyword => {
                self.next_token();
                if self.is_token(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    return self.finish_node(
                        start,
                        NodeData::ExplicitConstructorInvocation {
                            is_super: true,
                            qualifier: expr,
                            type_arguments: NodeList::new(),
                            arguments,
                        },
                    );
                }
                self.finish_node(start, NodeData::SuperExpression { qualifier: expr })
            }
            SyntaxKind::NewKeyword => self.parse_creation_expression(start, expr),
            _ => {
                let name = self.parse_identifier();
                if self.is_token(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    return self.finish_node(
                        start,
                        NodeData::MethodInvocation {
                            expression: expr,
                            type_arguments: NodeList::new(),
                            name,
                            arguments,
                        },
                    );
                }
                self.finish_node(
                    start,
                    NodeData::FieldAccess {
                        expression: expr,
                        name,
                    },
                )
            }
        }
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let literal_kind = match self.token() {
            SyntaxKind::IntegerLiteral => Some(LiteralKind::Integer),
            SyntaxKind::LongLiteral => Some(LiteralKind::Long),
            SyntaxKind::FloatLiteral => Some(LiteralKind::Float),
            SyntaxKind::DoubleLiteral => Some(LiteralKind::Double),
            SyntaxKind::CharacterLiteral => Some(LiteralKind::Character),
            SyntaxKind::StringLiteral => Some(LiteralKind::String),
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => Some(LiteralKind::Boolean),
            SyntaxKind::NullKeyword => Some(LiteralKind::Null),
            _ => None,
        };
        if let Some(kind) = literal_kind {
            let text = self.token_text().to_string();
            if is_min_value_magnitude(&text) && self.negated_literal_pos != Some(start) {
                self.parse_error_at_current_token(diagnostic_codes::INTEGER_TOO_LARGE, &[&text]);
            }
            self.next_token();
            return self.finish_node(start, NodeData::Literal { kind, text });
        }

        match self.token() {
            SyntaxKind::Identifier => {
                let name = self.parse_identifier();
                if !self.is_token(SyntaxKind::OpenParenToken) {
                    return name;
                }
                let arguments = self.parse_arguments();
                self.finish_node(
                    start,
                    NodeData::MethodInvocation {
                        expression: NodeIndex::NONE,
                        type_arguments: NodeList::new(),
                        name,
                        arguments,
                    },
                )
            }
            SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword => {
                let is_super = self.is_token(SyntaxKind::SuperKeyword);
                self.next_token();
                if self.is_token(SyntaxKind::OpenParenToken) {
                    let arguments = self.parse_arguments();
                    return self.finish_node(
                        start,
                        NodeData::ExplicitConstructorInvocation {
                            is_super,
                            qualifier: NodeIndex::NONE,
                            type_arguments: NodeList::new(),
                            arguments,
                        },
                    );
                }
                let qualifier = NodeIndex::NONE;
                if is_super {
                    self.finish_node(start, NodeData::SuperExpression { qualifier })
                } else {
                    self.finish_node(start, NodeData::ThisExpression { qualifier })
                }
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.finish_node(start, NodeData::Parenthesized { expression })
            }
            SyntaxKind::NewKeyword => self.parse_creation_expression(start, NodeIndex::NONE),
            kind if kind == SyntaxKind::VoidKeyword || token_is_primitive_type(kind) => {
                // `int.class`, `int[].class`, `void.class`
                let ty = if kind == SyntaxKind::VoidKeyword {
                    self.parse_return_type()
                } else {
                    self.parse_type()
                };
                self.parse_class_literal_rest(start, ty)
            }
            _ => {
                let found = self.found_text();
                self.parse_error_at_current_token(
                    diagnostic_codes::ILLEGAL_START_OF_EXPRESSION,
                    &[&found],
                );
                self.missing_node(NodeData::Error)
            }
        }
    }

    fn parse_class_literal_rest(&mut self, start: u32, ty: NodeIndex) -> NodeIndex {
        self.parse_expected(SyntaxKind::DotToken);
        self.parse_expected(SyntaxKind::ClassKeyword);
        self.finish_node(start, NodeData::ClassLiteral { ty })
    }

    /// `new T(args) [body]`, `outer.new Inner(args)` or an array creation.
    fn parse_creation_expression(&mut self, start: u32, outer: NodeIndex) -> NodeIndex {
        self.parse_expected(SyntaxKind::NewKeyword);
        if self.is_token(SyntaxKind::LessThanToken) {
            // Constructor type arguments do not take part in binding.
            self.parse_type_arguments(false);
        }
        let ty = self.parse_non_array_type(true);
        if self.is_token(SyntaxKind::OpenBracketToken) {
            return self.parse_array_creation_rest(start, ty);
        }
        let arguments = self.parse_arguments();
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            Some(self.parse_class_body())
        } else {
            None
        };
        self.finish_node(
            start,
            NodeData::ClassInstanceCreation {
                outer,
                ty,
                arguments,
                body,
            },
        )
    }

    /// `[n][m][]` or `[][] { ... }` after the element type.
    fn parse_array_creation_rest(&mut self, start: u32, element_type: NodeIndex) -> NodeIndex {
        let mut dimensions = Vec::new();
        let mut extra_dimensions = 0u32;
        while self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                extra_dimensions += 1;
                continue;
            }
            if extra_dimensions > 0 {
                let found = self.found_text();
                self.parse_error_at_current_token(diagnostic_codes::TOKEN_EXPECTED, &["]", &found]);
            }
            dimensions.push(self.parse_expression());
            self.parse_expected(SyntaxKind::CloseBracketToken);
        }
        let initializer = if dimensions.is_empty() {
            if self.is_token(SyntaxKind::OpenBraceToken) {
                self.parse_array_initializer()
            } else {
                let found = self.found_text();
                self.parse_error_at_current_token(diagnostic_codes::TOKEN_EXPECTED, &["{", &found]);
                NodeIndex::NONE
            }
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            start,
            NodeData::ArrayCreation {
                element_type,
                dimensions: NodeList::from(dimensions),
                extra_dimensions,
                initializer,
            },
        )
    }

    /// `{ a, { b }, }`
    pub(crate) fn parse_array_initializer(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            elements.push(self.parse_variable_initializer());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(
            start,
            NodeData::ArrayInitializer {
                elements: NodeList::from(elements),
            },
        )
    }

    /// `(a, b, c)`
    pub(crate) fn parse_arguments(&mut self) -> NodeList {
        let mut arguments = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::from(arguments);
        }
        if !self.is_token(SyntaxKind::CloseParenToken) {
            loop {
                arguments.push(self.parse_expression());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from(arguments)
    }

    // =========================================================================
    // Syntax above the supported source level
    // =========================================================================

    /// `x -> ...` or `(a, b) -> ...` ahead.
    fn look_ahead_is_lambda(&mut self) -> bool {
        match self.token() {
            SyntaxKind::Identifier => self.peek_token() == SyntaxKind::MinusGreaterThanToken,
            SyntaxKind::OpenParenToken => self.look_ahead(|p| {
                p.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
                p.is_token(SyntaxKind::MinusGreaterThanToken)
            }),
            _ => false,
        }
    }

    fn parse_unsupported_lambda(&mut self) -> NodeIndex {
        let start = self.token_pos();
        if self.is_token(SyntaxKind::Identifier) {
            self.skip_token();
        } else {
            self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
        }
        self.parse_error_at_current_token(
            diagnostic_codes::NOT_SUPPORTED_AT_SOURCE_LEVEL,
            &["lambda expression"],
        );
        self.skip_token();
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block();
        } else {
            self.parse_expression();
        }
        self.finish_node(start, NodeData::Error)
    }

    fn parse_unsupported_method_reference(&mut self, start: u32) -> NodeIndex {
        self.parse_error_at_current_token(
            diagnostic_codes::NOT_SUPPORTED_AT_SOURCE_LEVEL,
            &["method reference"],
        );
        self.skip_token();
        if self.is_token(SyntaxKind::Identifier) || self.is_token(SyntaxKind::NewKeyword) {
            self.skip_token();
        }
        self.finish_node(start, NodeData::Error)
    }

    /// Skip from `open` through its matching `close`.
    pub(crate) fn skip_balanced(&mut self, open: SyntaxKind, close: SyntaxKind) {
        let mut depth = 0u32;
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            let kind = self.token();
            self.skip_token();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return;
                }
            }
        }
    }
}

/// `2147483648` and `9223372036854775808L`: legal only after unary minus.
fn is_min_value_magnitude(text: &str) -> bool {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    digits == "2147483648" || digits.eq_ignore_ascii_case("9223372036854775808l")
}
