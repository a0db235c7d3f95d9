//! Type grammar: primitive, class, array and wildcard types, type arguments
//! and type parameters, plus token-only lookahead over types.

use jvz_common::diagnostics::diagnostic_codes;
use jvz_scanner::{SyntaxKind, token_is_primitive_type};

use super::base::{NodeIndex, NodeList};
use super::node::{NodeData, PrimitiveKind, WildcardBound};
use super::state::ParserState;

impl ParserState {
    /// Type with optional array dimensions: `int`, `List<String>[]`.
    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let element = self.parse_non_array_type(false);
        self.parse_array_dimensions(start, element)
    }

    /// Return type of a method: a type or `void`.
    pub(crate) fn parse_return_type(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::VoidKeyword) {
            let start = self.token_pos();
            self.next_token();
            return self.finish_node(start, NodeData::VoidType);
        }
        self.parse_type()
    }

    pub(crate) fn parse_non_array_type(&mut self, allow_diamond: bool) -> NodeIndex {
        if let Some(kind) = PrimitiveKind::from_token(self.token()) {
            let start = self.token_pos();
            self.next_token();
            return self.finish_node(start, NodeData::PrimitiveType(kind));
        }
        if self.is_token(SyntaxKind::Identifier) {
            return self.parse_class_type(allow_diamond);
        }
        let found = self.found_text();
        self.parse_error_at_current_token(diagnostic_codes::ILLEGAL_START_OF_TYPE, &[&found]);
        self.missing_node(NodeData::Error)
    }

    /// `a.b.C<T>.D`. Package segments are not distinguished from enclosing
    /// types here; the binder decides which prefix names a package.
    pub(crate) fn parse_class_type(&mut self, allow_diamond: bool) -> NodeIndex {
        let start = self.token_pos();
        let mut qualifier = NodeIndex::NONE;
        loop {
            let name = self.parse_identifier();
            let type_arguments = if self.is_token(SyntaxKind::LessThanToken) {
                Some(self.parse_type_arguments(allow_diamond))
            } else {
                None
            };
            let ty = self.finish_node(
                start,
                NodeData::ClassType {
                    qualifier,
                    name,
                    type_arguments,
                },
            );
            if self.is_token(SyntaxKind::DotToken)
                && self.peek_token() == SyntaxKind::Identifier
            {
                self.next_token();
                qualifier = ty;
                continue;
            }
            return ty;
        }
    }

    /// Wrap `element` in one `ArrayType` per `[]` pair.
    pub(crate) fn parse_array_dimensions(&mut self, start: u32, element: NodeIndex) -> NodeIndex {
        let mut ty = element;
        while self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek_token() == SyntaxKind::CloseBracketToken
        {
            self.next_token();
            self.next_token();
            ty = self.finish_node(start, NodeData::ArrayType { element: ty });
        }
        ty
    }

    /// Count `[]` pairs written after a declarator name (`int x[]`).
    pub(crate) fn parse_extra_dimensions(&mut self) -> u32 {
        let mut count = 0;
        while self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek_token() == SyntaxKind::CloseBracketToken
        {
            self.next_token();
            self.next_token();
            count += 1;
        }
        count
    }

    /// `<A, ? extends B>`; with `allow_diamond`, `<>` yields an empty list.
    pub(crate) fn parse_type_arguments(&mut self, allow_diamond: bool) -> NodeList {
        let mut arguments = Vec::new();
        self.parse_expected(SyntaxKind::LessThanToken);
        if self.is_token(SyntaxKind::GreaterThanToken) {
            if !allow_diamond {
                let found = self.found_text();
                self.parse_error_at_current_token(
                    diagnostic_codes::ILLEGAL_START_OF_TYPE,
                    &[&found],
                );
            }
            self.next_token();
            return NodeList::from(arguments);
        }
        loop {
            arguments.push(self.parse_type_argument());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        NodeList::from(arguments)
    }

    fn parse_type_argument(&mut self) -> NodeIndex {
        if !self.is_token(SyntaxKind::QuestionToken) {
            return self.parse_type();
        }
        let start = self.token_pos();
        self.next_token();
        let (bound_kind, bound) = match self.token() {
            SyntaxKind::ExtendsKeyword => {
                self.next_token();
                (WildcardBound::Extends, self.parse_type())
            }
            SyntaxKind::SuperKeyword => {
                self.next_token();
                (WildcardBound::Super, self.parse_type())
            }
            _ => (WildcardBound::None, NodeIndex::NONE),
        };
        self.finish_node(start, NodeData::WildcardType { bound_kind, bound })
    }

    /// `<T extends A & B, U>`
    pub(crate) fn parse_type_parameters(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.is_token(SyntaxKind::LessThanToken) {
            return NodeList::from(parameters);
        }
        self.next_token();
        loop {
            let start = self.token_pos();
            let name = self.parse_identifier();
            let mut bounds = Vec::new();
            if self.parse_optional(SyntaxKind::ExtendsKeyword) {
                bounds.push(self.parse_type());
                while self.parse_optional(SyntaxKind::AmpersandToken) {
                    bounds.push(self.parse_type());
                }
            }
            parameters.push(self.finish_node(
                start,
                NodeData::TypeParameter {
                    name,
                    bounds: NodeList::from(bounds),
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        NodeList::from(parameters)
    }

    /// Comma-separated class types (`implements A, B`, `throws X, Y`).
    pub(crate) fn parse_class_type_list(&mut self) -> NodeList {
        let mut types = vec![self.parse_type()];
        while self.parse_optional(SyntaxKind::CommaToken) {
            types.push(self.parse_type());
        }
        NodeList::from(types)
    }

    // =========================================================================
    // Token-only lookahead
    // =========================================================================

    /// Consume the tokens of a type without building nodes. Used inside
    /// `look_ahead` to decide between declarations and expressions.
    pub(crate) fn skip_type_lookahead(&mut self) -> bool {
        if token_is_primitive_type(self.token()) {
            self.next_token();
        } else if self.is_token(SyntaxKind::Identifier) {
            self.next_token();
            loop {
                if self.is_token(SyntaxKind::LessThanToken) && !self.skip_type_arguments_lookahead()
                {
                    return false;
                }
                if self.is_token(SyntaxKind::DotToken) {
                    if self.next_token() != SyntaxKind::Identifier {
                        return false;
                    }
                    self.next_token();
                    continue;
                }
                break;
            }
        } else {
            return false;
        }
        while self.is_token(SyntaxKind::OpenBracketToken) {
            if self.next_token() != SyntaxKind::CloseBracketToken {
                return false;
            }
            self.next_token();
        }
        true
    }

    fn skip_type_arguments_lookahead(&mut self) -> bool {
        self.next_token();
        if self.is_token(SyntaxKind::GreaterThanToken) {
            self.next_token();
            return true;
        }
        loop {
            if self.is_token(SyntaxKind::QuestionToken) {
                self.next_token();
                if matches!(
                    self.token(),
                    SyntaxKind::ExtendsKeyword | SyntaxKind::SuperKeyword
                ) {
                    self.next_token();
                    if !self.skip_type_lookahead() {
                        return false;
                    }
                }
            } else if !self.skip_type_lookahead() {
                return false;
            }
            match self.token() {
                SyntaxKind::CommaToken => {
                    self.next_token();
                }
                SyntaxKind::GreaterThanToken => {
                    self.next_token();
                    return true;
                }
                _ => return false,
            }
        }
    }

    /// `Type name` ahead: a local variable declaration rather than an
    /// expression statement.
    pub(crate) fn look_ahead_is_local_variable_declaration(&mut self) -> bool {
        self.look_ahead(|p| p.skip_type_lookahead() && p.is_token(SyntaxKind::Identifier))
    }
}
