//! Declaration grammar: compilation unit, package and imports, type
//! declarations, class bodies and their members, modifiers and annotations.

use jvz_common::diagnostics::diagnostic_codes;
use jvz_scanner::{SyntaxKind, keyword_to_text, token_is_modifier};
use tracing::debug;

use super::base::{NodeIndex, NodeList};
use super::flags::ModifierFlags;
use super::node::{
    CompilationUnit, MethodDeclaration, Modifiers, NodeData, TypeDeclaration, TypeDeclarationKind,
};
use super::parse_rules::{is_member_sync_token, is_top_level_sync_token};
use super::state::ParserState;

impl ParserState {
    // =========================================================================
    // Compilation unit
    // =========================================================================

    /// Parse the whole file. The root always spans `0..source_len`.
    pub fn parse_compilation_unit(&mut self) -> NodeIndex {
        self.next_token();

        let mut package = NodeIndex::NONE;
        if self.is_token(SyntaxKind::PackageKeyword) || self.look_ahead_is_annotated_package() {
            package = self.parse_package_declaration();
        }

        let mut imports = Vec::new();
        let mut types = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            let before = self.token_pos();
            match self.token() {
                SyntaxKind::ImportKeyword => imports.push(self.parse_import_declaration()),
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                }
                _ => {
                    if let Some(decl) = self.parse_top_level_declaration() {
                        types.push(decl);
                    }
                }
            }
            if self.token_pos() == before && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.skip_token();
            }
        }

        self.collect_scanner_diagnostics();
        debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            errors = self.parse_diagnostics.len(),
            "parsed compilation unit"
        );

        let unit = CompilationUnit {
            file_name: self.file_name.clone(),
            package,
            imports: NodeList::from(imports),
            types: NodeList::from(types),
        };
        self.arena
            .add(0, self.source_len, NodeData::CompilationUnit(Box::new(unit)))
    }

    /// `@Deprecated package a.b;` as written in `package-info.java`.
    fn look_ahead_is_annotated_package(&mut self) -> bool {
        if !self.is_token(SyntaxKind::AtToken) {
            return false;
        }
        self.look_ahead(|p| {
            while p.is_token(SyntaxKind::AtToken) {
                if p.peek_token() == SyntaxKind::InterfaceKeyword {
                    return false;
                }
                p.parse_annotation();
            }
            p.is_token(SyntaxKind::PackageKeyword)
        })
    }

    fn parse_package_declaration(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut annotations = Vec::new();
        while self.is_token(SyntaxKind::AtToken) {
            annotations.push(self.parse_annotation());
        }
        self.parse_expected(SyntaxKind::PackageKeyword);
        let name = self.parse_qualified_name();
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(
            start,
            NodeData::PackageDeclaration {
                annotations: NodeList::from(annotations),
                name,
            },
        )
    }

    /// `import [static] a.b.C [.*];`
    fn parse_import_declaration(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.next_token();
        let is_static = self.parse_optional(SyntaxKind::StaticKeyword);
        let name = self.parse_qualified_name();
        let mut on_demand = false;
        if self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            on_demand = self.parse_expected(SyntaxKind::AsteriskToken);
        }
        self.parse_expected(SyntaxKind::SemicolonToken);
        self.finish_node(
            start,
            NodeData::ImportDeclaration {
                name,
                is_static,
                on_demand,
            },
        )
    }

    fn parse_top_level_declaration(&mut self) -> Option<NodeIndex> {
        let start = self.token_pos();
        if self.is_token(SyntaxKind::PackageKeyword) || self.is_token(SyntaxKind::ImportKeyword) {
            let found = self.found_text();
            self.parse_error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[&found]);
            self.resync(is_top_level_sync_token);
            return None;
        }
        let modifiers = self.parse_modifiers();
        if self.is_start_of_type_declaration() {
            return Some(self.parse_type_declaration(start, modifiers));
        }
        let found = self.found_text();
        self.parse_error_at_current_token(diagnostic_codes::TYPE_DECLARATION_EXPECTED, &[&found]);
        self.resync(is_top_level_sync_token);
        None
    }

    pub(crate) fn is_start_of_type_declaration(&mut self) -> bool {
        match self.token() {
            SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword => {
                true
            }
            SyntaxKind::AtToken => self.peek_token() == SyntaxKind::InterfaceKeyword,
            _ => false,
        }
    }

    // =========================================================================
    // Modifiers and annotations
    // =========================================================================

    /// Modifier keywords and annotations in any order.
    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut flags = ModifierFlags::empty();
        let mut annotations = Vec::new();
        loop {
            let kind = self.token();
            if let Some(flag) = ModifierFlags::from_keyword(kind) {
                if flags.contains(flag) {
                    let text = keyword_to_text(kind).unwrap_or_default();
                    self.parse_error_at_current_token(
                        diagnostic_codes::REPEATED_MODIFIER,
                        &[text],
                    );
                    self.skip_token();
                    continue;
                }
                flags |= flag;
                self.next_token();
            } else if kind == SyntaxKind::AtToken
                && self.peek_token() != SyntaxKind::InterfaceKeyword
            {
                annotations.push(self.parse_annotation());
            } else {
                break;
            }
        }
        Modifiers {
            flags,
            annotations: NodeList::from(annotations),
        }
    }

    /// `@Name`, `@Name(value)` or `@Name(a = 1, b = {2, 3})`.
    pub(crate) fn parse_annotation(&mut self) -> NodeIndex {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::AtToken);
        let name = self.parse_qualified_name();
        let mut arguments = Vec::new();
        if self.parse_optional(SyntaxKind::OpenParenToken) {
            if !self.is_token(SyntaxKind::CloseParenToken) {
                if self.is_token(SyntaxKind::Identifier)
                    && self.peek_token() == SyntaxKind::EqualsToken
                {
                    loop {
                        arguments.push(self.parse_element_value_pair());
                        if !self.parse_optional(SyntaxKind::CommaToken) {
                            break;
                        }
                    }
                } else {
                    arguments.push(self.parse_element_value());
                }
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
        }
        self.finish_node(
            start,
            NodeData::Annotation {
                name,
                arguments: NodeList::from(arguments),
            },
        )
    }

    fn parse_element_value_pair(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::EqualsToken);
        let value = self.parse_element_value();
        self.finish_node(start, NodeData::ElementValuePair { name, value })
    }

    fn parse_element_value(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::AtToken => self.parse_annotation(),
            SyntaxKind::OpenBraceToken => {
                let start = self.token_pos();
                self.next_token();
                let mut values = Vec::new();
                while !self.is_token(SyntaxKind::CloseBraceToken)
                    && !self.is_token(SyntaxKind::EndOfFileToken)
                {
                    values.push(self.parse_element_value());
                    if !self.parse_optional(SyntaxKind::CommaToken) {
                        break;
                    }
                }
                self.parse_expected(SyntaxKind::CloseBraceToken);
                self.finish_node(
                    start,
                    NodeData::ElementValueArrayInitializer {
                        values: NodeList::from(values),
                    },
                )
            }
            _ => self.parse_conditional_expression(),
        }
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Type declaration after its modifiers; `start` is the modifiers' start.
    pub(crate) fn parse_type_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        if !self.enter_recursion() {
            self.skip_to_construct_end();
            return self.missing_node(NodeData::Error);
        }
        let decl = match self.token() {
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(start, modifiers),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(start, modifiers),
            SyntaxKind::AtToken => self.parse_annotation_type_declaration(start, modifiers),
            _ => self.parse_class_declaration(start, modifiers),
        };
        self.exit_recursion();
        decl
    }

    fn parse_class_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let extends = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            NodeList::from(vec![self.parse_type()])
        } else {
            NodeList::new()
        };
        let implements = if self.parse_optional(SyntaxKind::ImplementsKeyword) {
            self.parse_class_type_list()
        } else {
            NodeList::new()
        };
        let members = self.parse_class_body();
        self.finish_type_declaration(
            start,
            TypeDeclaration {
                kind: TypeDeclarationKind::Class,
                modifiers,
                name,
                type_parameters,
                extends,
                implements,
                enum_constants: NodeList::new(),
                members,
            },
        )
    }

    fn parse_interface_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        let type_parameters = self.parse_type_parameters();
        let extends = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_class_type_list()
        } else {
            NodeList::new()
        };
        let members = self.parse_class_body();
        self.finish_type_declaration(
            start,
            TypeDeclaration {
                kind: TypeDeclarationKind::Interface,
                modifiers,
                name,
                type_parameters,
                extends,
                implements: NodeList::new(),
                enum_constants: NodeList::new(),
                members,
            },
        )
    }

    fn parse_annotation_type_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        self.next_token();
        self.parse_expected(SyntaxKind::InterfaceKeyword);
        let name = self.parse_identifier();
        let members = self.parse_class_body();
        self.finish_type_declaration(
            start,
            TypeDeclaration {
                kind: TypeDeclarationKind::Annotation,
                modifiers,
                name,
                type_parameters: NodeList::new(),
                extends: NodeList::new(),
                implements: NodeList::new(),
                enum_constants: NodeList::new(),
                members,
            },
        )
    }

    /// `enum E implements I { A, B(1), C { ... }; members }`
    fn parse_enum_declaration(&mut self, start: u32, modifiers: Modifiers) -> NodeIndex {
        self.next_token();
        let name = self.parse_identifier();
        let implements = if self.parse_optional(SyntaxKind::ImplementsKeyword) {
            self.parse_class_type_list()
        } else {
            NodeList::new()
        };

        let mut constants = Vec::new();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while self.is_token(SyntaxKind::Identifier) || self.is_token(SyntaxKind::AtToken) {
                constants.push(self.parse_enum_constant());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                self.parse_class_members_until_close(&mut members);
            } else if !self.is_token(SyntaxKind::CloseBraceToken) {
                let found = self.found_text();
                self.parse_error_at_current_token(diagnostic_codes::TOKEN_EXPECTED, &["}", &found]);
                self.parse_class_members_until_close(&mut members);
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }

        self.finish_type_declaration(
            start,
            TypeDeclaration {
                kind: TypeDeclarationKind::Enum,
                modifiers,
                name,
                type_parameters: NodeList::new(),
                extends: NodeList::new(),
                implements,
                enum_constants: NodeList::from(constants),
                members: NodeList::from(members),
            },
        )
    }

    fn parse_enum_constant(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let mut annotations = Vec::new();
        while self.is_token(SyntaxKind::AtToken) {
            annotations.push(self.parse_annotation());
        }
        let name = self.parse_identifier();
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            Some(self.parse_arguments())
        } else {
            None
        };
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            Some(self.parse_class_body())
        } else {
            None
        };
        self.finish_node(
            start,
            NodeData::EnumConstant {
                annotations: NodeList::from(annotations),
                name,
                arguments,
                body,
            },
        )
    }

    fn finish_type_declaration(&mut self, start: u32, decl: TypeDeclaration) -> NodeIndex {
        self.finish_node(start, NodeData::TypeDeclaration(Box::new(decl)))
    }

    // =========================================================================
    // Class bodies
    // =========================================================================

    /// `{ members }`; also used for anonymous class bodies.
    pub(crate) fn parse_class_body(&mut self) -> NodeList {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return NodeList::from(members);
        }
        self.parse_class_members_until_close(&mut members);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        NodeList::from(members)
    }

    fn parse_class_members_until_close(&mut self, members: &mut Vec<NodeIndex>) {
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            if let Some(member) = self.parse_class_member() {
                members.push(member);
            }
            if self.token_pos() == before && !self.is_token(SyntaxKind::CloseBraceToken) {
                self.skip_token();
            }
        }
    }

    fn parse_class_member(&mut self) -> Option<NodeIndex> {
        self.resume_after_boundary();
        let start = self.token_pos();
        match self.token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                return None;
            }
            SyntaxKind::OpenBraceToken => return Some(self.parse_initializer(start, false)),
            SyntaxKind::StaticKeyword if self.peek_token() == SyntaxKind::OpenBraceToken => {
                self.next_token();
                return Some(self.parse_initializer(start, true));
            }
            _ => {}
        }

        let modifiers = self.parse_modifiers();
        if self.is_start_of_type_declaration() {
            return Some(self.parse_type_declaration(start, modifiers));
        }

        let type_parameters = self.parse_type_parameters();
        if self.is_token(SyntaxKind::Identifier) && self.peek_token() == SyntaxKind::OpenParenToken
        {
            let name = self.parse_identifier();
            return Some(self.parse_method_rest(
                start,
                modifiers,
                type_parameters,
                NodeIndex::NONE,
                name,
                true,
            ));
        }

        let kind = self.token();
        if kind == SyntaxKind::VoidKeyword
            || kind == SyntaxKind::Identifier
            || jvz_scanner::token_is_primitive_type(kind)
        {
            let ty = self.parse_return_type();
            let name = self.parse_identifier();
            if self.is_token(SyntaxKind::OpenParenToken) {
                return Some(self.parse_method_rest(
                    start,
                    modifiers,
                    type_parameters,
                    ty,
                    name,
                    false,
                ));
            }
            let declarators = self.parse_variable_declarators_after_name(name);
            self.parse_expected(SyntaxKind::SemicolonToken);
            return Some(self.finish_node(
                start,
                NodeData::FieldDeclaration {
                    modifiers,
                    ty,
                    declarators,
                },
            ));
        }

        let found = self.found_text();
        self.parse_error_at_current_token(diagnostic_codes::ILLEGAL_START_OF_MEMBER, &[&found]);
        self.resync(is_member_sync_token);
        None
    }

    fn parse_initializer(&mut self, start: u32, is_static: bool) -> NodeIndex {
        let body = self.parse_block();
        self.finish_node(start, NodeData::Initializer { is_static, body })
    }

    /// Parameters, dimensions, `throws`, `default` and body of a method or
    /// constructor whose name has been parsed.
    fn parse_method_rest(
        &mut self,
        start: u32,
        modifiers: Modifiers,
        type_parameters: NodeList,
        return_type: NodeIndex,
        name: NodeIndex,
        is_constructor: bool,
    ) -> NodeIndex {
        let parameters = self.parse_formal_parameters();
        let extra_dimensions = self.parse_extra_dimensions();
        let throws = if self.parse_optional(SyntaxKind::ThrowsKeyword) {
            self.parse_class_type_list()
        } else {
            NodeList::new()
        };
        let default_value = if self.parse_optional(SyntaxKind::DefaultKeyword) {
            self.parse_element_value()
        } else {
            NodeIndex::NONE
        };
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
            NodeIndex::NONE
        };
        let method = MethodDeclaration {
            modifiers,
            type_parameters,
            return_type,
            name,
            parameters,
            extra_dimensions,
            throws,
            body,
            default_value,
            is_constructor,
        };
        self.finish_node(start, NodeData::MethodDeclaration(Box::new(method)))
    }

    /// `(final int a, String... rest)`
    fn parse_formal_parameters(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return NodeList::from(parameters);
        }
        if !self.is_token(SyntaxKind::CloseParenToken) {
            loop {
                parameters.push(self.parse_formal_parameter());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from(parameters)
    }

    pub(crate) fn parse_formal_parameter(&mut self) -> NodeIndex {
        let start = self.token_pos();
        let modifiers = self.parse_modifiers();
        let ty = self.parse_type();
        let is_varargs = self.parse_optional(SyntaxKind::DotDotDotToken);
        let name = self.parse_identifier();
        let extra_dimensions = self.parse_extra_dimensions();
        self.finish_node(
            start,
            NodeData::Parameter {
                modifiers,
                ty,
                name,
                is_varargs,
                extra_dimensions,
            },
        )
    }

    // =========================================================================
    // Variable declarators
    // =========================================================================

    /// `a = 1, b[] = {}, c` for a field or local whose first name is parsed.
    pub(crate) fn parse_variable_declarators_after_name(&mut self, first_name: NodeIndex) -> NodeList {
        let first_start = self.arena.get(first_name).map_or(self.token_pos(), |n| n.pos);
        let mut declarators = vec![self.parse_variable_declarator_rest(first_start, first_name)];
        while self.parse_optional(SyntaxKind::CommaToken) {
            let start = self.token_pos();
            let name = self.parse_identifier();
            declarators.push(self.parse_variable_declarator_rest(start, name));
        }
        NodeList::from(declarators)
    }

    pub(crate) fn parse_variable_declarators(&mut self) -> NodeList {
        let name = self.parse_identifier();
        self.parse_variable_declarators_after_name(name)
    }

    fn parse_variable_declarator_rest(&mut self, start: u32, name: NodeIndex) -> NodeIndex {
        let extra_dimensions = self.parse_extra_dimensions();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_variable_initializer()
        } else {
            NodeIndex::NONE
        };
        self.finish_node(
            start,
            NodeData::VariableDeclarator {
                name,
                extra_dimensions,
                initializer,
            },
        )
    }

    pub(crate) fn parse_variable_initializer(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_array_initializer()
        } else {
            self.parse_expression()
        }
    }

    /// Modifier keyword at the current token, used by statement parsing to
    /// recognize local declarations such as `final int x`.
    pub(crate) fn is_modifier_token(&self) -> bool {
        token_is_modifier(self.token())
    }
}
