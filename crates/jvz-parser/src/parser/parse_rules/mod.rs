//! Token classification rules used by the parser.
//!
//! Expression parsing itself lives on `ParserState`; this module only
//! answers "can this token start X" and "how tightly does this operator
//! bind" so the recovery code and the grammar agree on the same sets.

use jvz_scanner::{SyntaxKind, token_is_literal, token_is_modifier, token_is_primitive_type};

/// Binding power of a binary operator; 0 when the token is not one.
///
/// `instanceof` shares the relational level.
#[must_use]
pub fn binary_operator_precedence(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::BarBarToken => 1,
        SyntaxKind::AmpersandAmpersandToken => 2,
        SyntaxKind::BarToken => 3,
        SyntaxKind::CaretToken => 4,
        SyntaxKind::AmpersandToken => 5,
        SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => 6,
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken
        | SyntaxKind::InstanceOfKeyword => 7,
        SyntaxKind::LessThanLessThanToken
        | SyntaxKind::GreaterThanGreaterThanToken
        | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => 8,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => 9,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 10,
        _ => 0,
    }
}

/// Tokens that can begin an expression.
#[must_use]
pub fn is_start_of_expression(kind: SyntaxKind) -> bool {
    token_is_literal(kind)
        || token_is_primitive_type(kind)
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::OpenParenToken
                | SyntaxKind::PlusToken
                | SyntaxKind::MinusToken
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::TildeToken
        )
}

/// Tokens that may follow `(Type)` for the parenthesized form to be a cast
/// of a reference type. `+` and `-` are excluded: `(a) - b` is a subtraction.
#[must_use]
pub fn can_follow_reference_cast(kind: SyntaxKind) -> bool {
    token_is_literal(kind)
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::OpenParenToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::TildeToken
        )
        || token_is_primitive_type(kind)
}

/// Keywords that begin a statement on their own.
#[must_use]
pub fn is_statement_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IfKeyword
            | SyntaxKind::WhileKeyword
            | SyntaxKind::DoKeyword
            | SyntaxKind::ForKeyword
            | SyntaxKind::TryKeyword
            | SyntaxKind::SwitchKeyword
            | SyntaxKind::ReturnKeyword
            | SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::ThrowKeyword
            | SyntaxKind::SynchronizedKeyword
            | SyntaxKind::AssertKeyword
    )
}

/// Tokens that begin a type declaration.
#[must_use]
pub fn is_type_declaration_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ClassKeyword | SyntaxKind::InterfaceKeyword | SyntaxKind::EnumKeyword
    )
}

/// Tokens where top-level recovery stops skipping.
#[must_use]
pub fn is_top_level_sync_token(kind: SyntaxKind) -> bool {
    is_type_declaration_keyword(kind)
        || token_is_modifier(kind)
        || matches!(
            kind,
            SyntaxKind::ImportKeyword
                | SyntaxKind::PackageKeyword
                | SyntaxKind::AtToken
                | SyntaxKind::EndOfFileToken
        )
}

/// Tokens where class-body recovery stops skipping. An identifier may
/// begin a member whose type is a class type.
#[must_use]
pub fn is_member_sync_token(kind: SyntaxKind) -> bool {
    is_type_declaration_keyword(kind)
        || token_is_modifier(kind)
        || token_is_primitive_type(kind)
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::AtToken
                | SyntaxKind::VoidKeyword
                | SyntaxKind::LessThanToken
                | SyntaxKind::EndOfFileToken
        )
}

/// Tokens where statement-level recovery stops skipping: anything that
/// can begin a statement, a local variable or a local class, plus `;` and
/// the block and switch delimiters.
///
/// Unary operators and `(` are not included; skipping stops mid-expression
/// there far more often than at a real statement.
#[must_use]
pub fn is_statement_sync_token(kind: SyntaxKind) -> bool {
    is_switch_sync_token(kind)
        || is_type_declaration_keyword(kind)
        || token_is_literal(kind)
        || token_is_primitive_type(kind)
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::PlusPlusToken
                | SyntaxKind::MinusMinusToken
                | SyntaxKind::FinalKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::AtToken
                | SyntaxKind::SemicolonToken
        )
}

/// Tokens where recovery inside a `switch` body stops skipping.
#[must_use]
pub fn is_switch_sync_token(kind: SyntaxKind) -> bool {
    is_statement_keyword(kind)
        || matches!(
            kind,
            SyntaxKind::CloseBraceToken
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::CaseKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::EndOfFileToken
        )
}
