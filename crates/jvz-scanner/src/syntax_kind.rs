//! Token kinds and classification helpers.

use serde::Serialize;

/// Every token the scanner can produce.
///
/// `>` is always scanned on its own; compound `>`-operators are produced by
/// `ScannerState::re_scan_greater_token` when the parser is in an operator
/// position, so that `List<List<String>>` closes two type argument lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    Unknown = 0,
    EndOfFileToken,

    // Trivia
    SingleLineCommentTrivia,
    MultiLineCommentTrivia,
    DocCommentTrivia,

    // Literals
    IntegerLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharacterLiteral,
    StringLiteral,

    Identifier,

    // Separators
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    OpenBracketToken,
    CloseBracketToken,
    SemicolonToken,
    CommaToken,
    DotToken,
    DotDotDotToken,
    AtToken,
    ColonColonToken,

    // Operators
    EqualsToken,
    GreaterThanToken,
    LessThanToken,
    ExclamationToken,
    TildeToken,
    QuestionToken,
    ColonToken,
    MinusGreaterThanToken,
    EqualsEqualsToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    ExclamationEqualsToken,
    AmpersandAmpersandToken,
    BarBarToken,
    PlusPlusToken,
    MinusMinusToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    SlashToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    PercentToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,

    // Keywords
    AbstractKeyword,
    AssertKeyword,
    BooleanKeyword,
    BreakKeyword,
    ByteKeyword,
    CaseKeyword,
    CatchKeyword,
    CharKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DefaultKeyword,
    DoKeyword,
    DoubleKeyword,
    ElseKeyword,
    EnumKeyword,
    ExtendsKeyword,
    FinalKeyword,
    FinallyKeyword,
    FloatKeyword,
    ForKeyword,
    GotoKeyword,
    IfKeyword,
    ImplementsKeyword,
    ImportKeyword,
    InstanceOfKeyword,
    IntKeyword,
    InterfaceKeyword,
    LongKeyword,
    NativeKeyword,
    NewKeyword,
    PackageKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReturnKeyword,
    ShortKeyword,
    StaticKeyword,
    StrictFpKeyword,
    SuperKeyword,
    SwitchKeyword,
    SynchronizedKeyword,
    ThisKeyword,
    ThrowKeyword,
    ThrowsKeyword,
    TransientKeyword,
    TryKeyword,
    VoidKeyword,
    VolatileKeyword,
    WhileKeyword,
    // Literal keywords
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::AbstractKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::NullKeyword;
    pub const FIRST_PUNCTUATION: SyntaxKind = SyntaxKind::OpenParenToken;
    pub const LAST_PUNCTUATION: SyntaxKind = SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken;
}

static KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("abstract", SyntaxKind::AbstractKeyword),
    ("assert", SyntaxKind::AssertKeyword),
    ("boolean", SyntaxKind::BooleanKeyword),
    ("break", SyntaxKind::BreakKeyword),
    ("byte", SyntaxKind::ByteKeyword),
    ("case", SyntaxKind::CaseKeyword),
    ("catch", SyntaxKind::CatchKeyword),
    ("char", SyntaxKind::CharKeyword),
    ("class", SyntaxKind::ClassKeyword),
    ("const", SyntaxKind::ConstKeyword),
    ("continue", SyntaxKind::ContinueKeyword),
    ("default", SyntaxKind::DefaultKeyword),
    ("do", SyntaxKind::DoKeyword),
    ("double", SyntaxKind::DoubleKeyword),
    ("else", SyntaxKind::ElseKeyword),
    ("enum", SyntaxKind::EnumKeyword),
    ("extends", SyntaxKind::ExtendsKeyword),
    ("final", SyntaxKind::FinalKeyword),
    ("finally", SyntaxKind::FinallyKeyword),
    ("float", SyntaxKind::FloatKeyword),
    ("for", SyntaxKind::ForKeyword),
    ("goto", SyntaxKind::GotoKeyword),
    ("if", SyntaxKind::IfKeyword),
    ("implements", SyntaxKind::ImplementsKeyword),
    ("import", SyntaxKind::ImportKeyword),
    ("instanceof", SyntaxKind::InstanceOfKeyword),
    ("int", SyntaxKind::IntKeyword),
    ("interface", SyntaxKind::InterfaceKeyword),
    ("long", SyntaxKind::LongKeyword),
    ("native", SyntaxKind::NativeKeyword),
    ("new", SyntaxKind::NewKeyword),
    ("package", SyntaxKind::PackageKeyword),
    ("private", SyntaxKind::PrivateKeyword),
    ("protected", SyntaxKind::ProtectedKeyword),
    ("public", SyntaxKind::PublicKeyword),
    ("return", SyntaxKind::ReturnKeyword),
    ("short", SyntaxKind::ShortKeyword),
    ("static", SyntaxKind::StaticKeyword),
    ("strictfp", SyntaxKind::StrictFpKeyword),
    ("super", SyntaxKind::SuperKeyword),
    ("switch", SyntaxKind::SwitchKeyword),
    ("synchronized", SyntaxKind::SynchronizedKeyword),
    ("this", SyntaxKind::ThisKeyword),
    ("throw", SyntaxKind::ThrowKeyword),
    ("throws", SyntaxKind::ThrowsKeyword),
    ("transient", SyntaxKind::TransientKeyword),
    ("try", SyntaxKind::TryKeyword),
    ("void", SyntaxKind::VoidKeyword),
    ("volatile", SyntaxKind::VolatileKeyword),
    ("while", SyntaxKind::WhileKeyword),
    ("true", SyntaxKind::TrueKeyword),
    ("false", SyntaxKind::FalseKeyword),
    ("null", SyntaxKind::NullKeyword),
];

static PUNCTUATION: &[(&str, SyntaxKind)] = &[
    ("(", SyntaxKind::OpenParenToken),
    (")", SyntaxKind::CloseParenToken),
    ("{", SyntaxKind::OpenBraceToken),
    ("}", SyntaxKind::CloseBraceToken),
    ("[", SyntaxKind::OpenBracketToken),
    ("]", SyntaxKind::CloseBracketToken),
    (";", SyntaxKind::SemicolonToken),
    (",", SyntaxKind::CommaToken),
    (".", SyntaxKind::DotToken),
    ("...", SyntaxKind::DotDotDotToken),
    ("@", SyntaxKind::AtToken),
    ("::", SyntaxKind::ColonColonToken),
    ("=", SyntaxKind::EqualsToken),
    (">", SyntaxKind::GreaterThanToken),
    ("<", SyntaxKind::LessThanToken),
    ("!", SyntaxKind::ExclamationToken),
    ("~", SyntaxKind::TildeToken),
    ("?", SyntaxKind::QuestionToken),
    (":", SyntaxKind::ColonToken),
    ("->", SyntaxKind::MinusGreaterThanToken),
    ("==", SyntaxKind::EqualsEqualsToken),
    ("<=", SyntaxKind::LessThanEqualsToken),
    (">=", SyntaxKind::GreaterThanEqualsToken),
    ("!=", SyntaxKind::ExclamationEqualsToken),
    ("&&", SyntaxKind::AmpersandAmpersandToken),
    ("||", SyntaxKind::BarBarToken),
    ("++", SyntaxKind::PlusPlusToken),
    ("--", SyntaxKind::MinusMinusToken),
    ("+", SyntaxKind::PlusToken),
    ("-", SyntaxKind::MinusToken),
    ("*", SyntaxKind::AsteriskToken),
    ("/", SyntaxKind::SlashToken),
    ("&", SyntaxKind::AmpersandToken),
    ("|", SyntaxKind::BarToken),
    ("^", SyntaxKind::CaretToken),
    ("%", SyntaxKind::PercentToken),
    ("<<", SyntaxKind::LessThanLessThanToken),
    (">>", SyntaxKind::GreaterThanGreaterThanToken),
    (">>>", SyntaxKind::GreaterThanGreaterThanGreaterThanToken),
    ("+=", SyntaxKind::PlusEqualsToken),
    ("-=", SyntaxKind::MinusEqualsToken),
    ("*=", SyntaxKind::AsteriskEqualsToken),
    ("/=", SyntaxKind::SlashEqualsToken),
    ("&=", SyntaxKind::AmpersandEqualsToken),
    ("|=", SyntaxKind::BarEqualsToken),
    ("^=", SyntaxKind::CaretEqualsToken),
    ("%=", SyntaxKind::PercentEqualsToken),
    ("<<=", SyntaxKind::LessThanLessThanEqualsToken),
    (">>=", SyntaxKind::GreaterThanGreaterThanEqualsToken),
    (">>>=", SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken),
];

/// Map identifier text to its keyword kind, if it is a reserved word.
#[must_use]
pub fn text_to_keyword(text: &str) -> Option<SyntaxKind> {
    // Keywords are 2..=12 ASCII lowercase letters.
    if text.len() < 2 || text.len() > 12 || !text.as_bytes()[0].is_ascii_lowercase() {
        return None;
    }
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|(_, kind)| *kind)
}

#[must_use]
pub fn keyword_to_text(kind: SyntaxKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(word, _)| *word)
}

#[must_use]
pub fn punctuation_to_text(kind: SyntaxKind) -> Option<&'static str> {
    PUNCTUATION
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(text, _)| *text)
}

/// Display text for a token kind, used in "expected" diagnostics.
#[must_use]
pub fn token_to_text(kind: SyntaxKind) -> &'static str {
    if let Some(text) = keyword_to_text(kind).or_else(|| punctuation_to_text(kind)) {
        return text;
    }
    match kind {
        SyntaxKind::Identifier => "<identifier>",
        SyntaxKind::EndOfFileToken => "<EOF>",
        SyntaxKind::IntegerLiteral | SyntaxKind::LongLiteral => "<integer literal>",
        SyntaxKind::FloatLiteral | SyntaxKind::DoubleLiteral => "<floating-point literal>",
        SyntaxKind::CharacterLiteral => "<character literal>",
        SyntaxKind::StringLiteral => "<string literal>",
        SyntaxKind::SingleLineCommentTrivia
        | SyntaxKind::MultiLineCommentTrivia
        | SyntaxKind::DocCommentTrivia => "<comment>",
        _ => "<unknown>",
    }
}

#[inline]
#[must_use]
pub fn token_is_keyword(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::FIRST_KEYWORD && kind <= SyntaxKind::LAST_KEYWORD
}

#[inline]
#[must_use]
pub fn token_is_identifier_or_keyword(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || token_is_keyword(kind)
}

#[inline]
#[must_use]
pub fn token_is_punctuation(kind: SyntaxKind) -> bool {
    kind >= SyntaxKind::FIRST_PUNCTUATION && kind <= SyntaxKind::LAST_PUNCTUATION
}

#[inline]
#[must_use]
pub fn token_is_comment(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::SingleLineCommentTrivia
            | SyntaxKind::MultiLineCommentTrivia
            | SyntaxKind::DocCommentTrivia
    )
}

#[must_use]
pub fn token_is_literal(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IntegerLiteral
            | SyntaxKind::LongLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::DoubleLiteral
            | SyntaxKind::CharacterLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
    )
}

#[must_use]
pub fn token_is_assignment_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::EqualsToken
            | SyntaxKind::PlusEqualsToken
            | SyntaxKind::MinusEqualsToken
            | SyntaxKind::AsteriskEqualsToken
            | SyntaxKind::SlashEqualsToken
            | SyntaxKind::AmpersandEqualsToken
            | SyntaxKind::BarEqualsToken
            | SyntaxKind::CaretEqualsToken
            | SyntaxKind::PercentEqualsToken
            | SyntaxKind::LessThanLessThanEqualsToken
            | SyntaxKind::GreaterThanGreaterThanEqualsToken
            | SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken
    )
}

#[must_use]
pub fn token_is_modifier(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PublicKeyword
            | SyntaxKind::ProtectedKeyword
            | SyntaxKind::PrivateKeyword
            | SyntaxKind::StaticKeyword
            | SyntaxKind::AbstractKeyword
            | SyntaxKind::FinalKeyword
            | SyntaxKind::NativeKeyword
            | SyntaxKind::SynchronizedKeyword
            | SyntaxKind::TransientKeyword
            | SyntaxKind::VolatileKeyword
            | SyntaxKind::StrictFpKeyword
    )
}

#[must_use]
pub fn token_is_primitive_type(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BooleanKeyword
            | SyntaxKind::ByteKeyword
            | SyntaxKind::ShortKeyword
            | SyntaxKind::IntKeyword
            | SyntaxKind::LongKeyword
            | SyntaxKind::CharKeyword
            | SyntaxKind::FloatKeyword
            | SyntaxKind::DoubleKeyword
    )
}
