//! Tests for the scanner and token stream.

use crate::*;
use jvz_common::diagnostics::diagnostic_codes;

fn kinds(source: &str) -> Vec<SyntaxKind> {
    tokenize(source)
        .map(|t| t.kind)
        .filter(|k| *k != SyntaxKind::EndOfFileToken)
        .collect()
}

fn codes(source: &str) -> Vec<u32> {
    let mut tokens = tokenize(source);
    tokens.by_ref().for_each(drop);
    tokens.diagnostics().iter().map(|d| d.code).collect()
}

#[test]
fn test_token_is_keyword() {
    assert!(token_is_keyword(SyntaxKind::BreakKeyword));
    assert!(token_is_keyword(SyntaxKind::GotoKeyword));
    assert!(token_is_keyword(SyntaxKind::NullKeyword));
    assert!(!token_is_keyword(SyntaxKind::Identifier));
    assert!(!token_is_keyword(SyntaxKind::OpenBraceToken));
}

#[test]
fn test_token_is_punctuation() {
    assert!(token_is_punctuation(SyntaxKind::OpenBraceToken));
    assert!(token_is_punctuation(SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken));
    assert!(!token_is_punctuation(SyntaxKind::Identifier));
    assert!(!token_is_punctuation(SyntaxKind::AbstractKeyword));
}

#[test]
fn test_text_to_keyword() {
    assert_eq!(text_to_keyword("class"), Some(SyntaxKind::ClassKeyword));
    assert_eq!(text_to_keyword("instanceof"), Some(SyntaxKind::InstanceOfKeyword));
    assert_eq!(text_to_keyword("synchronized"), Some(SyntaxKind::SynchronizedKeyword));
    assert_eq!(text_to_keyword("Class"), None);
    assert_eq!(text_to_keyword("var"), None);
    assert_eq!(text_to_keyword("x"), None);
}

#[test]
fn test_keyword_and_punctuation_text() {
    assert_eq!(keyword_to_text(SyntaxKind::StrictFpKeyword), Some("strictfp"));
    assert_eq!(punctuation_to_text(SyntaxKind::DotDotDotToken), Some("..."));
    assert_eq!(token_to_text(SyntaxKind::Identifier), "<identifier>");
    assert_eq!(token_to_text(SyntaxKind::SemicolonToken), ";");
}

#[test]
fn test_class_declaration_tokens() {
    let tokens: Vec<Token> = tokenize("public class Foo { }").collect();
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["public", "class", "Foo", "{", "}", ""]);
    assert_eq!(tokens[2].span, jvz_common::Span::new(13, 16));
    assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::EndOfFileToken));
}

#[test]
fn test_token_stream_is_fused_and_restartable() {
    let source = "a b";
    let mut tokens = tokenize(source);
    assert_eq!(tokens.by_ref().count(), 3);
    assert!(tokens.next().is_none());
    assert_eq!(tokenize(source).count(), 3);
}

#[test]
fn test_comments_are_skipped_or_yielded() {
    let source = "/** doc */ int /* block */ x; // tail";
    assert_eq!(
        kinds(source),
        vec![
            SyntaxKind::IntKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken
        ]
    );
    let with_comments: Vec<SyntaxKind> = tokenize_with_comments(source).map(|t| t.kind).collect();
    assert_eq!(
        with_comments,
        vec![
            SyntaxKind::DocCommentTrivia,
            SyntaxKind::IntKeyword,
            SyntaxKind::MultiLineCommentTrivia,
            SyntaxKind::Identifier,
            SyntaxKind::SemicolonToken,
            SyntaxKind::SingleLineCommentTrivia,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_empty_block_comment_is_not_doc() {
    let kinds: Vec<SyntaxKind> = tokenize_with_comments("/**/").map(|t| t.kind).collect();
    assert_eq!(kinds[0], SyntaxKind::MultiLineCommentTrivia);
}

#[test]
fn test_number_literals() {
    assert_eq!(
        kinds("0 42 1_000 0x1F 0b1010 017 10L 0xFFL"),
        vec![
            SyntaxKind::IntegerLiteral,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::LongLiteral,
            SyntaxKind::LongLiteral,
        ]
    );
    assert_eq!(
        kinds("1.5 .5 1. 1e10 2.5f 3d 0x1.8p1 1e-3F 09f"),
        vec![
            SyntaxKind::DoubleLiteral,
            SyntaxKind::DoubleLiteral,
            SyntaxKind::DoubleLiteral,
            SyntaxKind::DoubleLiteral,
            SyntaxKind::FloatLiteral,
            SyntaxKind::DoubleLiteral,
            SyntaxKind::DoubleLiteral,
            SyntaxKind::FloatLiteral,
            SyntaxKind::FloatLiteral,
        ]
    );
    assert!(codes("0 42 1.5 0x1.8p1 09f").is_empty());
}

#[test]
fn test_malformed_numbers() {
    for bad in ["1_", "0x", "0x_1", "1e", "09", "0b102", "12abc", "0x1.8"] {
        let found = codes(bad);
        assert_eq!(
            found,
            vec![diagnostic_codes::MALFORMED_NUMBER],
            "expected one malformed-number diagnostic for {bad:?}, got {found:?}"
        );
    }
}

#[test]
fn test_integer_literal_range() {
    // The boundary values are left to the parser, which knows about unary minus.
    for ok in [
        "2147483647",
        "2147483648",
        "9223372036854775808L",
        "0xFFFFFFFF",
        "037777777777",
        "0b11111111111111111111111111111111",
        "0xFFFF_FFFF_FFFF_FFFFL",
    ] {
        assert!(codes(ok).is_empty(), "{ok:?} should be in range");
    }
    for big in [
        "2147483649",
        "4294967296",
        "9223372036854775809L",
        "0x1_0000_0000",
        "040000000000",
        "0x1_0000_0000_0000_0000L",
        "99999999999999999999999999999999999999999999",
    ] {
        assert_eq!(
            codes(big),
            vec![diagnostic_codes::INTEGER_TOO_LARGE],
            "{big:?} should be too large"
        );
    }
}

#[test]
fn test_member_access_on_literal_keeps_dot() {
    assert_eq!(
        kinds("a[1].length"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::OpenBracketToken,
            SyntaxKind::IntegerLiteral,
            SyntaxKind::CloseBracketToken,
            SyntaxKind::DotToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_string_and_char_literals() {
    let tokens: Vec<Token> = tokenize(r#""a\"b\n" 'c' '\'' '\u0041' '\101'"#).collect();
    assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].text, r#""a\"b\n""#);
    assert_eq!(tokens[1].kind, SyntaxKind::CharacterLiteral);
    assert_eq!(tokens[2].kind, SyntaxKind::CharacterLiteral);
    assert_eq!(tokens[3].text, "'A'");
    assert_eq!(tokens[4].kind, SyntaxKind::CharacterLiteral);
    assert!(codes(r#""a\"b\n" 'c' '\'' '\u0041' '\101'"#).is_empty());
}

#[test]
fn test_literal_errors() {
    assert_eq!(codes("\"abc\nx"), vec![diagnostic_codes::UNTERMINATED_STRING_LITERAL]);
    assert_eq!(codes("\"abc"), vec![diagnostic_codes::UNTERMINATED_STRING_LITERAL]);
    assert_eq!(codes("''"), vec![diagnostic_codes::EMPTY_CHAR_LITERAL]);
    assert_eq!(codes("'ab'"), vec![diagnostic_codes::UNCLOSED_CHAR_LITERAL_MULTIPLE]);
    assert_eq!(codes("'a"), vec![diagnostic_codes::UNTERMINATED_CHAR_LITERAL]);
    assert_eq!(codes("\"\\q\""), vec![diagnostic_codes::ILLEGAL_ESCAPE_CHARACTER]);
    assert_eq!(codes("/* never closed"), vec![diagnostic_codes::UNTERMINATED_COMMENT]);
}

#[test]
fn test_invalid_character_yields_unknown_token_and_one_diagnostic() {
    let source = "int x = 1 # ;";
    let mut tokens = tokenize(source);
    let kinds: Vec<SyntaxKind> = tokens.by_ref().map(|t| t.kind).collect();
    assert!(kinds.contains(&SyntaxKind::Unknown));
    assert_eq!(kinds.last(), Some(&SyntaxKind::EndOfFileToken));
    let diags = tokens.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, diagnostic_codes::INVALID_CHARACTER);
    assert_eq!(diags[0].start, 10);
    assert_eq!(diags[0].length, 1);
    assert_eq!(diags[0].message, "illegal character: '#'");
}

#[test]
fn test_unicode_identifiers() {
    let tokens: Vec<Token> = tokenize("int größe = 1;").collect();
    assert_eq!(tokens[1].kind, SyntaxKind::Identifier);
    assert_eq!(tokens[1].text, "größe");
}

#[test]
fn test_unicode_escaped_keyword() {
    // \u0063lass is `class`
    assert_eq!(kinds("\\u0063lass A {}")[0], SyntaxKind::ClassKeyword);
}

#[test]
fn test_generic_close_is_two_tokens() {
    assert_eq!(
        kinds("List<List<String>>"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::GreaterThanToken,
        ]
    );
}

#[test]
fn test_java8_tokens_are_scanned() {
    assert_eq!(
        kinds("x -> y :: z"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::MinusGreaterThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonColonToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_compound_operators() {
    assert_eq!(
        kinds("a <<= b && c || d != e"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::LessThanLessThanEqualsToken,
            SyntaxKind::Identifier,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::Identifier,
            SyntaxKind::BarBarToken,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::Identifier,
        ]
    );
}
