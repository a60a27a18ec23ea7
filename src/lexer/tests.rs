//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers, floats, radix forms)
//! - The string literal forms and escape processing
//! - Variables, special variables and flags
//! - Operators, pipes and punctuation
//! - Comments and terminators
//! - Invalid input

use proptest::prelude::*;

use super::{
    lexer::{describe_invalid, string_value, tokenize, unescape},
    tokens::{is_builtin_command, TokenKind},
};
use crate::errors::errors::ErrorImpl;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).iter().map(|t| t.kind).collect()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = tokenize("let const set fn macro alias object enum test use from import source as");

    assert_eq!(tokens[0].kind, TokenKind::Let);
    assert_eq!(tokens[1].kind, TokenKind::Const);
    assert_eq!(tokens[2].kind, TokenKind::Set);
    assert_eq!(tokens[3].kind, TokenKind::Fn);
    assert_eq!(tokens[4].kind, TokenKind::Macro);
    assert_eq!(tokens[5].kind, TokenKind::Alias);
    assert_eq!(tokens[6].kind, TokenKind::Object);
    assert_eq!(tokens[7].kind, TokenKind::Enum);
    assert_eq!(tokens[8].kind, TokenKind::Test);
    assert_eq!(tokens[9].kind, TokenKind::Use);
    assert_eq!(tokens[10].kind, TokenKind::From);
    assert_eq!(tokens[11].kind, TokenKind::Import);
    assert_eq!(tokens[12].kind, TokenKind::Source);
    assert_eq!(tokens[13].kind, TokenKind::As);
    assert_eq!(tokens[14].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_control_flow_keywords() {
    assert_eq!(
        kinds("if elif else for in while loop match try catch return break continue"),
        vec![
            TokenKind::If,
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::In,
            TokenKind::While,
            TokenKind::Loop,
            TokenKind::Match,
            TokenKind::Try,
            TokenKind::Catch,
            TokenKind::Return,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let tokens = tokenize("foo bar baz_123 _underscore CamelCase");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "CamelCase");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let tokens = tokenize("42 3.14 0 1e6 2.5e-3 0xFF_FF 0b1010_0001 0o755");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[3].kind, TokenKind::Float);
    assert_eq!(tokens[3].value, "1e6");
    assert_eq!(tokens[4].kind, TokenKind::Float);
    assert_eq!(tokens[4].value, "2.5e-3");
    assert_eq!(tokens[5].kind, TokenKind::Integer);
    assert_eq!(tokens[5].value, "0xFF_FF");
    assert_eq!(tokens[6].value, "0b1010_0001");
    assert_eq!(tokens[7].value, "0o755");
    assert_eq!(tokens[8].kind, TokenKind::EOF);
}

#[test]
fn test_float_requires_fraction_digits() {
    // `1..5` is a range, not the float `1.` followed by `.5`
    assert_eq!(
        kinds("1..5"),
        vec![TokenKind::Integer, TokenKind::DotDot, TokenKind::Integer, TokenKind::EOF]
    );
    assert_eq!(
        kinds("1..=5"),
        vec![TokenKind::Integer, TokenKind::DotDotEquals, TokenKind::Integer, TokenKind::EOF]
    );
}

#[test]
fn test_digits_after_member_dot_are_not_a_float() {
    assert_eq!(
        kinds("$t.0.1"),
        vec![
            TokenKind::Variable,
            TokenKind::Dot,
            TokenKind::Integer,
            TokenKind::Dot,
            TokenKind::Integer,
            TokenKind::EOF
        ]
    );
    // A range end is still a float
    assert_eq!(
        kinds("1..2.5"),
        vec![TokenKind::Integer, TokenKind::DotDot, TokenKind::Float, TokenKind::EOF]
    );
}

#[test]
fn test_tokenize_strings() {
    let tokens = tokenize(r#""hello" 'world' r"raw\n" `tick`"#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(string_value(&tokens[0]), "hello");
    assert_eq!(tokens[1].kind, TokenKind::SingleString);
    assert_eq!(string_value(&tokens[1]), "world");
    assert_eq!(tokens[2].kind, TokenKind::RawString);
    assert_eq!(string_value(&tokens[2]), "raw\\n");
    assert_eq!(tokens[3].kind, TokenKind::BacktickString);
    assert_eq!(string_value(&tokens[3]), "tick");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_triple_quoted_string_wins_over_empty_string() {
    let tokens = tokenize(r#""""she said "hi" and ""ok"" """"#);

    assert_eq!(tokens[0].kind, TokenKind::TripleString);
    assert_eq!(string_value(&tokens[0]), r#"she said "hi" and ""ok"" "#);
    assert_eq!(tokens[1].kind, TokenKind::EOF);
}

#[test]
fn test_empty_string() {
    let tokens = tokenize(r#""" x"#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(string_value(&tokens[0]), "");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_tokenize_string_escapes() {
    let tokens = tokenize(r#""hello\nworld" 'tab\there' "backslash\\" "hex\x41" "quote\"test" "\u{1F600}""#);

    assert_eq!(string_value(&tokens[0]), "hello\nworld");
    assert_eq!(string_value(&tokens[1]), "tab\there");
    assert_eq!(string_value(&tokens[2]), "backslash\\");
    assert_eq!(string_value(&tokens[3]), "hexA");
    assert_eq!(string_value(&tokens[4]), "quote\"test");
    assert_eq!(string_value(&tokens[5]), "\u{1F600}");
}

#[test]
fn test_unescape_keeps_unknown_escapes() {
    assert_eq!(unescape(r"\q"), "\\q");
    assert_eq!(unescape(r"end\"), "end\\");
    assert_eq!(unescape(r"\xZZ"), "\\xZZ");
}

#[test]
fn test_tokenize_variables() {
    let tokens = tokenize("$name $env.HOME $it $_ $err $item $_tmp $(");

    assert_eq!(tokens[0].kind, TokenKind::Variable);
    assert_eq!(tokens[0].value, "$name");
    assert_eq!(tokens[1].kind, TokenKind::EnvVariable);
    assert_eq!(tokens[1].value, "$env.HOME");
    assert_eq!(tokens[2].kind, TokenKind::SpecialVariable);
    assert_eq!(tokens[3].kind, TokenKind::SpecialVariable);
    assert_eq!(tokens[4].kind, TokenKind::SpecialVariable);
    assert_eq!(tokens[5].kind, TokenKind::Variable);
    assert_eq!(tokens[5].value, "$item");
    assert_eq!(tokens[6].kind, TokenKind::Variable);
    assert_eq!(tokens[7].kind, TokenKind::DollarParen);
}

#[test]
fn test_tokenize_flags_in_argument_position() {
    let tokens = tokenize("ls -la --all --depth=2");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::ShortFlag);
    assert_eq!(tokens[1].value, "-la");
    assert_eq!(tokens[2].kind, TokenKind::LongFlag);
    assert_eq!(tokens[2].value, "--all");
    assert_eq!(tokens[3].kind, TokenKind::LongFlag);
    assert_eq!(tokens[3].value, "--depth");
    assert_eq!(tokens[4].kind, TokenKind::Assignment);
    assert_eq!(tokens[5].kind, TokenKind::Integer);
}

#[test]
fn test_minus_is_not_a_flag_after_operand() {
    assert_eq!(
        kinds("$a-b"),
        vec![TokenKind::Variable, TokenKind::Dash, TokenKind::Identifier, TokenKind::EOF]
    );
    assert_eq!(
        kinds("$a - $b"),
        vec![TokenKind::Variable, TokenKind::Dash, TokenKind::Variable, TokenKind::EOF]
    );
}

#[test]
fn test_negative_number_is_dash_and_number() {
    assert_eq!(
        kinds("echo -5"),
        vec![TokenKind::Identifier, TokenKind::Dash, TokenKind::Integer, TokenKind::EOF]
    );
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / % == != < > <= >= = && || ?? =~ !~ ++ ! ->"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::NullCoalesce,
            TokenKind::RegexMatch,
            TokenKind::RegexNotMatch,
            TokenKind::PlusPlus,
            TokenKind::Not,
            TokenKind::Arrow,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_pipes() {
    assert_eq!(
        kinds("a | b |> c |? d |! e"),
        vec![
            TokenKind::Identifier,
            TokenKind::Pipe,
            TokenKind::Identifier,
            TokenKind::PipeAppend,
            TokenKind::Identifier,
            TokenKind::PipeNullSafe,
            TokenKind::Identifier,
            TokenKind::PipeError,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] . , : #{ => ... @ ~"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::HashCurly,
            TokenKind::FatArrow,
            TokenKind::Ellipsis,
            TokenKind::At,
            TokenKind::Tilde,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_process_substitution() {
    assert_eq!(
        kinds("diff <(ls) >(cat)"),
        vec![
            TokenKind::Identifier,
            TokenKind::ProcessIn,
            TokenKind::Identifier,
            TokenKind::CloseParen,
            TokenKind::ProcessOut,
            TokenKind::Identifier,
            TokenKind::CloseParen,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_terminators_are_tokens() {
    let tokens = tokenize("a; b\nc\r\nd");

    assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    assert_eq!(tokens[3].kind, TokenKind::Newline);
    assert_eq!(tokens[5].kind, TokenKind::Newline);
    assert_eq!(tokens[5].value, "\r\n");
    assert_eq!(tokens[6].line, 3);
}

#[test]
fn test_line_comments_are_skipped() {
    assert_eq!(
        kinds("a # comment ## still comment\nb"),
        vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_hash_curly_at_line_start_is_a_comment() {
    assert_eq!(
        kinds("#{ note }\necho hi"),
        vec![
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::EOF
        ]
    );
    assert_eq!(
        kinds("echo hi #{a: 1}"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EOF]
    );
}

#[test]
fn test_hash_curly_opens_a_set_after_an_operator() {
    for source in ["let s = #{1}", "f(#{1})", "[#{1}]", "$a | #{1}", "return #{1}"] {
        assert!(
            kinds(source).contains(&TokenKind::HashCurly),
            "no set opener in {:?}",
            source
        );
    }
}

#[test]
fn test_block_comment_with_interior_hashes() {
    let tokens = tokenize("a ### one # two ## three\nfour ### b");

    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].value, "b");
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_line_continuation() {
    assert_eq!(
        kinds("ls \\\n  -la"),
        vec![TokenKind::Identifier, TokenKind::ShortFlag, TokenKind::EOF]
    );
}

#[test]
fn test_spans_and_lines() {
    let tokens = tokenize("let x\n  = 10");

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[3].span.start.0, 8);
    assert_eq!(tokens[3].line, 2);
    assert_eq!(tokens[4].value, "10");
    assert_eq!(tokens[4].span.end.0, 12);
}

#[test]
fn test_invalid_character_does_not_abort() {
    let tokens = tokenize("a & b");

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::Invalid);
    assert_eq!(tokens[1].value, "&");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(
        describe_invalid(&tokens[1]),
        ErrorImpl::UnrecognisedToken { token: "&".to_string() }
    );
}

#[test]
fn test_unterminated_string_is_invalid() {
    let tokens = tokenize("echo \"never closed\nnext");

    assert_eq!(tokens[1].kind, TokenKind::Invalid);
    assert_eq!(
        describe_invalid(&tokens[1]),
        ErrorImpl::UnterminatedString { quote: "\"".to_string() }
    );
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_unterminated_block_comment_is_invalid() {
    let tokens = tokenize("a ### open forever");

    assert_eq!(tokens[1].kind, TokenKind::Invalid);
    assert_eq!(describe_invalid(&tokens[1]), ErrorImpl::UnterminatedComment);
}

#[test]
fn test_builtin_vocabulary() {
    assert!(is_builtin_command("ls"));
    assert!(is_builtin_command("where"));
    assert!(is_builtin_command("to_json"));
    assert!(!is_builtin_command("my_helper"));
    // keywords are not commands
    assert!(!is_builtin_command("test"));
}

proptest! {
    #[test]
    fn tokenize_is_total_and_covers_source(source in "\\PC{0,64}") {
        let tokens = tokenize(&source);

        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EOF));

        let mut previous_end = 0;
        for token in &tokens {
            prop_assert!(token.span.start.0 >= previous_end);
            prop_assert_eq!(token.span.slice(&source), token.value.as_str());
            previous_end = token.span.end.0;
        }
    }
}
