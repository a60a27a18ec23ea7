//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip, Severity};
use crate::Span;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "&".to_string(),
        },
        Span::new(10, 11),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.category(), ErrorCategory::LexError);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        Span::new(42, 52),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_span().end.0, 52);
}

#[test]
fn test_unexpected_token_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
        },
        Span::new(0, 1),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.category(), ErrorCategory::SyntaxError);
    assert!(error.is_error());
}

#[test]
fn test_ambiguous_brace_is_a_syntax_error() {
    let error = Error::new(
        ErrorImpl::AmbiguousBrace {
            message: "unclosed".to_string(),
        },
        Span::new(0, 1),
    );

    assert_eq!(error.category(), ErrorCategory::SyntaxError);
    assert_eq!(error.severity(), Severity::Error);
}

#[test]
fn test_unresolved_reference_is_a_warning() {
    let error = Error::new(
        ErrorImpl::UnresolvedReference {
            name: "foo".to_string(),
        },
        Span::new(3, 7),
    );

    assert_eq!(error.get_error_name(), "UnresolvedReference");
    assert_eq!(error.category(), ErrorCategory::UnresolvedReference);
    assert_eq!(error.severity(), Severity::Warning);
    assert!(!error.is_error());
}

#[test]
fn test_unterminated_forms_are_lex_errors() {
    let string = Error::new(
        ErrorImpl::UnterminatedString {
            quote: "\"".to_string(),
        },
        Span::new(0, 4),
    );
    let comment = Error::new(ErrorImpl::UnterminatedComment, Span::new(0, 3));

    assert_eq!(string.category(), ErrorCategory::LexError);
    assert_eq!(comment.category(), ErrorCategory::LexError);
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "&".to_string(),
        },
        Span::new(0, 1),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::ExpectedExpression {
            after: "=".to_string(),
        },
        Span::new(6, 7),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(msg) => assert!(msg.contains("after `=`")),
        ErrorTip::None => panic!("Expected suggestion"),
    }
}

#[test]
fn test_error_display() {
    let error = Error::new(ErrorImpl::DuplicateRestPattern, Span::new(0, 1));

    assert_eq!(
        error.to_string(),
        "more than one rest element in list pattern"
    );
    assert!(!error.get_tip().to_string().is_empty());
}
