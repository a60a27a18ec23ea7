use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

use crate::{Position, Span};

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    span: Span,
}

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    LexError,
    SyntaxError,
    UnresolvedReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, span: Span) -> Self {
        Error {
            internal_error: error_impl,
            span,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.span.start
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnterminatedString { .. }
            | ErrorImpl::UnterminatedComment => ErrorCategory::LexError,
            ErrorImpl::UnresolvedReference { .. } => ErrorCategory::UnresolvedReference,
            // Ambiguous braces are reported as ordinary syntax errors
            _ => ErrorCategory::SyntaxError,
        }
    }

    pub fn severity(&self) -> Severity {
        match self.category() {
            ErrorCategory::UnresolvedReference => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedString { .. } => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::ExpectedExpression { .. } => "ExpectedExpression",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::AmbiguousBrace { .. } => "AmbiguousBrace",
            ErrorImpl::DuplicateRestPattern => "DuplicateRestPattern",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::MisplacedDecorator { .. } => "MisplacedDecorator",
            ErrorImpl::UnresolvedReference { .. } => "UnresolvedReference",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedString { quote } => ErrorTip::Suggestion(format!(
                "String opened with `{}` is never closed",
                quote
            )),
            ErrorImpl::UnterminatedComment => ErrorTip::Suggestion(String::from(
                "Block comment opened with `###` is never closed",
            )),
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a newline or `;`?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::ExpectedExpression { after } => {
                ErrorTip::Suggestion(format!("Expected an expression after `{}`", after))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::AmbiguousBrace { message } => ErrorTip::Suggestion(format!(
                "Braces are neither a record nor a block: {}",
                message
            )),
            ErrorImpl::DuplicateRestPattern => ErrorTip::Suggestion(String::from(
                "A list pattern may contain at most one `...rest` element",
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables, names, fields and indexes can be assigned to",
            )),
            ErrorImpl::NestingTooDeep { limit } => ErrorTip::Suggestion(format!(
                "Groups, blocks and patterns may nest at most {} levels deep",
                limit
            )),
            ErrorImpl::MisplacedDecorator { token } => ErrorTip::Suggestion(format!(
                "Decorators must precede a definition, found `{}`",
                token
            )),
            ErrorImpl::UnresolvedReference { name } => {
                ErrorTip::Suggestion(format!("`{}` is not defined in any enclosing scope", name))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated string starting with {quote:?}")]
    UnterminatedString { quote: String },
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("expected expression after {after:?}")]
    ExpectedExpression { after: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("ambiguous braces: {message}")]
    AmbiguousBrace { message: String },
    #[error("more than one rest element in list pattern")]
    DuplicateRestPattern,
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("decorator not followed by a definition: {token:?}")]
    MisplacedDecorator { token: String },
    #[error("unresolved reference {name:?}")]
    UnresolvedReference { name: String },
}
