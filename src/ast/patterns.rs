use serde::Serialize;

use crate::Span;

use super::ast::{Expr, Ident};

/// A `match` arm pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Pattern {
    Literal(LiteralPattern),
    Wildcard(WildcardPattern),
    Binding(BindingPattern),
    Record(RecordPattern),
    List(ListPattern),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Literal(p) => p.span,
            Pattern::Wildcard(p) => p.span,
            Pattern::Binding(p) => p.span,
            Pattern::Record(p) => p.span,
            Pattern::List(p) => p.span,
        }
    }
}

/// Number (possibly negative), string, boolean or null; matches by equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralPattern {
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WildcardPattern {
    pub span: Span,
}

/// `name` or `$name`: binds the scrutinee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingPattern {
    pub ident: Ident,
    pub span: Span,
}

/// `{ field, field: pattern }`, or `Type { … }` when `type_name` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPattern {
    pub type_name: Option<Ident>,
    pub fields: Vec<RecordPatternField>,
    pub span: Span,
}

/// With no `pattern` the field is shorthand and binds a variable named
/// after the key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordPatternField {
    pub key: Ident,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPattern {
    /// Positional elements, excluding the rest marker.
    pub elements: Vec<Pattern>,
    pub rest: Option<RestPattern>,
    pub span: Span,
}

/// `...name`, `...$name` or a bare `...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestPattern {
    pub binding: Option<Ident>,
    /// Number of positional elements written before the marker.
    pub position: usize,
    pub span: Span,
}
