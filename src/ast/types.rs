//! Surface type-hint syntax.
//!
//! Type hints are parsed and kept in the tree but never checked:
//!
//! - Named types (`int`, `string`, `Dog`)
//! - Generic applications (`list<string>`, `map<string, int>`)
//! - Array shorthand (`int[]`)
//! - Optional shorthand (`string?`)
//! - Function types (`fn(int, int) -> int`)

use serde::Serialize;

use crate::Span;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeHint {
    Named(NamedType),
    Array(ArrayType),
    Optional(OptionalType),
    Function(FunctionType),
}

impl TypeHint {
    pub fn span(&self) -> Span {
        match self {
            TypeHint::Named(named) => named.span,
            TypeHint::Array(array) => array.span,
            TypeHint::Optional(optional) => optional.span,
            TypeHint::Function(function) => function.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedType {
    pub name: String,
    pub arguments: Vec<TypeHint>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayType {
    pub underlying: Box<TypeHint>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionalType {
    pub underlying: Box<TypeHint>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionType {
    pub parameters: Vec<TypeHint>,
    pub return_type: Option<Box<TypeHint>>,
    pub span: Span,
}
