use serde::Serialize;

use crate::Span;

use super::{
    ast::{Expr, Ident},
    statements::Block,
    types::TypeHint,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NumberValue {
    Int(i64),
    /// Integer literals above `i64::MAX`, up to `u64::MAX`
    UInt(u64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberExpr {
    pub value: NumberValue,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StringStyle {
    Double,
    Single,
    Triple,
    Raw,
    Backtick,
    /// An unquoted word, such as a long-flag value
    Bare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringExpr {
    pub value: String,
    pub style: StringStyle,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolExpr {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullExpr {
    pub span: Span,
}

/// `$name`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableExpr {
    pub ident: Ident,
    pub span: Span,
}

/// `$env.NAME`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvVariableExpr {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpecialVariable {
    It,
    Underscore,
    Err,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialVariableExpr {
    pub variable: SpecialVariable,
    pub span: Span,
}

/// A bare identifier used as a value, e.g. the callee of `add(1, 2)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolExpr {
    pub ident: Ident,
    pub builtin: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    NullCoalesce,
    Or,
    And,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    RegexMatch,
    RegexNotMatch,
    In,
    Add,
    Subtract,
    Concat,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixExpr {
    pub operator: UnaryOp,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentExpr {
    pub assignee: Box<Expr>,
    pub operator: AssignOp,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

/// `object.property`; the property is not a bindable name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: String,
    pub property_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeExpr {
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    pub inclusive: bool,
    pub span: Span,
}

/// Pipe edge labels. Kept distinct; evaluation tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipeOp {
    /// `|`
    Value,
    /// `|>`
    Append,
    /// `|?`
    NullSafe,
    /// `|!`
    ErrorPropagating,
}

/// Stages joined by pipes, where at least one stage is not a command.
/// `pipes[i]` joins `stages[i]` and `stages[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineExpr {
    pub stages: Vec<Expr>,
    pub pipes: Vec<PipeOp>,
    pub span: Span,
}

/// `name arg… | name arg…`: every stage is a command invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandExpr {
    pub stages: Vec<CommandStage>,
    pub pipes: Vec<PipeOp>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandStage {
    pub name: Ident,
    pub builtin: bool,
    pub arguments: Vec<Argument>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Argument {
    Positional(Expr),
    Flag(FlagArgument),
    /// Adjacent tokens taken verbatim, e.g. `/tmp/*.txt`.
    Word(WordArgument),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagArgument {
    /// Flag name without the leading dashes.
    pub name: String,
    pub long: bool,
    pub value: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordArgument {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub key: String,
    pub key_span: Span,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordExpr {
    pub fields: Vec<RecordField>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: Ident,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Expr>,
    /// `...$rest`
    pub rest: bool,
    pub span: Span,
}

/// `{ |params| statements }` or `{ statements }` used as a value.
/// `params` is `None` when no `|…|` list was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosureExpr {
    pub params: Option<Vec<Parameter>>,
    pub body: Block,
    pub span: Span,
}

/// `|params| -> type { block }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaExpr {
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeHint>,
    pub body: Block,
    pub span: Span,
}

/// A braced statement list in statement position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockExpr {
    pub block: Block,
    pub span: Span,
}

/// `$( … )`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSubstitutionExpr {
    pub body: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessDirection {
    /// `<( … )`
    Input,
    /// `>( … )`
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSubstitutionExpr {
    pub direction: ProcessDirection,
    pub body: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BraceExpansion {
    /// `{a,b,c}`
    List(Vec<WordArgument>),
    /// `{1..5}` / `{1..=5}`
    Range { start: i64, end: i64, inclusive: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BraceExpansionExpr {
    pub expansion: BraceExpansion,
    pub span: Span,
}

/// A parenthesized expression; kept so spans stay contiguous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}
