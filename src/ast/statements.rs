use serde::Serialize;

use crate::Span;

use super::{
    ast::{Expr, Ident, Stmt},
    expressions::Parameter,
    patterns::Pattern,
    types::TypeHint,
};

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.statements.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclKeyword {
    Let,
    Const,
    Set,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDeclStmt {
    pub keyword: DeclKeyword,
    pub name: Ident,
    pub explicit_type: Option<TypeHint>,
    pub value: Expr,
    pub span: Span,
}

/// `@name` or `@name(args)` in front of a definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decorator {
    pub name: Ident,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FnDeclStmt {
    pub decorators: Vec<Decorator>,
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeHint>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacroParamStyle {
    /// `macro name($a, $b) { }`
    Parenthesized,
    /// `macro name $a $b { }`
    ShellStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroDeclStmt {
    pub decorators: Vec<Decorator>,
    pub name: Ident,
    pub style: MacroParamStyle,
    pub parameters: Vec<Parameter>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasStmt {
    pub decorators: Vec<Decorator>,
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectField {
    pub name: Ident,
    pub type_hint: Option<TypeHint>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectMember {
    Field(ObjectField),
    Method(FnDeclStmt),
}

impl ObjectMember {
    pub fn span(&self) -> Span {
        match self {
            ObjectMember::Field(field) => field.span,
            ObjectMember::Method(method) => method.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDeclStmt {
    pub decorators: Vec<Decorator>,
    pub name: Ident,
    pub members: Vec<ObjectMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumVariant {
    pub name: Ident,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDeclStmt {
    pub decorators: Vec<Decorator>,
    pub name: Ident,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStmt {
    pub name: String,
    pub name_span: Span,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElifBranch {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Block,
    pub elif_branches: Vec<ElifBranch>,
    pub else_body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub variables: Vec<Ident>,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStmt {
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArmBody {
    Block(Block),
    Expression(Expr),
}

impl ArmBody {
    pub fn span(&self) -> Span {
        match self {
            ArmBody::Block(block) => block.span,
            ArmBody::Expression(expr) => expr.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: ArmBody,
    pub span: Span,
}

/// Arms are kept in source order; the first satisfied arm fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    pub binding: Option<Ident>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TryStmt {
    pub body: Block,
    pub catch: Option<CatchClause>,
    pub span: Span,
}

/// A dotted module path (`a.b.c`) or a quoted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulePath {
    pub segments: Vec<String>,
    pub quoted: bool,
    pub span: Span,
}

impl ModulePath {
    /// The name a `use` without `as` binds: the last segment, minus any
    /// file extension for quoted paths.
    pub fn default_binding_name(&self) -> Option<String> {
        let last = self.segments.last()?;
        let name = if self.quoted {
            let file = last.rsplit('/').next().unwrap_or(last);
            file.split('.').next().unwrap_or(file)
        } else {
            last.as_str()
        };

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UseStmt {
    pub path: ModulePath,
    pub alias: Option<Ident>,
    /// Binds `alias`, or the path's default name when no alias is written.
    pub binding: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportItem {
    pub name: Ident,
    pub alias: Option<Ident>,
    pub span: Span,
}

impl ImportItem {
    /// The name bound in the importing module.
    pub fn local_name(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromImportStmt {
    pub module: ModulePath,
    pub items: Vec<ImportItem>,
    /// `from a import *`
    pub glob: bool,
    pub span: Span,
}

/// `source "file" (as name)?`. Loading the file is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStmt {
    pub path: String,
    pub path_span: Span,
    pub alias: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinueStmt {
    pub span: Span,
}

/// Tokens skipped while recovering from a syntax error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStmt {
    pub span: Span,
}
