use serde::Serialize;

use crate::{Position, Span};

use super::{expressions::*, patterns::*, statements::*, types::TypeHint};

/// Identifies a name occurrence within one parse. Binding tables refer to
/// definitions and references by this id instead of by pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

/// A name occurrence that can define or reference a binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    /// The name without any `$` sigil.
    pub name: String,
    pub span: Span,
    pub id: NodeId,
}

/// Root of the tree; owns every node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn start(&self) -> Position {
        self.span.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expression(ExpressionStmt),
    VarDecl(VarDeclStmt),
    FnDecl(FnDeclStmt),
    MacroDecl(MacroDeclStmt),
    Alias(AliasStmt),
    ObjectDecl(ObjectDeclStmt),
    EnumDecl(EnumDeclStmt),
    Test(TestStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Loop(LoopStmt),
    Match(MatchStmt),
    Try(TryStmt),
    Use(UseStmt),
    FromImport(FromImportStmt),
    Source(SourceStmt),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Error(ErrorStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expression(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::FnDecl(s) => s.span,
            Stmt::MacroDecl(s) => s.span,
            Stmt::Alias(s) => s.span,
            Stmt::ObjectDecl(s) => s.span,
            Stmt::EnumDecl(s) => s.span,
            Stmt::Test(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Loop(s) => s.span,
            Stmt::Match(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Use(s) => s.span,
            Stmt::FromImport(s) => s.span,
            Stmt::Source(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Error(s) => s.span,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Stmt::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Number(NumberExpr),
    String(StringExpr),
    Bool(BoolExpr),
    Null(NullExpr),
    Variable(VariableExpr),
    EnvVariable(EnvVariableExpr),
    SpecialVariable(SpecialVariableExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Member(MemberExpr),
    Index(IndexExpr),
    Range(RangeExpr),
    Pipeline(PipelineExpr),
    Command(CommandExpr),
    List(ListExpr),
    Record(RecordExpr),
    Tuple(TupleExpr),
    Set(SetExpr),
    Closure(ClosureExpr),
    Lambda(LambdaExpr),
    Block(BlockExpr),
    CommandSubstitution(CommandSubstitutionExpr),
    ProcessSubstitution(ProcessSubstitutionExpr),
    BraceExpansion(BraceExpansionExpr),
    Grouping(GroupingExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(e) => e.span,
            Expr::String(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Null(e) => e.span,
            Expr::Variable(e) => e.span,
            Expr::EnvVariable(e) => e.span,
            Expr::SpecialVariable(e) => e.span,
            Expr::Symbol(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Prefix(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Range(e) => e.span,
            Expr::Pipeline(e) => e.span,
            Expr::Command(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Record(e) => e.span,
            Expr::Tuple(e) => e.span,
            Expr::Set(e) => e.span,
            Expr::Closure(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::Block(e) => e.span,
            Expr::CommandSubstitution(e) => e.span,
            Expr::ProcessSubstitution(e) => e.span,
            Expr::BraceExpansion(e) => e.span,
            Expr::Grouping(e) => e.span,
        }
    }

    /// Assignment targets: variables, bare names, env variables, members
    /// and indexes.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expr::Variable(_)
                | Expr::Symbol(_)
                | Expr::EnvVariable(_)
                | Expr::Member(_)
                | Expr::Index(_)
        )
    }

    /// A pipeline stage that is a single command invocation.
    pub fn as_single_command(&self) -> Option<&CommandStage> {
        match self {
            Expr::Command(command) if command.stages.len() == 1 => command.stages.first(),
            _ => None,
        }
    }
}

/// Display/semantic node kinds consumed by the highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Program,
    Block,
    ExpressionStatement,
    VariableDeclaration,
    FunctionDefinition,
    MacroDefinition,
    AliasDefinition,
    ObjectDefinition,
    ObjectField,
    EnumDefinition,
    EnumVariant,
    TestDefinition,
    IfStatement,
    ElifClause,
    ForStatement,
    WhileStatement,
    LoopStatement,
    MatchStatement,
    MatchArm,
    TryStatement,
    CatchClause,
    UseStatement,
    FromImportStatement,
    ImportItem,
    ModulePath,
    SourceStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    Error,
    Decorator,
    Parameter,
    Identifier,
    TypeHint,
    Number,
    String,
    Boolean,
    Null,
    Variable,
    EnvVariable,
    SpecialVariable,
    Symbol,
    BuiltinSymbol,
    BinaryExpression,
    UnaryExpression,
    Assignment,
    Call,
    MemberAccess,
    Index,
    Range,
    Pipeline,
    Command,
    CommandStage,
    BuiltinCommand,
    Flag,
    Word,
    List,
    Record,
    RecordField,
    Tuple,
    Set,
    Closure,
    Lambda,
    BlockExpression,
    CommandSubstitution,
    ProcessSubstitution,
    BraceExpansion,
    Grouping,
    LiteralPattern,
    WildcardPattern,
    BindingPattern,
    RecordPattern,
    TypedRecordPattern,
    RecordPatternField,
    ListPattern,
    RestPattern,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Block => "block",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::VariableDeclaration => "variable_declaration",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::MacroDefinition => "macro_definition",
            NodeKind::AliasDefinition => "alias_definition",
            NodeKind::ObjectDefinition => "object_definition",
            NodeKind::ObjectField => "object_field",
            NodeKind::EnumDefinition => "enum_definition",
            NodeKind::EnumVariant => "enum_variant",
            NodeKind::TestDefinition => "test_definition",
            NodeKind::IfStatement => "if_statement",
            NodeKind::ElifClause => "elif_clause",
            NodeKind::ForStatement => "for_statement",
            NodeKind::WhileStatement => "while_statement",
            NodeKind::LoopStatement => "loop_statement",
            NodeKind::MatchStatement => "match_statement",
            NodeKind::MatchArm => "match_arm",
            NodeKind::TryStatement => "try_statement",
            NodeKind::CatchClause => "catch_clause",
            NodeKind::UseStatement => "use_statement",
            NodeKind::FromImportStatement => "from_import_statement",
            NodeKind::ImportItem => "import_item",
            NodeKind::ModulePath => "module_path",
            NodeKind::SourceStatement => "source_statement",
            NodeKind::ReturnStatement => "return_statement",
            NodeKind::BreakStatement => "break_statement",
            NodeKind::ContinueStatement => "continue_statement",
            NodeKind::Error => "error",
            NodeKind::Decorator => "decorator",
            NodeKind::Parameter => "parameter",
            NodeKind::Identifier => "identifier",
            NodeKind::TypeHint => "type_hint",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
            NodeKind::Variable => "variable",
            NodeKind::EnvVariable => "env_variable",
            NodeKind::SpecialVariable => "special_variable",
            NodeKind::Symbol => "symbol",
            NodeKind::BuiltinSymbol => "builtin_symbol",
            NodeKind::BinaryExpression => "binary_expression",
            NodeKind::UnaryExpression => "unary_expression",
            NodeKind::Assignment => "assignment",
            NodeKind::Call => "call",
            NodeKind::MemberAccess => "member_access",
            NodeKind::Index => "index",
            NodeKind::Range => "range",
            NodeKind::Pipeline => "pipeline",
            NodeKind::Command => "command",
            NodeKind::CommandStage => "command_stage",
            NodeKind::BuiltinCommand => "builtin_command",
            NodeKind::Flag => "flag",
            NodeKind::Word => "word",
            NodeKind::List => "list",
            NodeKind::Record => "record",
            NodeKind::RecordField => "record_field",
            NodeKind::Tuple => "tuple",
            NodeKind::Set => "set",
            NodeKind::Closure => "closure",
            NodeKind::Lambda => "lambda",
            NodeKind::BlockExpression => "block_expression",
            NodeKind::CommandSubstitution => "command_substitution",
            NodeKind::ProcessSubstitution => "process_substitution",
            NodeKind::BraceExpansion => "brace_expansion",
            NodeKind::Grouping => "grouping",
            NodeKind::LiteralPattern => "literal_pattern",
            NodeKind::WildcardPattern => "wildcard_pattern",
            NodeKind::BindingPattern => "binding_pattern",
            NodeKind::RecordPattern => "record_pattern",
            NodeKind::TypedRecordPattern => "typed_record_pattern",
            NodeKind::RecordPatternField => "record_pattern_field",
            NodeKind::ListPattern => "list_pattern",
            NodeKind::RestPattern => "rest_pattern",
        }
    }
}

/// A borrowed, uniform view over any tree node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Pattern(&'a Pattern),
    Block(&'a Block),
    Ident(&'a Ident),
    TypeHint(&'a TypeHint),
    Decorator(&'a Decorator),
    Parameter(&'a Parameter),
    ObjectMember(&'a ObjectMember),
    EnumVariant(&'a EnumVariant),
    ElifBranch(&'a ElifBranch),
    MatchArm(&'a MatchArm),
    CatchClause(&'a CatchClause),
    ModulePath(&'a ModulePath),
    ImportItem(&'a ImportItem),
    CommandStage(&'a CommandStage),
    Argument(&'a Argument),
    RecordField(&'a RecordField),
    PatternField(&'a RecordPatternField),
    Rest(&'a RestPattern),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Program(_) => NodeKind::Program,
            NodeRef::Stmt(stmt) => match stmt {
                Stmt::Expression(_) => NodeKind::ExpressionStatement,
                Stmt::VarDecl(_) => NodeKind::VariableDeclaration,
                Stmt::FnDecl(_) => NodeKind::FunctionDefinition,
                Stmt::MacroDecl(_) => NodeKind::MacroDefinition,
                Stmt::Alias(_) => NodeKind::AliasDefinition,
                Stmt::ObjectDecl(_) => NodeKind::ObjectDefinition,
                Stmt::EnumDecl(_) => NodeKind::EnumDefinition,
                Stmt::Test(_) => NodeKind::TestDefinition,
                Stmt::If(_) => NodeKind::IfStatement,
                Stmt::For(_) => NodeKind::ForStatement,
                Stmt::While(_) => NodeKind::WhileStatement,
                Stmt::Loop(_) => NodeKind::LoopStatement,
                Stmt::Match(_) => NodeKind::MatchStatement,
                Stmt::Try(_) => NodeKind::TryStatement,
                Stmt::Use(_) => NodeKind::UseStatement,
                Stmt::FromImport(_) => NodeKind::FromImportStatement,
                Stmt::Source(_) => NodeKind::SourceStatement,
                Stmt::Return(_) => NodeKind::ReturnStatement,
                Stmt::Break(_) => NodeKind::BreakStatement,
                Stmt::Continue(_) => NodeKind::ContinueStatement,
                Stmt::Error(_) => NodeKind::Error,
            },
            NodeRef::Expr(expr) => match expr {
                Expr::Number(_) => NodeKind::Number,
                Expr::String(_) => NodeKind::String,
                Expr::Bool(_) => NodeKind::Boolean,
                Expr::Null(_) => NodeKind::Null,
                Expr::Variable(_) => NodeKind::Variable,
                Expr::EnvVariable(_) => NodeKind::EnvVariable,
                Expr::SpecialVariable(_) => NodeKind::SpecialVariable,
                Expr::Symbol(symbol) if symbol.builtin => NodeKind::BuiltinSymbol,
                Expr::Symbol(_) => NodeKind::Symbol,
                Expr::Binary(_) => NodeKind::BinaryExpression,
                Expr::Prefix(_) => NodeKind::UnaryExpression,
                Expr::Assignment(_) => NodeKind::Assignment,
                Expr::Call(_) => NodeKind::Call,
                Expr::Member(_) => NodeKind::MemberAccess,
                Expr::Index(_) => NodeKind::Index,
                Expr::Range(_) => NodeKind::Range,
                Expr::Pipeline(_) => NodeKind::Pipeline,
                Expr::Command(_) => NodeKind::Command,
                Expr::List(_) => NodeKind::List,
                Expr::Record(_) => NodeKind::Record,
                Expr::Tuple(_) => NodeKind::Tuple,
                Expr::Set(_) => NodeKind::Set,
                Expr::Closure(_) => NodeKind::Closure,
                Expr::Lambda(_) => NodeKind::Lambda,
                Expr::Block(_) => NodeKind::BlockExpression,
                Expr::CommandSubstitution(_) => NodeKind::CommandSubstitution,
                Expr::ProcessSubstitution(_) => NodeKind::ProcessSubstitution,
                Expr::BraceExpansion(_) => NodeKind::BraceExpansion,
                Expr::Grouping(_) => NodeKind::Grouping,
            },
            NodeRef::Pattern(pattern) => match pattern {
                Pattern::Literal(_) => NodeKind::LiteralPattern,
                Pattern::Wildcard(_) => NodeKind::WildcardPattern,
                Pattern::Binding(_) => NodeKind::BindingPattern,
                Pattern::Record(record) if record.type_name.is_some() => {
                    NodeKind::TypedRecordPattern
                }
                Pattern::Record(_) => NodeKind::RecordPattern,
                Pattern::List(_) => NodeKind::ListPattern,
            },
            NodeRef::Block(_) => NodeKind::Block,
            NodeRef::Ident(_) => NodeKind::Identifier,
            NodeRef::TypeHint(_) => NodeKind::TypeHint,
            NodeRef::Decorator(_) => NodeKind::Decorator,
            NodeRef::Parameter(_) => NodeKind::Parameter,
            NodeRef::ObjectMember(ObjectMember::Field(_)) => NodeKind::ObjectField,
            NodeRef::ObjectMember(ObjectMember::Method(_)) => NodeKind::FunctionDefinition,
            NodeRef::EnumVariant(_) => NodeKind::EnumVariant,
            NodeRef::ElifBranch(_) => NodeKind::ElifClause,
            NodeRef::MatchArm(_) => NodeKind::MatchArm,
            NodeRef::CatchClause(_) => NodeKind::CatchClause,
            NodeRef::ModulePath(_) => NodeKind::ModulePath,
            NodeRef::ImportItem(_) => NodeKind::ImportItem,
            NodeRef::CommandStage(stage) if stage.builtin => NodeKind::BuiltinCommand,
            NodeRef::CommandStage(_) => NodeKind::CommandStage,
            NodeRef::Argument(Argument::Positional(expr)) => NodeRef::Expr(expr).kind(),
            NodeRef::Argument(Argument::Flag(_)) => NodeKind::Flag,
            NodeRef::Argument(Argument::Word(_)) => NodeKind::Word,
            NodeRef::RecordField(_) => NodeKind::RecordField,
            NodeRef::PatternField(_) => NodeKind::RecordPatternField,
            NodeRef::Rest(_) => NodeKind::RestPattern,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            NodeRef::Program(program) => program.span,
            NodeRef::Stmt(stmt) => stmt.span(),
            NodeRef::Expr(expr) => expr.span(),
            NodeRef::Pattern(pattern) => pattern.span(),
            NodeRef::Block(block) => block.span,
            NodeRef::Ident(ident) => ident.span,
            NodeRef::TypeHint(hint) => hint.span(),
            NodeRef::Decorator(decorator) => decorator.span,
            NodeRef::Parameter(parameter) => parameter.span,
            NodeRef::ObjectMember(member) => member.span(),
            NodeRef::EnumVariant(variant) => variant.span,
            NodeRef::ElifBranch(branch) => branch.span,
            NodeRef::MatchArm(arm) => arm.span,
            NodeRef::CatchClause(clause) => clause.span,
            NodeRef::ModulePath(path) => path.span,
            NodeRef::ImportItem(item) => item.span,
            NodeRef::CommandStage(stage) => stage.span,
            NodeRef::Argument(Argument::Positional(expr)) => expr.span(),
            NodeRef::Argument(Argument::Flag(flag)) => flag.span,
            NodeRef::Argument(Argument::Word(word)) => word.span,
            NodeRef::RecordField(field) => field.span,
            NodeRef::PatternField(field) => field.span,
            NodeRef::Rest(rest) => rest.span,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = vec![];

        match *self {
            NodeRef::Program(program) => out.extend(program.statements.iter().map(NodeRef::Stmt)),
            NodeRef::Block(block) => out.extend(block.statements.iter().map(NodeRef::Stmt)),
            NodeRef::Stmt(stmt) => stmt_children(stmt, &mut out),
            NodeRef::Expr(expr) => expr_children(expr, &mut out),
            NodeRef::Pattern(pattern) => pattern_children(pattern, &mut out),
            NodeRef::Ident(_) => {}
            NodeRef::TypeHint(_) => {}
            NodeRef::Decorator(decorator) => {
                out.push(NodeRef::Ident(&decorator.name));
                out.extend(decorator.arguments.iter().map(NodeRef::Expr));
            }
            NodeRef::Parameter(parameter) => {
                out.push(NodeRef::Ident(&parameter.name));
                if let Some(hint) = &parameter.type_hint {
                    out.push(NodeRef::TypeHint(hint));
                }
                if let Some(default) = &parameter.default {
                    out.push(NodeRef::Expr(default));
                }
            }
            NodeRef::ObjectMember(ObjectMember::Field(field)) => {
                out.push(NodeRef::Ident(&field.name));
                if let Some(hint) = &field.type_hint {
                    out.push(NodeRef::TypeHint(hint));
                }
                if let Some(default) = &field.default {
                    out.push(NodeRef::Expr(default));
                }
            }
            NodeRef::ObjectMember(ObjectMember::Method(method)) => fn_children(method, &mut out),
            NodeRef::EnumVariant(variant) => {
                out.push(NodeRef::Ident(&variant.name));
                if let Some(value) = &variant.value {
                    out.push(NodeRef::Expr(value));
                }
            }
            NodeRef::ElifBranch(branch) => {
                out.push(NodeRef::Expr(&branch.condition));
                out.push(NodeRef::Block(&branch.body));
            }
            NodeRef::MatchArm(arm) => {
                out.push(NodeRef::Pattern(&arm.pattern));
                if let Some(guard) = &arm.guard {
                    out.push(NodeRef::Expr(guard));
                }
                match &arm.body {
                    ArmBody::Block(block) => out.push(NodeRef::Block(block)),
                    ArmBody::Expression(expr) => out.push(NodeRef::Expr(expr)),
                }
            }
            NodeRef::CatchClause(clause) => {
                if let Some(binding) = &clause.binding {
                    out.push(NodeRef::Ident(binding));
                }
                out.push(NodeRef::Block(&clause.body));
            }
            NodeRef::ModulePath(_) => {}
            NodeRef::ImportItem(item) => {
                out.push(NodeRef::Ident(&item.name));
                if let Some(alias) = &item.alias {
                    out.push(NodeRef::Ident(alias));
                }
            }
            NodeRef::CommandStage(stage) => {
                out.push(NodeRef::Ident(&stage.name));
                out.extend(stage.arguments.iter().map(NodeRef::Argument));
            }
            NodeRef::Argument(Argument::Positional(expr)) => expr_children(expr, &mut out),
            NodeRef::Argument(Argument::Flag(flag)) => {
                if let Some(value) = &flag.value {
                    out.push(NodeRef::Expr(value));
                }
            }
            NodeRef::Argument(Argument::Word(_)) => {}
            NodeRef::RecordField(field) => out.push(NodeRef::Expr(&field.value)),
            NodeRef::PatternField(field) => {
                out.push(NodeRef::Ident(&field.key));
                if let Some(pattern) = &field.pattern {
                    out.push(NodeRef::Pattern(pattern));
                }
            }
            NodeRef::Rest(rest) => {
                if let Some(binding) = &rest.binding {
                    out.push(NodeRef::Ident(binding));
                }
            }
        }

        out
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn walk(&self, visit: &mut dyn FnMut(NodeRef<'a>)) {
        visit(*self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

fn fn_children<'a>(decl: &'a FnDeclStmt, out: &mut Vec<NodeRef<'a>>) {
    out.extend(decl.decorators.iter().map(NodeRef::Decorator));
    out.push(NodeRef::Ident(&decl.name));
    out.extend(decl.parameters.iter().map(NodeRef::Parameter));
    if let Some(hint) = &decl.return_type {
        out.push(NodeRef::TypeHint(hint));
    }
    out.push(NodeRef::Block(&decl.body));
}

fn stmt_children<'a>(stmt: &'a Stmt, out: &mut Vec<NodeRef<'a>>) {
    match stmt {
        Stmt::Expression(s) => out.push(NodeRef::Expr(&s.expression)),
        Stmt::VarDecl(s) => {
            out.push(NodeRef::Ident(&s.name));
            if let Some(hint) = &s.explicit_type {
                out.push(NodeRef::TypeHint(hint));
            }
            out.push(NodeRef::Expr(&s.value));
        }
        Stmt::FnDecl(s) => fn_children(s, out),
        Stmt::MacroDecl(s) => {
            out.extend(s.decorators.iter().map(NodeRef::Decorator));
            out.push(NodeRef::Ident(&s.name));
            out.extend(s.parameters.iter().map(NodeRef::Parameter));
            out.push(NodeRef::Block(&s.body));
        }
        Stmt::Alias(s) => {
            out.extend(s.decorators.iter().map(NodeRef::Decorator));
            out.push(NodeRef::Ident(&s.name));
            out.push(NodeRef::Expr(&s.value));
        }
        Stmt::ObjectDecl(s) => {
            out.extend(s.decorators.iter().map(NodeRef::Decorator));
            out.push(NodeRef::Ident(&s.name));
            out.extend(s.members.iter().map(NodeRef::ObjectMember));
        }
        Stmt::EnumDecl(s) => {
            out.extend(s.decorators.iter().map(NodeRef::Decorator));
            out.push(NodeRef::Ident(&s.name));
            out.extend(s.variants.iter().map(NodeRef::EnumVariant));
        }
        Stmt::Test(s) => out.push(NodeRef::Block(&s.body)),
        Stmt::If(s) => {
            out.push(NodeRef::Expr(&s.condition));
            out.push(NodeRef::Block(&s.body));
            out.extend(s.elif_branches.iter().map(NodeRef::ElifBranch));
            if let Some(else_body) = &s.else_body {
                out.push(NodeRef::Block(else_body));
            }
        }
        Stmt::For(s) => {
            out.extend(s.variables.iter().map(NodeRef::Ident));
            out.push(NodeRef::Expr(&s.iterable));
            out.push(NodeRef::Block(&s.body));
        }
        Stmt::While(s) => {
            out.push(NodeRef::Expr(&s.condition));
            out.push(NodeRef::Block(&s.body));
        }
        Stmt::Loop(s) => out.push(NodeRef::Block(&s.body)),
        Stmt::Match(s) => {
            out.push(NodeRef::Expr(&s.scrutinee));
            out.extend(s.arms.iter().map(NodeRef::MatchArm));
        }
        Stmt::Try(s) => {
            out.push(NodeRef::Block(&s.body));
            if let Some(catch) = &s.catch {
                out.push(NodeRef::CatchClause(catch));
            }
        }
        Stmt::Use(s) => {
            out.push(NodeRef::ModulePath(&s.path));
            if let Some(alias) = &s.alias {
                out.push(NodeRef::Ident(alias));
            }
        }
        Stmt::FromImport(s) => {
            out.push(NodeRef::ModulePath(&s.module));
            out.extend(s.items.iter().map(NodeRef::ImportItem));
        }
        Stmt::Source(s) => {
            if let Some(alias) = &s.alias {
                out.push(NodeRef::Ident(alias));
            }
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                out.push(NodeRef::Expr(value));
            }
        }
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Error(_) => {}
    }
}

fn expr_children<'a>(expr: &'a Expr, out: &mut Vec<NodeRef<'a>>) {
    match expr {
        Expr::Number(_)
        | Expr::String(_)
        | Expr::Bool(_)
        | Expr::Null(_)
        | Expr::EnvVariable(_)
        | Expr::SpecialVariable(_)
        | Expr::BraceExpansion(_) => {}
        Expr::Variable(e) => out.push(NodeRef::Ident(&e.ident)),
        Expr::Symbol(e) => out.push(NodeRef::Ident(&e.ident)),
        Expr::Binary(e) => {
            out.push(NodeRef::Expr(&e.left));
            out.push(NodeRef::Expr(&e.right));
        }
        Expr::Prefix(e) => out.push(NodeRef::Expr(&e.right)),
        Expr::Assignment(e) => {
            out.push(NodeRef::Expr(&e.assignee));
            out.push(NodeRef::Expr(&e.value));
        }
        Expr::Call(e) => {
            out.push(NodeRef::Expr(&e.callee));
            out.extend(e.arguments.iter().map(NodeRef::Expr));
        }
        Expr::Member(e) => out.push(NodeRef::Expr(&e.object)),
        Expr::Index(e) => {
            out.push(NodeRef::Expr(&e.object));
            out.push(NodeRef::Expr(&e.index));
        }
        Expr::Range(e) => {
            out.push(NodeRef::Expr(&e.start));
            out.push(NodeRef::Expr(&e.end));
        }
        Expr::Pipeline(e) => out.extend(e.stages.iter().map(NodeRef::Expr)),
        Expr::Command(e) => out.extend(e.stages.iter().map(NodeRef::CommandStage)),
        Expr::List(e) => out.extend(e.elements.iter().map(NodeRef::Expr)),
        Expr::Record(e) => out.extend(e.fields.iter().map(NodeRef::RecordField)),
        Expr::Tuple(e) => out.extend(e.elements.iter().map(NodeRef::Expr)),
        Expr::Set(e) => out.extend(e.elements.iter().map(NodeRef::Expr)),
        Expr::Closure(e) => {
            if let Some(params) = &e.params {
                out.extend(params.iter().map(NodeRef::Parameter));
            }
            out.push(NodeRef::Block(&e.body));
        }
        Expr::Lambda(e) => {
            out.extend(e.params.iter().map(NodeRef::Parameter));
            if let Some(hint) = &e.return_type {
                out.push(NodeRef::TypeHint(hint));
            }
            out.push(NodeRef::Block(&e.body));
        }
        Expr::Block(e) => out.push(NodeRef::Block(&e.block)),
        Expr::CommandSubstitution(e) => out.push(NodeRef::Expr(&e.body)),
        Expr::ProcessSubstitution(e) => out.push(NodeRef::Expr(&e.body)),
        Expr::Grouping(e) => out.push(NodeRef::Expr(&e.inner)),
    }
}

fn pattern_children<'a>(pattern: &'a Pattern, out: &mut Vec<NodeRef<'a>>) {
    match pattern {
        Pattern::Literal(p) => out.push(NodeRef::Expr(&p.value)),
        Pattern::Wildcard(_) => {}
        Pattern::Binding(p) => out.push(NodeRef::Ident(&p.ident)),
        Pattern::Record(p) => {
            if let Some(type_name) = &p.type_name {
                out.push(NodeRef::Ident(type_name));
            }
            out.extend(p.fields.iter().map(NodeRef::PatternField));
        }
        Pattern::List(p) => {
            let position = p
                .rest
                .as_ref()
                .map_or(p.elements.len(), |rest| rest.position.min(p.elements.len()));
            out.extend(p.elements[..position].iter().map(NodeRef::Pattern));
            if let Some(rest) = &p.rest {
                out.push(NodeRef::Rest(rest));
            }
            out.extend(p.elements[position..].iter().map(NodeRef::Pattern));
        }
    }
}
