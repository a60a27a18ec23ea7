use log::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Ident, Program, Stmt},
        expressions::{Argument, AssignOp, CommandStage, Parameter},
        patterns::Pattern,
        statements::{
            ArmBody, Block, DeclKeyword, Decorator, FnDeclStmt, MacroDeclStmt, MatchArm,
            ObjectDeclStmt, ObjectMember, VarDeclStmt,
        },
    },
    config::ResolverConfig,
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{
    binding::{
        BindingId, BindingKind, BindingTable, Reference, ReferenceKind, Resolution, ScopeId,
    },
    scope::{Scope, ScopeKind},
};

/// Walks a finished tree once, keeping a stack of live scopes.
pub struct Resolver<'a> {
    pub table: BindingTable,
    pub environments: Vec<Scope>,
    /// Number of object methods being resolved; `self` is implicit inside.
    method_depth: usize,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a ResolverConfig) -> Self {
        Resolver {
            table: BindingTable::new(),
            environments: vec![],
            method_depth: 0,
            config,
        }
    }

    pub fn add_environment(&mut self, kind: ScopeKind, span: Span) -> ScopeId {
        let parent = self.environments.last().map(|scope| scope.id);
        let id = self.table.add_scope(kind, parent, span);
        trace!("enter {:?} scope {} (parent {:?})", kind, id.0, parent.map(|p| p.0));
        self.environments.push(Scope::new(id, kind));
        id
    }

    pub fn pop_environment(&mut self) {
        if let Some(scope) = self.environments.pop() {
            trace!("leave {:?} scope {}", scope.kind, scope.id.0);
        }
    }

    fn current_scope_id(&self) -> ScopeId {
        self.environments
            .last()
            .map_or(ScopeId(0), |scope| scope.id)
    }

    /// Binds `ident` in the innermost scope.
    pub fn declare(&mut self, ident: &Ident, kind: BindingKind) -> BindingId {
        let scope = self.current_scope_id();
        let id = self
            .table
            .add_binding(&ident.name, kind, ident.id, ident.span, scope);
        if let Some(environment) = self.environments.last_mut() {
            environment.declare(&ident.name, id);
        }
        id
    }

    /// Binds `ident` in the module scope regardless of nesting.
    pub fn declare_in_module(&mut self, ident: &Ident, kind: BindingKind) -> BindingId {
        let scope = self
            .environments
            .first()
            .map_or(ScopeId(0), |scope| scope.id);
        let id = self
            .table
            .add_binding(&ident.name, kind, ident.id, ident.span, scope);
        if let Some(environment) = self.environments.first_mut() {
            environment.declare(&ident.name, id);
        }
        id
    }

    /// Innermost visible binding for `name`.
    pub fn fetch_binding(&self, name: &str) -> Option<BindingId> {
        self.environments
            .iter()
            .rev()
            .find_map(|scope| scope.get_variable(name))
    }

    /// Looks `ident` up and records the reference.
    pub fn reference(&mut self, ident: &Ident, kind: ReferenceKind, builtin: bool) -> Resolution {
        let resolution = match self.fetch_binding(&ident.name) {
            Some(binding) => Resolution::Resolved(binding),
            None if builtin => Resolution::Builtin,
            None if self.method_depth > 0 && ident.name == "self" => Resolution::Builtin,
            None if matches!(kind, ReferenceKind::Command | ReferenceKind::Decorator) => {
                Resolution::External
            }
            None => Resolution::Unresolved,
        };

        let warn = match resolution {
            Resolution::Unresolved => self.config.warn_unresolved,
            Resolution::External => self.config.warn_unresolved_commands,
            _ => false,
        };
        if warn {
            self.table.diagnostics.push(Error::new(
                ErrorImpl::UnresolvedReference {
                    name: ident.name.clone(),
                },
                ident.span,
            ));
        }

        self.table.add_reference(Reference {
            node: ident.id,
            name: ident.name.clone(),
            kind,
            span: ident.span,
            scope: self.current_scope_id(),
            resolution,
        });
        resolution
    }

    /// `set name` and `name = …`: rebinds a visible name, otherwise
    /// introduces a variable.
    fn rebind_or_declare(&mut self, ident: &Ident, kind: ReferenceKind) {
        if self.fetch_binding(&ident.name).is_some() {
            self.reference(ident, kind, false);
        } else {
            self.declare(ident, BindingKind::Variable);
        }
    }
}

pub fn resolve(program: &Program) -> BindingTable {
    resolve_with_config(program, &ResolverConfig::default())
}

pub fn resolve_with_config(program: &Program, config: &ResolverConfig) -> BindingTable {
    let mut resolver = Resolver::new(config);

    resolver.add_environment(ScopeKind::Module, program.span);
    for stmt in &program.statements {
        resolve_stmt(&mut resolver, stmt);
    }
    resolver.pop_environment();

    let table = resolver.table;
    debug!(
        "resolved {} bindings, {} references over {} scopes ({} unresolved)",
        table.bindings.len(),
        table.references.len(),
        table.scopes.len(),
        table.unresolved().count()
    );
    table
}

pub fn resolve_stmt(resolver: &mut Resolver, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(stmt) => resolve_expr(resolver, &stmt.expression),
        Stmt::VarDecl(stmt) => resolve_var_decl(resolver, stmt),
        Stmt::FnDecl(stmt) => {
            resolve_decorators(resolver, &stmt.decorators);
            resolver.declare(&stmt.name, BindingKind::Function);
            resolve_function(resolver, stmt);
        }
        Stmt::MacroDecl(stmt) => resolve_macro(resolver, stmt),
        Stmt::Alias(stmt) => {
            resolve_decorators(resolver, &stmt.decorators);
            resolve_expr(resolver, &stmt.value);
            resolver.declare(&stmt.name, BindingKind::Alias);
        }
        Stmt::ObjectDecl(stmt) => resolve_object(resolver, stmt),
        Stmt::EnumDecl(stmt) => {
            resolve_decorators(resolver, &stmt.decorators);
            resolver.declare(&stmt.name, BindingKind::Enum);
            for variant in &stmt.variants {
                if let Some(value) = &variant.value {
                    resolve_expr(resolver, value);
                }
            }
        }
        Stmt::Test(stmt) => resolve_block(resolver, &stmt.body, ScopeKind::Block),
        Stmt::If(stmt) => {
            resolve_expr(resolver, &stmt.condition);
            resolve_block(resolver, &stmt.body, ScopeKind::Block);
            for branch in &stmt.elif_branches {
                resolve_expr(resolver, &branch.condition);
                resolve_block(resolver, &branch.body, ScopeKind::Block);
            }
            if let Some(else_body) = &stmt.else_body {
                resolve_block(resolver, else_body, ScopeKind::Block);
            }
        }
        Stmt::For(stmt) => {
            resolve_expr(resolver, &stmt.iterable);
            resolver.add_environment(ScopeKind::ForLoop, stmt.span);
            for variable in &stmt.variables {
                resolver.declare(variable, BindingKind::Variable);
            }
            resolve_statements(resolver, &stmt.body);
            resolver.pop_environment();
        }
        Stmt::While(stmt) => {
            resolve_expr(resolver, &stmt.condition);
            resolve_block(resolver, &stmt.body, ScopeKind::Block);
        }
        Stmt::Loop(stmt) => resolve_block(resolver, &stmt.body, ScopeKind::Block),
        Stmt::Match(stmt) => {
            resolve_expr(resolver, &stmt.scrutinee);
            for arm in &stmt.arms {
                resolve_match_arm(resolver, arm);
            }
        }
        Stmt::Try(stmt) => {
            resolve_block(resolver, &stmt.body, ScopeKind::Block);
            if let Some(catch) = &stmt.catch {
                resolver.add_environment(ScopeKind::Block, catch.span);
                if let Some(binding) = &catch.binding {
                    resolver.declare(binding, BindingKind::Variable);
                }
                resolve_statements(resolver, &catch.body);
                resolver.pop_environment();
            }
        }
        Stmt::Use(stmt) => {
            if let Some(binding) = &stmt.binding {
                resolver.declare_in_module(binding, BindingKind::Import);
            }
        }
        Stmt::FromImport(stmt) => {
            for item in &stmt.items {
                resolver.declare_in_module(item.local_name(), BindingKind::Import);
            }
        }
        Stmt::Source(stmt) => {
            if let Some(alias) = &stmt.alias {
                resolver.declare_in_module(alias, BindingKind::Import);
            }
        }
        Stmt::Return(stmt) => {
            if let Some(value) = &stmt.value {
                resolve_expr(resolver, value);
            }
        }
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Error(_) => {}
    }
}

fn resolve_var_decl(resolver: &mut Resolver, stmt: &VarDeclStmt) {
    resolve_expr(resolver, &stmt.value);
    match stmt.keyword {
        DeclKeyword::Set => resolver.rebind_or_declare(&stmt.name, ReferenceKind::Variable),
        DeclKeyword::Let | DeclKeyword::Const => {
            resolver.declare(&stmt.name, BindingKind::Variable);
        }
    }
}

fn resolve_decorators(resolver: &mut Resolver, decorators: &[Decorator]) {
    for decorator in decorators {
        resolver.reference(&decorator.name, ReferenceKind::Decorator, false);
        for argument in &decorator.arguments {
            resolve_expr(resolver, argument);
        }
    }
}

/// Parameters are bound in order, so a default may refer to an earlier
/// parameter.
fn resolve_parameters(resolver: &mut Resolver, parameters: &[Parameter]) {
    for parameter in parameters {
        if let Some(default) = &parameter.default {
            resolve_expr(resolver, default);
        }
        resolver.declare(&parameter.name, BindingKind::Parameter);
    }
}

/// The caller binds the function name first so the body can recurse.
fn resolve_function(resolver: &mut Resolver, stmt: &FnDeclStmt) {
    resolver.add_environment(ScopeKind::Function, stmt.span);
    resolve_parameters(resolver, &stmt.parameters);
    resolve_statements(resolver, &stmt.body);
    resolver.pop_environment();
}

fn resolve_macro(resolver: &mut Resolver, stmt: &MacroDeclStmt) {
    resolve_decorators(resolver, &stmt.decorators);
    resolver.declare(&stmt.name, BindingKind::Macro);

    resolver.add_environment(ScopeKind::Macro, stmt.span);
    resolve_parameters(resolver, &stmt.parameters);
    resolve_statements(resolver, &stmt.body);
    resolver.pop_environment();
}

fn resolve_object(resolver: &mut Resolver, stmt: &ObjectDeclStmt) {
    resolve_decorators(resolver, &stmt.decorators);
    resolver.declare(&stmt.name, BindingKind::Object);

    for member in &stmt.members {
        match member {
            ObjectMember::Field(field) => {
                if let Some(default) = &field.default {
                    resolve_expr(resolver, default);
                }
            }
            ObjectMember::Method(method) => {
                resolve_decorators(resolver, &method.decorators);
                resolver.method_depth += 1;
                resolve_function(resolver, method);
                resolver.method_depth -= 1;
            }
        }
    }
}

fn resolve_match_arm(resolver: &mut Resolver, arm: &MatchArm) {
    resolver.add_environment(ScopeKind::MatchArm, arm.span);
    resolve_pattern(resolver, &arm.pattern);
    if let Some(guard) = &arm.guard {
        resolve_expr(resolver, guard);
    }
    match &arm.body {
        ArmBody::Block(block) => resolve_statements(resolver, block),
        ArmBody::Expression(expr) => resolve_expr(resolver, expr),
    }
    resolver.pop_environment();
}

pub fn resolve_pattern(resolver: &mut Resolver, pattern: &Pattern) {
    match pattern {
        Pattern::Literal(_) | Pattern::Wildcard(_) => {}
        Pattern::Binding(binding) => {
            resolver.declare(&binding.ident, BindingKind::Variable);
        }
        Pattern::Record(record) => {
            if let Some(type_name) = &record.type_name {
                resolver.reference(type_name, ReferenceKind::TypeName, false);
            }
            for field in &record.fields {
                match &field.pattern {
                    Some(pattern) => resolve_pattern(resolver, pattern),
                    None => {
                        resolver.declare(&field.key, BindingKind::Variable);
                    }
                }
            }
        }
        Pattern::List(list) => {
            for element in &list.elements {
                resolve_pattern(resolver, element);
            }
            if let Some(binding) = list.rest.as_ref().and_then(|rest| rest.binding.as_ref()) {
                resolver.declare(binding, BindingKind::Variable);
            }
        }
    }
}

/// Statements of a body whose scope the caller already pushed.
fn resolve_statements(resolver: &mut Resolver, block: &Block) {
    for stmt in block.iter() {
        resolve_stmt(resolver, stmt);
    }
}

fn resolve_block(resolver: &mut Resolver, block: &Block, kind: ScopeKind) {
    resolver.add_environment(kind, block.span);
    resolve_statements(resolver, block);
    resolver.pop_environment();
}

fn resolve_command_stage(resolver: &mut Resolver, stage: &CommandStage) {
    resolver.reference(&stage.name, ReferenceKind::Command, stage.builtin);
    for argument in &stage.arguments {
        match argument {
            Argument::Positional(expr) => resolve_expr(resolver, expr),
            Argument::Flag(flag) => {
                if let Some(value) = &flag.value {
                    resolve_expr(resolver, value);
                }
            }
            Argument::Word(_) => {}
        }
    }
}

pub fn resolve_expr(resolver: &mut Resolver, expr: &Expr) {
    match expr {
        Expr::Number(_)
        | Expr::String(_)
        | Expr::Bool(_)
        | Expr::Null(_)
        | Expr::EnvVariable(_)
        | Expr::SpecialVariable(_)
        | Expr::BraceExpansion(_) => {}
        Expr::Variable(variable) => {
            resolver.reference(&variable.ident, ReferenceKind::Variable, false);
        }
        Expr::Symbol(symbol) => {
            resolver.reference(&symbol.ident, ReferenceKind::Symbol, symbol.builtin);
        }
        Expr::Binary(binary) => {
            resolve_expr(resolver, &binary.left);
            resolve_expr(resolver, &binary.right);
        }
        Expr::Prefix(prefix) => resolve_expr(resolver, &prefix.right),
        Expr::Assignment(assignment) => {
            resolve_expr(resolver, &assignment.value);
            match (assignment.operator, assignment.assignee.as_ref()) {
                (AssignOp::Assign, Expr::Variable(variable)) => {
                    resolver.rebind_or_declare(&variable.ident, ReferenceKind::Variable);
                }
                (AssignOp::Assign, Expr::Symbol(symbol)) => {
                    resolver.rebind_or_declare(&symbol.ident, ReferenceKind::Symbol);
                }
                (_, assignee) => resolve_expr(resolver, assignee),
            }
        }
        Expr::Call(call) => {
            resolve_expr(resolver, &call.callee);
            for argument in &call.arguments {
                resolve_expr(resolver, argument);
            }
        }
        // The property is not a bindable name
        Expr::Member(member) => resolve_expr(resolver, &member.object),
        Expr::Index(index) => {
            resolve_expr(resolver, &index.object);
            resolve_expr(resolver, &index.index);
        }
        Expr::Range(range) => {
            resolve_expr(resolver, &range.start);
            resolve_expr(resolver, &range.end);
        }
        Expr::Pipeline(pipeline) => {
            for stage in &pipeline.stages {
                resolve_expr(resolver, stage);
            }
        }
        Expr::Command(command) => {
            for stage in &command.stages {
                resolve_command_stage(resolver, stage);
            }
        }
        Expr::List(list) => {
            for element in &list.elements {
                resolve_expr(resolver, element);
            }
        }
        Expr::Tuple(tuple) => {
            for element in &tuple.elements {
                resolve_expr(resolver, element);
            }
        }
        Expr::Set(set) => {
            for element in &set.elements {
                resolve_expr(resolver, element);
            }
        }
        Expr::Record(record) => {
            for field in &record.fields {
                resolve_expr(resolver, &field.value);
            }
        }
        Expr::Closure(closure) => {
            resolver.add_environment(ScopeKind::Closure, closure.span);
            if let Some(params) = &closure.params {
                resolve_parameters(resolver, params);
            }
            resolve_statements(resolver, &closure.body);
            resolver.pop_environment();
        }
        Expr::Lambda(lambda) => {
            resolver.add_environment(ScopeKind::Closure, lambda.span);
            resolve_parameters(resolver, &lambda.params);
            resolve_statements(resolver, &lambda.body);
            resolver.pop_environment();
        }
        Expr::Block(block) => resolve_block(resolver, &block.block, ScopeKind::Block),
        Expr::CommandSubstitution(substitution) => resolve_expr(resolver, &substitution.body),
        Expr::ProcessSubstitution(substitution) => resolve_expr(resolver, &substitution.body),
        Expr::Grouping(grouping) => resolve_expr(resolver, &grouping.inner),
    }
}
