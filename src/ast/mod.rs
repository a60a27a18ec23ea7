/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the ApX syntax tree
///
/// Submodules:
/// - ast: Program, the Stmt/Expr enums, node ids and the uniform NodeRef view
/// - expressions: Definitions for the expression forms
/// - statements: Definitions for the statement forms
/// - patterns: Definitions for `match` arm patterns
/// - types: Definitions for surface type hints
pub mod ast;
pub mod expressions;
pub mod patterns;
pub mod statements;
pub mod types;
