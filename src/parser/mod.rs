//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Statement parsing (declarations, definitions, control flow, imports)
//! - Expression parsing (operators, calls, members, collections, lambdas)
//! - Command invocations and pipelines
//! - Brace disambiguation between records, closures, blocks and expansions
//! - `match` patterns and type hints
//! - Error recovery and reporting
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod pattern;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
