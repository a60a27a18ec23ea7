//! Lexical analysis module for the front end.
//!
//! This module contains the lexer (tokenizer) that converts ApX source text
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using an ordered table of regex patterns
//! - Recognition of keywords, identifiers, variables, flags and literals
//! - The five string forms and the numeric forms
//! - Comments, line continuations and whitespace skipping
//! - Token position tracking (byte spans and line numbers)
//!
//! The lexer is total: anything it cannot classify becomes an
//! `Invalid` token that the parser reports.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
