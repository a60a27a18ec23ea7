//! Error types and error handling for the front end.
//!
//! This module defines the diagnostics produced while lexing, parsing and
//! resolving ApX source. It includes:
//!
//! - Error structures carrying the offending source span
//! - Specific error variants for each front-end stage
//! - Categories and severities (lex/syntax errors vs. unresolved warnings)
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
