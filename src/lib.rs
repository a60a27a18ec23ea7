#![allow(clippy::module_inception)]

use log::debug;
use serde::Serialize;

use crate::{
    ast::ast::Program,
    config::ApxConfig,
    errors::errors::{Error, ErrorTip},
    lexer::{lexer::tokenize, tokens::Token},
    parser::parser::parse_with_config,
    resolver::{binding::BindingTable, resolver::resolve_with_config},
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod resolver;

extern crate regex;

/// Byte offset into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position(pub u32);

impl Position {
    pub fn null() -> Self {
        Position(0)
    }
}

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Span {
            start: Position(start),
            end: Position(end),
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.start.0 as usize..self.end.0 as usize)
            .unwrap_or("")
    }
}

/// Everything the front end produces for one source buffer.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub bindings: BindingTable,
    /// Lexer, parser and resolver diagnostics, in source order.
    pub diagnostics: Vec<Error>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }
}

/// Lexes, parses and resolves `source` in one pass.
pub fn analyze(source: &str, config: &ApxConfig) -> Analysis {
    let tokens = tokenize(source);
    let output = parse_with_config(tokens.clone(), &config.parser);
    let bindings = resolve_with_config(&output.program, &config.resolver);

    let mut diagnostics = output.diagnostics;
    diagnostics.extend(bindings.diagnostics.iter().cloned());
    diagnostics.sort_by_key(|d| d.get_span().start);

    debug!(
        "analyzed {} bytes: {} tokens, {} statements, {} diagnostics",
        source.len(),
        tokens.len(),
        output.program.statements.len(),
        diagnostics.len()
    );

    Analysis {
        tokens,
        program: output.program,
        bindings,
        diagnostics,
    }
}

/// Returns the 1-based line number, the line's text and the column of `position`.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return Some((line_number, line.to_string(), line_pos));
        }

        start = end;
        line_number += 1;
    }

    // Position at the very end of the buffer
    if source.is_empty() || source.ends_with('\n') {
        Some((line_number, String::new(), 0))
    } else {
        let last = source.rsplit('\n').next().unwrap_or("");
        Some((line_number - 1, last.to_string(), last.len()))
    }
}

pub fn render_diagnostic(error: &Error, source: &str, file: &str) -> String {
    /*
        Error: message
        -> script.apx
           |
        20 | let a = #;
           | --------^
    */

    let mut out = String::new();
    let label = if error.is_error() { "Error" } else { "Warning" };

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("{}: {}\n", label, error.get_error_name()));
    } else {
        out.push_str(&format!(
            "{}: {} ({})\n",
            label,
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}\n", file));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, error.get_position().0)
    else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let line_text = line_text.trim_end_matches(['\n', '\r']);
    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += c.len_utf8();
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
