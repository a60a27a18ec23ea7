//! Parser implementation for building the syntax tree.
//!
//! This module contains the main Parser struct and the statement-list driver.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and specialized functions for statement parsing.
//!
//! It maintains lookup tables for:
//! - Statement handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence
//! - Type-hint parsing handlers
//!
//! Ambiguous prefixes are handled with bounded lookahead (`peek`) and a
//! checkpoint/restore pair used by [`Parser::speculate`].

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::{
    ast::ast::{Ident, NodeId, Program, Stmt},
    ast::statements::ErrorStmt,
    config::ParserConfig,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::describe_invalid,
        tokens::{Token, TokenKind},
    },
    Position, Span, MK_TOKEN,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::parse_stmt,
    types::{
        create_token_type_lookups, TypeBPLookup, TypeLEDHandler, TypeLEDLookup, TypeNUDHandler,
        TypeNUDLookup,
    },
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, always ending with EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
    type_led_lookup: TypeLEDLookup,
    type_binding_power_lookup: TypeBPLookup,
    /// Counter for generating unique node ids
    current_id: u32,
    diagnostics: Vec<Error>,
    /// Start offsets of `Invalid` tokens, reported once up front
    invalid_tokens: HashSet<Position>,
    /// When set, a `{` ends command arguments (`if`/`while`/`for`/`match` heads)
    restrict_braces: bool,
    /// Token index of the expression statement being parsed
    statement_start: Option<usize>,
    /// Set once any statement needed recovery
    failed: bool,
    /// Current nesting of groups, blocks and patterns
    depth: usize,
    config: ParserConfig,
}

/// A saved cursor; restoring it also drops diagnostics recorded since.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pos: usize,
    diagnostics: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, config: ParserConfig) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let end = tokens.last().map_or(0, |t| t.span.end.0);
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::new(),
                Span::new(end, end),
                line
            ));
        }

        Parser {
            tokens,
            pos: 0,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            type_led_lookup: HashMap::new(),
            type_binding_power_lookup: HashMap::new(),
            current_id: 0,
            diagnostics: vec![],
            invalid_tokens: HashSet::new(),
            restrict_braces: false,
            statement_start: None,
            failed: false,
            depth: 0,
            config,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.peek(0)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Looks `offset` tokens ahead; past the end this is the EOF token.
    pub fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// The most recently consumed token, or the first token at the start.
    pub fn previous_token(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.tokens[index].kind != TokenKind::EOF {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(error.unwrap_or_else(|| self.unexpected()));
        }

        Ok(self.advance().clone())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// The error for the current token when nothing can consume it.
    pub fn unexpected(&self) -> Error {
        let token = self.current_token();

        match token.kind {
            TokenKind::Invalid => Error::new(describe_invalid(token), token.span),
            TokenKind::EOF => Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: String::from("EOF"),
                    message: String::from("input ended early"),
                },
                token.span,
            ),
            TokenKind::Newline => Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: String::from("\\n"),
                    message: String::from("the line ended early"),
                },
                token.span,
            ),
            _ => Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span,
            ),
        }
    }

    /// An `ExpectedExpression` error pointing at the previous token.
    pub fn expected_expression(&self) -> Error {
        let after = self.previous_token();
        Error::new(
            ErrorImpl::ExpectedExpression {
                after: after.value.clone(),
            },
            after.span,
        )
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// True at a newline, `;`, a closing delimiter or EOF: nothing more of
    /// the current expression can follow.
    pub fn at_expression_end(&self) -> bool {
        let kind = self.current_token_kind();
        kind.is_terminator() || kind.closes_group() || kind == TokenKind::EOF
    }

    /// True when the current token starts right where the previous one ended.
    pub fn current_is_adjacent(&self) -> bool {
        self.pos > 0 && self.previous_token().is_adjacent_to(self.current_token())
    }

    pub fn skip_newlines(&mut self) {
        while self.current_token_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    pub fn skip_terminators(&mut self) {
        while self.current_token_kind().is_terminator() {
            self.advance();
        }
    }

    /// Kind of the first token that is not a newline, without consuming.
    pub fn peek_past_newlines(&self) -> TokenKind {
        let mut offset = 0;
        while self.peek_kind(offset) == TokenKind::Newline {
            offset += 1;
        }
        self.peek_kind(offset)
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        let end = self.previous_token().span.end.max(start);
        Span { start, end }
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            diagnostics: self.diagnostics.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Runs `attempt`; on failure rewinds as if it never ran.
    pub fn speculate<T>(
        &mut self,
        attempt: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Option<T> {
        let checkpoint = self.checkpoint();
        match attempt(self) {
            Ok(value) => Some(value),
            Err(error) => {
                trace!("speculation failed: {}", error);
                self.restore(checkpoint);
                None
            }
        }
    }

    /// Runs `inner` with brace arguments restricted (or not), restoring the
    /// previous setting afterwards.
    pub fn with_brace_restriction<T>(
        &mut self,
        restrict: bool,
        inner: impl FnOnce(&mut Parser) -> T,
    ) -> T {
        let saved = self.restrict_braces;
        self.restrict_braces = restrict;
        let result = inner(self);
        self.restrict_braces = saved;
        result
    }

    /// Runs `inner` one nesting level deeper, failing the statement once
    /// `max_depth` is reached instead of recursing further.
    pub fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let saved = self.depth;
        self.deepen()?;
        let result = inner(self);
        self.depth = saved;
        result
    }

    /// Counts one more level of tree depth. Left-leaning chains such as
    /// `a + b + c` call this once per operator and reset with `set_depth`.
    pub fn deepen(&mut self) -> Result<(), Error> {
        if self.depth >= self.config.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep {
                    limit: self.config.max_depth,
                },
                self.current_token().span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub fn braces_restricted(&self) -> bool {
        self.restrict_braces
    }

    pub fn mark_statement_start(&mut self) {
        self.statement_start = Some(self.pos);
    }

    /// True when the current token opens an expression statement.
    pub fn at_statement_start(&self) -> bool {
        self.statement_start == Some(self.pos)
    }

    /// Records a diagnostic, honoring the configured limits.
    pub fn report(&mut self, error: Error) {
        if self.invalid_tokens.contains(&error.get_span().start) && self.is_reported(&error) {
            return;
        }
        if self.diagnostics.len() >= self.config.max_diagnostics {
            return;
        }
        self.diagnostics.push(error);
    }

    fn is_reported(&self, error: &Error) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.get_span().start == error.get_span().start && d.category() == error.category())
    }

    fn report_invalid_tokens(&mut self) {
        let invalid: Vec<Error> = self
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Invalid)
            .map(|t| Error::new(describe_invalid(t), t.span))
            .collect();

        for error in invalid {
            self.invalid_tokens.insert(error.get_span().start);
            self.report(error);
        }
    }

    /// True once parsing should give up under `stop_at_first_error`.
    pub fn should_stop(&self) -> bool {
        self.config.stop_at_first_error && self.failed
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_bp_lookup(&self) -> &TypeBPLookup {
        &self.type_binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    pub fn get_type_led_lookup(&self) -> &TypeLEDLookup {
        &self.type_led_lookup
    }

    /// Registers a left denotation (infix or postfix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_led(
        &mut self,
        kind: TokenKind,
        binding_power: BindingPower,
        led_fn: TypeLEDHandler,
    ) {
        self.type_binding_power_lookup.insert(kind, binding_power);
        self.type_led_lookup.insert(kind, led_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Advances the internal ID counter and returns the previous value.
    pub fn advance_id(&mut self) -> NodeId {
        let id = self.current_id;
        self.current_id += 1;
        NodeId(id)
    }

    /// Builds an identifier node from a name or `$variable` token.
    pub fn mk_ident(&mut self, token: &Token) -> Ident {
        Ident {
            name: token.value.trim_start_matches('$').to_string(),
            span: token.span,
            id: self.advance_id(),
        }
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start
    }
}

/// Parses statements until `closer` (not consumed) or EOF, recovering from
/// every failed statement.
pub fn parse_statements(parser: &mut Parser, closer: Option<TokenKind>) -> Vec<Stmt> {
    let mut body = vec![];

    loop {
        parser.skip_terminators();
        if parser.should_stop() || !parser.has_tokens() {
            break;
        }

        let kind = parser.current_token_kind();
        if Some(kind) == closer {
            break;
        }

        let start = parser.get_pos();
        let start_position = parser.get_position();

        if closer.is_none() && kind.closes_group() {
            // Stray closer at the top level
            let error = parser.unexpected();
            parser.report(error);
            parser.advance();
            parser.failed = true;
            body.push(Stmt::Error(ErrorStmt {
                span: parser.span_from(start_position),
            }));
            continue;
        }

        match parse_stmt(parser) {
            Ok(stmt) => {
                body.push(stmt);

                let next = parser.current_token_kind();
                let closer_ok = next == TokenKind::CloseCurly && closer.is_some();
                if !(next.is_terminator() || next == TokenKind::EOF || closer_ok) {
                    let error = parser.unexpected();
                    parser.report(error);
                    let recovery_start = parser.get_position();
                    let failed_at = parser.get_pos();
                    synchronize(parser, failed_at, failed_at);
                    parser.failed = true;
                    body.push(Stmt::Error(ErrorStmt {
                        span: parser.span_from(recovery_start),
                    }));
                }
            }
            Err(error) => {
                debug!("statement at {} failed: {}", start_position.0, error);
                parser.report(error);

                let failed_at = parser.get_pos();
                synchronize(parser, start, failed_at);
                parser.failed = true;
                body.push(Stmt::Error(ErrorStmt {
                    span: parser.span_from(start_position),
                }));
            }
        }
    }

    body
}

/// Rewinds to `start` and skips to the first terminator at that nesting
/// depth lying at or after `failed_at`, stopping early at an unmatched
/// closer or EOF. Always consumes at least one token.
fn synchronize(parser: &mut Parser, start: usize, failed_at: usize) {
    parser.pos = start;
    let mut depth: usize = 0;

    loop {
        let kind = parser.current_token_kind();

        if kind == TokenKind::EOF {
            break;
        }
        if depth == 0 && kind.is_terminator() && parser.pos >= failed_at {
            break;
        }
        if kind.closes_group() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if kind.opens_group() {
            depth += 1;
        }

        parser.advance();
    }

    if parser.pos == start && parser.has_tokens() {
        parser.advance();
    }
}

/// The result of one parse: the tree plus every diagnostic, in source order.
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    pub diagnostics: Vec<Error>,
}

/// Parses a stream of tokens into a syntax tree with default settings.
pub fn parse(tokens: Vec<Token>) -> ParseOutput {
    parse_with_config(tokens, &ParserConfig::default())
}

/// Parses a stream of tokens into a syntax tree.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses all statements until EOF.
/// Parsing never fails as a whole: broken statements become `Stmt::Error`
/// nodes and their diagnostics are collected in `ParseOutput::diagnostics`.
pub fn parse_with_config(tokens: Vec<Token>, config: &ParserConfig) -> ParseOutput {
    let mut parser = Parser::new(tokens, config.clone());
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);
    parser.report_invalid_tokens();

    let statements = parse_statements(&mut parser, None);

    let end = parser.tokens.last().map_or(0, |t| t.span.end.0);
    let program = Program {
        statements,
        span: Span::new(0, end),
    };

    let mut diagnostics = parser.diagnostics;
    diagnostics.sort_by_key(|d| d.get_span().start);
    if config.stop_at_first_error {
        diagnostics.truncate(1);
    }

    debug!(
        "parsed {} statements with {} diagnostics",
        program.statements.len(),
        diagnostics.len()
    );

    ParseOutput {
        program,
        diagnostics,
    }
}
