use log::trace;

use crate::{
    ast::{
        ast::{Expr, Ident},
        expressions::{
            Argument, AssignOp, AssignmentExpr, BinaryExpr, BinaryOp, BlockExpr, BoolExpr,
            BraceExpansion, BraceExpansionExpr, CallExpr, ClosureExpr, CommandExpr, CommandStage,
            CommandSubstitutionExpr, EnvVariableExpr, FlagArgument, GroupingExpr, IndexExpr,
            LambdaExpr, ListExpr, MemberExpr, NullExpr, NumberExpr, NumberValue, Parameter,
            PipeOp, PipelineExpr, PrefixExpr, ProcessDirection, ProcessSubstitutionExpr,
            RangeExpr, RecordExpr, RecordField, SetExpr, SpecialVariable, SpecialVariableExpr,
            StringExpr, StringStyle, SymbolExpr, TupleExpr, UnaryOp, VariableExpr, WordArgument,
        },
        statements::Block,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::string_value,
        tokens::{is_builtin_command, Token, TokenKind},
    },
    Span,
};

use super::{
    lookups::BindingPower,
    parser::{parse_statements, Parser},
    stmt::parse_block,
    types::parse_type,
};

/// Parses a whole expression: a pipeline, optionally assigned to a target.
/// Assignment is right-associative, so `$x = $y = 1` nests to the right.
pub fn parse_expression(parser: &mut Parser) -> Result<Expr, Error> {
    trace!("parse_expression at {}", parser.get_position().0);
    let left = parse_pipeline(parser)?;

    let kind = parser.current_token_kind();
    let Some(operator) = assign_op(kind) else {
        return Ok(left);
    };
    if !left.is_assignable() {
        return Err(Error::new(ErrorImpl::InvalidAssignmentTarget, left.span()));
    }

    parser.advance();
    if parser.at_expression_end() {
        return Err(parser.expected_expression());
    }

    let value = parser.nested(parse_expression)?;
    let span = left.span().to(&value.span());
    Ok(Expr::Assignment(AssignmentExpr {
        assignee: Box::new(left),
        operator,
        value: Box::new(value),
        span,
    }))
}

/// Like [`parse_expression`], but reports `ExpectedExpression` at the
/// previous token when the expression is missing altogether.
pub fn parse_required_expression(parser: &mut Parser) -> Result<Expr, Error> {
    if parser.at_expression_end() {
        return Err(parser.expected_expression());
    }
    parse_expression(parser)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assignment => Some(AssignOp::Assign),
        TokenKind::PlusEquals => Some(AssignOp::AddAssign),
        TokenKind::MinusEquals => Some(AssignOp::SubtractAssign),
        TokenKind::StarEquals => Some(AssignOp::MultiplyAssign),
        TokenKind::SlashEquals => Some(AssignOp::DivideAssign),
        TokenKind::PercentEquals => Some(AssignOp::ModuloAssign),
        _ => None,
    }
}

fn pipe_op(kind: TokenKind) -> Option<PipeOp> {
    match kind {
        TokenKind::Pipe => Some(PipeOp::Value),
        TokenKind::PipeAppend => Some(PipeOp::Append),
        TokenKind::PipeNullSafe => Some(PipeOp::NullSafe),
        TokenKind::PipeError => Some(PipeOp::ErrorPropagating),
        _ => None,
    }
}

/// `stage (pipe stage)*`. All-command chains fold into one `CommandExpr`.
pub fn parse_pipeline(parser: &mut Parser) -> Result<Expr, Error> {
    parse_pipeline_from(parser, false)
}

/// With `leading_command`, a bare name in the first stage is a command, as
/// it would be after a pipe.
fn parse_pipeline_from(parser: &mut Parser, leading_command: bool) -> Result<Expr, Error> {
    let start = parser.get_position();
    let first = parse_stage(parser, leading_command)?;

    let mut stages = vec![first];
    let mut pipes = vec![];

    loop {
        // A pipe at the start of the next line continues the pipeline
        if parser.current_token_kind() == TokenKind::Newline && parser.peek_past_newlines().is_pipe()
        {
            parser.skip_newlines();
        }

        let Some(pipe) = pipe_op(parser.current_token_kind()) else {
            break;
        };
        parser.advance();
        parser.skip_newlines();
        if parser.at_expression_end() {
            return Err(parser.expected_expression());
        }

        pipes.push(pipe);
        stages.push(parse_stage(parser, true)?);
    }

    if pipes.is_empty() {
        if let Some(stage) = stages.pop() {
            return Ok(stage);
        }
    }

    let span = parser.span_from(start);

    if stages.iter().all(|stage| stage.as_single_command().is_some()) {
        let stages = stages
            .into_iter()
            .filter_map(|stage| match stage {
                Expr::Command(command) => command.stages.into_iter().next(),
                _ => None,
            })
            .collect();
        return Ok(Expr::Command(CommandExpr {
            stages,
            pipes,
            span,
        }));
    }

    Ok(Expr::Pipeline(PipelineExpr {
        stages,
        pipes,
        span,
    }))
}

/// One pipeline stage. Commands may be chained with `&&` / `||`.
fn parse_stage(parser: &mut Parser, after_pipe: bool) -> Result<Expr, Error> {
    if !starts_command(parser, after_pipe) {
        return parse_expr(parser, BindingPower::Default);
    }

    let left = parse_command(parser)?;
    let depth = parser.depth();
    let result = parse_command_chain(parser, left);
    parser.set_depth(depth);
    result
}

fn parse_command_chain(parser: &mut Parser, mut left: Expr) -> Result<Expr, Error> {
    while let Some(operator) = match parser.current_token_kind() {
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        _ => None,
    } {
        parser.deepen()?;
        parser.advance();
        parser.skip_newlines();
        if parser.at_expression_end() {
            return Err(parser.expected_expression());
        }

        let right = if starts_command(parser, false) {
            parse_command(parser)?
        } else {
            parse_expr(parser, BindingPower::LogicalAnd)?
        };

        let span = left.span().to(&right.span());
        left = Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        });
    }

    Ok(left)
}

/// Number of tokens in the command name at the cursor: `name` or a
/// hyphenated `git-log` written without spaces.
fn command_name_len(parser: &Parser) -> usize {
    let mut len = 1;
    while parser.peek_kind(len) == TokenKind::Dash
        && parser.peek(len - 1).is_adjacent_to(parser.peek(len))
        && parser.peek_kind(len + 1) == TokenKind::Identifier
        && parser.peek(len).is_adjacent_to(parser.peek(len + 1))
    {
        len += 2;
    }
    len
}

/// Decides whether the identifier at the cursor starts a command
/// invocation rather than an ordinary expression.
fn starts_command(parser: &Parser, after_pipe: bool) -> bool {
    if parser.current_token_kind() != TokenKind::Identifier {
        return false;
    }

    let len = command_name_len(parser);
    let name_end = parser.peek(len - 1);
    let next = parser.peek(len);

    if after_pipe {
        // Anything but a call, index or member access
        let postfix = matches!(
            next.kind,
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::Dot
        );
        return !(postfix && name_end.is_adjacent_to(next));
    }

    // `a | b`, including a pipe continued on the next line
    let mut offset = len;
    while parser.peek_kind(offset) == TokenKind::Newline {
        offset += 1;
    }
    if parser.peek_kind(offset).is_pipe() {
        return true;
    }
    // `make && make test`
    if matches!(next.kind, TokenKind::And | TokenKind::Or) {
        return true;
    }

    is_argument_shaped(parser, name_end, next, parser.peek(len + 1))
}

fn is_argument_shaped(parser: &Parser, name_end: &Token, next: &Token, after: &Token) -> bool {
    let spaced = !name_end.is_adjacent_to(next);

    match next.kind {
        TokenKind::Integer
        | TokenKind::Float
        | TokenKind::String
        | TokenKind::SingleString
        | TokenKind::TripleString
        | TokenKind::RawString
        | TokenKind::BacktickString
        | TokenKind::Variable
        | TokenKind::EnvVariable
        | TokenKind::SpecialVariable
        | TokenKind::ShortFlag
        | TokenKind::LongFlag
        | TokenKind::Identifier
        | TokenKind::DollarParen
        | TokenKind::ProcessIn
        | TokenKind::ProcessOut
        | TokenKind::HashCurly
        | TokenKind::OpenBracket
        | TokenKind::OpenParen => spaced,
        TokenKind::OpenCurly => spaced && !parser.braces_restricted(),
        TokenKind::Dash => {
            spaced
                && next.is_adjacent_to(after)
                && matches!(after.kind, TokenKind::Integer | TokenKind::Float)
        }
        TokenKind::Slash | TokenKind::Star | TokenKind::Dot | TokenKind::DotDot | TokenKind::Tilde => {
            spaced
                && (next.is_adjacent_to(after)
                    || after.kind.is_terminator()
                    || after.kind == TokenKind::EOF)
        }
        TokenKind::AndKeyword | TokenKind::OrKeyword | TokenKind::In | TokenKind::As => false,
        kind => spaced && kind.is_keyword(),
    }
}

fn parse_command(parser: &mut Parser) -> Result<Expr, Error> {
    let stage = parse_command_stage(parser)?;
    let span = stage.span;
    Ok(Expr::Command(CommandExpr {
        stages: vec![stage],
        pipes: vec![],
        span,
    }))
}

pub fn parse_command_stage(parser: &mut Parser) -> Result<CommandStage, Error> {
    let start = parser.get_position();

    let mut name = String::new();
    let mut name_span = parser.current_token().span;
    for _ in 0..command_name_len(parser) {
        let token = parser.advance();
        name.push_str(&token.value);
        name_span = name_span.to(&token.span);
    }

    let builtin = is_builtin_command(&name);
    let name = Ident {
        name,
        span: name_span,
        id: parser.advance_id(),
    };

    let mut arguments = vec![];
    while !at_argument_end(parser) {
        arguments.push(parse_argument(parser)?);
    }

    Ok(CommandStage {
        name,
        builtin,
        arguments,
        span: parser.span_from(start),
    })
}

fn at_argument_end(parser: &Parser) -> bool {
    let kind = parser.current_token_kind();
    kind.is_terminator()
        || kind.is_pipe()
        || kind.closes_group()
        || matches!(
            kind,
            TokenKind::EOF
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Comma
                | TokenKind::FatArrow
                | TokenKind::Invalid
        )
        || (kind == TokenKind::OpenCurly && parser.braces_restricted())
}

fn continues_word(kind: TokenKind) -> bool {
    !(kind.is_terminator()
        || kind.is_pipe()
        || kind.opens_group()
        || kind.closes_group()
        || matches!(
            kind,
            TokenKind::EOF | TokenKind::And | TokenKind::Or | TokenKind::Comma | TokenKind::Invalid
        ))
}

fn is_literal(kind: TokenKind) -> bool {
    kind.is_string()
        || matches!(
            kind,
            TokenKind::Integer
                | TokenKind::Float
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
}

fn starts_value(kind: TokenKind) -> bool {
    is_literal(kind)
        || kind.opens_group()
        || matches!(
            kind,
            TokenKind::Variable | TokenKind::EnvVariable | TokenKind::SpecialVariable
        )
}

pub fn parse_argument(parser: &mut Parser) -> Result<Argument, Error> {
    let kind = parser.current_token_kind();

    match kind {
        TokenKind::ShortFlag | TokenKind::LongFlag => parse_flag_argument(parser),
        TokenKind::Dash
            if matches!(parser.peek_kind(1), TokenKind::Integer | TokenKind::Float)
                && parser.current_token().is_adjacent_to(parser.peek(1)) =>
        {
            Ok(Argument::Positional(parse_negative_number(parser)?))
        }
        kind if starts_value(kind) => parse_value_argument(parser),
        _ => Ok(Argument::Word(parse_word(parser)?)),
    }
}

/// A value in argument position. Anything glued onto it afterwards turns
/// the whole run into a bareword, e.g. `$dir/sub`.
fn parse_value_argument(parser: &mut Parser) -> Result<Argument, Error> {
    let kind = parser.current_token_kind();
    let checkpoint = parser.checkpoint();

    let mut value = if is_literal(kind) {
        parse_primary_expr(parser)?
    } else {
        parse_expr(parser, BindingPower::Unary)?
    };

    if matches!(
        parser.current_token_kind(),
        TokenKind::DotDot | TokenKind::DotDotEquals
    ) && parser.current_is_adjacent()
    {
        value = parse_range_expr(parser, value, BindingPower::Range)?;
    }

    let glued = !at_argument_end(parser) && parser.current_is_adjacent();
    if glued && !kind.opens_group() {
        parser.restore(checkpoint);
        return Ok(Argument::Word(parse_word(parser)?));
    }

    Ok(Argument::Positional(value))
}

fn parse_flag_argument(parser: &mut Parser) -> Result<Argument, Error> {
    let token = parser.advance().clone();
    let long = token.kind == TokenKind::LongFlag;

    let value = if long
        && parser.current_token_kind() == TokenKind::Assignment
        && parser.current_is_adjacent()
    {
        parser.advance();
        if at_argument_end(parser) || !parser.current_is_adjacent() {
            return Err(parser.expected_expression());
        }

        let value = match parse_argument(parser)? {
            Argument::Positional(expr) => expr,
            Argument::Word(word) => word_to_string(word),
            Argument::Flag(flag) => {
                let prefix = if flag.long { "--" } else { "-" };
                word_to_string(WordArgument {
                    text: format!("{}{}", prefix, flag.name),
                    span: flag.span,
                })
            }
        };
        Some(Box::new(value))
    } else {
        None
    };

    Ok(Argument::Flag(FlagArgument {
        name: token.value.trim_start_matches('-').to_string(),
        long,
        value,
        span: parser.span_from(token.span.start),
    }))
}

fn word_to_string(word: WordArgument) -> Expr {
    Expr::String(StringExpr {
        value: word.text,
        style: StringStyle::Bare,
        span: word.span,
    })
}

/// The maximal run of byte-adjacent tokens starting at the cursor.
pub fn parse_word(parser: &mut Parser) -> Result<WordArgument, Error> {
    let first = parser.advance().clone();
    let mut text = first.value.clone();
    let mut span = first.span;

    while parser.current_is_adjacent() && continues_word(parser.current_token_kind()) {
        let token = parser.advance();
        text.push_str(&token.value);
        span = span.to(&token.span);
    }

    Ok(WordArgument { text, span })
}

pub fn parse_integer_literal(text: &str) -> Option<NumberValue> {
    let cleaned = text.replace('_', "");

    let (digits, radix) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (rest, 2)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (rest, 8)
    } else {
        (cleaned.as_str(), 10)
    };

    let value = u64::from_str_radix(digits, radix).ok()?;
    Some(match i64::try_from(value) {
        Ok(int) => NumberValue::Int(int),
        Err(_) => NumberValue::UInt(value),
    })
}

fn parse_number(token: &Token) -> Result<NumberValue, Error> {
    let number_error = || {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.span,
        )
    };

    match token.kind {
        TokenKind::Integer => parse_integer_literal(&token.value).ok_or_else(number_error),
        _ => token
            .value
            .parse::<f64>()
            .map(NumberValue::Float)
            .map_err(|_| number_error()),
    }
}

/// `-` immediately followed by a number literal, as one negative number.
pub fn parse_negative_number(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::Dash)?.span.start;
    let token = parser.current_token().clone();
    if !matches!(token.kind, TokenKind::Integer | TokenKind::Float) {
        return Err(parser.unexpected());
    }
    parser.advance();

    let value = match parse_number(&token)? {
        NumberValue::Int(int) => NumberValue::Int(-int),
        // Only `-9223372036854775808` still fits once negated
        NumberValue::UInt(uint) => i64::try_from(-i128::from(uint))
            .map(NumberValue::Int)
            .map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: format!("-{}", token.value),
                    },
                    parser.span_from(start),
                )
            })?,
        NumberValue::Float(float) => NumberValue::Float(-float),
    };

    Ok(Expr::Number(NumberExpr {
        value,
        span: parser.span_from(start),
    }))
}

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    parser.nested(|p| parse_pratt_expr(p, bp))
}

fn parse_pratt_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        if parser.at_expression_end() && token_kind != TokenKind::Invalid {
            return Err(parser.expected_expression());
        }
        return Err(parser.unexpected());
    };

    let left = nud(parser)?;
    extend_expr(parser, left, bp)
}

/// While the next operator binds tighter than `bp`, keep extending `left`.
fn extend_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let depth = parser.depth();
    let result = extend_operators(parser, left, bp);
    parser.set_depth(depth);
    result
}

fn extend_operators(parser: &mut Parser, mut left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    loop {
        let token_kind = parser.current_token_kind();
        let Some(next_bp) = parser.get_bp_lookup().get(&token_kind).copied() else {
            break;
        };
        if next_bp <= bp {
            break;
        }
        // `f (x)` and `a [0]` are command-style arguments, not calls or indexing
        if matches!(token_kind, TokenKind::OpenParen | TokenKind::OpenBracket)
            && !parser.current_is_adjacent()
        {
            break;
        }
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };

        // Each operator wraps `left` one level deeper
        parser.deepen()?;
        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();

    let expr = match token.kind {
        TokenKind::Integer | TokenKind::Float => Expr::Number(NumberExpr {
            value: parse_number(&token)?,
            span: token.span,
        }),
        TokenKind::String
        | TokenKind::SingleString
        | TokenKind::TripleString
        | TokenKind::RawString
        | TokenKind::BacktickString => Expr::String(StringExpr {
            value: string_value(&token),
            style: string_style(token.kind),
            span: token.span,
        }),
        TokenKind::True | TokenKind::False => Expr::Bool(BoolExpr {
            value: token.kind == TokenKind::True,
            span: token.span,
        }),
        TokenKind::Null => Expr::Null(NullExpr { span: token.span }),
        TokenKind::Identifier => {
            let ident = parser.mk_ident(&token);
            Expr::Symbol(SymbolExpr {
                builtin: is_builtin_command(&ident.name),
                ident,
                span: token.span,
            })
        }
        TokenKind::Variable => Expr::Variable(VariableExpr {
            ident: parser.mk_ident(&token),
            span: token.span,
        }),
        TokenKind::EnvVariable => Expr::EnvVariable(EnvVariableExpr {
            name: token.value.trim_start_matches("$env.").to_string(),
            span: token.span,
        }),
        TokenKind::SpecialVariable => {
            let variable = match token.value.as_str() {
                "$it" => SpecialVariable::It,
                "$err" => SpecialVariable::Err,
                _ => SpecialVariable::Underscore,
            };
            Expr::SpecialVariable(SpecialVariableExpr {
                variable,
                span: token.span,
            })
        }
        _ => return Err(parser.unexpected()),
    };

    parser.advance();
    Ok(expr)
}

fn string_style(kind: TokenKind) -> StringStyle {
    match kind {
        TokenKind::SingleString => StringStyle::Single,
        TokenKind::TripleString => StringStyle::Triple,
        TokenKind::RawString => StringStyle::Raw,
        TokenKind::BacktickString => StringStyle::Backtick,
        _ => StringStyle::Double,
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::NullCoalesce => BinaryOp::NullCoalesce,
        TokenKind::Or | TokenKind::OrKeyword => BinaryOp::Or,
        TokenKind::And | TokenKind::AndKeyword => BinaryOp::And,
        TokenKind::Equals => BinaryOp::Equals,
        TokenKind::NotEquals => BinaryOp::NotEquals,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEquals,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEquals,
        TokenKind::RegexMatch => BinaryOp::RegexMatch,
        TokenKind::RegexNotMatch => BinaryOp::RegexNotMatch,
        TokenKind::In => BinaryOp::In,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Subtract,
        TokenKind::PlusPlus => BinaryOp::Concat,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        _ => return None,
    };
    Some(op)
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let Some(operator) = binary_op(parser.current_token_kind()) else {
        return Err(parser.unexpected());
    };
    parser.advance();
    parser.skip_newlines();

    let right = parse_expr(parser, bp)?;

    let span = left.span().to(&right.span());
    Ok(Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    }))
}

/// `$a -b`: the lexer reads `-b` as a short flag, but after an operand it
/// can only be a subtraction of the name `b`.
pub fn parse_flag_subtraction(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    let name = token.value.trim_start_matches('-');
    if token.value.len() - name.len() != 1 || name.contains('-') {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("put a space after `-` to subtract"),
            },
            token.span,
        ));
    }
    parser.advance();

    let operand_span = Span::new(token.span.start.0 + 1, token.span.end.0);
    let operand = Expr::Symbol(SymbolExpr {
        builtin: is_builtin_command(name),
        ident: Ident {
            name: name.to_string(),
            span: operand_span,
            id: parser.advance_id(),
        },
        span: operand_span,
    });
    let right = extend_expr(parser, operand, bp)?;

    let span = left.span().to(&right.span());
    Ok(Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator: BinaryOp::Subtract,
        right: Box::new(right),
        span,
    }))
}

pub fn parse_range_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    let inclusive = parser.advance().kind == TokenKind::DotDotEquals;
    let right = parse_expr(parser, BindingPower::Range)?;

    if matches!(
        parser.current_token_kind(),
        TokenKind::DotDot | TokenKind::DotDotEquals
    ) {
        let token = parser.current_token();
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value.clone(),
                message: String::from("ranges cannot be chained"),
            },
            token.span,
        ));
    }

    let span = left.span().to(&right.span());
    Ok(Expr::Range(RangeExpr {
        start: Box::new(left),
        end: Box::new(right),
        inclusive,
        span,
    }))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Negate,
        _ => UnaryOp::Not,
    };

    let right = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::Prefix(PrefixExpr {
        span: operator_token.span.to(&right.span()),
        operator,
        right: Box::new(right),
    }))
}

/// Comma-, newline- or (unless `require_commas`) whitespace-separated
/// items up to `closer`, which is left for the caller.
fn parse_delimited<T>(
    parser: &mut Parser,
    closer: TokenKind,
    require_commas: bool,
    item: fn(&mut Parser) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut items = vec![];

    loop {
        parser.skip_newlines();
        if parser.current_token_kind() == closer {
            break;
        }

        items.push(item(parser)?);

        let had_newline = parser.current_token_kind() == TokenKind::Newline;
        parser.skip_newlines();

        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
            }
            kind if kind == closer => break,
            TokenKind::EOF => return Err(parser.unexpected()),
            _ if require_commas && !had_newline => return Err(parser.unexpected()),
            _ => {}
        }
    }

    Ok(items)
}

fn parse_value(parser: &mut Parser) -> Result<Expr, Error> {
    parse_expr(parser, BindingPower::Default)
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let arguments = parser.with_brace_restriction(false, |p| {
        parse_delimited(p, TokenKind::CloseParen, true, parse_expression)
    })?;
    parser.expect(TokenKind::CloseParen)?;

    let span = parser.span_from(left.span().start);
    Ok(Expr::Call(CallExpr {
        callee: Box::new(left),
        arguments,
        span,
    }))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenBracket)?;

    let index = parser.with_brace_restriction(false, |p| -> Result<Expr, Error> {
        p.skip_newlines();
        let index = parse_required_expression(p)?;
        p.skip_newlines();
        Ok(index)
    })?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(left.span().start);
    Ok(Expr::Index(IndexExpr {
        object: Box::new(left),
        index: Box::new(index),
        span,
    }))
}

pub fn parse_member_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.expect(TokenKind::Dot)?;

    let property = parser.current_token().clone();
    let named = matches!(property.kind, TokenKind::Identifier | TokenKind::Integer)
        || property.kind.is_keyword();
    if !named {
        return Err(parser.unexpected());
    }
    parser.advance();

    let span = parser.span_from(left.span().start);
    Ok(Expr::Member(MemberExpr {
        object: Box::new(left),
        property: property.value,
        property_span: property.span,
        span,
    }))
}

/// `( expr )` is a grouping; `()`, `(a,)` and `(a, b)` are tuples.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenParen)?.span.start;

    parser.with_brace_restriction(false, |p| -> Result<Expr, Error> {
        p.skip_newlines();
        if p.current_token_kind() == TokenKind::CloseParen {
            p.advance();
            return Ok(Expr::Tuple(TupleExpr {
                elements: vec![],
                span: p.span_from(start),
            }));
        }

        let first = parse_expression(p)?;
        p.skip_newlines();

        if p.current_token_kind() != TokenKind::Comma {
            p.expect(TokenKind::CloseParen)?;
            return Ok(Expr::Grouping(GroupingExpr {
                inner: Box::new(first),
                span: p.span_from(start),
            }));
        }

        p.advance();
        let mut elements = vec![first];
        elements.extend(parse_delimited(
            p,
            TokenKind::CloseParen,
            true,
            parse_expression,
        )?);
        p.expect(TokenKind::CloseParen)?;

        Ok(Expr::Tuple(TupleExpr {
            elements,
            span: p.span_from(start),
        }))
    })
}

pub fn parse_list_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;

    let elements = parser.with_brace_restriction(false, |p| {
        parse_delimited(p, TokenKind::CloseBracket, false, parse_value)
    })?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::List(ListExpr {
        elements,
        span: parser.span_from(start),
    }))
}

pub fn parse_set_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::HashCurly)?.span.start;

    let elements = parser.with_brace_restriction(false, |p| {
        parse_delimited(p, TokenKind::CloseCurly, true, parse_value)
    })?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Set(SetExpr {
        elements,
        span: parser.span_from(start),
    }))
}

fn parse_substitution_body(parser: &mut Parser) -> Result<Expr, Error> {
    parser.with_brace_restriction(false, |p| -> Result<Expr, Error> {
        p.skip_newlines();
        if p.at_expression_end() {
            return Err(p.expected_expression());
        }
        let body = parse_pipeline_from(p, true)?;
        p.skip_newlines();
        p.expect(TokenKind::CloseParen)?;
        Ok(body)
    })
}

/// `$( … )`
pub fn parse_command_substitution_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::DollarParen)?.span.start;
    let body = parse_substitution_body(parser)?;

    Ok(Expr::CommandSubstitution(CommandSubstitutionExpr {
        body: Box::new(body),
        span: parser.span_from(start),
    }))
}

/// `<( … )` and `>( … )`
pub fn parse_process_substitution_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance().clone();
    let direction = if open.kind == TokenKind::ProcessIn {
        ProcessDirection::Input
    } else {
        ProcessDirection::Output
    };
    let body = parse_substitution_body(parser)?;

    Ok(Expr::ProcessSubstitution(ProcessSubstitutionExpr {
        direction,
        body: Box::new(body),
        span: parser.span_from(open.span.start),
    }))
}

/// Parameters up to `closer` (not consumed): `$a`, `b: int`, `c = 1`,
/// `...rest`.
pub fn parse_parameters(parser: &mut Parser, closer: TokenKind) -> Result<Vec<Parameter>, Error> {
    let mut parameters = vec![];

    loop {
        parser.skip_newlines();
        if parser.current_token_kind() == closer {
            break;
        }

        parameters.push(parse_parameter(parser, closer)?);
        parser.skip_newlines();

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    Ok(parameters)
}

pub fn parse_parameter(parser: &mut Parser, closer: TokenKind) -> Result<Parameter, Error> {
    let start = parser.get_position();

    let rest = parser.current_token_kind() == TokenKind::Ellipsis;
    if rest {
        parser.advance();
    }

    let token = parser.current_token().clone();
    if !matches!(token.kind, TokenKind::Variable | TokenKind::Identifier) {
        return Err(parser.unexpected());
    }
    parser.advance();
    let name = parser.mk_ident(&token);

    let type_hint = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let default = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        // Inside `|…|` a `||` would swallow the closing bar
        let bp = if closer == TokenKind::Pipe {
            BindingPower::LogicalOr
        } else {
            BindingPower::Default
        };
        Some(parse_expr(parser, bp)?)
    } else {
        None
    };

    Ok(Parameter {
        name,
        type_hint,
        default,
        rest,
        span: parser.span_from(start),
    })
}

/// `|params| -> type { block }` or `|| { block }`
pub fn parse_lambda_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();

    let params = if parser.advance().kind == TokenKind::Or {
        vec![]
    } else {
        let params = parse_parameters(parser, TokenKind::Pipe)?;
        parser.expect(TokenKind::Pipe)?;
        params
    };

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Expr::Lambda(LambdaExpr {
        params,
        return_type,
        body,
        span: parser.span_from(start),
    }))
}

/// What a `{` at the cursor opens, decided by bounded lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceShape {
    EmptyRecord,
    Record,
    Closure,
    RangeExpansion,
    ListExpansion,
    Unknown,
}

fn is_record_key(kind: TokenKind) -> bool {
    kind == TokenKind::Identifier || kind.is_string() || kind.is_keyword()
}

fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Let
            | TokenKind::Const
            | TokenKind::Set
            | TokenKind::Fn
            | TokenKind::Macro
            | TokenKind::Alias
            | TokenKind::Object
            | TokenKind::Enum
            | TokenKind::Test
            | TokenKind::Use
            | TokenKind::From
            | TokenKind::Source
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::If
            | TokenKind::For
            | TokenKind::While
            | TokenKind::Loop
            | TokenKind::Match
            | TokenKind::Try
    )
}

/// Matches `-?int (..|..=) -?int }` starting `offset` tokens ahead.
fn brace_range_len(parser: &Parser, offset: usize) -> Option<usize> {
    let mut i = offset;
    let signed_int = |i: &mut usize| {
        if parser.peek_kind(*i) == TokenKind::Dash {
            *i += 1;
        }
        if parser.peek_kind(*i) == TokenKind::Integer {
            *i += 1;
            true
        } else {
            false
        }
    };

    if !signed_int(&mut i) {
        return None;
    }
    if !matches!(
        parser.peek_kind(i),
        TokenKind::DotDot | TokenKind::DotDotEquals
    ) {
        return None;
    }
    i += 1;
    if !signed_int(&mut i) || parser.peek_kind(i) != TokenKind::CloseCurly {
        return None;
    }

    Some(i - offset)
}

fn classify_brace(parser: &Parser) -> BraceShape {
    let mut offset = 1;
    while parser.peek_kind(offset) == TokenKind::Newline {
        offset += 1;
    }

    let first = parser.peek_kind(offset);
    match first {
        TokenKind::CloseCurly => return BraceShape::EmptyRecord,
        TokenKind::Pipe | TokenKind::Or => return BraceShape::Closure,
        kind if is_record_key(kind) && parser.peek_kind(offset + 1) == TokenKind::Colon => {
            return BraceShape::Record
        }
        _ => {}
    }

    if brace_range_len(parser, 1).is_some() {
        return BraceShape::RangeExpansion;
    }

    let (mut comma, mut colon, mut statement_like) = (false, false, false);
    let mut depth: usize = 0;
    let mut i = 1;

    loop {
        let kind = parser.peek_kind(i);
        if kind == TokenKind::EOF {
            break;
        }
        if kind.closes_group() {
            if depth == 0 {
                break;
            }
            depth -= 1;
        } else if kind.opens_group() {
            depth += 1;
        } else if depth == 0 {
            match kind {
                TokenKind::Comma => comma = true,
                TokenKind::Colon => colon = true,
                kind if kind.is_terminator() || starts_statement(kind) => statement_like = true,
                _ => {}
            }
        }
        i += 1;
    }

    if comma && !colon && !statement_like {
        BraceShape::ListExpansion
    } else {
        BraceShape::Unknown
    }
}

/// Dispatches a `{` to a record, closure, block or brace expansion.
pub fn parse_brace_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let statement_site = parser.at_statement_start();
    let shape = classify_brace(parser);
    trace!(
        "brace at {} classified as {:?}",
        parser.get_position().0,
        shape
    );

    match shape {
        BraceShape::EmptyRecord | BraceShape::Record => parse_record_expr(parser),
        BraceShape::Closure => parse_closure_expr(parser),
        BraceShape::RangeExpansion => parse_brace_range(parser),
        BraceShape::ListExpansion => parse_brace_list(parser),
        BraceShape::Unknown => {
            if let Some(record) = parser.speculate(parse_record_expr) {
                return Ok(record);
            }

            let open = parser.current_token().span;
            let fallback = if statement_site {
                parse_block_expr(parser)
            } else {
                parse_closure_expr(parser)
            };

            fallback.map_err(|error| {
                Error::new(
                    ErrorImpl::AmbiguousBrace {
                        message: error.to_string(),
                    },
                    open,
                )
            })
        }
    }
}

pub fn parse_record_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let fields = parser.with_brace_restriction(false, |p| {
        parse_delimited(p, TokenKind::CloseCurly, true, parse_record_field)
    })?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Record(RecordExpr {
        fields,
        span: parser.span_from(start),
    }))
}

fn parse_record_field(parser: &mut Parser) -> Result<RecordField, Error> {
    let key_token = parser.current_token().clone();
    if !is_record_key(key_token.kind) {
        return Err(parser.unexpected());
    }
    parser.advance();

    let key = if key_token.kind.is_string() {
        string_value(&key_token)
    } else {
        key_token.value.clone()
    };

    parser.expect(TokenKind::Colon)?;
    parser.skip_newlines();
    let value = parse_required_expression(parser)?;

    Ok(RecordField {
        key,
        key_span: key_token.span,
        value,
        span: parser.span_from(key_token.span.start),
    })
}

/// `{ |params| statements }`, `{ || statements }` or `{ statements }`.
pub fn parse_closure_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let params = match parser.current_token_kind() {
        TokenKind::Or => {
            parser.advance();
            Some(vec![])
        }
        TokenKind::Pipe => {
            parser.advance();
            let params = parse_parameters(parser, TokenKind::Pipe)?;
            parser.expect(TokenKind::Pipe)?;
            Some(params)
        }
        _ => None,
    };

    let body_start = if params.is_some() {
        parser.get_position()
    } else {
        start
    };

    let statements = parser.with_brace_restriction(false, |p| {
        parse_statements(p, Some(TokenKind::CloseCurly))
    });
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Closure(ClosureExpr {
        params,
        body: Block {
            statements,
            span: parser.span_from(body_start),
        },
        span: parser.span_from(start),
    }))
}

pub fn parse_block_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let block = parse_block(parser)?;
    Ok(Expr::Block(BlockExpr {
        span: block.span,
        block,
    }))
}

fn parse_signed_int(parser: &mut Parser) -> Result<i64, Error> {
    if parser.current_token_kind() == TokenKind::Dash {
        match parse_negative_number(parser)? {
            Expr::Number(NumberExpr {
                value: NumberValue::Int(value),
                ..
            }) => Ok(value),
            _ => Err(parser.unexpected()),
        }
    } else {
        let token = parser.expect(TokenKind::Integer)?;
        match parse_number(&token)? {
            NumberValue::Int(value) => Ok(value),
            NumberValue::UInt(_) | NumberValue::Float(_) => Err(parser.unexpected()),
        }
    }
}

/// `{1..5}` / `{1..=5}`
fn parse_brace_range(parser: &mut Parser) -> Result<Expr, Error> {
    let start_pos = parser.expect(TokenKind::OpenCurly)?.span.start;

    let start = parse_signed_int(parser)?;
    let inclusive = parser.advance().kind == TokenKind::DotDotEquals;
    let end = parse_signed_int(parser)?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::BraceExpansion(BraceExpansionExpr {
        expansion: BraceExpansion::Range {
            start,
            end,
            inclusive,
        },
        span: parser.span_from(start_pos),
    }))
}

/// `{a,b,c}`: items are taken verbatim.
fn parse_brace_list(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut items = vec![];
    let mut text = String::new();
    let mut item_span: Option<Span> = None;
    let mut depth: usize = 0;

    loop {
        let token = parser.current_token().clone();

        match token.kind {
            TokenKind::EOF => return Err(parser.unexpected()),
            TokenKind::Comma | TokenKind::CloseCurly if depth == 0 => {
                let empty = Span {
                    start: token.span.start,
                    end: token.span.start,
                };
                items.push(WordArgument {
                    text: std::mem::take(&mut text),
                    span: item_span.take().unwrap_or(empty),
                });
                parser.advance();
                if token.kind == TokenKind::CloseCurly {
                    break;
                }
            }
            kind => {
                if kind.opens_group() {
                    depth += 1;
                } else if kind.closes_group() {
                    depth = depth.saturating_sub(1);
                }
                if !text.is_empty() && !parser.current_is_adjacent() {
                    text.push(' ');
                }
                text.push_str(&token.value);
                item_span = Some(item_span.map_or(token.span, |span| span.to(&token.span)));
                parser.advance();
            }
        }
    }

    Ok(Expr::BraceExpansion(BraceExpansionExpr {
        expansion: BraceExpansion::List(items),
        span: parser.span_from(start),
    }))
}
