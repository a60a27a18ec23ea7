//! Parsing of `match` arm patterns.

use log::trace;

use crate::{
    ast::patterns::{
        BindingPattern, ListPattern, LiteralPattern, Pattern, RecordPattern, RecordPatternField,
        RestPattern, WildcardPattern,
    },
    ast::ast::Ident,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_negative_number, parse_primary_expr},
    parser::Parser,
};

pub fn parse_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    parser.nested(parse_pattern_inner)
}

fn parse_pattern_inner(parser: &mut Parser) -> Result<Pattern, Error> {
    let token = parser.current_token().clone();
    trace!("parse_pattern {} at {}", token.kind, token.span.start.0);

    match token.kind {
        kind if kind.is_string()
            || matches!(
                kind,
                TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Null
            ) =>
        {
            let value = parse_primary_expr(parser)?;
            Ok(Pattern::Literal(LiteralPattern {
                span: value.span(),
                value,
            }))
        }
        TokenKind::Dash if matches!(parser.peek_kind(1), TokenKind::Integer | TokenKind::Float) => {
            let value = parse_negative_number(parser)?;
            Ok(Pattern::Literal(LiteralPattern {
                span: value.span(),
                value,
            }))
        }
        TokenKind::Identifier if token.value == "_" => {
            parser.advance();
            Ok(Pattern::Wildcard(WildcardPattern { span: token.span }))
        }
        TokenKind::Identifier if parser.peek_kind(1) == TokenKind::OpenCurly => {
            parser.advance();
            let type_name = parser.mk_ident(&token);
            parse_record_pattern(parser, Some(type_name))
        }
        TokenKind::Identifier | TokenKind::Variable => {
            parser.advance();
            Ok(Pattern::Binding(BindingPattern {
                ident: parser.mk_ident(&token),
                span: token.span,
            }))
        }
        TokenKind::OpenCurly => parse_record_pattern(parser, None),
        TokenKind::OpenBracket => parse_list_pattern(parser),
        _ => Err(parser.unexpected()),
    }
}

fn parse_record_pattern(parser: &mut Parser, type_name: Option<Ident>) -> Result<Pattern, Error> {
    let start = type_name
        .as_ref()
        .map_or_else(|| parser.get_position(), |name| name.span.start);
    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];
    loop {
        parser.skip_newlines();
        if parser.current_token_kind() == TokenKind::CloseCurly {
            break;
        }

        let key_token = parser.current_token().clone();
        if !matches!(key_token.kind, TokenKind::Identifier | TokenKind::Variable) {
            return Err(parser.unexpected());
        }
        parser.advance();
        let key = parser.mk_ident(&key_token);

        let pattern = if parser.current_token_kind() == TokenKind::Colon {
            parser.advance();
            Some(parse_pattern(parser)?)
        } else {
            None
        };

        fields.push(RecordPatternField {
            key,
            pattern,
            span: parser.span_from(key_token.span.start),
        });

        parser.skip_newlines();
        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
            }
            TokenKind::CloseCurly => break,
            _ => return Err(parser.unexpected()),
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Pattern::Record(RecordPattern {
        type_name,
        fields,
        span: parser.span_from(start),
    }))
}

/// `[a, b, ...rest]`. At most one rest marker, anywhere in the list.
fn parse_list_pattern(parser: &mut Parser) -> Result<Pattern, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;

    let mut elements = vec![];
    let mut rest: Option<RestPattern> = None;

    loop {
        parser.skip_newlines();
        if parser.current_token_kind() == TokenKind::CloseBracket {
            break;
        }

        if parser.current_token_kind() == TokenKind::Ellipsis {
            let marker_start = parser.advance().span.start;
            let binding = if matches!(
                parser.current_token_kind(),
                TokenKind::Identifier | TokenKind::Variable
            ) && parser.current_is_adjacent()
            {
                let token = parser.advance().clone();
                Some(parser.mk_ident(&token))
            } else {
                None
            };

            let marker = RestPattern {
                binding,
                position: elements.len(),
                span: parser.span_from(marker_start),
            };
            if rest.is_some() {
                return Err(Error::new(ErrorImpl::DuplicateRestPattern, marker.span));
            }
            rest = Some(marker);
        } else {
            elements.push(parse_pattern(parser)?);
        }

        parser.skip_newlines();
        match parser.current_token_kind() {
            TokenKind::Comma => {
                parser.advance();
            }
            TokenKind::CloseBracket => break,
            _ => return Err(parser.unexpected()),
        }
    }
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Pattern::List(ListPattern {
        elements,
        rest,
        span: parser.span_from(start),
    }))
}
