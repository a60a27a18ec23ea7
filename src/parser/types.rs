//! Type-hint parsing implementation.
//!
//! This module handles parsing of the surface type-hint syntax used on
//! parameters, fields, variables and return types. It supports:
//!
//! - Named types (`int`, `Dog`) with optional generic arguments (`map<string, int>`)
//! - Array types (`int[]`)
//! - Optional types (`string?`)
//! - Function types (`fn(int) -> int`)
//!
//! Similar to expression parsing, it uses NUD/LED handlers with
//! binding powers for parsing compound type hints.

use std::collections::HashMap;

use crate::{
    ast::types::{ArrayType, FunctionType, NamedType, OptionalType, TypeHint},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeHint, Error>;

/// Type alias for type left denotation handler functions.
pub type TypeLEDHandler = fn(&mut Parser, TypeHint, BindingPower) -> Result<TypeHint, Error>;

pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

/// Initializes the type parsing lookup tables.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_named_type);
    parser.type_nud(TokenKind::Null, parse_named_type);
    parser.type_nud(TokenKind::Fn, parse_function_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
    parser.type_led(TokenKind::Question, BindingPower::Call, parse_optional_type);
}

pub fn parse_named_type(parser: &mut Parser) -> Result<TypeHint, Error> {
    let token = parser.advance().clone();
    let mut arguments = vec![];

    if parser.current_token_kind() == TokenKind::Less && parser.current_is_adjacent() {
        parser.advance();
        loop {
            arguments.push(parse_type(parser, BindingPower::Default)?);
            if parser.current_token_kind() == TokenKind::Comma {
                parser.advance();
                continue;
            }
            break;
        }
        parser.expect(TokenKind::Greater)?;
    }

    Ok(TypeHint::Named(NamedType {
        name: token.value.clone(),
        arguments,
        span: parser.span_from(token.span.start),
    }))
}

pub fn parse_function_type(parser: &mut Parser) -> Result<TypeHint, Error> {
    let start = parser.advance().span.start;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        parameters.push(parse_type(parser, BindingPower::Default)?);
        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(Box::new(parse_type(parser, BindingPower::Default)?))
    } else {
        None
    };

    Ok(TypeHint::Function(FunctionType {
        parameters,
        return_type,
        span: parser.span_from(start),
    }))
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: TypeHint,
    _bp: BindingPower,
) -> Result<TypeHint, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    let span = parser.span_from(left.span().start);
    Ok(TypeHint::Array(ArrayType {
        underlying: Box::new(left),
        span,
    }))
}

pub fn parse_optional_type(
    parser: &mut Parser,
    left: TypeHint,
    _bp: BindingPower,
) -> Result<TypeHint, Error> {
    parser.expect(TokenKind::Question)?;

    let span = parser.span_from(left.span().start);
    Ok(TypeHint::Optional(OptionalType {
        underlying: Box::new(left),
        span,
    }))
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<TypeHint, Error> {
    parser.nested(|p| parse_type_hint(p, bp))
}

fn parse_type_hint(parser: &mut Parser, bp: BindingPower) -> Result<TypeHint, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_type_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected());
    };

    let mut left = nud(parser)?;

    // Postfix forms only bind when written flush against the type
    while parser.current_is_adjacent() {
        let token_kind = parser.current_token_kind();
        let Some(next_bp) = parser.get_type_bp_lookup().get(&token_kind).copied() else {
            break;
        };
        if next_bp <= bp {
            break;
        }
        let Some(led) = parser.get_type_led_lookup().get(&token_kind).copied() else {
            break;
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}
