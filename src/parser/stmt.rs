use log::trace;

use crate::{
    ast::{
        ast::{Expr, Ident, Stmt},
        statements::{
            AliasStmt, ArmBody, Block, BreakStmt, CatchClause, ContinueStmt, DeclKeyword,
            Decorator, ElifBranch, EnumDeclStmt, EnumVariant, ExpressionStmt, FnDeclStmt,
            ForStmt, FromImportStmt, IfStmt, ImportItem, LoopStmt, MacroDeclStmt,
            MacroParamStyle, MatchArm, MatchStmt, ModulePath, ObjectDeclStmt, ObjectField,
            ObjectMember, ReturnStmt, SourceStmt, TestStmt, TryStmt, UseStmt, VarDeclStmt,
            WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{lexer::string_value, tokens::TokenKind},
    parser::{
        expr::{
            parse_expr, parse_expression, parse_parameter, parse_parameters,
            parse_required_expression, parse_word,
        },
        lookups::BindingPower,
    },
    Position,
};

use super::{
    parser::{parse_statements, Parser},
    pattern::parse_pattern,
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();
    trace!("parse_stmt {} at {}", kind, parser.get_position().0);

    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        return handler(parser);
    }

    parser.mark_statement_start();
    let expression = parse_expression(parser)?;

    Ok(Stmt::Expression(ExpressionStmt {
        span: expression.span(),
        expression,
    }))
}

/// `{ statements }`
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    parser.nested(|parser| {
        let start = parser.expect(TokenKind::OpenCurly)?.span.start;

        let statements = parser.with_brace_restriction(false, |p| {
            parse_statements(p, Some(TokenKind::CloseCurly))
        });
        parser.expect(TokenKind::CloseCurly)?;

        Ok(Block {
            statements,
            span: parser.span_from(start),
        })
    })
}

/// Condition heads: a `{` here opens the body, never an argument.
fn parse_condition(parser: &mut Parser) -> Result<Expr, Error> {
    parser.with_brace_restriction(true, parse_required_expression)
}

fn expect_name(parser: &mut Parser, context: &str) -> Result<Ident, Error> {
    let token = parser.current_token().clone();
    if !matches!(token.kind, TokenKind::Identifier | TokenKind::Variable) {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value,
                message: format!("expected identifier {}", context),
            },
            token.span,
        ));
    }

    parser.advance();
    Ok(parser.mk_ident(&token))
}

fn parse_optional_alias(parser: &mut Parser) -> Result<Option<Ident>, Error> {
    if parser.current_token_kind() != TokenKind::As {
        return Ok(None);
    }
    parser.advance();
    Ok(Some(expect_name(parser, "after `as`")?))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();
    let keyword = match start_token.kind {
        TokenKind::Let => DeclKeyword::Let,
        TokenKind::Const => DeclKeyword::Const,
        _ => DeclKeyword::Set,
    };

    let name = expect_name(parser, "during variable declaration")?;

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Assignment)?;
    let value = parse_required_expression(parser)?;

    Ok(Stmt::VarDecl(VarDeclStmt {
        keyword,
        name,
        explicit_type,
        value,
        span: parser.span_from(start_token.span.start),
    }))
}

fn parse_decorators(parser: &mut Parser) -> Result<Vec<Decorator>, Error> {
    let mut decorators = vec![];

    while parser.current_token_kind() == TokenKind::At {
        let start = parser.advance().span.start;
        let name_token = parser.expect(TokenKind::Identifier)?;
        let name = parser.mk_ident(&name_token);

        let mut arguments = vec![];
        if parser.current_token_kind() == TokenKind::OpenParen && parser.current_is_adjacent() {
            parser.advance();
            parser.with_brace_restriction(false, |p| -> Result<(), Error> {
                loop {
                    p.skip_newlines();
                    if p.current_token_kind() == TokenKind::CloseParen {
                        break;
                    }
                    arguments.push(parse_expression(p)?);
                    p.skip_newlines();
                    if p.current_token_kind() != TokenKind::Comma {
                        break;
                    }
                    p.advance();
                }
                Ok(())
            })?;
            parser.expect(TokenKind::CloseParen)?;
        }

        decorators.push(Decorator {
            name,
            arguments,
            span: parser.span_from(start),
        });
        parser.skip_newlines();
    }

    Ok(decorators)
}

pub fn parse_decorated_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let decorators = parse_decorators(parser)?;

    match parser.current_token_kind() {
        TokenKind::Fn => Ok(Stmt::FnDecl(parse_fn_decl(parser, decorators)?)),
        TokenKind::Macro => parse_macro_decl(parser, decorators),
        TokenKind::Alias => parse_alias(parser, decorators),
        TokenKind::Object => parse_object_decl(parser, decorators),
        TokenKind::Enum => parse_enum_decl(parser, decorators),
        _ => {
            let token = parser.current_token();
            Err(Error::new(
                ErrorImpl::MisplacedDecorator {
                    token: token.value.clone(),
                },
                token.span,
            ))
        }
    }
}

fn decorated_start(parser: &Parser, decorators: &[Decorator]) -> Position {
    decorators
        .first()
        .map_or_else(|| parser.get_position(), |d| d.span.start)
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::FnDecl(parse_fn_decl(parser, vec![])?))
}

/// `fn name(params) (-> type)? { body }`
fn parse_fn_decl(parser: &mut Parser, decorators: Vec<Decorator>) -> Result<FnDeclStmt, Error> {
    let start = decorated_start(parser, &decorators);
    parser.expect(TokenKind::Fn)?;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = parser.mk_ident(&name_token);

    parser.expect(TokenKind::OpenParen)?;
    let parameters = parse_parameters(parser, TokenKind::CloseParen)?;
    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(FnDeclStmt {
        decorators,
        name,
        parameters,
        return_type,
        body,
        span: parser.span_from(start),
    })
}

pub fn parse_macro_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_macro_decl(parser, vec![])
}

fn parse_macro_decl(parser: &mut Parser, decorators: Vec<Decorator>) -> Result<Stmt, Error> {
    let start = decorated_start(parser, &decorators);
    parser.expect(TokenKind::Macro)?;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = parser.mk_ident(&name_token);

    let (style, parameters) = if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        let parameters = parse_parameters(parser, TokenKind::CloseParen)?;
        parser.expect(TokenKind::CloseParen)?;
        (MacroParamStyle::Parenthesized, parameters)
    } else {
        let mut parameters = vec![];
        while matches!(
            parser.current_token_kind(),
            TokenKind::Variable | TokenKind::Ellipsis
        ) {
            parameters.push(parse_parameter(parser, TokenKind::OpenCurly)?);
        }
        (MacroParamStyle::ShellStyle, parameters)
    };

    let body = parse_block(parser)?;

    Ok(Stmt::MacroDecl(MacroDeclStmt {
        decorators,
        name,
        style,
        parameters,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_alias_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_alias(parser, vec![])
}

/// `alias name = expression`
fn parse_alias(parser: &mut Parser, decorators: Vec<Decorator>) -> Result<Stmt, Error> {
    let start = decorated_start(parser, &decorators);
    parser.expect(TokenKind::Alias)?;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = parser.mk_ident(&name_token);

    parser.expect(TokenKind::Assignment)?;
    let value = parse_required_expression(parser)?;

    Ok(Stmt::Alias(AliasStmt {
        decorators,
        name,
        value,
        span: parser.span_from(start),
    }))
}

/// Skips newlines, `;` and commas between members of a braced body.
fn skip_member_separators(parser: &mut Parser) {
    while parser.current_token_kind().is_terminator()
        || parser.current_token_kind() == TokenKind::Comma
    {
        parser.advance();
    }
}

fn expect_member_end(parser: &Parser) -> Result<(), Error> {
    let kind = parser.current_token_kind();
    if kind.is_terminator() || matches!(kind, TokenKind::Comma | TokenKind::CloseCurly) {
        Ok(())
    } else {
        Err(parser.unexpected())
    }
}

pub fn parse_object_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_object_decl(parser, vec![])
}

fn parse_object_decl(parser: &mut Parser, decorators: Vec<Decorator>) -> Result<Stmt, Error> {
    let start = decorated_start(parser, &decorators);
    parser.expect(TokenKind::Object)?;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = parser.mk_ident(&name_token);
    parser.expect(TokenKind::OpenCurly)?;

    let mut members = vec![];
    loop {
        skip_member_separators(parser);
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::At | TokenKind::Fn => {
                let method_decorators = parse_decorators(parser)?;
                if parser.current_token_kind() != TokenKind::Fn {
                    let token = parser.current_token();
                    return Err(Error::new(
                        ErrorImpl::MisplacedDecorator {
                            token: token.value.clone(),
                        },
                        token.span,
                    ));
                }
                members.push(ObjectMember::Method(parse_fn_decl(
                    parser,
                    method_decorators,
                )?));
            }
            _ => members.push(ObjectMember::Field(parse_object_field(parser)?)),
        }
        expect_member_end(parser)?;
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt::ObjectDecl(ObjectDeclStmt {
        decorators,
        name,
        members,
        span: parser.span_from(start),
    }))
}

fn parse_object_field(parser: &mut Parser) -> Result<ObjectField, Error> {
    let start = parser.get_position();
    let name = expect_name(parser, "in object field")?;

    let type_hint = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let default = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(ObjectField {
        name,
        type_hint,
        default,
        span: parser.span_from(start),
    })
}

pub fn parse_enum_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    parse_enum_decl(parser, vec![])
}

fn parse_enum_decl(parser: &mut Parser, decorators: Vec<Decorator>) -> Result<Stmt, Error> {
    let start = decorated_start(parser, &decorators);
    parser.expect(TokenKind::Enum)?;

    let name_token = parser.expect(TokenKind::Identifier)?;
    let name = parser.mk_ident(&name_token);
    parser.expect(TokenKind::OpenCurly)?;

    let mut variants = vec![];
    loop {
        skip_member_separators(parser);
        if parser.current_token_kind() == TokenKind::CloseCurly {
            break;
        }

        let variant_start = parser.get_position();
        let variant_token = parser.expect(TokenKind::Identifier)?;
        let variant_name = parser.mk_ident(&variant_token);
        let value = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        variants.push(EnumVariant {
            name: variant_name,
            value,
            span: parser.span_from(variant_start),
        });
        expect_member_end(parser)?;
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt::EnumDecl(EnumDeclStmt {
        decorators,
        name,
        variants,
        span: parser.span_from(start),
    }))
}

/// `test "name" { body }`
pub fn parse_test_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let name_token = parser.current_token().clone();
    if !name_token.kind.is_string() {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: name_token.value,
                message: String::from("expected a test name string"),
            },
            name_token.span,
        ));
    }
    parser.advance();

    let body = parse_block(parser)?;

    Ok(Stmt::Test(TestStmt {
        name: string_value(&name_token),
        name_span: name_token.span,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let condition = parse_condition(parser)?;
    let body = parse_block(parser)?;

    let mut elif_branches = vec![];
    let mut else_body = None;

    loop {
        match parser.peek_past_newlines() {
            TokenKind::Elif => {
                parser.skip_newlines();
                let branch_start = parser.advance().span.start;
                let condition = parse_condition(parser)?;
                let body = parse_block(parser)?;
                elif_branches.push(ElifBranch {
                    condition,
                    body,
                    span: parser.span_from(branch_start),
                });
            }
            TokenKind::Else => {
                parser.skip_newlines();
                let branch_start = parser.advance().span.start;

                if parser.current_token_kind() != TokenKind::If {
                    else_body = Some(parse_block(parser)?);
                    break;
                }

                // `else if` reads as `elif`
                parser.advance();
                let condition = parse_condition(parser)?;
                let body = parse_block(parser)?;
                elif_branches.push(ElifBranch {
                    condition,
                    body,
                    span: parser.span_from(branch_start),
                });
            }
            _ => break,
        }
    }

    Ok(Stmt::If(IfStmt {
        condition,
        body,
        elif_branches,
        else_body,
        span: parser.span_from(start),
    }))
}

/// `for $a, $b in iterable { body }`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let mut variables = vec![expect_name(parser, "in for loop")?];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        variables.push(expect_name(parser, "in for loop")?);
    }

    parser.expect(TokenKind::In)?;
    let iterable = parse_condition(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::For(ForStmt {
        variables,
        iterable,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let condition = parse_condition(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::While(WhileStmt {
        condition,
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_loop_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let body = parse_block(parser)?;

    Ok(Stmt::Loop(LoopStmt {
        body,
        span: parser.span_from(start),
    }))
}

pub fn parse_match_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let scrutinee = parse_condition(parser)?;
    parser.expect(TokenKind::OpenCurly)?;

    let arms = parser.with_brace_restriction(false, |p| -> Result<Vec<MatchArm>, Error> {
        let mut arms = vec![];
        loop {
            skip_member_separators(p);
            if p.current_token_kind() == TokenKind::CloseCurly {
                break;
            }
            arms.push(parse_match_arm(p)?);
            expect_member_end(p)?;
        }
        Ok(arms)
    })?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Stmt::Match(MatchStmt {
        scrutinee,
        arms,
        span: parser.span_from(start),
    }))
}

/// `pattern (if guard)? => body`
fn parse_match_arm(parser: &mut Parser) -> Result<MatchArm, Error> {
    let start = parser.get_position();
    let pattern = parse_pattern(parser)?;

    let guard = if parser.current_token_kind() == TokenKind::If {
        parser.advance();
        Some(parse_condition(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::FatArrow)?;
    parser.skip_newlines();

    let body = if parser.current_token_kind() == TokenKind::OpenCurly {
        ArmBody::Block(parse_block(parser)?)
    } else {
        ArmBody::Expression(parse_required_expression(parser)?)
    };

    Ok(MatchArm {
        pattern,
        guard,
        body,
        span: parser.span_from(start),
    })
}

/// `try { } (catch $err? { })?`
pub fn parse_try_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let body = parse_block(parser)?;

    let catch = if parser.peek_past_newlines() == TokenKind::Catch {
        parser.skip_newlines();
        let catch_start = parser.advance().span.start;
        let binding = match parser.current_token_kind() {
            TokenKind::Variable | TokenKind::Identifier => Some(expect_name(parser, "in catch")?),
            _ => None,
        };
        let body = parse_block(parser)?;
        Some(CatchClause {
            binding,
            body,
            span: parser.span_from(catch_start),
        })
    } else {
        None
    };

    Ok(Stmt::Try(TryStmt {
        body,
        catch,
        span: parser.span_from(start),
    }))
}

fn parse_module_path(parser: &mut Parser) -> Result<ModulePath, Error> {
    let start = parser.get_position();
    let token = parser.current_token().clone();

    if token.kind.is_string() {
        parser.advance();
        return Ok(ModulePath {
            segments: vec![string_value(&token)],
            quoted: true,
            span: token.span,
        });
    }

    let mut segments = vec![];
    loop {
        let segment = parser.current_token().clone();
        if segment.kind != TokenKind::Identifier && !segment.kind.is_keyword() {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: segment.value,
                    message: String::from("expected a module path"),
                },
                segment.span,
            ));
        }
        parser.advance();
        segments.push(segment.value);

        if parser.current_token_kind() == TokenKind::Dot && parser.current_is_adjacent() {
            parser.advance();
            continue;
        }
        break;
    }

    Ok(ModulePath {
        segments,
        quoted: false,
        span: parser.span_from(start),
    })
}

/// `use a.b.c (as name)?` or `use "path/file.apx" (as name)?`
pub fn parse_use_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let path = parse_module_path(parser)?;
    let alias = parse_optional_alias(parser)?;

    let binding = match &alias {
        Some(alias) => Some(alias.clone()),
        None => match path.default_binding_name() {
            Some(name) => Some(Ident {
                name,
                span: path.span,
                id: parser.advance_id(),
            }),
            None => None,
        },
    };

    Ok(Stmt::Use(UseStmt {
        path,
        alias,
        binding,
        span: parser.span_from(start),
    }))
}

/// `from a.b import x, y as z`, `from a import (x, y)` or `from a import *`
pub fn parse_from_import_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;
    let module = parse_module_path(parser)?;
    parser.expect(TokenKind::Import)?;

    if parser.current_token_kind() == TokenKind::Star {
        parser.advance();
        return Ok(Stmt::FromImport(FromImportStmt {
            module,
            items: vec![],
            glob: true,
            span: parser.span_from(start),
        }));
    }

    let parenthesized = parser.current_token_kind() == TokenKind::OpenParen;
    if parenthesized {
        parser.advance();
    }

    let mut items = vec![];
    loop {
        if parenthesized {
            parser.skip_newlines();
            if parser.current_token_kind() == TokenKind::CloseParen {
                break;
            }
        }

        let item_start = parser.get_position();
        let name_token = parser.expect(TokenKind::Identifier)?;
        let name = parser.mk_ident(&name_token);
        let alias = parse_optional_alias(parser)?;
        items.push(ImportItem {
            name,
            alias,
            span: parser.span_from(item_start),
        });

        if parenthesized {
            parser.skip_newlines();
        }
        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    if parenthesized {
        parser.expect(TokenKind::CloseParen)?;
    }

    Ok(Stmt::FromImport(FromImportStmt {
        module,
        items,
        glob: false,
        span: parser.span_from(start),
    }))
}

/// `source "file" (as name)?` or `source file.apx`
pub fn parse_source_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let token = parser.current_token().clone();
    let (path, path_span) = if token.kind.is_string() {
        parser.advance();
        (string_value(&token), token.span)
    } else if parser.at_expression_end() {
        return Err(parser.expected_expression());
    } else {
        let word = parse_word(parser)?;
        (word.text, word.span)
    };

    let alias = parse_optional_alias(parser)?;

    Ok(Stmt::Source(SourceStmt {
        path,
        path_span,
        alias,
        span: parser.span_from(start),
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start;

    let value = if parser.at_expression_end() {
        None
    } else {
        Some(parse_expression(parser)?)
    };

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: parser.span_from(start),
    }))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span;
    Ok(Stmt::Break(BreakStmt { span }))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let span = parser.advance().span;
    Ok(Stmt::Continue(ContinueStmt { span }))
}
