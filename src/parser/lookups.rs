use std::collections::HashMap;

use crate::{
    ast::ast::{Expr, Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Operator binding powers, weakest first. Only infix and postfix tokens get
/// one; everything else ends a Pratt loop.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Coalesce,
    LogicalOr,
    LogicalAnd,
    Relational,
    Range,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::NullCoalesce, BindingPower::Coalesce, parse_binary_expr);

    // Logical
    parser.led(TokenKind::Or, BindingPower::LogicalOr, parse_binary_expr);
    parser.led(TokenKind::OrKeyword, BindingPower::LogicalOr, parse_binary_expr);
    parser.led(TokenKind::And, BindingPower::LogicalAnd, parse_binary_expr);
    parser.led(TokenKind::AndKeyword, BindingPower::LogicalAnd, parse_binary_expr);

    // Relational
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Less, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::RegexMatch, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::RegexNotMatch, BindingPower::Relational, parse_binary_expr);
    parser.led(TokenKind::In, BindingPower::Relational, parse_binary_expr);

    parser.led(TokenKind::DotDot, BindingPower::Range, parse_range_expr);
    parser.led(TokenKind::DotDotEquals, BindingPower::Range, parse_range_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::ShortFlag, BindingPower::Additive, parse_flag_subtraction);
    parser.led(TokenKind::PlusPlus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);

    // Postfix, only when written flush against the left operand
    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Call, parse_index_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Integer, parse_primary_expr);
    parser.nud(TokenKind::Float, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::SingleString, parse_primary_expr);
    parser.nud(TokenKind::TripleString, parse_primary_expr);
    parser.nud(TokenKind::RawString, parse_primary_expr);
    parser.nud(TokenKind::BacktickString, parse_primary_expr);
    parser.nud(TokenKind::True, parse_primary_expr);
    parser.nud(TokenKind::False, parse_primary_expr);
    parser.nud(TokenKind::Null, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::Variable, parse_primary_expr);
    parser.nud(TokenKind::EnvVariable, parse_primary_expr);
    parser.nud(TokenKind::SpecialVariable, parse_primary_expr);

    // Prefix
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::NotKeyword, parse_prefix_expr);

    // Groups and collections
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_list_expr);
    parser.nud(TokenKind::OpenCurly, parse_brace_expr);
    parser.nud(TokenKind::HashCurly, parse_set_expr);
    parser.nud(TokenKind::DollarParen, parse_command_substitution_expr);
    parser.nud(TokenKind::ProcessIn, parse_process_substitution_expr);
    parser.nud(TokenKind::ProcessOut, parse_process_substitution_expr);

    // Lambdas
    parser.nud(TokenKind::Pipe, parse_lambda_expr);
    parser.nud(TokenKind::Or, parse_lambda_expr);

    // Statements
    parser.stmt(TokenKind::Let, parse_var_decl_stmt);
    parser.stmt(TokenKind::Const, parse_var_decl_stmt);
    parser.stmt(TokenKind::Set, parse_var_decl_stmt);
    parser.stmt(TokenKind::Fn, parse_fn_decl_stmt);
    parser.stmt(TokenKind::Macro, parse_macro_decl_stmt);
    parser.stmt(TokenKind::Alias, parse_alias_stmt);
    parser.stmt(TokenKind::Object, parse_object_decl_stmt);
    parser.stmt(TokenKind::Enum, parse_enum_decl_stmt);
    parser.stmt(TokenKind::At, parse_decorated_stmt);
    parser.stmt(TokenKind::Test, parse_test_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::Loop, parse_loop_stmt);
    parser.stmt(TokenKind::Match, parse_match_stmt);
    parser.stmt(TokenKind::Try, parse_try_stmt);
    parser.stmt(TokenKind::Use, parse_use_stmt);
    parser.stmt(TokenKind::From, parse_from_import_stmt);
    parser.stmt(TokenKind::Source, parse_source_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Break, parse_break_stmt);
    parser.stmt(TokenKind::Continue, parse_continue_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
