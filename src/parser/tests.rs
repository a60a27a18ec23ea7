//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations and definitions
//! - Operator precedence
//! - Commands, arguments and pipelines
//! - Brace disambiguation
//! - Control flow statements and match patterns
//! - Imports
//! - Error recovery

use rstest::rstest;

use super::parser::{parse, parse_with_config, ParseOutput};
use crate::{
    ast::{
        ast::{Expr, Program, Stmt},
        expressions::{
            Argument, AssignOp, BinaryOp, BraceExpansion, NumberValue, PipeOp, StringStyle,
            UnaryOp,
        },
        patterns::Pattern,
        statements::{ArmBody, DeclKeyword, MacroParamStyle, ObjectMember},
        types::TypeHint,
    },
    config::ParserConfig,
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> ParseOutput {
    parse(tokenize(source))
}

fn parse_ok(source: &str) -> Program {
    let output = parse_source(source);
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        output.diagnostics
    );
    output.program
}

fn single_stmt(source: &str) -> Stmt {
    let mut program = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "{:?}", program.statements);
    program.statements.remove(0)
}

fn single_expr(source: &str) -> Expr {
    match single_stmt(source) {
        Stmt::Expression(stmt) => stmt.expression,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn error_impls(source: &str) -> Vec<ErrorImpl> {
    parse_source(source)
        .diagnostics
        .iter()
        .map(|d| d.get_impl().clone())
        .collect()
}

#[test]
fn test_parse_variable_declaration() {
    let Stmt::VarDecl(decl) = single_stmt("let x = 42") else {
        panic!("expected a declaration");
    };

    assert_eq!(decl.keyword, DeclKeyword::Let);
    assert_eq!(decl.name.name, "x");
    assert!(decl.explicit_type.is_none());
    assert!(matches!(
        decl.value,
        Expr::Number(ref n) if n.value == NumberValue::Int(42)
    ));
}

#[test]
fn test_parse_const_declaration_with_type() {
    let Stmt::VarDecl(decl) = single_stmt("const PI: float = 3.14") else {
        panic!("expected a declaration");
    };

    assert_eq!(decl.keyword, DeclKeyword::Const);
    assert!(matches!(decl.explicit_type, Some(TypeHint::Named(ref t)) if t.name == "float"));
}

#[test]
fn test_parse_set_strips_sigil() {
    let Stmt::VarDecl(decl) = single_stmt("set $count = 0") else {
        panic!("expected a declaration");
    };

    assert_eq!(decl.keyword, DeclKeyword::Set);
    assert_eq!(decl.name.name, "count");
}

#[test]
fn test_parse_compound_types() {
    let Stmt::VarDecl(decl) = single_stmt("let xs: map<string, int[]>? = {}") else {
        panic!("expected a declaration");
    };

    let Some(TypeHint::Optional(optional)) = decl.explicit_type else {
        panic!("expected an optional type");
    };
    let TypeHint::Named(named) = *optional.underlying else {
        panic!("expected a named type");
    };
    assert_eq!(named.name, "map");
    assert_eq!(named.arguments.len(), 2);
    assert!(matches!(named.arguments[1], TypeHint::Array(_)));
}

#[test]
fn test_parse_function_declaration() {
    let Stmt::FnDecl(decl) = single_stmt("fn add(a: int, b: int) -> int { return a + b }") else {
        panic!("expected a function");
    };

    assert_eq!(decl.name.name, "add");
    assert_eq!(decl.parameters.len(), 2);
    assert!(decl.return_type.is_some());
    assert_eq!(decl.body.statements.len(), 1);

    let Stmt::Return(ret) = &decl.body.statements[0] else {
        panic!("expected a return");
    };
    assert!(matches!(
        ret.value,
        Some(Expr::Binary(ref b)) if b.operator == BinaryOp::Add
    ));
}

#[test]
fn test_parse_rest_and_default_parameters() {
    let Stmt::FnDecl(decl) = single_stmt("fn f($first, $second = 2, ...$rest) { }") else {
        panic!("expected a function");
    };

    assert_eq!(decl.parameters.len(), 3);
    assert!(decl.parameters[1].default.is_some());
    assert!(decl.parameters[2].rest);
    assert_eq!(decl.parameters[2].name.name, "rest");
}

#[rstest]
#[case("1 + 2 * 3", BinaryOp::Add)]
#[case("1 * 2 + 3", BinaryOp::Add)]
#[case("$a ?? $b || $c", BinaryOp::NullCoalesce)]
#[case("$a || $b && $c", BinaryOp::Or)]
#[case("$a and $b or $c", BinaryOp::Or)]
#[case("$a == 1 && $b != 2", BinaryOp::And)]
#[case("$name =~ \"^a\"", BinaryOp::RegexMatch)]
#[case("$x in $list", BinaryOp::In)]
#[case("\"a\" ++ \"b\"", BinaryOp::Concat)]
fn test_parse_operator_precedence(#[case] source: &str, #[case] root: BinaryOp) {
    let Expr::Binary(binary) = single_expr(source) else {
        panic!("expected a binary expression for {:?}", source);
    };
    assert_eq!(binary.operator, root);
}

#[test]
fn test_parse_prefix_binds_tighter_than_and() {
    let Expr::Binary(binary) = single_expr("not $x and $y") else {
        panic!("expected a binary expression");
    };

    assert_eq!(binary.operator, BinaryOp::And);
    assert!(matches!(*binary.left, Expr::Prefix(ref p) if p.operator == UnaryOp::Not));
}

#[rstest]
#[case("$x = 5", AssignOp::Assign)]
#[case("$x += 1", AssignOp::AddAssign)]
#[case("$user.name = \"a\"", AssignOp::Assign)]
#[case("$list[0] *= 2", AssignOp::MultiplyAssign)]
fn test_parse_assignment(#[case] source: &str, #[case] operator: AssignOp) {
    let Expr::Assignment(assignment) = single_expr(source) else {
        panic!("expected an assignment for {:?}", source);
    };
    assert_eq!(assignment.operator, operator);
}

#[test]
fn test_parse_invalid_assignment_target() {
    assert_eq!(error_impls("5 = 3"), vec![ErrorImpl::InvalidAssignmentTarget]);
}

#[test]
fn test_parse_call_member_and_index() {
    let Expr::Call(call) = single_expr("foo(1, 2)") else {
        panic!("expected a call");
    };
    assert_eq!(call.arguments.len(), 2);

    let Expr::Member(member) = single_expr("$user.name") else {
        panic!("expected a member access");
    };
    assert_eq!(member.property, "name");

    assert!(matches!(single_expr("$list[0]"), Expr::Index(_)));
}

#[test]
fn test_parse_numeric_member_chain() {
    let Expr::Member(outer) = single_expr("$t.0.1") else {
        panic!("expected a member access");
    };
    assert_eq!(outer.property, "1");
    assert!(matches!(*outer.object, Expr::Member(ref inner) if inner.property == "0"));
}

#[test]
fn test_parse_spaced_minus_name_is_subtraction() {
    let Expr::Binary(binary) = single_expr("$a -b") else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.operator, BinaryOp::Subtract);
    assert!(matches!(*binary.right, Expr::Symbol(ref s) if s.ident.name == "b"));

    let Expr::Binary(binary) = single_expr("$a -b * 2") else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.operator, BinaryOp::Subtract);
    assert!(matches!(*binary.right, Expr::Binary(ref b) if b.operator == BinaryOp::Multiply));

    assert!(matches!(
        error_impls("$a -b-c")[..],
        [ErrorImpl::UnexpectedTokenDetailed { .. }]
    ));
}

#[test]
fn test_parse_flag_after_argument_stays_a_flag() {
    let Expr::Command(command) = single_expr("echo $a -n") else {
        panic!("expected a command");
    };
    assert!(matches!(command.stages[0].arguments[1], Argument::Flag(ref f) if f.name == "n"));
}

#[test]
fn test_parse_spaced_paren_is_command_argument() {
    let Expr::Command(command) = single_expr("foo (1)") else {
        panic!("expected a command");
    };

    assert_eq!(command.stages[0].arguments.len(), 1);
    assert!(matches!(
        command.stages[0].arguments[0],
        Argument::Positional(Expr::Grouping(_))
    ));
}

#[test]
fn test_parse_command_arguments() {
    let Expr::Command(command) = single_expr("git commit -m \"msg\" --amend --author=me") else {
        panic!("expected a command");
    };

    let stage = &command.stages[0];
    assert_eq!(stage.name.name, "git");
    assert_eq!(stage.arguments.len(), 5);
    assert!(matches!(stage.arguments[0], Argument::Word(ref w) if w.text == "commit"));
    assert!(matches!(stage.arguments[1], Argument::Flag(ref f) if f.name == "m" && !f.long));
    assert!(matches!(stage.arguments[2], Argument::Positional(Expr::String(_))));
    assert!(matches!(stage.arguments[3], Argument::Flag(ref f) if f.name == "amend" && f.long));

    let Argument::Flag(author) = &stage.arguments[4] else {
        panic!("expected a flag");
    };
    let Some(value) = &author.value else {
        panic!("expected a flag value");
    };
    assert!(matches!(
        **value,
        Expr::String(ref s) if s.value == "me" && s.style == StringStyle::Bare
    ));
}

#[test]
fn test_parse_negative_number_argument() {
    let Expr::Command(command) = single_expr("seq -5 5") else {
        panic!("expected a command");
    };

    assert!(matches!(
        command.stages[0].arguments[0],
        Argument::Positional(Expr::Number(ref n)) if n.value == NumberValue::Int(-5)
    ));
}

#[rstest]
#[case("ls *.txt", "*.txt")]
#[case("cd ~/projects", "~/projects")]
#[case("cd ..", "..")]
#[case("ls $dir/sub", "$dir/sub")]
#[case("cat notes.md", "notes.md")]
fn test_parse_bareword_arguments(#[case] source: &str, #[case] text: &str) {
    let Expr::Command(command) = single_expr(source) else {
        panic!("expected a command for {:?}", source);
    };

    assert!(matches!(
        command.stages[0].arguments[0],
        Argument::Word(ref w) if w.text == text
    ));
}

#[test]
fn test_parse_hyphenated_command_name() {
    let Expr::Command(command) = single_expr("git-log --oneline") else {
        panic!("expected a command");
    };
    assert_eq!(command.stages[0].name.name, "git-log");
}

#[test]
fn test_parse_command_builtin_flag() {
    let Expr::Command(command) = single_expr("echo hi | my_tool") else {
        panic!("expected a command");
    };

    assert!(command.stages[0].builtin);
    assert!(!command.stages[1].builtin);
}

#[test]
fn test_parse_command_pipeline() {
    let Expr::Command(command) = single_expr("ls -la | grep foo | wc -l") else {
        panic!("expected a command pipeline");
    };

    assert_eq!(command.stages.len(), 3);
    assert_eq!(command.pipes, vec![PipeOp::Value, PipeOp::Value]);
    assert_eq!(command.stages[2].name.name, "wc");
}

#[test]
fn test_parse_bare_names_in_pipeline() {
    let Expr::Command(command) = single_expr("a | b | c") else {
        panic!("expected a command pipeline");
    };
    assert_eq!(command.stages.len(), 3);
    assert_eq!(command.pipes.len(), 2);
}

#[test]
fn test_parse_pipeline_continued_on_next_line() {
    let Expr::Command(command) = single_expr("ls\n| sort\n|> save out.txt") else {
        panic!("expected a command pipeline");
    };
    assert_eq!(command.stages.len(), 3);
    assert_eq!(command.pipes, vec![PipeOp::Value, PipeOp::Append]);
}

#[test]
fn test_parse_value_pipeline_with_closure() {
    let Expr::Pipeline(pipeline) = single_expr("$items | each { |x| $x * 2 }") else {
        panic!("expected a value pipeline");
    };

    assert_eq!(pipeline.stages.len(), 2);
    assert!(matches!(pipeline.stages[0], Expr::Variable(_)));

    let Some(each) = pipeline.stages[1].as_single_command() else {
        panic!("expected a command stage");
    };
    let Argument::Positional(Expr::Closure(closure)) = &each.arguments[0] else {
        panic!("expected a closure argument");
    };
    assert_eq!(closure.params.as_ref().map(Vec::len), Some(1));
    assert_eq!(closure.body.statements.len(), 1);
}

#[rstest]
#[case("$a |? get name", PipeOp::NullSafe)]
#[case("$a |! get name", PipeOp::ErrorPropagating)]
fn test_parse_pipe_operators(#[case] source: &str, #[case] pipe: PipeOp) {
    let Expr::Pipeline(pipeline) = single_expr(source) else {
        panic!("expected a value pipeline");
    };
    assert_eq!(pipeline.pipes, vec![pipe]);
}

#[test]
fn test_parse_command_chaining() {
    let Expr::Binary(binary) = single_expr("make && make test || echo failed") else {
        panic!("expected a chained command");
    };

    assert_eq!(binary.operator, BinaryOp::Or);
    assert!(matches!(*binary.left, Expr::Binary(ref b) if b.operator == BinaryOp::And));
}

#[test]
fn test_parse_empty_braces_are_record() {
    let Expr::Record(record) = single_expr("{}") else {
        panic!("expected a record");
    };
    assert!(record.fields.is_empty());
}

#[test]
fn test_parse_closure_braces() {
    let Expr::Closure(closure) = single_expr("{ |x| x }") else {
        panic!("expected a closure");
    };
    assert_eq!(closure.params.as_ref().map(Vec::len), Some(1));
    // The body starts after the parameter list
    assert!(closure.body.span.start > closure.span.start);
}

#[test]
fn test_parse_record_literal() {
    let Expr::Record(record) = single_expr("{ a: 1, \"b c\": \"two\"\n  if: true }") else {
        panic!("expected a record");
    };

    let keys: Vec<&str> = record.fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b c", "if"]);
}

#[test]
fn test_parse_statement_braces_are_block() {
    let Expr::Block(block) = single_expr("{ echo hi; echo there }") else {
        panic!("expected a block");
    };
    assert_eq!(block.block.statements.len(), 2);
}

#[test]
fn test_parse_value_braces_are_closure() {
    let Stmt::VarDecl(decl) = single_stmt("let f = { echo hi }") else {
        panic!("expected a declaration");
    };

    let Expr::Closure(closure) = decl.value else {
        panic!("expected a closure");
    };
    assert!(closure.params.is_none());
    assert_eq!(closure.body.statements.len(), 1);
}

#[test]
fn test_parse_brace_expansions() {
    let Expr::Command(command) = single_expr("echo {a,b,c} {1..5}") else {
        panic!("expected a command");
    };

    let arguments = &command.stages[0].arguments;
    let Argument::Positional(Expr::BraceExpansion(list)) = &arguments[0] else {
        panic!("expected a list expansion");
    };
    let BraceExpansion::List(items) = &list.expansion else {
        panic!("expected list items");
    };
    let texts: Vec<&str> = items.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);

    let Argument::Positional(Expr::BraceExpansion(range)) = &arguments[1] else {
        panic!("expected a range expansion");
    };
    assert_eq!(
        range.expansion,
        BraceExpansion::Range {
            start: 1,
            end: 5,
            inclusive: false
        }
    );
}

#[test]
fn test_parse_ranges() {
    let Expr::Range(range) = single_expr("1..=5") else {
        panic!("expected a range");
    };
    assert!(range.inclusive);

    let errors = error_impls("1..2..3");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ErrorImpl::UnexpectedTokenDetailed { .. }));
}

#[test]
fn test_parse_collections() {
    assert!(matches!(single_expr("[1 2 3]"), Expr::List(ref l) if l.elements.len() == 3));
    assert!(matches!(single_expr("[1, 2, 3]"), Expr::List(ref l) if l.elements.len() == 3));
    assert!(matches!(single_expr("[\n  1,\n  2,\n]"), Expr::List(ref l) if l.elements.len() == 2));
    let Expr::List(list) = single_expr("[#{1, 2, 3}]") else {
        panic!("expected a list");
    };
    assert!(matches!(list.elements[..], [Expr::Set(ref s)] if s.elements.len() == 3));
    assert!(matches!(single_expr("(1, 2)"), Expr::Tuple(ref t) if t.elements.len() == 2));
    assert!(matches!(single_expr("()"), Expr::Tuple(ref t) if t.elements.is_empty()));
    assert!(matches!(single_expr("(1)"), Expr::Grouping(_)));
}

#[test]
fn test_parse_substitutions() {
    let Stmt::VarDecl(decl) = single_stmt("let files = $(ls)") else {
        panic!("expected a declaration");
    };
    let Expr::CommandSubstitution(subst) = decl.value else {
        panic!("expected a command substitution");
    };
    assert!(matches!(*subst.body, Expr::Command(_)));

    let Expr::Command(command) = single_expr("diff <(ls a) >(sort)") else {
        panic!("expected a command");
    };
    assert_eq!(command.stages[0].arguments.len(), 2);
    assert!(matches!(
        command.stages[0].arguments[0],
        Argument::Positional(Expr::ProcessSubstitution(_))
    ));
}

#[test]
fn test_parse_lambdas() {
    let Stmt::VarDecl(decl) = single_stmt("let f = |a, b = 2| -> int { $a + $b }") else {
        panic!("expected a declaration");
    };
    let Expr::Lambda(lambda) = decl.value else {
        panic!("expected a lambda");
    };
    assert_eq!(lambda.params.len(), 2);
    assert!(lambda.params[1].default.is_some());
    assert!(lambda.return_type.is_some());

    assert!(matches!(single_expr("|| { 1 }"), Expr::Lambda(ref l) if l.params.is_empty()));
}

#[test]
fn test_parse_special_and_env_variables() {
    let Expr::Binary(binary) = single_expr("$env.HOME ++ $it") else {
        panic!("expected a binary expression");
    };
    assert!(matches!(*binary.left, Expr::EnvVariable(ref e) if e.name == "HOME"));
    assert!(matches!(*binary.right, Expr::SpecialVariable(_)));
}

#[rstest]
#[case("0x1F", NumberValue::Int(31))]
#[case("0b101", NumberValue::Int(5))]
#[case("0o17", NumberValue::Int(15))]
#[case("0xFF_FF", NumberValue::Int(65535))]
#[case("9223372036854775807", NumberValue::Int(i64::MAX))]
#[case("0xFFFF_FFFF_FFFF_FFFF", NumberValue::UInt(u64::MAX))]
#[case("18446744073709551615", NumberValue::UInt(u64::MAX))]
fn test_parse_integer_forms(#[case] source: &str, #[case] value: NumberValue) {
    assert!(matches!(
        single_expr(source),
        Expr::Number(ref n) if n.value == value
    ));
}

#[test]
fn test_parse_most_negative_integer_argument() {
    let Expr::Command(command) = single_expr("seq -9223372036854775808 0") else {
        panic!("expected a command");
    };

    assert!(matches!(
        command.stages[0].arguments[0],
        Argument::Positional(Expr::Number(ref n)) if n.value == NumberValue::Int(i64::MIN)
    ));
    assert!(matches!(
        error_impls("seq -9223372036854775809")[..],
        [ErrorImpl::NumberParseError { .. }]
    ));
}

#[test]
fn test_parse_number_overflow() {
    let errors = error_impls("99999999999999999999");
    assert!(matches!(errors[..], [ErrorImpl::NumberParseError { .. }]));
}

#[test]
fn test_parse_if_elif_else() {
    let Stmt::If(stmt) =
        single_stmt("if $x > 1 { a } elif $x < 0 { b } else if $y { c } else { d }")
    else {
        panic!("expected an if");
    };

    assert_eq!(stmt.elif_branches.len(), 2);
    assert!(stmt.else_body.is_some());
}

#[test]
fn test_parse_else_on_next_line() {
    let Stmt::If(stmt) = single_stmt("if $x {\n  echo yes\n}\nelse {\n  echo no\n}") else {
        panic!("expected an if");
    };
    assert!(stmt.else_body.is_some());
}

#[test]
fn test_parse_condition_brace_is_body() {
    let Stmt::While(stmt) = single_stmt("while exists $path { sleep 1 }") else {
        panic!("expected a while");
    };

    assert!(matches!(stmt.condition, Expr::Command(_)));
    assert_eq!(stmt.body.statements.len(), 1);
}

#[test]
fn test_parse_for_loops() {
    let Stmt::For(stmt) = single_stmt("for $i in 1..=5 { echo $i }") else {
        panic!("expected a for");
    };
    assert_eq!(stmt.variables.len(), 1);
    assert!(matches!(stmt.iterable, Expr::Range(ref r) if r.inclusive));

    let Stmt::For(stmt) = single_stmt("for $k, $v in $map { }") else {
        panic!("expected a for");
    };
    assert_eq!(stmt.variables.len(), 2);
}

#[test]
fn test_parse_loops_and_jumps() {
    let program = parse_ok("while true { break }\nloop { continue }");

    assert!(matches!(program.statements[0], Stmt::While(ref w)
        if matches!(w.body.statements[..], [Stmt::Break(_)])));
    assert!(matches!(program.statements[1], Stmt::Loop(ref l)
        if matches!(l.body.statements[..], [Stmt::Continue(_)])));
}

#[test]
fn test_parse_match_patterns() {
    let source = r#"match $pet {
  Dog { name } => "dog: $name",
  [first, ...rest] => $first,
  -1 => "negative"
  { kind: "cat" } if $indoor => { echo cat }
  _ => "other"
}"#;
    let Stmt::Match(stmt) = single_stmt(source) else {
        panic!("expected a match");
    };

    assert_eq!(stmt.arms.len(), 5);

    let Pattern::Record(dog) = &stmt.arms[0].pattern else {
        panic!("expected a record pattern");
    };
    assert_eq!(dog.type_name.as_ref().map(|t| t.name.as_str()), Some("Dog"));
    assert_eq!(dog.fields.len(), 1);
    assert!(dog.fields[0].pattern.is_none());

    let Pattern::List(list) = &stmt.arms[1].pattern else {
        panic!("expected a list pattern");
    };
    assert_eq!(list.elements.len(), 1);
    let rest = list.rest.as_ref().map(|r| (r.position, r.binding.is_some()));
    assert_eq!(rest, Some((1, true)));

    assert!(matches!(stmt.arms[2].pattern, Pattern::Literal(_)));
    assert!(stmt.arms[3].guard.is_some());
    assert!(matches!(stmt.arms[3].body, ArmBody::Block(_)));
    assert!(matches!(stmt.arms[4].pattern, Pattern::Wildcard(_)));
}

#[test]
fn test_parse_duplicate_rest_pattern() {
    let errors = error_impls("match $l { [...a, ...b] => 1 }");
    assert_eq!(errors, vec![ErrorImpl::DuplicateRestPattern]);
}

#[test]
fn test_parse_try_catch() {
    let Stmt::Try(stmt) = single_stmt("try { risky } catch $e { echo $e }") else {
        panic!("expected a try");
    };

    let Some(catch) = stmt.catch else {
        panic!("expected a catch clause");
    };
    assert_eq!(catch.binding.map(|b| b.name), Some(String::from("e")));
}

#[test]
fn test_parse_decorators() {
    let Stmt::FnDecl(decl) = single_stmt("@cached\n@log(\"calls\")\nfn f() { }") else {
        panic!("expected a function");
    };

    assert_eq!(decl.decorators.len(), 2);
    assert_eq!(decl.decorators[1].arguments.len(), 1);
    assert_eq!(decl.span.start, decl.decorators[0].span.start);
}

#[test]
fn test_parse_misplaced_decorator() {
    let errors = error_impls("@cached\nlet x = 1");
    assert!(matches!(errors[..], [ErrorImpl::MisplacedDecorator { .. }]));
}

#[test]
fn test_parse_object_declaration() {
    let source = "object Point {\n  x: int = 0\n  y: int = 0\n  fn norm() -> float { return 0.0 }\n}";
    let Stmt::ObjectDecl(decl) = single_stmt(source) else {
        panic!("expected an object");
    };

    assert_eq!(decl.members.len(), 3);
    assert!(matches!(decl.members[2], ObjectMember::Method(_)));
}

#[test]
fn test_parse_enum_declaration() {
    let Stmt::EnumDecl(decl) = single_stmt("enum Color { Red, Green = 2, Blue }") else {
        panic!("expected an enum");
    };

    assert_eq!(decl.variants.len(), 3);
    assert!(decl.variants[1].value.is_some());
}

#[rstest]
#[case("macro greet $name { echo $name }", MacroParamStyle::ShellStyle, 1)]
#[case("macro pair($a, $b) { echo $a $b }", MacroParamStyle::Parenthesized, 2)]
fn test_parse_macro_styles(
    #[case] source: &str,
    #[case] style: MacroParamStyle,
    #[case] count: usize,
) {
    let Stmt::MacroDecl(decl) = single_stmt(source) else {
        panic!("expected a macro");
    };
    assert_eq!(decl.style, style);
    assert_eq!(decl.parameters.len(), count);
}

#[test]
fn test_parse_alias_and_test() {
    let Stmt::Alias(alias) = single_stmt("alias ll = ls -la") else {
        panic!("expected an alias");
    };
    assert!(matches!(alias.value, Expr::Command(_)));

    let Stmt::Test(test) = single_stmt("test \"adds numbers\" { add 1 2 }") else {
        panic!("expected a test");
    };
    assert_eq!(test.name, "adds numbers");
}

#[test]
fn test_parse_use_statements() {
    let Stmt::Use(stmt) = single_stmt("use std.fs") else {
        panic!("expected a use");
    };
    assert_eq!(stmt.path.segments, vec!["std", "fs"]);
    assert_eq!(stmt.binding.map(|b| b.name), Some(String::from("fs")));

    let Stmt::Use(stmt) = single_stmt("use \"lib/util.apx\"") else {
        panic!("expected a use");
    };
    assert!(stmt.path.quoted);
    assert_eq!(stmt.binding.map(|b| b.name), Some(String::from("util")));

    let Stmt::Use(stmt) = single_stmt("use std.fs as files") else {
        panic!("expected a use");
    };
    assert_eq!(stmt.binding.map(|b| b.name), Some(String::from("files")));
}

#[test]
fn test_parse_from_imports() {
    let Stmt::FromImport(stmt) = single_stmt("from std.fs import read, write as w") else {
        panic!("expected an import");
    };
    assert_eq!(stmt.items.len(), 2);
    assert_eq!(stmt.items[1].local_name().name, "w");

    let Stmt::FromImport(stmt) = single_stmt("from a import *") else {
        panic!("expected an import");
    };
    assert!(stmt.glob);

    let Stmt::FromImport(stmt) = single_stmt("from a import (\n  x,\n  y,\n)") else {
        panic!("expected an import");
    };
    assert_eq!(stmt.items.len(), 2);
}

#[rstest]
#[case("source \"./env.apx\"", "./env.apx")]
#[case("source lib/helpers.apx", "lib/helpers.apx")]
fn test_parse_source(#[case] source: &str, #[case] path: &str) {
    let Stmt::Source(stmt) = single_stmt(source) else {
        panic!("expected a source statement");
    };
    assert_eq!(stmt.path, path);
}

#[test]
fn test_parse_recovers_after_missing_expression() {
    let output = parse_source("let x = \nlet y = 2");

    assert_eq!(output.diagnostics.len(), 1);
    let error = &output.diagnostics[0];
    assert!(matches!(error.get_impl(), ErrorImpl::ExpectedExpression { .. }));
    assert_eq!(error.get_span().start.0, 6);

    assert_eq!(output.program.statements.len(), 2);
    assert!(output.program.statements[0].is_error());
    assert!(matches!(output.program.statements[1], Stmt::VarDecl(_)));
}

#[test]
fn test_parse_recovers_inside_block() {
    let output = parse_source("fn f() {\n  let = 1\n  echo ok\n}\nf");

    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.program.statements.len(), 2);
    let Stmt::FnDecl(decl) = &output.program.statements[0] else {
        panic!("expected the function to survive");
    };
    assert_eq!(decl.body.statements.len(), 2);
}

#[test]
fn test_parse_stray_closer() {
    let output = parse_source("echo a\n}\necho b");

    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.program.statements.len(), 3);
}

#[test]
fn test_parse_invalid_token_reported_once() {
    let errors = error_impls("let s = \"unterminated");
    assert!(matches!(errors[..], [ErrorImpl::UnterminatedString { .. }]));
}

#[test]
fn test_parse_stop_at_first_error() {
    let config = ParserConfig {
        stop_at_first_error: true,
        ..ParserConfig::default()
    };
    let output = parse_with_config(tokenize("let = 1\nlet = 2\nlet = 3"), &config);

    assert_eq!(output.diagnostics.len(), 1);
}

#[test]
fn test_parse_deep_nesting_is_a_diagnostic() {
    let source = format!("let x = {}1{}\necho ok", "(".repeat(1000), ")".repeat(1000));
    let output = parse_source(&source);

    assert!(matches!(
        output.diagnostics[..],
        [ref d] if *d.get_impl() == ErrorImpl::NestingTooDeep { limit: 128 }
    ));
    assert!(matches!(output.program.statements[..], [Stmt::Error(_), Stmt::Expression(_)]));
}

#[test]
fn test_parse_long_operator_chain_is_bounded() {
    let Expr::Binary(binary) = single_expr(&vec!["1"; 100].join(" + ")) else {
        panic!("expected a binary expression");
    };
    assert_eq!(binary.operator, BinaryOp::Add);

    let errors = error_impls(&vec!["1"; 500].join(" + "));
    assert_eq!(errors, vec![ErrorImpl::NestingTooDeep { limit: 128 }]);
}

#[rstest]
#[case(" = ", "$a")]
#[case(" && ", "make")]
fn test_parse_long_right_and_command_chains_are_bounded(#[case] joiner: &str, #[case] item: &str) {
    let errors = error_impls(&vec![item; 500].join(joiner));
    assert_eq!(errors, vec![ErrorImpl::NestingTooDeep { limit: 128 }]);
}

#[rstest]
#[case("let x = [[[[[1]]]]]")]
#[case("if $a { if $b { if $c { if $d { if $e { 1 } } } } }")]
#[case("match $v { [[[[[x]]]]] => 1 }")]
fn test_parse_max_depth_is_configurable(#[case] source: &str) {
    let config = ParserConfig {
        max_depth: 4,
        ..ParserConfig::default()
    };
    let output = parse_with_config(tokenize(source), &config);

    assert!(output
        .diagnostics
        .iter()
        .any(|d| *d.get_impl() == ErrorImpl::NestingTooDeep { limit: 4 }));
}

#[test]
fn test_parse_diagnostics_are_sorted() {
    let output = parse_source("let = 1\n5 = 3\nlet y = ");
    let starts: Vec<u32> = output
        .diagnostics
        .iter()
        .map(|d| d.get_span().start.0)
        .collect();

    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts.len(), 3);
    assert_eq!(starts, sorted);
}
