//! Command-line interface for the ApX front end.
//!
//! Usage:
//!   apx tokens `<path>`     - Print the token stream
//!   apx tree `<path>`       - Print the syntax tree with node kinds and spans
//!   apx bindings `<path>`   - Print the scope resolution table as JSON
//!   apx check `<path>`      - Report diagnostics, exit status 1 on any error
//!
//! Every subcommand accepts `--config <file>` to layer a TOML file over the
//! built-in defaults.

use std::process;

use apx_syntax::{
    analyze,
    ast::ast::NodeRef,
    config::{ApxConfig, Loader},
    lexer::lexer::tokenize,
    render_diagnostic, Analysis,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;

fn main() {
    env_logger::init();

    let path_arg = || {
        Arg::new("path")
            .help("Path to the .apx file")
            .required(true)
            .index(1)
    };

    let matches = Command::new("apx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and check ApX scripts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the default configuration"),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the syntax tree")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("bindings")
                .about("Print the binding table as JSON")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Report lexer, parser and resolver diagnostics")
                .arg(path_arg())
                .arg(
                    Arg::new("warn-commands")
                        .long("warn-commands")
                        .action(ArgAction::SetTrue)
                        .help("Also warn about commands that are neither defined nor built in"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", sub_matches)) => handle_tokens_command(sub_matches),
        Some(("tree", sub_matches)) => handle_tree_command(sub_matches),
        Some(("bindings", sub_matches)) => handle_bindings_command(sub_matches),
        Some(("check", sub_matches)) => handle_check_command(sub_matches),
        _ => unreachable!(),
    }
}

fn load_config(matches: &ArgMatches, warn_commands: bool) -> ApxConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if warn_commands {
        loader = loader
            .set_override("resolver.warn_unresolved_commands", true)
            .unwrap_or_else(|e| fail(&format!("Invalid override: {}", e)));
    }

    loader
        .build()
        .unwrap_or_else(|e| fail(&format!("Error loading configuration: {}", e)))
}

fn read_source(matches: &ArgMatches) -> (String, String) {
    let Some(path) = matches.get_one::<String>("path") else {
        fail("No input file given");
    };
    let source = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Error reading {}: {}", path, e)));
    debug!("read {} bytes from {}", source.len(), path);
    (path.clone(), source)
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(2);
}

fn handle_tokens_command(matches: &ArgMatches) {
    let (_, source) = read_source(matches);
    for token in tokenize(&source) {
        println!(
            "{:>4}:{:<5} {:<16} {:?}",
            token.line,
            token.span.start.0,
            token.kind.to_string(),
            token.value
        );
    }
}

fn handle_tree_command(matches: &ArgMatches) {
    let config = load_config(matches, false);
    let (path, source) = read_source(matches);
    let analysis = analyze(&source, &config);

    print_node(NodeRef::Program(&analysis.program), &source, 0);
    print_diagnostics(&analysis, &source, &path);
}

fn print_node(node: NodeRef, source: &str, depth: usize) {
    let span = node.span();
    let children = node.children();

    if children.is_empty() {
        println!(
            "{}{} [{}..{}] {:?}",
            "  ".repeat(depth),
            node.kind().as_str(),
            span.start.0,
            span.end.0,
            span.slice(source)
        );
    } else {
        println!(
            "{}{} [{}..{}]",
            "  ".repeat(depth),
            node.kind().as_str(),
            span.start.0,
            span.end.0
        );
        for child in children {
            print_node(child, source, depth + 1);
        }
    }
}

fn handle_bindings_command(matches: &ArgMatches) {
    let config = load_config(matches, false);
    let (_, source) = read_source(matches);
    let analysis = analyze(&source, &config);

    match serde_json::to_string_pretty(&analysis.bindings) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("Error serializing bindings: {}", e)),
    }
}

fn handle_check_command(matches: &ArgMatches) {
    let config = load_config(matches, matches.get_flag("warn-commands"));
    let (path, source) = read_source(matches);
    let analysis = analyze(&source, &config);

    print_diagnostics(&analysis, &source, &path);

    let errors = analysis.diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = analysis.diagnostics.len() - errors;
    eprintln!("{}: {} error(s), {} warning(s)", path, errors, warnings);

    if analysis.has_errors() {
        process::exit(1);
    }
}

fn print_diagnostics(analysis: &Analysis, source: &str, path: &str) {
    for diagnostic in &analysis.diagnostics {
        eprint!("{}", render_diagnostic(diagnostic, source, path));
    }
}
