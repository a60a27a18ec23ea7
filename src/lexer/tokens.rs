use lazy_static::lazy_static;
use serde::Serialize;
use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("const", TokenKind::Const);
        map.insert("set", TokenKind::Set);
        map.insert("fn", TokenKind::Fn);
        map.insert("macro", TokenKind::Macro);
        map.insert("alias", TokenKind::Alias);
        map.insert("object", TokenKind::Object);
        map.insert("enum", TokenKind::Enum);
        map.insert("test", TokenKind::Test);
        map.insert("use", TokenKind::Use);
        map.insert("from", TokenKind::From);
        map.insert("import", TokenKind::Import);
        map.insert("source", TokenKind::Source);
        map.insert("as", TokenKind::As);
        map.insert("return", TokenKind::Return);
        map.insert("break", TokenKind::Break);
        map.insert("continue", TokenKind::Continue);
        map.insert("if", TokenKind::If);
        map.insert("elif", TokenKind::Elif);
        map.insert("else", TokenKind::Else);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("while", TokenKind::While);
        map.insert("loop", TokenKind::Loop);
        map.insert("match", TokenKind::Match);
        map.insert("try", TokenKind::Try);
        map.insert("catch", TokenKind::Catch);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map.insert("null", TokenKind::Null);
        map.insert("not", TokenKind::NotKeyword);
        map.insert("and", TokenKind::AndKeyword);
        map.insert("or", TokenKind::OrKeyword);
        map
    };

    /// Names of the commands shipped with the ApX runtime. Only used to tag
    /// nodes; the parser never branches on membership.
    pub static ref BUILTIN_COMMANDS: HashSet<&'static str> = BUILTIN_COMMAND_NAMES.iter().copied().collect();
}

const BUILTIN_COMMAND_NAMES: &[&str] = &[
    // filesystem
    "ls", "cd", "pwd", "mkdir", "rmdir", "rm", "cp", "mv", "touch", "ln", "stat", "chmod",
    "chown", "chgrp", "du", "df", "find", "glob", "realpath", "basename", "dirname", "readlink",
    "mktemp", "tree", "watch", "open", "save", "exists", "isfile", "isdir", "pushd", "popd",
    "dirs", "tempdir", "symlink", "truncate", "rename", "copy", "move", "remove",
    // text
    "echo", "print", "println", "printf", "cat", "head", "tail", "less", "more", "grep", "sed",
    "awk", "cut", "tr", "wc", "sort", "uniq", "rev", "fold", "fmt", "paste", "join", "split",
    "lines", "words", "chars", "trim", "upper", "lower", "capitalize", "replace", "substring",
    "pad", "center", "contains", "startswith", "endswith", "strlen", "format", "template",
    "indent", "dedent", "wrap", "tac", "nl", "expand", "unexpand", "column", "comm", "diff",
    "patch", "strings", "hexdump", "xxd", "base64", "decode", "encode",
    // data pipeline
    "where", "select", "reject", "each", "map", "filter", "reduce", "fold_left", "flatten",
    "group", "groupby", "sortby", "uniqby", "first", "last", "skip", "take", "nth", "range",
    "reverse", "shuffle", "zip", "enumerate", "length", "count", "sum", "avg", "min", "max",
    "median", "mode", "product", "any", "all", "append", "prepend", "insert", "update",
    "upsert", "merge", "columns", "rows", "values", "keys", "get", "pick", "drop", "compact",
    "transpose", "chunk", "window", "pivot", "unpivot", "describe", "inspect", "tee", "par_each",
    "collect", "wrap_list", "items", "entries", "distinct", "partition", "find_first",
    // formats
    "from_json", "to_json", "from_csv", "to_csv", "from_tsv", "to_tsv", "from_toml", "to_toml",
    "from_yaml", "to_yaml", "from_xml", "to_xml", "from_ini", "to_html", "to_md", "to_text",
    "parse", "to_table", "to_nuon", "from_nuon", "jq", "yq",
    // processes and system
    "ps", "kill", "killall", "jobs", "bg", "fg", "wait", "sleep", "exit", "exec", "run",
    "spawn", "nohup", "nice", "time", "timeout", "which", "whereis", "whoami", "hostname",
    "uname", "uptime", "date", "cal", "env", "export", "unset", "printenv", "history", "clear",
    "reset", "tput", "stty", "sys", "free", "top", "htop", "lsof", "id", "groups", "sudo", "su",
    "shutdown", "reboot", "ulimit", "umask", "trap", "logout", "complete",
    // network
    "curl", "wget", "http", "fetch", "post", "ping", "ssh", "scp", "rsync", "nc", "dig",
    "nslookup", "host", "ifconfig", "ip", "netstat", "port", "url_parse", "url_encode",
    "url_decode",
    // archives and hashing
    "tar", "zip_files", "unzip", "gzip", "gunzip", "bzip2", "xz", "md5", "sha1", "sha256",
    "sha512", "hash", "uuid", "random",
    // math and conversion
    "math", "abs", "ceil", "floor", "round", "sqrt", "pow", "log", "exp", "into", "int",
    "float", "str", "bool", "to_string", "to_int", "to_float", "describe_type", "typeof",
    "seq", "bits", "bytes", "filesize", "duration",
    // shell and runtime
    "help", "version", "config", "plugin", "module", "overlay", "let_env", "def", "do",
    "ignore", "error", "assert", "panic", "debug", "explain", "benchmark", "profile", "input",
    "confirm", "prompt", "read", "write", "append_file", "ansi", "color", "style", "table",
    "grid", "chart", "notify", "keybindings", "scope", "builtin", "command", "eval", "retry",
    "tag", "git", "docker", "make", "cargo", "npm", "python", "node",
];

pub fn is_builtin_command(name: &str) -> bool {
    BUILTIN_COMMANDS.contains(name)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum TokenKind {
    EOF,
    Newline,
    Semicolon,
    /// Characters that start no token, unterminated strings and comments.
    Invalid,

    Integer,
    Float,
    String,
    SingleString,
    TripleString,
    RawString,
    BacktickString,
    Identifier,

    Variable,        // $name
    EnvVariable,     // $env.NAME
    SpecialVariable, // $it $_ $err
    ShortFlag,       // -x -la
    LongFlag,        // --name

    At,              // @
    Tilde,           // ~
    HashCurly,       // #{
    DollarParen,     // $(
    ProcessIn,       // <(
    ProcessOut,      // >(

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,    // =
    Equals,        // ==
    Not,           // !
    NotEquals,     // !=
    RegexMatch,    // =~
    RegexNotMatch, // !~

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,  // ||
    And, // &&

    Pipe,          // |
    PipeAppend,    // |>
    PipeNullSafe,  // |?
    PipeError,     // |!
    NullCoalesce,  // ??
    Question,

    Dot,
    DotDot,
    DotDotEquals,
    Ellipsis,
    Colon,
    Comma,
    Arrow,    // ->
    FatArrow, // =>

    PlusPlus,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,

    Plus,
    Dash,
    Slash,
    Star,
    Percent,

    // Reserved
    Let,
    Const,
    Set,
    Fn,
    Macro,
    Alias,
    Object,
    Enum,
    Test,
    Use,
    From,
    Import,
    Source,
    As,
    Return,
    Break,
    Continue,
    If,
    Elif,
    Else,
    For,
    In,
    While,
    Loop,
    Match,
    Try,
    Catch,
    True,
    False,
    Null,
    NotKeyword,
    AndKeyword,
    OrKeyword,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        RESERVED_LOOKUP.values().any(|kind| kind == self)
    }

    /// Newline and `;` end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Semicolon)
    }

    pub fn is_pipe(&self) -> bool {
        matches!(
            self,
            TokenKind::Pipe | TokenKind::PipeAppend | TokenKind::PipeNullSafe | TokenKind::PipeError
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::SingleString
                | TokenKind::TripleString
                | TokenKind::RawString
                | TokenKind::BacktickString
        )
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::Assignment
                | TokenKind::PlusEquals
                | TokenKind::MinusEquals
                | TokenKind::StarEquals
                | TokenKind::SlashEquals
                | TokenKind::PercentEquals
        )
    }

    pub fn opens_group(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::OpenBracket
                | TokenKind::OpenCurly
                | TokenKind::HashCurly
                | TokenKind::DollarParen
                | TokenKind::ProcessIn
                | TokenKind::ProcessOut
        )
    }

    pub fn closes_group(&self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub value: String,
    pub span: Span,
    pub line: u32,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    /// True when no whitespace or trivia separates `self` from `next`.
    pub fn is_adjacent_to(&self, next: &Token) -> bool {
        self.span.end == next.span.start
    }

    pub fn debug(&self) -> String {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::Integer,
            TokenKind::Float,
            TokenKind::Variable,
            TokenKind::Invalid,
        ]) {
            format!("{} ({})", self.kind, self.value)
        } else {
            format!("{} ()", self.kind)
        }
    }
}
