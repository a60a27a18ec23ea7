use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{errors::errors::ErrorImpl, Span, MK_DEFAULT_HANDLER, MK_TOKEN};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &str);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            // Every pattern is anchored so it only matches at the cursor
            regex: Regex::new(&format!("^(?:{})", pattern)).expect("lexer pattern must compile"),
            handler,
        }
    }
}

lazy_static! {
    /// Tried in order; the first pattern matching at the cursor wins.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern::new(r"\r?\n", newline_handler),
        RegexPattern::new(r"\\\r?\n", skip_handler),
        RegexPattern::new(r"[ \t\r\x0C]+", skip_handler),
        RegexPattern::new(r"###(?s:.*?)###", skip_handler),
        RegexPattern::new(r"###(?s:.*)", invalid_handler),
        RegexPattern::new(r"#\{[^\n]*", hash_curly_handler),
        RegexPattern::new(r"#[^\n]*", skip_handler),
        RegexPattern::new(r#""""(?s:.*?)""""#, string_handler),
        RegexPattern::new(r#""""(?s:.*)"#, invalid_handler),
        RegexPattern::new(r#""(?:[^"\\]|\\(?s:.))*""#, string_handler),
        RegexPattern::new(r#""(?:[^"\\]|\\(?s:.))*"#, invalid_handler),
        RegexPattern::new(r"'(?:[^'\\]|\\(?s:.))*'", string_handler),
        RegexPattern::new(r"'(?:[^'\\]|\\(?s:.))*", invalid_handler),
        RegexPattern::new(r"`[^`]*`", string_handler),
        RegexPattern::new(r"`[^`]*", invalid_handler),
        RegexPattern::new(r#"r"[^"]*""#, string_handler),
        RegexPattern::new(r#"r"[^"]*"#, invalid_handler),
        RegexPattern::new(r"\$\(", MK_DEFAULT_HANDLER!(TokenKind::DollarParen, "$(")),
        RegexPattern::new(r"\$env\.[A-Za-z_][A-Za-z0-9_]*", variable_handler),
        RegexPattern::new(r"\$(?:it|err|_)\b", variable_handler),
        RegexPattern::new(r"\$[A-Za-z_][A-Za-z0-9_]*", variable_handler),
        RegexPattern::new(r"0x[0-9a-fA-F][0-9a-fA-F_]*", integer_handler),
        RegexPattern::new(r"0b[01][01_]*", integer_handler),
        RegexPattern::new(r"0o[0-7][0-7_]*", integer_handler),
        RegexPattern::new(r"[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?", float_handler),
        RegexPattern::new(r"[0-9]+[eE][+-]?[0-9]+", float_handler),
        RegexPattern::new(r"[0-9]+", integer_handler),
        RegexPattern::new(r"[A-Za-z_][A-Za-z0-9_]*", symbol_handler),
        RegexPattern::new(r"@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
        RegexPattern::new(r"~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
        RegexPattern::new(r"\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        RegexPattern::new(r"\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        RegexPattern::new(r"\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        RegexPattern::new(r"\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        RegexPattern::new(r"\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        RegexPattern::new(r"\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        RegexPattern::new(r"[<>]\(", process_substitution_handler),
        RegexPattern::new(r"\|\|", MK_DEFAULT_HANDLER!(TokenKind::Or, "||")),
        RegexPattern::new(r"\|>", MK_DEFAULT_HANDLER!(TokenKind::PipeAppend, "|>")),
        RegexPattern::new(r"\|\?", MK_DEFAULT_HANDLER!(TokenKind::PipeNullSafe, "|?")),
        RegexPattern::new(r"\|!", MK_DEFAULT_HANDLER!(TokenKind::PipeError, "|!")),
        RegexPattern::new(r"\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        RegexPattern::new(r"&&", MK_DEFAULT_HANDLER!(TokenKind::And, "&&")),
        RegexPattern::new(r"\?\?", MK_DEFAULT_HANDLER!(TokenKind::NullCoalesce, "??")),
        RegexPattern::new(r"\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        RegexPattern::new(r"==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        RegexPattern::new(r"=~", MK_DEFAULT_HANDLER!(TokenKind::RegexMatch, "=~")),
        RegexPattern::new(r"=>", MK_DEFAULT_HANDLER!(TokenKind::FatArrow, "=>")),
        RegexPattern::new(r"=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        RegexPattern::new(r"!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        RegexPattern::new(r"!~", MK_DEFAULT_HANDLER!(TokenKind::RegexNotMatch, "!~")),
        RegexPattern::new(r"!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        RegexPattern::new(r"<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        RegexPattern::new(r"<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        RegexPattern::new(r">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        RegexPattern::new(r">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        RegexPattern::new(r"->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        RegexPattern::new(r"-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        RegexPattern::new(r"--?[A-Za-z][A-Za-z0-9_-]*", flag_handler),
        RegexPattern::new(r"-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        RegexPattern::new(r"\+\+", MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++")),
        RegexPattern::new(r"\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        RegexPattern::new(r"\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        RegexPattern::new(r"\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        RegexPattern::new(r"\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        RegexPattern::new(r"/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        RegexPattern::new(r"/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        RegexPattern::new(r"%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        RegexPattern::new(r"%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        RegexPattern::new(r"\.\.=", MK_DEFAULT_HANDLER!(TokenKind::DotDotEquals, "..=")),
        RegexPattern::new(r"\.\.\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        RegexPattern::new(r"\.\.", MK_DEFAULT_HANDLER!(TokenKind::DotDot, "..")),
        RegexPattern::new(r"\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        RegexPattern::new(r";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        RegexPattern::new(r":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        RegexPattern::new(r",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
}

impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            tokens: vec![],
            source: source.to_string(),
            pos: 0,
            line: 1,
        }
    }

    /// Moves the cursor past `text`, keeping the line counter in sync.
    pub fn advance(&mut self, text: &str) {
        self.pos += text.len();
        self.line += text.matches('\n').count() as u32;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Pushes a token for `text` at the cursor and moves past it.
    pub fn push_lexeme(&mut self, kind: TokenKind, text: &str) {
        let start = self.pos as u32;
        let token = MK_TOKEN!(
            kind,
            text.to_string(),
            Span::new(start, start + text.len() as u32),
            self.line
        );
        self.push(token);
        self.advance(text);
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn previous_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    /// Value position: the previous token must be followed by an operand,
    /// e.g. `=`, `(`, `,`, an operator, a pipe or `return`.
    fn at_value_start(&self) -> bool {
        let Some(previous) = self.tokens.last() else {
            return false;
        };

        previous.kind.is_pipe()
            || matches!(
                previous.kind,
                TokenKind::Assignment
                    | TokenKind::PlusEquals
                    | TokenKind::MinusEquals
                    | TokenKind::StarEquals
                    | TokenKind::SlashEquals
                    | TokenKind::PercentEquals
                    | TokenKind::OpenParen
                    | TokenKind::OpenBracket
                    | TokenKind::HashCurly
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::FatArrow
                    | TokenKind::Return
                    | TokenKind::In
                    | TokenKind::Plus
                    | TokenKind::Dash
                    | TokenKind::PlusPlus
                    | TokenKind::Star
                    | TokenKind::Slash
                    | TokenKind::Percent
                    | TokenKind::Equals
                    | TokenKind::NotEquals
                    | TokenKind::Less
                    | TokenKind::LessEquals
                    | TokenKind::Greater
                    | TokenKind::GreaterEquals
                    | TokenKind::And
                    | TokenKind::Or
                    | TokenKind::AndKeyword
                    | TokenKind::OrKeyword
                    | TokenKind::Not
                    | TokenKind::NotKeyword
                    | TokenKind::NullCoalesce
            )
    }

    /// Right after a single `.`, where digits name a tuple field.
    fn after_member_dot(&self) -> bool {
        let before = &self.source[..self.pos];
        before.ends_with('.') && !before.ends_with("..")
    }

    /// Argument position: start of input, after whitespace or an opening delimiter.
    fn at_argument_start(&self) -> bool {
        match self.previous_char() {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '|' | ';'),
        }
    }
}

fn skip_handler(lexer: &mut Lexer, matched: &str) {
    lexer.advance(matched);
}

fn newline_handler(lexer: &mut Lexer, matched: &str) {
    lexer.push_lexeme(TokenKind::Newline, matched);
}

fn invalid_handler(lexer: &mut Lexer, matched: &str) {
    lexer.push_lexeme(TokenKind::Invalid, matched);
}

fn integer_handler(lexer: &mut Lexer, matched: &str) {
    lexer.push_lexeme(TokenKind::Integer, matched);
}

fn float_handler(lexer: &mut Lexer, matched: &str) {
    if lexer.after_member_dot() {
        // `$t.0.1` is two member accesses, not `$t.` then `0.1`
        let end = matched
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(matched.len());
        lexer.push_lexeme(TokenKind::Integer, &matched[..end]);
        return;
    }
    lexer.push_lexeme(TokenKind::Float, matched);
}

fn string_handler(lexer: &mut Lexer, matched: &str) {
    let kind = if matched.starts_with("\"\"\"") {
        TokenKind::TripleString
    } else if matched.starts_with("r\"") {
        TokenKind::RawString
    } else if matched.starts_with('\'') {
        TokenKind::SingleString
    } else if matched.starts_with('`') {
        TokenKind::BacktickString
    } else {
        TokenKind::String
    };

    lexer.push_lexeme(kind, matched);
}

fn variable_handler(lexer: &mut Lexer, matched: &str) {
    let kind = if matched.starts_with("$env.") {
        TokenKind::EnvVariable
    } else if matches!(matched, "$it" | "$_" | "$err") {
        TokenKind::SpecialVariable
    } else {
        TokenKind::Variable
    };

    lexer.push_lexeme(kind, matched);
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) {
    if let Some(kind) = RESERVED_LOOKUP.get(matched) {
        lexer.push_lexeme(*kind, matched);
    } else {
        lexer.push_lexeme(TokenKind::Identifier, matched);
    }
}

/// `#{` opens a set only where a value is expected; anywhere else it starts
/// a line comment like any other `#`.
fn hash_curly_handler(lexer: &mut Lexer, matched: &str) {
    if lexer.at_value_start() {
        lexer.push_lexeme(TokenKind::HashCurly, "#{");
    } else {
        lexer.advance(matched);
    }
}

fn flag_handler(lexer: &mut Lexer, matched: &str) {
    if !lexer.at_argument_start() {
        // `a-b`, `$x-y`: an ordinary minus
        lexer.push_lexeme(TokenKind::Dash, "-");
    } else if matched.starts_with("--") {
        lexer.push_lexeme(TokenKind::LongFlag, matched);
    } else {
        lexer.push_lexeme(TokenKind::ShortFlag, matched);
    }
}

fn process_substitution_handler(lexer: &mut Lexer, matched: &str) {
    let input = matched.starts_with('<');

    if !lexer.at_argument_start() {
        let (kind, text) = if input {
            (TokenKind::Less, "<")
        } else {
            (TokenKind::Greater, ">")
        };
        lexer.push_lexeme(kind, text);
    } else if input {
        lexer.push_lexeme(TokenKind::ProcessIn, matched);
    } else {
        lexer.push_lexeme(TokenKind::ProcessOut, matched);
    }
}

/// Converts ApX source text into tokens. Never fails: text that starts no
/// token becomes a `TokenKind::Invalid` token and lexing continues. The
/// result always ends with `TokenKind::EOF`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lex = Lexer::new(source);

    while !lex.at_eof() {
        let found = PATTERNS.iter().find_map(|pattern| {
            pattern
                .regex
                .find(lex.remainder())
                .map(|m| (pattern.handler, m.as_str().to_string()))
        });

        match found {
            Some((handler, matched)) => handler(&mut lex, &matched),
            None => {
                let invalid = lex.remainder().chars().next().map(String::from).unwrap_or_default();
                lex.push_lexeme(TokenKind::Invalid, &invalid);
            }
        }
    }

    let end = lex.pos as u32;
    let line = lex.line;
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::new(),
        Span::new(end, end),
        line
    ));

    debug!("tokenized {} bytes into {} tokens", source.len(), lex.tokens.len());
    lex.tokens
}

/// Explains why the lexer produced an `Invalid` token.
pub fn describe_invalid(token: &Token) -> ErrorImpl {
    let text = token.value.as_str();

    if text.starts_with("###") {
        ErrorImpl::UnterminatedComment
    } else if text.starts_with("\"\"\"") {
        ErrorImpl::UnterminatedString { quote: String::from("\"\"\"") }
    } else if text.starts_with("r\"") {
        ErrorImpl::UnterminatedString { quote: String::from("r\"") }
    } else if let Some(quote @ ('"' | '\'' | '`')) = text.chars().next() {
        ErrorImpl::UnterminatedString { quote: quote.to_string() }
    } else {
        ErrorImpl::UnrecognisedToken { token: text.to_string() }
    }
}

/// The value a string token denotes: the body without delimiters, with
/// escapes processed for `"` and `'` strings only.
pub fn string_value(token: &Token) -> String {
    let text = token.value.as_str();

    match token.kind {
        TokenKind::String | TokenKind::SingleString => unescape(&text[1..text.len() - 1]),
        TokenKind::TripleString => text[3..text.len() - 3].to_string(),
        TokenKind::RawString => text[2..text.len() - 1].to_string(),
        TokenKind::BacktickString => text[1..text.len() - 1].to_string(),
        _ => text.to_string(),
    }
}

pub fn unescape(body: &str) -> String {
    let mut result = String::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch); // Keep non-escape characters
            continue;
        }

        let Some(next_ch) = chars.peek().copied() else {
            result.push(ch); // Keep the lone backslash
            break;
        };

        match next_ch {
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            '0' => result.push('\0'),
            'e' => result.push('\x1b'),
            '\\' | '"' | '\'' | '$' | '`' => result.push(next_ch),
            'x' => {
                chars.next();
                let mut hex = String::new();

                for _ in 0..2 {
                    match chars.peek() {
                        Some(c) if c.is_ascii_hexdigit() => {
                            hex.push(*c);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
                continue;
            }
            'u' => {
                chars.next();
                if chars.peek() != Some(&'{') {
                    result.push_str("\\u");
                    continue;
                }
                chars.next();

                let mut hex = String::new();
                while let Some(c) = chars.next_if(|c| *c != '}') {
                    hex.push(c);
                }
                let closed = chars.next_if_eq(&'}').is_some();

                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) if closed => result.push(c),
                    _ => {
                        result.push_str("\\u{");
                        result.push_str(&hex);
                        if closed {
                            result.push('}');
                        }
                    }
                }
                continue;
            }
            _ => {
                result.push(ch); // Keep the backslash
                result.push(next_ch);
            }
        }

        chars.next();
    }

    result
}
