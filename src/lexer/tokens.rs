use lazy_static::lazy_static;
use std::{collections::HashSet, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("if");
        set.insert("else");
        set.insert("true");
        set.insert("false");
        set.insert("return");
        set.insert("do");
        set.insert("namespace");
        set.insert("import");
        set.insert("class");
        set.insert("struct");
        set.insert("public");
        set.insert("private");
        set.insert("operator");
        set.insert("alias");
        set
    };
}

/// Every symbol the lexer knows, longest first wherever one is a prefix of another.
pub const SYMBOLS: &[&str] = &[
    "<<~=", "~>>=",
    "<=>", "...", "<<~", "~>>",
    "<=", ">=", "++", "--", "&&", "||", "::",
    "*=", "/=", "%=", "+=", "-=", "&=", "|=", "^=",
    "==", "!=",
    ".", "[", "]", "(", ")", "~", "!", "-", "+", "*", "/",
    "%", "<", ">", "&", "^", "|", "?", ":", "=", ",",
    ";", "{", "}",
];

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    String,
    Number,
    Symbol,
    EOF,
    /// Only ever produced as the pending newline marker, never by `next()`.
    Newline,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Keyword => write!(f, "keyword"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::Symbol => write!(f, "symbol"),
            TokenKind::EOF => write!(f, "<eof>"),
            TokenKind::Newline => write!(f, "<newline>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", describe(self.kind, Some(&self.value)))
    }
}

impl Token {
    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }
}

/// Describes a token for diagnostics, e.g. `symbol ';'` or `<eof>`.
pub fn describe(kind: TokenKind, value: Option<&str>) -> String {
    match (kind, value) {
        (TokenKind::EOF, _) | (_, None) => kind.to_string(),
        (_, Some(value)) => format!("{} '{}'", kind, value),
    }
}
