use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Diagnostic, Diagnostics, ErrorImpl},
    Span, MK_TOKEN,
};

use super::tokens::{describe, Token, TokenKind, RESERVED_LOOKUP, SYMBOLS};

lazy_static! {
    static ref NUMBER: Regex = Regex::new("^[0-9]+").unwrap();
    static ref IDENTIFIER: Regex = Regex::new("^[A-Za-z0-9_$]*").unwrap();
}

/// Saved lexer state. Produced by [`Lexer::mark`], consumed by `rewind` or `commit`.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    diagnostics: usize,
    pos: usize,
    peeked: Option<Token>,
    newline: Option<Token>,
    last: Token,
}

/// On-demand scanner over one source text.
///
/// Tokens are produced lazily; `peek` memoizes the next token together with the
/// newline (if any) that preceded it.
pub struct Lexer<'a> {
    source: &'a str,
    file: Rc<String>,
    pos: usize,
    peeked: Option<Token>,
    newline: Option<Token>,
    last: Token,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: Rc<String>, diagnostics: &'a mut Diagnostics) -> Self {
        let last = MK_TOKEN!(TokenKind::EOF, String::new(), Span::new(0, 0, &file));
        Lexer {
            source,
            file,
            pos: 0,
            peeked: None,
            newline: None,
            last,
            diagnostics,
        }
    }

    pub fn file(&self) -> &Rc<String> {
        &self.file
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    pub fn error(&mut self, error: ErrorImpl, span: Span) {
        self.diagnostics.push(Diagnostic::error(error, span));
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(start, end, &self.file)
    }

    fn remainder(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Skips whitespace and comments, remembering the first newline crossed.
    fn skip_trivia(&mut self, newline: &mut Option<Token>) {
        loop {
            let rest = self.remainder();
            let Some(c) = rest.chars().next() else {
                return;
            };

            match c {
                '\n' => {
                    if newline.is_none() {
                        *newline = Some(MK_TOKEN!(
                            TokenKind::Newline,
                            String::from("\n"),
                            self.span(self.pos, self.pos + 1)
                        ));
                    }
                    self.pos += 1;
                }
                ' ' | '\t' | '\r' => self.pos += 1,
                '/' if rest.starts_with("//") => {
                    // The newline itself is left for the next iteration.
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
                '/' if rest.starts_with("/*") => {
                    self.pos += rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
                }
                _ => return,
            }
        }
    }

    fn scan(&mut self) -> (Token, Option<Token>) {
        let mut newline = None;

        loop {
            self.skip_trivia(&mut newline);

            if self.pos >= self.source.len() {
                let end = self.source.len();
                return (
                    MK_TOKEN!(TokenKind::EOF, String::new(), self.span(end, end)),
                    newline,
                );
            }

            if let Some(token) = self.scan_token() {
                return (token, newline);
            }
        }
    }

    /// Scans one token at the current position. `None` means a diagnostic was
    /// emitted and scanning should retry.
    fn scan_token(&mut self) -> Option<Token> {
        let begin = self.pos;
        let rest = self.remainder();
        let c = rest.chars().next()?;

        if let Some(number) = NUMBER.find(rest) {
            self.pos += number.end();
            return Some(MK_TOKEN!(
                TokenKind::Number,
                number.as_str().to_string(),
                self.span(begin, self.pos)
            ));
        }

        if c == '@' || IDENTIFIER.find(rest).is_some_and(|m| !m.is_empty()) {
            let raw = c == '@';
            let body = if raw { &rest[1..] } else { rest };
            let matched = IDENTIFIER.find(body).map(|m| m.as_str()).unwrap_or("");
            self.pos += matched.len() + usize::from(raw);

            let kind = if !raw && RESERVED_LOOKUP.contains(matched) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return Some(MK_TOKEN!(kind, matched.to_string(), self.span(begin, self.pos)));
        }

        if c == '"' || c == '\'' {
            return self.scan_string(c);
        }

        if let Some(symbol) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.pos += symbol.len();
            return Some(MK_TOKEN!(
                TokenKind::Symbol,
                symbol.to_string(),
                self.span(begin, self.pos)
            ));
        }

        self.pos += c.len_utf8();
        let span = self.span(begin, self.pos);
        self.error(ErrorImpl::UnexpectedCharacter { character: c }, span);
        None
    }

    fn scan_string(&mut self, quote: char) -> Option<Token> {
        let begin = self.pos;
        self.pos += quote.len_utf8();
        let mut value = String::new();

        loop {
            let Some(c) = self.remainder().chars().next() else {
                break;
            };

            match c {
                '\n' | '\r' => break,
                c if c == quote => {
                    self.pos += c.len_utf8();
                    return Some(MK_TOKEN!(TokenKind::String, value, self.span(begin, self.pos)));
                }
                '\\' => {
                    self.pos += 1;
                    let Some(escaped) = self.remainder().chars().next() else {
                        break;
                    };

                    if escaped.is_ascii_digit() {
                        let digits: String = self
                            .remainder()
                            .chars()
                            .take(3)
                            .take_while(|d| d.is_ascii_digit())
                            .collect();
                        self.pos += digits.len();
                        // Bytes map to the Latin-1 char of the same value
                        let byte = digits.parse::<u32>().unwrap_or(0) as u8;
                        value.push(char::from(byte));
                        continue;
                    }

                    value.push(match escaped {
                        'a' => '\x07',
                        'b' => '\x08',
                        'f' => '\x0C',
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        'v' => '\x0B',
                        other => other,
                    });
                    self.pos += escaped.len_utf8();
                }
                c => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        // Resume at the newline (or EOF) that cut the string short.
        let span = self.span(begin, self.pos);
        self.error(ErrorImpl::UnfinishedString, span);
        None
    }

    pub fn peek(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => {
                let (token, newline) = self.scan();
                self.newline = newline;
                token
            }
        };
        self.peeked.insert(token)
    }

    pub fn next(&mut self) -> Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan().0,
        };
        self.newline = None;
        self.last = token.clone();
        token
    }

    /// The most recently consumed token.
    pub fn last(&self) -> &Token {
        &self.last
    }

    pub fn eof(&mut self) -> bool {
        self.peek().kind == TokenKind::EOF
    }

    pub fn is_next(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub fn is_next_value(&mut self, kind: TokenKind, value: &str) -> bool {
        self.peek().is(kind, value)
    }

    /// Whether a newline separates the last consumed token from the next one.
    pub fn has_newline(&mut self) -> bool {
        self.peek();
        self.newline.is_some()
    }

    pub fn newline_token(&mut self) -> Option<Token> {
        self.peek();
        self.newline.clone()
    }

    pub fn mark(&self) -> Checkpoint {
        Checkpoint {
            diagnostics: self.diagnostics.len(),
            pos: self.pos,
            peeked: self.peeked.clone(),
            newline: self.newline.clone(),
            last: self.last.clone(),
        }
    }

    /// Restores the stream and drops every diagnostic raised since `checkpoint`.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.diagnostics.truncate(checkpoint.diagnostics);
        self.pos = checkpoint.pos;
        self.peeked = checkpoint.peeked;
        self.newline = checkpoint.newline;
        self.last = checkpoint.last;
    }

    pub fn commit(&mut self, _checkpoint: Checkpoint) {}

    /// Skips ahead to the `close` matching an already consumed `open`.
    ///
    /// Gives up, leaving the stream untouched, when a newline or EOF comes first.
    /// On success the skipped run is reported once and `close` is left as the next token.
    pub fn try_to_close(&mut self, kind: TokenKind, open: &str, close: &str) -> bool {
        let checkpoint = self.mark();
        let start = self.peek().span.clone();
        let mut end = start.clone();
        let mut level = 1;

        loop {
            if self.eof() || self.has_newline() {
                self.rewind(checkpoint);
                return false;
            }

            let token = self.peek();
            if token.is(kind, open) {
                level += 1;
            } else if token.is(kind, close) {
                level -= 1;
                if level == 0 {
                    self.commit(checkpoint);
                    self.error(ErrorImpl::UnexpectedTokens, start.to(&end));
                    return true;
                }
            }

            end = self.next().span;
        }
    }

    fn mismatch(&mut self, expected: String, token: &Token, with_value: bool) {
        let found = describe(token.kind, with_value.then_some(token.value.as_str()));
        self.error(ErrorImpl::ExpectedToken { expected, found }, token.span.clone());
    }

    fn expected(kind: TokenKind, value: Option<&str>, message: Option<&str>) -> String {
        match message {
            Some(message) => format!("{} {}", describe(kind, value), message),
            None => describe(kind, value),
        }
    }

    fn consume_impl(&mut self, kind: TokenKind, value: Option<&str>, message: Option<&str>) -> Token {
        let mut token = self.next();
        let matches = token.kind == kind && value.map_or(true, |v| token.value == v);
        if !matches {
            self.mismatch(Self::expected(kind, value, message), &token, value.is_some());
            token.kind = kind;
            token.value = value.unwrap_or_default().to_string();
        }
        token
    }

    fn read_impl(&mut self, kind: TokenKind, value: Option<&str>, message: Option<&str>) -> Token {
        let token = self.peek().clone();
        let matches = token.kind == kind && value.map_or(true, |v| token.value == v);
        if matches {
            return self.next();
        }

        self.mismatch(Self::expected(kind, value, message), &token, value.is_some());
        MK_TOKEN!(kind, value.unwrap_or_default().to_string(), token.span)
    }

    /// Always advances; substitutes a placeholder of `kind` on mismatch.
    pub fn consume(&mut self, kind: TokenKind) -> Token {
        self.consume_impl(kind, None, None)
    }

    pub fn consume_value(&mut self, kind: TokenKind, value: &str) -> Token {
        self.consume_impl(kind, Some(value), None)
    }

    pub fn consume_msg(&mut self, kind: TokenKind, message: &str) -> Token {
        self.consume_impl(kind, None, Some(message))
    }

    pub fn consume_value_msg(&mut self, kind: TokenKind, value: &str, message: &str) -> Token {
        self.consume_impl(kind, Some(value), Some(message))
    }

    /// Advances only on a match.
    pub fn read(&mut self, kind: TokenKind) -> Token {
        self.read_impl(kind, None, None)
    }

    pub fn read_value(&mut self, kind: TokenKind, value: &str) -> Token {
        self.read_impl(kind, Some(value), None)
    }

    pub fn read_msg(&mut self, kind: TokenKind, message: &str) -> Token {
        self.read_impl(kind, None, Some(message))
    }

    pub fn read_value_msg(&mut self, kind: TokenKind, value: &str, message: &str) -> Token {
        self.read_impl(kind, Some(value), Some(message))
    }
}

/// Scans a whole source into tokens, ending with the EOF token.
pub fn tokenize(source: &str, file: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut lexer = Lexer::new(source, Rc::new(String::from(file)), diagnostics);
    let mut tokens = vec![];

    loop {
        let token = lexer.next();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
