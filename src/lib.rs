#![allow(clippy::module_inception)]

use std::rc::Rc;

pub mod ast;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod odef;
pub mod parser;
pub mod stdlib;
pub mod type_assigner;

extern crate regex;

/// Byte offset into a named source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

/// Half-open byte range `start..end` inside one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: usize, end: usize, file: &Rc<String>) -> Self {
        Span {
            start: Position(start as u32, Rc::clone(file)),
            end: Position(end as u32, Rc::clone(file)),
        }
    }

    pub fn null() -> Self {
        let null = Position::null();
        Span {
            start: null.clone(),
            end: null,
        }
    }

    /// Span starting where `self` starts and ending where `other` ends.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }

    pub fn file(&self) -> &Rc<String> {
        &self.start.1
    }

    pub fn len(&self) -> usize {
        self.end.0.saturating_sub(self.start.0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source file held in memory for the duration of a compilation.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: Rc<String>,
    pub text: String,
}

impl Source {
    pub fn new(name: &str, text: impl Into<String>) -> Self {
        Source {
            name: Rc::new(String::from(name)),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_join() {
        let file = Rc::new(String::from("test.og"));
        let a = Span::new(2, 4, &file);
        let b = Span::new(10, 12, &file);
        let joined = a.to(&b);

        assert_eq!(joined.start.0, 2);
        assert_eq!(joined.end.0, 12);
        assert_eq!(joined.len(), 10);
        assert_eq!(joined.file().as_str(), "test.og");
    }
}
