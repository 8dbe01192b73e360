//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms the token stream
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Statement parsing (declarations, blocks, `if`, `return`)
//! - Expression parsing (binary ops, calls, subscripts, member and scope access)
//! - Type parsing for type annotations, generics and array suffixes
//! - Class bodies with access modifiers, constructors, destructors and operator overloads
//! - Error recovery: placeholder tokens, bracket skipping and speculative lookahead
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod program;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
