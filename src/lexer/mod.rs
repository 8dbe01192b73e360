//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer that converts source text into tokens on
//! demand for the parser. It handles:
//!
//! - Recognition of keywords, identifiers, numbers, strings and symbols
//! - Longest-match symbol scanning from a fixed table
//! - Comments, whitespace and newline tracking for semicolon inference
//! - Checkpoints and bracket recovery for speculative parsing

pub mod lexer;
pub mod tokens;
