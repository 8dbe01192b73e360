//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the front end.
//! It includes:
//!
//! - Diagnostic records with source spans and template context
//! - Specific error variants for the lexical, syntactic and semantic phases
//! - The diagnostics sink shared by every pass
//! - Terminal rendering of diagnostics with caret underlines

pub mod errors;
pub mod report;

#[cfg(test)]
mod tests;
