//! Type assignment and monomorphization.
//!
//! This pass runs once over a whole [`CompilationUnit`](crate::ast::statements::CompilationUnit):
//!
//! - Registers namespaces, aliases and classes under their qualified names
//! - Resolves every written type to its canonical form (`patch`)
//! - Instantiates generic classes on demand, caching each instance by the typing that asked for it
//! - Assigns a typing to every expression, resolving members and operator overloads
//!
//! Bad input never stops the pass; unresolvable expressions get the error type,
//! which silences follow-up diagnostics.

pub mod monomorphize;
pub mod scope;
pub mod type_assigner;
pub mod walk;
