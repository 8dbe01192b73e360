//! Binary definition files (`.odef`).
//!
//! A definition file records the declarations of one program (namespace,
//! imports, top-level declarations, classes and aliases) without bodies, so
//! other programs can be checked against it without the source.

pub mod odef;

pub use odef::{decode, encode, ODEF_FILE, SIGNATURE};

#[cfg(test)]
mod tests;
