//! Utility macros for the compiler.
//!
//! This module defines helper macros used throughout the compiler:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `impl_typed_id!` - Declares an arena index newtype
//!
//! These macros reduce boilerplate in the lexer and the AST arena.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$span` - The source span
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Declares a typed arena index backed by `NonZeroUsize`, so `Option<Id>` costs nothing extra.
#[macro_export]
macro_rules! impl_typed_id {
    ($name:ident, $doc:expr) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[doc = $doc]
        pub struct $name(::std::num::NonZeroUsize);

        impl $name {
            /// Converts the typed id into a usize. Useful to avoid `Into::<usize>::into(self)` when inference fails.
            pub fn into_usize(self) -> usize {
                self.into()
            }
        }

        impl From<$name> for usize {
            fn from(input: $name) -> usize {
                Into::<usize>::into(input.0) - 1
            }
        }

        impl From<usize> for $name {
            fn from(input: usize) -> $name {
                $name(::std::num::NonZeroUsize::new(input + 1).expect("Input usize overflowed"))
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), Into::<usize>::into(self.0) - 1)
            }
        }
    };
}
