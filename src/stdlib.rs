//! The bundled `core` prelude.
//!
//! Integer structs with their operator overloads, `null`, `function<T, Args...>`,
//! `array<T>` and the usual aliases (`int`, `char`, `string`, `void`, ...).
//! Every compilation in file mode parses it first.

use crate::Source;

pub const PRELUDE_NAME: &str = "<core>";
pub const PRELUDE: &str = include_str!("../std/core.og");

pub fn prelude_source() -> Source {
    Source::new(PRELUDE_NAME, PRELUDE)
}
