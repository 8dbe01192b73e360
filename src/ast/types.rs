//! Type references for the AST.
//!
//! A [`Typing`] is a type as written in the source (`int`, `box<T>`, `char[][]`).
//! The parser produces them with the names as written; the type assigner later
//! rewrites `name` to the fully qualified form while `display_name` keeps what
//! the user typed, so diagnostics can still say `string` instead of `core::array<...>`.

use crate::Span;

use super::ast::{Arena, TypingId};

pub const CORE_ARRAY: &str = "core::array";
pub const CORE_FUNCTION: &str = "core::function";
pub const CORE_INT64: &str = "core::int64";
pub const CORE_NULL: &str = "core::null";
pub const ERROR_TYPE: &str = "<error type>";

#[derive(Debug, Clone, PartialEq)]
pub struct Typing {
    pub name: String,
    pub display_name: String,
    pub is_alias_expansion: bool,
    pub templates: Vec<TypingId>,
    pub span: Span,
    /// The `<...>` list, or the whole typing when there is none.
    pub args_span: Span,
}

impl Typing {
    pub fn new(name: &str, span: Span) -> Self {
        Typing {
            name: name.to_string(),
            display_name: name.to_string(),
            is_alias_expansion: false,
            templates: vec![],
            args_span: span.clone(),
            span,
        }
    }

    pub fn with_templates(mut self, templates: Vec<TypingId>) -> Self {
        self.templates = templates;
        self
    }

    pub fn is_error(&self) -> bool {
        self.name == ERROR_TYPE
    }
}

/// Renders a typing the way the user wrote it: `int[]`, `box<string>`, `string`.
pub fn typing_to_string(arena: &Arena, id: TypingId) -> String {
    let typing = &arena[id];
    if typing.display_name == typing.name && typing.name == CORE_ARRAY && typing.templates.len() == 1 {
        return format!("{}[]", typing_to_string(arena, typing.templates[0]));
    }

    let mut result = typing.display_name.clone();
    if !typing.templates.is_empty() && !typing.is_alias_expansion {
        let templates: Vec<String> = typing
            .templates
            .iter()
            .map(|t| typing_to_string(arena, *t))
            .collect();
        result.push('<');
        result.push_str(&templates.join(", "));
        result.push('>');
    }
    result
}

/// Structural equality: same canonical name and pairwise equal templates.
pub fn types_equal(arena: &Arena, a: TypingId, b: TypingId) -> bool {
    if a == b {
        return true;
    }

    let (a, b) = (&arena[a], &arena[b]);
    a.name == b.name
        && a.templates.len() == b.templates.len()
        && a
            .templates
            .iter()
            .zip(&b.templates)
            .all(|(x, y)| types_equal(arena, *x, *y))
}

/// Builds `core::function<Ret, Params...>`; a missing return type becomes `core::null`.
pub fn make_function_typing(
    arena: &mut Arena,
    return_type: Option<TypingId>,
    params: Vec<TypingId>,
    span: Span,
) -> TypingId {
    let return_type = match return_type {
        Some(id) => id,
        None => arena.alloc_typing(Typing::new(CORE_NULL, span.clone())),
    };

    let mut templates = Vec::with_capacity(params.len() + 1);
    templates.push(return_type);
    templates.extend(params);
    arena.alloc_typing(Typing::new(CORE_FUNCTION, span).with_templates(templates))
}
