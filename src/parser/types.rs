use crate::{
    ast::{
        ast::TypingId,
        types::{Typing, CORE_ARRAY},
    },
    errors::errors::ErrorImpl,
    lexer::tokens::TokenKind,
    Span,
};

use super::parser::Parser;

/// Reads `name` or `ns::name`, joining the segments with `::`.
pub fn read_variable(parser: &mut Parser) -> (String, Span) {
    let start = parser.lexer.peek().span.clone();
    let mut name = parser.lexer.consume(TokenKind::Identifier).value;

    while parser.lexer.is_next_value(TokenKind::Symbol, "::") {
        parser.lexer.next();
        name.push_str("::");
        name.push_str(&parser.lexer.consume(TokenKind::Identifier).value);
    }

    (name, parser.span_from(&start))
}

/// Reads a type reference: a scoped name, an optional `<...>` list, then any
/// number of `[]` suffixes, each wrapping the type so far in `core::array`.
pub fn read_typing(parser: &mut Parser) -> TypingId {
    let start = parser.lexer.peek().span.clone();
    let (name, _) = read_variable(parser);
    let mut templates = vec![];
    let mut args_span = None;

    if parser.lexer.is_next_value(TokenKind::Symbol, "<") {
        let open = parser.lexer.next();
        while parser.lexer.is_next(TokenKind::Identifier) {
            templates.push(read_typing(parser));
            if parser.lexer.is_next_value(TokenKind::Symbol, ",") {
                let comma = parser.lexer.next();
                if parser.lexer.is_next_value(TokenKind::Symbol, ">") {
                    parser.error(ErrorImpl::TrailingCommaOnTemplates, comma.span);
                }
            } else {
                break;
            }
        }

        if !parser.lexer.is_next_value(TokenKind::Symbol, ">")
            && !parser.lexer.try_to_close(TokenKind::Symbol, "<", ">")
        {
            parser.error(ErrorImpl::UnclosedTemplate, open.span.clone());
        }
        parser
            .lexer
            .read_value_msg(TokenKind::Symbol, ">", "to close template");
        args_span = Some(parser.span_from(&open.span));
    }

    let mut typing = Typing::new(&name, parser.span_from(&start)).with_templates(templates);
    if let Some(args_span) = args_span {
        typing.args_span = args_span;
    }
    let mut result = parser.arena.alloc_typing(typing);

    while parser.lexer.is_next_value(TokenKind::Symbol, "[") {
        let open = parser.lexer.next();
        parser
            .lexer
            .read_value_msg(TokenKind::Symbol, "]", "to close array modifier");

        let mut array = Typing::new(CORE_ARRAY, parser.span_from(&start)).with_templates(vec![result]);
        array.args_span = parser.span_from(&open.span);
        result = parser.arena.alloc_typing(array);
    }

    result
}
