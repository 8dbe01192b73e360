use crate::{
    ast::{
        ast::{ExprId, StatId, TypingId, VarDeclId},
        expressions::{ExprKind, Param},
        statements::{Stat, StatKind, VarDecl},
        types::make_function_typing,
    },
    errors::errors::ErrorImpl,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{read_expr, read_expr_or, Recovery},
    lookups::BindingPower,
    parser::Parser,
    types::read_typing,
};

pub fn read_stat(parser: &mut Parser) -> StatId {
    loop {
        let start = parser.lexer.peek().span.clone();

        if parser.lexer.is_next_value(TokenKind::Keyword, "return") {
            parser.lexer.next();
            let value = if parser.lexer.is_next_value(TokenKind::Symbol, ";") {
                None
            } else {
                Some(read_expr(parser, BindingPower::Default))
            };
            semi(parser);
            let span = parser.span_from(&start);
            return parser.arena.alloc_stat(Stat {
                kind: StatKind::Return(value),
                span,
            });
        }

        if parser.lexer.is_next_value(TokenKind::Keyword, "do") {
            parser.lexer.next();
            let block = read_block(parser);
            let span = parser.span_from(&start);
            parser.arena[block].span = span;
            return block;
        }

        if parser.lexer.is_next_value(TokenKind::Keyword, "if") {
            return read_if_stat(parser);
        }

        // `Type name` starts a declaration, anything else is an expression
        if parser.lexer.is_next(TokenKind::Identifier) {
            let mut speculation = parser.speculate();
            read_typing(&mut speculation);
            let is_declaration = speculation.lexer.is_next(TokenKind::Identifier);
            drop(speculation);

            if is_declaration {
                let vardecl = read_vardecl(parser);
                let span = parser.arena[vardecl].span.clone();
                return parser.arena.alloc_stat(Stat {
                    kind: StatKind::VarDecl(vardecl),
                    span,
                });
            }
        }

        let Some(expr) = read_expr_or(parser, BindingPower::Default, Recovery::Abandon) else {
            continue;
        };
        semi(parser);
        let span = parser.expr_span(expr);
        return parser.arena.alloc_stat(Stat {
            kind: StatKind::Expression(expr),
            span,
        });
    }
}

fn read_if_stat(parser: &mut Parser) -> StatId {
    let start = parser.lexer.next().span;
    let cond = read_expr(parser, BindingPower::Default);
    let body = read_branch(parser);

    let else_body = if parser.lexer.is_next_value(TokenKind::Keyword, "else") {
        parser.lexer.next();
        Some(read_branch(parser))
    } else {
        None
    };

    let span = parser.span_from(&start);
    parser.arena.alloc_stat(Stat {
        kind: StatKind::If {
            cond,
            body,
            else_body,
        },
        span,
    })
}

fn read_branch(parser: &mut Parser) -> StatId {
    if parser.lexer.is_next_value(TokenKind::Symbol, "{") {
        read_block(parser)
    } else {
        read_stat(parser)
    }
}

/// Ends a statement. A missing `;` right before a line break is reported at the line break.
pub fn semi(parser: &mut Parser) {
    if parser.lexer.is_next_value(TokenKind::Symbol, ";") {
        parser.lexer.next();
        return;
    }

    match parser.lexer.newline_token() {
        Some(newline) => parser.error(ErrorImpl::MissingSemicolon, newline.span),
        None => {
            parser
                .lexer
                .read_value_msg(TokenKind::Symbol, ";", "to end statement");
        }
    }
}

pub fn read_block(parser: &mut Parser) -> StatId {
    let open = parser
        .lexer
        .read_value_msg(TokenKind::Symbol, "{", "to open block");
    let mut body = vec![];

    skip_semicolons(parser);
    while !parser.lexer.is_next_value(TokenKind::Symbol, "}") && !parser.lexer.eof() {
        body.push(read_stat(parser));
        skip_semicolons(parser);
    }

    if !parser.lexer.is_next_value(TokenKind::Symbol, "}") {
        parser.error(ErrorImpl::UnclosedBlock, open.span.clone());
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, "}", "to close block");

    let span = parser.span_from(&open.span);
    parser.arena.alloc_stat(Stat {
        kind: StatKind::Block(body),
        span,
    })
}

fn skip_semicolons(parser: &mut Parser) {
    while parser.lexer.is_next_value(TokenKind::Symbol, ";") {
        parser.lexer.next();
    }
}

/// Reads `Type name;`, `Type name = value;` or `Type name(params) { body }`.
pub fn read_vardecl(parser: &mut Parser) -> VarDeclId {
    let start = parser.lexer.peek().span.clone();
    let typing = read_typing(parser);
    let name = parser.lexer.read(TokenKind::Identifier);

    let (typing, init) = if parser.lexer.is_next_value(TokenKind::Symbol, "(") {
        let (lambda, function_typing) = read_function_part(parser, Some(typing));
        (function_typing, Some(lambda))
    } else if parser.lexer.is_next_value(TokenKind::Symbol, "=") {
        parser.lexer.next();
        let value = read_expr(parser, BindingPower::Default);
        semi(parser);
        (typing, Some(value))
    } else {
        semi(parser);
        (typing, None)
    };

    let span = parser.span_from(&start);
    parser.arena.alloc_vardecl(VarDecl {
        span,
        name: name.value,
        name_span: name.span,
        typing: Some(typing),
        init,
    })
}

/// Reads `(Type a, Type b) { body }` into a lambda.
///
/// Returns the lambda and its `core::function<Ret, Params...>` typing, whose
/// template entries are the very typings stored on the parameters.
pub fn read_function_part(parser: &mut Parser, return_type: Option<TypingId>) -> (ExprId, TypingId) {
    let start = match return_type {
        Some(id) => parser.arena[id].span.clone(),
        None => parser.lexer.peek().span.clone(),
    };
    let open = parser.lexer.consume_value(TokenKind::Symbol, "(");
    let mut params = vec![];

    while !parser.lexer.is_next_value(TokenKind::Symbol, ")") && !parser.lexer.eof() {
        let typing = read_typing(parser);
        let name = parser.lexer.consume(TokenKind::Identifier).value;
        params.push(Param { name, typing });

        if parser.lexer.is_next_value(TokenKind::Symbol, ",") {
            let comma = parser.lexer.next();
            if parser.lexer.is_next_value(TokenKind::Symbol, ")") {
                parser.error(ErrorImpl::TrailingCommaInParameters, comma.span);
            }
        } else {
            break;
        }
    }

    if !parser.lexer.is_next_value(TokenKind::Symbol, ")")
        && !parser.lexer.try_to_close(TokenKind::Symbol, "(", ")")
    {
        parser.error(ErrorImpl::UnclosedParenthesis, open.span.clone());
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, ")", "to close parenthesis");
    let signature = parser.span_from(&start);

    let body = read_block(parser);
    let span = parser.span_from(&open.span);

    let param_typings = params.iter().map(|p| p.typing).collect();
    let typing = make_function_typing(parser.arena, return_type, param_typings, signature);
    let lambda = parser.alloc_expr(
        ExprKind::Lambda {
            return_type,
            params,
            body,
        },
        span,
    );
    (lambda, typing)
}
