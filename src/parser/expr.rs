use crate::{
    ast::{ast::ExprId, expressions::ExprKind},
    errors::errors::ErrorImpl,
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

/// What `read_expr_or` does after reporting a token that cannot start an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Skip the token and try again at the same binding power.
    Retry,
    /// Skip the token and give up, so the caller can resynchronize.
    Abandon,
}

/// Reads an expression whose operators all bind tighter than `bp`.
pub fn read_expr(parser: &mut Parser, bp: BindingPower) -> ExprId {
    loop {
        if let Some(expr) = read_expr_or(parser, bp, Recovery::Retry) {
            return expr;
        }
    }
}

pub fn read_expr_or(parser: &mut Parser, bp: BindingPower, recovery: Recovery) -> Option<ExprId> {
    loop {
        let left = match parser.next_nud() {
            Some(handler) => Some(handler(parser)),
            None => read_atom(parser),
        };

        let Some(mut left) = left else {
            let token = parser.lexer.next();
            if token.kind == TokenKind::EOF {
                parser.error(ErrorImpl::UnexpectedEof, token.span.clone());
                return Some(parser.alloc_expr(ExprKind::Error, token.span));
            }

            parser.error(
                ErrorImpl::UnexpectedToken {
                    token: token.to_string(),
                },
                token.span,
            );
            match recovery {
                Recovery::Retry => continue,
                Recovery::Abandon => return None,
            }
        };

        // While the next infix operator binds tighter than the caller, keep extending the lhs
        while let Some((handler, op_bp)) = parser.next_led() {
            if op_bp <= bp {
                break;
            }
            left = handler(parser, left, op_bp);
        }

        return Some(left);
    }
}

fn read_atom(parser: &mut Parser) -> Option<ExprId> {
    let kind = match parser.lexer.peek().kind {
        TokenKind::Number => TokenKind::Number,
        TokenKind::Identifier => TokenKind::Identifier,
        _ => return None,
    };

    let token = parser.lexer.next();
    let expr = match kind {
        TokenKind::Number => ExprKind::IntLiteral { value: token.value },
        _ => ExprKind::Variable { name: token.value },
    };
    Some(parser.alloc_expr(expr, token.span))
}

pub fn read_prefix_expr(parser: &mut Parser) -> ExprId {
    let operator = parser.lexer.next();
    let operand = read_expr(parser, BindingPower::Unary);
    let span = operator.span.to(&parser.expr_span(operand));

    parser.alloc_expr(
        ExprKind::Unary {
            op: operator.value,
            operand,
        },
        span,
    )
}

pub fn read_binary_expr(parser: &mut Parser, left: ExprId, bp: BindingPower) -> ExprId {
    let operator = parser.lexer.next();
    let right = read_expr(parser, bp);
    make_binary(parser, left, operator.value, operator.span, right)
}

pub fn read_assignment_expr(parser: &mut Parser, left: ExprId, bp: BindingPower) -> ExprId {
    let operator = parser.lexer.next();
    let right = read_expr(parser, bp.below());
    make_binary(parser, left, operator.value, operator.span, right)
}

fn make_binary(
    parser: &mut Parser,
    left: ExprId,
    op: String,
    op_span: Span,
    right: ExprId,
) -> ExprId {
    let span = parser.expr_span(left).to(&parser.expr_span(right));
    parser.alloc_expr(
        ExprKind::Binary {
            op,
            op_span,
            left,
            right,
        },
        span,
    )
}

pub fn read_call_expr(parser: &mut Parser, callee: ExprId, _bp: BindingPower) -> ExprId {
    let open = parser.lexer.next();
    let mut args = vec![];

    while !parser.lexer.is_next_value(TokenKind::Symbol, ")") && !parser.lexer.eof() {
        args.push(read_expr(parser, BindingPower::Default));
        if parser.lexer.is_next_value(TokenKind::Symbol, ",") {
            let comma = parser.lexer.next();
            if parser.lexer.is_next_value(TokenKind::Symbol, ")") {
                parser.error(ErrorImpl::TrailingCommaInArguments, comma.span);
            }
        } else {
            break;
        }
    }

    if !parser.lexer.is_next_value(TokenKind::Symbol, ")")
        && !parser.lexer.try_to_close(TokenKind::Symbol, "(", ")")
    {
        parser.error(ErrorImpl::UnclosedCall, open.span);
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, ")", "to close function call");

    let span = parser.span_from(&parser.expr_span(callee));
    parser.alloc_expr(ExprKind::Call { callee, args }, span)
}

pub fn read_subscript_expr(parser: &mut Parser, object: ExprId, _bp: BindingPower) -> ExprId {
    let open = parser.lexer.next();
    let index = read_expr(parser, BindingPower::Default);

    if !parser.lexer.is_next_value(TokenKind::Symbol, "]")
        && !parser.lexer.try_to_close(TokenKind::Symbol, "[", "]")
    {
        parser.error(ErrorImpl::UnclosedSubscript, open.span);
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, "]", "to close subscript");

    let span = parser.span_from(&parser.expr_span(object));
    parser.alloc_expr(ExprKind::Subscript { object, index }, span)
}

pub fn read_member_expr(parser: &mut Parser, object: ExprId, _bp: BindingPower) -> ExprId {
    parser.lexer.next();
    let name = parser.lexer.consume(TokenKind::Identifier);

    let span = parser.span_from(&parser.expr_span(object));
    parser.alloc_expr(
        ExprKind::Member {
            object,
            name: name.value,
            name_span: name.span,
        },
        span,
    )
}

/// `ns::name` folds into a single variable named `ns::name`.
pub fn read_scope_expr(parser: &mut Parser, left: ExprId, _bp: BindingPower) -> ExprId {
    parser.lexer.next();
    let left_span = parser.expr_span(left);
    let namespace = match &parser.arena[left].kind {
        ExprKind::Variable { name } => Some(name.clone()),
        _ => None,
    };
    let namespace = match namespace {
        Some(name) => name,
        None => {
            parser.error(ErrorImpl::ExpectedNamespace, left_span.clone());
            String::from("<error namespace>")
        }
    };

    let member = parser.lexer.consume(TokenKind::Identifier);
    let span = parser.span_from(&left_span);
    parser.alloc_expr(
        ExprKind::Variable {
            name: format!("{}::{}", namespace, member.value),
        },
        span,
    )
}

pub fn read_grouping_expr(parser: &mut Parser) -> ExprId {
    let open = parser.lexer.next();
    let inner = read_expr(parser, BindingPower::Default);

    if !parser.lexer.is_next_value(TokenKind::Symbol, ")")
        && !parser.lexer.try_to_close(TokenKind::Symbol, "(", ")")
    {
        parser.error(ErrorImpl::UnclosedParenthesis, open.span.clone());
    }
    parser
        .lexer
        .read_value_msg(TokenKind::Symbol, ")", "to close parenthesis");

    let span = parser.span_from(&open.span);
    parser.alloc_expr(ExprKind::Parenthesized(inner), span)
}
