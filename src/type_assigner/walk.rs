use crate::{
    ast::{
        ast::{ExprId, StatId, TypingId, VarDeclId},
        expressions::ExprKind,
        statements::StatKind,
        types::{make_function_typing, typing_to_string, types_equal, Typing, CORE_INT64},
    },
    errors::errors::ErrorImpl,
    Span,
};

use super::type_assigner::{Overload, TypeAssigner};

pub fn walk_stat(assigner: &mut TypeAssigner, id: StatId) {
    match assigner.arena()[id].kind.clone() {
        StatKind::Return(value) => {
            if let Some(value) = value {
                walk_expr(assigner, value);
            }
        }
        StatKind::Block(stats) => {
            assigner.scopes.downscope();
            for stat in stats {
                walk_stat(assigner, stat);
            }
            assigner.scopes.upscope();
        }
        StatKind::Expression(expr) => {
            walk_expr(assigner, expr);
        }
        StatKind::If {
            cond,
            body,
            else_body,
        } => {
            walk_expr(assigner, cond);
            walk_stat(assigner, body);
            if let Some(else_body) = else_body {
                walk_stat(assigner, else_body);
            }
        }
        StatKind::VarDecl(decl) => walk_vardecl(assigner, decl),
    }
}

/// Walks the initializer, then declares the name in the innermost scope.
pub fn walk_vardecl(assigner: &mut TypeAssigner, id: VarDeclId) {
    let decl = assigner.arena()[id].clone();
    if let Some(init) = decl.init {
        walk_expr(assigner, init);
    }

    if assigner.scopes.has_local(&decl.name) {
        assigner.warning(ErrorImpl::DuplicateVariable, decl.name_span);
    }

    if let Some(typing) = decl.typing {
        assigner.patch(typing);
        assigner.scopes.declare(&decl.name, typing);
    }
}

/// Assigns a typing to `id` and every expression below it, returning it.
pub fn walk_expr(assigner: &mut TypeAssigner, id: ExprId) -> TypingId {
    let span = assigner.arena()[id].span.clone();

    let typing = match assigner.arena()[id].kind.clone() {
        ExprKind::Error => assigner.error_typing(span),
        ExprKind::IntLiteral { .. } => {
            let typing = assigner
                .arena_mut()
                .alloc_typing(Typing::new(CORE_INT64, span));
            assigner.mark_patched(typing);
            typing
        }
        ExprKind::Parenthesized(inner) => walk_expr(assigner, inner),
        ExprKind::Variable { name } => match assigner.scopes.get(&name) {
            Some(typing) => typing,
            None => {
                assigner.error(ErrorImpl::UndefinedVariable { name }, span.clone());
                assigner.error_typing(span)
            }
        },
        ExprKind::Lambda {
            return_type,
            params,
            body,
        } => {
            assigner.scopes.downscope();
            for param in &params {
                assigner.patch(param.typing);
                assigner.scopes.declare(&param.name, param.typing);
            }
            walk_stat(assigner, body);
            assigner.scopes.upscope();

            if let Some(return_type) = return_type {
                assigner.patch(return_type);
            }
            let params = params.iter().map(|p| p.typing).collect();
            let typing = make_function_typing(assigner.arena_mut(), return_type, params, span);
            assigner.mark_patched(typing);
            let return_type = assigner.arena()[typing].templates[0];
            assigner.mark_patched(return_type);
            typing
        }
        ExprKind::Member {
            object,
            name,
            name_span,
        } => walk_member(assigner, object, name, name_span),
        ExprKind::Subscript { object, index } => {
            let object_typing = walk_expr(assigner, object);
            let index_typing = walk_expr(assigner, index);
            let object_span = assigner.arena()[object].span.clone();
            resolve_operator(assigner, "[", "[]", object_typing, &[index_typing], object_span)
        }
        ExprKind::Call { callee, args } => {
            let callee_typing = walk_expr(assigner, callee);
            let arg_typings: Vec<TypingId> = args.iter().map(|arg| walk_expr(assigner, *arg)).collect();
            let callee_span = assigner.arena()[callee].span.clone();
            resolve_operator(assigner, "(", "()", callee_typing, &arg_typings, callee_span)
        }
        ExprKind::Binary {
            op, left, right, ..
        } => {
            // `a += b` looks up `operator+=` like any other binary operator
            if op == "=" {
                walk_assignment(assigner, left, right)
            } else {
                let left_typing = walk_expr(assigner, left);
                let right_typing = walk_expr(assigner, right);
                let left_span = assigner.arena()[left].span.clone();
                resolve_operator(assigner, &op, &op, left_typing, &[right_typing], left_span)
            }
        }
        ExprKind::Unary { op, operand } => {
            let operand_typing = walk_expr(assigner, operand);
            let operand_span = assigner.arena()[operand].span.clone();
            resolve_operator(assigner, &op, &op, operand_typing, &[], operand_span)
        }
    };

    assigner.arena_mut()[id].typing = Some(typing);
    typing
}

fn walk_member(assigner: &mut TypeAssigner, object: ExprId, name: String, name_span: Span) -> TypingId {
    let object_typing = walk_expr(assigner, object);
    if assigner.is_error(object_typing) {
        return assigner.error_typing(name_span);
    }

    if let Some(class) = assigner.find_class(object_typing) {
        let arena = assigner.arena();
        let class = &arena[class];
        let field = class
            .fields_with_access()
            .find(|(field, access)| arena[*field].name == name && assigner.is_accessible(class, *access))
            .and_then(|(field, _)| arena[field].typing);

        if let Some(typing) = field {
            return typing;
        }
    }

    assigner.error(ErrorImpl::UndefinedMember { name }, name_span.clone());
    assigner.error_typing(name_span)
}

/// `=` on a variable or member needs equal types; on a subscript it calls `operator[]=`.
fn walk_assignment(assigner: &mut TypeAssigner, left: ExprId, right: ExprId) -> TypingId {
    let left_span = assigner.arena()[left].span.clone();

    match assigner.arena()[left].kind.clone() {
        ExprKind::Variable { .. } | ExprKind::Member { .. } => {
            let left_typing = walk_expr(assigner, left);
            let right_typing = walk_expr(assigner, right);
            check_same_type(assigner, left_typing, right_typing, left_span);
            left_typing
        }
        ExprKind::Subscript { object, index } => {
            let object_typing = walk_expr(assigner, object);
            let index_typing = walk_expr(assigner, index);
            let value_typing = walk_expr(assigner, right);
            let typing = resolve_operator(
                assigner,
                "[=",
                "[]=",
                object_typing,
                &[index_typing, value_typing],
                left_span,
            );
            assigner.arena_mut()[left].typing = Some(typing);
            typing
        }
        _ => {
            walk_expr(assigner, right);
            assigner.error(ErrorImpl::ExpectedLvalue, left_span.clone());
            assigner.error_typing(left_span)
        }
    }
}

fn check_same_type(assigner: &mut TypeAssigner, expected: TypingId, found: TypingId, span: Span) {
    if assigner.is_error(expected) || assigner.is_error(found) {
        return;
    }

    if !types_equal(assigner.arena(), expected, found) {
        let expected = typing_to_string(assigner.arena(), expected);
        let found = typing_to_string(assigner.arena(), found);
        assigner.error(ErrorImpl::TypeMismatch { expected, found }, span);
    }
}

/// Resolves `operator<op>` on `typing`; `display` is how the operator is named in diagnostics.
fn resolve_operator(
    assigner: &mut TypeAssigner,
    op: &str,
    display: &str,
    typing: TypingId,
    args: &[TypingId],
    span: Span,
) -> TypingId {
    if assigner.is_error(typing) || args.iter().any(|arg| assigner.is_error(*arg)) {
        return assigner.error_typing(span);
    }

    match assigner.find_overload(&format!("operator{}", op), typing, args) {
        Overload::Found(result) => result,
        Overload::NoMatch => {
            let operator = display.to_string();
            assigner.error(ErrorImpl::NoMatchingOverload { operator }, span.clone());
            assigner.error_typing(span)
        }
        Overload::Undefined => {
            let operator = display.to_string();
            assigner.error(ErrorImpl::UndefinedOperator { operator }, span.clone());
            assigner.error_typing(span)
        }
    }
}
