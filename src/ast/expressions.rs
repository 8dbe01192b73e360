//! Expression nodes.
//!
//! Every expression lives in the [`Arena`](super::ast::Arena) and carries the
//! typing the type assigner resolved for it (`None` until that pass runs).

use crate::Span;

use super::ast::{ExprId, StatId, TypingId};

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub typing: Option<TypingId>,
}

/// One named, typed lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub typing: TypingId,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Prefix operator, `-x`, `!x`, `++x`.
    Unary { op: String, operand: ExprId },
    /// Infix operator, including `=` and the compound assignments.
    Binary {
        op: String,
        op_span: Span,
        left: ExprId,
        right: ExprId,
    },
    Call { callee: ExprId, args: Vec<ExprId> },
    Subscript { object: ExprId, index: ExprId },
    Member {
        object: ExprId,
        name: String,
        name_span: Span,
    },
    /// A bare or `::` scoped name.
    Variable { name: String },
    /// Digits exactly as written; no range checking happens in the front end.
    IntLiteral { value: String },
    Parenthesized(ExprId),
    /// Function body. Methods, constructors and destructors are all lambdas.
    Lambda {
        return_type: Option<TypingId>,
        params: Vec<Param>,
        body: StatId,
    },
    /// Stands in for an expression that could not be parsed.
    Error,
}

impl ExprKind {
    /// Short node name used by the AST dump.
    pub fn label(&self) -> &'static str {
        match self {
            ExprKind::Unary { .. } => "unary",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Call { .. } => "call",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Member { .. } => "member",
            ExprKind::Variable { .. } => "variable",
            ExprKind::IntLiteral { .. } => "int",
            ExprKind::Parenthesized(_) => "paren",
            ExprKind::Lambda { .. } => "lambda",
            ExprKind::Error => "error",
        }
    }
}
