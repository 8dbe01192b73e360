use std::collections::HashMap;

use crate::ast::ast::ExprId;

use super::{expr::*, parser::Parser};

/// Operator precedence bands, lowest first.
///
/// An infix handler only runs while its band is strictly greater than the
/// band the caller is reading at.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
pub enum BindingPower {
    Default = 0,
    Comma = 1,
    Assignment = 2,
    LogicalOr = 4,
    LogicalAnd = 5,
    BitwiseOr = 6,
    Xor = 7,
    BitwiseAnd = 8,
    Equality = 9,
    Relational = 10,
    Shift = 11,
    Additive = 12,
    Multiplicative = 13,
    Unary = 14,
    Call = 15,
    Scope = 16,
    Primary = 17,
}

impl BindingPower {
    /// The band just below this one; right-associative operators read their right side at it.
    pub fn below(self) -> BindingPower {
        match self {
            BindingPower::Default | BindingPower::Comma => BindingPower::Default,
            BindingPower::Assignment => BindingPower::Comma,
            BindingPower::LogicalOr => BindingPower::Assignment,
            BindingPower::LogicalAnd => BindingPower::LogicalOr,
            BindingPower::BitwiseOr => BindingPower::LogicalAnd,
            BindingPower::Xor => BindingPower::BitwiseOr,
            BindingPower::BitwiseAnd => BindingPower::Xor,
            BindingPower::Equality => BindingPower::BitwiseAnd,
            BindingPower::Relational => BindingPower::Equality,
            BindingPower::Shift => BindingPower::Relational,
            BindingPower::Additive => BindingPower::Shift,
            BindingPower::Multiplicative => BindingPower::Additive,
            BindingPower::Unary => BindingPower::Multiplicative,
            BindingPower::Call => BindingPower::Unary,
            BindingPower::Scope => BindingPower::Call,
            BindingPower::Primary => BindingPower::Scope,
        }
    }
}

pub type NUDHandler = fn(&mut Parser) -> ExprId;
pub type LEDHandler = fn(&mut Parser, ExprId, BindingPower) -> ExprId;

pub fn create_token_lookups(parser: &mut Parser) {
    // Assignment, right associative
    for op in ["=", "*=", "/=", "%=", "+=", "-=", "<<~=", "~>>=", "&=", "|=", "^="] {
        parser.led(op, BindingPower::Assignment, read_assignment_expr);
    }

    // Logical and bitwise
    parser.led("||", BindingPower::LogicalOr, read_binary_expr);
    parser.led("&&", BindingPower::LogicalAnd, read_binary_expr);
    parser.led("|", BindingPower::BitwiseOr, read_binary_expr);
    parser.led("^", BindingPower::Xor, read_binary_expr);
    parser.led("&", BindingPower::BitwiseAnd, read_binary_expr);

    // Equality and relational
    parser.led("==", BindingPower::Equality, read_binary_expr);
    parser.led("!=", BindingPower::Equality, read_binary_expr);
    parser.led("<=", BindingPower::Relational, read_binary_expr);
    parser.led(">=", BindingPower::Relational, read_binary_expr);
    parser.led("<", BindingPower::Relational, read_binary_expr);
    parser.led(">", BindingPower::Relational, read_binary_expr);

    // Shift, additive and multiplicative
    parser.led("<<~", BindingPower::Shift, read_binary_expr);
    parser.led("~>>", BindingPower::Shift, read_binary_expr);
    parser.led("+", BindingPower::Additive, read_binary_expr);
    parser.led("-", BindingPower::Additive, read_binary_expr);
    parser.led("*", BindingPower::Multiplicative, read_binary_expr);
    parser.led("/", BindingPower::Multiplicative, read_binary_expr);
    parser.led("%", BindingPower::Multiplicative, read_binary_expr);

    // Postfix
    parser.led("(", BindingPower::Call, read_call_expr);
    parser.led("[", BindingPower::Call, read_subscript_expr);
    parser.led(".", BindingPower::Call, read_member_expr);
    parser.led("::", BindingPower::Scope, read_scope_expr);

    // Prefix
    for op in ["++", "--", "~", "!", "-", "+"] {
        parser.nud(op, read_prefix_expr);
    }
    parser.nud("(", read_grouping_expr);
}

// Lookup tables inside parser struct, so it's easier
pub type NUDLookup = HashMap<&'static str, NUDHandler>;
pub type LEDLookup = HashMap<&'static str, LEDHandler>;
pub type BPLookup = HashMap<&'static str, BindingPower>;
