//! Generic class instantiation helpers.
//!
//! [`Cloner`] deep-copies the fields of a generic class so an instance never shares
//! nodes with its template. [`Templater`] then rewrites the copy in place, replacing
//! every generic parameter with the concrete argument and splicing the variadic
//! tail into template lists and lambda parameter lists.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{Arena, ExprId, StatId, TypingId, VarDeclId},
        expressions::{ExprKind, Param},
        statements::{Stat, StatKind, VarDecl},
        types::Typing,
    },
    errors::errors::ErrorImpl,
    Span,
};

pub struct Cloner<'a> {
    arena: &'a mut Arena,
}

impl<'a> Cloner<'a> {
    pub fn new(arena: &'a mut Arena) -> Self {
        Cloner { arena }
    }

    pub fn clone_typing(&mut self, id: TypingId) -> TypingId {
        let typing = self.arena[id].clone();
        let templates = typing
            .templates
            .iter()
            .map(|t| self.clone_typing(*t))
            .collect();
        self.arena.alloc_typing(Typing {
            templates,
            ..typing
        })
    }

    pub fn clone_vardecl(&mut self, id: VarDeclId) -> VarDeclId {
        let decl = self.arena[id].clone();
        let typing = decl.typing.map(|t| self.clone_typing(t));
        let init = decl.init.map(|e| self.clone_expr(e));
        self.arena.alloc_vardecl(VarDecl {
            typing,
            init,
            ..decl
        })
    }

    pub fn clone_stat(&mut self, id: StatId) -> StatId {
        let stat = self.arena[id].clone();
        let kind = match stat.kind {
            StatKind::Return(value) => StatKind::Return(value.map(|e| self.clone_expr(e))),
            StatKind::Block(stats) => {
                StatKind::Block(stats.into_iter().map(|s| self.clone_stat(s)).collect())
            }
            StatKind::Expression(expr) => StatKind::Expression(self.clone_expr(expr)),
            StatKind::If {
                cond,
                body,
                else_body,
            } => StatKind::If {
                cond: self.clone_expr(cond),
                body: self.clone_stat(body),
                else_body: else_body.map(|s| self.clone_stat(s)),
            },
            StatKind::VarDecl(decl) => StatKind::VarDecl(self.clone_vardecl(decl)),
        };
        self.arena.alloc_stat(Stat {
            kind,
            span: stat.span,
        })
    }

    pub fn clone_expr(&mut self, id: ExprId) -> ExprId {
        let expr = self.arena[id].clone();
        let kind = match expr.kind {
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: self.clone_expr(operand),
            },
            ExprKind::Binary {
                op,
                op_span,
                left,
                right,
            } => ExprKind::Binary {
                op,
                op_span,
                left: self.clone_expr(left),
                right: self.clone_expr(right),
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: self.clone_expr(callee),
                args: args.into_iter().map(|a| self.clone_expr(a)).collect(),
            },
            ExprKind::Subscript { object, index } => ExprKind::Subscript {
                object: self.clone_expr(object),
                index: self.clone_expr(index),
            },
            ExprKind::Member {
                object,
                name,
                name_span,
            } => ExprKind::Member {
                object: self.clone_expr(object),
                name,
                name_span,
            },
            ExprKind::Parenthesized(inner) => ExprKind::Parenthesized(self.clone_expr(inner)),
            ExprKind::Lambda {
                return_type,
                params,
                body,
            } => ExprKind::Lambda {
                return_type: return_type.map(|t| self.clone_typing(t)),
                params: params
                    .into_iter()
                    .map(|p| Param {
                        typing: self.clone_typing(p.typing),
                        name: p.name,
                    })
                    .collect(),
                body: self.clone_stat(body),
            },
            kind @ (ExprKind::Variable { .. } | ExprKind::IntLiteral { .. } | ExprKind::Error) => kind,
        };

        let typing = expr.typing.map(|t| self.clone_typing(t));
        let result = self.arena.alloc_expr(kind, expr.span);
        self.arena[result].typing = typing;
        result
    }
}

/// Substitutes generic parameters inside freshly cloned nodes.
pub struct Templater<'a> {
    arena: &'a mut Arena,
    map: &'a HashMap<String, TypingId>,
    variadic: Option<&'a str>,
    variadic_types: &'a [TypingId],
    /// Problems found while substituting, reported by the caller with its template context.
    pub problems: Vec<(ErrorImpl, Span)>,
    /// Nodes overwritten with an already resolved argument.
    pub substituted: Vec<TypingId>,
}

impl<'a> Templater<'a> {
    pub fn new(
        arena: &'a mut Arena,
        map: &'a HashMap<String, TypingId>,
        variadic: Option<&'a str>,
        variadic_types: &'a [TypingId],
    ) -> Self {
        Templater {
            arena,
            map,
            variadic,
            variadic_types,
            problems: vec![],
            substituted: vec![],
        }
    }

    fn is_variadic(&self, name: &str) -> bool {
        self.variadic == Some(name)
    }

    pub fn walk_typing(&mut self, id: TypingId) {
        let name = self.arena[id].name.clone();

        if let Some(&argument) = self.map.get(&name) {
            if !self.arena[id].templates.is_empty() {
                self.problems
                    .push((ErrorImpl::TemplateHasTemplates, self.arena[id].args_span.clone()));
            }

            let argument = self.arena[argument].clone();
            let typing = &mut self.arena[id];
            typing.name = argument.name;
            typing.display_name = argument.display_name;
            typing.is_alias_expansion = argument.is_alias_expansion;
            typing.templates = argument.templates;
            self.substituted.push(id);
            return;
        }

        let mut can_have_more = true;
        let mut templates = vec![];
        for template in self.arena[id].templates.clone() {
            if !can_have_more {
                self.problems
                    .push((ErrorImpl::TemplateAfterVariadic, self.arena[template].span.clone()));
            } else if self.is_variadic(&self.arena[template].name) {
                if !self.arena[template].templates.is_empty() {
                    self.problems.push((
                        ErrorImpl::TemplateHasTemplates,
                        self.arena[template].args_span.clone(),
                    ));
                }
                can_have_more = false;
                templates.extend_from_slice(self.variadic_types);
            } else {
                self.walk_typing(template);
                templates.push(template);
            }
        }
        self.arena[id].templates = templates;
    }

    pub fn walk_vardecl(&mut self, id: VarDeclId) {
        let decl = self.arena[id].clone();
        if let Some(typing) = decl.typing {
            self.walk_typing(typing);
        }
        if let Some(init) = decl.init {
            self.walk_expr(init);
        }
    }

    pub fn walk_stat(&mut self, id: StatId) {
        match self.arena[id].kind.clone() {
            StatKind::Return(value) => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
            StatKind::Block(stats) => {
                for stat in stats {
                    self.walk_stat(stat);
                }
            }
            StatKind::Expression(expr) => self.walk_expr(expr),
            StatKind::If {
                cond,
                body,
                else_body,
            } => {
                self.walk_expr(cond);
                self.walk_stat(body);
                if let Some(else_body) = else_body {
                    self.walk_stat(else_body);
                }
            }
            StatKind::VarDecl(decl) => self.walk_vardecl(decl),
        }
    }

    pub fn walk_expr(&mut self, id: ExprId) {
        match self.arena[id].kind.clone() {
            ExprKind::Unary { operand, .. } => self.walk_expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            ExprKind::Call { callee, args } => {
                self.walk_expr(callee);
                for arg in args {
                    self.walk_expr(arg);
                }
            }
            ExprKind::Subscript { object, index } => {
                self.walk_expr(object);
                self.walk_expr(index);
            }
            ExprKind::Member { object, .. } => self.walk_expr(object),
            ExprKind::Parenthesized(inner) => self.walk_expr(inner),
            ExprKind::Lambda {
                return_type,
                params,
                body,
            } => {
                if let Some(return_type) = return_type {
                    self.walk_typing(return_type);
                }
                let params = self.splice_params(params);
                if let ExprKind::Lambda { params: slot, .. } = &mut self.arena[id].kind {
                    *slot = params;
                }
                self.walk_stat(body);
            }
            ExprKind::Variable { .. } | ExprKind::IntLiteral { .. } | ExprKind::Error => {}
        }
    }

    /// Expands a variadic parameter `Args args` into `args...0`, `args...1`, ...
    fn splice_params(&mut self, params: Vec<Param>) -> Vec<Param> {
        let mut can_have_more = true;
        let mut result = vec![];

        for param in params {
            if !can_have_more {
                self.problems.push((
                    ErrorImpl::ParameterAfterVariadic,
                    self.arena[param.typing].span.clone(),
                ));
            } else if self.is_variadic(&self.arena[param.typing].name) {
                can_have_more = false;
                for (i, typing) in self.variadic_types.iter().enumerate() {
                    result.push(Param {
                        name: format!("{}...{}", param.name, i),
                        typing: *typing,
                    });
                }
            } else {
                self.walk_typing(param.typing);
                result.push(param);
            }
        }

        result
    }
}
