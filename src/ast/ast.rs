use std::ops::{Index, IndexMut};

use crate::impl_typed_id;

use super::{
    expressions::{Expr, ExprKind},
    statements::{ClassDef, Program, Stat, VarDecl},
    types::Typing,
};
use crate::Span;

impl_typed_id!(TypingId, "Index of a `Typing` inside an `Arena`.");
impl_typed_id!(ExprId, "Index of an `Expr` inside an `Arena`.");
impl_typed_id!(StatId, "Index of a `Stat` inside an `Arena`.");
impl_typed_id!(VarDeclId, "Index of a `VarDecl` inside an `Arena`.");
impl_typed_id!(ClassId, "Index of a `ClassDef` inside an `Arena`.");
impl_typed_id!(ProgramId, "Index of a `Program` inside an `Arena`.");

/// Owner of every node produced while compiling.
///
/// Nodes are never freed individually; everything else refers to them by id.
/// Indexing with an id from a different arena panics or returns an unrelated node.
#[derive(Debug, Default, Clone)]
pub struct Arena {
    typings: Vec<Typing>,
    exprs: Vec<Expr>,
    stats: Vec<Stat>,
    vardecls: Vec<VarDecl>,
    classes: Vec<ClassDef>,
    programs: Vec<Program>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn alloc_typing(&mut self, typing: Typing) -> TypingId {
        self.typings.push(typing);
        TypingId::from(self.typings.len() - 1)
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.exprs.push(Expr {
            kind,
            span,
            typing: None,
        });
        ExprId::from(self.exprs.len() - 1)
    }

    pub fn alloc_stat(&mut self, stat: Stat) -> StatId {
        self.stats.push(stat);
        StatId::from(self.stats.len() - 1)
    }

    pub fn alloc_vardecl(&mut self, vardecl: VarDecl) -> VarDeclId {
        self.vardecls.push(vardecl);
        VarDeclId::from(self.vardecls.len() - 1)
    }

    pub fn alloc_class(&mut self, class: ClassDef) -> ClassId {
        self.classes.push(class);
        ClassId::from(self.classes.len() - 1)
    }

    pub fn alloc_program(&mut self, program: Program) -> ProgramId {
        self.programs.push(program);
        ProgramId::from(self.programs.len() - 1)
    }

    pub fn typing_count(&self) -> usize {
        self.typings.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

macro_rules! arena_index {
    ($id:ty, $node:ty, $field:ident) => {
        impl Index<$id> for Arena {
            type Output = $node;

            fn index(&self, id: $id) -> &$node {
                &self.$field[id.into_usize()]
            }
        }

        impl IndexMut<$id> for Arena {
            fn index_mut(&mut self, id: $id) -> &mut $node {
                &mut self.$field[id.into_usize()]
            }
        }
    };
}

arena_index!(TypingId, Typing, typings);
arena_index!(ExprId, Expr, exprs);
arena_index!(StatId, Stat, stats);
arena_index!(VarDeclId, VarDecl, vardecls);
arena_index!(ClassId, ClassDef, classes);
arena_index!(ProgramId, Program, programs);
