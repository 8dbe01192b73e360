use std::collections::BTreeMap;

use crate::Span;

use super::ast::{Arena, ClassId, ExprId, ProgramId, StatId, TypingId, VarDeclId};

#[derive(Debug, Clone)]
pub struct Stat {
    pub kind: StatKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StatKind {
    Return(Option<ExprId>),
    Block(Vec<StatId>),
    Expression(ExprId),
    If {
        cond: ExprId,
        body: StatId,
        else_body: Option<StatId>,
    },
    VarDecl(VarDeclId),
}

/// A named declaration: variable, field, method, constructor (`.ctor`),
/// destructor (`.dtor`) or operator overload (`operator+`, `operator[=`, ...).
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub span: Span,
    pub name: String,
    pub name_span: Span,
    /// Absent for constructors and destructors.
    pub typing: Option<TypingId>,
    pub init: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Private,
    Public,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub name_span: Span,
    pub is_struct: bool,
    pub generics: Vec<String>,
    /// The last generic captures every remaining template argument.
    pub is_variadic: bool,
    pub fields: Vec<VarDeclId>,
    /// Parallel to `fields`.
    pub accesses: Vec<Access>,
    /// Set by the type assigner when the class is registered.
    pub program: Option<ProgramId>,
}

impl ClassDef {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    /// Whether `count` template arguments fit this class.
    pub fn accepts_template_count(&self, count: usize) -> bool {
        count == self.generics.len() || (self.is_variadic && count + 1 >= self.generics.len())
    }

    pub fn fields_with_access(&self) -> impl Iterator<Item = (VarDeclId, Access)> + '_ {
        self.fields.iter().copied().zip(self.accesses.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    pub name: String,
    pub span: Span,
}

/// One parsed source file.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub namespace_name: String,
    pub imports: Vec<Import>,
    pub vardecls: Vec<VarDeclId>,
    pub classes: Vec<ClassId>,
    pub aliases: BTreeMap<String, TypingId>,
}

/// Every program analysed together, with the arena that owns their nodes.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    pub arena: Arena,
    pub programs: Vec<ProgramId>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        CompilationUnit::default()
    }
}
