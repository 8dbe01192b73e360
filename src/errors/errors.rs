use std::path::PathBuf;

use thiserror::Error;

use crate::Span;

/// One reported problem. Warnings and errors share this shape.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub error: ErrorImpl,
    pub span: Span,
    /// Display name of the generic instantiation being expanded when this was raised.
    pub template: Option<String>,
    pub is_warning: bool,
}

impl Diagnostic {
    pub fn error(error: ErrorImpl, span: Span) -> Self {
        Diagnostic {
            error,
            span,
            template: None,
            is_warning: false,
        }
    }

    pub fn warning(error: ErrorImpl, span: Span) -> Self {
        Diagnostic {
            error,
            span,
            template: None,
            is_warning: true,
        }
    }

    pub fn with_template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn get_error_name(&self) -> &'static str {
        self.error.name()
    }
}

/// Ordered, append-only collection of diagnostics for one compilation.
///
/// Only checkpoint rewinds ever remove entries, via [`Diagnostics::truncate`].
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { list: vec![] }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.list.push(diagnostic);
    }

    pub fn error(&mut self, error: ErrorImpl, span: Span) {
        self.push(Diagnostic::error(error, span));
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.list.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter().filter(|d| !d.is_warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter().filter(|d| d.is_warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Messages in report order, handy for assertions.
    pub fn messages(&self) -> Vec<String> {
        self.list.iter().map(Diagnostic::message).collect()
    }
}

impl std::ops::Index<usize> for Diagnostics {
    type Output = Diagnostic;

    fn index(&self, index: usize) -> &Diagnostic {
        &self.list[index]
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unfinished string")]
    UnfinishedString,
    #[error("unexpected character '{character}'")]
    UnexpectedCharacter { character: char },

    // Syntactic
    #[error("unexpected token(s)")]
    UnexpectedTokens,
    #[error("expected {expected}, found {found}")]
    ExpectedToken { expected: String, found: String },
    #[error("unexpected <eof>")]
    UnexpectedEof,
    #[error("unexpected {token}")]
    UnexpectedToken { token: String },
    #[error("missing semicolon")]
    MissingSemicolon,
    #[error("trailing comma in argument list")]
    TrailingCommaInArguments,
    #[error("trailing comma in parameter list")]
    TrailingCommaInParameters,
    #[error("trailing comma on template types")]
    TrailingCommaOnTemplates,
    #[error("unclosed function call")]
    UnclosedCall,
    #[error("unclosed subscript")]
    UnclosedSubscript,
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,
    #[error("unclosed template")]
    UnclosedTemplate,
    #[error("unclosed block")]
    UnclosedBlock,
    #[error("unclosed class definition")]
    UnclosedClass,
    #[error("expected namespace")]
    ExpectedNamespace,
    #[error("cannot override operator {operator}")]
    CannotOverrideOperator { operator: String },

    // Semantic
    #[error("template type cannot have templates of its own")]
    TemplateHasTemplates,
    #[error("cannot have more templates after variadic template")]
    TemplateAfterVariadic,
    #[error("cannot have more parameters after variadic template")]
    ParameterAfterVariadic,
    #[error("incorrect number of template types")]
    TemplateCount,
    #[error("template types don't belong on a non-generic type")]
    UnexpectedTemplates,
    #[error("unknown type {name}")]
    UnknownType { name: String },
    #[error("recursive alias {name}")]
    RecursiveAlias { name: String },
    #[error("unknown namespace {name}")]
    UnknownNamespace { name: String },
    #[error("conflicting class definitions for {name}")]
    ConflictingClass { name: String },
    #[error("duplicate variable declaration")]
    DuplicateVariable,
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("undefined member '{name}'")]
    UndefinedMember { name: String },
    #[error("undefined member operator{operator}")]
    UndefinedOperator { operator: String },
    #[error("no overload of member operator{operator} matches the given parameters")]
    NoMatchingOverload { operator: String },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("expected lvalue")]
    ExpectedLvalue,
    #[error("generic instantiation too deep")]
    InstantiationTooDeep,
}

impl ErrorImpl {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorImpl::UnfinishedString => "UnfinishedString",
            ErrorImpl::UnexpectedCharacter { .. } => "UnexpectedCharacter",
            ErrorImpl::UnexpectedTokens => "UnexpectedTokens",
            ErrorImpl::ExpectedToken { .. } => "ExpectedToken",
            ErrorImpl::UnexpectedEof => "UnexpectedEof",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::MissingSemicolon => "MissingSemicolon",
            ErrorImpl::TrailingCommaInArguments => "TrailingComma",
            ErrorImpl::TrailingCommaInParameters => "TrailingComma",
            ErrorImpl::TrailingCommaOnTemplates => "TrailingComma",
            ErrorImpl::UnclosedCall => "UnclosedCall",
            ErrorImpl::UnclosedSubscript => "UnclosedSubscript",
            ErrorImpl::UnclosedParenthesis => "UnclosedParenthesis",
            ErrorImpl::UnclosedTemplate => "UnclosedTemplate",
            ErrorImpl::UnclosedBlock => "UnclosedBlock",
            ErrorImpl::UnclosedClass => "UnclosedClass",
            ErrorImpl::ExpectedNamespace => "ExpectedNamespace",
            ErrorImpl::CannotOverrideOperator { .. } => "CannotOverrideOperator",
            ErrorImpl::TemplateHasTemplates => "TemplateHasTemplates",
            ErrorImpl::TemplateAfterVariadic => "TemplateAfterVariadic",
            ErrorImpl::ParameterAfterVariadic => "ParameterAfterVariadic",
            ErrorImpl::TemplateCount => "TemplateCount",
            ErrorImpl::UnexpectedTemplates => "UnexpectedTemplates",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::RecursiveAlias { .. } => "RecursiveAlias",
            ErrorImpl::UnknownNamespace { .. } => "UnknownNamespace",
            ErrorImpl::ConflictingClass { .. } => "ConflictingClass",
            ErrorImpl::DuplicateVariable => "DuplicateVariable",
            ErrorImpl::UndefinedVariable { .. } => "UndefinedVariable",
            ErrorImpl::UndefinedMember { .. } => "UndefinedMember",
            ErrorImpl::UndefinedOperator { .. } => "UndefinedOperator",
            ErrorImpl::NoMatchingOverload { .. } => "NoMatchingOverload",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::ExpectedLvalue => "ExpectedLvalue",
            ErrorImpl::InstantiationTooDeep => "InstantiationTooDeep",
        }
    }
}

/// Failures reading or writing the binary definition format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OdefError {
    #[error("definition file is {len} bytes, shorter than its 12 byte header")]
    TooShort { len: usize },
    #[error("definition file has an invalid signature")]
    BadSignature,
    #[error("definition file is truncated")]
    Truncated,
    #[error("definition file has {count} trailing bytes after its payload")]
    TrailingBytes { count: usize },
    #[error("definition file contains a string that is not valid UTF-8")]
    InvalidUtf8,
    #[error("definition file contains an invalid flag byte {value:#04x}")]
    InvalidFlag { value: u8 },
}

/// Failures of the driver that are not diagnostics about the source itself.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown target {target:?}")]
    UnknownTarget { target: String },
    #[error("project mode is not implemented, pass --file")]
    ProjectMode,
    #[error(transparent)]
    Odef(#[from] OdefError),
}
