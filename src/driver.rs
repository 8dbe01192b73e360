//! File-mode compilation: read sources, parse them into one unit, assign types
//! and hand back everything a target needs.

use std::{
    fmt::Write,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use log::debug;

use crate::{
    ast::{
        ast::{Arena, ExprId, ProgramId, StatId, VarDeclId},
        expressions::ExprKind,
        statements::{Access, CompilationUnit, Program, StatKind},
        types::typing_to_string,
    },
    errors::{
        errors::{Diagnostics, DriverError},
        report::render,
    },
    odef,
    parser::parser::parse,
    stdlib::prelude_source,
    type_assigner::type_assigner::TypeAssigner,
    Source,
};

pub const TARGETS: &[&str] = &["ast"];
pub const SOURCE_EXTENSION: &str = "og";
pub const DEF_EXTENSION: &str = "odef";

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub file: PathBuf,
    /// Directories whose `.og` and `.odef` files join the unit, in order.
    pub includes: Vec<PathBuf>,
    pub target: String,
    pub output: Option<PathBuf>,
}

impl CompileOptions {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        CompileOptions {
            file: file.into(),
            includes: vec![],
            target: String::from("ast"),
            output: None,
        }
    }
}

pub struct CompileResult {
    pub unit: CompilationUnit,
    /// The prelude first, the main file last. Programs loaded from definition
    /// files follow these in `unit.programs` and have no source.
    pub sources: Vec<Source>,
    pub diagnostics: Diagnostics,
}

impl CompileResult {
    pub fn source_text(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|source| source.name.as_str() == name)
            .map(|source| source.text.as_str())
    }

    /// Every diagnostic rendered against the source it points into.
    pub fn render_diagnostics(&self) -> String {
        render_all(&self.diagnostics, &self.sources)
    }

    /// Output of `target` for the parsed programs after the prelude.
    pub fn emit(&self, target: &str) -> Result<String, DriverError> {
        match target {
            "ast" => Ok(self.unit.programs[1..self.sources.len()]
                .iter()
                .map(|program| dump_program(&self.unit.arena, *program))
                .collect()),
            _ => Err(DriverError::UnknownTarget {
                target: target.to_string(),
            }),
        }
    }
}

pub fn render_all(diagnostics: &Diagnostics, sources: &[Source]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| {
            let text = sources
                .iter()
                .find(|source| source.name == *diagnostic.span.file())
                .map_or("", |source| source.text.as_str());
            render(diagnostic, text)
        })
        .collect()
}

pub fn read_source(path: &Path) -> Result<Source, DriverError> {
    let text = fs::read_to_string(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Source::new(&path.to_string_lossy(), text))
}

/// Every `.og` and `.odef` file directly inside `dir`, sorted by path.
pub fn find_sources(dir: &Path) -> Result<Vec<PathBuf>, DriverError> {
    let io_error = |source| DriverError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = vec![];
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && (has_extension(&path, SOURCE_EXTENSION) || has_extension(&path, DEF_EXTENSION)) {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

pub fn compile_file(options: &CompileOptions) -> Result<CompileResult, DriverError> {
    if !TARGETS.contains(&options.target.as_str()) {
        return Err(DriverError::UnknownTarget {
            target: options.target.clone(),
        });
    }

    let mut sources = vec![prelude_source()];
    let mut defs = vec![];
    for dir in &options.includes {
        for path in find_sources(dir)? {
            if has_extension(&path, DEF_EXTENSION) {
                defs.push(path);
            } else {
                sources.push(read_source(&path)?);
            }
        }
    }
    sources.push(read_source(&options.file)?);

    let start = Instant::now();
    let mut unit = CompilationUnit::new();
    let mut diagnostics = Diagnostics::new();
    for source in &sources {
        let program = parse(source, &mut unit.arena, &mut diagnostics);
        unit.programs.push(program);
    }
    for path in &defs {
        let program = load_def(path, &mut unit.arena)?;
        let program = unit.arena.alloc_program(program);
        unit.programs.push(program);
    }
    debug!(
        "parsed {} sources and loaded {} definition files in {:?}",
        sources.len(),
        defs.len(),
        start.elapsed()
    );

    let start = Instant::now();
    TypeAssigner::new(&mut unit, &mut diagnostics).run();
    debug!("assigned types in {:?}", start.elapsed());

    Ok(CompileResult {
        unit,
        sources,
        diagnostics,
    })
}

/// Default definition file path: `<file>.odef`.
pub fn def_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".");
    name.push(DEF_EXTENSION);
    PathBuf::from(name)
}

/// Parses `path` alone and encodes its declarations.
pub fn make_def(path: &Path) -> Result<(Vec<u8>, Source, Diagnostics), DriverError> {
    let source = read_source(path)?;
    let mut arena = Arena::new();
    let mut diagnostics = Diagnostics::new();

    let program = parse(&source, &mut arena, &mut diagnostics);
    let bytes = odef::encode(&arena[program], &arena);
    debug!("encoded {} into {} bytes", source.name, bytes.len());

    Ok((bytes, source, diagnostics))
}

/// Reads a definition file back into `arena`.
pub fn load_def(path: &Path, arena: &mut Arena) -> Result<Program, DriverError> {
    let bytes = fs::read(path).map_err(|source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(odef::decode(&bytes, arena)?)
}

struct Dumper<'a> {
    arena: &'a Arena,
    out: String,
    depth: usize,
}

impl Dumper<'_> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}{}", "  ".repeat(self.depth), text);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn vardecl(&mut self, id: VarDeclId, prefix: &str) {
        let arena = self.arena;
        let decl = &arena[id];
        let text = match decl.typing {
            Some(typing) => format!("{}var {}: {}", prefix, decl.name, typing_to_string(arena, typing)),
            None => format!("{}var {}", prefix, decl.name),
        };
        self.line(&text);

        if let Some(init) = decl.init {
            self.nested(|d| d.expr(init));
        }
    }

    fn stat(&mut self, id: StatId) {
        let arena = self.arena;
        match &arena[id].kind {
            StatKind::Return(value) => {
                self.line("return");
                if let Some(value) = *value {
                    self.nested(|d| d.expr(value));
                }
            }
            StatKind::Block(stats) => {
                self.line("block");
                self.nested(|d| stats.iter().for_each(|stat| d.stat(*stat)));
            }
            StatKind::Expression(expr) => {
                let expr = *expr;
                self.line("expr");
                self.nested(|d| d.expr(expr));
            }
            StatKind::If {
                cond,
                body,
                else_body,
            } => {
                let (cond, body, else_body) = (*cond, *body, *else_body);
                self.line("if");
                self.nested(|d| {
                    d.expr(cond);
                    d.stat(body);
                    if let Some(else_body) = else_body {
                        d.line("else");
                        d.nested(|d| d.stat(else_body));
                    }
                });
            }
            StatKind::VarDecl(decl) => self.vardecl(*decl, ""),
        }
    }

    fn expr(&mut self, id: ExprId) {
        let arena = self.arena;
        let expr = &arena[id];
        let mut text = String::from(expr.kind.label());
        match &expr.kind {
            ExprKind::Unary { op, .. } | ExprKind::Binary { op, .. } => {
                text = format!("{} {}", text, op)
            }
            ExprKind::Member { name, .. } | ExprKind::Variable { name } => {
                text = format!("{} {}", text, name)
            }
            ExprKind::IntLiteral { value } => text = format!("{} {}", text, value),
            _ => {}
        }
        if let Some(typing) = expr.typing {
            text = format!("{} : {}", text, typing_to_string(arena, typing));
        }
        self.line(&text);

        self.nested(|d| match &arena[id].kind {
            ExprKind::Unary { operand, .. } => d.expr(*operand),
            ExprKind::Binary { left, right, .. } => {
                d.expr(*left);
                d.expr(*right);
            }
            ExprKind::Call { callee, args } => {
                d.expr(*callee);
                args.iter().for_each(|arg| d.expr(*arg));
            }
            ExprKind::Subscript { object, index } => {
                d.expr(*object);
                d.expr(*index);
            }
            ExprKind::Member { object, .. } => d.expr(*object),
            ExprKind::Parenthesized(inner) => d.expr(*inner),
            ExprKind::Lambda { params, body, .. } => {
                for param in params {
                    let typing = typing_to_string(arena, param.typing);
                    d.line(&format!("param {}: {}", param.name, typing));
                }
                d.stat(*body);
            }
            ExprKind::Variable { .. } | ExprKind::IntLiteral { .. } | ExprKind::Error => {}
        });
    }
}

/// Indented tree of one program's declarations, with assigned typings.
pub fn dump_program(arena: &Arena, id: ProgramId) -> String {
    let program = &arena[id];
    let mut dumper = Dumper {
        arena,
        out: String::new(),
        depth: 0,
    };

    dumper.line(&format!("program {}", program.namespace_name));
    dumper.nested(|d| {
        for import in &program.imports {
            d.line(&format!("import {}", import.name));
        }
        for (name, typing) in &program.aliases {
            d.line(&format!("alias {} = {}", name, typing_to_string(arena, *typing)));
        }
        for vardecl in &program.vardecls {
            d.vardecl(*vardecl, "");
        }
        for class in &program.classes {
            let class = &arena[*class];
            let mut generics = class.generics.join(", ");
            if class.is_variadic {
                generics.push_str("...");
            }
            let keyword = if class.is_struct { "struct" } else { "class" };
            if generics.is_empty() {
                d.line(&format!("{} {}", keyword, class.name));
            } else {
                d.line(&format!("{} {}<{}>", keyword, class.name, generics));
            }

            d.nested(|d| {
                for (field, access) in class.fields_with_access() {
                    let prefix = match access {
                        Access::Public => "public ",
                        Access::Private => "private ",
                    };
                    d.vardecl(field, prefix);
                }
            });
        }
    });

    dumper.out
}
