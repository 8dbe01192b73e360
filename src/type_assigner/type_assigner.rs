use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::{
    ast::{
        ast::{Arena, ClassId, ProgramId, TypingId, VarDeclId},
        statements::{Access, ClassDef, CompilationUnit},
        types::{typing_to_string, types_equal, Typing, CORE_FUNCTION, ERROR_TYPE},
    },
    errors::errors::{Diagnostic, Diagnostics, ErrorImpl},
    Span,
};

use super::{
    monomorphize::{Cloner, Templater},
    scope::Scopes,
    walk::{walk_expr, walk_vardecl},
};

/// How many generic instantiations may be in progress at once.
pub const MAX_INSTANTIATION_DEPTH: usize = 32;

/// Result of looking up an operator method on a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overload {
    /// Return type of the first overload whose parameters match exactly.
    Found(TypingId),
    /// Methods with that name exist but none takes these argument types.
    NoMatch,
    /// No accessible method with that name.
    Undefined,
}

pub struct TypeAssigner<'a> {
    pub unit: &'a mut CompilationUnit,
    pub diagnostics: &'a mut Diagnostics,
    pub scopes: Scopes,
    pub current_program: Option<ProgramId>,
    namespaces: HashSet<String>,
    /// Qualified name to class, first registrant wins.
    classes: HashMap<String, ClassId>,
    /// Instantiations keyed by the typing node that requested them.
    instances: HashMap<TypingId, ClassId>,
    aliases: HashMap<String, (TypingId, ProgramId)>,
    expanding: HashSet<String>,
    patched: HashSet<TypingId>,
    /// Typings of the instantiations being expanded, innermost last.
    templates: Vec<TypingId>,
}

impl<'a> TypeAssigner<'a> {
    pub fn new(unit: &'a mut CompilationUnit, diagnostics: &'a mut Diagnostics) -> Self {
        TypeAssigner {
            unit,
            diagnostics,
            scopes: Scopes::new(),
            current_program: None,
            namespaces: HashSet::new(),
            classes: HashMap::new(),
            instances: HashMap::new(),
            aliases: HashMap::new(),
            expanding: HashSet::new(),
            patched: HashSet::new(),
            templates: vec![],
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.unit.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.unit.arena
    }

    /// Looks up a registered class by qualified name, e.g. `core::int64`.
    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn run(&mut self) {
        let programs = self.unit.programs.clone();

        self.register_namespaces(&programs);
        self.validate_imports(&programs);
        self.register_classes(&programs);
        debug!(
            "registered {} namespaces, {} aliases and {} classes",
            self.namespaces.len(),
            self.aliases.len(),
            self.classes.len()
        );

        for program in &programs {
            self.current_program = Some(*program);
            for field in self.non_generic_fields(*program) {
                if let Some(typing) = self.arena()[field].typing {
                    self.patch(typing);
                }
            }
        }

        for program in &programs {
            self.assign_program(*program);
        }
        self.current_program = None;
    }

    fn register_namespaces(&mut self, programs: &[ProgramId]) {
        for program in programs {
            let program = &self.unit.arena[*program];
            self.namespaces.insert(program.namespace_name.clone());
        }

        for id in programs {
            let program = &self.unit.arena[*id];
            for (name, typing) in &program.aliases {
                let key = format!("{}::{}", program.namespace_name, name);
                self.aliases.insert(key, (*typing, *id));
            }
        }
    }

    fn validate_imports(&mut self, programs: &[ProgramId]) {
        for program in programs {
            let unknown: Vec<_> = self.arena()[*program]
                .imports
                .iter()
                .filter(|import| !self.namespaces.contains(&import.name))
                .cloned()
                .collect();
            for import in unknown {
                self.error(ErrorImpl::UnknownNamespace { name: import.name }, import.span);
            }
        }
    }

    fn register_classes(&mut self, programs: &[ProgramId]) {
        for program in programs {
            self.current_program = Some(*program);
            let namespace = self.arena()[*program].namespace_name.clone();

            for class in self.arena()[*program].classes.clone() {
                self.arena_mut()[class].program = Some(*program);
                let name = format!("{}::{}", namespace, self.arena()[class].name);

                match self.classes.get(&name).copied() {
                    None => {
                        trace!("registered class {}", name);
                        self.classes.insert(name, class);
                    }
                    Some(first) => {
                        let first_span = self.arena()[first].name_span.clone();
                        let second_span = self.arena()[class].name_span.clone();
                        self.error(ErrorImpl::ConflictingClass { name: name.clone() }, first_span);
                        self.error(ErrorImpl::ConflictingClass { name }, second_span);
                    }
                }
            }
        }
    }

    fn non_generic_classes(&self, program: ProgramId) -> Vec<ClassId> {
        self.arena()[program]
            .classes
            .iter()
            .copied()
            .filter(|class| !self.arena()[*class].is_generic())
            .collect()
    }

    fn non_generic_fields(&self, program: ProgramId) -> Vec<VarDeclId> {
        self.non_generic_classes(program)
            .into_iter()
            .flat_map(|class| self.arena()[class].fields.clone())
            .collect()
    }

    fn assign_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
        let vardecls = self.arena()[program].vardecls.clone();

        // Hoisting frame: every top-level name is visible everywhere in the program
        self.scopes.downscope();
        for vardecl in &vardecls {
            let decl = &self.arena()[*vardecl];
            if let Some(typing) = decl.typing {
                let name = decl.name.clone();
                self.patch(typing);
                self.scopes.declare(&name, typing);
            }
        }

        for class in self.non_generic_classes(program) {
            let self_typing = self.self_typing(class);
            self.scopes.downscope();
            self.scopes.declare("self", self_typing);
            for field in self.arena()[class].fields.clone() {
                if let Some(init) = self.arena()[field].init {
                    walk_expr(self, init);
                }
            }
            self.scopes.upscope();
        }

        // Definition frame: redeclarations here are reported
        self.scopes.downscope();
        for vardecl in vardecls {
            walk_vardecl(self, vardecl);
        }
        self.scopes.upscope();
        self.scopes.upscope();
    }

    /// Typing for `self` inside a non-generic class, already in qualified form.
    fn self_typing(&mut self, class: ClassId) -> TypingId {
        let class = &self.arena()[class];
        let namespace = class
            .program
            .map(|program| self.arena()[program].namespace_name.clone())
            .unwrap_or_default();
        let mut typing = Typing::new(
            &format!("{}::{}", namespace, class.name),
            class.name_span.clone(),
        );
        typing.display_name = class.name.clone();
        let id = self.arena_mut().alloc_typing(typing);
        self.mark_patched(id);
        id
    }

    /// Reports an error, tagged with the instantiation being expanded if any.
    pub fn error(&mut self, error: ErrorImpl, span: Span) {
        let template = self.template_context();
        self.diagnostics
            .push(Diagnostic::error(error, span).with_template(template));
    }

    pub fn warning(&mut self, error: ErrorImpl, span: Span) {
        let template = self.template_context();
        self.diagnostics
            .push(Diagnostic::warning(error, span).with_template(template));
    }

    fn template_context(&self) -> Option<String> {
        self.templates
            .last()
            .map(|typing| typing_to_string(self.arena(), *typing))
    }

    /// A fresh error typing; it never produces further diagnostics.
    pub fn error_typing(&mut self, span: Span) -> TypingId {
        let id = self.arena_mut().alloc_typing(Typing::new(ERROR_TYPE, span));
        self.mark_patched(id);
        id
    }

    /// Marks a typing built from already qualified names so `patch` leaves it alone.
    pub fn mark_patched(&mut self, id: TypingId) {
        self.patched.insert(id);
    }

    pub fn is_error(&self, id: TypingId) -> bool {
        self.arena()[id].is_error()
    }

    /// Names `name` may refer to from the current program, in lookup order.
    fn candidates(&self, name: &str) -> Vec<String> {
        if name.contains("::") {
            return vec![name.to_string()];
        }

        let Some(program) = self.current_program else {
            return vec![name.to_string()];
        };
        let program = &self.arena()[program];
        let mut names = vec![format!("{}::{}", program.namespace_name, name)];
        names.extend(
            program
                .imports
                .iter()
                .map(|import| format!("{}::{}", import.name, name)),
        );
        names
    }

    /// Resolves a typing in place: aliases are expanded, class names qualified.
    ///
    /// Each node is resolved at most once, so shared nodes and repeated
    /// declarations cost nothing after the first visit.
    pub fn patch(&mut self, id: TypingId) {
        if !self.patched.insert(id) || self.is_error(id) {
            return;
        }

        for template in self.arena()[id].templates.clone() {
            self.patch(template);
        }

        let candidates = self.candidates(&self.arena()[id].name);

        for name in &candidates {
            if let Some(&(target, program)) = self.aliases.get(name) {
                self.expand_alias(id, name, target, program);
                return;
            }
        }

        for name in candidates {
            if let Some(&class) = self.classes.get(&name) {
                let count = self.arena()[id].templates.len();
                let class = &self.arena()[class];
                let problem = if class.is_generic() {
                    (!class.accepts_template_count(count)).then_some(ErrorImpl::TemplateCount)
                } else {
                    (count > 0).then_some(ErrorImpl::UnexpectedTemplates)
                };

                if let Some(problem) = problem {
                    let args_span = self.arena()[id].args_span.clone();
                    self.error(problem, args_span);
                }

                self.arena_mut()[id].name = name;
                return;
            }
        }

        let typing = &self.arena()[id];
        let (name, span) = (typing.display_name.clone(), typing.span.clone());
        self.error(ErrorImpl::UnknownType { name }, span);
    }

    fn expand_alias(&mut self, id: TypingId, key: &str, target: TypingId, program: ProgramId) {
        if !self.expanding.insert(key.to_string()) {
            let typing = &self.arena()[id];
            let (name, span) = (typing.display_name.clone(), typing.span.clone());
            self.error(ErrorImpl::RecursiveAlias { name }, span);
            self.arena_mut()[id].name = ERROR_TYPE.to_string();
            return;
        }

        trace!("expanding alias {}", key);
        let saved = self.current_program.replace(program);
        self.patch(target);
        self.current_program = saved;
        self.expanding.remove(key);

        let target = self.arena()[target].clone();
        let typing = &mut self.arena_mut()[id];
        typing.name = target.name;
        typing.templates = target.templates;
        typing.is_alias_expansion = true;
    }

    /// The class a resolved typing names, instantiating generics on demand.
    ///
    /// Generic instances are cached by the requesting typing node, so asking
    /// twice with the same node returns the same class.
    pub fn find_class(&mut self, id: TypingId) -> Option<ClassId> {
        let class = self.classes.get(&self.arena()[id].name).copied()?;
        if !self.arena()[class].is_generic() {
            return Some(class);
        }

        if let Some(&instance) = self.instances.get(&id) {
            trace!("instance cache hit for {}", typing_to_string(self.arena(), id));
            return Some(instance);
        }

        if !self.arena()[class].accepts_template_count(self.arena()[id].templates.len()) {
            return None;
        }

        if self.templates.len() >= MAX_INSTANTIATION_DEPTH {
            let span = self.arena()[id].span.clone();
            self.error(ErrorImpl::InstantiationTooDeep, span);
            return None;
        }

        Some(self.instantiate(class, id))
    }

    fn instantiate(&mut self, generic: ClassId, id: TypingId) -> ClassId {
        let def = self.arena()[generic].clone();
        debug!("instantiating {}", typing_to_string(self.arena(), id));

        let mut cloner = Cloner::new(self.arena_mut());
        let fields: Vec<VarDeclId> = def.fields.iter().map(|f| cloner.clone_vardecl(*f)).collect();
        let instance = self.arena_mut().alloc_class(ClassDef {
            fields: fields.clone(),
            ..def.clone()
        });
        self.instances.insert(id, instance);

        let args = self.arena()[id].templates.clone();
        let fixed = def.generics.len() - usize::from(def.is_variadic);
        let map: HashMap<String, TypingId> = def
            .generics
            .iter()
            .take(fixed)
            .cloned()
            .zip(args.iter().copied())
            .collect();
        let (variadic, rest) = match (def.is_variadic, def.generics.last()) {
            (true, Some(last)) => (Some(last.as_str()), args.get(fixed..).unwrap_or_default().to_vec()),
            _ => (None, vec![]),
        };

        let saved_scopes = std::mem::take(&mut self.scopes);
        let saved_program = std::mem::replace(&mut self.current_program, def.program);
        self.templates.push(id);
        self.scopes.downscope();
        self.scopes.declare("self", id);

        let mut templater = Templater::new(self.arena_mut(), &map, variadic, &rest);
        for field in &fields {
            templater.walk_vardecl(*field);
        }
        let Templater {
            problems,
            substituted,
            ..
        } = templater;
        for (error, span) in problems {
            self.error(error, span);
        }
        self.patched.extend(substituted);

        for field in &fields {
            if let Some(typing) = self.arena()[*field].typing {
                self.patch(typing);
            }
        }
        for field in &fields {
            if let Some(init) = self.arena()[*field].init {
                walk_expr(self, init);
            }
        }

        self.templates.pop();
        self.scopes = saved_scopes;
        self.current_program = saved_program;
        instance
    }

    pub fn is_accessible(&self, class: &ClassDef, access: Access) -> bool {
        access == Access::Public || class.program == self.current_program
    }

    /// Finds `name` among the accessible methods of the class `typing` names and
    /// matches its parameters against `args` by exact structural equality.
    pub fn find_overload(&mut self, name: &str, typing: TypingId, args: &[TypingId]) -> Overload {
        let Some(class) = self.find_class(typing) else {
            return Overload::Undefined;
        };

        let arena = self.arena();
        let class = &arena[class];
        let mut found = false;

        for (field, access) in class.fields_with_access() {
            let decl = &arena[field];
            if decl.name != name || !self.is_accessible(class, access) {
                continue;
            }
            let Some(function) = decl.typing.map(|t| &arena[t]) else {
                continue;
            };
            if function.name != CORE_FUNCTION || function.templates.is_empty() {
                continue;
            }

            found = true;
            let params = &function.templates[1..];
            if params.len() == args.len()
                && params
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| types_equal(arena, *param, *arg))
            {
                return Overload::Found(function.templates[0]);
            }
        }

        if found {
            Overload::NoMatch
        } else {
            Overload::Undefined
        }
    }
}
