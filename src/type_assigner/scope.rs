use std::collections::HashMap;

use crate::ast::ast::TypingId;

/// One lexical frame: a block, a lambda, or a program level.
#[derive(Debug, Default)]
pub struct Environment {
    pub variable_lookup: HashMap<String, TypingId>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn declare_variable(&mut self, name: &str, typing: TypingId) {
        self.variable_lookup.insert(name.to_string(), typing);
    }

    pub fn get_variable(&self, name: &str) -> Option<TypingId> {
        self.variable_lookup.get(name).copied()
    }
}

/// Stack of environments. Lookups walk outward, declarations only touch the innermost frame.
#[derive(Debug)]
pub struct Scopes {
    environments: Vec<Environment>,
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            environments: vec![Environment::new()],
        }
    }

    pub fn downscope(&mut self) {
        self.environments.push(Environment::new());
    }

    /// Pops the innermost frame. The root frame is never popped.
    pub fn upscope(&mut self) {
        if self.environments.len() > 1 {
            self.environments.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.environments.len()
    }

    pub fn declare(&mut self, name: &str, typing: TypingId) {
        if let Some(environment) = self.environments.last_mut() {
            environment.declare_variable(name, typing);
        }
    }

    pub fn get(&self, name: &str) -> Option<TypingId> {
        self.environments
            .iter()
            .rev()
            .find_map(|environment| environment.get_variable(name))
    }

    /// Whether `name` is declared in the innermost frame.
    pub fn has_local(&self, name: &str) -> bool {
        self.environments
            .last()
            .is_some_and(|environment| environment.variable_lookup.contains_key(name))
    }
}
