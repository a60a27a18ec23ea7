use std::collections::HashMap;

use serde::Serialize;

use super::binding::{BindingId, ScopeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    /// Function and method bodies.
    Function,
    Macro,
    /// Closures and lambdas.
    Closure,
    ForLoop,
    MatchArm,
    /// Control-flow bodies and bare blocks.
    Block,
}

/// A live scope on the resolver's stack.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub variable_lookup: HashMap<String, BindingId>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind) -> Self {
        Scope {
            id,
            kind,
            variable_lookup: HashMap::new(),
        }
    }

    /// Later declarations of the same name replace earlier ones.
    pub fn declare(&mut self, name: &str, binding: BindingId) {
        self.variable_lookup.insert(name.to_string(), binding);
    }

    pub fn get_variable(&self, name: &str) -> Option<BindingId> {
        self.variable_lookup.get(name).copied()
    }
}
