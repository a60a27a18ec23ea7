use std::collections::HashMap;

use serde::Serialize;

use crate::{ast::ast::NodeId, errors::errors::Error, Position, Span};

use super::scope::ScopeKind;

/// Index into [`BindingTable::bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BindingId(pub u32);

/// Index into [`BindingTable::scopes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
    Macro,
    Alias,
    Object,
    Enum,
    Import,
}

/// A definition site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub id: BindingId,
    pub name: String,
    pub kind: BindingKind,
    /// The defining identifier.
    pub node: NodeId,
    pub span: Span,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Variable,
    Symbol,
    Command,
    Decorator,
    TypeName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "binding")]
pub enum Resolution {
    Resolved(BindingId),
    /// Not defined in the script but part of the built-in vocabulary.
    Builtin,
    /// A command expected on the search path.
    External,
    Unresolved,
}

impl Resolution {
    pub fn binding(&self) -> Option<BindingId> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            _ => None,
        }
    }
}

/// A use site and what it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub node: NodeId,
    pub name: String,
    pub kind: ReferenceKind,
    pub span: Span,
    pub scope: ScopeId,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeRecord {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// Lexically enclosing scope, `None` for the module scope.
    pub parent: Option<ScopeId>,
    pub span: Span,
}

/// Flat result of scope resolution. References point at bindings by id,
/// never by pointer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingTable {
    pub bindings: Vec<Binding>,
    pub references: Vec<Reference>,
    pub scopes: Vec<ScopeRecord>,
    /// Unresolved-reference warnings, in traversal order.
    pub diagnostics: Vec<Error>,
    #[serde(skip)]
    references_by_span: HashMap<Span, usize>,
    #[serde(skip)]
    references_by_node: HashMap<NodeId, usize>,
    #[serde(skip)]
    bindings_by_node: HashMap<NodeId, BindingId>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeRecord {
            id,
            kind,
            parent,
            span,
        });
        id
    }

    pub(crate) fn add_binding(
        &mut self,
        name: &str,
        kind: BindingKind,
        node: NodeId,
        span: Span,
        scope: ScopeId,
    ) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding {
            id,
            name: name.to_string(),
            kind,
            node,
            span,
            scope,
        });
        self.bindings_by_node.insert(node, id);
        id
    }

    pub(crate) fn add_reference(&mut self, reference: Reference) {
        let index = self.references.len();
        self.references_by_span.insert(reference.span, index);
        self.references_by_node.insert(reference.node, index);
        self.references.push(reference);
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0 as usize)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ScopeRecord> {
        self.scopes.get(id.0 as usize)
    }

    pub fn module_scope(&self) -> Option<&ScopeRecord> {
        self.scopes.first()
    }

    /// The reference whose name occupies exactly `span`.
    pub fn reference_at(&self, span: &Span) -> Option<&Reference> {
        self.references_by_span
            .get(span)
            .and_then(|index| self.references.get(*index))
    }

    /// The reference whose name covers `position`, for cursor lookups.
    pub fn reference_at_position(&self, position: Position) -> Option<&Reference> {
        self.references
            .iter()
            .find(|reference| reference.span.start <= position && position < reference.span.end)
    }

    pub fn reference_for_node(&self, node: NodeId) -> Option<&Reference> {
        self.references_by_node
            .get(&node)
            .and_then(|index| self.references.get(*index))
    }

    /// Go-to-definition: the binding a reference at `span` resolved to.
    pub fn definition_at(&self, span: &Span) -> Option<&Binding> {
        self.reference_at(span)
            .and_then(|reference| reference.resolution.binding())
            .and_then(|id| self.binding(id))
    }

    /// The binding introduced by a defining identifier.
    pub fn binding_for_node(&self, node: NodeId) -> Option<&Binding> {
        self.bindings_by_node
            .get(&node)
            .and_then(|id| self.binding(*id))
    }

    /// Every use of `binding`, in traversal order.
    pub fn references_to(&self, binding: BindingId) -> impl Iterator<Item = &Reference> + '_ {
        self.references
            .iter()
            .filter(move |reference| reference.resolution == Resolution::Resolved(binding))
    }

    pub fn bindings_in(&self, scope: ScopeId) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings
            .iter()
            .filter(move |binding| binding.scope == scope)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.references
            .iter()
            .filter(|reference| reference.resolution == Resolution::Unresolved)
    }
}
