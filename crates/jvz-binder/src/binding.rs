//! Binding side table.
//!
//! Bindings are never stored on syntax nodes. Each bound unit gets a
//! `BindingTable` keyed by `NodeIndex`, so the same tree can be bound again
//! (or not at all) without touching the arena.

use jvz_common::Diagnostic;
use jvz_parser::NodeIndex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::types::ResolvedType;

/// What a name or member reference refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SymbolRef {
    /// Local variable, parameter, resource or catch parameter, identified by
    /// its declaring node.
    Local {
        #[serde(skip)]
        declaration: NodeIndex,
        name: String,
    },
    /// Field `index` of `owner`'s declaration.
    Field { owner: String, index: usize },
    /// The `length` pseudo-field of an array.
    ArrayLength,
    Method { owner: String, index: usize },
    Constructor { owner: String, index: usize },
    Type { name: String },
    Package { name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnresolvedReason {
    NotFound,
    Ambiguous,
    NoApplicableMember,
    /// A part of the reference (receiver, qualifier) was already unresolved.
    Poisoned,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Binding {
    /// An expression or type whose type is known.
    Type { ty: ResolvedType },
    Symbol { symbol: SymbolRef, ty: ResolvedType },
    Unresolved { reason: UnresolvedReason },
}

impl Binding {
    #[must_use]
    pub fn ty(&self) -> Option<&ResolvedType> {
        match self {
            Binding::Type { ty } | Binding::Symbol { ty, .. } => Some(ty),
            Binding::Unresolved { .. } => None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&SymbolRef> {
        match self {
            Binding::Symbol { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Binding::Unresolved { .. })
    }
}

/// Per-unit map from node to binding. Absent nodes were never bound.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingTable {
    entries: FxHashMap<NodeIndex, Binding>,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the binding of `node`. A node bound twice keeps the first
    /// binding so re-visiting a subtree cannot change earlier results.
    pub fn insert(&mut self, node: NodeIndex, binding: Binding) {
        if node.is_some() {
            self.entries.entry(node).or_insert(binding);
        }
    }

    #[must_use]
    pub fn get(&self, node: NodeIndex) -> Option<&Binding> {
        self.entries.get(&node)
    }

    #[must_use]
    pub fn type_of(&self, node: NodeIndex) -> Option<&ResolvedType> {
        self.get(node).and_then(Binding::ty)
    }

    #[must_use]
    pub fn symbol_of(&self, node: NodeIndex) -> Option<&SymbolRef> {
        self.get(node).and_then(Binding::symbol)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries.values().filter(|b| b.is_unresolved()).count()
    }

    /// Entries in node order.
    #[must_use]
    pub fn sorted(&self) -> Vec<(NodeIndex, &Binding)> {
        let mut out: Vec<_> = self.entries.iter().map(|(k, v)| (*k, v)).collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }
}

/// Output of binding one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct BindResult {
    pub bindings: BindingTable,
    /// Binder diagnostics in report order.
    pub diagnostics: Vec<Diagnostic>,
}
