//! Lexical scope frames.

use std::sync::Arc;

use jvz_classpath::TypeDecl;
use jvz_parser::NodeIndex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::types::ResolvedType;

#[derive(Clone, Debug)]
pub(crate) struct LocalVar {
    pub declaration: NodeIndex,
    pub ty: ResolvedType,
    pub is_final: bool,
}

#[derive(Clone, Debug)]
pub(crate) enum ScopeKind {
    /// Body of a class, interface, enum, local or anonymous class.
    Class {
        decl: Arc<TypeDecl>,
        /// Static member types and top-level types have no enclosing instance.
        is_static: bool,
    },
    /// Method, constructor or initializer body.
    Method {
        is_static: bool,
        /// `void` for constructors and initializers.
        return_type: ResolvedType,
    },
    Block,
}

#[derive(Clone, Debug)]
pub(crate) struct Scope {
    pub kind: ScopeKind,
    pub locals: FxHashMap<String, LocalVar>,
    /// Type variables declared here, with their erased bound.
    pub type_vars: SmallVec<[(String, ResolvedType); 2]>,
    /// Local classes declared in this block: simple name to the binder's
    /// synthetic name.
    pub local_types: SmallVec<[(String, String); 1]>,
}

impl Scope {
    pub(crate) fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            locals: FxHashMap::default(),
            type_vars: SmallVec::new(),
            local_types: SmallVec::new(),
        }
    }

    pub(crate) fn type_var(&self, name: &str) -> Option<&ResolvedType> {
        self.type_vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bound)| bound)
    }

    pub(crate) fn local_type(&self, name: &str) -> Option<&str> {
        self.local_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, synthetic)| synthetic.as_str())
    }

    pub(crate) fn class_decl(&self) -> Option<&Arc<TypeDecl>> {
        match &self.kind {
            ScopeKind::Class { decl, .. } => Some(decl),
            _ => None,
        }
    }

    /// Whether code directly in this frame has no `this`.
    pub(crate) const fn is_static_frame(&self) -> bool {
        match self.kind {
            ScopeKind::Method { is_static, .. } => is_static,
            ScopeKind::Class { .. } | ScopeKind::Block => false,
        }
    }
}
