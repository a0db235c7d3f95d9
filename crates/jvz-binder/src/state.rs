//! Binder state: one instance per compilation unit.
//!
//! `BinderState` walks a parsed unit once, resolving every name and type it
//! meets against the scope chain, the unit's imports and the `BindEnv`.
//! Results go to a `BindingTable` side table and a diagnostics list; the
//! arena and the environment are only read.
//!
//! The implementation is split across `state_*.rs` files by concern:
//! imports and type names, the supertype graph, type relations, overload
//! selection, declarations, statements and expressions.

use std::path::PathBuf;
use std::sync::Arc;

use jvz_classpath::{DeclOrigin, ImportContext, TypeDecl, declared_type_names, extract_type_decls};
use jvz_common::Diagnostic;
use jvz_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use jvz_parser::{NodeArena, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info_span};

use crate::binding::{BindResult, Binding, BindingTable, UnresolvedReason};
use crate::env::BindEnv;
use crate::scope::{LocalVar, Scope, ScopeKind};
use crate::state_imports::ImportTable;
use crate::types::ResolvedType;

pub struct BinderState<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) file_name: &'a str,
    pub(crate) env: BindEnv<'a>,
    pub(crate) origin: DeclOrigin,
    pub(crate) imports: ImportTable,
    /// Import context used to extract local and anonymous class declarations.
    pub(crate) import_context: ImportContext,
    /// Declarations of this unit's own types.
    pub(crate) unit_decls: FxHashMap<String, Arc<TypeDecl>>,
    /// Local and anonymous classes, keyed by their synthetic names.
    pub(crate) local_decls: FxHashMap<String, Arc<TypeDecl>>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) bindings: BindingTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) synthetic_counter: u32,
}

impl<'a> BinderState<'a> {
    #[must_use]
    pub fn new(arena: &'a NodeArena, root: NodeIndex, file_name: &'a str, env: BindEnv<'a>) -> Self {
        let origin = DeclOrigin::Source {
            path: PathBuf::from(file_name),
        };
        let own_names: FxHashSet<String> = declared_type_names(arena, root).into_iter().collect();
        let exists = |name: &str| own_names.contains(name) || env.contains_type(name);
        let unit_decls = extract_type_decls(arena, root, &origin, &exists)
            .into_iter()
            .map(|decl| (decl.name.clone(), Arc::new(decl)))
            .collect();
        Self {
            arena,
            file_name,
            env,
            origin,
            imports: ImportTable::default(),
            import_context: ImportContext::from_unit(arena, root),
            unit_decls,
            local_decls: FxHashMap::default(),
            scopes: Vec::new(),
            bindings: BindingTable::new(),
            diagnostics: Vec::new(),
            synthetic_counter: 0,
        }
    }

    /// Bind the whole unit rooted at `root`.
    pub fn bind_unit(&mut self, root: NodeIndex) {
        let _span = info_span!("bind", file = %self.file_name).entered();
        let Some(unit) = self.arena.get_compilation_unit(root) else {
            return;
        };
        self.bind_package_and_imports(unit.package, &unit.imports.nodes, &unit.types.nodes);
        for idx in unit.types.iter() {
            self.bind_top_level_type(idx);
        }
        self.report_unused_imports();
        debug!(
            bindings = self.bindings.len(),
            diagnostics = self.diagnostics.len(),
            "unit bound"
        );
    }

    #[must_use]
    pub fn into_result(self) -> BindResult {
        BindResult {
            bindings: self.bindings,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Diagnostics and bindings
    // =========================================================================

    /// Report `code` on the span of `node`.
    pub(crate) fn error_at(&mut self, node: NodeIndex, code: u32, args: &[&str]) {
        let (start, length) = self
            .arena
            .get(node)
            .map_or((0, 0), |n| (n.pos, n.len()));
        debug!(code, start, "binder diagnostic");
        self.diagnostics
            .push(Diagnostic::from_code(self.file_name, start, length, code, args));
    }

    pub(crate) fn record(&mut self, node: NodeIndex, binding: Binding) {
        self.bindings.insert(node, binding);
    }

    pub(crate) fn record_type(&mut self, node: NodeIndex, ty: &ResolvedType) {
        self.record(node, Binding::Type { ty: ty.clone() });
    }

    pub(crate) fn record_unresolved(&mut self, node: NodeIndex, reason: UnresolvedReason) {
        self.record(node, Binding::Unresolved { reason });
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declaration of `name`: local classes, this unit, then the environment.
    pub(crate) fn lookup_decl(&self, name: &str) -> Option<Arc<TypeDecl>> {
        if let Some(decl) = self.local_decls.get(name) {
            return Some(Arc::clone(decl));
        }
        if let Some(decl) = self.unit_decls.get(name) {
            return Some(Arc::clone(decl));
        }
        self.env.type_decl(name)
    }

    pub(crate) fn type_exists(&self, name: &str) -> bool {
        self.local_decls.contains_key(name)
            || self.unit_decls.contains_key(name)
            || self.env.contains_type(name)
    }

    pub(crate) fn package_exists(&self, name: &str) -> bool {
        self.env.has_package(name)
            || self.imports.package == name
            || self.imports.package.starts_with(&format!("{name}."))
    }

    pub(crate) fn next_synthetic_id(&mut self) -> u32 {
        self.synthetic_counter += 1;
        self.synthetic_counter
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub(crate) fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare_local(&mut self, name: &str, var: LocalVar) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.locals.insert(name.to_string(), var);
        }
    }

    pub(crate) fn declare_type_var(&mut self, name: &str, bound: ResolvedType) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(slot) = scope.type_vars.iter_mut().find(|(n, _)| n == name) {
                slot.1 = bound;
            } else {
                scope.type_vars.push((name.to_string(), bound));
            }
        }
    }

    /// Scope frames from innermost outwards, capped at the scope walk limit.
    pub(crate) fn scopes_inner_to_outer(&self) -> impl Iterator<Item = &Scope> {
        self.scopes
            .iter()
            .rev()
            .take(MAX_SCOPE_WALK_ITERATIONS as usize)
    }

    /// Innermost enclosing class declaration.
    pub(crate) fn current_class(&self) -> Option<Arc<TypeDecl>> {
        self.scopes_inner_to_outer()
            .find_map(|s| s.class_decl().cloned())
    }

    /// Return type of the innermost method frame.
    pub(crate) fn current_return_type(&self) -> Option<ResolvedType> {
        self.scopes_inner_to_outer().find_map(|s| match &s.kind {
            ScopeKind::Method { return_type, .. } => Some(return_type.clone()),
            _ => None,
        })
    }

    /// Whether the innermost class has no `this` at the current position.
    pub(crate) fn in_static_context(&self) -> bool {
        for scope in self.scopes_inner_to_outer() {
            if scope.is_static_frame() {
                return true;
            }
            if scope.class_decl().is_some() {
                return false;
            }
        }
        false
    }
}
