//! Name and type binding for the jvz Java front end.
//!
//! The binder walks one parsed compilation unit and resolves every name it
//! meets: local variables, fields, methods and constructors (with overload
//! selection), types and packages. Results are a `BindingTable` keyed by
//! `NodeIndex` plus diagnostics for unresolved references, ambiguities and
//! type mismatches. The syntax tree and the classpath index are never
//! mutated, so binding the same unit twice yields the same result.

pub mod binding;
pub mod env;
mod scope;
pub mod state;
mod state_declarations;
mod state_expressions;
mod state_hierarchy;
mod state_imports;
mod state_overload;
mod state_relations;
mod state_statements;
mod state_types;
pub mod types;

pub use binding::{BindResult, Binding, BindingTable, SymbolRef, UnresolvedReason};
pub use env::{BindEnv, SiblingDecls, SiblingUnit};
pub use state::BinderState;
pub use types::ResolvedType;

use jvz_parser::{NodeArena, NodeIndex};

/// Bind the compilation unit rooted at `root`.
#[must_use]
pub fn bind(arena: &NodeArena, root: NodeIndex, file_name: &str, env: BindEnv<'_>) -> BindResult {
    let mut state = BinderState::new(arena, root, file_name, env);
    state.bind_unit(root);
    state.into_result()
}

#[cfg(test)]
#[path = "../tests/test_support.rs"]
mod test_support;
#[cfg(test)]
#[path = "../tests/resolution_tests.rs"]
mod resolution_tests;
#[cfg(test)]
#[path = "../tests/import_tests.rs"]
mod import_tests;
#[cfg(test)]
#[path = "../tests/overload_tests.rs"]
mod overload_tests;
#[cfg(test)]
#[path = "../tests/type_check_tests.rs"]
mod type_check_tests;
