//! Package and import processing, and simple type name lookup.

use indexmap::IndexMap;
use jvz_classpath::decl::simple_name;
use jvz_common::diagnostic_codes;
use jvz_parser::{NodeData, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::binding::{Binding, SymbolRef};
use crate::state::BinderState;
use crate::types::ResolvedType;

const JAVA_LANG: &str = "java.lang";

#[derive(Clone, Debug)]
pub(crate) struct SingleImport {
    pub canonical: String,
    pub node: NodeIndex,
    pub used: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct StaticImport {
    pub owner: String,
    /// `None` for `import static a.B.*;`.
    pub member: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ImportTable {
    pub package: String,
    /// Single-type imports by simple name. The first import of a simple name
    /// wins.
    pub single: IndexMap<String, SingleImport>,
    /// On-demand prefixes: packages or types.
    pub on_demand: Vec<String>,
    pub statics: Vec<StaticImport>,
    /// Top-level types of the unit by simple name.
    pub top_level: FxHashMap<String, String>,
}

/// Outcome of looking up a simple type name.
#[derive(Clone, Debug)]
pub(crate) enum TypeLookup {
    Found(ResolvedType),
    Ambiguous(String, String),
    NotFound,
}

pub(crate) fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

impl BinderState<'_> {
    pub(crate) fn bind_package_and_imports(
        &mut self,
        package: NodeIndex,
        imports: &[NodeIndex],
        types: &[NodeIndex],
    ) {
        if let Some(NodeData::PackageDeclaration { name, .. }) = self.arena.data(package) {
            let name = *name;
            if let Some(dotted) = self.arena.dotted_name(name) {
                self.record(
                    name,
                    Binding::Symbol {
                        symbol: SymbolRef::Package {
                            name: dotted.clone(),
                        },
                        ty: ResolvedType::Unknown,
                    },
                );
                self.imports.package = dotted;
            }
        }

        for &idx in types {
            if let Some(decl) = self.arena.get_type_declaration(idx)
                && let Some(simple) = self.arena.identifier_text(decl.name)
            {
                let canonical = qualify(&self.imports.package, simple);
                self.imports
                    .top_level
                    .entry(simple.to_string())
                    .or_insert(canonical);
            }
        }

        let mut seen: FxHashSet<(String, bool, bool)> = FxHashSet::default();
        for &idx in imports {
            let Some(&NodeData::ImportDeclaration {
                name,
                is_static,
                on_demand,
            }) = self.arena.data(idx)
            else {
                continue;
            };
            let Some(dotted) = self.arena.dotted_name(name) else {
                continue;
            };
            if !seen.insert((dotted.clone(), is_static, on_demand)) {
                let shown = display_import(&dotted, is_static, on_demand);
                self.error_at(idx, diagnostic_codes::DUPLICATE_IMPORT, &[&shown]);
                continue;
            }
            match (is_static, on_demand) {
                (false, false) => self.bind_single_type_import(idx, name, dotted),
                (false, true) => self.bind_on_demand_import(name, dotted),
                (true, _) => self.bind_static_import(name, dotted, on_demand),
            }
        }
    }

    fn bind_single_type_import(&mut self, import: NodeIndex, name: NodeIndex, dotted: String) {
        if !self.type_exists(&dotted) {
            self.error_at(name, diagnostic_codes::CANNOT_RESOLVE_IMPORT, &[&dotted]);
            return;
        }
        self.record(
            name,
            Binding::Symbol {
                symbol: SymbolRef::Type {
                    name: dotted.clone(),
                },
                ty: ResolvedType::class(dotted.clone()),
            },
        );
        let simple = simple_name(&dotted).to_string();
        self.imports.single.entry(simple).or_insert(SingleImport {
            canonical: dotted,
            node: import,
            used: false,
        });
    }

    fn bind_on_demand_import(&mut self, name: NodeIndex, dotted: String) {
        if self.type_exists(&dotted) {
            self.record(
                name,
                Binding::Symbol {
                    symbol: SymbolRef::Type {
                        name: dotted.clone(),
                    },
                    ty: ResolvedType::class(dotted.clone()),
                },
            );
        } else if self.package_exists(&dotted) {
            self.record(
                name,
                Binding::Symbol {
                    symbol: SymbolRef::Package {
                        name: dotted.clone(),
                    },
                    ty: ResolvedType::Unknown,
                },
            );
        } else {
            self.error_at(name, diagnostic_codes::PACKAGE_DOES_NOT_EXIST, &[&dotted]);
            return;
        }
        if !self.imports.on_demand.contains(&dotted) {
            self.imports.on_demand.push(dotted);
        }
    }

    fn bind_static_import(&mut self, name: NodeIndex, dotted: String, on_demand: bool) {
        let (owner, member) = if on_demand {
            (dotted.clone(), None)
        } else {
            match dotted.rsplit_once('.') {
                Some((owner, member)) => (owner.to_string(), Some(member.to_string())),
                None => (dotted.clone(), None),
            }
        };
        if !self.type_exists(&owner) {
            self.error_at(name, diagnostic_codes::CANNOT_RESOLVE_IMPORT, &[&dotted]);
            return;
        }
        if let Some(member) = &member {
            let owner_ty = ResolvedType::class(owner.clone());
            let has_field = matches!(
                self.find_field(&owner_ty, member),
                crate::state_hierarchy::FieldLookup::Found { is_static: true, .. }
            );
            let (methods, complete) = self.collect_methods(&owner_ty, member);
            let has_method = methods.iter().any(|m| m.is_static);
            let has_type = self.find_member_type(&owner, member).is_some();
            if !has_field && !has_method && !has_type && complete {
                self.error_at(name, diagnostic_codes::CANNOT_RESOLVE_IMPORT, &[&dotted]);
                return;
            }
        }
        self.imports.statics.push(StaticImport { owner, member });
    }

    /// Warn about single-type imports never used by a type reference.
    pub(crate) fn report_unused_imports(&mut self) {
        let unused: Vec<(NodeIndex, String)> = self
            .imports
            .single
            .values()
            .filter(|import| !import.used)
            .map(|import| (import.node, import.canonical.clone()))
            .collect();
        for (node, canonical) in unused {
            self.error_at(node, diagnostic_codes::UNUSED_IMPORT, &[&canonical]);
        }
    }

    /// Owners of statically imported members named `member`, single imports
    /// first.
    pub(crate) fn static_import_owners(&self, member: &str) -> Vec<String> {
        let mut owners: Vec<String> = self
            .imports
            .statics
            .iter()
            .filter(|s| s.member.as_deref() == Some(member))
            .map(|s| s.owner.clone())
            .collect();
        for import in &self.imports.statics {
            if import.member.is_none() && !owners.contains(&import.owner) {
                owners.push(import.owner.clone());
            }
        }
        owners
    }

    // =========================================================================
    // Simple type names
    // =========================================================================

    /// Resolve a simple type name at the current position: type variables,
    /// local classes and member types of enclosing classes, then the unit's
    /// top-level types, single-type imports, the current package, and finally
    /// on-demand imports together with `java.lang`.
    pub(crate) fn lookup_simple_type(&mut self, name: &str) -> TypeLookup {
        if let Some(found) = self.lookup_type_in_scopes(name) {
            return TypeLookup::Found(found);
        }
        if let Some(found) = self.imports.top_level.get(name) {
            return TypeLookup::Found(ResolvedType::class(found.clone()));
        }
        if let Some(import) = self.imports.single.get_mut(name) {
            import.used = true;
            return TypeLookup::Found(ResolvedType::class(import.canonical.clone()));
        }
        let same_package = qualify(&self.imports.package, name);
        if self.type_exists(&same_package) {
            return TypeLookup::Found(ResolvedType::class(same_package));
        }

        let mut candidates: Vec<String> = Vec::new();
        let prefixes = self
            .imports
            .on_demand
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(JAVA_LANG));
        for prefix in prefixes {
            let candidate = qualify(prefix, name);
            if !candidates.contains(&candidate) && self.type_exists(&candidate) {
                candidates.push(candidate);
            }
        }
        trace!(name, candidates = candidates.len(), "on-demand lookup");
        match candidates.len() {
            0 => TypeLookup::NotFound,
            1 => TypeLookup::Found(ResolvedType::class(candidates.remove(0))),
            _ => TypeLookup::Ambiguous(candidates[0].clone(), candidates[1].clone()),
        }
    }

    fn lookup_type_in_scopes(&self, name: &str) -> Option<ResolvedType> {
        for scope in self.scopes_inner_to_outer() {
            if let Some(bound) = scope.type_var(name) {
                return Some(ResolvedType::TypeVar {
                    name: name.to_string(),
                    bound: Box::new(bound.clone()),
                });
            }
            if let Some(synthetic) = scope.local_type(name) {
                return Some(ResolvedType::class(synthetic));
            }
            if let Some(decl) = scope.class_decl() {
                if decl.simple_name() == name {
                    return Some(ResolvedType::class(decl.name.clone()));
                }
                if let Some(member) = self.find_member_type(&decl.name, name) {
                    return Some(ResolvedType::class(member));
                }
            }
        }
        None
    }
}

fn display_import(dotted: &str, is_static: bool, on_demand: bool) -> String {
    let mut out = String::new();
    if is_static {
        out.push_str("static ");
    }
    out.push_str(dotted);
    if on_demand {
        out.push_str(".*");
    }
    out
}
