//! Binding environment: the frozen classpath index plus the declarations of
//! every unit in the current batch.

use std::path::PathBuf;
use std::sync::Arc;

use jvz_classpath::{ClasspathIndex, DeclOrigin, TypeDecl, declared_type_names, extract_type_decls};
use jvz_parser::{NodeArena, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info_span};

/// One parsed unit of the batch, borrowed for sibling collection.
#[derive(Clone, Copy)]
pub struct SiblingUnit<'a> {
    pub arena: &'a NodeArena,
    pub root: NodeIndex,
    pub path: &'a std::path::Path,
}

/// Declarations of the batch's own units. Siblings shadow the index, so a
/// file being edited wins over a stale copy of itself on a source root.
#[derive(Debug, Default)]
pub struct SiblingDecls {
    types: FxHashMap<String, Arc<TypeDecl>>,
    packages: FxHashSet<String>,
}

impl SiblingDecls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect declarations from `units` in order. Names are gathered first
    /// so signatures may refer to types declared in later units. On a name
    /// collision the first unit wins and binding the later unit reports a
    /// duplicate class.
    #[must_use]
    pub fn collect(units: &[SiblingUnit<'_>], index: &ClasspathIndex) -> Self {
        let _span = info_span!("collect_siblings", units = units.len()).entered();
        let mut names: FxHashSet<String> = FxHashSet::default();
        for unit in units {
            names.extend(declared_type_names(unit.arena, unit.root));
        }
        let exists = |name: &str| names.contains(name) || index.contains_type(name);

        let mut out = SiblingDecls::new();
        for unit in units {
            let origin = DeclOrigin::Source {
                path: PathBuf::from(unit.path),
            };
            for decl in extract_type_decls(unit.arena, unit.root, &origin, &exists) {
                if out.types.contains_key(&decl.name) {
                    debug!(name = %decl.name, path = %unit.path.display(), "duplicate sibling type");
                    continue;
                }
                out.add_package(&decl.package);
                out.types.insert(decl.name.clone(), Arc::new(decl));
            }
        }
        debug!(types = out.types.len(), "siblings collected");
        out
    }

    fn add_package(&mut self, package: &str) {
        let mut prefix = package;
        while !prefix.is_empty() && self.packages.insert(prefix.to_string()) {
            prefix = match prefix.rfind('.') {
                Some(dot) => &prefix[..dot],
                None => "",
            };
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<TypeDecl>> {
        self.types.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Everything a unit is bound against. Shared read-only across threads.
#[derive(Clone, Copy)]
pub struct BindEnv<'a> {
    pub index: &'a ClasspathIndex,
    pub siblings: &'a SiblingDecls,
}

impl<'a> BindEnv<'a> {
    #[must_use]
    pub const fn new(index: &'a ClasspathIndex, siblings: &'a SiblingDecls) -> Self {
        Self { index, siblings }
    }

    #[must_use]
    pub fn contains_type(&self, name: &str) -> bool {
        self.siblings.types.contains_key(name) || self.index.contains_type(name)
    }

    #[must_use]
    pub fn has_package(&self, name: &str) -> bool {
        self.siblings.packages.contains(name) || self.index.has_package(name)
    }

    #[must_use]
    pub fn type_decl(&self, name: &str) -> Option<Arc<TypeDecl>> {
        match self.siblings.get(name) {
            Some(decl) => Some(Arc::clone(decl)),
            None => self.index.type_decl(name),
        }
    }
}
