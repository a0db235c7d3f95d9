//! Supertype graph: instantiation of declarations, supertype search and
//! member lookup through the hierarchy.

use std::collections::VecDeque;
use std::sync::Arc;

use jvz_classpath::{MethodDecl, TypeDecl, TypeRef};
use jvz_common::limits::MAX_SUPERTYPE_DEPTH;
use jvz_parser::ModifierFlags;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::state::BinderState;
use crate::types::{JAVA_LANG_OBJECT, ResolvedType, display_list};

/// Type variable substitution.
pub(crate) type Subst = FxHashMap<String, ResolvedType>;

/// A member method (or constructor) viewed from a particular receiver type.
#[derive(Clone, Debug)]
pub(crate) struct MethodCandidate {
    pub owner: String,
    pub index: usize,
    pub name: String,
    /// The method's own type parameters with their erased bounds.
    pub type_params: Vec<(String, ResolvedType)>,
    pub params: Vec<ResolvedType>,
    pub return_type: ResolvedType,
    pub is_varargs: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_constructor: bool,
}

impl MethodCandidate {
    /// `name(T1,T2)`, the form used in messages.
    pub(crate) fn signature(&self) -> String {
        format!("{}({})", self.name, display_list(&self.params))
    }

    fn erased_key(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ResolvedType::erased_key).collect();
        params.join(",")
    }
}

#[derive(Clone, Debug)]
pub(crate) enum FieldLookup {
    Found {
        owner: String,
        index: usize,
        ty: ResolvedType,
        is_static: bool,
    },
    /// `complete` is false when part of the hierarchy could not be loaded.
    NotFound { complete: bool },
}

#[derive(Clone, Debug)]
pub(crate) enum SuperSearch {
    Found(ResolvedType),
    NotFound,
    /// The target might be a supertype, but part of the hierarchy is
    /// missing.
    Incomplete,
}

/// One class or interface of a receiver's hierarchy.
pub(crate) struct HierarchyEntry {
    pub decl: Arc<TypeDecl>,
    pub subst: Subst,
}

impl BinderState<'_> {
    /// Substitution for `decl` applied to `args`. Raw uses erase every
    /// parameter to its bound.
    pub(crate) fn instantiate(&self, decl: &TypeDecl, args: &[ResolvedType]) -> Subst {
        let mut subst = Subst::default();
        if decl.type_parameters.is_empty() {
            return subst;
        }
        if args.len() == decl.type_parameters.len() {
            for (param, arg) in decl.type_parameters.iter().zip(args) {
                subst.insert(param.name.clone(), arg.clone());
            }
        } else {
            let empty = Subst::default();
            for param in &decl.type_parameters {
                let bound = self.convert_ref(&param.erasure(), &empty).erasure();
                subst.insert(param.name.clone(), bound);
            }
        }
        subst
    }

    /// Convert a declaration type under `subst`. Unmapped type variables keep
    /// an `Object` bound.
    pub(crate) fn convert_ref(&self, ty: &TypeRef, subst: &Subst) -> ResolvedType {
        match ty {
            TypeRef::Primitive(kind) => ResolvedType::Primitive(*kind),
            TypeRef::Void => ResolvedType::Void,
            TypeRef::Class { name, args } => ResolvedType::Class {
                name: name.clone(),
                args: args.iter().map(|a| self.convert_ref(a, subst)).collect(),
            },
            TypeRef::Array(element) => ResolvedType::array_of(self.convert_ref(element, subst)),
            TypeRef::TypeVar(name) => subst.get(name).cloned().unwrap_or_else(|| {
                ResolvedType::TypeVar {
                    name: name.clone(),
                    bound: Box::new(ResolvedType::object()),
                }
            }),
            TypeRef::Wildcard { bound_kind, bound } => ResolvedType::Wildcard {
                bound_kind: *bound_kind,
                bound: bound
                    .as_deref()
                    .map(|b| Box::new(self.convert_ref(b, subst))),
            },
            TypeRef::Unknown(_) => ResolvedType::Unknown,
        }
    }

    /// Declaration and substitution behind a class type.
    fn entry_for(&self, ty: &ResolvedType) -> Option<(HierarchyEntry, bool)> {
        let ResolvedType::Class { name, args } = ty else {
            return None;
        };
        let decl = self.lookup_decl(name)?;
        let raw = args.is_empty() && !decl.type_parameters.is_empty();
        let subst = self.instantiate(&decl, args);
        Some((HierarchyEntry { decl, subst }, raw))
    }

    fn convert_super(&self, ty: &TypeRef, subst: &Subst, raw: bool) -> ResolvedType {
        let converted = self.convert_ref(ty, subst);
        if raw { converted.erasure() } else { converted }
    }

    /// Direct supertypes of `ty`, or `None` when its declaration is missing.
    pub(crate) fn supertypes_of(&self, ty: &ResolvedType) -> Option<Vec<ResolvedType>> {
        match ty {
            ResolvedType::Class { .. } => {
                let (entry, raw) = self.entry_for(ty)?;
                Some(
                    entry
                        .decl
                        .supertypes()
                        .iter()
                        .map(|s| self.convert_super(s, &entry.subst, raw))
                        .collect(),
                )
            }
            ResolvedType::TypeVar { bound, .. } => Some(vec![bound.as_ref().clone()]),
            ResolvedType::Array(_) => Some(vec![
                ResolvedType::object(),
                ResolvedType::class("java.lang.Cloneable"),
                ResolvedType::class("java.io.Serializable"),
            ]),
            _ => Some(Vec::new()),
        }
    }

    /// `ty` viewed as its supertype named `target`, with arguments
    /// substituted (`ArrayList<String>` as `Iterable` is `Iterable<String>`).
    pub(crate) fn as_super(&self, ty: &ResolvedType, target: &str) -> SuperSearch {
        let mut queue: VecDeque<(ResolvedType, u32)> = VecDeque::new();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut incomplete = false;
        queue.push_back((ty.clone(), 0));
        while let Some((current, depth)) = queue.pop_front() {
            match &current {
                ResolvedType::Class { name, .. } => {
                    if name == target {
                        return SuperSearch::Found(current);
                    }
                    if !visited.insert(name.clone()) {
                        continue;
                    }
                }
                ResolvedType::Unknown => {
                    incomplete = true;
                    continue;
                }
                _ => {}
            }
            if depth >= MAX_SUPERTYPE_DEPTH {
                incomplete = true;
                continue;
            }
            match self.supertypes_of(&current) {
                Some(supers) => queue.extend(supers.into_iter().map(|s| (s, depth + 1))),
                None => incomplete = true,
            }
        }
        if incomplete {
            SuperSearch::Incomplete
        } else {
            SuperSearch::NotFound
        }
    }

    /// The classes and interfaces of `ty`'s hierarchy in member lookup order:
    /// the superclass chain first, then interfaces breadth-first, `Object`
    /// last for interfaces. The flag is false if some supertype is missing.
    pub(crate) fn hierarchy(&self, ty: &ResolvedType) -> (Vec<HierarchyEntry>, bool) {
        let start = match ty {
            ResolvedType::TypeVar { bound, .. } => bound.as_ref().clone(),
            ResolvedType::Array(_) => ResolvedType::object(),
            other => other.clone(),
        };
        let mut out: Vec<HierarchyEntry> = Vec::new();
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut complete = true;
        let mut interfaces: VecDeque<(ResolvedType, u32)> = VecDeque::new();

        let mut current = Some(start);
        let mut depth = 0;
        while let Some(ty) = current.take() {
            if depth >= MAX_SUPERTYPE_DEPTH {
                complete = false;
                break;
            }
            let Some(name) = ty.class_name() else {
                complete &= !ty.is_unknown();
                break;
            };
            if !visited.insert(name.to_string()) {
                break;
            }
            let Some((entry, raw)) = self.entry_for(&ty) else {
                complete = false;
                break;
            };
            current = entry
                .decl
                .superclass
                .as_ref()
                .map(|s| self.convert_super(s, &entry.subst, raw));
            for iface in &entry.decl.interfaces {
                interfaces.push_back((self.convert_super(iface, &entry.subst, raw), depth + 1));
            }
            out.push(entry);
            depth += 1;
        }

        while let Some((ty, depth)) = interfaces.pop_front() {
            if depth >= MAX_SUPERTYPE_DEPTH {
                complete = false;
                continue;
            }
            let Some(name) = ty.class_name() else {
                complete &= !ty.is_unknown();
                continue;
            };
            if !visited.insert(name.to_string()) {
                continue;
            }
            let Some((entry, raw)) = self.entry_for(&ty) else {
                complete = false;
                continue;
            };
            for iface in &entry.decl.interfaces {
                interfaces.push_back((self.convert_super(iface, &entry.subst, raw), depth + 1));
            }
            out.push(entry);
        }

        if !visited.contains(JAVA_LANG_OBJECT) {
            match self.entry_for(&ResolvedType::object()) {
                Some((entry, _)) => out.push(entry),
                None => complete = false,
            }
        }
        (out, complete)
    }

    pub(crate) fn find_field(&self, ty: &ResolvedType, name: &str) -> FieldLookup {
        let (entries, complete) = self.hierarchy(ty);
        for entry in entries {
            if let Some((index, field)) = entry.decl.fields_named(name).next() {
                return FieldLookup::Found {
                    owner: entry.decl.name.clone(),
                    index,
                    ty: self.convert_ref(&field.ty, &entry.subst).capture_upper(),
                    is_static: field.is_static(),
                };
            }
        }
        FieldLookup::NotFound { complete }
    }

    /// Methods named `name` visible on `ty`. Overridden methods appear once,
    /// as their most derived declaration.
    pub(crate) fn collect_methods(&self, ty: &ResolvedType, name: &str) -> (Vec<MethodCandidate>, bool) {
        let (entries, complete) = self.hierarchy(ty);
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut out = Vec::new();
        for entry in &entries {
            for (index, method) in entry.decl.methods_named(name) {
                let candidate = self.method_candidate(&entry.decl, index, method, &entry.subst);
                if seen.insert(candidate.erased_key()) {
                    out.push(candidate);
                }
            }
        }
        if let ResolvedType::Array(_) = ty
            && name == "clone"
        {
            for candidate in &mut out {
                candidate.return_type = ty.clone();
            }
        }
        (out, complete)
    }

    /// Constructors of the class type `ty`. With `diamond` the class's type
    /// arguments are left unknown.
    pub(crate) fn constructors_of(&self, ty: &ResolvedType, diamond: bool) -> Option<Vec<MethodCandidate>> {
        let ResolvedType::Class { name, args } = ty else {
            return None;
        };
        let decl = self.lookup_decl(name)?;
        let subst = if diamond {
            decl.type_parameters
                .iter()
                .map(|p| (p.name.clone(), ResolvedType::Unknown))
                .collect()
        } else {
            self.instantiate(&decl, args)
        };
        Some(
            decl.constructors()
                .map(|(index, method)| self.method_candidate(&decl, index, method, &subst))
                .collect(),
        )
    }

    fn method_candidate(
        &self,
        decl: &TypeDecl,
        index: usize,
        method: &MethodDecl,
        subst: &Subst,
    ) -> MethodCandidate {
        let mut subst = subst.clone();
        let mut type_params = Vec::with_capacity(method.type_parameters.len());
        for param in &method.type_parameters {
            let bound = self.convert_ref(&param.erasure(), &subst).erasure();
            subst.insert(
                param.name.clone(),
                ResolvedType::TypeVar {
                    name: param.name.clone(),
                    bound: Box::new(bound.clone()),
                },
            );
            type_params.push((param.name.clone(), bound));
        }
        let params = method
            .parameters
            .iter()
            .map(|p| match self.convert_ref(p, &subst) {
                // A parameter typed by a wildcard accepts nothing we can check.
                ResolvedType::Wildcard { .. } => ResolvedType::Unknown,
                other => other,
            })
            .collect();
        MethodCandidate {
            owner: decl.name.clone(),
            index,
            name: method.name.clone(),
            type_params,
            params,
            return_type: self.convert_ref(&method.return_type, &subst).capture_upper(),
            is_varargs: method.is_varargs,
            is_static: method.is_static(),
            is_abstract: method.modifiers.contains(ModifierFlags::ABSTRACT),
            is_constructor: method.is_constructor,
        }
    }

    /// Canonical name of the member type `simple` of `owner`, inherited
    /// member types included.
    pub(crate) fn find_member_type(&self, owner: &str, simple: &str) -> Option<String> {
        let (entries, _) = self.hierarchy(&ResolvedType::class(owner));
        for entry in entries {
            if let Some(found) = entry
                .decl
                .member_types
                .iter()
                .find(|m| jvz_classpath::decl::simple_name(m) == simple)
            {
                return Some(found.clone());
            }
            let nested = format!("{}.{simple}", entry.decl.name);
            if self.type_exists(&nested) {
                return Some(nested);
            }
        }
        None
    }
}
