//! Overload resolution: applicability by phase, type argument inference
//! and most-specific selection.

use tracing::trace;

use crate::state::BinderState;
use crate::state_hierarchy::{MethodCandidate, Subst, SuperSearch};
use crate::state_relations::Phase;
use crate::types::{ResolvedType, boxed};

#[derive(Clone, Debug)]
pub(crate) enum Selection {
    /// The chosen candidate with its method type arguments applied.
    Selected(MethodCandidate),
    NoneApplicable,
    Ambiguous(MethodCandidate, MethodCandidate),
}

impl BinderState<'_> {
    /// Pick the method `args` select among `candidates`, trying the strict,
    /// loose and variable-arity phases in turn.
    pub(crate) fn select_overload(
        &self,
        candidates: &[MethodCandidate],
        args: &[ResolvedType],
        explicit_type_args: &[ResolvedType],
    ) -> Selection {
        for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
            let applicable: Vec<MethodCandidate> = candidates
                .iter()
                .filter_map(|c| self.applicable(c, args, explicit_type_args, phase))
                .collect();
            trace!(?phase, applicable = applicable.len(), "overload phase");
            if !applicable.is_empty() {
                return self.most_specific(applicable, phase, args.len());
            }
        }
        Selection::NoneApplicable
    }

    /// The candidate instantiated for `args` if it is applicable in `phase`.
    fn applicable(
        &self,
        candidate: &MethodCandidate,
        args: &[ResolvedType],
        explicit_type_args: &[ResolvedType],
        phase: Phase,
    ) -> Option<MethodCandidate> {
        let arity = candidate.params.len();
        match phase {
            Phase::Strict | Phase::Loose => {
                if arity != args.len() {
                    return None;
                }
            }
            Phase::Varargs => {
                if !candidate.is_varargs || args.len() + 1 < arity {
                    return None;
                }
            }
        }

        let instantiated = if candidate.type_params.is_empty() {
            candidate.clone()
        } else {
            let subst = if explicit_type_args.len() == candidate.type_params.len() {
                candidate
                    .type_params
                    .iter()
                    .map(|(name, _)| name.clone())
                    .zip(explicit_type_args.iter().cloned())
                    .collect()
            } else {
                self.infer(candidate, args, phase)
            };
            apply_method_subst(candidate, &subst)
        };

        let conversion = if phase == Phase::Strict {
            Phase::Strict
        } else {
            Phase::Loose
        };
        let ok = args.iter().enumerate().all(|(i, arg)| {
            let param = parameter_for(&instantiated, i, phase);
            self.is_convertible(arg, &param, conversion)
        });
        ok.then_some(instantiated)
    }

    /// Infer method type arguments from argument types. The first
    /// constraint found for a variable wins; variables with no constraint
    /// stay unknown.
    fn infer(&self, candidate: &MethodCandidate, args: &[ResolvedType], phase: Phase) -> Subst {
        let vars: Vec<&str> = candidate.type_params.iter().map(|(n, _)| n.as_str()).collect();
        let mut out = Subst::default();
        for (i, arg) in args.iter().enumerate() {
            let param = parameter_for(candidate, i, phase);
            self.unify(&param, arg, &vars, &mut out);
        }
        for (name, _) in &candidate.type_params {
            out.entry(name.clone()).or_insert(ResolvedType::Unknown);
        }
        out
    }

    fn unify(&self, param: &ResolvedType, arg: &ResolvedType, vars: &[&str], out: &mut Subst) {
        match param {
            ResolvedType::TypeVar { name, .. } if vars.contains(&name.as_str()) => {
                let inferred = match arg {
                    ResolvedType::Null | ResolvedType::Unknown | ResolvedType::Void => return,
                    ResolvedType::Primitive(kind) => boxed(*kind),
                    other => other.capture_upper(),
                };
                out.entry(name.clone()).or_insert(inferred);
            }
            ResolvedType::Array(element) => {
                if let ResolvedType::Array(arg_element) = arg {
                    self.unify(element, arg_element, vars, out);
                }
            }
            ResolvedType::Class { name, args } if !args.is_empty() => {
                if let SuperSearch::Found(ResolvedType::Class {
                    args: arg_args, ..
                }) = self.as_super(arg, name)
                    && arg_args.len() == args.len()
                {
                    for (p, a) in args.iter().zip(&arg_args) {
                        self.unify(p, &a.capture_upper(), vars, out);
                    }
                }
            }
            ResolvedType::Wildcard {
                bound: Some(bound), ..
            } => self.unify(bound, arg, vars, out),
            _ => {}
        }
    }

    fn most_specific(&self, applicable: Vec<MethodCandidate>, phase: Phase, arg_count: usize) -> Selection {
        if applicable.len() == 1 {
            return applicable
                .into_iter()
                .next()
                .map_or(Selection::NoneApplicable, Selection::Selected);
        }
        let maximal: Vec<usize> = (0..applicable.len())
            .filter(|&i| {
                (0..applicable.len()).all(|j| {
                    i == j || self.more_specific(&applicable[i], &applicable[j], phase, arg_count)
                })
            })
            .collect();
        match maximal.as_slice() {
            [] => Selection::Ambiguous(applicable[0].clone(), applicable[1].clone()),
            [only] => Selection::Selected(applicable[*only].clone()),
            several => {
                // Equally specific signatures: prefer a concrete method.
                let chosen = several
                    .iter()
                    .copied()
                    .find(|&i| !applicable[i].is_abstract)
                    .unwrap_or(several[0]);
                Selection::Selected(applicable[chosen].clone())
            }
        }
    }

    fn more_specific(&self, a: &MethodCandidate, b: &MethodCandidate, phase: Phase, arg_count: usize) -> bool {
        let count = if phase == Phase::Varargs {
            arg_count.max(a.params.len()).max(b.params.len())
        } else {
            a.params.len()
        };
        (0..count).all(|i| {
            let pa = parameter_for(a, i, phase);
            let pb = parameter_for(b, i, phase);
            self.is_convertible(&pa, &pb, Phase::Strict)
        })
    }
}

/// Type of parameter `i`, expanding a variable-arity tail in the varargs
/// phase.
fn parameter_for(candidate: &MethodCandidate, i: usize, phase: Phase) -> ResolvedType {
    let last = candidate.params.len().saturating_sub(1);
    if phase == Phase::Varargs && candidate.is_varargs && i >= last {
        return match candidate.params.get(last) {
            Some(ResolvedType::Array(element)) => element.as_ref().clone(),
            Some(other) => other.clone(),
            None => ResolvedType::Unknown,
        };
    }
    candidate
        .params
        .get(i)
        .cloned()
        .unwrap_or(ResolvedType::Unknown)
}

fn apply_method_subst(candidate: &MethodCandidate, subst: &Subst) -> MethodCandidate {
    let mut out = candidate.clone();
    out.params = candidate.params.iter().map(|p| substitute(p, subst)).collect();
    out.return_type = substitute(&candidate.return_type, subst).capture_upper();
    out
}

/// Replace type variables bound in `subst`.
pub(crate) fn substitute(ty: &ResolvedType, subst: &Subst) -> ResolvedType {
    match ty {
        ResolvedType::TypeVar { name, .. } => subst.get(name).cloned().unwrap_or_else(|| ty.clone()),
        ResolvedType::Class { name, args } => ResolvedType::Class {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, subst)).collect(),
        },
        ResolvedType::Array(element) => ResolvedType::array_of(substitute(element, subst)),
        ResolvedType::Wildcard { bound_kind, bound } => ResolvedType::Wildcard {
            bound_kind: *bound_kind,
            bound: bound.as_deref().map(|b| Box::new(substitute(b, subst))),
        },
        other => other.clone(),
    }
}
