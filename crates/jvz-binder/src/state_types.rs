//! Resolution of type syntax: class types, qualified type names, arrays and
//! wildcards.

use jvz_common::diagnostic_codes;
use jvz_parser::{NodeData, NodeIndex};

use crate::binding::{Binding, SymbolRef, UnresolvedReason};
use crate::state::BinderState;
use crate::state_imports::{TypeLookup, qualify};
use crate::types::ResolvedType;

/// One dotted segment of a type name.
struct Segment {
    /// The node spanning the name up to and including this segment.
    node: NodeIndex,
    name: NodeIndex,
    type_arguments: Vec<NodeIndex>,
}

/// What the segments resolved so far denote.
enum Head {
    Start,
    Type(ResolvedType),
    Package(String),
}

impl BinderState<'_> {
    /// Resolve a type node, reporting unresolved names.
    pub(crate) fn resolve_type(&mut self, node: NodeIndex) -> ResolvedType {
        let arena = self.arena;
        let ty = match arena.data(node) {
            None => return ResolvedType::Unknown,
            Some(NodeData::PrimitiveType(kind)) => ResolvedType::Primitive(*kind),
            Some(NodeData::VoidType) => ResolvedType::Void,
            Some(&NodeData::ArrayType { element }) => {
                ResolvedType::array_of(self.resolve_type(element))
            }
            Some(&NodeData::WildcardType { bound_kind, bound }) => ResolvedType::Wildcard {
                bound_kind,
                bound: bound.to_option().map(|b| Box::new(self.resolve_type(b))),
            },
            Some(NodeData::UnionType { types }) => {
                // Multi-catch parameters are typed as unknown: the least upper
                // bound of the alternatives is not computed.
                for &alternative in &types.nodes {
                    self.resolve_type(alternative);
                }
                ResolvedType::Unknown
            }
            Some(NodeData::ClassType { .. }) => {
                let segments = self.class_type_segments(node);
                return self.resolve_segments(node, &segments);
            }
            Some(
                NodeData::Identifier { .. }
                | NodeData::QualifiedName { .. }
                | NodeData::FieldAccess { .. },
            ) => {
                let segments = self.name_segments(node);
                return self.resolve_segments(node, &segments);
            }
            Some(_) => ResolvedType::Unknown,
        };
        self.record_type(node, &ty);
        ty
    }

    /// Whether the class type at `node` is written with the diamond `<>`.
    pub(crate) fn is_diamond(&self, node: NodeIndex) -> bool {
        matches!(
            self.arena.data(node),
            Some(NodeData::ClassType {
                type_arguments: Some(list),
                ..
            }) if list.nodes.is_empty()
        )
    }

    fn class_type_segments(&self, node: NodeIndex) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current = node;
        while let Some(NodeData::ClassType {
            qualifier,
            name,
            type_arguments,
        }) = self.arena.data(current)
        {
            segments.push(Segment {
                node: current,
                name: *name,
                type_arguments: type_arguments
                    .as_ref()
                    .map(|l| l.nodes.clone())
                    .unwrap_or_default(),
            });
            current = *qualifier;
        }
        segments.reverse();
        segments
    }

    fn name_segments(&self, node: NodeIndex) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current = node;
        loop {
            match self.arena.data(current) {
                Some(NodeData::Identifier { .. }) => {
                    segments.push(Segment {
                        node: current,
                        name: current,
                        type_arguments: Vec::new(),
                    });
                    break;
                }
                Some(
                    &NodeData::QualifiedName { qualifier, name }
                    | &NodeData::FieldAccess {
                        expression: qualifier,
                        name,
                    },
                ) => {
                    segments.push(Segment {
                        node: current,
                        name,
                        type_arguments: Vec::new(),
                    });
                    current = qualifier;
                }
                _ => break,
            }
        }
        segments.reverse();
        segments
    }

    /// Resolve dotted segments left to right: the first against the scope
    /// chain and imports, later ones as member types or package members.
    fn resolve_segments(&mut self, node: NodeIndex, segments: &[Segment]) -> ResolvedType {
        let mut head = Head::Start;
        for (i, segment) in segments.iter().enumerate() {
            let is_last = i + 1 == segments.len();
            let Some(text) = self.arena.identifier_text(segment.name).map(str::to_string) else {
                self.record_unresolved(node, UnresolvedReason::Poisoned);
                return ResolvedType::Unknown;
            };
            head = match head {
                Head::Start => match self.lookup_simple_type(&text) {
                    TypeLookup::Found(ty) => Head::Type(ty),
                    TypeLookup::Ambiguous(first, second) => {
                        self.error_at(
                            segment.name,
                            diagnostic_codes::AMBIGUOUS_REFERENCE,
                            &[&text, &first, &second],
                        );
                        self.record_unresolved(node, UnresolvedReason::Ambiguous);
                        return ResolvedType::Unknown;
                    }
                    TypeLookup::NotFound if !is_last => Head::Package(text),
                    TypeLookup::NotFound => {
                        self.error_at(segment.name, diagnostic_codes::CANNOT_FIND_SYMBOL, &["class", &text]);
                        self.record_unresolved(node, UnresolvedReason::NotFound);
                        return ResolvedType::Unknown;
                    }
                },
                Head::Type(outer) => {
                    let member = outer
                        .class_name()
                        .and_then(|owner| self.find_member_type(owner, &text));
                    match member {
                        Some(member) => Head::Type(ResolvedType::class(member)),
                        None => {
                            if !outer.is_unknown() {
                                self.error_at(
                                    segment.name,
                                    diagnostic_codes::CANNOT_FIND_SYMBOL,
                                    &["class", &text],
                                );
                            }
                            self.record_unresolved(node, UnresolvedReason::NotFound);
                            return ResolvedType::Unknown;
                        }
                    }
                }
                Head::Package(package) => {
                    let full = qualify(&package, &text);
                    if self.type_exists(&full) {
                        self.record(
                            segments[i - 1].node,
                            Binding::Symbol {
                                symbol: SymbolRef::Package {
                                    name: package.clone(),
                                },
                                ty: ResolvedType::Unknown,
                            },
                        );
                        Head::Type(ResolvedType::class(full))
                    } else if !is_last {
                        Head::Package(full)
                    } else {
                        if self.package_exists(&package) {
                            self.error_at(
                                segment.name,
                                diagnostic_codes::CANNOT_FIND_SYMBOL,
                                &["class", &text],
                            );
                        } else {
                            self.error_at(
                                segments[i - 1].node,
                                diagnostic_codes::PACKAGE_DOES_NOT_EXIST,
                                &[&package],
                            );
                        }
                        self.record_unresolved(node, UnresolvedReason::NotFound);
                        return ResolvedType::Unknown;
                    }
                }
            };

            let type_arguments: Vec<ResolvedType> = segment
                .type_arguments
                .iter()
                .map(|&arg| self.resolve_type(arg))
                .collect();
            if let Head::Type(ResolvedType::Class { name, args }) = &mut head {
                if is_last {
                    *args = type_arguments;
                }
                if !is_last {
                    let symbol_name = name.clone();
                    let ty = ResolvedType::class(symbol_name.clone());
                    self.record(
                        segment.node,
                        Binding::Symbol {
                            symbol: SymbolRef::Type { name: symbol_name },
                            ty,
                        },
                    );
                }
            }
        }

        match head {
            Head::Type(ty) => {
                let symbol = match &ty {
                    ResolvedType::Class { name, .. } => SymbolRef::Type { name: name.clone() },
                    ResolvedType::TypeVar { name, .. } => SymbolRef::Type { name: name.clone() },
                    _ => {
                        self.record_type(node, &ty);
                        return ty;
                    }
                };
                self.record(
                    node,
                    Binding::Symbol {
                        symbol,
                        ty: ty.clone(),
                    },
                );
                ty
            }
            Head::Start | Head::Package(_) => {
                self.record_unresolved(node, UnresolvedReason::NotFound);
                ResolvedType::Unknown
            }
        }
    }

    /// Class literal and array element helper: the boxed form of `ty` as the
    /// argument of `Class<T>`.
    pub(crate) fn class_literal_type(ty: &ResolvedType) -> ResolvedType {
        let argument = match ty {
            ResolvedType::Primitive(kind) => crate::types::boxed(*kind),
            ResolvedType::Void => ResolvedType::class("java.lang.Void"),
            other => other.erasure(),
        };
        ResolvedType::Class {
            name: "java.lang.Class".to_string(),
            args: vec![argument],
        }
    }
}
