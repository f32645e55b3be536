//! Validator: unresolved-references
//!
//! Warns about type keys mentioned by a specification (supertypes, member
//! and parameter types, element types) that are not part of the graph.

use metamodel_types::TypeKey;
use rustc_hash::FxHashSet;

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::validate::{SpecGraph, Validator};

pub struct UnresolvedReferences;

const NAME: &str = "unresolved-references";

impl Validator for UnresolvedReferences {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet) {
        for spec in graph.iter().filter(|spec| !spec.is_stub()) {
            for supertype in spec.supertypes() {
                if !graph.contains(supertype) {
                    failures.push(Diagnostic::warning(
                        NAME,
                        FeatureLocation::of_type(spec.key()),
                        format!("supertype {} is not part of the metamodel", supertype),
                    ));
                }
            }
            for member in spec.members() {
                let mut reported: FxHashSet<&TypeKey> = FxHashSet::default();
                let referenced = member.referenced_types().chain(member.element_type());
                for key in referenced {
                    if graph.contains(key) || !reported.insert(key) {
                        continue;
                    }
                    failures.push(Diagnostic::warning(
                        NAME,
                        FeatureLocation::of_member(spec.key(), member.id.as_str()),
                        format!("type {} is not part of the metamodel", key),
                    ));
                }
            }
        }
    }
}
