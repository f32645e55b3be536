//! Validator: duplicate-member-ids
//!
//! Member ids are names, so overloaded actions collide.

use rustc_hash::FxHashSet;

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::validate::{SpecGraph, Validator};

pub struct DuplicateMemberIds;

const NAME: &str = "duplicate-member-ids";

impl Validator for DuplicateMemberIds {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet) {
        for spec in graph.iter() {
            let mut seen = FxHashSet::default();
            for member in spec.members() {
                if !seen.insert(member.id.as_str()) {
                    failures.push(Diagnostic::error(
                        NAME,
                        FeatureLocation::of_member(spec.key(), member.id.as_str()),
                        format!("member id '{}' is not unique", member.id),
                    ));
                }
            }
        }
    }
}
