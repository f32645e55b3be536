//! Validator: invalid-supertypes

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::validate::{SpecGraph, Validator};

/// A type whose supertype failed to build is not sound either.
pub struct InvalidSupertypes;

const NAME: &str = "invalid-supertypes";

impl Validator for InvalidSupertypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet) {
        for spec in graph.iter() {
            for supertype in spec.supertypes() {
                if graph.get(supertype).map_or(false, |s| s.is_stub()) {
                    failures.push(Diagnostic::error(
                        NAME,
                        FeatureLocation::of_type(spec.key()),
                        format!("supertype {} could not be built", supertype),
                    ));
                }
            }
        }
    }
}
