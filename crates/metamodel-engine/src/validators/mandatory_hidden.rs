//! Validator: mandatory-hidden
//!
//! A mandatory property the user cannot see must get its value from a
//! default, otherwise no object of the type can ever be valid.

use metamodel_types::{FacetKind, FeatureKind};

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::validate::{SpecGraph, Validator};

pub struct MandatoryHidden;

const NAME: &str = "mandatory-hidden";

impl Validator for MandatoryHidden {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet) {
        for spec in graph.iter() {
            for member in spec.members_of(FeatureKind::ScalarProperty) {
                let facets = &member.facets;
                if facets.contains_facet(FacetKind::Mandatory)
                    && facets.contains_facet(FacetKind::Hidden)
                    && !facets.contains_facet(FacetKind::Default)
                {
                    failures.push(Diagnostic::error(
                        NAME,
                        FeatureLocation::of_member(spec.key(), member.id.as_str()),
                        "mandatory property is hidden and has no default",
                    ));
                }
            }
        }
    }
}
