//! Validator: action-choices

use metamodel_types::{FacetKind, FeatureKind};

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::validate::{SpecGraph, Validator};

/// Choices belong on action parameters, not on the action itself.
pub struct ActionChoices;

const NAME: &str = "action-choices";

impl Validator for ActionChoices {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet) {
        for spec in graph.iter() {
            for action in spec.members_of(FeatureKind::Action) {
                if let Some(choices) = action.facet(FacetKind::Choices) {
                    failures.push(Diagnostic::warning(
                        NAME,
                        FeatureLocation::of_member(spec.key(), action.id.as_str()),
                        format!(
                            "choices method '{}' applies to the action, not a parameter",
                            choices.methods().join(", ")
                        ),
                    ));
                }
            }
        }
    }
}
