//! Validator registry: the built-in checks of the validation pass.

pub mod action_choices;
pub mod duplicate_member_ids;
pub mod invalid_supertypes;
pub mod mandatory_hidden;
pub mod unresolved_references;

use crate::validate::Validator;

/// Returns all built-in validators.
pub fn all_validators() -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(unresolved_references::UnresolvedReferences),
        Box::new(invalid_supertypes::InvalidSupertypes),
        Box::new(duplicate_member_ids::DuplicateMemberIds),
        Box::new(mandatory_hidden::MandatoryHidden),
        Box::new(action_choices::ActionChoices),
    ]
}
