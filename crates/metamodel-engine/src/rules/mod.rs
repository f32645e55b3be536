//! Rule registry: the built-in inspection rules.
//!
//! Registration order is precedence order. Rules that consume members come
//! last so every decorating rule sees the member first.

pub mod action_invocation;
pub mod collection_accessor;
pub mod description;
pub mod framework_methods;
pub mod lifecycle_callbacks;
pub mod max_length;
pub mod member_support;
pub mod named;
pub mod optionality;
pub mod programmatic;
pub mod property_accessor;
pub mod title_attribute;
pub mod title_method;
pub mod util;
pub mod value_semantics;

use crate::rule::FacetRule;

/// Returns all built-in rules in registration order.
pub fn all_rules() -> Vec<Box<dyn FacetRule>> {
    vec![
        // Suppression
        Box::new(framework_methods::FrameworkMethods),
        Box::new(programmatic::Programmatic),
        // Type level
        Box::new(lifecycle_callbacks::LifecycleCallbacks),
        Box::new(title_method::TitleMethod),
        Box::new(title_attribute::TitleAttribute),
        Box::new(value_semantics::ValueSemantics),
        // Decorators
        Box::new(named::Named),
        Box::new(description::DescriptionAttribute),
        Box::new(member_support::MemberSupport),
        Box::new(optionality::OptionalityAttribute),
        Box::new(max_length::MaxLengthAttribute),
        // Interpretation (consumes)
        Box::new(property_accessor::PropertyAccessor),
        Box::new(collection_accessor::CollectionAccessor),
        Box::new(action_invocation::ActionInvocation),
    ]
}
