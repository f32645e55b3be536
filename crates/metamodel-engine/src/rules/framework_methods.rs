//! Rule: framework-methods
//!
//! Removes plumbing methods every domain object inherits from the host
//! runtime so they never show up as actions.

use metamodel_types::{FeatureSelector, MemberShape};

use crate::error::RuleError;
use crate::rule::*;

/// Method names that are never domain actions
pub const FRAMEWORK_METHODS: &[&str] = &["toString", "hashCode", "equals", "getClass", "clone"];

pub struct FrameworkMethods;

static META: RuleMeta = RuleMeta {
    name: "framework-methods",
    description: "Suppress runtime plumbing methods (toString, hashCode, equals, ...)",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for FrameworkMethods {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        let removed = ctx.pool.take_all(|member| {
            member.shape == MemberShape::Method && FRAMEWORK_METHODS.contains(&member.name.as_str())
        });
        if !removed.is_empty() {
            tracing::trace!(key = %ctx.key, count = removed.len(), "framework methods suppressed");
        }
        Ok(())
    }
}
