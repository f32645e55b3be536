//! Rule: action-invocation
//!
//! Interprets an action: how to invoke it and what it returns. Return and
//! parameter types are wired through the loader.

use metamodel_types::{Facet, FacetKind, FeatureKind, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct ActionInvocation;

static META: RuleMeta = RuleMeta {
    name: "action-invocation",
    description: "Invocation method and return type of actions",
    interest: FeatureSelector::Only(FeatureKind::Action),
    prefixes: &[],
};

impl FacetRule for ActionInvocation {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        let member = ctx.member;
        ctx.facets.add_facet(Facet::method(
            FacetKind::ActionInvocation,
            member.name.as_str(),
            META.name,
        ));

        if let Some(returned) = member.returns.referenced() {
            ctx.env.link(returned);
            ctx.facets.add_facet(Facet::type_ref(
                FacetKind::TypeOf,
                returned.clone(),
                META.name,
            ));
        }
        for param in &member.params {
            if let Some(ty) = param.ty.referenced() {
                ctx.env.link(ty);
            }
        }

        ctx.consume();
        Ok(())
    }
}
