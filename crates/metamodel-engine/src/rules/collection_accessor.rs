//! Rule: collection-accessor
//!
//! Interprets a collection and wires its element type. Linking a type that
//! is already being built (including the owning type itself) returns
//! immediately, so self-referencing collections are safe.

use metamodel_types::{Facet, FacetKind, FeatureKind, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct CollectionAccessor;

static META: RuleMeta = RuleMeta {
    name: "collection-accessor",
    description: "Accessor and element type of collections",
    interest: FeatureSelector::Only(FeatureKind::Collection),
    prefixes: &[],
};

impl FacetRule for CollectionAccessor {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        let member = ctx.member;
        let element = member
            .returns
            .referenced()
            .ok_or_else(|| RuleError::failed("collection without an element type"))?;

        ctx.env.link(element);
        ctx.facets.add_facet(Facet::method(
            FacetKind::CollectionAccessor,
            member.name.as_str(),
            META.name,
        ));
        ctx.facets.add_facet(Facet::type_ref(
            FacetKind::ElementType,
            element.clone(),
            META.name,
        ));
        ctx.consume();
        Ok(())
    }
}
