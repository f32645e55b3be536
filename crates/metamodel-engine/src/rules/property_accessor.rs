//! Rule: property-accessor
//!
//! Interprets a scalar property: records how to read it, its value type and,
//! when there is one, how to write it. A field is writable unless marked
//! `readonly`; an accessor is writable when a one-argument `set<Name>`
//! mutator exists, which is consumed here.

use metamodel_types::{Facet, FacetKind, FeatureKind, FeatureSelector, MemberShape};

use super::util::capitalize;
use crate::error::RuleError;
use crate::rule::*;

pub struct PropertyAccessor;

static META: RuleMeta = RuleMeta {
    name: "property-accessor",
    description: "Accessor, setter and value type of scalar properties",
    interest: FeatureSelector::Only(FeatureKind::ScalarProperty),
    prefixes: &[],
};

impl FacetRule for PropertyAccessor {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        let member = ctx.member;
        ctx.facets.add_facet(Facet::method(
            FacetKind::PropertyAccessor,
            member.name.as_str(),
            META.name,
        ));

        if let Some(ty) = member.returns.referenced() {
            ctx.env.link(ty);
            ctx.facets
                .add_facet(Facet::type_ref(FacetKind::TypeOf, ty.clone(), META.name));
        }

        match member.shape {
            MemberShape::Field if !member.attributes.is_set("readonly") => {
                ctx.facets.add_facet(Facet::method(
                    FacetKind::PropertySetter,
                    member.name.as_str(),
                    META.name,
                ));
            }
            MemberShape::Accessor => {
                let setter_name = format!("set{}", capitalize(&member.name));
                let setter = ctx
                    .pool
                    .find(&setter_name, Some(1))
                    .filter(|candidate| candidate.member.shape == MemberShape::Mutator)
                    .map(|candidate| candidate.id);
                if let Some(id) = setter {
                    ctx.pool.remove(id);
                    ctx.facets.add_facet(Facet::method(
                        FacetKind::PropertySetter,
                        setter_name,
                        META.name,
                    ));
                }
            }
            _ => {}
        }

        ctx.consume();
        Ok(())
    }
}
