//! Rule: optionality-attribute
//!
//! Scalar properties and parameters are mandatory unless marked `optional`.
//! `optional` actively removes a `Mandatory` facet attached by an earlier
//! rule.

use metamodel_types::{AttributeBag, Facet, FacetHolder, FacetKind, FeatureKind, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct OptionalityAttribute;

static META: RuleMeta = RuleMeta {
    name: "optionality-attribute",
    description: "Mandatory by default, `optional` to opt out",
    interest: FeatureSelector::Any(&[FeatureKind::ScalarProperty, FeatureKind::ActionParameter]),
    prefixes: &[],
};

fn apply(attributes: &AttributeBag, facets: &mut FacetHolder) -> Result<(), RuleError> {
    let optional = attributes.is_set("optional");
    let mandatory = attributes.is_set("mandatory");
    if optional && mandatory {
        return Err(RuleError::InvalidAttribute {
            name: "optional".to_string(),
            reason: "conflicts with `mandatory`".to_string(),
        });
    }
    if optional {
        facets.remove_facet(FacetKind::Mandatory);
    } else {
        facets.add_facet(Facet::marker(FacetKind::Mandatory, META.name));
    }
    Ok(())
}

impl FacetRule for OptionalityAttribute {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        apply(&ctx.member.attributes, ctx.facets)
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), RuleError> {
        apply(&ctx.param.attributes, ctx.facets)
    }
}
