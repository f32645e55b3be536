//! Rule: max-length-attribute

use metamodel_types::{
    AttributeBag, Facet, FacetData, FacetHolder, FacetKind, FeatureKind, FeatureSelector,
};

use crate::error::RuleError;
use crate::rule::*;

pub struct MaxLengthAttribute;

static META: RuleMeta = RuleMeta {
    name: "max-length-attribute",
    description: "Maximum text length from the `maxLength` attribute",
    interest: FeatureSelector::Any(&[FeatureKind::ScalarProperty, FeatureKind::ActionParameter]),
    prefixes: &[],
};

fn apply(attributes: &AttributeBag, facets: &mut FacetHolder) -> Result<(), RuleError> {
    if !attributes.has("maxLength") {
        return Ok(());
    }
    match attributes.get_i64("maxLength") {
        Some(length) if length > 0 => {
            facets.add_facet(Facet::new(
                FacetKind::MaxLength,
                FacetData::Integer(length),
                META.name,
            ));
            Ok(())
        }
        _ => Err(RuleError::InvalidAttribute {
            name: "maxLength".to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}

impl FacetRule for MaxLengthAttribute {
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
