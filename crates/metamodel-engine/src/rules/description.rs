//! Rule: description-attribute

use metamodel_types::{AttributeBag, Facet, FacetKind, FacetHolder, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct DescriptionAttribute;

static META: RuleMeta = RuleMeta {
    name: "description-attribute",
    description: "Descriptions from the `describedAs` attribute",
    interest: FeatureSelector::Everything,
    prefixes: &[],
};

fn describe(attributes: &AttributeBag, facets: &mut FacetHolder) -> Result<(), RuleError> {
    let Some(value) = attributes.get("describedAs") else {
        return Ok(());
    };
    let text = value.as_str().ok_or_else(|| RuleError::InvalidAttribute {
        name: "describedAs".to_string(),
        reason: "expected a string".to_string(),
    })?;
    facets.add_facet(Facet::text(FacetKind::Description, text, META.name));
    Ok(())
}

impl FacetRule for DescriptionAttribute {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        describe(ctx.attributes, ctx.facets)
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        describe(&ctx.member.attributes, ctx.facets)
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), RuleError> {
        describe(&ctx.param.attributes, ctx.facets)
    }
}
