//! Rule: named
//!
//! Every type, member and parameter gets a display name: the `named`
//! attribute when present, otherwise one inferred from the identifier
//! (`firstName` -> "First Name").

use metamodel_types::{AttributeBag, Facet, FacetKind, FeatureSelector};

use super::util::humanize;
use crate::error::RuleError;
use crate::rule::*;

pub struct Named;

static META: RuleMeta = RuleMeta {
    name: "named",
    description: "Display names from the `named` attribute or the identifier",
    interest: FeatureSelector::Everything,
    prefixes: &[],
};

fn display_name(attributes: &AttributeBag, identifier: &str) -> Result<Facet, RuleError> {
    let name = match attributes.get("named") {
        None => humanize(identifier),
        Some(value) => value
            .as_str()
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| RuleError::InvalidAttribute {
                name: "named".to_string(),
                reason: "expected a non-empty string".to_string(),
            })?,
    };
    Ok(Facet::text(FacetKind::Named, name, META.name))
}

impl FacetRule for Named {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        let facet = display_name(ctx.attributes, ctx.key.simple_name())?;
        ctx.facets.add_facet(facet);
        Ok(())
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        let facet = display_name(&ctx.member.attributes, &ctx.member.name)?;
        ctx.facets.add_facet(facet);
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), RuleError> {
        let facet = display_name(&ctx.param.attributes, &ctx.param.name)?;
        ctx.facets.add_facet(facet);
        Ok(())
    }
}
