//! Rule: title-attribute
//!
//! A literal `title` attribute on the type. Registered after
//! `title-method`, so it overrides a title method.

use metamodel_types::{Facet, FacetKind, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct TitleAttribute;

static META: RuleMeta = RuleMeta {
    name: "title-attribute",
    description: "Use the `title` attribute as the type's title",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for TitleAttribute {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        if !ctx.attributes.has("title") {
            return Ok(());
        }
        let title = ctx
            .attributes
            .get_str("title")
            .ok_or_else(|| RuleError::InvalidAttribute {
                name: "title".to_string(),
                reason: "expected a string".to_string(),
            })?;
        ctx.facets
            .add_facet(Facet::text(FacetKind::Title, title, META.name));
        Ok(())
    }
}
