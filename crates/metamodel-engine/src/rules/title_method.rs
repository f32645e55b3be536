//! Rule: title-method
//!
//! A zero-argument `title` method returning a value provides the type's
//! title.

use metamodel_types::{Facet, FacetKind, FeatureSelector, MemberShape};

use crate::error::RuleError;
use crate::rule::*;

pub struct TitleMethod;

static META: RuleMeta = RuleMeta {
    name: "title-method",
    description: "Use a `title()` method as the type's title",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for TitleMethod {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        let id = match ctx.pool.find("title", Some(0)) {
            Some(candidate) if candidate.member.shape == MemberShape::Method => candidate.id,
            _ => return Ok(()),
        };
        ctx.pool.remove(id);
        if let Some(candidate) = ctx.pool.candidate(id) {
            if candidate.member.returns.is_void() {
                return Err(RuleError::InvalidSupport {
                    method: "title".to_string(),
                    reason: "must return a value".to_string(),
                });
            }
        }
        ctx.facets
            .add_facet(Facet::method(FacetKind::Title, "title", META.name));
        Ok(())
    }
}
