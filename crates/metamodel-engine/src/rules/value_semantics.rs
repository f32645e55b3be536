//! Rule: value-semantics
//!
//! Types marked `value` can be encoded to and parsed from text and are
//! immutable. `immutable` on its own only makes the type immutable.

use metamodel_types::{Facet, FacetKind, FeatureSelector};

use crate::error::RuleError;
use crate::rule::*;

pub struct ValueSemantics;

static META: RuleMeta = RuleMeta {
    name: "value-semantics",
    description: "Encodable/parseable/immutable facets for value types",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for ValueSemantics {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        if ctx.attributes.is_set("value") {
            for kind in [FacetKind::Encodable, FacetKind::Parseable, FacetKind::Immutable] {
                ctx.facets.add_facet(Facet::marker(kind, META.name));
            }
        }
        if ctx.attributes.is_set("immutable") {
            ctx.facets
                .add_facet(Facet::marker(FacetKind::Immutable, META.name));
        }
        Ok(())
    }
}
