//! Rule: programmatic
//!
//! Members carrying the `programmatic` attribute are for code, not for the
//! metamodel. They are removed without any facet, which suppresses them.

use metamodel_types::FeatureSelector;

use crate::error::RuleError;
use crate::rule::*;

pub struct Programmatic;

static META: RuleMeta = RuleMeta {
    name: "programmatic",
    description: "Suppress members marked `programmatic`",
    interest: FeatureSelector::Members,
    prefixes: &[],
};

impl FacetRule for Programmatic {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        if ctx.member.attributes.is_set("programmatic") {
            ctx.consume();
        }
        Ok(())
    }
}
