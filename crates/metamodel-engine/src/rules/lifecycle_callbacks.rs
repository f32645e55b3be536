//! Rule: lifecycle-callbacks
//!
//! Zero-argument methods named after a lifecycle event (`created`,
//! `persisting`, ...) or `on` + the capitalised event (`onCreated`) become a
//! `Callback(event)` facet on the type. Several methods for one event
//! accumulate into the same facet.

use metamodel_types::{Facet, FacetData, FacetKind, FeatureSelector, LifecycleEvent, MemberShape};

use super::util::capitalize;
use crate::error::RuleError;
use crate::rule::*;

pub struct LifecycleCallbacks;

static META: RuleMeta = RuleMeta {
    name: "lifecycle-callbacks",
    description: "Map lifecycle hook methods to callback facets",
    interest: FeatureSelector::ObjectOnly,
    prefixes: &[],
};

impl FacetRule for LifecycleCallbacks {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_type(&self, ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        for event in LifecycleEvent::ALL {
            let plain = event.name();
            let prefixed = format!("on{}", capitalize(plain));
            let hooks = ctx.pool.take_all(|member| {
                member.shape == MemberShape::Method
                    && member.arity() == 0
                    && (member.name == plain || member.name == prefixed)
            });
            if hooks.is_empty() {
                continue;
            }

            let kind = FacetKind::Callback(event);
            ctx.facets.extend_facet(
                kind,
                || Facet::new(kind, FacetData::Methods(Vec::new()), META.name),
                |facet| {
                    if let FacetData::Methods(methods) = facet.data_mut() {
                        methods.extend(hooks.iter().map(|hook| hook.name.clone()));
                    }
                },
            );
        }
        Ok(())
    }
}
