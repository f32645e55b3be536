//! Rule: member-support
//!
//! Pairs members with their supporting methods by naming convention and
//! consumes those methods:
//!
//! - `hide<Member>` -> `Hidden`
//! - `disable<Member>` -> `Disabled`
//! - `validate<Member>` -> `Validate`
//! - `default<Member>` -> `Default`
//! - `choices<Member>` -> `Choices`
//! - `default<N><Action>` / `choices<N><Action>` -> `Default` / `Choices` on
//!   parameter `N`
//!
//! The `hidden` and `disabled` attributes produce the same facets; a string
//! value is kept as the reason.

use metamodel_types::{
    AttributeBag, Facet, FacetHolder, FacetKind, FeatureKind, FeatureSelector, MemberShape,
    ReflectedMember,
};
use std::sync::Arc;

use super::util::capitalize;
use crate::error::RuleError;
use crate::pool::MemberPool;
use crate::rule::*;

pub struct MemberSupport;

static META: RuleMeta = RuleMeta {
    name: "member-support",
    description: "Hide/disable/validate/default/choices supporting methods",
    interest: FeatureSelector::Any(&[
        FeatureKind::ScalarProperty,
        FeatureKind::Collection,
        FeatureKind::Action,
        FeatureKind::ActionParameter,
    ]),
    prefixes: &["hide", "disable", "validate", "default", "choices"],
};

const MEMBER_SUPPORT: &[(&str, FacetKind)] = &[
    ("hide", FacetKind::Hidden),
    ("disable", FacetKind::Disabled),
    ("validate", FacetKind::Validate),
    ("default", FacetKind::Default),
    ("choices", FacetKind::Choices),
];

const PARAMETER_SUPPORT: &[(&str, FacetKind)] = &[
    ("default", FacetKind::Default),
    ("choices", FacetKind::Choices),
];

/// Consume the supporting method `name`, if it exists, and check its shape
fn take_support(pool: &mut MemberPool, name: &str) -> Result<Option<Arc<ReflectedMember>>, RuleError> {
    let id = match pool.find(name, None) {
        Some(candidate) if candidate.member.shape == MemberShape::Method => candidate.id,
        _ => return Ok(None),
    };
    pool.remove(id);
    let method = pool.candidate(id).map(|candidate| Arc::clone(&candidate.member));
    if let Some(method) = &method {
        if method.returns.is_void() {
            return Err(RuleError::InvalidSupport {
                method: name.to_string(),
                reason: "must return a value".to_string(),
            });
        }
    }
    Ok(method)
}

fn flag_from_attribute(
    attributes: &AttributeBag,
    attribute: &str,
    kind: FacetKind,
    facets: &mut FacetHolder,
) {
    if !attributes.is_set(attribute) {
        return;
    }
    let facet = match attributes.get_str(attribute) {
        Some(reason) => Facet::text(kind, reason, META.name),
        None => Facet::marker(kind, META.name),
    };
    facets.add_facet(facet);
}

impl FacetRule for MemberSupport {
    fn meta(&self) -> &RuleMeta {
        &META
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        flag_from_attribute(&ctx.member.attributes, "hidden", FacetKind::Hidden, ctx.facets);
        flag_from_attribute(&ctx.member.attributes, "disabled", FacetKind::Disabled, ctx.facets);

        let suffix = capitalize(ctx.name());
        let mut first_error = None;
        for (prefix, kind) in MEMBER_SUPPORT {
            let method_name = format!("{}{}", prefix, suffix);
            match take_support(ctx.pool, &method_name) {
                Ok(Some(method)) => {
                    ctx.facets
                        .add_facet(Facet::method(*kind, method.name.as_str(), META.name));
                }
                Ok(None) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), RuleError> {
        let suffix = format!("{}{}", ctx.index, capitalize(&ctx.member.name));
        for (prefix, kind) in PARAMETER_SUPPORT {
            let method_name = format!("{}{}", prefix, suffix);
            if let Some(method) = take_support(ctx.pool, &method_name)? {
                ctx.facets
                    .add_facet(Facet::method(*kind, method.name.as_str(), META.name));
            }
        }
        Ok(())
    }
}
