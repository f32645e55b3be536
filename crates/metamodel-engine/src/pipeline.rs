//! Rule pipeline: turns one introspected type into a specification.
//!
//! 1. `process_type` on every rule, in registration order.
//! 2. `process_member` on every interested rule for each discovered member,
//!    in declaration order, until the member leaves the pool.
//! 3. `process_parameter` for each parameter of each surviving action.
//! 4. The unconsumed-member policy decides what happens to leftovers.
//!
//! A rule that returns an error or panics is recorded against the feature
//! it was looking at; the remaining rules still run.

use metamodel_types::{kind_of, FacetHolder, FeatureKind, ReflectedMember, TypeKey};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::UnconsumedPolicy;
use crate::diagnostic::{Diagnostic, FeatureLocation, ORIGIN_PIPELINE};
use crate::error::RuleError;
use crate::introspect::Introspection;
use crate::pool::CandidateId;
use crate::rule::{
    has_support_prefix, FacetRule, MemberContext, ParameterContext, RuleEnv, TypeContext,
};
use crate::spec::{Member, Parameter, Specification};

struct MemberDraft {
    candidate: CandidateId,
    member: Arc<ReflectedMember>,
    declared_by: TypeKey,
    kind: FeatureKind,
    facets: FacetHolder,
    parameters: Vec<FacetHolder>,
}

/// Runs an ordered rule list over introspected types.
pub struct Pipeline<'a> {
    rules: &'a [Box<dyn FacetRule>],
    env: &'a RuleEnv<'a>,
    prefixes: Vec<&'static str>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline with the given rules and environment.
    pub fn new(rules: &'a [Box<dyn FacetRule>], env: &'a RuleEnv<'a>) -> Self {
        let prefixes = rules
            .iter()
            .flat_map(|rule| rule.meta().prefixes.iter().copied())
            .collect();
        Self {
            rules,
            env,
            prefixes,
        }
    }

    /// Whether `name` is reserved as a supporting method by some rule
    pub fn is_support_method(&self, name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| has_support_prefix(name, prefix))
    }

    fn classify(&self, member: &ReflectedMember) -> Option<FeatureKind> {
        match kind_of(member)? {
            FeatureKind::Action if self.is_support_method(&member.name) => None,
            kind => Some(kind),
        }
    }

    /// Build the (unfrozen) specification of one type.
    pub fn run(&self, introspection: Introspection) -> Specification {
        let Introspection {
            key,
            supertypes,
            ancestry,
            attributes,
            mut pool,
            mut diagnostics,
        } = introspection;

        // Type level.
        let mut type_facets = FacetHolder::new();
        for rule in self.rules {
            let mut ctx = TypeContext {
                key: &key,
                attributes: &attributes,
                facets: &mut type_facets,
                pool: &mut pool,
                env: self.env,
            };
            let outcome = guard(|| rule.process_type(&mut ctx));
            record(&mut diagnostics, rule.as_ref(), outcome, || {
                FeatureLocation::of_type(&key)
            });
        }

        // Member discovery, in declaration order.
        let discovered: Vec<(CandidateId, Arc<ReflectedMember>, TypeKey, FeatureKind)> = pool
            .live()
            .filter_map(|candidate| {
                self.classify(&candidate.member).map(|kind| {
                    (
                        candidate.id,
                        Arc::clone(&candidate.member),
                        candidate.declared_by.clone(),
                        kind,
                    )
                })
            })
            .collect();

        let mut drafts = Vec::with_capacity(discovered.len());
        for (candidate, member, declared_by, kind) in discovered {
            let mut facets = FacetHolder::new();
            for rule in self.rules.iter().filter(|r| r.meta().is_interested_in(kind)) {
                if !pool.contains(candidate) {
                    break;
                }
                let mut ctx = MemberContext {
                    key: &key,
                    candidate,
                    member: &member,
                    kind,
                    facets: &mut facets,
                    pool: &mut pool,
                    env: self.env,
                };
                let outcome = guard(|| rule.process_member(&mut ctx));
                record(&mut diagnostics, rule.as_ref(), outcome, || {
                    FeatureLocation::of_member(&key, member.name.as_str())
                });
            }
            drafts.push(MemberDraft {
                candidate,
                member,
                declared_by,
                kind,
                facets,
                parameters: Vec::new(),
            });
        }

        // Parameters of every action that is not already suppressed.
        for draft in drafts.iter_mut() {
            if draft.kind != FeatureKind::Action
                || (!pool.contains(draft.candidate) && draft.facets.is_empty())
            {
                continue;
            }
            for (index, param) in draft.member.params.iter().enumerate() {
                let mut facets = FacetHolder::new();
                let interested = self
                    .rules
                    .iter()
                    .filter(|r| r.meta().is_interested_in(FeatureKind::ActionParameter));
                for rule in interested {
                    let mut ctx = ParameterContext {
                        key: &key,
                        member: &draft.member,
                        index,
                        param,
                        facets: &mut facets,
                        pool: &mut pool,
                        env: self.env,
                    };
                    let outcome = guard(|| rule.process_parameter(&mut ctx));
                    record(&mut diagnostics, rule.as_ref(), outcome, || {
                        FeatureLocation::of_parameter(&key, draft.member.name.as_str(), index)
                    });
                }
                draft.parameters.push(facets);
            }
        }

        // Unconsumed policy.
        let policy = self.env.config().unconsumed;
        let mut members = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let consumed = !pool.remove(draft.candidate);
            let name = draft.member.name.as_str();
            if consumed && draft.facets.is_empty() {
                tracing::debug!(%key, member = name, "member suppressed");
                continue;
            }
            if !consumed && policy == UnconsumedPolicy::Report {
                diagnostics.push(Diagnostic::warning(
                    ORIGIN_PIPELINE,
                    FeatureLocation::of_member(&key, name),
                    format!("unconsumed {} '{}' dropped", draft.kind, name),
                ));
                continue;
            }
            members.push(into_member(draft));
        }

        for candidate in pool.live() {
            let name = candidate.member.name.as_str();
            if self.is_support_method(name) {
                diagnostics.push(Diagnostic::warning(
                    ORIGIN_PIPELINE,
                    FeatureLocation::of_member(&key, name),
                    format!("orphaned supporting method '{}' matches no feature", name),
                ));
            } else if policy == UnconsumedPolicy::Report {
                diagnostics.push(Diagnostic::warning(
                    ORIGIN_PIPELINE,
                    FeatureLocation::of_member(&key, name),
                    format!("unconsumed member '{}' is not a feature", name),
                ));
            } else {
                tracing::debug!(%key, member = name, "non-feature member dropped");
            }
        }

        Specification::new(key, supertypes, ancestry, type_facets, members, diagnostics)
    }
}

fn into_member(draft: MemberDraft) -> Member {
    let parameters = draft
        .member
        .params
        .iter()
        .zip(draft.parameters)
        .enumerate()
        .map(|(index, (param, facets))| Parameter {
            index,
            name: param.name.clone(),
            ty: param.ty.clone(),
            facets,
        })
        .collect();
    Member {
        id: draft.member.name.clone(),
        kind: draft.kind,
        declared_by: draft.declared_by,
        returns: draft.member.returns.clone(),
        facets: draft.facets,
        parameters,
    }
}

fn guard(hook: impl FnOnce() -> Result<(), RuleError>) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("rule panicked: {}", panic_message(payload.as_ref()))),
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

fn record(
    diagnostics: &mut Vec<Diagnostic>,
    rule: &dyn FacetRule,
    outcome: Result<(), String>,
    location: impl FnOnce() -> FeatureLocation,
) {
    if let Err(message) = outcome {
        let location = location();
        tracing::warn!(rule = rule.meta().name, %location, %message, "rule failed");
        diagnostics.push(Diagnostic::error(rule.meta().name, location, message));
    }
}
