//! Raw type introspection
//!
//! Turns a type key into the flat, declaration-ordered list of candidate
//! members the rule pipeline works on. Ancestors are visited breadth-first,
//! each once, so diamonds and inheritance cycles terminate. Overrides are
//! collapsed by signature, keeping the most-derived declaration.

use metamodel_types::{AttributeBag, ReflectedMember, ReflectedType, TypeKey};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

use crate::diagnostic::{Diagnostic, FeatureLocation, ORIGIN_INTROSPECTION};
use crate::error::IntrospectError;
use crate::pool::MemberPool;
use crate::source::TypeSource;

/// Result of introspecting one type
#[derive(Debug)]
pub struct Introspection {
    /// Introspected type
    pub key: TypeKey,
    /// Direct supertypes, as declared
    pub supertypes: Vec<TypeKey>,
    /// Every reachable ancestor, breadth-first, excluding the type itself
    pub ancestry: Vec<TypeKey>,
    /// Type-level attributes
    pub attributes: AttributeBag,
    /// Candidate members
    pub pool: MemberPool,
    /// Anomalies met along the way
    pub diagnostics: Vec<Diagnostic>,
}

/// Introspects types of one source
pub struct Introspector<'a> {
    source: &'a dyn TypeSource,
}

impl<'a> Introspector<'a> {
    /// Create an introspector over `source`
    pub fn new(source: &'a dyn TypeSource) -> Self {
        Self { source }
    }

    /// Introspect `key`.
    ///
    /// Fails only when the type itself cannot be described. Problems with
    /// ancestors or individual members are recorded as warnings.
    pub fn introspect(&self, key: &TypeKey) -> Result<Introspection, IntrospectError> {
        let root = self.source.reflect(key)?;
        check_well_formed(&root)?;

        let supertypes = root.supertypes.clone();
        let attributes = root.attributes.clone();

        let mut diagnostics = Vec::new();
        let mut ancestry = Vec::new();
        let mut queue: VecDeque<TypeKey> = supertypes.iter().cloned().collect();
        let mut types = vec![root];

        let mut visited: FxHashSet<TypeKey> = FxHashSet::default();
        visited.insert(key.clone());

        while let Some(ancestor) = queue.pop_front() {
            if !visited.insert(ancestor.clone()) {
                if &ancestor == key {
                    diagnostics.push(Diagnostic::warning(
                        ORIGIN_INTROSPECTION,
                        FeatureLocation::of_type(key),
                        format!("inheritance cycle back to {}", key),
                    ));
                }
                continue;
            }
            match self.source.reflect(&ancestor) {
                Ok(ty) => {
                    queue.extend(ty.supertypes.iter().cloned());
                    ancestry.push(ancestor);
                    types.push(ty);
                }
                Err(err) => {
                    tracing::debug!(%key, %ancestor, error = %err, "skipping unknown ancestor");
                    diagnostics.push(Diagnostic::warning(
                        ORIGIN_INTROSPECTION,
                        FeatureLocation::of_type(key),
                        format!("ancestor {} skipped: {}", ancestor, err),
                    ));
                }
            }
        }

        let mut seen: FxHashSet<(String, usize)> = FxHashSet::default();
        let mut members: Vec<(ReflectedMember, TypeKey)> = Vec::new();
        for ty in types {
            for member in ty.members {
                if !seen.insert((member.name.clone(), member.arity())) {
                    continue;
                }
                if !member.accessible {
                    diagnostics.push(Diagnostic::warning(
                        ORIGIN_INTROSPECTION,
                        FeatureLocation::of_member(key, member.name.as_str()),
                        format!("inaccessible member declared by {} skipped", ty.key),
                    ));
                    continue;
                }
                members.push((member, ty.key.clone()));
            }
        }

        Ok(Introspection {
            key: key.clone(),
            supertypes,
            ancestry,
            attributes,
            pool: MemberPool::new(members),
            diagnostics,
        })
    }
}

fn check_well_formed(ty: &ReflectedType) -> Result<(), IntrospectError> {
    let mut signatures = FxHashSet::default();
    for member in &ty.members {
        if member.name.trim().is_empty() {
            return Err(IntrospectError::Malformed {
                key: ty.key.clone(),
                reason: "member with an empty name".to_string(),
            });
        }
        if !signatures.insert(member.signature()) {
            return Err(IntrospectError::Malformed {
                key: ty.key.clone(),
                reason: format!(
                    "member '{}' with {} parameter(s) declared twice",
                    member.name,
                    member.arity()
                ),
            });
        }
    }
    Ok(())
}
