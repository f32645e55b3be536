//! Inspection rule trait and supporting types.
//!
//! Each rule implements [`FacetRule`], provides static metadata
//! ([`RuleMeta`]) and overrides one or more `process_*` hooks. Hooks get an
//! explicit context carrying the facet holder they may write to, the shared
//! member pool and the build environment.

use metamodel_types::{
    AttributeBag, FacetHolder, FeatureKind, FeatureSelector, ReflectedMember, ReflectedParam,
    TypeKey,
};

use crate::config::MetamodelConfig;
use crate::diagnostic::FeatureLocation;
use crate::error::RuleError;
use crate::pool::{CandidateId, MemberPool};
use crate::source::TypeSource;

/// Static metadata for a rule.
#[derive(Debug)]
pub struct RuleMeta {
    /// Rule name, e.g. "title-method". Also the origin of its facets.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Feature kinds whose members/parameters the rule wants to see.
    pub interest: FeatureSelector,
    /// Supporting-method prefixes the rule owns, e.g. "hide".
    ///
    /// A method named by one of these followed by an upper-case letter or
    /// digit is not a feature of its own.
    pub prefixes: &'static [&'static str],
}

impl RuleMeta {
    /// Whether the rule wants to process features of `kind`
    pub fn is_interested_in(&self, kind: FeatureKind) -> bool {
        self.interest.matches(kind)
    }
}

/// Whether `name` is `prefix` followed by an upper-case letter or digit
pub fn has_support_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Access to other specifications while one is being built.
///
/// Requests never block: a type that is being built (by this thread or
/// another) is simply left to its builder.
pub trait SpecResolver {
    /// Make sure a specification for `key` exists, is under construction
    /// or is queued to be built
    fn request(&self, key: &TypeKey);
}

/// Resolver that never builds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedResolver;

impl SpecResolver for DetachedResolver {
    fn request(&self, _key: &TypeKey) {}
}

/// Read-only environment shared by every hook of one build.
pub struct RuleEnv<'a> {
    config: &'a MetamodelConfig,
    source: &'a dyn TypeSource,
    resolver: &'a dyn SpecResolver,
}

impl<'a> RuleEnv<'a> {
    /// Create an environment
    pub fn new(
        config: &'a MetamodelConfig,
        source: &'a dyn TypeSource,
        resolver: &'a dyn SpecResolver,
    ) -> Self {
        Self {
            config,
            source,
            resolver,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MetamodelConfig {
        self.config
    }

    /// Type source of the build
    pub fn source(&self) -> &dyn TypeSource {
        self.source
    }

    /// Resolve a type name through the source
    pub fn resolve(&self, name: &str) -> Option<TypeKey> {
        self.source.resolve(name)
    }

    /// Wire a reference to `key`: request its specification if the source
    /// knows the type. Returns whether the type is known.
    pub fn link(&self, key: &TypeKey) -> bool {
        if !self.source.is_known(key) {
            return false;
        }
        self.resolver.request(key);
        true
    }
}

/// Context of [`FacetRule::process_type`].
pub struct TypeContext<'a> {
    /// Type being built
    pub key: &'a TypeKey,
    /// Type-level attributes
    pub attributes: &'a AttributeBag,
    /// Type-level facets
    pub facets: &'a mut FacetHolder,
    /// Candidate members
    pub pool: &'a mut MemberPool,
    /// Build environment
    pub env: &'a RuleEnv<'a>,
}

impl TypeContext<'_> {
    /// Location of the type, for diagnostics
    pub fn location(&self) -> FeatureLocation {
        FeatureLocation::of_type(self.key)
    }
}

/// Context of [`FacetRule::process_member`].
pub struct MemberContext<'a> {
    /// Owning type
    pub key: &'a TypeKey,
    /// Pool entry of the member
    pub candidate: CandidateId,
    /// The member
    pub member: &'a ReflectedMember,
    /// Its feature kind
    pub kind: FeatureKind,
    /// Member facets
    pub facets: &'a mut FacetHolder,
    /// Candidate members
    pub pool: &'a mut MemberPool,
    /// Build environment
    pub env: &'a RuleEnv<'a>,
}

impl MemberContext<'_> {
    /// Mark the member as fully consumed. Later rules skip it.
    pub fn consume(&mut self) -> bool {
        self.pool.remove(self.candidate)
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.member.name
    }

    /// Location of the member, for diagnostics
    pub fn location(&self) -> FeatureLocation {
        FeatureLocation::of_member(self.key, self.member.name.as_str())
    }
}

/// Context of [`FacetRule::process_parameter`].
pub struct ParameterContext<'a> {
    /// Owning type
    pub key: &'a TypeKey,
    /// Owning action
    pub member: &'a ReflectedMember,
    /// Parameter position
    pub index: usize,
    /// The parameter
    pub param: &'a ReflectedParam,
    /// Parameter facets
    pub facets: &'a mut FacetHolder,
    /// Candidate members
    pub pool: &'a mut MemberPool,
    /// Build environment
    pub env: &'a RuleEnv<'a>,
}

impl ParameterContext<'_> {
    /// Location of the parameter, for diagnostics
    pub fn location(&self) -> FeatureLocation {
        FeatureLocation::of_parameter(self.key, self.member.name.as_str(), self.index)
    }
}

/// An inspection rule.
///
/// Rules are stateless and shared between concurrent builds. Every hook is
/// optional; an `Err` is recorded against the feature and the pipeline moves
/// on to the next rule.
pub trait FacetRule: Send + Sync {
    /// Return the rule's static metadata.
    fn meta(&self) -> &RuleMeta;

    /// Inspect the type as a whole.
    fn process_type(&self, _ctx: &mut TypeContext<'_>) -> Result<(), RuleError> {
        Ok(())
    }

    /// Inspect one member whose kind matches the rule's interest.
    fn process_member(&self, _ctx: &mut MemberContext<'_>) -> Result<(), RuleError> {
        Ok(())
    }

    /// Inspect one action parameter.
    fn process_parameter(&self, _ctx: &mut ParameterContext<'_>) -> Result<(), RuleError> {
        Ok(())
    }
}
