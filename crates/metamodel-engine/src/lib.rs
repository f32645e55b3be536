//! Metamodel Engine
//!
//! Builds validated, immutable [`Specification`]s of domain types:
//! - **Introspection**: flattens a type and its ancestors into candidate
//!   members (`introspect` module)
//! - **Pipeline**: runs the ordered [`FacetRule`]s of a [`ProgrammingModel`]
//!   over the type, its members and their parameters (`pipeline` module)
//! - **Loader**: caches one specification per type, tolerates cyclic type
//!   graphs and concurrent first use (`loader` module)
//! - **Validation**: read-only checks over the finished graph, aggregated
//!   into a [`FailureSet`] (`validate` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use metamodel_engine::{ProgrammingModel, SpecificationLoader, TypeRegistry};
//! use metamodel_types::{ReflectedMember, ReflectedType, TypeKey, TypeRef};
//!
//! let registry = TypeRegistry::with_builtin_values().with(
//!     ReflectedType::new("Customer")
//!         .member(ReflectedMember::accessor("name", TypeRef::value("string"))),
//! );
//! let loader = SpecificationLoader::new(Arc::new(registry), ProgrammingModel::default_model());
//!
//! let customer = loader.load(&TypeKey::new("Customer")).unwrap();
//! loader.validate();
//! print!("{}", loader.report());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod introspect;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod rule;
#[allow(missing_docs)]
pub mod rules;
pub mod source;
pub mod spec;
pub mod validate;
#[allow(missing_docs)]
pub mod validators;

pub use config::{ConfigError, MetamodelConfig, UnconsumedPolicy};
pub use diagnostic::{Diagnostic, FailureSet, FeatureLocation, Severity};
pub use error::{IntrospectError, LoadError, ModelError, RuleError, SourceError};
pub use introspect::{Introspection, Introspector};
pub use loader::{SpecHandle, SpecState, SpecificationLoader};
pub use model::{Placement, ProgrammingModel};
pub use pipeline::Pipeline;
pub use pool::{Candidate, CandidateId, MemberPool};
pub use rule::{
    DetachedResolver, FacetRule, MemberContext, ParameterContext, RuleEnv, RuleMeta,
    SpecResolver, TypeContext,
};
pub use source::{TypeRegistry, TypeSource};
pub use spec::{Member, Parameter, Specification};
pub use validate::{validate, SpecGraph, Validator};
