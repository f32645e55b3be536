//! Metamodel Types
//!
//! Leaf data for the metamodel builder: the feature taxonomy, type keys,
//! attribute bags, reflected type descriptions, facets and facet holders.
//!
//! Nothing in this crate knows how a specification is built. The engine crate
//! feeds [`ReflectedType`] descriptions through an ordered rule pipeline and
//! attaches [`Facet`]s to [`FacetHolder`]s.

#![warn(missing_docs)]

pub mod attribute;
pub mod facet;
pub mod feature;
pub mod holder;
pub mod key;
pub mod reflect;

pub use attribute::AttributeBag;
pub use facet::{Facet, FacetData, FacetKind, LifecycleEvent};
pub use feature::{kind_of, FeatureKind, FeatureSelector};
pub use holder::FacetHolder;
pub use key::TypeKey;
pub use reflect::{MemberShape, ReflectedMember, ReflectedParam, ReflectedType, TypeRef};
