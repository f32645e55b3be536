//! Feature taxonomy
//!
//! Every structural element of a specification has exactly one
//! [`FeatureKind`]. Rules declare interest through a [`FeatureSelector`],
//! which is resolved to concrete kinds before matching.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reflect::{MemberShape, ReflectedMember};

/// Kind of a structural element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// The type itself
    Type,
    /// A single-valued property
    ScalarProperty,
    /// A multi-valued property
    Collection,
    /// An invokable action
    Action,
    /// A parameter of an action
    ActionParameter,
}

impl FeatureKind {
    /// All concrete kinds, in declaration order
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Type,
        FeatureKind::ScalarProperty,
        FeatureKind::Collection,
        FeatureKind::Action,
        FeatureKind::ActionParameter,
    ];

    /// Whether this kind describes a member of a type (property, collection, action)
    pub fn is_member(self) -> bool {
        matches!(
            self,
            FeatureKind::ScalarProperty | FeatureKind::Collection | FeatureKind::Action
        )
    }

    /// Whether this kind is an association (property or collection)
    pub fn is_association(self) -> bool {
        matches!(self, FeatureKind::ScalarProperty | FeatureKind::Collection)
    }

    /// Short lowercase label
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::Type => "type",
            FeatureKind::ScalarProperty => "property",
            FeatureKind::Collection => "collection",
            FeatureKind::Action => "action",
            FeatureKind::ActionParameter => "parameter",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Composite selector used by rules to declare which features they process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSelector {
    /// Exactly one kind
    Only(FeatureKind),
    /// The type only
    ObjectOnly,
    /// Properties and collections
    Associations,
    /// Properties, collections and actions
    Members,
    /// Everything except action parameters
    EveryFeatureExceptParameter,
    /// Every kind
    Everything,
    /// An explicit list of kinds
    Any(&'static [FeatureKind]),
}

impl FeatureSelector {
    /// Resolve the selector to the concrete kinds it covers
    pub fn resolve(self) -> Vec<FeatureKind> {
        FeatureKind::ALL
            .into_iter()
            .filter(|kind| self.matches(*kind))
            .collect()
    }

    /// Whether the selector covers a concrete kind
    pub fn matches(self, kind: FeatureKind) -> bool {
        match self {
            FeatureSelector::Only(only) => only == kind,
            FeatureSelector::ObjectOnly => kind == FeatureKind::Type,
            FeatureSelector::Associations => kind.is_association(),
            FeatureSelector::Members => kind.is_member(),
            FeatureSelector::EveryFeatureExceptParameter => kind != FeatureKind::ActionParameter,
            FeatureSelector::Everything => true,
            FeatureSelector::Any(kinds) => kinds.contains(&kind),
        }
    }
}

/// Classify a reflected member by its shape.
///
/// Returns `None` for shapes that are not features on their own (the setter
/// half of a getter/setter pair). Such members stay in the candidate pool for
/// rules that look for them explicitly.
pub fn kind_of(member: &ReflectedMember) -> Option<FeatureKind> {
    match member.shape {
        MemberShape::Field | MemberShape::Accessor if member.returns.is_collection() => {
            Some(FeatureKind::Collection)
        }
        MemberShape::Field | MemberShape::Accessor if member.returns.is_void() => None,
        MemberShape::Field | MemberShape::Accessor => Some(FeatureKind::ScalarProperty),
        MemberShape::Method => Some(FeatureKind::Action),
        MemberShape::Mutator => None,
    }
}
