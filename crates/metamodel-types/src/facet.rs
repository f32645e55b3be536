//! Facets: named units of behavior attached to a holder
//!
//! A facet is keyed by its [`FacetKind`]; a holder owns at most one facet per
//! kind. The payload is a small tagged [`FacetData`] value rather than a
//! per-kind type hierarchy.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::key::TypeKey;

/// Lifecycle events a domain object can expose callbacks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Instance created
    Created,
    /// Instance loaded from a store
    Loaded,
    /// About to be persisted for the first time
    Persisting,
    /// Persisted for the first time
    Persisted,
    /// About to be updated
    Updating,
    /// Updated
    Updated,
    /// About to be removed
    Removing,
    /// Removed
    Removed,
}

impl LifecycleEvent {
    /// All events
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::Created,
        LifecycleEvent::Loaded,
        LifecycleEvent::Persisting,
        LifecycleEvent::Persisted,
        LifecycleEvent::Updating,
        LifecycleEvent::Updated,
        LifecycleEvent::Removing,
        LifecycleEvent::Removed,
    ];

    /// Lowercase event name, also the conventional callback method name
    pub fn name(self) -> &'static str {
        match self {
            LifecycleEvent::Created => "created",
            LifecycleEvent::Loaded => "loaded",
            LifecycleEvent::Persisting => "persisting",
            LifecycleEvent::Persisted => "persisted",
            LifecycleEvent::Updating => "updating",
            LifecycleEvent::Updated => "updated",
            LifecycleEvent::Removing => "removing",
            LifecycleEvent::Removed => "removed",
        }
    }
}

/// Stable symbolic key of a facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    /// How an instance is titled
    Title,
    /// Display name
    Named,
    /// Longer human-readable description
    Description,
    /// Element is hidden
    Hidden,
    /// Element is read-only
    Disabled,
    /// Element validates proposed values/arguments
    Validate,
    /// Element has a default value
    Default,
    /// Element offers choices
    Choices,
    /// A value is required
    Mandatory,
    /// Maximum length of a textual value
    MaxLength,
    /// Instances cannot be modified
    Immutable,
    /// Values can be encoded to a string form
    Encodable,
    /// Values can be parsed from a string form
    Parseable,
    /// Declared value type
    TypeOf,
    /// Element type of a collection
    ElementType,
    /// How a property value is read
    PropertyAccessor,
    /// How a property value is written
    PropertySetter,
    /// How a collection is read
    CollectionAccessor,
    /// How an action is invoked
    ActionInvocation,
    /// Lifecycle callback
    Callback(LifecycleEvent),
    /// Facet kind contributed by a host-specific rule
    Custom(&'static str),
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FacetKind::Callback(event) => return write!(f, "callback:{}", event.name()),
            FacetKind::Custom(name) => return write!(f, "custom:{}", name),
            FacetKind::Title => "title",
            FacetKind::Named => "named",
            FacetKind::Description => "description",
            FacetKind::Hidden => "hidden",
            FacetKind::Disabled => "disabled",
            FacetKind::Validate => "validate",
            FacetKind::Default => "default",
            FacetKind::Choices => "choices",
            FacetKind::Mandatory => "mandatory",
            FacetKind::MaxLength => "max_length",
            FacetKind::Immutable => "immutable",
            FacetKind::Encodable => "encodable",
            FacetKind::Parseable => "parseable",
            FacetKind::TypeOf => "type_of",
            FacetKind::ElementType => "element_type",
            FacetKind::PropertyAccessor => "property_accessor",
            FacetKind::PropertySetter => "property_setter",
            FacetKind::CollectionAccessor => "collection_accessor",
            FacetKind::ActionInvocation => "action_invocation",
        };
        f.write_str(name)
    }
}

/// Kind-specific payload of a facet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FacetData {
    /// Presence is the whole meaning
    Marker,
    /// A literal text value
    Text(String),
    /// An integer value
    Integer(i64),
    /// A reference to another type, by key
    Type(TypeKey),
    /// A single supporting method
    Method(String),
    /// Several contributing methods, in contribution order
    Methods(Vec<String>),
    /// Anything else a host rule wants to carry
    Value(Value),
}

/// A unit of behavior attached to a holder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    kind: FacetKind,
    data: FacetData,
    origin: &'static str,
}

impl Facet {
    /// Create a facet contributed by the rule named `origin`
    pub fn new(kind: FacetKind, data: FacetData, origin: &'static str) -> Self {
        Self { kind, data, origin }
    }

    /// A marker facet
    pub fn marker(kind: FacetKind, origin: &'static str) -> Self {
        Self::new(kind, FacetData::Marker, origin)
    }

    /// A facet carrying literal text
    pub fn text(kind: FacetKind, text: impl Into<String>, origin: &'static str) -> Self {
        Self::new(kind, FacetData::Text(text.into()), origin)
    }

    /// A facet backed by one supporting method
    pub fn method(kind: FacetKind, method: impl Into<String>, origin: &'static str) -> Self {
        Self::new(kind, FacetData::Method(method.into()), origin)
    }

    /// A facet referencing a type
    pub fn type_ref(kind: FacetKind, key: TypeKey, origin: &'static str) -> Self {
        Self::new(kind, FacetData::Type(key), origin)
    }

    /// Facet kind
    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// Payload
    pub fn data(&self) -> &FacetData {
        &self.data
    }

    /// Mutable payload, for rules that extend an existing facet
    pub fn data_mut(&mut self) -> &mut FacetData {
        &mut self.data
    }

    /// Name of the rule that contributed this facet
    pub fn origin(&self) -> &'static str {
        self.origin
    }

    /// Text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            FacetData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Single-method payload, if any
    pub fn as_method(&self) -> Option<&str> {
        match &self.data {
            FacetData::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Type payload, if any
    pub fn as_type(&self) -> Option<&TypeKey> {
        match &self.data {
            FacetData::Type(key) => Some(key),
            _ => None,
        }
    }

    /// Integer payload, if any
    pub fn as_integer(&self) -> Option<i64> {
        match &self.data {
            FacetData::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Methods contributing to this facet: one for `Method`, all for `Methods`
    pub fn methods(&self) -> &[String] {
        match &self.data {
            FacetData::Method(method) => std::slice::from_ref(method),
            FacetData::Methods(methods) => methods,
            _ => &[],
        }
    }
}
