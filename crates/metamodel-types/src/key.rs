//! Type identity keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable, globally unique identity of a domain type (its fully-qualified name).
///
/// Specifications reference each other only through keys, never through owning
/// pointers, so that cyclic type graphs stay representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Create a key from a fully-qualified type name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The fully-qualified name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, e.g. `Customer` for `shop.dom.Customer`
    pub fn simple_name(&self) -> &str {
        let name = self.as_str();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
