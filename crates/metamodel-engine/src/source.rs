//! Type sources
//!
//! The builder never reflects on anything itself. A [`TypeSource`] hands it
//! raw [`ReflectedType`] descriptions and resolves names to canonical keys.

use metamodel_types::{ReflectedType, TypeKey};
use rustc_hash::FxHashMap;

use crate::error::SourceError;

/// Provider of raw type descriptions
pub trait TypeSource: Send + Sync {
    /// Describe one type
    fn reflect(&self, key: &TypeKey) -> Result<ReflectedType, SourceError>;

    /// Resolve a (possibly abbreviated) name to a canonical key
    fn resolve(&self, name: &str) -> Option<TypeKey>;

    /// Whether `key` can be reflected
    fn is_known(&self, key: &TypeKey) -> bool;
}

/// Value types registered by [`TypeRegistry::with_builtin_values`]
pub const BUILTIN_VALUE_TYPES: &[&str] = &["string", "int", "decimal", "bool", "date", "datetime"];

/// In-memory type source
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeKey, ReflectedType>,
    aliases: FxHashMap<String, TypeKey>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the builtin value types.
    ///
    /// Each carries the `value` attribute so the default programming model
    /// gives it encodable/parseable semantics.
    pub fn with_builtin_values() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_VALUE_TYPES {
            registry.register(ReflectedType::new(*name).attribute("value", *name));
        }
        registry
    }

    /// Parse a JSON array of type descriptions into a registry
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let types: Vec<ReflectedType> = serde_json::from_str(json)?;
        let mut registry = Self::with_builtin_values();
        for ty in types {
            registry.register(ty);
        }
        Ok(registry)
    }

    /// Register (or replace) a type description
    pub fn register(&mut self, ty: ReflectedType) {
        self.types.insert(ty.key.clone(), ty);
    }

    /// Builder-style register
    pub fn with(mut self, ty: ReflectedType) -> Self {
        self.register(ty);
        self
    }

    /// Register an alternative name for a key
    pub fn alias(&mut self, name: impl Into<String>, key: TypeKey) {
        self.aliases.insert(name.into(), key);
    }

    /// All registered keys, sorted
    pub fn keys(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = self.types.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeSource for TypeRegistry {
    fn reflect(&self, key: &TypeKey) -> Result<ReflectedType, SourceError> {
        self.types
            .get(key)
            .cloned()
            .ok_or_else(|| SourceError::UnknownType { key: key.clone() })
    }

    fn resolve(&self, name: &str) -> Option<TypeKey> {
        let direct = TypeKey::new(name);
        if self.types.contains_key(&direct) {
            return Some(direct);
        }
        if let Some(key) = self.aliases.get(name) {
            return Some(key.clone());
        }
        // Fall back to a unique simple-name match
        let mut matches = self.types.keys().filter(|key| key.simple_name() == name);
        match (matches.next(), matches.next()) {
            (Some(key), None) => Some(key.clone()),
            _ => None,
        }
    }

    fn is_known(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }
}
