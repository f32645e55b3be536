//! Opaque attribute bags
//!
//! Reflection collaborators describe annotations as key/value pairs. The core
//! never interprets them; only rules ask questions such as "does this member
//! carry attribute X with value Y".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key/value attributes attached to a reflected type, member or parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag {
    entries: BTreeMap<String, Value>,
}

impl AttributeBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw attribute value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Whether the attribute is present at all
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether the attribute carries exactly this value
    pub fn has_value(&self, name: &str, value: &Value) -> bool {
        self.get(name) == Some(value)
    }

    /// String value of an attribute
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Integer value of an attribute
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Marker-style check: present and not explicitly `false`.
    ///
    /// `{"hidden": true}`, `{"hidden": null}` and `{"hidden": "because"}` all
    /// count as set; `{"hidden": false}` does not.
    pub fn is_set(&self, name: &str) -> bool {
        match self.get(name) {
            None | Some(Value::Bool(false)) => false,
            Some(_) => true,
        }
    }

    /// Iterate attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_semantics() {
        let bag = AttributeBag::new()
            .with("hidden", true)
            .with("optional", Value::Null)
            .with("disabled", false)
            .with("named", "Full Name");

        assert!(bag.is_set("hidden"));
        assert!(bag.is_set("optional"));
        assert!(!bag.is_set("disabled"));
        assert!(bag.is_set("named"));
        assert!(!bag.is_set("missing"));
    }

    #[test]
    fn test_typed_lookups() {
        let bag = AttributeBag::new().with("maxLength", 40).with("named", "Name");
        assert_eq!(bag.get_i64("maxLength"), Some(40));
        assert_eq!(bag.get_str("named"), Some("Name"));
        assert_eq!(bag.get_str("maxLength"), None);
        assert!(bag.has_value("maxLength", &json!(40)));
    }
}
