//! Facet holders
//!
//! Every structural element (type, member, parameter) owns one
//! [`FacetHolder`]. Attaching a facet of a kind that is already present
//! replaces it: rule order decides precedence. A holder is frozen once its
//! specification is published; mutating a frozen holder is a programming
//! error.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;

use crate::facet::{Facet, FacetKind};

/// Container owning at most one facet per facet kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetHolder {
    facets: BTreeMap<FacetKind, Facet>,
    frozen: bool,
}

impl FacetHolder {
    /// Create an empty, mutable holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a facet, replacing any facet of the same kind.
    ///
    /// Returns the replaced facet.
    pub fn add_facet(&mut self, facet: Facet) -> Option<Facet> {
        if !self.check_mutable("add", facet.kind()) {
            return None;
        }
        self.facets.insert(facet.kind(), facet)
    }

    /// Extend the facet of `kind`, creating it with `init` first if absent
    pub fn extend_facet(
        &mut self,
        kind: FacetKind,
        init: impl FnOnce() -> Facet,
        extend: impl FnOnce(&mut Facet),
    ) {
        if !self.check_mutable("extend", kind) {
            return;
        }
        let facet = self.facets.entry(kind).or_insert_with(init);
        extend(facet);
    }

    /// Detach the facet of `kind`
    pub fn remove_facet(&mut self, kind: FacetKind) -> Option<Facet> {
        if !self.check_mutable("remove", kind) {
            return None;
        }
        self.facets.remove(&kind)
    }

    /// Facet of `kind`, if attached
    pub fn get_facet(&self, kind: FacetKind) -> Option<&Facet> {
        self.facets.get(&kind)
    }

    /// Whether a facet of `kind` is attached
    pub fn contains_facet(&self, kind: FacetKind) -> bool {
        self.facets.contains_key(&kind)
    }

    /// Attached facets in kind order
    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.facets.values()
    }

    /// Attached facet kinds in order
    pub fn kinds(&self) -> impl Iterator<Item = FacetKind> + '_ {
        self.facets.keys().copied()
    }

    /// Number of attached facets
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether no facet is attached
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Make the holder read-only
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the holder is read-only
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn check_mutable(&self, op: &str, kind: FacetKind) -> bool {
        if self.frozen {
            debug_assert!(false, "{op} of facet '{kind}' on a frozen holder");
            tracing::error!(facet = %kind, op, "refusing to mutate a frozen facet holder");
            return false;
        }
        true
    }
}

impl Serialize for FacetHolder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.facets.len()))?;
        for facet in self.facets.values() {
            seq.serialize_element(facet)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::FacetData;

    #[test]
    fn test_last_writer_wins() {
        let mut holder = FacetHolder::new();
        assert!(holder
            .add_facet(Facet::method(FacetKind::Title, "title", "title-method"))
            .is_none());

        let replaced = holder.add_facet(Facet::text(FacetKind::Title, "Customer", "title-attribute"));
        assert_eq!(replaced.unwrap().origin(), "title-method");
        assert_eq!(holder.len(), 1);

        let title = holder.get_facet(FacetKind::Title).unwrap();
        assert_eq!(title.as_text(), Some("Customer"));
        assert_eq!(title.origin(), "title-attribute");
    }

    #[test]
    fn test_extend_accumulates() {
        let mut holder = FacetHolder::new();
        for method in ["created", "onCreated"] {
            holder.extend_facet(
                FacetKind::Custom("init"),
                || Facet::new(FacetKind::Custom("init"), FacetData::Methods(vec![]), "test"),
                |facet| {
                    if let FacetData::Methods(methods) = facet.data_mut() {
                        methods.push(method.to_string());
                    }
                },
            );
        }
        let facet = holder.get_facet(FacetKind::Custom("init")).unwrap();
        assert_eq!(facet.methods().len(), 2);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::marker(FacetKind::Mandatory, "test"));
        assert!(holder.contains_facet(FacetKind::Mandatory));
        assert!(holder.remove_facet(FacetKind::Mandatory).is_some());
        assert!(!holder.contains_facet(FacetKind::Mandatory));
        assert!(holder.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "frozen holder")]
    fn test_frozen_holder_rejects_mutation() {
        let mut holder = FacetHolder::new();
        holder.freeze();
        holder.add_facet(Facet::marker(FacetKind::Hidden, "test"));
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::marker(FacetKind::Hidden, "a"));
        holder.add_facet(Facet::text(FacetKind::Named, "Name", "b"));
        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }
}
