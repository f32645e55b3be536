//! Built specifications
//!
//! A [`Specification`] is the immutable description of one type: identity,
//! supertypes, members with their facets and the type's own facets. Other
//! specifications are referenced by [`TypeKey`] only, so cyclic type graphs
//! need no owning pointers.

use metamodel_types::{Facet, FacetHolder, FacetKind, FeatureKind, TypeKey, TypeRef};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::diagnostic::{Diagnostic, FeatureLocation, ORIGIN_LOADER};

/// One parameter of an action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Position, zero-based
    pub index: usize,
    /// Declared name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Facets
    pub facets: FacetHolder,
}

/// One property, collection or action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    /// Member id, unique within the type
    pub id: String,
    /// Feature kind
    pub kind: FeatureKind,
    /// Most-derived declaring type
    pub declared_by: TypeKey,
    /// Declared value or return type
    pub returns: TypeRef,
    /// Facets
    pub facets: FacetHolder,
    /// Parameters, actions only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl Member {
    /// Facet of `kind`
    pub fn facet(&self, kind: FacetKind) -> Option<&Facet> {
        self.facets.get_facet(kind)
    }

    /// Element type of a collection, from its `ElementType` facet or its
    /// declared type
    pub fn element_type(&self) -> Option<&TypeKey> {
        if self.kind != FeatureKind::Collection {
            return None;
        }
        self.facets
            .get_facet(FacetKind::ElementType)
            .and_then(Facet::as_type)
            .or_else(|| self.returns.referenced())
    }

    /// Every type key this member mentions
    pub fn referenced_types(&self) -> impl Iterator<Item = &TypeKey> {
        self.returns
            .referenced()
            .into_iter()
            .chain(self.parameters.iter().filter_map(|p| p.ty.referenced()))
    }
}

/// Immutable description of one type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Specification {
    key: TypeKey,
    supertypes: Vec<TypeKey>,
    ancestry: Vec<TypeKey>,
    facets: FacetHolder,
    members: Vec<Member>,
    diagnostics: Vec<Diagnostic>,
    stub: bool,
}

impl Specification {
    pub(crate) fn new(
        key: TypeKey,
        supertypes: Vec<TypeKey>,
        ancestry: Vec<TypeKey>,
        facets: FacetHolder,
        members: Vec<Member>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            key,
            supertypes,
            ancestry,
            facets,
            members,
            diagnostics,
            stub: false,
        }
    }

    /// Identity-only stand-in for a type that could not be built
    pub fn stub(key: TypeKey, reason: impl Into<String>) -> Self {
        let diagnostic = Diagnostic::fatal(ORIGIN_LOADER, FeatureLocation::of_type(&key), reason);
        let mut spec = Self::new(key, Vec::new(), Vec::new(), FacetHolder::new(), Vec::new(), vec![diagnostic]);
        spec.stub = true;
        spec.freeze();
        spec
    }

    /// Type identity
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Direct supertypes
    pub fn supertypes(&self) -> &[TypeKey] {
        &self.supertypes
    }

    /// All reachable ancestors, breadth-first
    pub fn ancestry(&self) -> &[TypeKey] {
        &self.ancestry
    }

    /// Whether this type is `key` or inherits from it
    pub fn is_subtype_of(&self, key: &TypeKey) -> bool {
        &self.key == key || self.ancestry.contains(key)
    }

    /// The type's own facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    /// Type-level facet of `kind`
    pub fn facet_of_type(&self, kind: FacetKind) -> Option<&Facet> {
        self.facets.get_facet(kind)
    }

    /// All members in declaration order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Member by id
    pub fn member_at(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    /// Members of one kind, in declaration order
    pub fn members_of(&self, kind: FeatureKind) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(move |member| member.kind == kind)
    }

    /// Problems recorded while building this type
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether this is an identity-only stand-in for a failed build
    pub fn is_stub(&self) -> bool {
        self.stub
    }

    /// Hex SHA-256 over the canonical JSON rendering of this specification.
    ///
    /// Two builds of the same type from the same inputs have equal
    /// fingerprints.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub(crate) fn freeze(&mut self) {
        self.facets.freeze();
        for member in &mut self.members {
            member.facets.freeze();
            for parameter in &mut member.parameters {
                parameter.facets.freeze();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Specification {
        let mut facets = FacetHolder::new();
        facets.add_facet(Facet::text(FacetKind::Title, "Tree", "test"));

        let mut children = FacetHolder::new();
        children.add_facet(Facet::type_ref(FacetKind::ElementType, TypeKey::new("Node"), "test"));

        let members = vec![
            Member {
                id: "parent".into(),
                kind: FeatureKind::ScalarProperty,
                declared_by: TypeKey::new("Node"),
                returns: TypeRef::value("Node"),
                facets: FacetHolder::new(),
                parameters: vec![],
            },
            Member {
                id: "children".into(),
                kind: FeatureKind::Collection,
                declared_by: TypeKey::new("Node"),
                returns: TypeRef::collection("Node"),
                facets: children,
                parameters: vec![],
            },
        ];

        let mut spec = Specification::new(
            TypeKey::new("Node"),
            vec![TypeKey::new("Entity")],
            vec![TypeKey::new("Entity")],
            facets,
            members,
            vec![],
        );
        spec.freeze();
        spec
    }

    #[test]
    fn test_member_queries() {
        let spec = sample();
        assert_eq!(spec.members().len(), 2);
        assert_eq!(spec.members_of(FeatureKind::Collection).count(), 1);
        assert_eq!(
            spec.member_at("children").and_then(Member::element_type),
            Some(&TypeKey::new("Node"))
        );
        assert_eq!(spec.member_at("parent").and_then(Member::element_type), None);
        assert!(spec.member_at("missing").is_none());
        assert_eq!(
            spec.facet_of_type(FacetKind::Title).and_then(Facet::as_text),
            Some("Tree")
        );
    }

    #[test]
    fn test_subtyping_and_freeze() {
        let spec = sample();
        assert!(spec.is_subtype_of(&TypeKey::new("Node")));
        assert!(spec.is_subtype_of(&TypeKey::new("Entity")));
        assert!(!spec.is_subtype_of(&TypeKey::new("Order")));
        assert!(spec.facets().is_frozen());
        assert!(spec.members().iter().all(|m| m.facets.is_frozen()));
    }

    #[test]
    fn test_stub_and_fingerprint() {
        let stub = Specification::stub(TypeKey::new("Ghost"), "unknown type");
        assert!(stub.is_stub());
        assert!(stub.members().is_empty());
        assert_eq!(stub.diagnostics().len(), 1);
        assert!(stub.diagnostics()[0].is_disqualifying());

        let fingerprint = sample().fingerprint().unwrap();
        assert_eq!(fingerprint, sample().fingerprint().unwrap());
        assert_ne!(fingerprint, stub.fingerprint().unwrap());
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
