//! Reflected type descriptions
//!
//! This is the input contract of the metamodel builder: whatever reflection
//! mechanism the host has, it describes each domain type as a
//! [`ReflectedType`] with its direct supertypes and declared members.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attribute::AttributeBag;
use crate::key::TypeKey;

/// Reflective shape of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberShape {
    /// A directly exposed field
    Field,
    /// The getter half of a getter/setter pair
    Accessor,
    /// The setter half of a getter/setter pair
    Mutator,
    /// An ordinary method
    Method,
}

/// Declared type of a member, parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    /// No value (void return)
    Void,
    /// A single value of the given type
    Value(TypeKey),
    /// A collection whose elements are of the given type
    Collection(TypeKey),
}

impl TypeRef {
    /// Single value of `key`
    pub fn value(key: impl Into<TypeKey>) -> Self {
        TypeRef::Value(key.into())
    }

    /// Collection of `key`
    pub fn collection(key: impl Into<TypeKey>) -> Self {
        TypeRef::Collection(key.into())
    }

    /// The referenced type, if any
    pub fn referenced(&self) -> Option<&TypeKey> {
        match self {
            TypeRef::Void => None,
            TypeRef::Value(key) | TypeRef::Collection(key) => Some(key),
        }
    }

    /// Whether this is a collection type
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Collection(_))
    }

    /// Whether this is void
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }
}

/// A declared parameter of a method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Parameter attributes
    #[serde(default, skip_serializing_if = "AttributeBag::is_empty")]
    pub attributes: AttributeBag,
}

impl ReflectedParam {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            attributes: AttributeBag::new(),
        }
    }

    /// Builder-style attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value);
        self
    }
}

fn default_accessible() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// A declared member of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedMember {
    /// Member identifier as declared
    pub name: String,
    /// Reflective shape
    pub shape: MemberShape,
    /// Declared type (for fields/accessors) or return type (for methods)
    pub returns: TypeRef,
    /// Declared parameters, in position order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ReflectedParam>,
    /// Member attributes
    #[serde(default, skip_serializing_if = "AttributeBag::is_empty")]
    pub attributes: AttributeBag,
    /// Whether reflection can reach this member
    #[serde(default = "default_accessible", skip_serializing_if = "is_true")]
    pub accessible: bool,
}

impl ReflectedMember {
    fn with_shape(name: impl Into<String>, shape: MemberShape, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            shape,
            returns,
            params: Vec::new(),
            attributes: AttributeBag::new(),
            accessible: true,
        }
    }

    /// A directly exposed field
    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::with_shape(name, MemberShape::Field, ty)
    }

    /// A getter
    pub fn accessor(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::with_shape(name, MemberShape::Accessor, ty)
    }

    /// A setter taking one value of `ty`
    pub fn mutator(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::with_shape(name, MemberShape::Mutator, TypeRef::Void).param("value", ty)
    }

    /// An ordinary method
    pub fn method(name: impl Into<String>, returns: TypeRef) -> Self {
        Self::with_shape(name, MemberShape::Method, returns)
    }

    /// Builder-style parameter
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ReflectedParam::new(name, ty));
        self
    }

    /// Builder-style fully specified parameter
    pub fn with_param(mut self, param: ReflectedParam) -> Self {
        self.params.push(param);
        self
    }

    /// Builder-style attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Mark the member as unreachable by reflection
    pub fn inaccessible(mut self) -> Self {
        self.accessible = false;
        self
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Override identity: name plus arity
    pub fn signature(&self) -> (&str, usize) {
        (&self.name, self.arity())
    }
}

/// Raw description of one domain type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedType {
    /// Type identity
    pub key: TypeKey,
    /// Direct supertypes, most significant first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeKey>,
    /// Declared members, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ReflectedMember>,
    /// Type-level attributes
    #[serde(default, skip_serializing_if = "AttributeBag::is_empty")]
    pub attributes: AttributeBag,
}

impl ReflectedType {
    /// Create an empty type description
    pub fn new(key: impl Into<TypeKey>) -> Self {
        Self {
            key: key.into(),
            supertypes: Vec::new(),
            members: Vec::new(),
            attributes: AttributeBag::new(),
        }
    }

    /// Builder-style supertype
    pub fn extends(mut self, supertype: impl Into<TypeKey>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Builder-style member
    pub fn member(mut self, member: ReflectedMember) -> Self {
        self.members.push(member);
        self
    }

    /// Builder-style attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value);
        self
    }
}
