//! Error types for metamodel construction
//!
//! None of these escape [`SpecificationLoader::specification_for`]: rule
//! errors become diagnostics, fatal construction errors become `Invalid` stub
//! specifications. They surface only from the fallible helper APIs.
//!
//! [`SpecificationLoader::specification_for`]: crate::loader::SpecificationLoader::specification_for

use metamodel_types::TypeKey;
use thiserror::Error;

/// Errors raised by a [`TypeSource`](crate::source::TypeSource)
#[derive(Debug, Error)]
pub enum SourceError {
    /// The type is not known to the source
    #[error("Unknown type: {key}")]
    UnknownType {
        /// Requested type
        key: TypeKey,
    },

    /// The source could not describe the type
    #[error("Cannot reflect type {key}: {reason}")]
    Unreflectable {
        /// Requested type
        key: TypeKey,
        /// Why reflection failed
        reason: String,
    },

    /// A JSON type description could not be parsed
    #[error("Invalid type description: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal errors of raw type introspection
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The root type could not be reflected
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The root type description is structurally broken
    #[error("Malformed type {key}: {reason}")]
    Malformed {
        /// Offending type
        key: TypeKey,
        /// What is broken
        reason: String,
    },
}

/// Recoverable error raised by one rule for one feature
#[derive(Debug, Error)]
pub enum RuleError {
    /// An attribute carries a value the rule cannot interpret
    #[error("Invalid attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute name
        name: String,
        /// Why the value is unusable
        reason: String,
    },

    /// A supporting member has an unexpected shape
    #[error("Invalid supporting method '{method}': {reason}")]
    InvalidSupport {
        /// Method name
        method: String,
        /// What is wrong with it
        reason: String,
    },

    /// Anything else
    #[error("{0}")]
    Failed(String),
}

impl RuleError {
    /// Free-form rule failure
    pub fn failed(message: impl Into<String>) -> Self {
        RuleError::Failed(message.into())
    }
}

/// Errors waiting on a specification
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    /// The calling thread is itself building the requested type
    #[error("Re-entrant wait on {key}: the calling thread is building it")]
    Reentrant {
        /// Requested type
        key: TypeKey,
    },

    /// The specification did not finish building in time
    #[error("Timed out waiting for {key}")]
    Timeout {
        /// Requested type
        key: TypeKey,
    },
}

/// Errors assembling a programming model
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A rule with the same name is already registered
    #[error("Rule '{0}' is already registered")]
    DuplicateRule(String),

    /// A placement refers to a rule that is not registered
    #[error("No rule named '{0}' to place relative to")]
    UnknownAnchor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = IntrospectError::from(SourceError::UnknownType {
            key: TypeKey::new("shop.Ghost"),
        });
        assert_eq!(err.to_string(), "Unknown type: shop.Ghost");

        let err = LoadError::Reentrant {
            key: TypeKey::new("Node"),
        };
        assert!(err.to_string().contains("Node"));

        assert_eq!(RuleError::failed("boom").to_string(), "boom");
    }
}
