//! Validation pass over a closed set of built specifications.
//!
//! Validators are read-only: they see a [`SpecGraph`] snapshot and append
//! failures. Each validator runs independently; a panicking validator is
//! recorded and the others still run.

use metamodel_types::TypeKey;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::diagnostic::{Diagnostic, FailureSet, FeatureLocation};
use crate::spec::Specification;

/// Location used for failures that concern the graph as a whole
pub const GRAPH_LOCATION: &str = "<metamodel>";

/// A check over the built graph.
pub trait Validator: Send + Sync {
    /// Validator name, used as the origin of its failures.
    fn name(&self) -> &'static str;

    /// Append failures found in `graph`.
    fn validate(&self, graph: &SpecGraph, failures: &mut FailureSet);
}

/// Read-only view of built specifications, keyed and sorted by type key
#[derive(Debug, Clone, Default)]
pub struct SpecGraph {
    specs: BTreeMap<TypeKey, Arc<Specification>>,
}

impl SpecGraph {
    /// Build a graph from specifications
    pub fn new(specs: impl IntoIterator<Item = Arc<Specification>>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.key().clone(), spec))
                .collect(),
        }
    }

    /// Specification of `key`
    pub fn get(&self, key: &TypeKey) -> Option<&Specification> {
        self.specs.get(key).map(Arc::as_ref)
    }

    /// Whether `key` is part of the graph
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.specs.contains_key(key)
    }

    /// Specifications in key order
    pub fn iter(&self) -> impl Iterator<Item = &Specification> {
        self.specs.values().map(Arc::as_ref)
    }

    /// Number of specifications
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Run every validator over `graph` and concatenate their failures.
pub fn validate(validators: &[Box<dyn Validator>], graph: &SpecGraph) -> FailureSet {
    let mut failures = FailureSet::new();
    for validator in validators {
        let mut found = FailureSet::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            validator.validate(graph, &mut found);
        }));
        failures.append(found);
        if outcome.is_err() {
            tracing::warn!(validator = validator.name(), "validator panicked");
            failures.push(Diagnostic::error(
                validator.name(),
                FeatureLocation::of_type(&TypeKey::new(GRAPH_LOCATION)),
                "validator panicked",
            ));
        }
    }
    tracing::debug!(
        types = graph.len(),
        failures = failures.len(),
        "validation pass finished"
    );
    failures
}
