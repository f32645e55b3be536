//! Diagnostics and failure sets
//!
//! Construction never stops at the first problem. Rule errors, introspection
//! anomalies, fatal construction errors and validation failures are all
//! recorded as [`Diagnostic`]s and reported together as a [`FailureSet`].

use metamodel_types::TypeKey;
use serde::Serialize;
use std::fmt;

/// Origin used for diagnostics raised by raw introspection
pub const ORIGIN_INTROSPECTION: &str = "introspection";
/// Origin used for diagnostics raised by the pipeline itself
pub const ORIGIN_PIPELINE: &str = "pipeline";
/// Origin used for diagnostics raised by the loader
pub const ORIGIN_LOADER: &str = "loader";

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only
    Info,
    /// Suspicious but harmless
    Warning,
    /// The metamodel is not sound
    Error,
    /// The type could not be built at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// Where in the metamodel a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FeatureLocation {
    /// Owning type
    pub type_key: TypeKey,
    /// Member id, when the diagnostic is about a member or parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// Parameter position, when the diagnostic is about a parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<usize>,
}

impl FeatureLocation {
    /// The type itself
    pub fn of_type(type_key: &TypeKey) -> Self {
        Self {
            type_key: type_key.clone(),
            member: None,
            parameter: None,
        }
    }

    /// A member of a type
    pub fn of_member(type_key: &TypeKey, member: impl Into<String>) -> Self {
        Self {
            type_key: type_key.clone(),
            member: Some(member.into()),
            parameter: None,
        }
    }

    /// A parameter of an action
    pub fn of_parameter(type_key: &TypeKey, member: impl Into<String>, index: usize) -> Self {
        Self {
            type_key: type_key.clone(),
            member: Some(member.into()),
            parameter: Some(index),
        }
    }
}

impl fmt::Display for FeatureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_key)?;
        if let Some(member) = &self.member {
            write!(f, ".{}", member)?;
        }
        if let Some(index) = self.parameter {
            write!(f, "#{}", index)?;
        }
        Ok(())
    }
}

/// One recorded problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Rule, validator or subsystem that raised it
    pub origin: &'static str,
    /// Offending feature
    pub location: FeatureLocation,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(
        severity: Severity,
        origin: &'static str,
        location: FeatureLocation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            origin,
            location,
            message: message.into(),
        }
    }

    /// Warning-level diagnostic
    pub fn warning(origin: &'static str, location: FeatureLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, origin, location, message)
    }

    /// Error-level diagnostic
    pub fn error(origin: &'static str, location: FeatureLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, origin, location, message)
    }

    /// Fatal diagnostic
    pub fn fatal(origin: &'static str, location: FeatureLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, origin, location, message)
    }

    /// Whether this diagnostic makes the metamodel unsound
    pub fn is_disqualifying(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.location, self.origin, self.message
        )
    }
}

/// Aggregated diagnostics of a build and/or validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FailureSet {
    failures: Vec<Diagnostic>,
}

impl FailureSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.failures.push(diagnostic);
    }

    /// Append another set
    pub fn append(&mut self, other: FailureSet) {
        self.failures.extend(other.failures);
    }

    /// All diagnostics, in recording order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.failures.iter()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether no diagnostic is `Error` or worse
    pub fn is_sound(&self) -> bool {
        !self.failures.iter().any(Diagnostic::is_disqualifying)
    }

    /// Diagnostics at `Error` or worse
    pub fn disqualifying(&self) -> impl Iterator<Item = &Diagnostic> {
        self.failures.iter().filter(|d| d.is_disqualifying())
    }

    /// Diagnostics for one type (any member or parameter of it included)
    pub fn for_type<'a>(&'a self, key: &'a TypeKey) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.failures.iter().filter(move |d| &d.location.type_key == key)
    }

    /// Diagnostics whose location renders as `location`, e.g. `Widget.foo`
    pub fn at<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.failures
            .iter()
            .filter(move |d| d.location.to_string() == location)
    }

    /// Diagnostics raised by one rule or validator
    pub fn from_origin<'a>(&'a self, origin: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.failures.iter().filter(move |d| d.origin == origin)
    }

    /// Sort by location, then severity (worst first), then origin
    pub fn sort(&mut self) {
        self.failures.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then(b.severity.cmp(&a.severity))
                .then(a.origin.cmp(b.origin))
                .then(a.message.cmp(&b.message))
        });
    }

    /// Deterministic JSON report
    pub fn to_json(&self) -> serde_json::Value {
        let mut sorted = self.clone();
        sorted.sort();
        serde_json::json!({
            "sound": self.is_sound(),
            "count": self.len(),
            "failures": sorted,
        })
    }
}

impl fmt::Display for FailureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return writeln!(f, "metamodel is sound");
        }
        for failure in &self.failures {
            writeln!(f, "{}", failure)?;
        }
        let errors = self.disqualifying().count();
        writeln!(
            f,
            "{} problem(s), {} disqualifying",
            self.failures.len(),
            errors
        )
    }
}

impl Extend<Diagnostic> for FailureSet {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.failures.extend(iter);
    }
}

impl FromIterator<Diagnostic> for FailureSet {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self {
            failures: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FailureSet {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> TypeKey {
        TypeKey::new("Widget")
    }

    #[test]
    fn test_location_display() {
        assert_eq!(FeatureLocation::of_type(&widget()).to_string(), "Widget");
        assert_eq!(
            FeatureLocation::of_member(&widget(), "foo").to_string(),
            "Widget.foo"
        );
        assert_eq!(
            FeatureLocation::of_parameter(&widget(), "resize", 1).to_string(),
            "Widget.resize#1"
        );
    }

    #[test]
    fn test_soundness() {
        let mut set = FailureSet::new();
        assert!(set.is_sound());

        set.push(Diagnostic::warning(
            "test",
            FeatureLocation::of_type(&widget()),
            "suspicious",
        ));
        assert!(set.is_sound());

        set.push(Diagnostic::error(
            "test",
            FeatureLocation::of_member(&widget(), "foo"),
            "broken",
        ));
        assert!(!set.is_sound());
        assert_eq!(set.disqualifying().count(), 1);
        assert_eq!(set.at("Widget.foo").count(), 1);
        assert_eq!(set.for_type(&widget()).count(), 2);
    }

    #[test]
    fn test_json_report_is_sorted() {
        let set: FailureSet = vec![
            Diagnostic::warning("b", FeatureLocation::of_member(&widget(), "z"), "late"),
            Diagnostic::error("a", FeatureLocation::of_type(&widget()), "early"),
        ]
        .into_iter()
        .collect();

        let json = set.to_json();
        assert_eq!(json["sound"], false);
        assert_eq!(json["count"], 2);
        assert_eq!(json["failures"][0]["message"], "early");
    }
}
