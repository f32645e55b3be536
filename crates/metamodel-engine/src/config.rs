//! Metamodel configuration, loaded from the `[metamodel]` table of a TOML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// What happens to members no rule fully consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnconsumedPolicy {
    /// Keep leftover features as generic members
    #[default]
    Fold,
    /// Drop leftover members and report them as anomalies
    Report,
}

/// Configuration of the metamodel builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MetamodelConfig {
    /// Unconsumed-member policy
    pub unconsumed: UnconsumedPolicy,
    /// Deadline for a pre-warm build phase, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_deadline_ms: Option<u64>,
    /// Rules left out of the programming model
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_rules: Vec<String>,
    /// Validators left out of the programming model
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_validators: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    metamodel: MetamodelConfig,
}

impl MetamodelConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. A missing `[metamodel]` table yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.metamodel.validate()?;
        Ok(file.metamodel)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.build_deadline_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "build-deadline-ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the unconsumed-member policy
    pub fn with_unconsumed(mut self, policy: UnconsumedPolicy) -> Self {
        self.unconsumed = policy;
        self
    }

    /// Set the build deadline
    pub fn with_build_deadline(mut self, deadline: Duration) -> Self {
        self.build_deadline_ms = Some(u64::try_from(deadline.as_millis().max(1)).unwrap_or(u64::MAX));
        self
    }

    /// Disable a rule by name
    pub fn disable_rule(mut self, name: impl Into<String>) -> Self {
        self.disabled_rules.push(name.into());
        self
    }

    /// Disable a validator by name
    pub fn disable_validator(mut self, name: impl Into<String>) -> Self {
        self.disabled_validators.push(name.into());
        self
    }

    /// Whether a rule is disabled
    pub fn is_disabled(&self, rule_name: &str) -> bool {
        self.disabled_rules.iter().any(|name| name == rule_name)
    }

    /// Whether a validator is disabled
    pub fn is_validator_disabled(&self, validator_name: &str) -> bool {
        self.disabled_validators.iter().any(|name| name == validator_name)
    }

    /// Build deadline, if any
    pub fn build_deadline(&self) -> Option<Duration> {
        self.build_deadline_ms.map(Duration::from_millis)
    }
}
