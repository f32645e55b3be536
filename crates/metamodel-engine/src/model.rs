//! Programming model: the ordered rule list and the validator set.
//!
//! Rule order is the only source of precedence. Hosts insert their own rules
//! relative to named built-in rules with a [`Placement`].

use crate::config::MetamodelConfig;
use crate::error::ModelError;
use crate::rule::FacetRule;
use crate::rules;
use crate::validate::Validator;
use crate::validators;

/// Where to insert a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before every registered rule
    First,
    /// After every registered rule
    Last,
    /// Immediately before the named rule
    Before(&'static str),
    /// Immediately after the named rule
    After(&'static str),
}

/// Ordered inspection rules plus validators
pub struct ProgrammingModel {
    rules: Vec<Box<dyn FacetRule>>,
    validators: Vec<Box<dyn Validator>>,
    config: MetamodelConfig,
}

impl ProgrammingModel {
    /// An empty model: no rules, no validators, default configuration.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            validators: Vec::new(),
            config: MetamodelConfig::default(),
        }
    }

    /// Every built-in rule and validator with default configuration.
    pub fn default_model() -> Self {
        Self::with_config(MetamodelConfig::default())
    }

    /// Built-in rules and validators minus those disabled by `config`.
    pub fn with_config(config: MetamodelConfig) -> Self {
        let rules = rules::all_rules()
            .into_iter()
            .filter(|rule| !config.is_disabled(rule.meta().name))
            .collect();
        let validators = validators::all_validators()
            .into_iter()
            .filter(|validator| !config.is_validator_disabled(validator.name()))
            .collect();
        Self {
            rules,
            validators,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MetamodelConfig {
        &self.config
    }

    /// Replace the configuration without touching the rule list
    pub fn set_config(&mut self, config: MetamodelConfig) {
        self.config = config;
    }

    /// Register a rule at `placement`.
    ///
    /// A rule disabled by the configuration is silently left out.
    pub fn register_rule(
        &mut self,
        rule: Box<dyn FacetRule>,
        placement: Placement,
    ) -> Result<(), ModelError> {
        let name = rule.meta().name;
        if self.position(name).is_some() {
            return Err(ModelError::DuplicateRule(name.to_string()));
        }
        if self.config.is_disabled(name) {
            tracing::debug!(rule = name, "rule disabled by configuration");
            return Ok(());
        }
        let index = match placement {
            Placement::First => 0,
            Placement::Last => self.rules.len(),
            Placement::Before(anchor) => self
                .position(anchor)
                .ok_or_else(|| ModelError::UnknownAnchor(anchor.to_string()))?,
            Placement::After(anchor) => {
                self.position(anchor)
                    .ok_or_else(|| ModelError::UnknownAnchor(anchor.to_string()))?
                    + 1
            }
        };
        self.rules.insert(index, rule);
        Ok(())
    }

    /// Builder-style [`register_rule`](Self::register_rule)
    pub fn with_rule(
        mut self,
        rule: Box<dyn FacetRule>,
        placement: Placement,
    ) -> Result<Self, ModelError> {
        self.register_rule(rule, placement)?;
        Ok(self)
    }

    /// Remove a rule by name
    pub fn remove_rule(&mut self, name: &str) -> Option<Box<dyn FacetRule>> {
        let index = self.position(name)?;
        Some(self.rules.remove(index))
    }

    /// Append a validator
    pub fn register_validator(&mut self, validator: Box<dyn Validator>) {
        if self.config.is_validator_disabled(validator.name()) {
            return;
        }
        self.validators.push(validator);
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[Box<dyn FacetRule>] {
        &self.rules
    }

    /// Rule names in registration order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.meta().name).collect()
    }

    /// Validators in registration order
    pub fn validators(&self) -> &[Box<dyn Validator>] {
        &self.validators
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.meta().name == name)
    }
}

impl Default for ProgrammingModel {
    fn default() -> Self {
        Self::default_model()
    }
}
