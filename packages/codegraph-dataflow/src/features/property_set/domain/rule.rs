//! Rule definition
//!
//! ```yaml
//! id: insecure-deserializer
//! type_name: Serializer
//! guard_field: Binder
//! hazardous_methods: [Deserialize]
//! ```

use crate::config::{ConfigError, ConfigResult, Validatable};
use crate::features::flow_graph::MethodRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HazardousUsageRule {
    pub id: String,
    /// Type whose instances are tracked
    pub type_name: String,
    /// Property that makes the object safe when set to a non-null value
    pub guard_field: String,
    /// Methods that are hazardous on a flagged receiver
    pub hazardous_methods: Vec<String>,
    /// Methods that are hazardous when a flagged object is passed as an argument
    #[serde(default)]
    pub hazardous_argument_methods: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HazardousUsageRule {
    pub fn new(
        id: impl Into<String>,
        type_name: impl Into<String>,
        guard_field: impl Into<String>,
        hazardous_methods: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            guard_field: guard_field.into(),
            hazardous_methods: hazardous_methods.iter().map(|m| m.to_string()).collect(),
            hazardous_argument_methods: Vec::new(),
            message: None,
        }
    }

    pub fn with_argument_methods(mut self, methods: &[&str]) -> Self {
        self.hazardous_argument_methods = methods.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let rule: Self = serde_yaml::from_str(yaml)?;
        rule.validate()?;
        Ok(rule)
    }

    pub fn tracks_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// Declared on the tracked type (or on an unknown type)
    fn declared_on_tracked_type(&self, target: &MethodRef) -> bool {
        match target.containing_type.as_deref() {
            Some(ty) => self.tracks_type(ty),
            None => true,
        }
    }

    pub fn is_hazardous_method(&self, target: &MethodRef) -> bool {
        self.hazardous_methods.iter().any(|m| *m == target.name)
            && self.declared_on_tracked_type(target)
    }

    pub fn is_hazardous_argument_method(&self, target: &MethodRef) -> bool {
        self.hazardous_argument_methods.iter().any(|m| *m == target.name)
    }

    pub fn message_for(&self, method: &str) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "{}.{} called before {} was set to a non-null value",
                self.type_name, method, self.guard_field
            ),
        }
    }
}

impl Validatable for HazardousUsageRule {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("id", &self.id),
            ("type_name", &self.type_name),
            ("guard_field", &self.guard_field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::conflict(
                    format!("rule field '{field}' is empty"),
                    format!("set '{field}' in the rule definition"),
                ));
            }
        }
        if self.hazardous_methods.is_empty() && self.hazardous_argument_methods.is_empty() {
            return Err(ConfigError::conflict(
                format!("rule '{}' names no hazardous methods", self.id),
                "list at least one entry in 'hazardous_methods'",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "HazardousUsageRule"
    }
}
