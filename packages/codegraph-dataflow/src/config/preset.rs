//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI/CD: intraprocedural only
    ///
    /// - Interprocedural: none (calls evaluate to unknown)
    /// - Predicate analysis: off
    /// - Block visit bound: 10 000
    Fast,

    /// Development: one level of context-sensitive calls
    ///
    /// - Interprocedural: context-sensitive, call chain 1, lambda chain 1
    /// - Predicate analysis: on
    /// - Block visit bound: 100 000
    Balanced,

    /// Security audit: deeper call chains
    ///
    /// - Interprocedural: context-sensitive, call chain 3, lambda chain 3
    /// - Predicate analysis: on, points-to required
    /// - Pessimistic reset of arguments at unanalyzed calls
    /// - Block visit bound: 1 000 000
    Thorough,
}

impl Preset {
    /// Parse preset from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
