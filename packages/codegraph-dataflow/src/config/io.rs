//! Configuration I/O (YAML)

use super::dataflow_config::{CacheConfig, DataflowConfig, InterproceduralConfig};
use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
///
/// `preset` selects the base configuration; every other key replaces the
/// corresponding part of that preset. Nested sections are replaced as a
/// whole, with absent keys inside a section taking the balanced defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interprocedural: Option<InterproceduralConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate_analysis: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_hazards: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_points_to: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_block_visits: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,
}

impl ConfigFileV1 {
    fn into_config(self) -> ConfigResult<DataflowConfig> {
        let version = self.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match self.preset.as_deref() {
            Some(name) => Preset::parse(name)?,
            None => Preset::default(),
        };

        let mut config = DataflowConfig::preset(preset);
        if let Some(interprocedural) = self.interprocedural {
            config.interprocedural = interprocedural;
        }
        if let Some(enabled) = self.predicate_analysis {
            config.predicate_analysis = enabled;
        }
        if let Some(enabled) = self.track_hazards {
            config.track_hazards = enabled;
        }
        if let Some(required) = self.require_points_to {
            config.require_points_to = required;
        }
        if let Some(limit) = self.max_block_visits {
            config.max_block_visits = limit;
        }
        if let Some(cache) = self.cache {
            config.cache = cache;
        }
        Ok(config)
    }
}

impl DataflowConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;
        let config = file.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize as a complete v1 document (no preset, every key explicit)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(1),
            preset: None,
            interprocedural: Some(self.interprocedural.clone()),
            predicate_analysis: Some(self.predicate_analysis),
            track_hazards: Some(self.track_hazards),
            require_points_to: Some(self.require_points_to),
            max_block_visits: Some(self.max_block_visits),
            cache: Some(self.cache.clone()),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}
