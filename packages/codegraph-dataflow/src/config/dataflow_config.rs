//! Dataflow engine configuration

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::validation::Validatable;
use crate::features::interprocedural::{InterproceduralKind, InterproceduralPolicy};
use serde::{Deserialize, Serialize};

/// Upper bound for either call chain limit
pub const MAX_CALL_CHAIN_LIMIT: u32 = 16;

/// Upper bound for the fixpoint safety bound
pub const MAX_BLOCK_VISITS_LIMIT: usize = 10_000_000;

/// Interprocedural call handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterproceduralConfig {
    pub kind: InterproceduralKind,

    /// Maximum nested method frames (0..=16)
    pub max_call_chain: u32,

    /// Maximum nested lambda / local function frames (0..=16)
    pub max_lambda_call_chain: u32,

    /// Reset argument and receiver state to unknown at calls that are not analyzed
    pub pessimistic: bool,
}

impl InterproceduralConfig {
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                kind: InterproceduralKind::None,
                max_call_chain: 0,
                max_lambda_call_chain: 1,
                pessimistic: false,
            },
            Preset::Balanced => Self {
                kind: InterproceduralKind::ContextSensitive,
                max_call_chain: 1,
                max_lambda_call_chain: 1,
                pessimistic: false,
            },
            Preset::Thorough => Self {
                kind: InterproceduralKind::ContextSensitive,
                max_call_chain: 3,
                max_lambda_call_chain: 3,
                pessimistic: true,
            },
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_call_chain > MAX_CALL_CHAIN_LIMIT {
            return Err(ConfigError::range_with_hint(
                "interprocedural.max_call_chain",
                self.max_call_chain,
                0,
                MAX_CALL_CHAIN_LIMIT,
                "Each level multiplies analysis cost; deep chains rarely add precision",
            ));
        }

        if self.max_lambda_call_chain > MAX_CALL_CHAIN_LIMIT {
            return Err(ConfigError::range_with_hint(
                "interprocedural.max_lambda_call_chain",
                self.max_lambda_call_chain,
                0,
                MAX_CALL_CHAIN_LIMIT,
                "Lambda and local function chains share the method chain bound",
            ));
        }

        if self.kind == InterproceduralKind::ContextSensitive && self.max_call_chain == 0 {
            return Err(ConfigError::conflict(
                "interprocedural.kind is context_sensitive but max_call_chain is 0",
                "set max_call_chain >= 1 or kind: none",
            ));
        }

        Ok(())
    }
}

impl Default for InterproceduralConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl Validatable for InterproceduralConfig {
    fn validate(&self) -> ConfigResult<()> {
        InterproceduralConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "InterproceduralConfig"
    }
}

/// Result cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize results per (procedure, policy, context)
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Complete engine configuration for one analysis session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataflowConfig {
    pub interprocedural: InterproceduralConfig,

    /// Track predicates across branches and prune infeasible edges
    pub predicate_analysis: bool,

    /// Collect the hazard map on a final pass
    pub track_hazards: bool,

    /// Refuse to analyze procedures without a points-to result
    pub require_points_to: bool,

    /// Fixpoint safety bound on block visits (1..=10_000_000)
    pub max_block_visits: usize,

    pub cache: CacheConfig,
}

impl DataflowConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                interprocedural: InterproceduralConfig::from_preset(preset),
                predicate_analysis: false,
                track_hazards: true,
                require_points_to: false,
                max_block_visits: 10_000,
                cache: CacheConfig::default(),
            },
            Preset::Balanced => Self {
                interprocedural: InterproceduralConfig::from_preset(preset),
                predicate_analysis: true,
                track_hazards: true,
                require_points_to: false,
                max_block_visits: 100_000,
                cache: CacheConfig::default(),
            },
            Preset::Thorough => Self {
                interprocedural: InterproceduralConfig::from_preset(preset),
                predicate_analysis: true,
                track_hazards: true,
                require_points_to: true,
                max_block_visits: 1_000_000,
                cache: CacheConfig::default(),
            },
        }
    }

    pub fn with_interprocedural_kind(mut self, kind: InterproceduralKind) -> Self {
        self.interprocedural.kind = kind;
        self
    }

    pub fn with_max_call_chain(mut self, depth: u32) -> Self {
        self.interprocedural.max_call_chain = depth;
        self
    }

    pub fn with_max_lambda_call_chain(mut self, depth: u32) -> Self {
        self.interprocedural.max_lambda_call_chain = depth;
        self
    }

    pub fn with_pessimistic(mut self, pessimistic: bool) -> Self {
        self.interprocedural.pessimistic = pessimistic;
        self
    }

    pub fn with_predicate_analysis(mut self, enabled: bool) -> Self {
        self.predicate_analysis = enabled;
        self
    }

    pub fn with_track_hazards(mut self, enabled: bool) -> Self {
        self.track_hazards = enabled;
        self
    }

    pub fn with_require_points_to(mut self, required: bool) -> Self {
        self.require_points_to = required;
        self
    }

    pub fn with_max_block_visits(mut self, limit: usize) -> Self {
        self.max_block_visits = limit;
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    /// Interprocedural policy handed to analysis contexts
    pub fn policy(&self) -> InterproceduralPolicy {
        InterproceduralPolicy {
            kind: self.interprocedural.kind,
            max_call_chain: self.interprocedural.max_call_chain,
            max_lambda_call_chain: self.interprocedural.max_lambda_call_chain,
            pessimistic: self.interprocedural.pessimistic,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.interprocedural.validate()?;

        if self.max_block_visits == 0 || self.max_block_visits > MAX_BLOCK_VISITS_LIMIT {
            return Err(ConfigError::range_with_hint(
                "max_block_visits",
                self.max_block_visits,
                1,
                MAX_BLOCK_VISITS_LIMIT,
                "Monotonic domains converge well below this; the bound only guards broken ones",
            ));
        }

        Ok(())
    }
}

impl Default for DataflowConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl Validatable for DataflowConfig {
    fn validate(&self) -> ConfigResult<()> {
        DataflowConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "DataflowConfig"
    }
}
