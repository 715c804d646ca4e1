//! Configuration validation

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// Sessions validate their configuration once, up front, so the analysis
/// itself never has to re-check ranges.
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            Some(config) => config.validate(),
            None => Ok(()),
        }
    }

    fn config_name(&self) -> &'static str {
        match self {
            Some(config) => config.config_name(),
            None => "Config",
        }
    }
}
