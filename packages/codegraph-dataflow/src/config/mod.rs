//! Engine configuration
//!
//! Settings for one analysis session: interprocedural policy, predicate
//! analysis, hazard tracking, points-to requirements, the fixpoint safety
//! bound and result caching.
//!
//! ```text
//! use codegraph_dataflow::config::{DataflowConfig, Preset};
//!
//! let config = DataflowConfig::preset(Preset::Thorough)
//!     .with_max_call_chain(5)
//!     .with_track_hazards(true);
//! config.validate()?;
//!
//! let yaml = config.to_yaml()?;
//! let loaded = DataflowConfig::from_yaml_str(&yaml)?;
//! ```

pub mod dataflow_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

pub use dataflow_config::{CacheConfig, DataflowConfig, InterproceduralConfig};
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigFileV1;
pub use preset::Preset;
pub use validation::Validatable;
