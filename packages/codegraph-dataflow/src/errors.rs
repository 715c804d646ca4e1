//! Error types for codegraph-dataflow
//!
//! Only API misuse and aborted runs surface as `Err`. Imprecision (recursion,
//! unresolved callees, untrackable operations) degrades toward `unknown()`
//! instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::flow_graph::BlockId;

/// Main error type for dataflow analysis operations
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Hazards were requested from a run that did not collect them
    #[error("Hazard map requested but the analysis ran with hazard tracking disabled")]
    HazardTrackingDisabled,

    /// Configuration requires points-to results and none were supplied
    #[error("Points-to result required but not supplied for procedure '{procedure}'")]
    MissingPointsTo { procedure: String },

    /// Snapshot requested for a block that does not belong to the graph
    #[error("Unknown block {0}")]
    UnknownBlock(BlockId),

    /// Graph failed structural validation
    #[error("Invalid control-flow graph: {0}")]
    InvalidGraph(String),

    /// Safety bound on block visits exceeded
    #[error("Fixpoint did not converge after {visits} block visits (limit {limit})")]
    FixpointNotConverged { visits: usize, limit: usize },

    /// Cooperative cancellation observed at a block boundary
    #[error("Analysis cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AnalysisError {
    /// Create an invalid graph error
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidGraph(msg.into())
    }

    /// Whether the error came from cancellation rather than a defect
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled)
    }
}

/// Result type alias for dataflow operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// The operation does not denote a trackable storage location.
///
/// Non-fatal: callers treat it as "do not track".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation does not denote a trackable storage location")]
pub struct EntityNotSupported;
