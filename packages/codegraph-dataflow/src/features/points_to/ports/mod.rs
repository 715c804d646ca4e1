//! Ports (Interfaces) for points-to results

use crate::features::flow_graph::OperationId;
use crate::features::points_to::domain::points_to_value::PointsToValue;

/// Precomputed points-to result for one graph
///
/// Shared read-only across concurrent analyses.
pub trait PointsToProvider: Send + Sync {
    /// `None` when the operation has no points-to fact (treated as unknown)
    fn points_to(&self, op: OperationId) -> Option<&PointsToValue>;
}
