//! In-memory points-to result keyed by operation

use crate::features::flow_graph::OperationId;
use crate::features::points_to::domain::points_to_value::PointsToValue;
use crate::features::points_to::ports::PointsToProvider;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct PointsToMap {
    values: FxHashMap<OperationId, PointsToValue>,
}

impl PointsToMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, op: OperationId, value: PointsToValue) {
        self.values.insert(op, value);
    }

    pub fn with(mut self, op: OperationId, value: PointsToValue) -> Self {
        self.insert(op, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PointsToProvider for PointsToMap {
    fn points_to(&self, op: OperationId) -> Option<&PointsToValue> {
        self.values.get(&op)
    }
}
