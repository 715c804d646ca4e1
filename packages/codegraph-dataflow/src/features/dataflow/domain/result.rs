//! Result of one fixpoint run

use crate::errors::{AnalysisError, Result};
use crate::features::flow_graph::{BlockId, GraphId, OperationId, SymbolId};
use crate::features::lattice::AnalysisData;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statically known outcome of a branch condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredicateValueKind {
    AlwaysTrue,
    AlwaysFalse,
}

impl PredicateValueKind {
    pub fn from_bool(value: bool) -> Self {
        if value {
            PredicateValueKind::AlwaysTrue
        } else {
            PredicateValueKind::AlwaysFalse
        }
    }

    pub fn negate(self) -> Self {
        match self {
            PredicateValueKind::AlwaysTrue => PredicateValueKind::AlwaysFalse,
            PredicateValueKind::AlwaysFalse => PredicateValueKind::AlwaysTrue,
        }
    }

    /// Whether an edge taken when the condition equals `polarity` is feasible
    pub fn admits(self, polarity: bool) -> bool {
        self == PredicateValueKind::from_bool(polarity)
    }
}

/// Block entry and exit state at the fixpoint
#[derive(Debug, Clone)]
pub struct BlockSnapshot<V> {
    pub input: AnalysisData<V>,
    pub output: AnalysisData<V>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixpointStats {
    pub blocks: usize,
    pub reachable_blocks: usize,
    pub block_visits: usize,
    /// Distinct call sites analyzed in a derived context (cache hits included)
    pub interprocedural_calls: usize,
    pub elapsed_micros: u64,
}

/// Immutable once produced; shared through `Arc` by the result cache
#[derive(Debug, Clone)]
pub struct DataFlowAnalysisResult<V> {
    pub(crate) graph: GraphId,
    pub(crate) symbol: SymbolId,
    pub(crate) snapshots: Vec<BlockSnapshot<V>>,
    pub(crate) operation_values: FxHashMap<OperationId, V>,
    pub(crate) return_value: Option<V>,
    pub(crate) exit_data: AnalysisData<V>,
    pub(crate) hazards: Option<BTreeMap<OperationId, V>>,
    pub(crate) reassigned_parameters: FxHashSet<usize>,
    pub(crate) predicate_kinds: FxHashMap<OperationId, PredicateValueKind>,
    pub(crate) stats: FixpointStats,
}

impl<V> DataFlowAnalysisResult<V> {
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn symbol(&self) -> &SymbolId {
        &self.symbol
    }

    pub fn snapshot(&self, block: BlockId) -> Result<&BlockSnapshot<V>> {
        self.snapshots
            .get(block.index())
            .ok_or(AnalysisError::UnknownBlock(block))
    }

    pub fn snapshots(&self) -> &[BlockSnapshot<V>] {
        &self.snapshots
    }

    /// Value computed for an operation at the fixpoint
    pub fn operation_value(&self, op: OperationId) -> Option<&V> {
        self.operation_values.get(&op)
    }

    /// Merge over all reachable return statements
    pub fn return_value(&self) -> Option<&V> {
        self.return_value.as_ref()
    }

    pub fn exit_data(&self) -> &AnalysisData<V> {
        &self.exit_data
    }

    pub fn hazards(&self) -> Result<&BTreeMap<OperationId, V>> {
        self.hazards.as_ref().ok_or(AnalysisError::HazardTrackingDisabled)
    }

    /// Parameters the procedure assigns to (their exit value is not the
    /// argument object's state)
    pub fn reassigned_parameters(&self) -> &FxHashSet<usize> {
        &self.reassigned_parameters
    }

    pub fn predicate_kind(&self, op: OperationId) -> Option<PredicateValueKind> {
        self.predicate_kinds.get(&op).copied()
    }

    pub fn stats(&self) -> &FixpointStats {
        &self.stats
    }
}
