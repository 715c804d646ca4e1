//! Flow-insensitive allocation-site points-to analysis
//!
//! Locals are summarized over every assignment in the graph (Andersen-style
//! copy propagation restricted to locals). Parameters, fields, elements and
//! call results are unknown. Good enough to make `a.f` and `b.f` coincide
//! for straight-line aliasing and to classify guard values as null/non-null.

use crate::features::flow_graph::{
    ControlFlowGraph, Literal, Operation, OperationId, OperationKind,
};
use crate::features::points_to::domain::abstract_location::AbstractLocation;
use crate::features::points_to::domain::points_to_value::{NullState, PointsToValue};
use crate::features::points_to::infrastructure::points_to_map::PointsToMap;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug)]
pub struct AllocationSiteAnalysis {
    /// Safety bound on copy-propagation rounds
    max_rounds: usize,
}

impl AllocationSiteAnalysis {
    pub fn new() -> Self {
        Self { max_rounds: 64 }
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    pub fn analyze(&self, graph: &ControlFlowGraph) -> PointsToMap {
        let mut all_ops: Vec<&Operation> = Vec::new();
        for block in graph.blocks() {
            for root in block.roots() {
                root.walk(&mut |op| all_ops.push(op));
            }
        }

        let mut sites: FxHashMap<OperationId, AbstractLocation> = FxHashMap::default();
        for op in &all_ops {
            if let OperationKind::ObjectCreation { type_name, .. } = &op.kind {
                let id = sites.len() as u32;
                let site = format!("alloc:{}:{}", op.id, type_name);
                sites.insert(op.id, AbstractLocation::new(id, site).with_type(type_name.clone()));
            }
        }

        let assignments: Vec<(&str, &Operation)> = all_ops
            .iter()
            .filter_map(|op| match &op.kind {
                OperationKind::Assignment { target, value } => match &target.kind {
                    OperationKind::LocalReference { name } => Some((name.as_str(), value.as_ref())),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        let mut locals: FxHashMap<String, PointsToValue> = FxHashMap::default();
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for (name, value) in &assignments {
                let Some(incoming) = evaluate(value, &sites, &locals) else {
                    continue;
                };
                let merged = match locals.get(*name) {
                    Some(existing) => existing.union(&incoming),
                    None => incoming,
                };
                if locals.get(*name) != Some(&merged) {
                    locals.insert(name.to_string(), merged);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            if rounds >= self.max_rounds {
                // Widen whatever is still moving
                for value in locals.values_mut() {
                    value.is_unknown = true;
                    value.null_state = NullState::MaybeNull;
                }
                break;
            }
        }

        let mut map = PointsToMap::new();
        for op in &all_ops {
            let value = evaluate(op, &sites, &locals).unwrap_or_else(PointsToValue::unknown);
            map.insert(op.id, value);
        }

        debug!(
            graph = graph.id().0,
            allocation_sites = sites.len(),
            tracked_locals = locals.len(),
            rounds,
            "allocation-site points-to computed"
        );
        map
    }
}

impl Default for AllocationSiteAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

/// `None` means "no information yet" (local not assigned so far)
fn evaluate(
    op: &Operation,
    sites: &FxHashMap<OperationId, AbstractLocation>,
    locals: &FxHashMap<String, PointsToValue>,
) -> Option<PointsToValue> {
    match &op.kind {
        OperationKind::Literal(Literal::Null) => Some(PointsToValue::null()),
        OperationKind::Literal(_) => Some(PointsToValue::not_null()),
        OperationKind::ObjectCreation { .. } => sites.get(&op.id).cloned().map(PointsToValue::location),
        OperationKind::LocalReference { name } => locals.get(name).cloned(),
        OperationKind::Assignment { value, .. } => evaluate(value, sites, locals),
        OperationKind::Conversion { operand } => evaluate(operand, sites, locals),
        _ => Some(PointsToValue::unknown()),
    }
}
