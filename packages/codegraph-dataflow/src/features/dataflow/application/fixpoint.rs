//! Worklist fixpoint over one control-flow graph
//!
//! Blocks are processed in reverse postorder rank. A block's input is the
//! merge of its processed predecessors' outputs carried across each edge;
//! when its output changes, its successors are queued again. Blocks with
//! no reachable predecessor stay unreachable, and unreachable blocks are
//! never visited by the transfer engine.
//!
//! With hazard tracking on, a final pass re-visits every reachable block
//! from its stable input so hazards reflect fixpoint states only.

use crate::errors::{AnalysisError, Result};
use crate::features::context::{AnalysisContext, AnalysisSession};
use crate::features::dataflow::domain::cancellation::CancellationToken;
use crate::features::dataflow::domain::result::{BlockSnapshot, DataFlowAnalysisResult, FixpointStats};
use crate::features::dataflow::infrastructure::transfer::TransferEngine;
use crate::features::dataflow::ports::client::{DataFlowClient, ValueOf};
use crate::features::flow_graph::infrastructure::ordering::rank_of;
use crate::features::flow_graph::{BasicBlock, BlockKind, ControlFlowGraph};
use crate::features::lattice::{AnalysisData, PredicatedDataDomain};
use std::collections::BTreeSet;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Unvisited,
    Recomputing,
    Stable,
}

pub struct FixpointDriver<'a, C: DataFlowClient> {
    session: &'a AnalysisSession<C>,
    context: &'a AnalysisContext<ValueOf<C>>,
    cancel: &'a CancellationToken,
}

impl<'a, C: DataFlowClient> FixpointDriver<'a, C> {
    pub fn new(
        session: &'a AnalysisSession<C>,
        context: &'a AnalysisContext<ValueOf<C>>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            session,
            context,
            cancel,
        }
    }

    pub fn run(&self) -> Result<DataFlowAnalysisResult<ValueOf<C>>> {
        let started = Instant::now();
        let procedure = self.context.procedure();
        let graph: &ControlFlowGraph = &procedure.graph;
        let order = graph.reverse_postorder();
        let rank = rank_of(order, graph.len());
        let limit = self.context.max_block_visits();

        let mut engine = TransferEngine::new(self.session, self.context, self.cancel);
        let states = PredicatedDataDomain::new(engine.maps());

        let mut inputs: Vec<Option<AnalysisData<ValueOf<C>>>> = vec![None; graph.len()];
        let mut outputs: Vec<Option<AnalysisData<ValueOf<C>>>> = vec![None; graph.len()];
        let mut block_states = vec![BlockState::Unvisited; graph.len()];
        let mut worklist: BTreeSet<usize> = (0..order.len()).collect();
        let mut visits = 0usize;

        tracing::debug!(
            procedure = %procedure.id(),
            blocks = graph.len(),
            reachable = order.len(),
            top_level = self.context.is_top_level(),
            "Fixpoint started"
        );

        while let Some(position) = worklist.pop_first() {
            self.check_cancelled(visits)?;
            if visits == limit {
                tracing::warn!(procedure = %procedure.id(), visits, limit, "Fixpoint did not converge");
                return Err(AnalysisError::FixpointNotConverged { visits, limit });
            }
            visits += 1;

            let block = &graph.blocks()[order[position].index()];
            let index = block.id.index();
            block_states[index] = BlockState::Recomputing;

            let input = self.block_input(&engine, &states, graph, block, &outputs);
            let output = engine.visit_block(input.clone(), block)?;
            let changed = match &outputs[index] {
                Some(previous) => !states.is_stable(&output, previous),
                None => true,
            };
            tracing::trace!(block = %block.id, changed, "Block visited");

            inputs[index] = Some(input);
            outputs[index] = Some(output);
            block_states[index] = BlockState::Stable;

            if changed {
                for edge in &block.successors {
                    let target = edge.target.index();
                    if rank[target] != usize::MAX {
                        block_states[target] = BlockState::Unvisited;
                        worklist.insert(rank[target]);
                    }
                }
            }
        }
        debug_assert!(order
            .iter()
            .all(|id| block_states[id.index()] == BlockState::Stable));

        if self.context.track_hazards() {
            engine.begin_hazard_collection();
            for id in order {
                self.check_cancelled(visits)?;
                if let Some(input) = &inputs[id.index()] {
                    engine.visit_block(input.clone(), &graph.blocks()[id.index()])?;
                }
            }
        }

        let exit_data = self.exit_data(&states, graph, &outputs);
        let output = engine.finish();
        let snapshots = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| BlockSnapshot {
                input: input.unwrap_or_else(AnalysisData::unreachable),
                output: output.unwrap_or_else(AnalysisData::unreachable),
            })
            .collect();

        let stats = FixpointStats {
            blocks: graph.len(),
            reachable_blocks: order.len(),
            block_visits: visits,
            interprocedural_calls: output.interprocedural_calls,
            elapsed_micros: started.elapsed().as_micros() as u64,
        };
        tracing::debug!(
            procedure = %procedure.id(),
            visits,
            hazards = output.hazards.as_ref().map_or(0, |h| h.len()),
            elapsed_us = stats.elapsed_micros,
            "Fixpoint converged"
        );

        Ok(DataFlowAnalysisResult {
            graph: graph.id(),
            symbol: procedure.id().clone(),
            snapshots,
            operation_values: output.operation_values,
            return_value: output.return_value,
            exit_data,
            hazards: output.hazards,
            reassigned_parameters: output.reassigned_parameters,
            predicate_kinds: output.predicate_kinds,
            stats,
        })
    }

    fn check_cancelled(&self, visits: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::info!(procedure = %self.context.procedure().id(), visits, "Analysis cancelled");
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    fn block_input(
        &self,
        engine: &TransferEngine<'a, C>,
        states: &PredicatedDataDomain<'a, C::Domain>,
        graph: &ControlFlowGraph,
        block: &BasicBlock,
        outputs: &[Option<AnalysisData<ValueOf<C>>>],
    ) -> AnalysisData<ValueOf<C>> {
        if block.id == graph.entry() {
            return self
                .context
                .initial_data()
                .cloned()
                .unwrap_or_else(AnalysisData::new);
        }

        let mut merged: Option<AnalysisData<ValueOf<C>>> = None;
        for predecessor in &block.predecessors {
            let Some(output) = &outputs[predecessor.index()] else {
                continue;
            };
            let source = &graph.blocks()[predecessor.index()];
            for edge in source.successors.iter().filter(|e| e.target == block.id) {
                let flowed = engine.flow_edge(output, source, edge);
                merged = Some(match merged {
                    Some(acc) => states.merge(&acc, &flowed),
                    None => flowed,
                });
            }
        }
        merged.unwrap_or_else(AnalysisData::unreachable)
    }

    /// Merge of the outputs of exit blocks (or of blocks without successors)
    fn exit_data(
        &self,
        states: &PredicatedDataDomain<'a, C::Domain>,
        graph: &ControlFlowGraph,
        outputs: &[Option<AnalysisData<ValueOf<C>>>],
    ) -> AnalysisData<ValueOf<C>> {
        let has_exit = graph.blocks().iter().any(|b| b.kind == BlockKind::Exit);
        graph
            .blocks()
            .iter()
            .filter(|b| {
                if has_exit {
                    b.kind == BlockKind::Exit
                } else {
                    b.successors.is_empty()
                }
            })
            .filter_map(|b| outputs[b.id.index()].as_ref())
            .fold(AnalysisData::unreachable(), |acc, data| states.merge(&acc, data))
    }
}
