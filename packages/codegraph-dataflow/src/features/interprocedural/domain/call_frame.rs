//! Call chain of a derived analysis context
//!
//! Frames form a persistent list: each derived context pushes one frame
//! that points at its caller's frame, so sibling calls share the prefix.

use crate::features::flow_graph::{CallTargetKind, GraphId, OperationId, SymbolId};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Procedure containing the call site
    pub caller: SymbolId,
    pub callee: SymbolId,
    pub callee_graph: GraphId,
    pub call_site: OperationId,
    pub kind: CallTargetKind,
    method_depth: u32,
    lambda_depth: u32,
    parent: Option<Arc<CallFrame>>,
}

impl CallFrame {
    pub fn push(
        parent: Option<&Arc<CallFrame>>,
        caller: SymbolId,
        callee: SymbolId,
        callee_graph: GraphId,
        call_site: OperationId,
        kind: CallTargetKind,
    ) -> Self {
        let (method_depth, lambda_depth) = parent
            .map(|p| (p.method_depth, p.lambda_depth))
            .unwrap_or((0, 0));
        let (method_depth, lambda_depth) = match kind {
            CallTargetKind::Method => (method_depth + 1, lambda_depth),
            CallTargetKind::LocalFunction => (method_depth, lambda_depth + 1),
        };

        Self {
            caller,
            callee,
            callee_graph,
            call_site,
            kind,
            method_depth,
            lambda_depth,
            parent: parent.cloned(),
        }
    }

    pub fn parent(&self) -> Option<&CallFrame> {
        self.parent.as_deref()
    }

    /// Method frames on the chain, this one included
    pub fn method_depth(&self) -> u32 {
        self.method_depth
    }

    pub fn lambda_depth(&self) -> u32 {
        self.lambda_depth
    }

    /// Innermost first
    pub fn frames(&self) -> impl Iterator<Item = &CallFrame> {
        std::iter::successors(Some(self), |frame| frame.parent())
    }

    pub fn root_caller(&self) -> &SymbolId {
        let mut frame = self;
        while let Some(parent) = frame.parent() {
            frame = parent;
        }
        &frame.caller
    }

    /// Whether `symbol` is being analyzed anywhere on this chain
    pub fn contains(&self, symbol: &SymbolId) -> bool {
        self.root_caller() == symbol || self.frames().any(|frame| &frame.callee == symbol)
    }

    /// Root caller first, then each callee outward-in
    pub fn chain(&self) -> Vec<SymbolId> {
        let mut chain: Vec<SymbolId> = self.frames().map(|frame| frame.callee.clone()).collect();
        chain.push(self.root_caller().clone());
        chain.reverse();
        chain
    }
}
