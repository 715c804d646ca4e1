//! Call-site decisions
//!
//! Decides whether an invocation is analyzed in a derived context and, if
//! so, builds the frame that context runs under. Binding the caller's
//! state into the callee and mapping it back is done by the transfer
//! engine, which owns the entity factory.

use crate::features::flow_graph::{CallTargetKind, MethodRef, OperationId, Procedure, SymbolId};
use crate::features::interprocedural::domain::call_frame::CallFrame;
use crate::features::interprocedural::domain::policy::{InterproceduralKind, InterproceduralPolicy};
use crate::features::interprocedural::ports::CalleeResolver;
use std::fmt;
use std::sync::Arc;

/// Why a call site was not analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Disabled,
    Unresolved,
    Recursive,
    ChainLimit,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Disabled => "disabled",
            SkipReason::Unresolved => "unresolved",
            SkipReason::Recursive => "recursive",
            SkipReason::ChainLimit => "chain_limit",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub enum CallDecision {
    Analyze {
        callee: Arc<Procedure>,
        frame: Arc<CallFrame>,
    },
    Skip(SkipReason),
}

pub struct InterproceduralForker<'a> {
    policy: InterproceduralPolicy,
    resolver: &'a dyn CalleeResolver,
    caller: &'a SymbolId,
    frame: Option<&'a Arc<CallFrame>>,
}

impl<'a> InterproceduralForker<'a> {
    pub fn new(
        policy: InterproceduralPolicy,
        resolver: &'a dyn CalleeResolver,
        caller: &'a SymbolId,
        frame: Option<&'a Arc<CallFrame>>,
    ) -> Self {
        Self {
            policy,
            resolver,
            caller,
            frame,
        }
    }

    pub fn decide(&self, call_site: OperationId, target: &MethodRef) -> CallDecision {
        let is_lambda = target.is_local_function();
        if self.policy.kind == InterproceduralKind::None && !is_lambda {
            return CallDecision::Skip(SkipReason::Disabled);
        }

        let Some(callee) = self.resolver.resolve(&target.symbol) else {
            return CallDecision::Skip(SkipReason::Unresolved);
        };

        let callee_id = callee.id();
        let on_chain = match self.frame {
            Some(frame) => frame.contains(callee_id),
            None => false,
        };
        if callee_id == self.caller || on_chain {
            return CallDecision::Skip(SkipReason::Recursive);
        }

        let (depth, limit) = if is_lambda {
            (
                self.frame.map_or(0, |f| f.lambda_depth()),
                self.policy.max_lambda_call_chain,
            )
        } else {
            (
                self.frame.map_or(0, |f| f.method_depth()),
                self.policy.max_call_chain,
            )
        };
        if depth >= limit {
            return CallDecision::Skip(SkipReason::ChainLimit);
        }

        let kind = if is_lambda {
            CallTargetKind::LocalFunction
        } else {
            CallTargetKind::Method
        };
        let frame = CallFrame::push(
            self.frame,
            self.caller.clone(),
            callee_id.clone(),
            callee.graph.id(),
            call_site,
            kind,
        );

        CallDecision::Analyze {
            callee,
            frame: Arc::new(frame),
        }
    }
}
