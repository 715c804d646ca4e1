//! Procedure builders
//!
//! Thin layer over `CfgBuilder` for the statements the scenarios are made
//! of. Every procedure gets a flow-insensitive allocation-site points-to
//! result, the way a host without its own alias analysis would run.

use super::fixtures::{GUARD_FIELD, GUARD_TYPE, HAZARDOUS_METHOD, TRACKED_TYPE};
use codegraph_dataflow::features::flow_graph::MethodRef;
use codegraph_dataflow::features::points_to::AllocationSiteAnalysis;
use codegraph_dataflow::{BlockId, CfgBuilder, GraphId, OperationId, Procedure, ProcedureSymbol};
use std::sync::Arc;

/// Ids of a `receiver.Method(...)` statement
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub call: OperationId,
    pub receiver: OperationId,
}

pub struct ProcedureBuilder {
    cfg: CfgBuilder,
    symbol: ProcedureSymbol,
}

impl ProcedureBuilder {
    pub fn new(graph: u64, symbol: ProcedureSymbol) -> Self {
        Self {
            cfg: CfgBuilder::new(GraphId(graph)),
            symbol,
        }
    }

    /// Void method without parameters
    pub fn method(graph: u64, name: &str) -> Self {
        Self::new(graph, ProcedureSymbol::method(name, &[], false))
    }

    pub fn cfg(&mut self) -> &mut CfgBuilder {
        &mut self.cfg
    }

    /// `local = new Serializer();`
    pub fn create_tracked(&mut self, block: BlockId, local: &str) -> OperationId {
        let ops = self.cfg.ops();
        let target = ops.local(local);
        let create = ops.new_object(TRACKED_TYPE, vec![]);
        let id = create.id;
        let assign = ops.assign(target, create);
        self.cfg.push(block, assign);
        id
    }

    /// `local.Binder = new Binder();` or `local.Binder = null;`
    pub fn set_guard(&mut self, block: BlockId, local: &str, safe: bool) {
        let ops = self.cfg.ops();
        let instance = ops.local(local);
        let field = ops.field(instance, GUARD_FIELD);
        let value = if safe {
            ops.new_object(GUARD_TYPE, vec![])
        } else {
            ops.null()
        };
        let assign = ops.assign(field, value);
        self.cfg.push(block, assign);
    }

    /// `local.Deserialize();`
    pub fn call_hazardous(&mut self, block: BlockId, local: &str) -> CallSite {
        self.call_on(block, local, MethodRef::method(TRACKED_TYPE, HAZARDOUS_METHOD))
    }

    /// `local.<target>();`
    pub fn call_on(&mut self, block: BlockId, local: &str, target: MethodRef) -> CallSite {
        let ops = self.cfg.ops();
        let receiver = ops.local(local);
        let receiver_id = receiver.id;
        let call = ops.call(Some(receiver), target, vec![]);
        let site = CallSite {
            call: call.id,
            receiver: receiver_id,
        };
        self.cfg.push(block, call);
        site
    }

    /// `<target>(local);` without a receiver
    pub fn call_with_local(&mut self, block: BlockId, target: MethodRef, local: &str) -> OperationId {
        let ops = self.cfg.ops();
        let argument = ops.local(local);
        let call = ops.call(None, target, vec![argument]);
        let id = call.id;
        self.cfg.push(block, call);
        id
    }

    /// `result = <target>(argument);`
    pub fn assign_call(&mut self, block: BlockId, result: &str, target: MethodRef, argument: &str) -> OperationId {
        let ops = self.cfg.ops();
        let target_local = ops.local(result);
        let argument = ops.local(argument);
        let call = ops.call(None, target, vec![argument]);
        let id = call.id;
        let assign = ops.assign(target_local, call);
        self.cfg.push(block, assign);
        id
    }

    /// `return parameter[index];`
    pub fn return_parameter(&mut self, block: BlockId, index: usize, name: &str) {
        let ops = self.cfg.ops();
        let parameter = ops.param(index, name);
        let ret = ops.ret(Some(parameter));
        self.cfg.push(block, ret);
    }

    pub fn scope_end(&mut self, block: BlockId, locals: &[&str]) {
        let end = self.cfg.ops().scope_end(locals);
        self.cfg.push(block, end);
    }

    pub fn build(self) -> Arc<Procedure> {
        let graph = self.cfg.build().expect("valid test graph");
        let points_to = AllocationSiteAnalysis::new().analyze(&graph);
        Arc::new(Procedure::new(self.symbol, graph).with_points_to(Arc::new(points_to)))
    }
}

/// `entry -> body -> exit`, with `fill` writing the body
pub fn straight_line<R>(
    graph: u64,
    symbol: ProcedureSymbol,
    fill: impl FnOnce(&mut ProcedureBuilder, BlockId) -> R,
) -> (Arc<Procedure>, R) {
    let mut builder = ProcedureBuilder::new(graph, symbol);
    let cfg = builder.cfg();
    let body = cfg.add_block();
    let exit = cfg.exit();
    let entry = cfg.entry();
    cfg.goto(entry, body);
    cfg.goto(body, exit);
    let out = fill(&mut builder, body);
    (builder.build(), out)
}

/// Void, parameterless variant of [`straight_line`]
pub fn straight_method<R>(
    graph: u64,
    name: &str,
    fill: impl FnOnce(&mut ProcedureBuilder, BlockId) -> R,
) -> (Arc<Procedure>, R) {
    straight_line(graph, ProcedureSymbol::method(name, &[], false), fill)
}
