/*
 * CFG Builder
 *
 * Assembles basic blocks and operation trees into a validated
 * `ControlFlowGraph`.
 *
 * Validation:
 * - Block 0 is the only Entry block and has no predecessors
 * - No edge or operation refers to a block that was never added
 * - Exit blocks have no successors
 * - Every edge target exists
 * - Conditional edges only leave blocks with a branch value
 * - Operation ids are unique within the graph
 */

use super::ordering::reverse_postorder;
use crate::errors::{AnalysisError, Result};
use crate::features::flow_graph::domain::cfg::{
    BasicBlock, BlockId, BlockKind, ControlFlowGraph, Edge, EdgeKind, GraphId,
    RawControlFlowGraph,
};
use crate::features::flow_graph::domain::operation::{
    CompareKind, Literal, MethodRef, Operation, OperationId, OperationKind,
};
use rustc_hash::FxHashSet;

/// Allocates operation ids and constructs operation trees
#[derive(Debug, Default)]
pub struct OperationBuilder {
    next_id: u32,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `first` (for front ends that pre-assign some ids)
    pub fn starting_at(first: u32) -> Self {
        Self { next_id: first }
    }

    fn make(&mut self, kind: OperationKind) -> Operation {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        Operation::new(id, kind)
    }

    pub fn literal(&mut self, literal: Literal) -> Operation {
        self.make(OperationKind::Literal(literal))
    }

    pub fn null(&mut self) -> Operation {
        self.literal(Literal::Null)
    }

    pub fn bool(&mut self, value: bool) -> Operation {
        self.literal(Literal::Bool(value))
    }

    pub fn int(&mut self, value: i64) -> Operation {
        self.literal(Literal::Int(value))
    }

    pub fn string(&mut self, value: impl Into<String>) -> Operation {
        self.literal(Literal::Str(value.into())).with_type("string")
    }

    pub fn local(&mut self, name: impl Into<String>) -> Operation {
        self.make(OperationKind::LocalReference { name: name.into() })
    }

    pub fn param(&mut self, index: usize, name: impl Into<String>) -> Operation {
        self.make(OperationKind::ParameterReference {
            index,
            name: name.into(),
        })
    }

    pub fn field(&mut self, instance: Operation, field: impl Into<String>) -> Operation {
        self.make(OperationKind::FieldReference {
            instance: Some(Box::new(instance)),
            field: field.into(),
        })
    }

    pub fn static_field(&mut self, field: impl Into<String>) -> Operation {
        self.make(OperationKind::FieldReference {
            instance: None,
            field: field.into(),
        })
    }

    pub fn element(&mut self, array: Operation, index: Operation) -> Operation {
        self.make(OperationKind::ElementReference {
            array: Box::new(array),
            index: Box::new(index),
        })
    }

    pub fn new_object(&mut self, type_name: impl Into<String>, arguments: Vec<Operation>) -> Operation {
        self.new_object_with(type_name, arguments, Vec::new())
    }

    pub fn new_object_with(
        &mut self,
        type_name: impl Into<String>,
        arguments: Vec<Operation>,
        initializers: Vec<(String, Operation)>,
    ) -> Operation {
        let type_name = type_name.into();
        self.make(OperationKind::ObjectCreation {
            type_name: type_name.clone(),
            arguments,
            initializers,
        })
        .with_type(type_name)
    }

    pub fn assign(&mut self, target: Operation, value: Operation) -> Operation {
        let ty = target.ty.clone().or_else(|| value.ty.clone());
        let op = self.make(OperationKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        });
        match ty {
            Some(ty) => op.with_type(ty),
            None => op,
        }
    }

    pub fn call(
        &mut self,
        receiver: Option<Operation>,
        target: MethodRef,
        arguments: Vec<Operation>,
    ) -> Operation {
        self.make(OperationKind::Invocation {
            receiver: receiver.map(Box::new),
            target,
            arguments,
        })
    }

    pub fn ret(&mut self, value: Option<Operation>) -> Operation {
        self.make(OperationKind::Return {
            value: value.map(Box::new),
        })
    }

    pub fn compare(&mut self, kind: CompareKind, left: Operation, right: Operation) -> Operation {
        self.make(OperationKind::Compare {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        })
        .with_type("bool")
    }

    pub fn eq(&mut self, left: Operation, right: Operation) -> Operation {
        self.compare(CompareKind::Equals, left, right)
    }

    pub fn ne(&mut self, left: Operation, right: Operation) -> Operation {
        self.compare(CompareKind::NotEquals, left, right)
    }

    pub fn not(&mut self, operand: Operation) -> Operation {
        self.make(OperationKind::Not {
            operand: Box::new(operand),
        })
        .with_type("bool")
    }

    pub fn convert(&mut self, operand: Operation, ty: impl Into<String>) -> Operation {
        self.make(OperationKind::Conversion {
            operand: Box::new(operand),
        })
        .with_type(ty)
    }

    pub fn scope_end(&mut self, locals: &[&str]) -> Operation {
        self.make(OperationKind::ScopeEnd {
            locals: locals.iter().map(|l| l.to_string()).collect(),
        })
    }

    pub fn other(&mut self, children: Vec<Operation>) -> Operation {
        self.make(OperationKind::Other { children })
    }
}

/// Incremental graph builder
///
/// Block 0 (entry) exists from the start; a single exit block is created on
/// first call to [`CfgBuilder::exit`].
#[derive(Debug)]
pub struct CfgBuilder {
    id: GraphId,
    blocks: Vec<BasicBlock>,
    exit: Option<BlockId>,
    ops: OperationBuilder,
    /// First misuse seen while building, reported by `build`
    pending_error: Option<String>,
}

impl CfgBuilder {
    pub fn new(id: GraphId) -> Self {
        Self {
            id,
            blocks: vec![BasicBlock::new(BlockId(0), BlockKind::Entry)],
            exit: None,
            ops: OperationBuilder::new(),
            pending_error: None,
        }
    }

    pub fn ops(&mut self) -> &mut OperationBuilder {
        &mut self.ops
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn add_block(&mut self) -> BlockId {
        self.add(BlockKind::Block)
    }

    pub fn exit(&mut self) -> BlockId {
        match self.exit {
            Some(exit) => exit,
            None => {
                let exit = self.add(BlockKind::Exit);
                self.exit = Some(exit);
                exit
            }
        }
    }

    fn add(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id, kind));
        id
    }

    /// Append a root operation. Unknown block ids are reported by `build`.
    pub fn push(&mut self, block: BlockId, op: Operation) {
        match self.blocks.get_mut(block.index()) {
            Some(b) => b.operations.push(op),
            None => self.record_error(format!("operation pushed to unknown block {block}")),
        }
    }

    fn record_error(&mut self, message: String) {
        self.pending_error.get_or_insert(message);
    }

    pub fn goto(&mut self, from: BlockId, to: BlockId) {
        self.edge(from, to, EdgeKind::Unconditional);
    }

    pub fn branch(&mut self, from: BlockId, condition: Operation, when_true: BlockId, when_false: BlockId) {
        match self.blocks.get_mut(from.index()) {
            Some(b) => b.branch_value = Some(condition),
            None => self.record_error(format!("branch from unknown block {from}")),
        }
        self.edge(from, when_true, EdgeKind::WhenTrue);
        self.edge(from, when_false, EdgeKind::WhenFalse);
    }

    fn edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        match self.blocks.get_mut(from.index()) {
            Some(b) => b.successors.push(Edge { target: to, kind }),
            None => self.record_error(format!("edge from unknown block {from}")),
        }
    }

    pub fn build(self) -> Result<ControlFlowGraph> {
        let CfgBuilder {
            id,
            mut blocks,
            pending_error,
            ..
        } = self;
        if let Some(message) = pending_error {
            return Err(AnalysisError::InvalidGraph(message));
        }
        assemble(id, blocks)
    }
}

impl TryFrom<RawControlFlowGraph> for ControlFlowGraph {
    type Error = AnalysisError;

    fn try_from(raw: RawControlFlowGraph) -> Result<Self> {
        assemble(raw.id, raw.blocks)
    }
}

/// Validate, then derive predecessors and the block order
fn assemble(id: GraphId, mut blocks: Vec<BasicBlock>) -> Result<ControlFlowGraph> {
    validate(&blocks)?;

    for block in &mut blocks {
        block.predecessors.clear();
    }
    for index in 0..blocks.len() {
        let source = blocks[index].id;
        let targets: Vec<BlockId> = blocks[index].successors.iter().map(|e| e.target).collect();
        for target in targets {
            let preds = &mut blocks[target.index()].predecessors;
            if !preds.contains(&source) {
                preds.push(source);
            }
        }
    }

    let rpo = reverse_postorder(&blocks, BlockId(0));
    Ok(ControlFlowGraph { id, blocks, rpo })
}

fn validate(blocks: &[BasicBlock]) -> Result<()> {
    let Some(entry) = blocks.first() else {
        return Err(AnalysisError::invalid_graph("graph has no blocks"));
    };
    if entry.kind != BlockKind::Entry {
        return Err(AnalysisError::invalid_graph("block 0 must be the entry block"));
    }

    let mut seen_ops = FxHashSet::default();
    for (index, block) in blocks.iter().enumerate() {
        if block.id.index() != index {
            return Err(AnalysisError::invalid_graph(format!(
                "block at position {index} is labelled {}",
                block.id
            )));
        }
        if index > 0 && block.kind == BlockKind::Entry {
            return Err(AnalysisError::invalid_graph(format!(
                "{} is a second entry block",
                block.id
            )));
        }
        if block.is_exit() && !block.successors.is_empty() {
            return Err(AnalysisError::invalid_graph(format!(
                "exit block {} has successors",
                block.id
            )));
        }

        for edge in &block.successors {
            if edge.target.index() >= blocks.len() {
                return Err(AnalysisError::invalid_graph(format!(
                    "{} has an edge to unknown block {}",
                    block.id, edge.target
                )));
            }
            if edge.target.index() == 0 {
                return Err(AnalysisError::invalid_graph(format!(
                    "{} has an edge into the entry block",
                    block.id
                )));
            }
            if edge.kind != EdgeKind::Unconditional && block.branch_value.is_none() {
                return Err(AnalysisError::invalid_graph(format!(
                    "{} has a conditional edge but no branch value",
                    block.id
                )));
            }
        }

        let mut duplicate = None;
        for root in block.roots() {
            root.walk(&mut |op| {
                if !seen_ops.insert(op.id) {
                    duplicate.get_or_insert(op.id);
                }
            });
        }
        if let Some(op) = duplicate {
            return Err(AnalysisError::invalid_graph(format!(
                "operation id {op} appears more than once"
            )));
        }
    }

    Ok(())
}
