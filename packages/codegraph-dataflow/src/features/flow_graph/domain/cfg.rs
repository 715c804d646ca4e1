//! Control Flow Graph blocks and edges

use super::operation::{Operation, OperationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph identifier, stable for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(pub u64);

/// Dense block index (position in `ControlFlowGraph::blocks`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Entry,
    Block,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Unconditional,
    /// Taken when the source block's branch value is true
    WhenTrue,
    WhenFalse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub target: BlockId,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub kind: BlockKind,
    pub operations: Vec<Operation>,
    /// Condition evaluated after `operations` when the block ends in a branch
    pub branch_value: Option<Operation>,
    pub successors: Vec<Edge>,
    /// Derived from successors when the graph is built or deserialized
    #[serde(default)]
    pub predecessors: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            operations: Vec::new(),
            branch_value: None,
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    pub fn is_exit(&self) -> bool {
        self.kind == BlockKind::Exit
    }

    /// Root operations followed by the branch value
    pub fn roots(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().chain(self.branch_value.iter())
    }
}

/// Validated control-flow graph
///
/// Built through [`CfgBuilder`](crate::features::flow_graph::CfgBuilder),
/// which checks the structure and precomputes predecessors and the
/// reverse-postorder. Deserialized graphs go through the same checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawControlFlowGraph")]
pub struct ControlFlowGraph {
    pub(crate) id: GraphId,
    pub(crate) blocks: Vec<BasicBlock>,
    #[serde(skip_serializing)]
    pub(crate) rpo: Vec<BlockId>,
}

/// Unchecked wire form of a [`ControlFlowGraph`]
#[derive(Debug, Deserialize)]
pub(crate) struct RawControlFlowGraph {
    pub id: GraphId,
    pub blocks: Vec<BasicBlock>,
}

impl ControlFlowGraph {
    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Blocks reachable from entry, in reverse-postorder
    pub fn reverse_postorder(&self) -> &[BlockId] {
        &self.rpo
    }

    pub fn exit_blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().filter(|b| b.is_exit())
    }

    pub fn find_operation(&self, id: OperationId) -> Option<&Operation> {
        self.blocks
            .iter()
            .flat_map(|b| b.roots())
            .find_map(|op| op.find(id))
    }
}
