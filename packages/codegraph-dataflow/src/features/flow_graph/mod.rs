//! Control-flow graphs consumed by the dataflow engine
//!
//! The front end lowers a procedure into basic blocks of typed operation
//! trees. Blocks are addressed by dense [`BlockId`]s; edges carry the branch
//! polarity so predicates can be applied when flowing across them.
//!
//! ```text
//! let mut cfg = CfgBuilder::new(GraphId(1));
//! let body = cfg.add_block();
//! let exit = cfg.exit();
//! let x = cfg.ops().local("x");
//! let create = cfg.ops().new_object("Serializer", vec![]);
//! let assign = cfg.ops().assign(x, create);
//! cfg.push(body, assign);
//! cfg.goto(cfg.entry(), body);
//! cfg.goto(body, exit);
//! let graph = cfg.build()?;
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::cfg::{BasicBlock, BlockId, BlockKind, ControlFlowGraph, Edge, EdgeKind, GraphId};
pub use domain::operation::{
    CallTargetKind, CompareKind, Literal, MethodRef, Operation, OperationId, OperationKind,
};
pub use domain::procedure::{Procedure, ProcedureSymbol, SymbolId};
pub use infrastructure::builder::{CfgBuilder, OperationBuilder};
