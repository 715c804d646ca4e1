//! Flow-sensitive dataflow engine
//!
//! ```text
//! FixpointDriver::run
//!   ├─ worklist in reverse postorder
//!   ├─ block input = ⊔ flow_edge(pred output)     (predicates, infeasible edges)
//!   ├─ TransferEngine::visit_block                 (client hooks, callees)
//!   └─ hazard pass over stable inputs             (when tracking hazards)
//! ```
//!
//! Clients plug in through [`DataFlowClient`]; the engine is generic over
//! the client's value lattice.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::fixpoint::FixpointDriver;
pub use domain::cancellation::CancellationToken;
pub use domain::result::{BlockSnapshot, DataFlowAnalysisResult, FixpointStats, PredicateValueKind};
pub use infrastructure::transfer::TransferEngine;
pub use ports::{DataFlowClient, InvocationOutcome, InvocationSite, ValueOf, VisitContext};
