/*
 * Codegraph Dataflow - Abstract Interpretation Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Span)
 * - config/      : Engine settings (presets, YAML, validation)
 * - features/    : Vertical slices (flow_graph → entity → lattice → dataflow
 *                  → interprocedural → context/cache → property_set)
 *
 * Execution:
 * - One fixpoint per (procedure, context), single-threaded
 * - Independent procedures analyzed in parallel (Rayon)
 * - Results memoized per composite key with single-flight semantics
 */

#![allow(clippy::type_complexity)] // Generic value aliases over client domains
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use config::{DataflowConfig, Preset};
pub use errors::{AnalysisError, EntityNotSupported, Result};
pub use features::cache::{CacheKey, CacheStats, ResultCache};
pub use features::context::{AnalysisContext, AnalysisSession};
pub use features::dataflow::{
    CancellationToken, DataFlowAnalysisResult, DataFlowClient, FixpointDriver, TransferEngine,
};
pub use features::entity::{AnalysisEntity, EntityFactory, EntityKind};
pub use features::flow_graph::{
    BasicBlock, BlockId, CfgBuilder, ControlFlowGraph, GraphId, Operation, OperationId,
    OperationKind, Procedure, ProcedureSymbol,
};
pub use features::interprocedural::{InterproceduralKind, InterproceduralPolicy, ProcedureRegistry};
pub use features::lattice::{
    AbstractValueDomain, AnalysisData, EntityMap, LatticeOrdering, MapAbstractDomain,
    MissingEntryPolicy,
};
pub use features::property_set::{HazardFinding, PropertySetAnalyzer, PropertySetValue};
pub use shared::models::Span;
