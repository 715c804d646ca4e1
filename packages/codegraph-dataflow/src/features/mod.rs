//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/         - Pure analysis model (no external dependencies)
//! - ports/          - Interface definitions (traits)
//! - application/    - Use cases
//! - infrastructure/ - Algorithms and concrete implementations

pub mod flow_graph;
pub mod points_to;

// Storage locations tracked by the analysis
pub mod entity;

// Value lattices, map domain, predicated state
pub mod lattice;

// Transfer functions + fixpoint driver
pub mod dataflow;

// Context-sensitive call handling
pub mod interprocedural;

pub mod cache;
pub mod context;

// Client rule: hazardous usage of property-configured objects
pub mod property_set;
