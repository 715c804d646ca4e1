//! Lattices and analysis state
//!
//! - [`AbstractValueDomain`]: the pluggable value lattice of one analysis
//! - [`EntityMap`] + [`MapAbstractDomain`]: entity → value maps merged
//!   pointwise under a [`MissingEntryPolicy`]
//! - [`AnalysisData`]: the state threaded through transfer functions
//!   (core map, predicated facts, reachability)
//! - [`laws`]: lattice law checks for domain authors

pub mod domain;
pub mod infrastructure;

pub use domain::analysis_data::{AnalysisData, PredicatedData, PredicatedDataDomain};
pub use domain::entity_map::EntityMap;
pub use domain::map_domain::{MapAbstractDomain, MissingEntryPolicy};
pub use domain::value_domain::{AbstractValueDomain, LatticeOrdering};
pub use infrastructure::laws;
