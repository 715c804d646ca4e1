//! # Points-to results consumed by the dataflow engine
//!
//! The engine never computes aliasing on its own during the fixpoint; it
//! queries a precomputed [`PointsToProvider`] per operation:
//! - **Entity resolution**: `a.f` and `b.f` share a `Location` parent when
//!   `a` and `b` point to the same single allocation site
//! - **Null state**: guard assignments and null checks are classified as
//!   `Null`, `NotNull` or `MaybeNull`
//!
//! [`AllocationSiteAnalysis`] derives a flow-insensitive result from a graph
//! for hosts that have no external points-to pass.
//!
//! ## Usage
//! ```text
//! use codegraph_dataflow::features::points_to::AllocationSiteAnalysis;
//!
//! let points_to = AllocationSiteAnalysis::new().analyze(&graph);
//! let procedure = Procedure::new(symbol, graph).with_points_to(Arc::new(points_to));
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::allocation_site::AllocationSiteAnalysis;
pub use domain::abstract_location::{AbstractLocation, LocationId};
pub use domain::points_to_value::{NullState, PointsToValue};
pub use infrastructure::points_to_map::PointsToMap;
pub use ports::PointsToProvider;
