//! Property-set hazardous usage rule
//!
//! Tracks, per object of a configured type, whether a guard property has
//! been set to a safe (non-null) value before a hazardous method runs:
//!
//! ```text
//! var s = new Serializer();        // Flagged (guard defaults to null)
//! s.Binder = new SafeBinder();     // Unflagged
//! s.Deserialize(stream);           // no finding
//! ```
//!
//! Values form the lattice
//! `NotApplicable < {Unflagged, Flagged} < MaybeFlagged < Unknown`; a
//! hazardous call on a `Flagged` receiver is a definite finding, on a
//! `MaybeFlagged` one a possible finding.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::analyzer::{PropertySetAnalyzer, PropertySetReport};
pub use domain::finding::{FindingSeverity, HazardFinding};
pub use domain::rule::HazardousUsageRule;
pub use domain::value::{PropertySetDomain, PropertySetValue};
pub use infrastructure::client::PropertySetClient;
