//! Storage entity model
//!
//! Identifies trackable locations (locals, parameters, fields, elements,
//! synthesized temporaries, abstract heap locations) with structural
//! equality, so the same location is recognized across blocks and across
//! separately built operation trees.

pub mod domain;
pub mod infrastructure;

pub use domain::analysis_entity::{AnalysisEntity, ElementIndex, EntityKind};
pub use infrastructure::entity_factory::EntityFactory;
