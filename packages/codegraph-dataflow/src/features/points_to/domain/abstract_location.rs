//! Abstract Heap Location
//!
//! Each allocation site (`new T()` operation) is one abstract location.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for abstract locations
pub type LocationId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbstractLocation {
    pub id: LocationId,

    /// Human-readable allocation site identifier (e.g., "alloc:op12:Serializer")
    pub allocation_site: String,

    pub type_info: Option<String>,
}

impl AbstractLocation {
    #[inline]
    pub fn new(id: LocationId, allocation_site: impl Into<String>) -> Self {
        Self {
            id,
            allocation_site: allocation_site.into(),
            type_info: None,
        }
    }

    #[inline]
    pub fn with_type(mut self, type_info: impl Into<String>) -> Self {
        self.type_info = Some(type_info.into());
        self
    }
}

impl fmt::Display for AbstractLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc{}({})", self.id, self.allocation_site)
    }
}
