//! Analysis entities
//!
//! An entity is a pure value: kind + identifying token + parent chain.
//! The static type travels with it for client rules but is not part of
//! its identity.

use crate::features::flow_graph::OperationId;
use crate::features::points_to::AbstractLocation;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ElementIndex {
    Constant(i64),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Local(String),
    /// Positional; names may differ between declaration and reference
    Parameter(usize),
    Field(String),
    Element(ElementIndex),
    /// Value of an operation that has no named storage (comparison results)
    Temporary(OperationId),
    /// Abstract heap location from points-to
    Location(AbstractLocation),
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEntity {
    kind: EntityKind,
    parent: Option<Arc<AnalysisEntity>>,
    ty: Option<String>,
}

impl AnalysisEntity {
    fn root_entity(kind: EntityKind) -> Self {
        Self {
            kind,
            parent: None,
            ty: None,
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::root_entity(EntityKind::Local(name.into()))
    }

    pub fn parameter(index: usize) -> Self {
        Self::root_entity(EntityKind::Parameter(index))
    }

    pub fn temporary(op: OperationId) -> Self {
        Self::root_entity(EntityKind::Temporary(op))
    }

    pub fn location(location: AbstractLocation) -> Self {
        Self::root_entity(EntityKind::Location(location))
    }

    /// `parent` is `None` for static fields
    pub fn field(parent: Option<AnalysisEntity>, name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Field(name.into()),
            parent: parent.map(Arc::new),
            ty: None,
        }
    }

    pub fn element(parent: AnalysisEntity, index: ElementIndex) -> Self {
        Self {
            kind: EntityKind::Element(index),
            parent: Some(Arc::new(parent)),
            ty: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<&AnalysisEntity> {
        self.parent.as_deref()
    }

    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Strict ancestor check (an entity is not its own ancestor)
    pub fn has_ancestor(&self, ancestor: &AnalysisEntity) -> bool {
        let mut current = self.parent();
        while let Some(entity) = current {
            if entity == ancestor {
                return true;
            }
            current = entity.parent();
        }
        false
    }

    /// `self` or one of its descendants
    pub fn is_or_descends_from(&self, entity: &AnalysisEntity) -> bool {
        self == entity || self.has_ancestor(entity)
    }

    pub fn root(&self) -> &AnalysisEntity {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Replace the ancestor `from` (or `self`, if equal) by `to`, keeping
    /// the access path below it. `None` if `from` is not on the chain.
    pub fn rebase(&self, from: &AnalysisEntity, to: &AnalysisEntity) -> Option<AnalysisEntity> {
        if self == from {
            return Some(to.clone());
        }
        let parent = self.parent()?.rebase(from, to)?;
        Some(Self {
            kind: self.kind.clone(),
            parent: Some(Arc::new(parent)),
            ty: self.ty.clone(),
        })
    }

    /// Entities that can hold a boolean a predicate is keyed on
    pub fn is_predicate_candidate(&self) -> bool {
        matches!(self.kind, EntityKind::Local(_) | EntityKind::Temporary(_))
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.kind, EntityKind::Temporary(_))
    }
}

impl PartialEq for AnalysisEntity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.parent == other.parent
    }
}

impl Eq for AnalysisEntity {}

impl Hash for AnalysisEntity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.parent.hash(state);
    }
}

impl fmt::Display for AnalysisEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{parent}")?;
        }
        match &self.kind {
            EntityKind::Local(name) => write!(f, "{name}"),
            EntityKind::Parameter(index) => write!(f, "arg{index}"),
            EntityKind::Field(name) if self.parent.is_some() => write!(f, ".{name}"),
            EntityKind::Field(name) => write!(f, "static.{name}"),
            EntityKind::Element(ElementIndex::Constant(i)) => write!(f, "[{i}]"),
            EntityKind::Element(ElementIndex::Unknown) => write!(f, "[?]"),
            EntityKind::Temporary(op) => write!(f, "tmp@{op}"),
            EntityKind::Location(location) => write!(f, "{location}"),
        }
    }
}
