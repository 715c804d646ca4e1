//! Per-operation points-to facts

use super::abstract_location::AbstractLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullState {
    Null,
    NotNull,
    MaybeNull,
}

impl NullState {
    pub fn merge(self, other: NullState) -> NullState {
        if self == other {
            self
        } else {
            NullState::MaybeNull
        }
    }
}

/// What an operation may evaluate to: a set of abstract locations, possibly
/// widened by "anything" (`is_unknown`), plus a null classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsToValue {
    pub locations: BTreeSet<AbstractLocation>,
    pub is_unknown: bool,
    pub null_state: NullState,
}

impl PointsToValue {
    pub fn null() -> Self {
        Self {
            locations: BTreeSet::new(),
            is_unknown: false,
            null_state: NullState::Null,
        }
    }

    pub fn unknown() -> Self {
        Self {
            locations: BTreeSet::new(),
            is_unknown: true,
            null_state: NullState::MaybeNull,
        }
    }

    /// Non-null value without a tracked heap location (strings, boxed literals)
    pub fn not_null() -> Self {
        Self {
            locations: BTreeSet::new(),
            is_unknown: false,
            null_state: NullState::NotNull,
        }
    }

    pub fn location(location: AbstractLocation) -> Self {
        Self {
            locations: BTreeSet::from([location]),
            is_unknown: false,
            null_state: NullState::NotNull,
        }
    }

    /// The one location this value must denote, if any
    pub fn single_location(&self) -> Option<&AbstractLocation> {
        if self.is_unknown || self.null_state != NullState::NotNull || self.locations.len() != 1 {
            return None;
        }
        self.locations.iter().next()
    }

    pub fn union(&self, other: &PointsToValue) -> PointsToValue {
        PointsToValue {
            locations: self.locations.union(&other.locations).cloned().collect(),
            is_unknown: self.is_unknown || other.is_unknown,
            null_state: self.null_state.merge(other.null_state),
        }
    }
}
