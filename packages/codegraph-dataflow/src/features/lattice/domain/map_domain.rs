//! Pointwise lattice over entity maps

use super::entity_map::EntityMap;
use super::value_domain::{AbstractValueDomain, LatticeOrdering};
use crate::features::entity::AnalysisEntity;
use serde::{Deserialize, Serialize};

/// How a key present in only one merge input is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingEntryPolicy {
    /// Absent means `bottom()`: keep the value (`merge(v, bottom) = v`)
    CarryThrough,
    /// Absent means `unknown()`: drop the key (`merge(v, unknown) = unknown`)
    DropUnknown,
}

impl Default for MissingEntryPolicy {
    fn default() -> Self {
        MissingEntryPolicy::CarryThrough
    }
}

pub struct MapAbstractDomain<'d, D: AbstractValueDomain> {
    values: &'d D,
    policy: MissingEntryPolicy,
}

impl<'d, D: AbstractValueDomain> Clone for MapAbstractDomain<'d, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'d, D: AbstractValueDomain> Copy for MapAbstractDomain<'d, D> {}

impl<'d, D: AbstractValueDomain> MapAbstractDomain<'d, D> {
    pub fn new(values: &'d D, policy: MissingEntryPolicy) -> Self {
        Self { values, policy }
    }

    pub fn values(&self) -> &'d D {
        self.values
    }

    pub fn policy(&self) -> MissingEntryPolicy {
        self.policy
    }

    /// Value an absent entity stands for
    pub fn default_value(&self) -> D::Value {
        match self.policy {
            MissingEntryPolicy::CarryThrough => self.values.bottom(),
            MissingEntryPolicy::DropUnknown => self.values.unknown(),
        }
    }

    pub fn get_or_default(&self, map: &EntityMap<D::Value>, entity: &AnalysisEntity) -> D::Value {
        map.get(entity).cloned().unwrap_or_else(|| self.default_value())
    }

    pub fn merge(&self, a: &EntityMap<D::Value>, b: &EntityMap<D::Value>) -> EntityMap<D::Value> {
        if a.shares_storage(b) {
            return a.clone();
        }

        let mut merged = EntityMap::new();
        for (entity, va) in a.iter() {
            match b.get(entity) {
                Some(vb) => merged.insert(entity.clone(), self.values.merge(va, vb)),
                None if self.policy == MissingEntryPolicy::CarryThrough => {
                    merged.insert(entity.clone(), va.clone())
                }
                None => {}
            }
        }
        if self.policy == MissingEntryPolicy::CarryThrough {
            for (entity, vb) in b.iter() {
                if !a.contains(entity) {
                    merged.insert(entity.clone(), vb.clone());
                }
            }
        }
        merged
    }

    /// Pointwise over the union of keys, absent entries as the default
    pub fn compare(&self, a: &EntityMap<D::Value>, b: &EntityMap<D::Value>) -> LatticeOrdering {
        if a.shares_storage(b) {
            return LatticeOrdering::Equal;
        }

        let default = self.default_value();
        let mut ordering = LatticeOrdering::Equal;
        for (entity, va) in a.iter() {
            let vb = b.get(entity).unwrap_or(&default);
            ordering = ordering.then(self.values.compare(va, vb));
            if ordering == LatticeOrdering::Incomparable {
                return ordering;
            }
        }
        for (entity, vb) in b.iter() {
            if a.contains(entity) {
                continue;
            }
            ordering = ordering.then(self.values.compare(&default, vb));
            if ordering == LatticeOrdering::Incomparable {
                return ordering;
            }
        }
        ordering
    }

    /// Fixpoint stability check
    pub fn is_stable(&self, new: &EntityMap<D::Value>, old: &EntityMap<D::Value>) -> bool {
        self.compare(new, old) == LatticeOrdering::Equal
    }
}
