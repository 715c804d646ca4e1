//! Analysis state: core map + predicated facts + reachability
//!
//! Predicated facts are keyed by the entity holding a boolean (the temporary
//! of `x.f == null`, or a local it was copied into). Each polarity side
//! holds overrides of the core map that are valid only when the predicate
//! took that value, and is applied when flowing across a conditional edge.
//!
//! Merge keeps a predicate only when both inputs track it, and a polarity
//! side only when both inputs have it; everything else is dropped. An
//! unreachable state (infeasible branch) is the identity of merge.

use super::entity_map::EntityMap;
use super::map_domain::MapAbstractDomain;
use super::value_domain::{AbstractValueDomain, LatticeOrdering};
use crate::features::entity::AnalysisEntity;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct PredicatedData<V> {
    pub when_true: Option<EntityMap<V>>,
    pub when_false: Option<EntityMap<V>>,
}

impl<V: Clone> PredicatedData<V> {
    pub fn new(when_true: Option<EntityMap<V>>, when_false: Option<EntityMap<V>>) -> Self {
        Self {
            when_true,
            when_false,
        }
    }

    pub fn side(&self, polarity: bool) -> Option<&EntityMap<V>> {
        if polarity {
            self.when_true.as_ref()
        } else {
            self.when_false.as_ref()
        }
    }

    /// Sides swapped (predicate of `!p` from the predicate of `p`)
    pub fn negated(&self) -> Self {
        Self {
            when_true: self.when_false.clone(),
            when_false: self.when_true.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.when_true.is_none() && self.when_false.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisData<V> {
    core: EntityMap<V>,
    predicates: Arc<FxHashMap<AnalysisEntity, PredicatedData<V>>>,
    reachable: bool,
}

impl<V: Clone> Default for AnalysisData<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> AnalysisData<V> {
    /// Empty reachable state (procedure entry)
    pub fn new() -> Self {
        Self::from_core(EntityMap::new())
    }

    pub fn from_core(core: EntityMap<V>) -> Self {
        Self {
            core,
            predicates: Arc::new(FxHashMap::default()),
            reachable: true,
        }
    }

    /// State of an infeasible path
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn mark_unreachable(&mut self) {
        *self = Self::unreachable();
    }

    pub fn core(&self) -> &EntityMap<V> {
        &self.core
    }

    pub fn get(&self, entity: &AnalysisEntity) -> Option<&V> {
        self.core.get(entity)
    }

    pub fn contains(&self, entity: &AnalysisEntity) -> bool {
        self.core.contains(entity)
    }

    /// Write `entity`; predicates that mention it no longer hold
    pub fn set(&mut self, entity: AnalysisEntity, value: V) {
        self.remove_predicates_mentioning(&entity);
        self.core.insert(entity, value);
    }

    pub fn remove(&mut self, entity: &AnalysisEntity) -> Option<V> {
        self.remove_predicates_mentioning(entity);
        self.core.remove(entity)
    }

    /// Drop every predicate whose key or facts involve `written`, an
    /// ancestor of it, or a descendant of it
    pub fn remove_predicates_mentioning(&mut self, written: &AnalysisEntity) {
        if self.predicates.is_empty() {
            return;
        }
        let related = |k: &AnalysisEntity| k.is_or_descends_from(written) || written.has_ancestor(k);
        let stale = |k: &AnalysisEntity, data: &PredicatedData<V>| {
            related(k)
                || [&data.when_true, &data.when_false]
                    .into_iter()
                    .flatten()
                    .any(|side| side.keys().any(related))
        };
        if self.predicates.iter().any(|(k, d)| stale(k, d)) {
            Arc::make_mut(&mut self.predicates).retain(|k, d| !stale(k, d));
        }
    }

    /// Tracked strict descendants of `entity` (fields, elements)
    pub fn descendants(&self, entity: &AnalysisEntity) -> Vec<AnalysisEntity> {
        self.core
            .keys()
            .filter(|k| k.has_ancestor(entity))
            .cloned()
            .collect()
    }

    /// Forget `entity`, its descendants, and every predicate mentioning them
    pub fn stop_tracking(&mut self, entity: &AnalysisEntity) {
        self.core.retain(|k, _| !k.is_or_descends_from(entity));

        let mentions = |k: &AnalysisEntity, data: &PredicatedData<V>| {
            k.is_or_descends_from(entity)
                || [&data.when_true, &data.when_false]
                    .into_iter()
                    .flatten()
                    .any(|side| side.keys().any(|e| e.is_or_descends_from(entity)))
        };
        if self.predicates.iter().any(|(k, d)| mentions(k, d)) {
            let predicates = Arc::make_mut(&mut self.predicates);
            predicates.retain(|k, _| !k.is_or_descends_from(entity));
            for data in predicates.values_mut() {
                for side in [&mut data.when_true, &mut data.when_false].into_iter().flatten() {
                    side.retain(|k, _| !k.is_or_descends_from(entity));
                }
            }
        }
    }

    pub fn predicate(&self, entity: &AnalysisEntity) -> Option<&PredicatedData<V>> {
        self.predicates.get(entity)
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn start_tracking_predicate(&mut self, entity: AnalysisEntity, data: PredicatedData<V>) {
        if data.is_empty() {
            self.remove_predicate(&entity);
            return;
        }
        Arc::make_mut(&mut self.predicates).insert(entity, data);
    }

    pub fn remove_predicate(&mut self, entity: &AnalysisEntity) {
        if self.predicates.contains_key(entity) {
            Arc::make_mut(&mut self.predicates).remove(entity);
        }
    }

    /// `to` now holds the same boolean as `from`
    pub fn copy_predicate(&mut self, from: &AnalysisEntity, to: AnalysisEntity) {
        match self.predicates.get(from).cloned() {
            Some(data) => self.start_tracking_predicate(to, data),
            None => self.remove_predicate(&to),
        }
    }

    /// Apply the facts implied by `entity == polarity`. Returns whether a
    /// predicate was found.
    pub fn apply_predicate(&mut self, entity: &AnalysisEntity, polarity: bool) -> bool {
        let Some(data) = self.predicates.get(entity) else {
            return false;
        };
        if let Some(side) = data.side(polarity).cloned() {
            for (k, v) in side.iter() {
                self.core.insert(k.clone(), v.clone());
            }
        }
        true
    }
}

/// Merge and comparison of whole analysis states
pub struct PredicatedDataDomain<'d, D: AbstractValueDomain> {
    maps: MapAbstractDomain<'d, D>,
}

impl<'d, D: AbstractValueDomain> PredicatedDataDomain<'d, D> {
    pub fn new(maps: MapAbstractDomain<'d, D>) -> Self {
        Self { maps }
    }

    pub fn maps(&self) -> &MapAbstractDomain<'d, D> {
        &self.maps
    }

    pub fn merge(&self, a: &AnalysisData<D::Value>, b: &AnalysisData<D::Value>) -> AnalysisData<D::Value> {
        match (a.reachable, b.reachable) {
            (false, _) => return b.clone(),
            (_, false) => return a.clone(),
            _ => {}
        }

        let core = self.maps.merge(&a.core, &b.core);
        let predicates = if Arc::ptr_eq(&a.predicates, &b.predicates) {
            a.predicates.clone()
        } else {
            let mut merged = FxHashMap::default();
            for (entity, pa) in a.predicates.iter() {
                let Some(pb) = b.predicates.get(entity) else {
                    continue;
                };
                let data = PredicatedData {
                    when_true: self.merge_side(pa.when_true.as_ref(), &a.core, pb.when_true.as_ref(), &b.core),
                    when_false: self.merge_side(pa.when_false.as_ref(), &a.core, pb.when_false.as_ref(), &b.core),
                };
                if !data.is_empty() {
                    merged.insert(entity.clone(), data);
                }
            }
            Arc::new(merged)
        };

        AnalysisData {
            core,
            predicates,
            reachable: true,
        }
    }

    /// A side is a set of overrides on its own core, so a key overridden on
    /// one input only is merged against the other input's core value.
    fn merge_side(
        &self,
        a: Option<&EntityMap<D::Value>>,
        a_core: &EntityMap<D::Value>,
        b: Option<&EntityMap<D::Value>>,
        b_core: &EntityMap<D::Value>,
    ) -> Option<EntityMap<D::Value>> {
        let (a, b) = (a?, b?);
        let values = self.maps.values();
        let mut merged = EntityMap::new();
        for entity in a.keys().chain(b.keys().filter(|k| !a.contains(k))) {
            let va = a
                .get(entity)
                .or_else(|| a_core.get(entity))
                .cloned()
                .unwrap_or_else(|| self.maps.default_value());
            let vb = b
                .get(entity)
                .or_else(|| b_core.get(entity))
                .cloned()
                .unwrap_or_else(|| self.maps.default_value());
            merged.insert(entity.clone(), values.merge(&va, &vb));
        }
        Some(merged)
    }

    /// Core ordering when predicates agree; `Incomparable` otherwise
    pub fn compare(&self, a: &AnalysisData<D::Value>, b: &AnalysisData<D::Value>) -> LatticeOrdering {
        match (a.reachable, b.reachable) {
            (false, false) => return LatticeOrdering::Equal,
            (false, true) => return LatticeOrdering::Less,
            (true, false) => return LatticeOrdering::Greater,
            _ => {}
        }

        let core = self.maps.compare(&a.core, &b.core);
        if core == LatticeOrdering::Incomparable || self.predicates_equal(a, b) {
            core
        } else {
            LatticeOrdering::Incomparable
        }
    }

    pub fn is_stable(&self, new: &AnalysisData<D::Value>, old: &AnalysisData<D::Value>) -> bool {
        self.compare(new, old) == LatticeOrdering::Equal
    }

    fn predicates_equal(&self, a: &AnalysisData<D::Value>, b: &AnalysisData<D::Value>) -> bool {
        if Arc::ptr_eq(&a.predicates, &b.predicates) {
            return true;
        }
        if a.predicates.len() != b.predicates.len() {
            return false;
        }
        a.predicates.iter().all(|(entity, pa)| {
            let Some(pb) = b.predicates.get(entity) else {
                return false;
            };
            self.sides_equal(pa.when_true.as_ref(), pb.when_true.as_ref())
                && self.sides_equal(pa.when_false.as_ref(), pb.when_false.as_ref())
        })
    }

    fn sides_equal(&self, a: Option<&EntityMap<D::Value>>, b: Option<&EntityMap<D::Value>>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.maps.is_stable(a, b),
            _ => false,
        }
    }
}
