//! Copy-on-write entity → value map
//!
//! Cloning is an `Arc` bump; the first write after a clone copies the table
//! (`Arc::make_mut`), so block snapshots never share a mutable instance.

use crate::features::entity::AnalysisEntity;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EntityMap<V> {
    entries: Arc<FxHashMap<AnalysisEntity, V>>,
}

impl<V> Default for EntityMap<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(FxHashMap::default()),
        }
    }
}

impl<V> EntityMap<V> {
    pub fn get(&self, entity: &AnalysisEntity) -> Option<&V> {
        self.entries.get(entity)
    }

    pub fn contains(&self, entity: &AnalysisEntity) -> bool {
        self.entries.contains_key(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnalysisEntity, &V)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &AnalysisEntity> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Both maps share one table (no write since the clone)
    pub fn shares_storage(&self, other: &EntityMap<V>) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<V: Clone> EntityMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: AnalysisEntity, value: V) {
        Arc::make_mut(&mut self.entries).insert(entity, value);
    }

    pub fn remove(&mut self, entity: &AnalysisEntity) -> Option<V> {
        if !self.entries.contains_key(entity) {
            return None;
        }
        Arc::make_mut(&mut self.entries).remove(entity)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&AnalysisEntity, &V) -> bool) {
        if self.entries.iter().all(|(k, v)| keep(k, v)) {
            return;
        }
        Arc::make_mut(&mut self.entries).retain(|k, v| keep(k, v));
    }
}

impl<V: Clone> FromIterator<(AnalysisEntity, V)> for EntityMap<V> {
    fn from_iter<I: IntoIterator<Item = (AnalysisEntity, V)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<V: PartialEq> PartialEq for EntityMap<V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries) || *self.entries == *other.entries
    }
}

impl<V: Eq> Eq for EntityMap<V> {}
