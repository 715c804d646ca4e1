//! Single-flight result cache (DashMap + OnceCell slots)

use crate::features::cache::types::CacheKey;
use crate::features::flow_graph::GraphId;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type Slot<T> = Arc<OnceCell<Arc<T>>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Runs that returned an error (cancellation included)
    pub failures: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Results of type `T`, keyed by contexts binding values of type `V`
pub struct ResultCache<V, T> {
    slots: DashMap<CacheKey<V>, Slot<T>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl<V: Clone + Eq + Hash, T> ResultCache<V, T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            slots: DashMap::new(),
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Completed result for `key`, if any
    pub fn get(&self, key: &CacheKey<V>) -> Option<Arc<T>> {
        self.slots.get(key).and_then(|slot| slot.get().cloned())
    }

    pub fn contains(&self, key: &CacheKey<V>) -> bool {
        self.get(key).is_some()
    }

    /// Return the cached result or run `compute` exactly once for `key`
    ///
    /// Concurrent callers for the same key wait for the first one. An `Err`
    /// is returned to the computing caller only and the slot stays empty,
    /// so a later request recomputes.
    pub fn get_or_compute<E>(
        &self,
        key: CacheKey<V>,
        compute: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if !self.enabled {
            let result = compute();
            let counter = if result.is_ok() { &self.misses } else { &self.failures };
            counter.fetch_add(1, Ordering::Relaxed);
            return result.map(Arc::new);
        }

        // Clone the slot out so the shard lock is released before computing
        let slot: Slot<T> = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(value) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = %key, "Result cache hit");
            return Ok(Arc::clone(value));
        }

        let mut computed = false;
        let result = slot.get_or_try_init(|| {
            computed = true;
            compute().map(Arc::new)
        });

        match result {
            Ok(value) => {
                if computed {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(key = %key, "Result cache fill");
                } else {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                }
                Ok(Arc::clone(value))
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Result cache computation failed, slot left empty");
                Err(e)
            }
        }
    }

    /// Drop every entry computed over `graph`
    pub fn invalidate_graph(&self, graph: GraphId) -> usize {
        let mut removed = 0;
        self.slots.retain(|key, _| {
            if key.graph == graph {
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed > 0 {
            tracing::debug!(graph = graph.0, removed, "Invalidated cached results");
        }
        removed
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Completed entries
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
