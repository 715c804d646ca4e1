//! In-memory callee resolver

use crate::features::flow_graph::{Procedure, SymbolId};
use crate::features::interprocedural::ports::CalleeResolver;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Procedures by symbol, shared across concurrent analyses
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: RwLock<FxHashMap<SymbolId, Arc<Procedure>>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a procedure under its own symbol
    pub fn register(&self, procedure: Procedure) -> Arc<Procedure> {
        let procedure = Arc::new(procedure);
        self.register_arc(Arc::clone(&procedure));
        procedure
    }

    pub fn register_arc(&self, procedure: Arc<Procedure>) {
        let id = procedure.id().clone();
        if self.procedures.write().insert(id.clone(), procedure).is_some() {
            tracing::debug!(symbol = %id, "Replaced registered procedure");
        }
    }

    pub fn get(&self, symbol: &SymbolId) -> Option<Arc<Procedure>> {
        self.procedures.read().get(symbol).cloned()
    }

    pub fn remove(&self, symbol: &SymbolId) -> Option<Arc<Procedure>> {
        self.procedures.write().remove(symbol)
    }

    pub fn len(&self) -> usize {
        self.procedures.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.read().is_empty()
    }

    /// Snapshot, sorted by symbol
    pub fn procedures(&self) -> Vec<Arc<Procedure>> {
        let mut all: Vec<_> = self.procedures.read().values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }
}

impl CalleeResolver for ProcedureRegistry {
    fn resolve(&self, symbol: &SymbolId) -> Option<Arc<Procedure>> {
        self.get(symbol)
    }
}
