use crate::features::flow_graph::{GraphId, SymbolId};
use crate::features::interprocedural::InterproceduralPolicy;
use crate::features::lattice::EntityMap;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a derived (callee) context
///
/// Two contexts are the same only if their bound entity states are equal;
/// the fingerprint only picks the hash bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContextKey<V> {
    /// Root caller first
    pub chain: Vec<SymbolId>,
    /// Entity state bound at the call
    pub bindings: EntityMap<V>,
}

impl<V> CallContextKey<V> {
    pub fn new(chain: Vec<SymbolId>, bindings: EntityMap<V>) -> Self {
        Self { chain, bindings }
    }
}

impl<V: Hash> CallContextKey<V> {
    /// Hash of the bindings, independent of iteration order
    pub fn fingerprint(&self) -> u64 {
        let mut acc = 0u64;
        for (entity, value) in self.bindings.iter() {
            let mut hasher = FxHasher::default();
            entity.hash(&mut hasher);
            value.hash(&mut hasher);
            acc = acc.wrapping_add(hasher.finish());
        }
        acc ^ (self.bindings.len() as u64).rotate_left(32)
    }
}

impl<V: Hash> Hash for CallContextKey<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain.hash(state);
        self.fingerprint().hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey<V> {
    pub graph: GraphId,
    pub symbol: SymbolId,
    pub policy: InterproceduralPolicy,
    pub track_hazards: bool,
    pub predicate_analysis: bool,
    /// `None` for top-level analyses
    pub context: Option<CallContextKey<V>>,
}

impl<V> CacheKey<V> {
    pub fn is_top_level(&self) -> bool {
        self.context.is_none()
    }
}

impl<V: Hash> fmt::Display for CacheKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.symbol, self.graph.0)?;
        if self.track_hazards {
            f.write_str("+hazards")?;
        }
        if let Some(context) = &self.context {
            write!(f, "@{}:{:016x}", context.chain.len(), context.fingerprint())?;
        }
        Ok(())
    }
}
