use crate::config::DataflowConfig;
use crate::errors::{AnalysisError, Result};
use crate::features::cache::{CacheKey, CallContextKey};
use crate::features::flow_graph::{Procedure, SymbolId};
use crate::features::interprocedural::{CallFrame, InterproceduralPolicy};
use crate::features::lattice::{AnalysisData, EntityMap};
use std::hash::Hash;
use std::sync::Arc;

const DEFAULT_MAX_BLOCK_VISITS: usize = 100_000;

#[derive(Debug, Clone)]
pub struct AnalysisContext<V> {
    procedure: Arc<Procedure>,
    policy: InterproceduralPolicy,
    track_hazards: bool,
    predicate_analysis: bool,
    require_points_to: bool,
    max_block_visits: usize,
    frame: Option<Arc<CallFrame>>,
    initial_data: Option<AnalysisData<V>>,
    call_key: Option<CallContextKey<V>>,
}

impl<V: Clone + Hash> AnalysisContext<V> {
    pub fn builder(procedure: Arc<Procedure>) -> AnalysisContextBuilder<V> {
        AnalysisContextBuilder::new(procedure)
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn procedure_arc(&self) -> &Arc<Procedure> {
        &self.procedure
    }

    pub fn policy(&self) -> InterproceduralPolicy {
        self.policy
    }

    pub fn track_hazards(&self) -> bool {
        self.track_hazards
    }

    pub fn predicate_analysis(&self) -> bool {
        self.predicate_analysis
    }

    pub fn max_block_visits(&self) -> usize {
        self.max_block_visits
    }

    /// Frame of the call this context analyzes; `None` at top level
    pub fn frame(&self) -> Option<&Arc<CallFrame>> {
        self.frame.as_ref()
    }

    pub fn initial_data(&self) -> Option<&AnalysisData<V>> {
        self.initial_data.as_ref()
    }

    pub fn is_top_level(&self) -> bool {
        self.frame.is_none()
    }

    pub fn call_chain(&self) -> Vec<SymbolId> {
        match &self.frame {
            Some(frame) => frame.chain(),
            None => vec![self.procedure.id().clone()],
        }
    }

    pub fn cache_key(&self) -> CacheKey<V> {
        CacheKey {
            graph: self.procedure.graph.id(),
            symbol: self.procedure.id().clone(),
            policy: self.policy,
            track_hazards: self.track_hazards,
            predicate_analysis: self.predicate_analysis,
            context: self.call_key.clone(),
        }
    }

    /// Context for analyzing `callee` at the call described by `frame`
    ///
    /// Inherits policy and limits; callee hazards are never collected.
    pub fn fork_for_call(
        &self,
        callee: Arc<Procedure>,
        frame: Arc<CallFrame>,
        initial_data: AnalysisData<V>,
    ) -> Result<Self> {
        AnalysisContextBuilder::new(callee)
            .policy(self.policy)
            .predicate_analysis(self.predicate_analysis)
            .require_points_to(self.require_points_to)
            .max_block_visits(self.max_block_visits)
            .call_frame(frame, initial_data)
            .build()
    }
}

pub struct AnalysisContextBuilder<V> {
    procedure: Arc<Procedure>,
    policy: InterproceduralPolicy,
    track_hazards: bool,
    predicate_analysis: bool,
    require_points_to: bool,
    max_block_visits: usize,
    frame: Option<Arc<CallFrame>>,
    initial_data: Option<AnalysisData<V>>,
}

impl<V: Clone + Hash> AnalysisContextBuilder<V> {
    pub fn new(procedure: Arc<Procedure>) -> Self {
        Self {
            procedure,
            policy: InterproceduralPolicy::default(),
            track_hazards: false,
            predicate_analysis: true,
            require_points_to: false,
            max_block_visits: DEFAULT_MAX_BLOCK_VISITS,
            frame: None,
            initial_data: None,
        }
    }

    /// Take policy, flags and limits from a session configuration
    pub fn with_config(self, config: &DataflowConfig) -> Self {
        self.policy(config.policy())
            .track_hazards(config.track_hazards)
            .predicate_analysis(config.predicate_analysis)
            .require_points_to(config.require_points_to)
            .max_block_visits(config.max_block_visits)
    }

    pub fn policy(mut self, policy: InterproceduralPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn track_hazards(mut self, enabled: bool) -> Self {
        self.track_hazards = enabled;
        self
    }

    pub fn predicate_analysis(mut self, enabled: bool) -> Self {
        self.predicate_analysis = enabled;
        self
    }

    pub fn require_points_to(mut self, required: bool) -> Self {
        self.require_points_to = required;
        self
    }

    pub fn max_block_visits(mut self, limit: usize) -> Self {
        self.max_block_visits = limit;
        self
    }

    pub fn call_frame(mut self, frame: Arc<CallFrame>, initial_data: AnalysisData<V>) -> Self {
        self.frame = Some(frame);
        self.initial_data = Some(initial_data);
        self
    }

    pub fn build(self) -> Result<AnalysisContext<V>> {
        if self.require_points_to && self.procedure.points_to.is_none() {
            return Err(AnalysisError::MissingPointsTo {
                procedure: self.procedure.id().to_string(),
            });
        }

        // Derived contexts start from bound core state only
        let call_key = self.frame.as_ref().map(|frame| {
            let bindings = self
                .initial_data
                .as_ref()
                .map_or_else(EntityMap::new, |data| data.core().clone());
            CallContextKey::new(frame.chain(), bindings)
        });

        Ok(AnalysisContext {
            procedure: self.procedure,
            policy: self.policy,
            track_hazards: self.track_hazards,
            predicate_analysis: self.predicate_analysis,
            require_points_to: self.require_points_to,
            max_block_visits: self.max_block_visits,
            frame: self.frame,
            initial_data: self.initial_data,
            call_key,
        })
    }
}
