//! Analysis session: client + resolver + result cache
//!
//! ```text
//! let session = AnalysisSession::new(client, DataflowConfig::preset(Preset::Balanced))?
//!     .with_resolver(registry);
//! let result = session.analyze(procedure)?;
//! ```

use crate::config::{DataflowConfig, Validatable};
use crate::errors::Result;
use crate::features::cache::{CacheStats, ResultCache};
use crate::features::context::domain::analysis_context::{AnalysisContext, AnalysisContextBuilder};
use crate::features::dataflow::{
    CancellationToken, DataFlowAnalysisResult, DataFlowClient, FixpointDriver, ValueOf,
};
use crate::features::flow_graph::Procedure;
use crate::features::interprocedural::{CalleeResolver, InterproceduralPolicy, ProcedureRegistry};
use rayon::prelude::*;
use std::sync::Arc;

pub type SessionResult<C> = Arc<DataFlowAnalysisResult<ValueOf<C>>>;

pub struct AnalysisSession<C: DataFlowClient> {
    client: C,
    config: DataflowConfig,
    resolver: Arc<dyn CalleeResolver>,
    cache: ResultCache<ValueOf<C>, DataFlowAnalysisResult<ValueOf<C>>>,
}

impl<C: DataFlowClient> AnalysisSession<C> {
    pub fn new(client: C, config: DataflowConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            kind = ?config.interprocedural.kind,
            max_call_chain = config.interprocedural.max_call_chain,
            track_hazards = config.track_hazards,
            "Dataflow session created"
        );

        let cache = ResultCache::new(config.cache.enabled);
        Ok(Self {
            client,
            config,
            resolver: Arc::new(ProcedureRegistry::new()),
            cache,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn CalleeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &DataflowConfig {
        &self.config
    }

    pub fn resolver(&self) -> &dyn CalleeResolver {
        self.resolver.as_ref()
    }

    pub fn cache(&self) -> &ResultCache<ValueOf<C>, DataFlowAnalysisResult<ValueOf<C>>> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Context builder preloaded with the session configuration
    pub fn context_for(&self, procedure: Arc<Procedure>) -> AnalysisContextBuilder<ValueOf<C>> {
        AnalysisContext::builder(procedure).with_config(&self.config)
    }

    /// Top-level analysis with the session configuration
    pub fn analyze(&self, procedure: Arc<Procedure>) -> Result<SessionResult<C>> {
        self.analyze_with_cancellation(procedure, &CancellationToken::new())
    }

    pub fn analyze_with_cancellation(
        &self,
        procedure: Arc<Procedure>,
        cancel: &CancellationToken,
    ) -> Result<SessionResult<C>> {
        let context = self.context_for(procedure).build()?;
        self.compute(&context, cancel)
    }

    /// Top-level analysis under an explicit policy and hazard flag
    pub fn get_or_compute(
        &self,
        procedure: Arc<Procedure>,
        policy: InterproceduralPolicy,
        track_hazards: bool,
        cancel: &CancellationToken,
    ) -> Result<SessionResult<C>> {
        let context = self
            .context_for(procedure)
            .policy(policy)
            .track_hazards(track_hazards)
            .build()?;
        self.compute(&context, cancel)
    }

    /// Cached fixpoint run for an arbitrary context
    pub fn compute(
        &self,
        context: &AnalysisContext<ValueOf<C>>,
        cancel: &CancellationToken,
    ) -> Result<SessionResult<C>> {
        self.cache
            .get_or_compute(context.cache_key(), || FixpointDriver::new(self, context, cancel).run())
    }

    /// Analyze independent procedures in parallel
    ///
    /// Results are in input order. One failing procedure does not affect
    /// the others.
    pub fn analyze_all(&self, procedures: &[Arc<Procedure>]) -> Vec<Result<SessionResult<C>>> {
        let cancel = CancellationToken::new();
        procedures
            .par_iter()
            .map(|procedure| self.analyze_with_cancellation(Arc::clone(procedure), &cancel))
            .collect()
    }
}
