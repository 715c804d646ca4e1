//! Rule analyzer: session + hazard-to-finding conversion

use crate::config::{DataflowConfig, Validatable};
use crate::errors::Result;
use crate::features::context::AnalysisSession;
use crate::features::dataflow::{CancellationToken, DataFlowAnalysisResult, FixpointStats};
use crate::features::flow_graph::{OperationKind, Procedure, SymbolId};
use crate::features::interprocedural::CalleeResolver;
use crate::features::property_set::domain::finding::{FindingSeverity, HazardFinding};
use crate::features::property_set::domain::rule::HazardousUsageRule;
use crate::features::property_set::domain::value::PropertySetValue;
use crate::features::property_set::infrastructure::client::PropertySetClient;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct PropertySetReport {
    pub procedure: SymbolId,
    pub findings: Vec<HazardFinding>,
    pub stats: FixpointStats,
    #[serde(skip)]
    pub result: Arc<DataFlowAnalysisResult<PropertySetValue>>,
}

impl PropertySetReport {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct PropertySetAnalyzer {
    session: AnalysisSession<PropertySetClient>,
}

impl PropertySetAnalyzer {
    pub fn new(rule: HazardousUsageRule, config: DataflowConfig) -> Result<Self> {
        rule.validate()?;
        // Findings are the point of the analyzer
        let config = config.with_track_hazards(true);
        Ok(Self {
            session: AnalysisSession::new(PropertySetClient::new(rule), config)?,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn CalleeResolver>) -> Self {
        self.session = self.session.with_resolver(resolver);
        self
    }

    pub fn rule(&self) -> &HazardousUsageRule {
        self.session.client().rule()
    }

    pub fn session(&self) -> &AnalysisSession<PropertySetClient> {
        &self.session
    }

    pub fn analyze(&self, procedure: Arc<Procedure>) -> Result<PropertySetReport> {
        self.analyze_with_cancellation(procedure, &CancellationToken::new())
    }

    pub fn analyze_with_cancellation(
        &self,
        procedure: Arc<Procedure>,
        cancel: &CancellationToken,
    ) -> Result<PropertySetReport> {
        let policy = self.session.config().policy();
        let result = self
            .session
            .get_or_compute(Arc::clone(&procedure), policy, true, cancel)?;
        let findings = self.findings(&procedure, &result)?;
        if !findings.is_empty() {
            tracing::debug!(
                procedure = %procedure.id(),
                rule = %self.rule().id,
                findings = findings.len(),
                "Hazardous usages found"
            );
        }

        Ok(PropertySetReport {
            procedure: procedure.id().clone(),
            findings,
            stats: *result.stats(),
            result,
        })
    }

    /// Reports in input order
    pub fn analyze_all(&self, procedures: &[Arc<Procedure>]) -> Vec<Result<PropertySetReport>> {
        procedures
            .par_iter()
            .map(|procedure| self.analyze(Arc::clone(procedure)))
            .collect()
    }

    fn findings(
        &self,
        procedure: &Procedure,
        result: &DataFlowAnalysisResult<PropertySetValue>,
    ) -> Result<Vec<HazardFinding>> {
        let rule = self.rule();
        let mut findings = Vec::new();
        for (op_id, value) in result.hazards()? {
            let Some(severity) = FindingSeverity::from_value(*value) else {
                continue;
            };
            let operation = procedure.graph.find_operation(*op_id);
            let method = match operation.map(|op| &op.kind) {
                Some(OperationKind::Invocation { target, .. }) => target.name.clone(),
                _ => String::new(),
            };
            findings.push(HazardFinding {
                rule_id: rule.id.clone(),
                procedure: procedure.id().clone(),
                operation: *op_id,
                span: operation.and_then(|op| op.span),
                value: *value,
                severity,
                message: rule.message_for(&method),
                method,
            });
        }
        Ok(findings)
    }
}
