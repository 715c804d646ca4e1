//! Procedure symbols and the analyzable unit (symbol + graph + points-to)

use super::cfg::ControlFlowGraph;
use super::operation::CallTargetKind;
use crate::features::points_to::PointsToProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Fully qualified procedure name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcedureSymbol {
    pub id: SymbolId,
    /// Parameter names by position
    pub parameters: Vec<String>,
    /// False for void procedures
    pub returns_value: bool,
    pub kind: CallTargetKind,
}

impl ProcedureSymbol {
    pub fn method(id: impl Into<String>, parameters: &[&str], returns_value: bool) -> Self {
        Self {
            id: SymbolId::new(id),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            returns_value,
            kind: CallTargetKind::Method,
        }
    }

    pub fn local_function(id: impl Into<String>, parameters: &[&str], returns_value: bool) -> Self {
        Self {
            kind: CallTargetKind::LocalFunction,
            ..Self::method(id, parameters, returns_value)
        }
    }
}

/// One analyzable procedure
///
/// Graph and points-to result are shared read-only across concurrent
/// analyses.
#[derive(Clone)]
pub struct Procedure {
    pub symbol: ProcedureSymbol,
    pub graph: Arc<ControlFlowGraph>,
    pub points_to: Option<Arc<dyn PointsToProvider>>,
}

impl Procedure {
    pub fn new(symbol: ProcedureSymbol, graph: ControlFlowGraph) -> Self {
        Self {
            symbol,
            graph: Arc::new(graph),
            points_to: None,
        }
    }

    pub fn with_points_to(mut self, points_to: Arc<dyn PointsToProvider>) -> Self {
        self.points_to = Some(points_to);
        self
    }

    pub fn id(&self) -> &SymbolId {
        &self.symbol.id
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("symbol", &self.symbol.id)
            .field("graph", &self.graph.id())
            .field("blocks", &self.graph.len())
            .field("has_points_to", &self.points_to.is_some())
            .finish()
    }
}
