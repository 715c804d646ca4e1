use super::value::PropertySetValue;
use crate::features::flow_graph::{OperationId, SymbolId};
use crate::shared::models::Span;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Flagged on every path
    Definite,
    /// Flagged on some path
    Possible,
}

impl FindingSeverity {
    pub fn from_value(value: PropertySetValue) -> Option<Self> {
        match value {
            PropertySetValue::Flagged => Some(FindingSeverity::Definite),
            PropertySetValue::MaybeFlagged => Some(FindingSeverity::Possible),
            _ => None,
        }
    }
}

/// Hazard anchored at the invoking operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardFinding {
    pub rule_id: String,
    pub procedure: SymbolId,
    pub operation: OperationId,
    pub method: String,
    pub span: Option<Span>,
    pub value: PropertySetValue,
    pub severity: FindingSeverity,
    pub message: String,
}
