use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterproceduralKind {
    /// Only lambdas and local functions are analyzed at call sites
    None,
    /// Callees are analyzed with the caller's argument state
    #[default]
    ContextSensitive,
}

/// Effective interprocedural settings of one analysis run
///
/// Part of the result cache key: the same procedure analyzed under two
/// policies yields two entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterproceduralPolicy {
    pub kind: InterproceduralKind,
    /// Maximum number of method frames on the chain
    pub max_call_chain: u32,
    /// Maximum number of lambda / local function frames on the chain
    pub max_lambda_call_chain: u32,
    /// Reset argument and receiver state at calls that are not analyzed
    pub pessimistic: bool,
}

impl InterproceduralPolicy {
    pub fn intraprocedural() -> Self {
        Self {
            kind: InterproceduralKind::None,
            max_call_chain: 0,
            max_lambda_call_chain: 0,
            pessimistic: false,
        }
    }

    pub fn context_sensitive(max_call_chain: u32) -> Self {
        Self {
            kind: InterproceduralKind::ContextSensitive,
            max_call_chain,
            max_lambda_call_chain: max_call_chain.max(1),
            pessimistic: false,
        }
    }

    pub fn with_pessimistic(mut self, pessimistic: bool) -> Self {
        self.pessimistic = pessimistic;
        self
    }

    pub fn with_max_lambda_call_chain(mut self, depth: u32) -> Self {
        self.max_lambda_call_chain = depth;
        self
    }
}

impl Default for InterproceduralPolicy {
    fn default() -> Self {
        Self::context_sensitive(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&InterproceduralKind::ContextSensitive).unwrap();
        assert_eq!(json, "\"context_sensitive\"");
        let kind: InterproceduralKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, InterproceduralKind::None);
    }

    #[test]
    fn test_intraprocedural_analyzes_nothing() {
        let policy = InterproceduralPolicy::intraprocedural();
        assert_eq!(policy.kind, InterproceduralKind::None);
        assert_eq!(policy.max_call_chain, 0);
        assert_eq!(policy.max_lambda_call_chain, 0);
    }
}
