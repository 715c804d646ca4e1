//! Dataflow client for a hazardous usage rule

use crate::features::dataflow::{DataFlowClient, InvocationOutcome, InvocationSite, VisitContext};
use crate::features::entity::{AnalysisEntity, EntityKind};
use crate::features::flow_graph::{Literal, Operation};
use crate::features::lattice::MissingEntryPolicy;
use crate::features::points_to::NullState;
use crate::features::property_set::domain::rule::HazardousUsageRule;
use crate::features::property_set::domain::value::{PropertySetDomain, PropertySetValue};

pub struct PropertySetClient {
    rule: HazardousUsageRule,
    domain: PropertySetDomain,
}

impl PropertySetClient {
    pub fn new(rule: HazardousUsageRule) -> Self {
        Self {
            rule,
            domain: PropertySetDomain,
        }
    }

    pub fn rule(&self) -> &HazardousUsageRule {
        &self.rule
    }

    fn guard_value(null_state: NullState) -> PropertySetValue {
        match null_state {
            NullState::Null => PropertySetValue::Flagged,
            NullState::NotNull => PropertySetValue::Unflagged,
            NullState::MaybeNull => PropertySetValue::MaybeFlagged,
        }
    }
}

impl DataFlowClient for PropertySetClient {
    type Domain = PropertySetDomain;

    fn domain(&self) -> &PropertySetDomain {
        &self.domain
    }

    fn missing_entry_policy(&self) -> MissingEntryPolicy {
        MissingEntryPolicy::CarryThrough
    }

    fn literal_value(&self, _literal: &Literal) -> PropertySetValue {
        PropertySetValue::NotApplicable
    }

    fn object_creation_value(
        &self,
        _cx: &VisitContext<'_, PropertySetValue>,
        _operation: &Operation,
        type_name: &str,
        _arguments: &[PropertySetValue],
    ) -> PropertySetValue {
        if self.rule.tracks_type(type_name) {
            // Guard property starts out null
            PropertySetValue::Flagged
        } else {
            PropertySetValue::NotApplicable
        }
    }

    fn field_assignment(
        &self,
        cx: &VisitContext<'_, PropertySetValue>,
        instance_value: &PropertySetValue,
        field: &str,
        assigned: &Operation,
        _assigned_value: &PropertySetValue,
    ) -> Option<PropertySetValue> {
        if field != self.rule.guard_field || !instance_value.is_tracked() {
            return None;
        }
        Some(Self::guard_value(cx.null_state(assigned)))
    }

    fn invocation(
        &self,
        _cx: &VisitContext<'_, PropertySetValue>,
        site: &InvocationSite<'_, PropertySetValue>,
    ) -> InvocationOutcome<PropertySetValue> {
        let value = site.callee_result.unwrap_or(PropertySetValue::Unknown);
        let mut outcome = InvocationOutcome::value(value);

        if self.rule.is_hazardous_method(site.target) {
            if let Some(receiver) = site.receiver_value.copied().filter(|v| v.is_hazardous()) {
                outcome = outcome.with_hazard(receiver);
            }
        } else if self.rule.is_hazardous_argument_method(site.target) {
            let worst = site
                .argument_values
                .iter()
                .copied()
                .filter(|v| v.is_hazardous())
                .max_by_key(|v| *v == PropertySetValue::Flagged);
            if let Some(argument) = worst {
                outcome = outcome.with_hazard(argument);
            }
        }
        outcome
    }

    fn null_check(
        &self,
        cx: &VisitContext<'_, PropertySetValue>,
        checked: &AnalysisEntity,
        is_null: bool,
    ) -> Vec<(AnalysisEntity, PropertySetValue)> {
        let EntityKind::Field(field) = checked.kind() else {
            return Vec::new();
        };
        if *field != self.rule.guard_field {
            return Vec::new();
        }
        let Some(instance) = checked.parent() else {
            return Vec::new();
        };
        match cx.value_of(instance) {
            Some(value) if value.is_tracked() => {
                let refined = if is_null {
                    PropertySetValue::Flagged
                } else {
                    PropertySetValue::Unflagged
                };
                vec![(instance.clone(), refined)]
            }
            _ => Vec::new(),
        }
    }
}
