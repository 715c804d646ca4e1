//! Client hooks invoked by the transfer engine
//!
//! A client supplies the value lattice and the semantics of the operations
//! it cares about. Every hook has a conservative default, so a client only
//! overrides what its rule observes. Hooks are pure with respect to the
//! state: they receive a read-only [`VisitContext`] and return values; the
//! engine performs all writes.

use crate::features::entity::{AnalysisEntity, EntityFactory};
use crate::features::flow_graph::{Literal, MethodRef, Operation, Procedure};
use crate::features::lattice::{AbstractValueDomain, AnalysisData, MissingEntryPolicy};
use crate::features::points_to::NullState;

/// Value type of a client's domain
pub type ValueOf<C> = <<C as DataFlowClient>::Domain as AbstractValueDomain>::Value;

/// Read-only view of the state at the operation being visited
pub struct VisitContext<'a, V> {
    data: &'a AnalysisData<V>,
    entities: EntityFactory<'a>,
    procedure: &'a Procedure,
}

impl<'a, V: Clone> VisitContext<'a, V> {
    pub fn new(data: &'a AnalysisData<V>, entities: EntityFactory<'a>, procedure: &'a Procedure) -> Self {
        Self {
            data,
            entities,
            procedure,
        }
    }

    pub fn data(&self) -> &'a AnalysisData<V> {
        self.data
    }

    pub fn procedure(&self) -> &'a Procedure {
        self.procedure
    }

    /// Tracked value of an entity, `None` when untracked
    pub fn value_of(&self, entity: &AnalysisEntity) -> Option<&'a V> {
        self.data.get(entity)
    }

    pub fn null_state(&self, op: &Operation) -> NullState {
        self.entities.null_state(op)
    }

    pub fn entity_of(&self, op: &Operation) -> Option<AnalysisEntity> {
        self.entities.try_create(op).ok()
    }

    /// Entity holding the state of the object `op` evaluates to
    pub fn object_entity_of(&self, op: &Operation) -> Option<AnalysisEntity> {
        self.entities.object_entity(op)
    }
}

/// Everything known at an invocation
pub struct InvocationSite<'a, V> {
    pub operation: &'a Operation,
    pub target: &'a MethodRef,
    pub receiver: Option<&'a Operation>,
    /// Receiver value before the call
    pub receiver_value: Option<&'a V>,
    pub arguments: &'a [Operation],
    pub argument_values: &'a [V],
    /// Callee return value when the callee was analyzed and returns a value
    pub callee_result: Option<V>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvocationOutcome<V> {
    /// Value of the invocation expression
    pub value: V,
    /// Recorded in the hazard map when hazard tracking is on
    pub hazard: Option<V>,
    /// New receiver state, written back by the engine
    pub receiver_value: Option<V>,
}

impl<V> InvocationOutcome<V> {
    pub fn value(value: V) -> Self {
        Self {
            value,
            hazard: None,
            receiver_value: None,
        }
    }

    pub fn with_hazard(mut self, hazard: V) -> Self {
        self.hazard = Some(hazard);
        self
    }

    pub fn with_receiver_value(mut self, value: V) -> Self {
        self.receiver_value = Some(value);
        self
    }
}

pub trait DataFlowClient: Send + Sync + Sized + 'static {
    type Domain: AbstractValueDomain;

    fn domain(&self) -> &Self::Domain;

    fn missing_entry_policy(&self) -> MissingEntryPolicy {
        MissingEntryPolicy::CarryThrough
    }

    fn literal_value(&self, _literal: &Literal) -> ValueOf<Self> {
        self.domain().unknown()
    }

    fn object_creation_value(
        &self,
        _cx: &VisitContext<'_, ValueOf<Self>>,
        _operation: &Operation,
        _type_name: &str,
        _arguments: &[ValueOf<Self>],
    ) -> ValueOf<Self> {
        self.domain().unknown()
    }

    /// New state of the instance after `instance.field = assigned`
    ///
    /// `None` leaves the instance unchanged.
    fn field_assignment(
        &self,
        _cx: &VisitContext<'_, ValueOf<Self>>,
        _instance_value: &ValueOf<Self>,
        _field: &str,
        _assigned: &Operation,
        _assigned_value: &ValueOf<Self>,
    ) -> Option<ValueOf<Self>> {
        None
    }

    fn invocation(
        &self,
        _cx: &VisitContext<'_, ValueOf<Self>>,
        site: &InvocationSite<'_, ValueOf<Self>>,
    ) -> InvocationOutcome<ValueOf<Self>> {
        let value = site
            .callee_result
            .clone()
            .unwrap_or_else(|| self.domain().unknown());
        InvocationOutcome::value(value)
    }

    /// Refinements implied by `checked` being null (or non-null)
    ///
    /// Called for both polarities of `checked == null` / `checked != null`;
    /// the returned entries become the predicated facts of the comparison.
    fn null_check(
        &self,
        _cx: &VisitContext<'_, ValueOf<Self>>,
        _checked: &AnalysisEntity,
        _is_null: bool,
    ) -> Vec<(AnalysisEntity, ValueOf<Self>)> {
        Vec::new()
    }
}
