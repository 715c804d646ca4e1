//! Transfer functions
//!
//! One exhaustive visit per operation kind. The engine owns every state
//! write; clients only compute values through [`DataFlowClient`] hooks.
//!
//! Object state is written under two entities when points-to resolves the
//! reference to a single allocation site: the reference itself (`x`) and
//! the `Location` it denotes. Reads prefer the `Location`, so an update
//! through one alias is observed through every other.

use crate::errors::Result;
use crate::features::context::{AnalysisContext, AnalysisSession};
use crate::features::dataflow::domain::cancellation::CancellationToken;
use crate::features::dataflow::domain::result::{DataFlowAnalysisResult, PredicateValueKind};
use crate::features::dataflow::ports::client::{
    DataFlowClient, InvocationSite, ValueOf, VisitContext,
};
use crate::features::entity::{AnalysisEntity, EntityFactory, EntityKind};
use crate::features::flow_graph::{
    BasicBlock, CompareKind, Edge, EdgeKind, Literal, MethodRef, Operation, OperationId,
    OperationKind,
};
use crate::features::interprocedural::{CallDecision, InterproceduralForker};
use crate::features::lattice::{
    AbstractValueDomain, AnalysisData, EntityMap, MapAbstractDomain, PredicatedData,
};
use crate::features::points_to::NullState;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

/// Everything the engine accumulated over a run
pub(crate) struct TransferOutput<V> {
    pub operation_values: FxHashMap<OperationId, V>,
    pub return_value: Option<V>,
    pub hazards: Option<BTreeMap<OperationId, V>>,
    pub reassigned_parameters: FxHashSet<usize>,
    pub predicate_kinds: FxHashMap<OperationId, PredicateValueKind>,
    pub interprocedural_calls: usize,
}

pub struct TransferEngine<'a, C: DataFlowClient> {
    session: &'a AnalysisSession<C>,
    context: &'a AnalysisContext<ValueOf<C>>,
    cancel: &'a CancellationToken,
    maps: MapAbstractDomain<'a, C::Domain>,
    entities: EntityFactory<'a>,
    operation_values: FxHashMap<OperationId, ValueOf<C>>,
    predicate_kinds: FxHashMap<OperationId, PredicateValueKind>,
    /// Per return statement; overwritten on revisits, merged at the end
    return_values: FxHashMap<OperationId, ValueOf<C>>,
    reassigned_parameters: FxHashSet<usize>,
    hazards: Option<BTreeMap<OperationId, ValueOf<C>>>,
    analyzed_calls: FxHashSet<OperationId>,
}

impl<'a, C: DataFlowClient> TransferEngine<'a, C> {
    pub fn new(
        session: &'a AnalysisSession<C>,
        context: &'a AnalysisContext<ValueOf<C>>,
        cancel: &'a CancellationToken,
    ) -> Self {
        let client = session.client();
        Self {
            session,
            context,
            cancel,
            maps: MapAbstractDomain::new(client.domain(), client.missing_entry_policy()),
            entities: EntityFactory::new(context.procedure().points_to.as_deref()),
            operation_values: FxHashMap::default(),
            predicate_kinds: FxHashMap::default(),
            return_values: FxHashMap::default(),
            reassigned_parameters: FxHashSet::default(),
            hazards: None,
            analyzed_calls: FxHashSet::default(),
        }
    }

    pub fn maps(&self) -> MapAbstractDomain<'a, C::Domain> {
        self.maps
    }

    /// Hazards are recorded from here on (final pass over stable inputs)
    pub fn begin_hazard_collection(&mut self) {
        self.hazards = Some(BTreeMap::new());
    }

    pub(crate) fn finish(self) -> TransferOutput<ValueOf<C>> {
        let return_value = self.maps.values().merge_all(self.return_values.values());

        TransferOutput {
            operation_values: self.operation_values,
            return_value,
            hazards: self.hazards,
            reassigned_parameters: self.reassigned_parameters,
            predicate_kinds: self.predicate_kinds,
            interprocedural_calls: self.analyzed_calls.len(),
        }
    }

    fn client(&self) -> &'a C {
        self.session.client()
    }

    fn unknown(&self) -> ValueOf<C> {
        self.maps.values().unknown()
    }

    fn visit_context<'s>(&'s self, data: &'s AnalysisData<ValueOf<C>>) -> VisitContext<'s, ValueOf<C>> {
        VisitContext::new(data, self.entities, self.context.procedure())
    }

    /// Apply a block's operations (and branch condition) to its input
    pub fn visit_block(
        &mut self,
        input: AnalysisData<ValueOf<C>>,
        block: &BasicBlock,
    ) -> Result<AnalysisData<ValueOf<C>>> {
        if !input.is_reachable() {
            return Ok(input);
        }
        let mut data = input;
        for op in &block.operations {
            self.visit(&mut data, op)?;
        }
        if let Some(condition) = &block.branch_value {
            self.visit(&mut data, condition)?;
        }
        Ok(data)
    }

    /// State flowing along `edge` out of `block`
    ///
    /// Conditional edges apply the predicated facts of the branch value and
    /// are infeasible (unreachable state) when the condition is statically
    /// known to take the other value.
    pub fn flow_edge(
        &self,
        data: &AnalysisData<ValueOf<C>>,
        block: &BasicBlock,
        edge: &Edge,
    ) -> AnalysisData<ValueOf<C>> {
        let polarity = match edge.kind {
            EdgeKind::Unconditional => return data.clone(),
            EdgeKind::WhenTrue => true,
            EdgeKind::WhenFalse => false,
        };
        if !data.is_reachable() || !self.context.predicate_analysis() {
            return data.clone();
        }
        let Some(condition) = &block.branch_value else {
            return data.clone();
        };

        if let Some(kind) = self.predicate_kinds.get(&condition.unwrap_conversions().id) {
            if !kind.admits(polarity) {
                tracing::trace!(block = %block.id, target = %edge.target, "Infeasible edge");
                return AnalysisData::unreachable();
            }
        }

        let mut out = data.clone();
        if let Some(entity) = self.predicate_entity(condition) {
            out.apply_predicate(&entity, polarity);
        }
        out
    }

    /// Visit one operation tree; returns its value
    pub fn visit(&mut self, data: &mut AnalysisData<ValueOf<C>>, op: &Operation) -> Result<ValueOf<C>> {
        let value = match &op.kind {
            OperationKind::Literal(literal) => {
                if let Literal::Bool(b) = literal {
                    self.predicate_kinds.insert(op.id, PredicateValueKind::from_bool(*b));
                }
                self.client().literal_value(literal)
            }
            OperationKind::LocalReference { .. } | OperationKind::ParameterReference { .. } => {
                self.read(data, op)
            }
            OperationKind::FieldReference { instance, .. } => {
                if let Some(instance) = instance {
                    self.visit(data, instance)?;
                }
                self.read(data, op)
            }
            OperationKind::ElementReference { array, index } => {
                self.visit(data, array)?;
                self.visit(data, index)?;
                self.read(data, op)
            }
            OperationKind::ObjectCreation {
                type_name,
                arguments,
                initializers,
            } => self.visit_object_creation(data, op, type_name, arguments, initializers)?,
            OperationKind::Assignment { target, value } => self.visit_assignment(data, target, value)?,
            OperationKind::Invocation {
                receiver,
                target,
                arguments,
            } => self.visit_invocation(data, op, receiver.as_deref(), target, arguments)?,
            OperationKind::Return { value } => match value {
                Some(value) => {
                    let v = self.visit(data, value)?;
                    self.return_values.insert(op.id, v.clone());
                    v
                }
                None => self.maps.values().bottom(),
            },
            OperationKind::Compare { kind, left, right } => {
                self.visit(data, left)?;
                self.visit(data, right)?;
                if self.context.predicate_analysis() {
                    self.analyze_comparison(data, op, *kind, left, right);
                }
                self.unknown()
            }
            OperationKind::Not { operand } => {
                self.visit(data, operand)?;
                self.analyze_negation(data, op, operand);
                self.unknown()
            }
            OperationKind::Conversion { operand } => self.visit(data, operand)?,
            OperationKind::ScopeEnd { locals } => {
                for local in locals {
                    data.stop_tracking(&AnalysisEntity::local(local.clone()));
                }
                self.maps.values().bottom()
            }
            OperationKind::Other { children } => {
                for child in children {
                    self.visit(data, child)?;
                }
                self.unknown()
            }
        };

        self.operation_values.insert(op.id, value.clone());
        Ok(value)
    }

    /// Current value of a reference
    fn read(&self, data: &AnalysisData<ValueOf<C>>, op: &Operation) -> ValueOf<C> {
        if let Some(location) = self.entities.location_entity(op) {
            if let Some(value) = data.get(&location) {
                return value.clone();
            }
        }
        match self.entities.try_create(op) {
            Ok(entity) => self.maps.get_or_default(data.core(), &entity),
            Err(_) => self.unknown(),
        }
    }

    /// Write the state of the object `op` refers to
    fn write_object(&self, data: &mut AnalysisData<ValueOf<C>>, op: &Operation, value: ValueOf<C>) {
        let location = self.entities.location_entity(op);
        if let Ok(entity) = self.entities.try_create(op) {
            if location.as_ref() != Some(&entity) {
                data.set(entity, value.clone());
            }
        }
        if let Some(location) = location {
            data.set(location, value);
        }
    }

    fn visit_object_creation(
        &mut self,
        data: &mut AnalysisData<ValueOf<C>>,
        op: &Operation,
        type_name: &str,
        arguments: &[Operation],
        initializers: &[(String, Operation)],
    ) -> Result<ValueOf<C>> {
        let mut argument_values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_values.push(self.visit(data, argument)?);
        }

        // A fresh object: nothing tracked under its allocation site survives
        let location = self.entities.location_entity(op);
        if let Some(location) = &location {
            for stale in data.descendants(location) {
                data.remove(&stale);
            }
        }

        let mut value = {
            let cx = self.visit_context(data);
            self.client()
                .object_creation_value(&cx, op, type_name, &argument_values)
        };

        for (field, initializer) in initializers {
            let assigned = self.visit(data, initializer)?;
            let updated = {
                let cx = self.visit_context(data);
                self.client()
                    .field_assignment(&cx, &value, field, initializer, &assigned)
            };
            if let Some(updated) = updated {
                value = updated;
            }
            if let Some(location) = &location {
                data.set(AnalysisEntity::field(Some(location.clone()), field.clone()), assigned);
            }
        }

        if let Some(location) = location {
            data.set(location, value.clone());
        }
        Ok(value)
    }

    fn visit_assignment(
        &mut self,
        data: &mut AnalysisData<ValueOf<C>>,
        target: &Operation,
        value_op: &Operation,
    ) -> Result<ValueOf<C>> {
        // Operands of the target are evaluated, the target itself is written
        match &target.kind {
            OperationKind::FieldReference {
                instance: Some(instance),
                ..
            } => {
                self.visit(data, instance)?;
            }
            OperationKind::ElementReference { array, index } => {
                self.visit(data, array)?;
                self.visit(data, index)?;
            }
            _ => {}
        }
        let value = self.visit(data, value_op)?;

        if let Ok(entity) = self.entities.try_create(target) {
            if let EntityKind::Parameter(index) = entity.kind() {
                self.reassigned_parameters.insert(*index);
            }
            // Rebinding a reference without a known location forgets the
            // fields tracked through it
            if self.entities.location_entity(target).is_none() {
                for stale in data.descendants(&entity) {
                    data.remove(&stale);
                }
            }
            self.write_object(data, target, value.clone());

            if self.context.predicate_analysis() && entity.is_predicate_candidate() {
                match self.predicate_entity(value_op) {
                    Some(source) => data.copy_predicate(&source, entity),
                    None => data.remove_predicate(&entity),
                }
            }
        }

        if let OperationKind::FieldReference {
            instance: Some(instance),
            field,
        } = &target.kind
        {
            let instance_value = self.read(data, instance);
            let updated = {
                let cx = self.visit_context(data);
                self.client()
                    .field_assignment(&cx, &instance_value, field, value_op, &value)
            };
            if let Some(updated) = updated {
                self.write_object(data, instance, updated);
            }
        }

        self.operation_values.insert(target.id, value.clone());
        Ok(value)
    }

    fn visit_invocation(
        &mut self,
        data: &mut AnalysisData<ValueOf<C>>,
        op: &Operation,
        receiver: Option<&Operation>,
        target: &MethodRef,
        arguments: &[Operation],
    ) -> Result<ValueOf<C>> {
        let receiver_value = match receiver {
            Some(receiver) => Some(self.visit(data, receiver)?),
            None => None,
        };
        let mut argument_values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_values.push(self.visit(data, argument)?);
        }

        let decision = self.forker().decide(op.id, target);
        let callee = match decision {
            CallDecision::Analyze { callee, frame } => {
                tracing::debug!(
                    call = %op.id,
                    callee = %callee.id(),
                    depth = frame.method_depth() + frame.lambda_depth(),
                    "Analyzing callee in derived context"
                );
                let returns_value = callee.symbol.returns_value;
                let initial = self.bind_arguments(data, arguments, &argument_values);
                let child = self.context.fork_for_call(callee, frame, initial)?;
                let result = self.session.compute(&child, self.cancel)?;
                self.analyzed_calls.insert(op.id);
                Ok((result, returns_value))
            }
            CallDecision::Skip(reason) => {
                tracing::debug!(call = %op.id, target = %target.symbol, %reason, "Call not analyzed");
                Err(reason)
            }
        };
        let callee_result = match &callee {
            Ok((result, true)) => Some(result.return_value().cloned().unwrap_or_else(|| self.unknown())),
            _ => None,
        };

        // The client sees the state before the callee's effects
        let outcome = {
            let cx = self.visit_context(data);
            let site = InvocationSite {
                operation: op,
                target,
                receiver,
                receiver_value: receiver_value.as_ref(),
                arguments,
                argument_values: &argument_values,
                callee_result,
            };
            self.client().invocation(&cx, &site)
        };

        match callee {
            Ok((result, _)) => self.map_back(data, &result, arguments),
            Err(_) if self.context.policy().pessimistic => {
                self.reset_call_operands(data, receiver, arguments)
            }
            Err(_) => {}
        }

        if let Some(hazard) = outcome.hazard {
            if let Some(hazards) = self.hazards.as_mut() {
                hazards.insert(op.id, hazard);
            }
        }
        if let (Some(receiver), Some(updated)) = (receiver, outcome.receiver_value) {
            self.write_object(data, receiver, updated);
        }
        Ok(outcome.value)
    }

    fn forker(&self) -> InterproceduralForker<'a> {
        InterproceduralForker::new(
            self.context.policy(),
            self.session.resolver(),
            self.context.procedure().id(),
            self.context.frame(),
        )
    }

    /// Bind the caller's argument state to callee parameters
    fn bind_arguments(
        &self,
        data: &AnalysisData<ValueOf<C>>,
        arguments: &[Operation],
        argument_values: &[ValueOf<C>],
    ) -> AnalysisData<ValueOf<C>> {
        let mut initial = AnalysisData::new();
        for (index, (argument, value)) in arguments.iter().zip(argument_values).enumerate() {
            let parameter = AnalysisEntity::parameter(index);
            initial.set(parameter.clone(), value.clone());

            let Some(object) = self.entities.object_entity(argument) else {
                continue;
            };
            for (entity, field_value) in data.core().iter() {
                if !entity.has_ancestor(&object) {
                    continue;
                }
                if let Some(rebased) = entity.rebase(&object, &parameter) {
                    initial.set(rebased, field_value.clone());
                }
            }
        }
        initial
    }

    /// Copy the callee's exit state of each parameter back to its argument
    fn map_back(
        &self,
        data: &mut AnalysisData<ValueOf<C>>,
        result: &DataFlowAnalysisResult<ValueOf<C>>,
        arguments: &[Operation],
    ) {
        let exit = result.exit_data();
        if !exit.is_reachable() {
            return;
        }
        for (index, argument) in arguments.iter().enumerate() {
            // A rebound parameter no longer describes the argument object
            if result.reassigned_parameters().contains(&index) {
                continue;
            }
            let Some(object) = self.entities.object_entity(argument) else {
                continue;
            };
            let parameter = AnalysisEntity::parameter(index);
            for (entity, value) in exit.core().iter() {
                if entity == &parameter {
                    self.write_object(data, argument, value.clone());
                } else if let Some(rebased) = entity.rebase(&parameter, &object) {
                    data.set(rebased, value.clone());
                }
            }
        }
    }

    fn reset_call_operands(
        &self,
        data: &mut AnalysisData<ValueOf<C>>,
        receiver: Option<&Operation>,
        arguments: &[Operation],
    ) {
        let unknown = self.unknown();
        for operand in receiver.into_iter().chain(arguments) {
            let Some(object) = self.entities.object_entity(operand) else {
                continue;
            };
            for stale in data.descendants(&object) {
                data.set(stale, unknown.clone());
            }
            self.write_object(data, operand, unknown.clone());
        }
    }

    /// Entity whose predicate describes the boolean `op` evaluates to
    fn predicate_entity(&self, op: &Operation) -> Option<AnalysisEntity> {
        let op = op.unwrap_conversions();
        match &op.kind {
            OperationKind::Compare { .. } | OperationKind::Not { .. } => {
                Some(AnalysisEntity::temporary(op.id))
            }
            OperationKind::LocalReference { .. } => self.entities.try_create(op).ok(),
            OperationKind::Assignment { target, .. } => self.predicate_entity(target),
            _ => None,
        }
    }

    fn analyze_comparison(
        &mut self,
        data: &mut AnalysisData<ValueOf<C>>,
        op: &Operation,
        kind: CompareKind,
        left: &Operation,
        right: &Operation,
    ) {
        let temporary = AnalysisEntity::temporary(op.id);
        let (left, right) = (left.unwrap_conversions(), right.unwrap_conversions());

        if let (OperationKind::Literal(a), OperationKind::Literal(b)) = (&left.kind, &right.kind) {
            let holds = (a == b) == (kind == CompareKind::Equals);
            self.predicate_kinds.insert(op.id, PredicateValueKind::from_bool(holds));
            data.remove_predicate(&temporary);
            return;
        }

        let checked = if right.is_null_literal() {
            left
        } else if left.is_null_literal() {
            right
        } else {
            data.remove_predicate(&temporary);
            return;
        };
        let null_when_true = kind == CompareKind::Equals;

        match self.entities.null_state(checked) {
            NullState::Null => {
                self.predicate_kinds
                    .insert(op.id, PredicateValueKind::from_bool(null_when_true));
            }
            NullState::NotNull => {
                self.predicate_kinds
                    .insert(op.id, PredicateValueKind::from_bool(!null_when_true));
            }
            NullState::MaybeNull => {}
        }

        let Ok(entity) = self.entities.try_create(checked) else {
            data.remove_predicate(&temporary);
            return;
        };
        let (when_true, when_false) = {
            let cx = self.visit_context(data);
            (
                self.client().null_check(&cx, &entity, null_when_true),
                self.client().null_check(&cx, &entity, !null_when_true),
            )
        };

        let side = |facts: Vec<(AnalysisEntity, ValueOf<C>)>| {
            if facts.is_empty() {
                None
            } else {
                Some(facts.into_iter().collect::<EntityMap<_>>())
            }
        };
        data.start_tracking_predicate(temporary, PredicatedData::new(side(when_true), side(when_false)));
    }

    fn analyze_negation(&mut self, data: &mut AnalysisData<ValueOf<C>>, op: &Operation, operand: &Operation) {
        if let Some(kind) = self.predicate_kinds.get(&operand.unwrap_conversions().id).copied() {
            self.predicate_kinds.insert(op.id, kind.negate());
        }
        if !self.context.predicate_analysis() {
            return;
        }

        let temporary = AnalysisEntity::temporary(op.id);
        let negated = self
            .predicate_entity(operand)
            .and_then(|entity| data.predicate(&entity).map(PredicatedData::negated));
        match negated {
            Some(predicate) => data.start_tracking_predicate(temporary, predicate),
            None => data.remove_predicate(&temporary),
        }
    }
}
