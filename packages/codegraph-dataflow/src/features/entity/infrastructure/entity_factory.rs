//! Entity creation from operations
//!
//! Field and element parents are resolved through points-to: when the
//! instance must denote one abstract location, the parent is that
//! `Location` entity, so accesses through aliases coincide. Otherwise the
//! parent is the instance's own reference entity.

use crate::errors::EntityNotSupported;
use crate::features::entity::domain::analysis_entity::{AnalysisEntity, ElementIndex};
use crate::features::flow_graph::{Literal, Operation, OperationKind};
use crate::features::points_to::{NullState, PointsToProvider};

#[derive(Clone, Copy)]
pub struct EntityFactory<'a> {
    points_to: Option<&'a dyn PointsToProvider>,
}

impl<'a> EntityFactory<'a> {
    pub fn new(points_to: Option<&'a dyn PointsToProvider>) -> Self {
        Self { points_to }
    }

    /// Entity for a location-denoting operation
    pub fn try_create(&self, op: &Operation) -> Result<AnalysisEntity, EntityNotSupported> {
        let entity = match &op.kind {
            OperationKind::LocalReference { name } => AnalysisEntity::local(name.clone()),
            OperationKind::ParameterReference { index, .. } => AnalysisEntity::parameter(*index),
            OperationKind::FieldReference { instance, field } => {
                let parent = match instance {
                    Some(instance) => Some(self.object_entity(instance).ok_or(EntityNotSupported)?),
                    None => None,
                };
                AnalysisEntity::field(parent, field.clone())
            }
            OperationKind::ElementReference { array, index } => {
                let parent = self.object_entity(array).ok_or(EntityNotSupported)?;
                let index = match &index.unwrap_conversions().kind {
                    OperationKind::Literal(Literal::Int(i)) => ElementIndex::Constant(*i),
                    _ => ElementIndex::Unknown,
                };
                AnalysisEntity::element(parent, index)
            }
            OperationKind::ObjectCreation { .. } => self
                .location_entity(op)
                .unwrap_or_else(|| AnalysisEntity::temporary(op.id)),
            OperationKind::Compare { .. } | OperationKind::Not { .. } => {
                AnalysisEntity::temporary(op.id)
            }
            // The assignment expression denotes its target
            OperationKind::Assignment { target, .. } => return self.try_create(target),
            OperationKind::Conversion { operand } => return self.try_create(operand),
            OperationKind::Literal(_)
            | OperationKind::Invocation { .. }
            | OperationKind::Return { .. }
            | OperationKind::ScopeEnd { .. }
            | OperationKind::Other { .. } => return Err(EntityNotSupported),
        };

        Ok(match &op.ty {
            Some(ty) => entity.with_type(ty.clone()),
            None => entity,
        })
    }

    /// `Location` entity when points-to says `op` denotes exactly one site
    pub fn location_entity(&self, op: &Operation) -> Option<AnalysisEntity> {
        let points_to = self.points_to?;
        let value = points_to
            .points_to(op.id)
            .or_else(|| points_to.points_to(op.unwrap_conversions().id))?;
        let location = value.single_location()?.clone();
        let ty = location.type_info.clone();
        let entity = AnalysisEntity::location(location);
        Some(match ty {
            Some(ty) => entity.with_type(ty),
            None => entity,
        })
    }

    /// Entity holding the state of the object `op` evaluates to
    pub fn object_entity(&self, op: &Operation) -> Option<AnalysisEntity> {
        self.location_entity(op).or_else(|| self.try_create(op).ok())
    }

    pub fn null_state(&self, op: &Operation) -> NullState {
        let op = op.unwrap_conversions();
        match &op.kind {
            OperationKind::Literal(Literal::Null) => NullState::Null,
            OperationKind::Literal(_) | OperationKind::ObjectCreation { .. } => NullState::NotNull,
            OperationKind::Assignment { value, .. } => self.null_state(value),
            _ => self
                .points_to
                .and_then(|p| p.points_to(op.id))
                .map(|v| v.null_state)
                .unwrap_or(NullState::MaybeNull),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::flow_graph::{OperationBuilder, OperationId};
    use crate::features::points_to::{AbstractLocation, PointsToMap, PointsToValue};
    use crate::features::entity::EntityKind;

    #[test]
    fn test_references_without_points_to() {
        let mut ops = OperationBuilder::new();
        let factory = EntityFactory::new(None);

        let x = ops.local("x");
        assert_eq!(factory.try_create(&x), Ok(AnalysisEntity::local("x")));

        let field = ops.field(x, "Binder");
        let entity = factory.try_create(&field).unwrap();
        assert_eq!(entity.parent(), Some(&AnalysisEntity::local("x")));

        let arr = ops.local("arr");
        let idx = ops.int(3);
        let elem = ops.element(arr, idx);
        assert_eq!(
            factory.try_create(&elem).unwrap().kind(),
            &EntityKind::Element(ElementIndex::Constant(3))
        );
    }

    #[test]
    fn test_untrackable_operations() {
        let mut ops = OperationBuilder::new();
        let factory = EntityFactory::new(None);
        let lit = ops.int(1);
        assert_eq!(factory.try_create(&lit), Err(EntityNotSupported));

        let call = ops.call(None, crate::features::flow_graph::MethodRef::local_function("f"), vec![]);
        assert_eq!(factory.try_create(&call), Err(EntityNotSupported));

        // Field of a call result has no parent entity
        let field = ops.field(call, "f");
        assert_eq!(factory.try_create(&field), Err(EntityNotSupported));
    }

    #[test]
    fn test_aliases_resolve_to_location_parent() {
        let mut ops = OperationBuilder::new();
        let a = ops.local("a");
        let b = ops.local("b");
        let loc = AbstractLocation::new(0, "alloc:op0:Serializer");
        let pta = PointsToMap::new()
            .with(a.id, PointsToValue::location(loc.clone()))
            .with(b.id, PointsToValue::location(loc.clone()));
        let factory = EntityFactory::new(Some(&pta as &dyn PointsToProvider));

        let af = ops.field(a, "Binder");
        let bf = ops.field(b, "Binder");
        let af = factory.try_create(&af).unwrap();
        let bf = factory.try_create(&bf).unwrap();
        assert_eq!(af, bf);
        assert_eq!(af.parent(), Some(&AnalysisEntity::location(loc)));
    }

    #[test]
    fn test_null_state_classification() {
        let mut ops = OperationBuilder::new();
        let factory = EntityFactory::new(None);
        let null = ops.null();
        assert_eq!(factory.null_state(&null), NullState::Null);
        let converted = ops.convert(null, "Binder");
        assert_eq!(factory.null_state(&converted), NullState::Null);
        let created = ops.new_object("Binder", vec![]);
        assert_eq!(factory.null_state(&created), NullState::NotNull);
        let p = ops.param(0, "p");
        assert_eq!(factory.null_state(&p), NullState::MaybeNull);

        let pta = PointsToMap::new().with(OperationId(p.id.0), PointsToValue::null());
        let factory = EntityFactory::new(Some(&pta as &dyn PointsToProvider));
        assert_eq!(factory.null_state(&p), NullState::Null);
    }
}
