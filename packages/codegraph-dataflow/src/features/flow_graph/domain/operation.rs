//! Typed operation trees
//!
//! Each basic block holds a sequence of root operations. Children are owned
//! by their parent and visited in evaluation order.

use super::procedure::SymbolId;
use crate::shared::models::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation identifier, unique within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u32);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareKind {
    Equals,
    NotEquals,
}

/// Distinguishes ordinary methods from lambdas and local functions, which
/// have their own call chain bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallTargetKind {
    Method,
    LocalFunction,
}

/// Call target as written at the call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub symbol: SymbolId,
    /// Simple method name (`Deserialize`), used by client rules
    pub name: String,
    pub containing_type: Option<String>,
    pub kind: CallTargetKind,
}

impl MethodRef {
    pub fn method(containing_type: impl Into<String>, name: impl Into<String>) -> Self {
        let containing_type = containing_type.into();
        let name = name.into();
        Self {
            symbol: SymbolId::new(format!("{containing_type}.{name}")),
            name,
            containing_type: Some(containing_type),
            kind: CallTargetKind::Method,
        }
    }

    pub fn local_function(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            symbol: SymbolId::new(name.clone()),
            name,
            containing_type: None,
            kind: CallTargetKind::LocalFunction,
        }
    }

    pub fn is_local_function(&self) -> bool {
        self.kind == CallTargetKind::LocalFunction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    Literal(Literal),
    LocalReference {
        name: String,
    },
    ParameterReference {
        index: usize,
        name: String,
    },
    /// `instance` is `None` for static fields
    FieldReference {
        instance: Option<Box<Operation>>,
        field: String,
    },
    ElementReference {
        array: Box<Operation>,
        index: Box<Operation>,
    },
    ObjectCreation {
        type_name: String,
        arguments: Vec<Operation>,
        /// Object initializer members, applied in order after construction
        initializers: Vec<(String, Operation)>,
    },
    Assignment {
        target: Box<Operation>,
        value: Box<Operation>,
    },
    Invocation {
        receiver: Option<Box<Operation>>,
        target: MethodRef,
        arguments: Vec<Operation>,
    },
    Return {
        value: Option<Box<Operation>>,
    },
    Compare {
        kind: CompareKind,
        left: Box<Operation>,
        right: Box<Operation>,
    },
    Not {
        operand: Box<Operation>,
    },
    Conversion {
        operand: Box<Operation>,
    },
    /// Locals leaving scope (end of a using/disposal region)
    ScopeEnd {
        locals: Vec<String>,
    },
    /// Any shape the engine has no transfer rule for
    Other {
        children: Vec<Operation>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub kind: OperationKind,
    /// Static type name, when the front end knows it
    pub ty: Option<String>,
    pub span: Option<Span>,
}

impl Operation {
    pub fn new(id: OperationId, kind: OperationKind) -> Self {
        Self {
            id,
            kind,
            ty: None,
            span: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<&Operation> {
        match &self.kind {
            OperationKind::Literal(_)
            | OperationKind::LocalReference { .. }
            | OperationKind::ParameterReference { .. }
            | OperationKind::ScopeEnd { .. } => Vec::new(),
            OperationKind::FieldReference { instance, .. } => {
                instance.iter().map(|op| op.as_ref()).collect()
            }
            OperationKind::ElementReference { array, index } => vec![array.as_ref(), index.as_ref()],
            OperationKind::ObjectCreation {
                arguments,
                initializers,
                ..
            } => arguments
                .iter()
                .chain(initializers.iter().map(|(_, op)| op))
                .collect(),
            OperationKind::Assignment { target, value } => vec![target.as_ref(), value.as_ref()],
            OperationKind::Invocation {
                receiver,
                arguments,
                ..
            } => receiver
                .iter()
                .map(|op| op.as_ref())
                .chain(arguments.iter())
                .collect(),
            OperationKind::Return { value } => value.iter().map(|op| op.as_ref()).collect(),
            OperationKind::Compare { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            OperationKind::Not { operand } | OperationKind::Conversion { operand } => {
                vec![operand.as_ref()]
            }
            OperationKind::Other { children } => children.iter().collect(),
        }
    }

    /// Pre-order walk over this operation and all descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Operation)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn find(&self, id: OperationId) -> Option<&Operation> {
        if self.id == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|child| child.find(id))
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.kind, OperationKind::Literal(Literal::Null))
    }

    /// Strips conversions
    pub fn unwrap_conversions(&self) -> &Operation {
        match &self.kind {
            OperationKind::Conversion { operand } => operand.unwrap_conversions(),
            _ => self,
        }
    }
}
