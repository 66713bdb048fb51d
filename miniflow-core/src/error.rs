use crate::node::NodeId;
use thiserror::Error;

/// Custom error type for the miniflow engine.
///
/// Every failure is unrecoverable at the point of detection: a forward or
/// backward pass that hits one of these aborts and hands it to the caller.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum MiniflowError {
    #[error("Shape mismatch during {operation}: {lhs:?} and {rhs:?}")]
    ShapeMismatch {
        operation: String,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("{pass} is not implemented for node {node}")]
    NotImplemented { node: String, pass: &'static str },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Node {0} does not belong to this graph")]
    UnknownNode(NodeId),

    #[error("Node {node} has no value; run the forward pass (or feed it) first")]
    MissingValue { node: NodeId },

    #[error("Node {consumer} holds no gradient for node {node}; backward ran out of order")]
    MissingGradient { node: NodeId, consumer: NodeId },

    #[error("Cycle detected in the computation graph during topological sort.")]
    CycleDetected,
}

impl MiniflowError {
    pub(crate) fn shape_mismatch(
        operation: impl Into<String>,
        lhs: (usize, usize),
        rhs: (usize, usize),
    ) -> Self {
        MiniflowError::ShapeMismatch {
            operation: operation.into(),
            lhs,
            rhs,
        }
    }
}
