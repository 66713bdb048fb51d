//! Forward and backward passes over a topological order.
//!
//! Both passes borrow the node being evaluated mutably and its neighbours
//! immutably by splitting the arena at the node's index: inbound nodes always
//! sit before it, outbound consumers always after it.

use super::Graph;
use crate::error::MiniflowError;
use crate::matrix::Matrix;
use crate::node::{BackwardContext, NodeId};
use std::fmt;

/// The output of a run: a bare number for 1x1 results, the matrix otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Scalar(f64),
    Matrix(Matrix),
}

impl Evaluated {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Evaluated::Scalar(v) => Some(*v),
            Evaluated::Matrix(_) => None,
        }
    }

    pub fn into_matrix(self) -> Matrix {
        match self {
            Evaluated::Scalar(v) => Matrix::scalar(v),
            Evaluated::Matrix(m) => m,
        }
    }
}

impl From<Matrix> for Evaluated {
    fn from(m: Matrix) -> Self {
        match m.as_scalar() {
            Some(v) => Evaluated::Scalar(v),
            None => Evaluated::Matrix(m),
        }
    }
}

impl fmt::Display for Evaluated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluated::Scalar(v) => write!(f, "{}", v),
            Evaluated::Matrix(m) => write!(f, "{}", m),
        }
    }
}

impl Graph {
    /// Runs every node's forward pass in `order`.
    pub fn forward(&mut self, order: &[NodeId]) -> Result<(), MiniflowError> {
        for &id in order {
            self.forward_node(id)?;
        }
        Ok(())
    }

    /// Runs every node's backward pass in reverse `order`, so each node sees
    /// the gradients its consumers have just computed.
    pub fn backward(&mut self, order: &[NodeId]) -> Result<(), MiniflowError> {
        for &id in order.iter().rev() {
            self.backward_node(id)?;
        }
        Ok(())
    }

    /// One full training pass: forward, then backward, then the value of `output`.
    ///
    /// `order` is left untouched, so the same order can be replayed on every
    /// iteration.
    pub fn forward_backward(
        &mut self,
        output: NodeId,
        order: &[NodeId],
    ) -> Result<Evaluated, MiniflowError> {
        self.node(output)?;
        self.forward(order)?;
        self.backward(order)?;
        let value = self
            .value(output)
            .cloned()
            .ok_or(MiniflowError::MissingValue { node: output })?;
        Ok(Evaluated::from(value))
    }

    fn forward_node(&mut self, id: NodeId) -> Result<(), MiniflowError> {
        let idx = id.index();
        if idx >= self.nodes.len() {
            return Err(MiniflowError::UnknownNode(id));
        }
        let (before, rest) = self.nodes.split_at_mut(idx);
        let node = &mut rest[0];

        let mut inputs = Vec::with_capacity(node.inbound.len());
        for dep in &node.inbound {
            let value = before[dep.index()]
                .value
                .as_ref()
                .ok_or(MiniflowError::MissingValue { node: *dep })?;
            inputs.push(value);
        }

        if let Some(value) = node.op.forward(&inputs)? {
            log::trace!("forward {} {}: {:?}", node.op.name(), id, value.shape());
            node.value = Some(value);
        }
        Ok(())
    }

    fn backward_node(&mut self, id: NodeId) -> Result<(), MiniflowError> {
        let idx = id.index();
        if idx >= self.nodes.len() {
            return Err(MiniflowError::UnknownNode(id));
        }
        let (head, after) = self.nodes.split_at_mut(idx + 1);
        let (before, current) = head.split_at_mut(idx);
        let node = &mut current[0];

        let mut inputs = Vec::with_capacity(node.inbound.len());
        for dep in &node.inbound {
            let value = before[dep.index()]
                .value
                .as_ref()
                .ok_or(MiniflowError::MissingValue { node: *dep })?;
            inputs.push(value);
        }

        let mut upstream = Vec::with_capacity(node.outbound.len());
        for consumer in &node.outbound {
            let grad = after[consumer.index() - idx - 1]
                .gradients
                .get(&id)
                .ok_or(MiniflowError::MissingGradient {
                    node: id,
                    consumer: *consumer,
                })?;
            upstream.push(grad);
        }

        let ctx = BackwardContext {
            node: id,
            inbound: &node.inbound,
            inputs,
            value: node.value.as_ref(),
            upstream,
        };
        let gradients = node.op.backward(&ctx)?;
        log::trace!(
            "backward {} {}: {} gradient(s)",
            node.op.name(),
            id,
            gradients.len()
        );
        node.gradients = gradients;
        Ok(())
    }
}
