//! # Nodes
//!
//! A node is a vertex of the computation graph. The graph arena owns every
//! node; edges are stored as [`NodeId`]s in both directions (`inbound` and the
//! automatically maintained `outbound`).
//!
//! The per-variant math lives behind the [`Operation`] trait:
//! - [`Input`](input::Input): a leaf whose value is fed from outside.
//! - [`Add`](add::Add), [`Multiply`](multiply::Multiply): variadic elementwise ops.
//! - [`Linear`](linear::Linear): `X·W + b`.
//! - [`Sigmoid`](sigmoid::Sigmoid): elementwise logistic function.
//! - [`MeanSquaredError`](mse::MeanSquaredError): the loss.

pub mod add;
pub mod input;
pub mod linear;
pub mod mse;
pub mod multiply;
pub mod sigmoid;

pub use add::Add;
pub use input::Input;
pub use linear::Linear;
pub use mse::MeanSquaredError;
pub use multiply::Multiply;
pub use sigmoid::Sigmoid;

use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};
use std::collections::HashMap;
use std::fmt;

/// Arena index of a node. Assigned sequentially by the graph, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gradient of the loss with respect to each dependency, keyed by the dependency's id.
pub type Gradients = HashMap<NodeId, Matrix>;

/// Everything a node's backward pass may read.
#[derive(Debug)]
pub struct BackwardContext<'a> {
    /// The node running backward.
    pub node: NodeId,
    /// Its inbound edges, in construction order.
    pub inbound: &'a [NodeId],
    /// The current value of each inbound node, aligned with `inbound`.
    pub inputs: Vec<&'a Matrix>,
    /// This node's own forward value.
    pub value: Option<&'a Matrix>,
    /// Each outbound consumer's gradient with respect to this node.
    pub upstream: Vec<&'a Matrix>,
}

impl<'a> BackwardContext<'a> {
    pub fn value(&self) -> Result<&'a Matrix, MiniflowError> {
        self.value
            .ok_or(MiniflowError::MissingValue { node: self.node })
    }

    /// One zero matrix per distinct inbound node, shaped like that node's value.
    pub fn zero_gradients(&self) -> Gradients {
        self.inbound
            .iter()
            .zip(&self.inputs)
            .map(|(&id, value)| (id, Matrix::zeros_like(value)))
            .collect()
    }
}

/// Adds `contribution` into `gradients[wrt]`, inserting it if the entry is absent.
pub fn accumulate_gradient(
    gradients: &mut Gradients,
    wrt: NodeId,
    contribution: &Matrix,
) -> Result<(), MiniflowError> {
    let total = match gradients.get(&wrt) {
        Some(existing) => Matrix::combine(BinaryOp::Add, existing, contribution)?,
        None => contribution.clone(),
    };
    gradients.insert(wrt, total);
    Ok(())
}

/// Defines the forward computation and the local gradient rule of a node.
///
/// Both passes default to `NotImplemented`; every concrete operation overrides them.
pub trait Operation: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Computes the node's value from its inbound values (in inbound order).
    ///
    /// Returning `Ok(None)` leaves the node's current value in place, which is
    /// how input nodes keep the value the scheduler fed them.
    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        let _ = inputs;
        Err(MiniflowError::NotImplemented {
            node: self.name().to_string(),
            pass: "forward",
        })
    }

    /// Computes this node's gradient map from the context.
    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let _ = ctx;
        Err(MiniflowError::NotImplemented {
            node: self.name().to_string(),
            pass: "backward",
        })
    }

    fn is_input(&self) -> bool {
        false
    }
}

/// A graph vertex: its edges, last value and last gradient map.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) inbound: Vec<NodeId>,
    pub(crate) outbound: Vec<NodeId>,
    pub(crate) value: Option<Matrix>,
    pub(crate) gradients: Gradients,
    pub(crate) op: Box<dyn Operation>,
}

impl Node {
    pub(crate) fn new(id: NodeId, inbound: Vec<NodeId>, op: Box<dyn Operation>) -> Self {
        Node {
            id,
            inbound,
            outbound: Vec::new(),
            value: None,
            gradients: Gradients::new(),
            op,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn inbound(&self) -> &[NodeId] {
        &self.inbound
    }

    pub fn outbound(&self) -> &[NodeId] {
        &self.outbound
    }

    pub fn value(&self) -> Option<&Matrix> {
        self.value.as_ref()
    }

    pub fn gradients(&self) -> &Gradients {
        &self.gradients
    }

    pub fn operation(&self) -> &dyn Operation {
        self.op.as_ref()
    }

    pub fn is_input(&self) -> bool {
        self.op.is_input()
    }
}

/// A bare number for 1x1 values, the full matrix otherwise, nothing before
/// the first forward pass.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => match value.as_scalar() {
                Some(scalar) => write!(f, "{}", scalar),
                None => write!(f, "{}", value),
            },
            None => Ok(()),
        }
    }
}
