use crate::error::MiniflowError;
use crate::graph::Graph;
use crate::matrix::{BinaryOp, Matrix};
use crate::node::NodeId;
use crate::optim::optimizer_trait::Optimizer;

/// Stochastic gradient descent without momentum or weight decay.
#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    trainables: Vec<NodeId>,
    learning_rate: f64,
}

impl Sgd {
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

    /// Creates an optimizer over `trainables` with the given learning rate.
    pub fn new(trainables: impl IntoIterator<Item = NodeId>, learning_rate: f64) -> Self {
        Sgd {
            trainables: trainables.into_iter().collect(),
            learning_rate,
        }
    }

    /// Same as [`Sgd::new`] with a learning rate of 0.01.
    pub fn with_default_rate(trainables: impl IntoIterator<Item = NodeId>) -> Self {
        Sgd::new(trainables, Self::DEFAULT_LEARNING_RATE)
    }

    pub fn trainables(&self) -> &[NodeId] {
        &self.trainables
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, graph: &mut Graph) -> Result<(), MiniflowError> {
        sgd_update(graph, &self.trainables, self.learning_rate)
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }
}

/// Replaces each trainable's value with `value - learning_rate * gradient`,
/// where the gradient is the node's own accumulated self-gradient.
pub fn sgd_update(
    graph: &mut Graph,
    trainables: &[NodeId],
    learning_rate: f64,
) -> Result<(), MiniflowError> {
    for &id in trainables {
        let value = graph
            .value(id)
            .ok_or(MiniflowError::MissingValue { node: id })?;
        let grad = graph.gradient(id, id).ok_or_else(|| {
            MiniflowError::InvalidValue(format!(
                "{} has no self-gradient; run a backward pass before updating",
                id
            ))
        })?;
        let updated: Matrix =
            Matrix::combine(BinaryOp::Subtract, value, &grad.scale(learning_rate))?;
        log::trace!("sgd update {} with learning rate {}", id, learning_rate);
        graph.set_value(id, updated)?;
    }
    Ok(())
}
