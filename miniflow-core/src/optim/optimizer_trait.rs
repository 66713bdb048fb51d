use crate::error::MiniflowError;
use crate::graph::Graph;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers update the values of their trainable input nodes from the
/// self-gradients left behind by the last backward pass.
pub trait Optimizer {
    /// Performs a single optimization step on `graph`.
    ///
    /// # Returns
    ///
    /// `Ok(())` if every trainable was updated, or a `MiniflowError` if one
    /// of them has no value or no gradient yet.
    fn step(&mut self, graph: &mut Graph) -> Result<(), MiniflowError>;

    fn learning_rate(&self) -> f64;

    /// Changes the step size used by later calls to [`Optimizer::step`].
    fn set_learning_rate(&mut self, learning_rate: f64);
}
