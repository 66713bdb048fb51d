use super::{accumulate_gradient, BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};

/// Elementwise sum of one or more inbound values, broadcasting per `Matrix::combine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl Operation for Add {
    fn name(&self) -> &'static str {
        "Add"
    }

    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        let (first, rest) = inputs
            .split_first()
            .ok_or_else(|| MiniflowError::InvalidValue("Add needs at least one input".to_string()))?;
        let mut total = (*first).clone();
        for value in rest {
            total = Matrix::combine(BinaryOp::Add, &total, value)?;
        }
        Ok(Some(total))
    }

    /// Identity pass-through: every inbound receives the full downstream
    /// gradient, summed back over any dimension the forward pass broadcast.
    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let mut gradients = ctx.zero_gradients();
        for grad_cost in &ctx.upstream {
            for (&id, value) in ctx.inbound.iter().zip(&ctx.inputs) {
                let local = grad_cost.reduce_to_shape(value.rows(), value.cols())?;
                accumulate_gradient(&mut gradients, id, &local)?;
            }
        }
        Ok(gradients)
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Evaluated, FeedDict, Graph};
    use crate::matrix::Matrix;
    use crate::error::MiniflowError;

    #[test]
    fn test_add_three_scalars() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (x, y, z) = (graph.input(), graph.input(), graph.input());
        let f = graph.add(&[x, y, z])?;

        let mut feed = FeedDict::new();
        feed.bind("x", x, 10)?.bind("y", y, 5)?.bind("z", z, 3)?;
        let order = graph.topological_sort(&feed)?;
        let output = graph.forward_backward(f, &order)?;
        assert_eq!(output, Evaluated::Scalar(18.0));
        Ok(())
    }

    #[test]
    fn test_add_single_input_is_identity() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let x = graph.input();
        let f = graph.add(&[x])?;
        let mut feed = FeedDict::new();
        feed.bind("x", x, [1.0, -2.0])?;
        let order = graph.topological_sort(&feed)?;
        graph.forward(&order)?;
        assert_eq!(graph.value(f), graph.value(x));
        Ok(())
    }

    #[test]
    fn test_add_backward_reduces_broadcast_bias() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let x = graph.input();
        let b = graph.input();
        let y = graph.input();
        let f = graph.add(&[x, b])?;
        let cost = graph.mse(y, f)?;

        let mut feed = FeedDict::new();
        feed.bind("x", x, vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])?;
        feed.bind("b", b, [1.0, 1.0])?;
        feed.bind("y", y, vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]])?;
        let order = graph.topological_sort(&feed)?;
        graph.forward_backward(cost, &order)?;

        let grad_x = graph.gradient(f, x).unwrap();
        let grad_b = graph.gradient(f, b).unwrap();
        assert_eq!(grad_x.shape(), (3, 2));
        assert_eq!(grad_b.shape(), (1, 2));
        assert_eq!(grad_b, &grad_x.sum_columns());
        Ok(())
    }

    #[test]
    fn test_add_same_input_twice_doubles_gradient() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let x = graph.input();
        let y = graph.input();
        let f = graph.add(&[x, x])?;
        let cost = graph.mse(y, f)?;
        let mut feed = FeedDict::new();
        feed.bind("x", x, 3.0)?.bind("y", y, 0.0)?;
        let order = graph.topological_sort(&feed)?;
        graph.forward_backward(cost, &order)?;
        // loss = (0 - 2x)^2, d/dx = 8x = 24
        assert_eq!(graph.gradient(x, x), Some(&Matrix::scalar(24.0)));
        assert_eq!(graph.outbound(x)?, &[f]);
        Ok(())
    }
}
