use super::{accumulate_gradient, BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};

/// Elementwise product of one or more inbound values.
///
/// Uses `Matrix::broadcast`, never the matrix-product fallback, so the
/// gradient rule below stays the derivative of what forward computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

impl Operation for Multiply {
    fn name(&self) -> &'static str {
        "Multiply"
    }

    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        let (first, rest) = inputs.split_first().ok_or_else(|| {
            MiniflowError::InvalidValue("Multiply needs at least one input".to_string())
        })?;
        let mut total = (*first).clone();
        for value in rest {
            total = Matrix::broadcast(BinaryOp::Multiply, &total, value)?;
        }
        Ok(Some(total))
    }

    /// `d/d input_i = downstream ⊙ (product of every other input)`, taken by
    /// position so a node multiplied with itself gets both terms.
    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let mut gradients = ctx.zero_gradients();
        for grad_cost in &ctx.upstream {
            for (i, (&id, value)) in ctx.inbound.iter().zip(&ctx.inputs).enumerate() {
                let mut product = value.map(|_| 1.0);
                for (j, other) in ctx.inputs.iter().enumerate() {
                    if j != i {
                        product = Matrix::broadcast(BinaryOp::Multiply, &product, other)?;
                    }
                }
                let local = Matrix::broadcast(BinaryOp::Multiply, grad_cost, &product)?
                    .reduce_to_shape(value.rows(), value.cols())?;
                accumulate_gradient(&mut gradients, id, &local)?;
            }
        }
        Ok(gradients)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MiniflowError;
    use crate::graph::{Evaluated, FeedDict, Graph};
    use crate::matrix::Matrix;

    #[test]
    fn test_multiply_three_scalars() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (x, y, z) = (graph.input(), graph.input(), graph.input());
        let f = graph.multiply(&[x, y, z])?;

        let mut feed = FeedDict::new();
        feed.bind("x", x, 10)?.bind("y", y, 5)?.bind("z", z, 3)?;
        let order = graph.topological_sort(&feed)?;
        assert_eq!(graph.forward_backward(f, &order)?, Evaluated::Scalar(150.0));
        assert_eq!(graph.render(f)?, "150");
        Ok(())
    }

    #[test]
    fn test_multiply_gradients_use_other_inputs() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (x, y, z) = (graph.input(), graph.input(), graph.input());
        let target = graph.input();
        let f = graph.multiply(&[x, y, z])?;
        let cost = graph.mse(target, f)?;

        let mut feed = FeedDict::new();
        feed.bind("x", x, 2.0)?
            .bind("y", y, 3.0)?
            .bind("z", z, 4.0)?
            .bind("t", target, 20.0)?;
        let order = graph.topological_sort(&feed)?;
        graph.forward_backward(cost, &order)?;

        // d loss / d f = -2 * (20 - 24) = 8
        assert_eq!(graph.gradient(f, x), Some(&Matrix::scalar(8.0 * 12.0)));
        assert_eq!(graph.gradient(f, y), Some(&Matrix::scalar(8.0 * 8.0)));
        assert_eq!(graph.gradient(f, z), Some(&Matrix::scalar(8.0 * 6.0)));
        Ok(())
    }

    #[test]
    fn test_multiply_elementwise_square_matrices() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (a, b) = (graph.input(), graph.input());
        let f = graph.multiply(&[a, b])?;
        let mut feed = FeedDict::new();
        feed.bind("a", a, vec![vec![1.0, 2.0], vec![3.0, 4.0]])?;
        feed.bind("b", b, vec![vec![2.0, 2.0], vec![0.5, -1.0]])?;
        let order = graph.topological_sort(&feed)?;
        let out = graph.forward_backward(f, &order)?.into_matrix();
        assert_eq!(out.to_rows(), vec![vec![2.0, 4.0], vec![1.5, -4.0]]);
        Ok(())
    }

    #[test]
    fn test_multiply_incompatible_shapes_fail() -> Result<(), MiniflowError> {
        let mut graph = Graph::new();
        let (a, b) = (graph.input(), graph.input());
        let f = graph.multiply(&[a, b])?;
        let mut feed = FeedDict::new();
        feed.bind("a", a, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
        feed.bind("b", b, vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])?;
        let order = graph.topological_sort(&feed)?;
        let err = graph.forward_backward(f, &order).unwrap_err();
        assert!(matches!(err, MiniflowError::ShapeMismatch { .. }));
        Ok(())
    }
}
