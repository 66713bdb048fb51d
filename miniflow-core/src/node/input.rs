use super::{accumulate_gradient, BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::Matrix;

/// A leaf node. Its value is seeded by the scheduler from the feed (or set
/// directly with `Graph::set_value`); forward leaves it untouched.
///
/// Backward sums every consumer's gradient with respect to this node into
/// `gradients[self]`, which is what the optimizer reads for trainables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Input;

impl Operation for Input {
    fn name(&self) -> &'static str {
        "Input"
    }

    fn forward(&mut self, _inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        Ok(None)
    }

    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let mut gradients = Gradients::new();
        gradients.insert(ctx.node, Matrix::zeros_like(ctx.value()?));
        for grad_cost in &ctx.upstream {
            accumulate_gradient(&mut gradients, ctx.node, grad_cost)?;
        }
        Ok(gradients)
    }

    fn is_input(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MiniflowError;
    use crate::graph::{FeedDict, Graph};
    use crate::matrix::Matrix;

    #[test]
    fn test_input_forward_keeps_fed_value() {
        let mut graph = Graph::new();
        let x = graph.input();
        let mut feed = FeedDict::new();
        feed.bind("x", x, vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();

        let order = graph.topological_sort(&feed).unwrap();
        graph.forward(&order).unwrap();
        assert_eq!(
            graph.value(x),
            Some(&Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap())
        );
    }

    #[test]
    fn test_input_gradient_sums_all_consumers() {
        let mut graph = Graph::new();
        let x = graph.input();
        let y = graph.input();
        let f = graph.add(&[x, y]).unwrap();
        let g = graph.multiply(&[x, y]).unwrap();
        let target = graph.input();
        let total = graph.add(&[f, g]).unwrap();
        let cost = graph.mse(target, total).unwrap();

        let mut feed = FeedDict::new();
        feed.bind("x", x, 2.0).unwrap();
        feed.bind("y", y, 3.0).unwrap();
        feed.bind("t", target, 0.0).unwrap();
        let order = graph.topological_sort(&feed).unwrap();
        graph.forward_backward(cost, &order).unwrap();

        // loss = (t - (x + y + x*y))^2 ; d/dx = -2 * (t - 11) * (1 + y) = 88
        let from_add = graph.gradient(f, x).unwrap()[(0, 0)];
        let from_mul = graph.gradient(g, x).unwrap()[(0, 0)];
        let total_x = graph.gradient(x, x).unwrap()[(0, 0)];
        assert_eq!(total_x, from_add + from_mul);
        assert!((total_x - 88.0).abs() < 1e-12);
    }

    #[test]
    fn test_unused_input_has_zero_gradient() {
        let mut graph = Graph::new();
        let x = graph.input();
        let mut feed = FeedDict::new();
        feed.bind("x", x, [1.0, 2.0, 3.0]).unwrap();
        let order = graph.topological_sort(&feed).unwrap();
        graph.forward_backward(x, &order).unwrap();
        assert_eq!(graph.gradient(x, x), Some(&Matrix::zeros(1, 3)));
    }

    #[test]
    fn test_backward_without_value_fails() {
        let mut graph = Graph::new();
        let x = graph.input();
        assert_eq!(
            graph.backward(&[x]),
            Err(MiniflowError::MissingValue { node: x })
        );
        assert_eq!(graph.gradient(x, x), None);
    }
}
