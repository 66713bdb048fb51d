//! Finite-difference verification of the gradients computed by `backward`.

use crate::error::MiniflowError;
use crate::graph::Graph;
use crate::matrix::Matrix;
use crate::node::NodeId;
use approx::relative_eq;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for parameter {param}, element {element}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    GradientMismatch {
        param: NodeId,
        element: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Loss node {0} did not evaluate to a 1x1 value")]
    NonScalarLoss(NodeId),

    #[error("Parameter {param} has no gradient after the backward pass")]
    MissingAnalyticalGrad { param: NodeId },

    #[error("Numerical gradient is NaN or infinite for parameter {param}, element {element} (loss+ {loss_plus:?}, loss- {loss_minus:?})")]
    NumericalGradNaNOrInfinite {
        param: NodeId,
        element: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite for parameter {param}, element {element}: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        param: NodeId,
        element: usize,
        value: f64,
    },

    #[error("Graph error during gradient check: {0}")]
    Graph(#[from] MiniflowError),
}

/// Compares each parameter's self-gradient from `forward_backward` against a
/// central difference `(L(p + eps) - L(p - eps)) / 2eps`, element by element.
///
/// Parameter values are restored and a final forward/backward pass is run, so
/// the graph is left as a plain `forward_backward` would leave it.
pub fn check_gradients(
    graph: &mut Graph,
    loss: NodeId,
    order: &[NodeId],
    params: &[NodeId],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let result = compare_all(graph, loss, order, params, epsilon, tolerance);
    graph.forward_backward(loss, order)?;
    result
}

fn compare_all(
    graph: &mut Graph,
    loss: NodeId,
    order: &[NodeId],
    params: &[NodeId],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    if graph.forward_backward(loss, order)?.as_scalar().is_none() {
        return Err(GradCheckError::NonScalarLoss(loss));
    }

    // Snapshot every analytical gradient before the perturbed passes.
    let mut analytical = Vec::with_capacity(params.len());
    for &param in params {
        let grad = graph
            .gradient(param, param)
            .cloned()
            .ok_or(GradCheckError::MissingAnalyticalGrad { param })?;
        analytical.push(grad);
    }

    for (&param, grad) in params.iter().zip(&analytical) {
        let original = graph
            .value(param)
            .cloned()
            .ok_or(MiniflowError::MissingValue { node: param })?;
        let outcome = compare_param(graph, loss, order, param, &original, grad, epsilon, tolerance);
        graph.set_value(param, original)?;
        outcome?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn compare_param(
    graph: &mut Graph,
    loss: NodeId,
    order: &[NodeId],
    param: NodeId,
    original: &Matrix,
    analytical: &Matrix,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let (rows, cols) = original.shape();
    for element in 0..original.numel() {
        let loss_plus = perturbed_loss(graph, loss, order, param, original, element, epsilon)?;
        let loss_minus = perturbed_loss(graph, loss, order, param, original, element, -epsilon)?;
        let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
        let value = analytical.get(element / cols.max(1), element % cols.max(1));
        let analytical_value = value.ok_or_else(|| {
            MiniflowError::shape_mismatch("grad_check", analytical.shape(), (rows, cols))
        })?;

        if !numerical.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                param,
                element,
                loss_plus,
                loss_minus,
            });
        }
        if !analytical_value.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                param,
                element,
                value: analytical_value,
            });
        }
        if !relative_eq!(
            analytical_value,
            numerical,
            epsilon = tolerance,
            max_relative = tolerance
        ) {
            return Err(GradCheckError::GradientMismatch {
                param,
                element,
                analytical: analytical_value,
                numerical,
                difference: (analytical_value - numerical).abs(),
            });
        }
    }
    log::debug!("gradient check passed for {} ({} elements)", param, original.numel());
    Ok(())
}

fn perturbed_loss(
    graph: &mut Graph,
    loss: NodeId,
    order: &[NodeId],
    param: NodeId,
    original: &Matrix,
    element: usize,
    delta: f64,
) -> Result<f64, GradCheckError> {
    let mut data = original.data().to_vec();
    data[element] += delta;
    graph.set_value(param, Matrix::new(original.rows(), original.cols(), data)?)?;
    graph.forward(order)?;
    graph
        .value(loss)
        .and_then(Matrix::as_scalar)
        .ok_or(GradCheckError::NonScalarLoss(loss))
}
