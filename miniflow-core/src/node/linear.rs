use super::{accumulate_gradient, BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};

/// Fully connected layer: `X·W + b` with the bias broadcast over rows.
///
/// Inbound order is `[X, W, b]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Operation for Linear {
    fn name(&self) -> &'static str {
        "Linear"
    }

    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        let [x, w, b] = unpack(inputs)?;
        let value = x
            .matmul(w)
            .and_then(|xw| Matrix::combine(BinaryOp::Add, &xw, b))
            .map_err(|e| {
                log::debug!(
                    "Linear forward failed: inputs {:?}, weights {:?}, bias {:?}",
                    x.shape(),
                    w.shape(),
                    b.shape()
                );
                e
            })?;
        Ok(Some(value))
    }

    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let [x, w, b] = unpack(&ctx.inputs)?;
        let (x_id, w_id, b_id) = (ctx.inbound[0], ctx.inbound[1], ctx.inbound[2]);
        let w_t = w.transpose();
        let x_t = x.transpose();

        let mut gradients = ctx.zero_gradients();
        for grad_cost in &ctx.upstream {
            accumulate_gradient(&mut gradients, x_id, &grad_cost.matmul(&w_t)?)?;
            accumulate_gradient(&mut gradients, w_id, &x_t.matmul(grad_cost)?)?;
            // Column sums for a row bias; a 1x1 bias takes the total.
            let grad_b = grad_cost.reduce_to_shape(b.rows(), b.cols())?;
            accumulate_gradient(&mut gradients, b_id, &grad_b)?;
        }
        Ok(gradients)
    }
}

fn unpack<'a>(inputs: &[&'a Matrix]) -> Result<[&'a Matrix; 3], MiniflowError> {
    match inputs {
        [x, w, b] => Ok([*x, *w, *b]),
        _ => Err(MiniflowError::InvalidValue(format!(
            "Linear expects 3 inputs (X, W, b), got {}",
            inputs.len()
        ))),
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
