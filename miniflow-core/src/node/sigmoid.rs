use super::{accumulate_gradient, BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};

/// Elementwise logistic function `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

pub fn sigmoid(x: &Matrix) -> Matrix {
    x.map(|v| 1.0 / (1.0 + (-v).exp()))
}

impl Operation for Sigmoid {
    fn name(&self) -> &'static str {
        "Sigmoid"
    }

    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        match inputs {
            [x] => Ok(Some(sigmoid(x))),
            _ => Err(MiniflowError::InvalidValue(format!(
                "Sigmoid expects 1 input, got {}",
                inputs.len()
            ))),
        }
    }

    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let s = ctx.value()?;
        let derivative = Matrix::combine(BinaryOp::Multiply, s, &s.map(|v| 1.0 - v))?;
        let input_id = ctx.inbound[0];

        let mut gradients = ctx.zero_gradients();
        for grad_cost in &ctx.upstream {
            let local = Matrix::combine(BinaryOp::Multiply, &derivative, grad_cost)?;
            accumulate_gradient(&mut gradients, input_id, &local)?;
        }
        Ok(gradients)
    }
}
