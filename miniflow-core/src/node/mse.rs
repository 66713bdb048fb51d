use super::{BackwardContext, Gradients, Operation};
use crate::error::MiniflowError;
use crate::matrix::{BinaryOp, Matrix};

/// Mean squared error between a target `y` and a prediction `a`:
/// `mean((y - a)^2)` as a 1x1 matrix. Inbound order is `[y, a]`.
///
/// This is the graph's loss: backward seeds the gradient chain and never
/// reads downstream gradients.
#[derive(Debug, Clone, Default)]
pub struct MeanSquaredError {
    /// `y - a` and its element count, cached by the last forward pass.
    cache: Option<(Matrix, usize)>,
}

impl MeanSquaredError {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operation for MeanSquaredError {
    fn name(&self) -> &'static str {
        "MeanSquaredError"
    }

    fn forward(&mut self, inputs: &[&Matrix]) -> Result<Option<Matrix>, MiniflowError> {
        let [y, a] = match inputs {
            [y, a] => [*y, *a],
            _ => {
                return Err(MiniflowError::InvalidValue(format!(
                    "MeanSquaredError expects 2 inputs (y, a), got {}",
                    inputs.len()
                )))
            }
        };
        let diff = Matrix::combine(BinaryOp::Subtract, y, a)?;
        let m = diff.numel();
        if m == 0 {
            return Err(MiniflowError::InvalidValue(
                "MeanSquaredError over an empty matrix".to_string(),
            ));
        }
        let total: f64 = diff.data().iter().map(|d| d * d).sum();
        let mean = total / m as f64;
        self.cache = Some((diff, m));
        Ok(Some(Matrix::scalar(mean)))
    }

    fn backward(&self, ctx: &BackwardContext<'_>) -> Result<Gradients, MiniflowError> {
        let (diff, m) = self
            .cache
            .as_ref()
            .ok_or(MiniflowError::MissingValue { node: ctx.node })?;
        let scale = 2.0 / *m as f64;
        let (y, a) = match ctx.inputs.as_slice() {
            [y, a] => (*y, *a),
            _ => return Err(MiniflowError::MissingValue { node: ctx.node }),
        };

        // `diff` carries the broadcast shape; each side gets it summed back.
        let mut gradients = Gradients::new();
        gradients.insert(
            ctx.inbound[0],
            diff.scale(scale).reduce_to_shape(y.rows(), y.cols())?,
        );
        gradients.insert(
            ctx.inbound[1],
            diff.scale(-scale).reduce_to_shape(a.rows(), a.cols())?,
        );
        Ok(gradients)
    }
}
