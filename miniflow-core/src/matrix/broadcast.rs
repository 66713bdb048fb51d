// miniflow-core/src/matrix/broadcast.rs

use super::Matrix;
use crate::error::MiniflowError;
use std::fmt;
use std::str::FromStr;

/// The elementwise operations `combine` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "Addition",
            BinaryOp::Subtract => "Subtraction",
            BinaryOp::Multiply => "Multiplication",
            BinaryOp::Divide => "Division",
        };
        f.write_str(name)
    }
}

impl FromStr for BinaryOp {
    type Err = MiniflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(BinaryOp::Add),
            "subtraction" | "subtract" | "sub" | "-" => Ok(BinaryOp::Subtract),
            "multiplication" | "multiply" | "mul" | "*" => Ok(BinaryOp::Multiply),
            "division" | "divide" | "div" | "/" => Ok(BinaryOp::Divide),
            _ => Err(MiniflowError::InvalidOperation(format!(
                "unrecognized matrix operation: {}",
                s
            ))),
        }
    }
}

impl Matrix {
    /// Combines `x` and `y` with `op`, resolving shapes in this order (first
    /// match wins):
    ///
    /// 1. same rows, `y` has one column: `y`'s column is applied to every column of `x`
    /// 2. same rows, `x` has one column: `x`'s column is spread over `y`'s columns
    /// 3. same cols, `y` has one row: `y`'s row is applied to every row of `x`
    /// 4. same cols, `x` has one row: `x`'s row is spread over `y`'s rows
    /// 5. `y` is 1x1: scalar over `x`
    /// 6. `x` is 1x1: scalar over `y`
    /// 7. a column vector against a row vector: both spread to `(rows, cols)`
    /// 8. identical shapes: elementwise
    /// 9. `Multiply` with `x.cols == y.rows`: matrix product
    ///
    /// Anything else is a `ShapeMismatch`.
    pub fn combine(op: BinaryOp, x: &Matrix, y: &Matrix) -> Result<Matrix, MiniflowError> {
        if let Some(result) = broadcast_rules(op, x, y, true) {
            return Ok(result);
        }
        if op == BinaryOp::Multiply && x.cols == y.rows {
            return x.matmul(y);
        }
        log::debug!(
            "{} failed: X {:?}, Y {:?} (dottable: {})",
            op,
            x.shape(),
            y.shape(),
            x.cols == y.rows
        );
        Err(MiniflowError::shape_mismatch(op.to_string(), x.shape(), y.shape()))
    }

    /// Same resolution as [`Matrix::combine`] without the matrix-product
    /// fallback: the result is always a true elementwise combination.
    pub fn broadcast(op: BinaryOp, x: &Matrix, y: &Matrix) -> Result<Matrix, MiniflowError> {
        broadcast_rules(op, x, y, false).ok_or_else(|| {
            log::debug!("{} failed: X {:?}, Y {:?}", op, x.shape(), y.shape());
            MiniflowError::shape_mismatch(op.to_string(), x.shape(), y.shape())
        })
    }
}

fn broadcast_rules(op: BinaryOp, x: &Matrix, y: &Matrix, dot_fallback: bool) -> Option<Matrix> {
    let (x_rows, x_cols) = x.shape();
    let (y_rows, y_cols) = y.shape();

    if x_rows == y_rows && y_cols == 1 {
        return Some(build(x_rows, x_cols, |i, j| op.apply(x.at(i, j), y.at(i, 0))));
    }
    if x_rows == y_rows && x_cols == 1 {
        return Some(build(y_rows, y_cols, |i, j| op.apply(x.at(i, 0), y.at(i, j))));
    }
    if x_cols == y_cols && y_rows == 1 {
        return Some(build(x_rows, x_cols, |i, j| op.apply(x.at(i, j), y.at(0, j))));
    }
    if x_cols == y_cols && x_rows == 1 {
        return Some(build(y_rows, y_cols, |i, j| op.apply(x.at(0, j), y.at(i, j))));
    }
    if y.is_scalar() {
        let s = y.at(0, 0);
        return Some(x.map(|v| op.apply(v, s)));
    }
    if x.is_scalar() {
        let s = x.at(0, 0);
        return Some(y.map(|v| op.apply(s, v)));
    }
    if x_cols == 1 && y_rows == 1 {
        return Some(build(x_rows, y_cols, |i, j| op.apply(x.at(i, 0), y.at(0, j))));
    }
    // A row against an equally long column is a dot product when the fallback is on.
    let dottable = dot_fallback && op == BinaryOp::Multiply && x_cols == y_rows;
    if x_rows == 1 && y_cols == 1 && !dottable {
        return Some(build(y_rows, x_cols, |i, j| op.apply(x.at(0, j), y.at(i, 0))));
    }
    if x.shape() == y.shape() {
        let data = x
            .data
            .iter()
            .zip(&y.data)
            .map(|(&a, &b)| op.apply(a, b))
            .collect();
        return Some(Matrix {
            rows: x_rows,
            cols: x_cols,
            data,
        });
    }
    None
}

fn build<F>(rows: usize, cols: usize, f: F) -> Matrix
where
    F: Fn(usize, usize) -> f64,
{
    let mut data = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            data.push(f(i, j));
        }
    }
    Matrix { rows, cols, data }
}

impl Matrix {
    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod tests;
