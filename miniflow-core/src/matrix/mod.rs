//! # Matrix Arithmetic Layer
//!
//! A dense, row-major, two-dimensional `f64` array. Every operation that
//! "modifies" a matrix returns a new one; node code never relies on aliasing.
//!
//! The broadcast-aware binary operations live in [`broadcast`], the random
//! constructors in [`create`].

pub mod broadcast;
pub mod create;

pub use broadcast::BinaryOp;

use crate::error::MiniflowError;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix from row-major data.
    ///
    /// # Errors
    /// Returns `MiniflowError::InvalidValue` if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, MiniflowError> {
        if data.len() != rows * cols {
            return Err(MiniflowError::InvalidValue(format!(
                "data length {} does not match shape ({}, {})",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from nested rows. An empty outer vector gives a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MiniflowError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(MiniflowError::InvalidValue(format!(
                    "ragged rows: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend(row);
        }
        Matrix::new(n_rows, n_cols, data)
    }

    pub fn scalar(value: f64) -> Self {
        Matrix {
            rows: 1,
            cols: 1,
            data: vec![value],
        }
    }

    /// A `1 x n` matrix.
    pub fn row_vector(values: Vec<f64>) -> Self {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: values,
        }
    }

    /// An `n x 1` matrix.
    pub fn column_vector(values: Vec<f64>) -> Self {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    pub fn full(rows: usize, cols: usize, value: f64) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::full(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Self {
        Matrix::full(rows, cols, 1.0)
    }

    pub fn zeros_like(other: &Matrix) -> Self {
        Matrix::zeros(other.rows, other.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    /// The single element of a 1x1 matrix.
    pub fn as_scalar(&self) -> Option<f64> {
        if self.is_scalar() {
            Some(self.data[0])
        } else {
            None
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Applies `f` to every element.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|v| v * factor)
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.data[r * self.cols + c]);
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Adds up every column: `M x N -> 1 x N`.
    pub fn sum_columns(&self) -> Matrix {
        let mut out = vec![0.0; self.cols];
        for r in 0..self.rows {
            for (acc, v) in out.iter_mut().zip(self.row(r)) {
                *acc += v;
            }
        }
        Matrix::row_vector(out)
    }

    /// Adds up every row: `M x N -> M x 1`.
    pub fn sum_rows(&self) -> Matrix {
        Matrix::column_vector((0..self.rows).map(|r| self.row(r).iter().sum()).collect())
    }

    /// Matrix product `self · other`.
    ///
    /// # Errors
    /// `ShapeMismatch` when `self.cols != other.rows`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix, MiniflowError> {
        if self.cols != other.rows {
            return Err(MiniflowError::shape_mismatch(
                "matmul",
                self.shape(),
                other.shape(),
            ));
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                let b_row = other.row(k);
                let out_row = &mut data[i * other.cols..(i + 1) * other.cols];
                for (o, &b) in out_row.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Ok(Matrix {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }

    /// Reduces a gradient to `(rows, cols)` by summing along the dimensions
    /// that were broadcast in the forward pass.
    ///
    /// Counterpart of the broadcasting rules: a `1 x N` target sums over rows,
    /// an `M x 1` target sums over columns, a `1 x 1` target sums everything.
    pub fn reduce_to_shape(&self, rows: usize, cols: usize) -> Result<Matrix, MiniflowError> {
        if self.shape() == (rows, cols) {
            return Ok(self.clone());
        }
        let mut reduced = self.clone();
        if rows == 1 && reduced.rows != 1 {
            reduced = reduced.sum_columns();
        }
        if cols == 1 && reduced.cols != 1 {
            reduced = reduced.sum_rows();
        }
        if reduced.shape() != (rows, cols) {
            return Err(MiniflowError::shape_mismatch(
                "reduce_to_shape",
                self.shape(),
                (rows, cols),
            ));
        }
        Ok(reduced)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for shape ({}, {})",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (c, v) in self.row(r).iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", v)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_length() {
        let result = Matrix::new(2, 2, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(MiniflowError::InvalidValue(_))));
    }

    #[test]
    fn test_from_rows_and_accessors() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m.get(0, 1), Some(2.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_rows_empty_and_ragged() {
        let empty = Matrix::from_rows(vec![]).unwrap();
        assert_eq!(empty.shape(), (0, 0));
        assert!(empty.is_empty());

        let ragged = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(ragged, Err(MiniflowError::InvalidValue(_))));
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn test_sum_columns_and_rows() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.sum_columns(), Matrix::row_vector(vec![9.0, 12.0]));
        assert_eq!(m.sum_rows(), Matrix::column_vector(vec![3.0, 7.0, 11.0]));
        assert_eq!(m.sum(), 21.0);
    }

    #[test]
    fn test_matmul() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);

        let err = a.matmul(&a).unwrap_err();
        assert_eq!(err, MiniflowError::shape_mismatch("matmul", (2, 3), (2, 3)));
    }

    #[test]
    fn test_matmul_propagates_non_finite() {
        let zeros = Matrix::zeros(1, 2);
        let b = Matrix::from_rows(vec![vec![f64::NAN], vec![f64::INFINITY]]).unwrap();
        let c = zeros.matmul(&b).unwrap();
        assert_eq!(c.shape(), (1, 1));
        assert!(c[(0, 0)].is_nan());
    }

    #[test]
    fn test_reduce_to_shape() {
        let g = Matrix::ones(3, 4);
        assert_eq!(g.reduce_to_shape(1, 4).unwrap(), Matrix::full(1, 4, 3.0));
        assert_eq!(g.reduce_to_shape(3, 1).unwrap(), Matrix::full(3, 1, 4.0));
        assert_eq!(g.reduce_to_shape(1, 1).unwrap(), Matrix::scalar(12.0));
        assert_eq!(g.reduce_to_shape(3, 4).unwrap(), g);
        assert!(g.reduce_to_shape(2, 4).is_err());
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.5], vec![-3.0, 4.0]]).unwrap();
        assert_eq!(m.to_string(), "[1, 2.5]\n[-3, 4]");
        assert_eq!(Matrix::scalar(18.0).as_scalar(), Some(18.0));
        assert_eq!(m.as_scalar(), None);
    }
}
