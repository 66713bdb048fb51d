// Random constructors draw from the thread-local RNG; the `_with_rng`
// variants take a caller-owned (e.g. seeded) generator instead.

use super::Matrix;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

impl Matrix {
    /// Uniform samples in `[0, 1)`.
    pub fn random(rows: usize, cols: usize) -> Matrix {
        Matrix::random_with_rng(rows, cols, &mut rand::thread_rng())
    }

    pub fn random_with_rng<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data: Vec<f64> = (0..rows * cols).map(|_| rng.gen::<f64>()).collect();
        Matrix { rows, cols, data }
    }

    /// Samples from the standard normal distribution.
    pub fn randn(rows: usize, cols: usize) -> Matrix {
        Matrix::randn_with_rng(rows, cols, &mut rand::thread_rng())
    }

    pub fn randn_with_rng<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let data: Vec<f64> = (0..rows * cols)
            .map(|_| StandardNormal.sample(&mut *rng))
            .collect();
        Matrix { rows, cols, data }
    }
}
