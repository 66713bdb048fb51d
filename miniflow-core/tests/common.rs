use miniflow_core::Matrix;

// Shared helpers for the integration tests. Each test crate uses a different
// subset, hence the allow(dead_code).

/// Installs `env_logger` once per test binary; later calls are no-ops.
#[allow(dead_code)]
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub(crate) fn create_test_matrix(rows: Vec<Vec<f64>>) -> Matrix {
    Matrix::from_rows(rows).expect("Test matrix creation failed")
}
