//! Per-column z-score normalization of feature tables.

use crate::error::DataError;

/// Mean and population standard deviation of every column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl ColumnStats {
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let n = rows.len();
        if n == 0 {
            return Err(DataError::EmptyDataset);
        }
        let cols = rows[0].len();
        let mut mean = vec![0.0; cols];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(DataError::RaggedRow {
                    line: i + 1,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }

        let mut std = vec![0.0; cols];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                *s += (v - m) * (v - m);
            }
        }
        for s in &mut std {
            *s = (*s / n as f64).sqrt();
        }
        Ok(ColumnStats { mean, std })
    }

    /// Applies `(v - mean) / std` column by column. A column with zero
    /// spread maps to all zeros.
    pub fn apply(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.std))
                    .map(|(v, (m, s))| if *s > 0.0 { (v - m) / s } else { 0.0 })
                    .collect()
            })
            .collect()
    }
}

/// Z-score normalizes each column of `rows` with its own mean and population
/// standard deviation.
///
/// # Errors
/// `EmptyDataset` for no rows, `RaggedRow` for rows of different widths.
pub fn normalize(rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DataError> {
    let stats = ColumnStats::from_rows(rows)?;
    for (col, s) in stats.std.iter().enumerate() {
        if *s == 0.0 {
            log::warn!("column {} is constant; normalizing it to zero", col);
        }
    }
    Ok(stats.apply(rows))
}
