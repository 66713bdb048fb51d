// miniflow-data/src/datasets/table_dataset.rs

use super::traits::Dataset;
use crate::error::DataError;
use miniflow_core::Matrix;
use num_traits::ToPrimitive;
use std::fs;
use std::path::Path;

/// Feature rows paired with target rows, one pair per record.
///
/// Every feature row has the same width, and so does every target row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDataset {
    features: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl TableDataset {
    /// Creates a dataset from parallel feature and target rows.
    ///
    /// # Errors
    /// `InvalidArgument` if the two tables differ in length, `RaggedRow` if
    /// either table is not rectangular.
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Self, DataError> {
        if features.len() != targets.len() {
            return Err(DataError::InvalidArgument(format!(
                "{} feature rows but {} target rows",
                features.len(),
                targets.len()
            )));
        }
        check_rectangular(&features)?;
        check_rectangular(&targets)?;
        Ok(TableDataset { features, targets })
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }

    pub fn feature_count(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn target_count(&self) -> usize {
        self.targets.first().map_or(0, Vec::len)
    }

    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        (self.features, self.targets)
    }

    /// The features as a `records x feature_count` matrix.
    pub fn feature_matrix(&self) -> Result<Matrix, DataError> {
        Ok(Matrix::from_rows(self.features.clone())?)
    }

    /// The targets as a `records x target_count` matrix.
    pub fn target_matrix(&self) -> Result<Matrix, DataError> {
        Ok(Matrix::from_rows(self.targets.clone())?)
    }

    /// The same records with z-score normalized features.
    pub fn normalized(&self) -> Result<Self, DataError> {
        Ok(TableDataset {
            features: crate::normalize::normalize(&self.features)?,
            targets: self.targets.clone(),
        })
    }
}

impl Dataset for TableDataset {
    type Item = (Vec<f64>, Vec<f64>);

    fn get(&self, index: usize) -> Result<Self::Item, DataError> {
        match (self.features.get(index), self.targets.get(index)) {
            (Some(x), Some(y)) => Ok((x.clone(), y.clone())),
            _ => Err(DataError::InvalidArgument(format!(
                "index {} out of bounds for {} records",
                index,
                self.features.len()
            ))),
        }
    }

    fn len(&self) -> usize {
        self.features.len()
    }
}

fn check_rectangular(rows: &[Vec<f64>]) -> Result<(), DataError> {
    let expected = rows.first().map_or(0, Vec::len);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(DataError::RaggedRow {
                line: i + 1,
                expected,
                found: row.len(),
            });
        }
    }
    Ok(())
}

/// A token with a decimal point is a float; anything else must be an integer.
fn parse_token(token: &str, line: usize) -> Result<f64, DataError> {
    let parsed = if token.contains('.') {
        token.parse::<f64>().ok()
    } else {
        token.parse::<i64>().ok().and_then(|v| v.to_f64())
    };
    parsed.ok_or_else(|| DataError::Parse {
        line,
        token: token.to_string(),
    })
}

/// Parses whitespace-delimited records, one per non-blank line. The last
/// `target_columns` values of each record are its targets, the rest its features.
///
/// # Errors
/// - `Parse` for a token that is not a number.
/// - `RaggedRow` when a record's width differs from the first record's.
/// - `InvalidArgument` if `target_columns` leaves no feature column.
/// - `EmptyDataset` if there is no record at all.
pub fn parse_table(text: &str, target_columns: usize) -> Result<TableDataset, DataError> {
    let mut features = Vec::new();
    let mut targets = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let record = line
            .split_whitespace()
            .map(|token| parse_token(token, line_no))
            .collect::<Result<Vec<f64>, DataError>>()?;

        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(DataError::RaggedRow {
                line: line_no,
                expected,
                found: record.len(),
            });
        }
        if target_columns >= expected {
            return Err(DataError::InvalidArgument(format!(
                "{} target columns leave no features in a {}-column record",
                target_columns, expected
            )));
        }

        let split = expected - target_columns;
        targets.push(record[split..].to_vec());
        let mut record = record;
        record.truncate(split);
        features.push(record);
    }

    if features.is_empty() {
        return Err(DataError::EmptyDataset);
    }
    log::debug!(
        "parsed {} records ({} features, {} targets)",
        features.len(),
        width.unwrap_or(0) - target_columns,
        target_columns
    );
    TableDataset::new(features, targets)
}

/// Reads `path` and parses it with [`parse_table`].
pub fn load_table(path: impl AsRef<Path>, target_columns: usize) -> Result<TableDataset, DataError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loading dataset from {}", path.display());
    parse_table(&text, target_columns)
}

#[cfg(test)]
#[path = "table_dataset_test.rs"]
mod tests;
