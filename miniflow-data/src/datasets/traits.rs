use crate::error::DataError;

/// Trait representing a dataset.
///
/// A dataset provides access to individual records (input features and the
/// corresponding targets) via an index.
pub trait Dataset {
    /// The type of a single record.
    type Item;

    /// Returns the record at the given index.
    ///
    /// # Errors
    /// Returns `DataError::InvalidArgument` if the index is out of bounds.
    fn get(&self, index: usize) -> Result<Self::Item, DataError>;

    /// Returns the total number of records in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset contains no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
