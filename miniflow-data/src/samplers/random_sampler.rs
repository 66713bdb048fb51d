// miniflow-data/src/samplers/random_sampler.rs

use crate::datasets::{Dataset, TableDataset};
use crate::error::DataError;
use rand::seq::index;
use rand::Rng;

/// Draws a fixed number of distinct indices, uniformly at random.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSampler {
    num_samples: usize,
}

impl RandomSampler {
    pub fn new(num_samples: usize) -> Self {
        RandomSampler { num_samples }
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Samples `num_samples` indices below `dataset_len` without replacement.
    ///
    /// # Errors
    /// `InvalidArgument` if more samples are requested than there are records.
    pub fn sample_indices<R: Rng>(
        &self,
        dataset_len: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, DataError> {
        if self.num_samples > dataset_len {
            return Err(DataError::InvalidArgument(format!(
                "cannot draw {} distinct samples from {} records",
                self.num_samples, dataset_len
            )));
        }
        Ok(index::sample(rng, dataset_len, self.num_samples).into_vec())
    }

    /// Builds the subset of `dataset` at freshly sampled indices, keeping
    /// features and targets paired.
    pub fn sample<R: Rng>(
        &self,
        dataset: &TableDataset,
        rng: &mut R,
    ) -> Result<TableDataset, DataError> {
        let indices = self.sample_indices(dataset.len(), rng)?;
        let mut features = Vec::with_capacity(indices.len());
        let mut targets = Vec::with_capacity(indices.len());
        for i in indices {
            let (x, y) = dataset.get(i)?;
            features.push(x);
            targets.push(y);
        }
        TableDataset::new(features, targets)
    }
}

/// Uniformly samples `count` records without replacement using the thread RNG.
pub fn resample(dataset: &TableDataset, count: usize) -> Result<TableDataset, DataError> {
    resample_with_rng(dataset, count, &mut rand::thread_rng())
}

pub fn resample_with_rng<R: Rng>(
    dataset: &TableDataset,
    count: usize,
    rng: &mut R,
) -> Result<TableDataset, DataError> {
    RandomSampler::new(count).sample(dataset, rng)
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
