//! Collaborators of the miniflow engine: loading whitespace-delimited tables,
//! normalizing features, drawing random mini-batches, and a small SGD
//! training loop built on `miniflow_core`.

pub mod datasets;
pub mod error;
pub mod normalize;
pub mod samplers;
pub mod training;

// Re-export main components
pub use datasets::{load_table, parse_table, Dataset, TableDataset};
pub use error::DataError;
pub use normalize::{normalize, ColumnStats};
pub use samplers::{resample, resample_with_rng, RandomSampler};
pub use training::{train, TrainingConfig, TrainingReport};
