pub mod random_sampler;

pub use random_sampler::{resample, resample_with_rng, RandomSampler};
