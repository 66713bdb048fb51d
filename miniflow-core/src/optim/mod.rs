// miniflow-core/src/optim/mod.rs

//! Parameter updates for training graphs.
//!
//! This module provides the `Optimizer` trait and plain stochastic gradient
//! descent, the only update rule the engine ships with.

pub mod optimizer_trait;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use sgd::{sgd_update, Sgd};
