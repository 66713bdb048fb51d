pub mod error;
pub mod grad_check;
pub mod graph;
pub mod matrix;
pub mod node;
pub mod optim;
pub mod utils;

// Re-export the types most callers need so they are reachable as `miniflow_core::Graph` etc.
pub use error::MiniflowError;
pub use graph::{Binding, Evaluated, FeedDict, Graph, RawValue};
pub use matrix::{BinaryOp, Matrix};
pub use node::NodeId;
pub use optim::{sgd_update, Optimizer, Sgd};
