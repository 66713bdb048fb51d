pub mod table_dataset;
pub mod traits;

pub use table_dataset::{load_table, parse_table, TableDataset};
pub use traits::Dataset;
