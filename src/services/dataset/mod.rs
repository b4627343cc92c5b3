pub mod loader;
pub mod profiler;
pub mod schema;
pub mod types;

pub use schema::{ColumnKind, DatasetSchema};
pub use types::Dataset;
