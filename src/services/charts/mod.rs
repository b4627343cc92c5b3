pub mod dispatcher;
pub mod labels;
pub mod types;

pub use dispatcher::build_chart;
pub use types::{BuiltChart, ChartKind, ChartRequest, ChartSpec};
