pub mod charts;
pub mod dataset;
pub mod stats;
