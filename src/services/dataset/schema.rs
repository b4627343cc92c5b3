use once_cell::sync::Lazy;
use polars::prelude::{DataFrame, DataType};
use std::collections::BTreeMap;

/// Columns the profiler and dispatcher depend on by name. Loading fails
/// when any of these is missing from the header.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "price",
    "model_year",
    "odometer",
    "condition",
    "days_listed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Other,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Other => "other",
        }
    }
}

// Semantic types for the well-known listing columns. Anything not listed
// here falls back to the physical dtype the reader settled on.
static DECLARED_KINDS: Lazy<BTreeMap<&'static str, ColumnKind>> = Lazy::new(|| {
    BTreeMap::from([
        ("price", ColumnKind::Numeric),
        ("model_year", ColumnKind::Numeric),
        ("odometer", ColumnKind::Numeric),
        ("cylinders", ColumnKind::Numeric),
        ("is_4wd", ColumnKind::Numeric),
        ("days_listed", ColumnKind::Numeric),
        ("model", ColumnKind::Categorical),
        ("condition", ColumnKind::Categorical),
        ("fuel", ColumnKind::Categorical),
        ("transmission", ColumnKind::Categorical),
        ("type", ColumnKind::Categorical),
        ("paint_color", ColumnKind::Categorical),
        ("date_posted", ColumnKind::Other),
    ])
});

pub fn declared_kind(name: &str) -> Option<ColumnKind> {
    DECLARED_KINDS.get(name).copied()
}

fn kind_from_dtype(dtype: &DataType) -> ColumnKind {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnKind::Numeric,
        DataType::String | DataType::Boolean => ColumnKind::Categorical,
        _ => ColumnKind::Other,
    }
}

/// Column name -> semantic kind mapping, fixed when the dataset is loaded.
/// Profiling classifies by looking up this table, never by re-sampling
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSchema {
    columns: Vec<String>,
    kinds: BTreeMap<String, ColumnKind>,
}

impl DatasetSchema {
    pub fn from_frame(frame: &DataFrame) -> Self {
        let mut columns = Vec::with_capacity(frame.width());
        let mut kinds = BTreeMap::new();

        for (name, dtype) in frame.schema().iter() {
            let kind = declared_kind(name.as_str())
                .unwrap_or_else(|| kind_from_dtype(dtype));
            columns.push(name.to_string());
            kinds.insert(name.to_string(), kind);
        }

        Self { columns, kinds }
    }

    /// Column names in dataset order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn declared_kinds_win_over_physical_dtype() {
        // is_4wd reads as 1.0/null, so the reader sees floats; the declared
        // table must also hold when the physical dtype disagrees.
        let frame = df!(
            "condition" => ["good", "fair"],
            "is_4wd" => [Some(1.0), None]
        )
        .unwrap();

        let schema = DatasetSchema::from_frame(&frame);
        assert_eq!(schema.kind_of("condition"), Some(ColumnKind::Categorical));
        assert_eq!(schema.kind_of("is_4wd"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn undeclared_columns_fall_back_to_dtype() {
        let frame = df!(
            "mystery_metric" => [1.5, 2.5],
            "mystery_label" => ["a", "b"]
        )
        .unwrap();

        let schema = DatasetSchema::from_frame(&frame);
        assert_eq!(schema.kind_of("mystery_metric"), Some(ColumnKind::Numeric));
        assert_eq!(schema.kind_of("mystery_label"), Some(ColumnKind::Categorical));
        assert_eq!(schema.kind_of("absent"), None);
    }

    #[test]
    fn columns_keep_dataset_order() {
        let frame = df!(
            "price" => [1000i64],
            "odometer" => [90000i64],
            "condition" => ["good"]
        )
        .unwrap();

        let schema = DatasetSchema::from_frame(&frame);
        assert_eq!(schema.columns(), &["price", "odometer", "condition"]);
    }
}
