use polars::prelude::{AnyValue, DataFrame, DataType, Series};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::error::AppError;
use super::schema::{ColumnKind, DatasetSchema};

pub const SAMPLE_SIZE: usize = 3;

/// The in-memory listings table plus its semantic schema. Built once at
/// startup and never mutated afterwards; every profiler and dispatcher
/// call reads the same snapshot.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    schema: DatasetSchema,
}

impl Dataset {
    pub(crate) fn new(frame: DataFrame, schema: DatasetSchema) -> Self {
        Self { frame, schema }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column_count(&self) -> usize {
        self.frame.width()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.schema.kind_of(name)
    }

    pub fn column(&self, name: &str) -> Result<&Series, AppError> {
        self.frame
            .column(name)
            .map_err(|_| AppError::ColumnNotFound(name.to_string()))
    }

    /// Column values widened to f64, None where the cell is missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, AppError> {
        let series = self.column(name)?;
        let casted = series.cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// Column values rendered as strings, None where the cell is missing.
    pub fn string_values(&self, name: &str) -> Result<Vec<Option<String>>, AppError> {
        let series = self.column(name)?;
        let casted = series.cast(&DataType::String)?;
        Ok(casted
            .str()?
            .into_iter()
            .map(|value| value.map(|s| s.to_string()))
            .collect())
    }
}

/// Renders a single cell for previews and sample values. Missing cells
/// become the empty string.
pub(crate) fn render_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub unique_count: usize,
    pub null_count: usize,
    /// None when the dataset has zero rows.
    pub null_percentage: Option<f64>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
    pub sample_values: SmallVec<[String; SAMPLE_SIZE]>,
    pub has_duplicates: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullReportEntry {
    pub column: String,
    pub null_count: usize,
    pub null_percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub kind_histogram: BTreeMap<ColumnKind, usize>,
    /// Columns with at least one missing value, in dataset order.
    pub null_report: Vec<NullReportEntry>,
    /// None when model_year is absent or entirely missing.
    pub year_range: Option<YearRange>,
    pub columns: Vec<ColumnProfile>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}
