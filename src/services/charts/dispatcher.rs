use std::collections::BTreeMap;

use crate::error::AppError;
use crate::services::dataset::schema::ColumnKind;
use crate::services::dataset::types::Dataset;
use crate::services::stats;
use super::labels;
use super::types::{BuiltChart, ChartKind, ChartLayout, ChartRequest, ChartSeries, ChartSpec};

/// The headline histogram field. It keeps the finer 50-bin default and the
/// tighter styling; any other column defaults to 30 bins.
pub const PRIMARY_HISTOGRAM_COLUMN: &str = "odometer";
pub const PRIMARY_HISTOGRAM_BINS: usize = 50;
pub const ALTERNATE_HISTOGRAM_BINS: usize = 30;

const PRICE_COLUMN: &str = "price";

/// Resolves a chart request into a renderable spec. Validation failures
/// are recoverable for the caller; degenerate data (no points, zero
/// variance) comes back as None fields, never as an error.
pub async fn build_chart(dataset: &Dataset, request: &ChartRequest) -> Result<BuiltChart, AppError> {
    let start = std::time::Instant::now();
    tracing::info!(
        "Building {} chart for '{}'",
        request.kind.as_str(),
        request.x
    );

    if let Some(bins) = request.bin_count {
        if bins <= 0 {
            return Err(AppError::InvalidBinCount(bins));
        }
    }

    let built = match request.kind {
        ChartKind::Histogram => histogram(dataset, request)?,
        ChartKind::Scatter => scatter(dataset, request)?,
        ChartKind::Bar => bar(dataset, request)?,
    };

    tracing::info!(
        "Chart built in {:?} over {} rows",
        start.elapsed(),
        built.rows_used
    );
    Ok(built)
}

fn require_kind(dataset: &Dataset, column: &str, expected: ColumnKind) -> Result<(), AppError> {
    match dataset.kind_of(column) {
        None => Err(AppError::InvalidColumn {
            column: column.to_string(),
            reason: "not in the dataset schema".to_string(),
        }),
        Some(kind) if kind != expected => Err(AppError::InvalidColumn {
            column: column.to_string(),
            reason: format!("expected a {} column, got {}", expected.as_str(), kind.as_str()),
        }),
        Some(_) => Ok(()),
    }
}

fn histogram(dataset: &Dataset, request: &ChartRequest) -> Result<BuiltChart, AppError> {
    let column = request.x.as_str();
    require_kind(dataset, column, ColumnKind::Numeric)?;

    let nbins = match request.bin_count {
        Some(bins) => bins as usize,
        None if column == PRIMARY_HISTOGRAM_COLUMN => PRIMARY_HISTOGRAM_BINS,
        None => ALTERNATE_HISTOGRAM_BINS,
    };

    let values: Vec<f64> = dataset.numeric_values(column)?.into_iter().flatten().collect();
    let rows_used = values.len();

    let mut labels = BTreeMap::new();
    labels.insert(column.to_string(), labels::axis_label(column));
    labels.insert("count".to_string(), labels::axis_label("count"));

    let mut layout = ChartLayout::default();
    if column == PRIMARY_HISTOGRAM_COLUMN {
        layout.bargap = Some(0.1);
        layout.show_legend = Some(false);
    }

    Ok(BuiltChart {
        spec: ChartSpec {
            trace_type: ChartKind::Histogram,
            title: labels::histogram_title(column),
            labels,
            nbins: Some(nbins),
            layout,
            series: ChartSeries::Histogram { values },
        },
        rows_used,
        correlation: None,
    })
}

fn scatter(dataset: &Dataset, request: &ChartRequest) -> Result<BuiltChart, AppError> {
    let x_column = request.x.as_str();
    let y_column = request
        .y
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("Scatter charts need both an x and a y column".to_string()))?;

    require_kind(dataset, x_column, ColumnKind::Numeric)?;
    require_kind(dataset, y_column, ColumnKind::Numeric)?;

    // Rows missing either coordinate are dropped before the spec is built;
    // the correlation is computed over the same filtered pairs.
    let raw_x = dataset.numeric_values(x_column)?;
    let raw_y = dataset.numeric_values(y_column)?;
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (x, y) in raw_x.iter().zip(&raw_y) {
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(*x);
            ys.push(*y);
        }
    }

    let correlation = stats::pearson(&xs, &ys);
    let rows_used = xs.len();

    let mut labels = BTreeMap::new();
    labels.insert(x_column.to_string(), labels::axis_label(x_column));
    labels.insert(y_column.to_string(), labels::axis_label(y_column));

    let mut layout = ChartLayout {
        opacity: Some(0.6),
        trendline: Some("ols".to_string()),
        height: Some(500),
        ..ChartLayout::default()
    };
    if y_column == PRICE_COLUMN {
        layout.y_tick_prefix = Some("$".to_string());
        layout.y_tick_format = Some(",".to_string());
    }

    Ok(BuiltChart {
        spec: ChartSpec {
            trace_type: ChartKind::Scatter,
            title: labels::scatter_title(x_column, y_column),
            labels,
            nbins: None,
            layout,
            series: ChartSeries::Scatter { x: xs, y: ys },
        },
        rows_used,
        correlation,
    })
}

fn bar(dataset: &Dataset, request: &ChartRequest) -> Result<BuiltChart, AppError> {
    let column = request.x.as_str();
    require_kind(dataset, column, ColumnKind::Categorical)?;

    let values = dataset.string_values(column)?;
    let counts = stats::category_counts(&values);
    let rows_used = counts.iter().map(|(_, n)| n).sum();

    let mut labels = BTreeMap::new();
    labels.insert(column.to_string(), labels::axis_label(column));
    labels.insert("count".to_string(), labels::axis_label("count"));

    let layout = ChartLayout {
        color_by: Some(column.to_string()),
        ..ChartLayout::default()
    };

    let (categories, tallies): (Vec<String>, Vec<usize>) = counts.into_iter().unzip();

    Ok(BuiltChart {
        spec: ChartSpec {
            trace_type: ChartKind::Bar,
            title: labels::bar_title(column),
            labels,
            nbins: None,
            layout,
            series: ChartSeries::Bar {
                categories,
                counts: tallies,
            },
        },
        rows_used,
        correlation: None,
    })
}
