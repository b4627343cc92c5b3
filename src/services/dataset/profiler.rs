use polars::prelude::{DataType, Series};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::services::stats;
use super::schema::ColumnKind;
use super::types::{
    render_cell, ColumnProfile, Dataset, DatasetSummary, NullReportEntry, YearRange, SAMPLE_SIZE,
};

/// Column holding the listing's model year, used for the summary's year
/// range when present.
pub const YEAR_COLUMN: &str = "model_year";

/// Profiles the whole dataset: one pass over every column, plus the
/// dataset-level aggregates derived from the same pass. Pure function of
/// the snapshot; identical calls return identical summaries.
pub async fn profile(dataset: &Dataset) -> Result<DatasetSummary, AppError> {
    let start = std::time::Instant::now();
    tracing::info!(
        "Profiling dataset: {} rows x {} columns",
        dataset.row_count(),
        dataset.column_count()
    );

    let row_count = dataset.row_count();
    let mut kind_histogram: BTreeMap<ColumnKind, usize> = BTreeMap::new();
    let mut null_report = Vec::new();
    let mut columns = Vec::new();
    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();

    for name in dataset.schema().columns() {
        let profile = column_profile(dataset, name)?;

        *kind_histogram.entry(profile.kind).or_insert(0) += 1;
        match profile.kind {
            ColumnKind::Numeric => numeric_columns.push(name.clone()),
            ColumnKind::Categorical => categorical_columns.push(name.clone()),
            ColumnKind::Other => {}
        }

        if profile.null_count > 0 {
            null_report.push(NullReportEntry {
                column: name.clone(),
                null_count: profile.null_count,
                null_percentage: profile.null_percentage,
            });
        }

        columns.push(profile);
    }

    let year_range = year_range(dataset)?;
    tracing::info!("Profiling completed in {:?}", start.elapsed());

    Ok(DatasetSummary {
        row_count,
        column_count: dataset.column_count(),
        kind_histogram,
        null_report,
        year_range,
        columns,
        numeric_columns,
        categorical_columns,
    })
}

pub async fn profile_column(dataset: &Dataset, name: &str) -> Result<ColumnProfile, AppError> {
    column_profile(dataset, name)
}

/// First `rows` rows rendered as strings, missing cells as "".
pub async fn preview(dataset: &Dataset, rows: usize) -> Result<Vec<Vec<String>>, AppError> {
    let take = rows.min(dataset.row_count());
    let frame = dataset.frame();

    let mut out = Vec::with_capacity(take);
    for idx in 0..take {
        let mut row = Vec::with_capacity(frame.width());
        for series in frame.get_columns() {
            row.push(render_cell(&series.get(idx)?));
        }
        out.push(row);
    }

    Ok(out)
}

/// Descriptive statistics for every numeric column with at least one
/// non-missing value, in dataset order.
pub async fn describe(dataset: &Dataset) -> Result<Vec<(String, stats::NumericSummary)>, AppError> {
    let mut out = Vec::new();

    for name in dataset.schema().columns() {
        if dataset.kind_of(name) != Some(ColumnKind::Numeric) {
            continue;
        }
        let values: Vec<f64> = dataset.numeric_values(name)?.into_iter().flatten().collect();
        if let Some(summary) = stats::numeric_summary(&values) {
            out.push((name.clone(), summary));
        }
    }

    Ok(out)
}

fn column_profile(dataset: &Dataset, name: &str) -> Result<ColumnProfile, AppError> {
    let kind = dataset
        .kind_of(name)
        .ok_or_else(|| AppError::ColumnNotFound(name.to_string()))?;
    let series = dataset.column(name)?;

    let row_count = dataset.row_count();
    let null_count = series.null_count();

    // n_unique counts null as a distinct value; the profile does not.
    let mut unique_count = series.n_unique()?;
    if null_count > 0 {
        unique_count -= 1;
    }

    let (min_value, max_value) = min_max(series, kind)?;

    let mut sample_values: SmallVec<[String; SAMPLE_SIZE]> = SmallVec::new();
    for idx in 0..series.len().min(SAMPLE_SIZE) {
        sample_values.push(render_cell(&series.get(idx)?));
    }

    let non_null = row_count - null_count;
    Ok(ColumnProfile {
        name: name.to_string(),
        kind,
        unique_count,
        null_count,
        null_percentage: if row_count == 0 {
            None
        } else {
            Some(null_count as f64 * 100.0 / row_count as f64)
        },
        min_value,
        max_value,
        sample_values,
        has_duplicates: unique_count < non_null,
    })
}

fn min_max(series: &Series, kind: ColumnKind) -> Result<(Option<String>, Option<String>), AppError> {
    match kind {
        ColumnKind::Numeric => {
            let casted = series.cast(&DataType::Float64)?;
            let mut min: Option<f64> = None;
            let mut max: Option<f64> = None;
            for value in casted.f64()?.into_iter().flatten() {
                min = Some(min.map_or(value, |m: f64| m.min(value)));
                max = Some(max.map_or(value, |m: f64| m.max(value)));
            }
            Ok((
                min.map(|v| v.to_string()),
                max.map(|v| v.to_string()),
            ))
        }
        _ => {
            let casted = series.cast(&DataType::String)?;
            let mut min: Option<String> = None;
            let mut max: Option<String> = None;
            for value in casted.str()?.into_iter().flatten() {
                if min.as_deref().map_or(true, |m| value < m) {
                    min = Some(value.to_string());
                }
                if max.as_deref().map_or(true, |m| value > m) {
                    max = Some(value.to_string());
                }
            }
            Ok((min, max))
        }
    }
}

fn year_range(dataset: &Dataset) -> Result<Option<YearRange>, AppError> {
    if !dataset.schema().contains(YEAR_COLUMN) {
        return Ok(None);
    }

    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    for value in dataset.numeric_values(YEAR_COLUMN)?.into_iter().flatten() {
        min = Some(min.map_or(value, |m: f64| m.min(value)));
        max = Some(max.map_or(value, |m: f64| m.max(value)));
    }

    Ok(match (min, max) {
        (Some(lo), Some(hi)) => Some(YearRange {
            min: lo as i64,
            max: hi as i64,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dataset::schema::DatasetSchema;
    use polars::prelude::*;

    fn dataset(frame: DataFrame) -> Dataset {
        let schema = DatasetSchema::from_frame(&frame);
        Dataset::new(frame, schema)
    }

    fn listings() -> Dataset {
        dataset(
            df!(
                "price" => [Some(9400.0), Some(25500.0), Some(5500.0), Some(1500.0)],
                "model_year" => [Some(2011.0), None, Some(2013.0), Some(2003.0)],
                "odometer" => [Some(145000.0), Some(88705.0), None, Some(161600.0)],
                "condition" => ["good", "good", "like new", "fair"]
            )
            .unwrap(),
        )
    }

    #[test]
    fn summary_counts_match_the_frame() {
        let data = listings();
        let summary = tokio_test::block_on(profile(&data)).unwrap();

        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.column_count, data.column_count());
        assert_eq!(
            summary.kind_histogram.values().sum::<usize>(),
            summary.column_count
        );
        assert_eq!(summary.kind_histogram[&ColumnKind::Numeric], 3);
        assert_eq!(summary.kind_histogram[&ColumnKind::Categorical], 1);
        assert_eq!(summary.numeric_columns, vec!["price", "model_year", "odometer"]);
        assert_eq!(summary.categorical_columns, vec!["condition"]);
    }

    #[test]
    fn per_column_counts_stay_within_row_count() {
        let data = listings();
        let summary = tokio_test::block_on(profile(&data)).unwrap();

        for column in &summary.columns {
            assert!(column.null_count <= summary.row_count, "{}", column.name);
            assert!(column.unique_count <= summary.row_count, "{}", column.name);
        }
    }

    #[test]
    fn profile_is_idempotent() {
        let data = listings();
        let first = tokio_test::block_on(profile(&data)).unwrap();
        let second = tokio_test::block_on(profile(&data)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn null_report_lists_only_columns_with_nulls() {
        let data = listings();
        let summary = tokio_test::block_on(profile(&data)).unwrap();

        let reported: Vec<&str> = summary
            .null_report
            .iter()
            .map(|entry| entry.column.as_str())
            .collect();
        assert_eq!(reported, vec!["model_year", "odometer"]);
        assert_eq!(summary.null_report[0].null_count, 1);
        assert_eq!(summary.null_report[0].null_percentage, Some(25.0));
    }

    #[test]
    fn column_profile_reports_exact_counts() {
        let data = listings();
        let condition = tokio_test::block_on(profile_column(&data, "condition")).unwrap();

        assert_eq!(condition.kind, ColumnKind::Categorical);
        assert_eq!(condition.unique_count, 3);
        assert_eq!(condition.null_count, 0);
        assert!(condition.has_duplicates);
        assert_eq!(condition.sample_values.as_slice(), ["good", "good", "like new"]);

        let year = tokio_test::block_on(profile_column(&data, "model_year")).unwrap();
        assert_eq!(year.unique_count, 3);
        assert_eq!(year.null_count, 1);
        assert_eq!(year.min_value.as_deref(), Some("2003"));
        assert_eq!(year.max_value.as_deref(), Some("2013"));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let data = listings();
        let err = tokio_test::block_on(profile_column(&data, "horsepower")).unwrap_err();
        assert!(matches!(err, AppError::ColumnNotFound(_)));
    }

    #[test]
    fn year_range_spans_the_column() {
        let data = listings();
        let summary = tokio_test::block_on(profile(&data)).unwrap();
        assert_eq!(summary.year_range, Some(YearRange { min: 2003, max: 2013 }));
    }

    #[test]
    fn year_range_unavailable_when_entirely_missing() {
        let data = dataset(
            df!(
                "model_year" => [None::<f64>, None::<f64>],
                "condition" => ["good", "fair"]
            )
            .unwrap(),
        );
        let summary = tokio_test::block_on(profile(&data)).unwrap();
        assert_eq!(summary.year_range, None);
    }

    #[test]
    fn empty_dataset_profiles_without_percentages() {
        let data = dataset(
            DataFrame::new(vec![
                Series::new("price", Vec::<f64>::new()),
                Series::new("condition", Vec::<String>::new()),
            ])
            .unwrap(),
        );
        let summary = tokio_test::block_on(profile(&data)).unwrap();

        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.year_range, None);
        for column in &summary.columns {
            assert_eq!(column.unique_count, 0);
            assert_eq!(column.null_count, 0);
            assert_eq!(column.null_percentage, None);
        }
    }

    #[test]
    fn preview_renders_missing_cells_as_empty() {
        let data = listings();
        let rows = tokio_test::block_on(preview(&data, 2)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "");
        assert_eq!(rows[0][3], "good");
    }

    #[test]
    fn preview_clamps_to_row_count() {
        let data = listings();
        let rows = tokio_test::block_on(preview(&data, 50)).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn describe_covers_numeric_columns_only() {
        let data = listings();
        let described = tokio_test::block_on(describe(&data)).unwrap();

        let names: Vec<&str> = described.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["price", "model_year", "odometer"]);

        let (_, price) = &described[0];
        assert_eq!(price.count, 4);
        assert_eq!(price.min, 1500.0);
        assert_eq!(price.max, 25500.0);
        assert_eq!(price.mean, 10475.0);
    }
}
