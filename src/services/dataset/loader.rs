use bytes::Bytes;
use polars::prelude::*;
use std::io::Cursor;

use crate::error::AppError;
use super::schema::{declared_kind, ColumnKind, DatasetSchema, REQUIRED_COLUMNS};
use super::types::Dataset;

/// Reads the listings CSV from disk. Called once at startup; the returned
/// snapshot is shared read-only for the rest of the process lifetime.
pub async fn load_from_path(path: &str) -> Result<Dataset, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Loading dataset from {}", path);

    let frame = CsvReader::from_path(path)
        .map_err(|e| AppError::DatasetLoad(format!("Failed to open {}: {}", path, e)))?
        .has_header(true)
        .finish()
        .map_err(|e| AppError::DatasetLoad(format!("Failed to parse {}: {}", path, e)))?;

    let dataset = from_frame(frame)?;
    tracing::info!(
        "Dataset loaded in {:?}: {} rows x {} columns",
        start.elapsed(),
        dataset.row_count(),
        dataset.column_count()
    );

    Ok(dataset)
}

/// Same pipeline as `load_from_path`, but over an in-memory buffer.
pub async fn load_from_bytes(data: Bytes) -> Result<Dataset, AppError> {
    let cursor = Cursor::new(data.to_vec());
    let frame = CsvReader::new(cursor)
        .has_header(true)
        .finish()
        .map_err(|e| AppError::DatasetLoad(format!("Failed to parse dataset: {}", e)))?;

    from_frame(frame)
}

fn from_frame(mut frame: DataFrame) -> Result<Dataset, AppError> {
    check_required_columns(&frame)?;
    normalize_numeric_columns(&mut frame)?;

    let schema = DatasetSchema::from_frame(&frame);
    Ok(Dataset::new(frame, schema))
}

fn check_required_columns(frame: &DataFrame) -> Result<(), AppError> {
    let names = frame.get_column_names();
    for required in REQUIRED_COLUMNS {
        if !names.contains(&required) {
            return Err(AppError::DatasetLoad(format!(
                "Required column '{}' missing from header",
                required
            )));
        }
    }
    Ok(())
}

// Declared numeric columns are widened to Float64 here so the schema is
// settled once at load; columns with missing values keep their nulls.
fn normalize_numeric_columns(frame: &mut DataFrame) -> Result<(), AppError> {
    let targets: Vec<String> = frame
        .get_column_names()
        .iter()
        .filter(|name| declared_kind(name) == Some(ColumnKind::Numeric))
        .map(|name| name.to_string())
        .collect();

    for name in targets {
        let casted = frame
            .column(&name)
            .and_then(|series| series.cast(&DataType::Float64))
            .map_err(|e| AppError::DatasetLoad(format!("Failed to read column '{}': {}", name, e)))?;
        frame
            .replace(&name, casted)
            .map_err(|e| AppError::DatasetLoad(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dataset::schema::ColumnKind;

    const SAMPLE_CSV: &[u8] = b"price,model_year,odometer,condition,days_listed,fuel\n\
9400,2011,145000,good,19,gas\n\
25500,,88705,good,50,gas\n\
5500,2013,,like new,79,gas\n";

    #[test]
    fn loads_csv_and_builds_schema() {
        let dataset =
            tokio_test::block_on(load_from_bytes(Bytes::from_static(SAMPLE_CSV))).unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_count(), 6);
        assert_eq!(dataset.kind_of("price"), Some(ColumnKind::Numeric));
        assert_eq!(dataset.kind_of("condition"), Some(ColumnKind::Categorical));
        assert_eq!(dataset.kind_of("fuel"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn empty_cells_become_nulls() {
        let dataset =
            tokio_test::block_on(load_from_bytes(Bytes::from_static(SAMPLE_CSV))).unwrap();

        let odometer = dataset.numeric_values("odometer").unwrap();
        assert_eq!(odometer, vec![Some(145000.0), Some(88705.0), None]);
    }

    #[test]
    fn missing_required_column_fails_to_load() {
        let csv = Bytes::from_static(b"price,model_year,condition,days_listed\n9400,2011,good,19\n");
        let err = tokio_test::block_on(load_from_bytes(csv)).unwrap_err();

        match err {
            AppError::DatasetLoad(message) => assert!(message.contains("odometer")),
            other => panic!("expected DatasetLoad, got {:?}", other),
        }
    }

    #[test]
    fn unparsable_input_fails_to_load() {
        let garbage = Bytes::from_static(b"\x00\x01\x02\x03");
        let result = tokio_test::block_on(load_from_bytes(garbage));
        assert!(matches!(result, Err(AppError::DatasetLoad(_))));
    }
}
