use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to load dataset: {0}")]
    DatasetLoad(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },
    #[error("Invalid bin count: {0} (must be a positive integer)")]
    InvalidBinCount(i64),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ColumnNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidColumn { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidBinCount(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DatasetLoad(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DataFrame(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
