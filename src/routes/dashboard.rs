use axum::{
    extract::{Path, Query, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    services::{
        charts::{
            self,
            types::{ChartKind, ChartRequest, ChartSeries},
        },
        dataset::{profiler, types::ColumnProfile},
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/dataset/summary", get(dataset_summary))
        .route("/dataset/columns/:name", get(column_profile))
        .route("/dataset/preview", get(dataset_preview))
        .route("/dataset/describe", get(dataset_describe))
        .route("/charts", post(build_chart))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Debug, Serialize, Clone)]
pub struct ColumnProfileResponse {
    name: String,
    kind: String,
    unique_count: usize,
    null_count: usize,
    null_percentage: Option<f64>,
    min_value: Option<String>,
    max_value: Option<String>,
    sample_values: Vec<String>,
    has_duplicates: bool,
}

#[derive(Debug, Serialize)]
pub struct NullReportResponse {
    column: String,
    null_count: usize,
    null_percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct YearRangeResponse {
    min: i64,
    max: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    row_count: usize,
    column_count: usize,
    kind_histogram: BTreeMap<String, usize>,
    null_report: Vec<NullReportResponse>,
    year_range: Option<YearRangeResponse>,
    columns: Vec<ColumnProfileResponse>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DescribeColumnResponse {
    column: String,
    count: usize,
    mean: f64,
    std: Option<f64>,
    min: f64,
    q25: f64,
    median: f64,
    q75: f64,
    max: f64,
}

#[derive(Debug, Serialize)]
pub struct DescribeResponse {
    columns: Vec<DescribeColumnResponse>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChartRequestBody {
    kind: String,
    x: String,
    y: Option<String>,
    bin_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChartLayoutResponse {
    bargap: Option<f64>,
    show_legend: Option<bool>,
    height: Option<u32>,
    opacity: Option<f64>,
    trendline: Option<String>,
    y_tick_prefix: Option<String>,
    y_tick_format: Option<String>,
    color_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSeriesResponse {
    Histogram { values: Vec<f64> },
    Scatter { x: Vec<f64>, y: Vec<f64> },
    Bar { categories: Vec<String>, counts: Vec<usize> },
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    trace_type: String,
    title: String,
    labels: BTreeMap<String, String>,
    nbins: Option<usize>,
    layout: ChartLayoutResponse,
    series: ChartSeriesResponse,
    rows_used: usize,
    correlation: Option<f64>,
}

fn column_response(profile: ColumnProfile) -> ColumnProfileResponse {
    ColumnProfileResponse {
        name: profile.name,
        kind: profile.kind.as_str().to_string(),
        unique_count: profile.unique_count,
        null_count: profile.null_count,
        null_percentage: profile.null_percentage,
        min_value: profile.min_value,
        max_value: profile.max_value,
        sample_values: profile.sample_values.to_vec(),
        has_duplicates: profile.has_duplicates,
    }
}

async fn dataset_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = profiler::profile(&state.dataset).await?;

    Ok(Json(SummaryResponse {
        row_count: summary.row_count,
        column_count: summary.column_count,
        kind_histogram: summary
            .kind_histogram
            .into_iter()
            .map(|(kind, count)| (kind.as_str().to_string(), count))
            .collect(),
        null_report: summary
            .null_report
            .into_iter()
            .map(|entry| NullReportResponse {
                column: entry.column,
                null_count: entry.null_count,
                null_percentage: entry.null_percentage,
            })
            .collect(),
        year_range: summary.year_range.map(|range| YearRangeResponse {
            min: range.min,
            max: range.max,
        }),
        columns: summary.columns.into_iter().map(column_response).collect(),
        numeric_columns: summary.numeric_columns,
        categorical_columns: summary.categorical_columns,
    }))
}

async fn column_profile(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ColumnProfileResponse>, AppError> {
    let profile = profiler::profile_column(&state.dataset, &name).await?;
    Ok(Json(column_response(profile)))
}

async fn dataset_preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<PreviewResponse>, AppError> {
    let rows = params
        .rows
        .unwrap_or(10)
        .min(state.config.max_preview_rows);
    let rendered = profiler::preview(&state.dataset, rows).await?;

    Ok(Json(PreviewResponse {
        columns: state.dataset.schema().columns().to_vec(),
        rows: rendered,
    }))
}

async fn dataset_describe(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DescribeResponse>, AppError> {
    let described = profiler::describe(&state.dataset).await?;

    Ok(Json(DescribeResponse {
        columns: described
            .into_iter()
            .map(|(column, summary)| DescribeColumnResponse {
                column,
                count: summary.count,
                mean: summary.mean,
                std: summary.std,
                min: summary.min,
                q25: summary.q25,
                median: summary.median,
                q75: summary.q75,
                max: summary.max,
            })
            .collect(),
    }))
}

#[axum::debug_handler]
async fn build_chart(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChartRequestBody>,
) -> Result<Json<ChartResponse>, AppError> {
    let kind = match body.kind.as_str() {
        "histogram" => ChartKind::Histogram,
        "scatter" => ChartKind::Scatter,
        "bar" => ChartKind::Bar,
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unknown chart kind '{}'",
                other
            )))
        }
    };

    let request = ChartRequest {
        kind,
        x: body.x,
        y: body.y,
        bin_count: body.bin_count,
    };

    let built = charts::build_chart(&state.dataset, &request).await?;
    let layout = built.spec.layout;

    Ok(Json(ChartResponse {
        trace_type: built.spec.trace_type.as_str().to_string(),
        title: built.spec.title,
        labels: built.spec.labels,
        nbins: built.spec.nbins,
        layout: ChartLayoutResponse {
            bargap: layout.bargap,
            show_legend: layout.show_legend,
            height: layout.height,
            opacity: layout.opacity,
            trendline: layout.trendline,
            y_tick_prefix: layout.y_tick_prefix,
            y_tick_format: layout.y_tick_format,
            color_by: layout.color_by,
        },
        series: match built.spec.series {
            ChartSeries::Histogram { values } => ChartSeriesResponse::Histogram { values },
            ChartSeries::Scatter { x, y } => ChartSeriesResponse::Scatter { x, y },
            ChartSeries::Bar { categories, counts } => {
                ChartSeriesResponse::Bar { categories, counts }
            }
        },
        rows_used: built.rows_used,
        correlation: built.correlation,
    }))
}
