use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Histogram,
    Scatter,
    Bar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Bar => "bar",
        }
    }
}

/// A user's chart selection, validated against the dataset schema before
/// dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
    pub bin_count: Option<i64>,
}

/// Declarative styling carried on the spec for the rendering collaborator.
/// Everything here is configuration, nothing is computed from the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLayout {
    pub bargap: Option<f64>,
    pub show_legend: Option<bool>,
    pub height: Option<u32>,
    pub opacity: Option<f64>,
    pub trendline: Option<String>,
    pub y_tick_prefix: Option<String>,
    pub y_tick_format: Option<String>,
    pub color_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Histogram { values: Vec<f64> },
    Scatter { x: Vec<f64>, y: Vec<f64> },
    Bar { categories: Vec<String>, counts: Vec<usize> },
}

/// A fully resolved chart configuration, ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub trace_type: ChartKind,
    pub title: String,
    /// Axis/field name -> human-readable label.
    pub labels: BTreeMap<String, String>,
    pub nbins: Option<usize>,
    pub layout: ChartLayout,
    pub series: ChartSeries,
}

/// Dispatcher result: the spec plus its documented secondary outputs.
/// `correlation` is only populated for scatter charts.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltChart {
    pub spec: ChartSpec,
    pub rows_used: usize,
    pub correlation: Option<f64>,
}
