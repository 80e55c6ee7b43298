//! Chart descriptions
//!
//! Pure functions turning summary tables into a renderer-agnostic description.
//! Nothing here draws; the presentation layer decides how to plot a `ChartSpec`.

use serde::{Deserialize, Serialize};

use crate::derive::EnrichedRow;
use crate::metrics::{TimeSeriesPoint, WarehouseSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Heatmap,
    Bar,
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Line,
    /// One row of a heatmap
    Cells,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub axis: Axis,
    pub values: Vec<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_title: String,
    pub x_labels: Vec<String>,
    pub y_titles: Vec<String>,
    pub series: Vec<Series>,
    pub color_scale: Option<String>,
}

impl ChartSpec {
    fn empty(title: &str, kind: ChartKind) -> Self {
        Self {
            title: title.to_string(),
            kind,
            x_title: String::new(),
            x_labels: vec![],
            y_titles: vec![],
            series: vec![],
            color_scale: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

const METRIC_LABELS: [&str; 3] = [
    "Avg Processing Time (hrs)",
    "Delay Rate (%)",
    "Fulfillment Rate (%)",
];

/// Fulfillment steps used by the process bottleneck chart, left-inclusive hour ranges.
/// These are coarser than `ProcessingStage` and exist only for this chart.
pub const PROCESS_STEPS: [(&str, f64, f64); 5] = [
    ("Order Receipt", 0.0, 1.0),
    ("Picking", 1.0, 3.0),
    ("Packing", 3.0, 6.0),
    ("Quality Check", 6.0, 10.0),
    ("Shipping", 10.0, f64::INFINITY),
];

fn metric_values(w: &WarehouseSummary) -> Vec<f64> {
    vec![w.avg_processing_time, w.delay_rate, w.fulfillment_rate]
}

/// Warehouses down, metrics across
pub fn heatmap(summary: &[WarehouseSummary]) -> ChartSpec {
    let title = "Warehouse Performance Heatmap";
    if summary.is_empty() {
        return ChartSpec::empty(title, ChartKind::Heatmap);
    }

    ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Heatmap,
        x_title: "Metric".to_string(),
        x_labels: METRIC_LABELS.iter().map(|s| s.to_string()).collect(),
        y_titles: vec!["Warehouse".to_string()],
        series: summary
            .iter()
            .map(|w| Series {
                name: w.warehouse_name.clone(),
                kind: SeriesKind::Cells,
                axis: Axis::Primary,
                values: metric_values(w),
                color: None,
            })
            .collect(),
        color_scale: Some("RdYlGn_r".to_string()),
    }
}

/// Order count per process step (bars) with mean processing time per step (line)
pub fn process_bottleneck_chart(rows: &[EnrichedRow]) -> ChartSpec {
    let title = "Process Bottleneck Analysis";
    if rows.is_empty() {
        return ChartSpec::empty(title, ChartKind::Combo);
    }

    let mut counts = Vec::with_capacity(PROCESS_STEPS.len());
    let mut means = Vec::with_capacity(PROCESS_STEPS.len());
    for (_, lo, hi) in PROCESS_STEPS {
        let in_step: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.row.processing_time)
            .filter(|h| *h >= lo && *h < hi)
            .collect();
        counts.push(in_step.len() as f64);
        means.push(if in_step.is_empty() {
            0.0
        } else {
            in_step.iter().sum::<f64>() / in_step.len() as f64
        });
    }

    ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Combo,
        x_title: "Processing Stage".to_string(),
        x_labels: PROCESS_STEPS.iter().map(|(name, _, _)| name.to_string()).collect(),
        y_titles: vec![
            "Order Count".to_string(),
            "Average Processing Time (hrs)".to_string(),
        ],
        series: vec![
            Series {
                name: "Order Count".to_string(),
                kind: SeriesKind::Bar,
                axis: Axis::Primary,
                values: counts,
                color: Some("lightblue".to_string()),
            },
            Series {
                name: "Avg Processing Time (hrs)".to_string(),
                kind: SeriesKind::Line,
                axis: Axis::Secondary,
                values: means,
                color: Some("red".to_string()),
            },
        ],
        color_scale: None,
    }
}

/// Grouped bars: one group per warehouse, one bar per metric
pub fn performance_comparison(summary: &[WarehouseSummary]) -> ChartSpec {
    let title = "Warehouse Performance Comparison";
    if summary.is_empty() {
        return ChartSpec::empty(title, ChartKind::Bar);
    }

    let colors = ["#FF9999", "#FFCC99", "#99CC99"];
    let series = METRIC_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| Series {
            name: label.to_string(),
            kind: SeriesKind::Bar,
            axis: Axis::Primary,
            values: summary.iter().map(|w| metric_values(w)[i]).collect(),
            color: Some(colors[i].to_string()),
        })
        .collect();

    ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Bar,
        x_title: "Warehouse".to_string(),
        x_labels: summary.iter().map(|w| w.warehouse_name.clone()).collect(),
        y_titles: vec!["Metric Value".to_string()],
        series,
        color_scale: None,
    }
}

pub fn time_series_chart(points: &[TimeSeriesPoint]) -> ChartSpec {
    let title = "Performance Trends Over Time";
    if points.is_empty() {
        return ChartSpec::empty(title, ChartKind::Combo);
    }

    ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Combo,
        x_title: "Date".to_string(),
        x_labels: points
            .iter()
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .collect(),
        y_titles: vec![
            "Avg Processing Time (hrs)".to_string(),
            "Order Count".to_string(),
        ],
        series: vec![
            Series {
                name: "Avg Processing Time (hrs)".to_string(),
                kind: SeriesKind::Line,
                axis: Axis::Primary,
                values: points.iter().map(|p| p.avg_processing_time).collect(),
                color: Some("red".to_string()),
            },
            Series {
                name: "Order Count".to_string(),
                kind: SeriesKind::Bar,
                axis: Axis::Secondary,
                values: points.iter().map(|p| p.order_count as f64).collect(),
                color: Some("lightblue".to_string()),
            },
        ],
        color_scale: None,
    }
}
