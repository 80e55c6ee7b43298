//! Dashboard entry point
//!
//! Runs the whole core over one dataset: normalize, derive, filter, aggregate, score, advise.
//! Pure and synchronous; sources and presentation live elsewhere.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::charts::{self, ChartSpec};
use crate::config::DashboardConfig;
use crate::derive::{enrich_all, EnrichedRow};
use crate::filter::{filter_by_team, TeamPreset};
use crate::insights::{generate_insights, Advisory};
use crate::metrics::{
    bottleneck_distribution, compute_kpis, monthly_trend, time_series, warehouse_performance,
    weekday_profile, BottleneckCount, Kpis, MonthlyPoint, TimeSeriesPoint, WarehouseSummary,
    WeekdayPoint,
};
use crate::models::RawRecord;
use crate::normalize::normalize;
use crate::scoring::{score_warehouses, slowest_warehouses};
use crate::source::LoadedDataset;

/// Where a report's rows came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataOrigin {
    pub source: String,
    /// Generated sample rows stand in for an unavailable source
    pub fell_back: bool,
    pub notice: Option<String>,
}

impl From<&LoadedDataset> for DataOrigin {
    fn from(dataset: &LoadedDataset) -> Self {
        Self {
            source: dataset.origin.to_string(),
            fell_back: dataset.fell_back(),
            notice: dataset
                .fallback_reason
                .as_ref()
                .map(|reason| format!("{}. Using sample data instead.", reason)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Filled in by callers that know the source; `None` for reports built from bare rows
    pub origin: Option<DataOrigin>,
    pub preset: TeamPreset,
    pub kpis: Kpis,
    /// Scored, in warehouse id order
    pub warehouses: Vec<WarehouseSummary>,
    pub slowest: Vec<WarehouseSummary>,
    pub time_series: Vec<TimeSeriesPoint>,
    pub monthly: Vec<MonthlyPoint>,
    pub weekdays: Vec<WeekdayPoint>,
    pub bottlenecks: Vec<BottleneckCount>,
    pub advisories: Vec<Advisory>,
    pub recommendations: Vec<String>,
}

impl DashboardReport {
    pub fn is_empty(&self) -> bool {
        self.kpis.order_count == 0
    }

    pub fn with_origin(mut self, origin: DataOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Normalized, enriched and team-filtered rows
pub fn prepare(records: &[RawRecord], preset: TeamPreset) -> Vec<EnrichedRow> {
    let enriched = enrich_all(&normalize(records));
    let filtered = filter_by_team(&enriched, preset);
    debug!(
        preset = preset.name(),
        total = enriched.len(),
        kept = filtered.len(),
        "Applied team filter"
    );
    filtered
}

pub fn build_report_from_rows(
    rows: &[EnrichedRow],
    preset: TeamPreset,
    config: &DashboardConfig,
) -> DashboardReport {
    let kpis = compute_kpis(rows);
    let warehouses = score_warehouses(&warehouse_performance(rows), &config.weights);
    let slowest = slowest_warehouses(&warehouses, config.top_slowest);
    let advisories = generate_insights(&kpis, preset, &config.thresholds);
    let recommendations = advisories.iter().map(|a| a.message.clone()).collect();

    DashboardReport {
        origin: None,
        preset,
        kpis,
        warehouses,
        slowest,
        time_series: time_series(rows),
        monthly: monthly_trend(rows),
        weekdays: weekday_profile(rows),
        bottlenecks: bottleneck_distribution(rows),
        advisories,
        recommendations,
    }
}

pub fn build_report(
    records: &[RawRecord],
    preset: TeamPreset,
    config: &DashboardConfig,
) -> DashboardReport {
    build_report_from_rows(&prepare(records, preset), preset, config)
}

/// Chart names accepted by `chart`
pub const CHART_NAMES: [&str; 4] = ["heatmap", "bottlenecks", "comparison", "trends"];

/// Chart description by name; `None` for an unknown name
pub fn chart(name: &str, rows: &[EnrichedRow], report: &DashboardReport) -> Option<ChartSpec> {
    match name {
        "heatmap" => Some(charts::heatmap(&report.warehouses)),
        "bottlenecks" => Some(charts::process_bottleneck_chart(rows)),
        "comparison" => Some(charts::performance_comparison(&report.warehouses)),
        "trends" => Some(charts::time_series_chart(&report.time_series)),
        _ => None,
    }
}
