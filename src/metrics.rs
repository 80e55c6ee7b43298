//! Metric aggregation
//!
//! Scalar KPIs and grouped summaries over a (possibly team-filtered) set of enriched rows.
//! Every function is total: an empty dataset yields zero KPIs and empty tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::derive::{EnrichedRow, ProcessingStage};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kpis {
    pub avg_handling_time: f64,
    pub delay_percentage: f64,
    pub fulfillment_rate: f64,
    pub order_count: usize,
}

/// Per-warehouse summary. `performance_score` is filled by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSummary {
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub warehouse_location: String,
    pub avg_processing_time: f64,
    pub delay_rate: f64,
    pub fulfillment_rate: f64,
    pub order_count: usize,
    pub performance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub avg_processing_time: f64,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckCount {
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub stage: ProcessingStage,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub avg_processing_time: f64,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPoint {
    /// 0 = Monday
    pub day_of_week: u32,
    pub avg_processing_time: f64,
    pub order_count: usize,
}

/// Running mean over present values only
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    present: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.present += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.present == 0 {
            0.0
        } else {
            self.sum / self.present as f64
        }
    }
}

fn percentage(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}

/// Mean processing time over rows where it is present; 0 when nothing is present.
pub fn avg_handling_time(rows: &[EnrichedRow]) -> f64 {
    let mut acc = MeanAcc::default();
    for r in rows {
        acc.push(r.row.processing_time);
    }
    acc.mean()
}

pub fn delay_percentage(rows: &[EnrichedRow]) -> f64 {
    percentage(rows.iter().filter(|r| r.is_delayed).count(), rows.len())
}

pub fn fulfillment_rate(rows: &[EnrichedRow]) -> f64 {
    percentage(rows.iter().filter(|r| r.fulfilled).count(), rows.len())
}

pub fn compute_kpis(rows: &[EnrichedRow]) -> Kpis {
    Kpis {
        avg_handling_time: avg_handling_time(rows),
        delay_percentage: delay_percentage(rows),
        fulfillment_rate: fulfillment_rate(rows),
        order_count: rows.len(),
    }
}

/// One row per warehouse present in the dataset, ordered by warehouse id.
/// Name and location come from the first row seen for that warehouse.
pub fn warehouse_performance(rows: &[EnrichedRow]) -> Vec<WarehouseSummary> {
    struct Acc<'a> {
        name: &'a str,
        location: &'a str,
        processing: MeanAcc,
        delayed: usize,
        fulfilled: usize,
        count: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in rows {
        let entry = groups.entry(r.row.warehouse_id.as_str()).or_insert_with(|| Acc {
            name: &r.row.warehouse_name,
            location: &r.row.warehouse_location,
            processing: MeanAcc::default(),
            delayed: 0,
            fulfilled: 0,
            count: 0,
        });
        entry.processing.push(r.row.processing_time);
        entry.delayed += r.is_delayed as usize;
        entry.fulfilled += r.fulfilled as usize;
        entry.count += 1;
    }

    groups
        .into_iter()
        .map(|(id, acc)| WarehouseSummary {
            warehouse_id: id.to_string(),
            warehouse_name: acc.name.to_string(),
            warehouse_location: acc.location.to_string(),
            avg_processing_time: acc.processing.mean(),
            delay_rate: percentage(acc.delayed, acc.count),
            fulfillment_rate: percentage(acc.fulfilled, acc.count),
            order_count: acc.count,
            performance_score: 0.0,
        })
        .collect()
}

/// Daily trend ordered by date ascending. Rows without an order date are skipped.
pub fn time_series(rows: &[EnrichedRow]) -> Vec<TimeSeriesPoint> {
    let mut days: BTreeMap<NaiveDate, (MeanAcc, usize)> = BTreeMap::new();
    for r in rows {
        if let Some(date) = r.date {
            let entry = days.entry(date).or_default();
            entry.0.push(r.row.processing_time);
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (acc, count))| TimeSeriesPoint {
            date,
            avg_processing_time: acc.mean(),
            order_count: count,
        })
        .collect()
}

/// Sparse counts per (warehouse, stage). Unstaged rows are excluded.
pub fn bottleneck_distribution(rows: &[EnrichedRow]) -> Vec<BottleneckCount> {
    let mut counts: BTreeMap<(&str, ProcessingStage), (&str, usize)> = BTreeMap::new();
    for r in rows {
        let Some(stage) = r.stage else { continue };
        let entry = counts
            .entry((r.row.warehouse_id.as_str(), stage))
            .or_insert((r.row.warehouse_name.as_str(), 0));
        entry.1 += 1;
    }

    counts
        .into_iter()
        .map(|((id, stage), (name, count))| BottleneckCount {
            warehouse_id: id.to_string(),
            warehouse_name: name.to_string(),
            stage,
            count,
        })
        .collect()
}

pub fn monthly_trend(rows: &[EnrichedRow]) -> Vec<MonthlyPoint> {
    use chrono::Datelike;

    let mut months: BTreeMap<(i32, u32), (MeanAcc, usize)> = BTreeMap::new();
    for r in rows {
        if let (Some(date), Some(month)) = (r.date, r.month) {
            let entry = months.entry((date.year(), month)).or_default();
            entry.0.push(r.row.processing_time);
            entry.1 += 1;
        }
    }

    months
        .into_iter()
        .map(|((year, month), (acc, count))| MonthlyPoint {
            year,
            month,
            avg_processing_time: acc.mean(),
            order_count: count,
        })
        .collect()
}

pub fn weekday_profile(rows: &[EnrichedRow]) -> Vec<WeekdayPoint> {
    let mut days: BTreeMap<u32, (MeanAcc, usize)> = BTreeMap::new();
    for r in rows {
        if let Some(dow) = r.day_of_week {
            let entry = days.entry(dow).or_default();
            entry.0.push(r.row.processing_time);
            entry.1 += 1;
        }
    }

    days.into_iter()
        .map(|(day_of_week, (acc, count))| WeekdayPoint {
            day_of_week,
            avg_processing_time: acc.mean(),
            order_count: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::enrich;
    use crate::models::RawRecord;
    use crate::normalize::normalize_record;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
    }

    struct RowSpec<'a> {
        warehouse: &'a str,
        processing: Option<f64>,
        order_date: &'a str,
        expected: &'a str,
        actual: Option<&'a str>,
        fulfilled: Option<bool>,
    }

    fn make(spec: RowSpec) -> EnrichedRow {
        let mut row = normalize_record(&RawRecord::default());
        row.warehouse_id = spec.warehouse.to_string();
        row.warehouse_name = format!("Warehouse #{}", spec.warehouse);
        row.warehouse_location = "Chicago".to_string();
        row.processing_time = spec.processing;
        row.order_date = dt(spec.order_date);
        row.expected_delivery_date = dt(spec.expected);
        row.actual_delivery_date = spec.actual.and_then(dt);
        row.is_fulfilled = spec.fulfilled;
        enrich(&row)
    }

    fn simple(warehouse: &str, processing: Option<f64>, delayed: bool, fulfilled: bool) -> EnrichedRow {
        make(RowSpec {
            warehouse,
            processing,
            order_date: "2024-05-01 08:00:00",
            expected: "2024-05-04 08:00:00",
            actual: Some(if delayed { "2024-05-05 08:00:00" } else { "2024-05-03 08:00:00" }),
            fulfilled: Some(fulfilled),
        })
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(avg_handling_time(&[]), 0.0);
        assert_eq!(delay_percentage(&[]), 0.0);
        assert_eq!(fulfillment_rate(&[]), 0.0);
        assert!(warehouse_performance(&[]).is_empty());
        assert!(time_series(&[]).is_empty());
        assert!(bottleneck_distribution(&[]).is_empty());
        assert_eq!(compute_kpis(&[]), Kpis::default());
    }

    #[test]
    fn test_single_undelivered_fulfilled_row() {
        let rows = vec![make(RowSpec {
            warehouse: "1",
            processing: Some(10.0),
            order_date: "2024-05-01 08:00:00",
            expected: "2024-05-04 08:00:00",
            actual: None,
            fulfilled: Some(true),
        })];
        let kpis = compute_kpis(&rows);
        assert_eq!(kpis.avg_handling_time, 10.0);
        assert_eq!(kpis.delay_percentage, 0.0);
        assert_eq!(kpis.fulfillment_rate, 100.0);
        assert_eq!(kpis.order_count, 1);
    }

    #[test]
    fn test_half_delayed() {
        let rows = vec![simple("1", Some(4.0), true, true), simple("1", Some(4.0), false, true)];
        assert_eq!(delay_percentage(&rows), 50.0);
    }

    #[test]
    fn test_missing_processing_time_is_not_zero() {
        let rows = vec![
            simple("1", Some(4.0), false, true),
            simple("1", None, false, true),
            simple("1", Some(8.0), false, true),
        ];
        assert_eq!(avg_handling_time(&rows), 6.0);

        let all_missing = vec![simple("1", None, false, true)];
        assert_eq!(avg_handling_time(&all_missing), 0.0);
    }

    #[test]
    fn test_fulfillment_uses_status_fallback() {
        let mut row = simple("1", Some(1.0), false, true).row;
        row.is_fulfilled = None;
        row.order_status = Some("Delivered".into());
        let mut other = row.clone();
        other.order_status = Some("Processing".into());
        let rows = vec![enrich(&row), enrich(&other)];
        assert_eq!(fulfillment_rate(&rows), 50.0);
    }

    #[test]
    fn test_warehouse_performance_groups() {
        let rows = vec![
            simple("2", Some(10.0), true, false),
            simple("1", Some(4.0), false, true),
            simple("2", Some(20.0), false, true),
            simple("1", Some(6.0), false, true),
        ];
        let summary = warehouse_performance(&rows);
        assert_eq!(summary.len(), 2);

        let w1 = &summary[0];
        assert_eq!(w1.warehouse_id, "1");
        assert_eq!(w1.warehouse_name, "Warehouse #1");
        assert_eq!(w1.avg_processing_time, 5.0);
        assert_eq!(w1.delay_rate, 0.0);
        assert_eq!(w1.fulfillment_rate, 100.0);
        assert_eq!(w1.order_count, 2);

        let w2 = &summary[1];
        assert_eq!(w2.avg_processing_time, 15.0);
        assert_eq!(w2.delay_rate, 50.0);
        assert_eq!(w2.fulfillment_rate, 50.0);
    }

    #[test]
    fn test_summary_rows_match_distinct_warehouses() {
        let mut rows = vec![
            simple("A", Some(1.0), false, true),
            simple("B", Some(1.0), false, true),
            simple("A", Some(1.0), false, true),
        ];
        // same id, inconsistent name: still one summary row
        rows[2].row.warehouse_name = "Renamed".into();
        let summary = warehouse_performance(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].warehouse_name, "Warehouse #A");
    }

    #[test]
    fn test_rates_stay_in_range() {
        let rows: Vec<EnrichedRow> = (0..7)
            .map(|i| simple("1", Some(i as f64), i % 2 == 0, i % 3 == 0))
            .collect();
        for value in [delay_percentage(&rows), fulfillment_rate(&rows)] {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_time_series_sorted_by_date() {
        let mk = |date: &str, hours: f64| {
            make(RowSpec {
                warehouse: "1",
                processing: Some(hours),
                order_date: date,
                expected: "2024-06-01 00:00:00",
                actual: None,
                fulfilled: None,
            })
        };
        let rows = vec![
            mk("2024-05-03 10:00:00", 3.0),
            mk("2024-05-01 09:00:00", 2.0),
            mk("2024-05-03 18:00:00", 5.0),
            mk("bad date", 100.0),
        ];
        let series = time_series(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(series[0].order_count, 1);
        assert_eq!(series[1].avg_processing_time, 4.0);
        assert_eq!(series[1].order_count, 2);
    }

    #[test]
    fn test_bottlenecks_are_sparse() {
        let rows = vec![
            simple("1", Some(1.0), false, true),
            simple("1", Some(1.5), false, true),
            simple("1", Some(30.0), false, true),
            simple("2", Some(7.0), false, true),
            simple("2", None, false, true),
            simple("2", Some(-3.0), false, true),
        ];
        let dist = bottleneck_distribution(&rows);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[0].stage, ProcessingStage::Rapid);
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[1].stage, ProcessingStage::Critical);
        assert_eq!(dist[2].warehouse_id, "2");
        assert_eq!(dist[2].stage, ProcessingStage::Extended);
        assert_eq!(dist[2].count, 1);
    }

    #[test]
    fn test_monthly_and_weekday_profiles() {
        let mk = |date: &str| {
            make(RowSpec {
                warehouse: "1",
                processing: Some(2.0),
                order_date: date,
                expected: "2024-06-01 00:00:00",
                actual: None,
                fulfilled: None,
            })
        };
        // Monday, Monday, Friday
        let rows = vec![
            mk("2024-04-29 10:00:00"),
            mk("2024-05-06 10:00:00"),
            mk("2024-05-10 10:00:00"),
        ];
        let monthly = monthly_trend(&rows);
        assert_eq!(monthly.len(), 2);
        assert_eq!((monthly[0].year, monthly[0].month, monthly[0].order_count), (2024, 4, 1));
        assert_eq!(monthly[1].order_count, 2);

        let weekdays = weekday_profile(&rows);
        assert_eq!(weekdays.len(), 2);
        assert_eq!((weekdays[0].day_of_week, weekdays[0].order_count), (0, 2));
        assert_eq!(weekdays[1].day_of_week, 4);
    }
}
