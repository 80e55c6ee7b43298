//! Derived per-row fields: delay flag, fulfillment flag, processing stage and date parts.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::OrderRow;

/// Statuses that count as fulfilled when the direct flag is unusable
pub const FULFILLED_STATUSES: &[&str] = &["delivered", "completed", "fulfilled"];

/// Processing-time bucket used for bottleneck counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProcessingStage {
    Rapid,
    Normal,
    Extended,
    Delayed,
    Critical,
}

impl ProcessingStage {
    pub const ALL: [ProcessingStage; 5] = [
        ProcessingStage::Rapid,
        ProcessingStage::Normal,
        ProcessingStage::Extended,
        ProcessingStage::Delayed,
        ProcessingStage::Critical,
    ];

    /// Left-inclusive buckets over hours: [0,2) [2,6) [6,12) [12,24) [24,inf).
    /// Negative or missing processing times have no stage.
    pub fn from_hours(hours: Option<f64>) -> Option<Self> {
        match hours? {
            h if h < 0.0 => None,
            h if h < 2.0 => Some(ProcessingStage::Rapid),
            h if h < 6.0 => Some(ProcessingStage::Normal),
            h if h < 12.0 => Some(ProcessingStage::Extended),
            h if h < 24.0 => Some(ProcessingStage::Delayed),
            _ => Some(ProcessingStage::Critical),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStage::Rapid => "Rapid",
            ProcessingStage::Normal => "Normal",
            ProcessingStage::Extended => "Extended",
            ProcessingStage::Delayed => "Delayed",
            ProcessingStage::Critical => "Critical",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized row plus everything computed from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub row: OrderRow,
    pub is_delayed: bool,
    pub fulfilled: bool,
    pub stage: Option<ProcessingStage>,
    pub date: Option<NaiveDate>,
    pub month: Option<u32>,
    /// 0 = Monday, 6 = Sunday
    pub day_of_week: Option<u32>,
}

/// Delayed only when a delivery happened and it landed after the expected date.
/// Undelivered orders are never delayed, however overdue they are.
pub fn is_delayed(actual: Option<NaiveDateTime>, expected: Option<NaiveDateTime>) -> bool {
    match (actual, expected) {
        (Some(actual), Some(expected)) => actual > expected,
        _ => false,
    }
}

/// Direct flag when usable, otherwise membership of the status in `FULFILLED_STATUSES`.
pub fn resolve_fulfilled(is_fulfilled: Option<bool>, order_status: Option<&str>) -> bool {
    if let Some(flag) = is_fulfilled {
        return flag;
    }
    order_status
        .map(|s| {
            let status = s.trim().to_lowercase();
            FULFILLED_STATUSES.contains(&status.as_str())
        })
        .unwrap_or(false)
}

pub fn enrich(row: &OrderRow) -> EnrichedRow {
    let date = row.order_date.map(|dt| dt.date());
    EnrichedRow {
        is_delayed: is_delayed(row.actual_delivery_date, row.expected_delivery_date),
        fulfilled: resolve_fulfilled(row.is_fulfilled, row.order_status.as_deref()),
        stage: ProcessingStage::from_hours(row.processing_time),
        date,
        month: date.map(|d| d.month()),
        day_of_week: date.map(|d| d.weekday().num_days_from_monday()),
        row: row.clone(),
    }
}

pub fn enrich_all(rows: &[OrderRow]) -> Vec<EnrichedRow> {
    rows.iter().map(enrich).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::normalize::normalize_record;

    fn dt(s: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
    }

    fn blank_row() -> OrderRow {
        normalize_record(&RawRecord::default())
    }

    #[test]
    fn test_stage_buckets() {
        assert_eq!(ProcessingStage::from_hours(Some(0.0)), Some(ProcessingStage::Rapid));
        assert_eq!(ProcessingStage::from_hours(Some(1.99)), Some(ProcessingStage::Rapid));
        assert_eq!(ProcessingStage::from_hours(Some(5.0)), Some(ProcessingStage::Normal));
        assert_eq!(ProcessingStage::from_hours(Some(6.0)), Some(ProcessingStage::Extended));
        assert_eq!(ProcessingStage::from_hours(Some(12.0)), Some(ProcessingStage::Delayed));
        assert_eq!(ProcessingStage::from_hours(Some(24.0)), Some(ProcessingStage::Critical));
        assert_eq!(ProcessingStage::from_hours(Some(500.0)), Some(ProcessingStage::Critical));
        assert_eq!(ProcessingStage::from_hours(Some(-0.5)), None);
        assert_eq!(ProcessingStage::from_hours(None), None);
    }

    #[test]
    fn test_delay_flag() {
        let expected = dt("2024-01-10 12:00:00");
        assert!(is_delayed(dt("2024-01-10 12:00:01"), expected));
        assert!(!is_delayed(dt("2024-01-10 12:00:00"), expected));
        assert!(!is_delayed(None, expected));
        assert!(!is_delayed(dt("2024-01-11 00:00:00"), None));
    }

    #[test]
    fn test_fulfilled_fallback() {
        assert!(resolve_fulfilled(Some(true), Some("Canceled")));
        assert!(!resolve_fulfilled(Some(false), Some("Delivered")));
        assert!(resolve_fulfilled(None, Some("DELIVERED")));
        assert!(resolve_fulfilled(None, Some("completed")));
        assert!(!resolve_fulfilled(None, Some("Shipped")));
        assert!(!resolve_fulfilled(None, None));
    }

    #[test]
    fn test_date_parts() {
        let mut row = blank_row();
        // 2024-03-06 is a Wednesday
        row.order_date = dt("2024-03-06 23:15:00");
        row.processing_time = Some(5.0);
        let enriched = enrich(&row);

        assert_eq!(enriched.date, NaiveDate::from_ymd_opt(2024, 3, 6));
        assert_eq!(enriched.month, Some(3));
        assert_eq!(enriched.day_of_week, Some(2));
        assert_eq!(enriched.stage, Some(ProcessingStage::Normal));
        assert_eq!(enriched.row, row);
    }

    #[test]
    fn test_missing_order_date_has_no_parts() {
        let enriched = enrich(&blank_row());
        assert_eq!(enriched.date, None);
        assert_eq!(enriched.month, None);
        assert_eq!(enriched.day_of_week, None);
        assert!(!enriched.is_delayed);
        assert!(!enriched.fulfilled);
    }
}
