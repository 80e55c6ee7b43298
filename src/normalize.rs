//! Field normalizer
//!
//! Coerces heterogeneous input cells into canonical types exactly once, at ingestion.
//! Anything that cannot be coerced becomes `None` and is treated as absent downstream.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::{OrderRow, RawRecord, RawValue};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a numeric cell. Text is trimmed and parsed; booleans and non-finite values are missing.
pub fn parse_number(value: Option<&RawValue>) -> Option<f64> {
    let n = match value? {
        RawValue::Int(i) => *i as f64,
        RawValue::Float(f) => *f,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Bool(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Parse a timestamp cell. Only text is accepted; numbers are never read as epoch offsets.
pub fn parse_datetime(value: Option<&RawValue>) -> Option<NaiveDateTime> {
    let RawValue::Text(s) = value? else {
        return None;
    };
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Exact mapping: native booleans and the strings "True"/"False". Nothing else.
pub fn parse_fulfilled(value: Option<&RawValue>) -> Option<bool> {
    match value? {
        RawValue::Bool(b) => Some(*b),
        RawValue::Text(s) if s == "True" => Some(true),
        RawValue::Text(s) if s == "False" => Some(false),
        _ => None,
    }
}

/// Quantities are positive integers; anything else is missing.
pub fn parse_quantity(value: Option<&RawValue>) -> Option<u32> {
    let n = parse_number(value)?;
    if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

fn label(value: Option<&RawValue>) -> Option<String> {
    value.and_then(RawValue::as_label)
}

fn key(value: Option<&RawValue>) -> String {
    value.map(RawValue::as_key).unwrap_or_default()
}

pub fn normalize_record(raw: &RawRecord) -> OrderRow {
    OrderRow {
        order_id: key(raw.order_id.as_ref()),
        warehouse_id: key(raw.warehouse_id.as_ref()),
        warehouse_name: key(raw.warehouse_name.as_ref()),
        warehouse_location: key(raw.warehouse_location.as_ref()),
        team_assignment: label(raw.team_assignment.as_ref()),
        product_id: key(raw.product_id.as_ref()),
        product_name: label(raw.product_name.as_ref()),
        product_category: label(raw.product_category.as_ref()),
        brand: label(raw.brand.as_ref()),
        quantity: parse_quantity(raw.quantity.as_ref()),
        order_date: parse_datetime(raw.order_date.as_ref()),
        expected_delivery_date: parse_datetime(raw.expected_delivery_date.as_ref()),
        actual_delivery_date: parse_datetime(raw.actual_delivery_date.as_ref()),
        processing_time: parse_number(raw.processing_time.as_ref()),
        shipping_time: parse_number(raw.shipping_time.as_ref()),
        order_status: label(raw.order_status.as_ref()),
        is_fulfilled: parse_fulfilled(raw.is_fulfilled.as_ref()),
    }
}

/// Normalize a whole dataset into a new vector; the input is left untouched.
pub fn normalize(records: &[RawRecord]) -> Vec<OrderRow> {
    let rows: Vec<OrderRow> = records.iter().map(normalize_record).collect();

    let missing_processing = rows.iter().filter(|r| r.processing_time.is_none()).count();
    let missing_order_date = rows.iter().filter(|r| r.order_date.is_none()).count();
    debug!(
        rows = rows.len(),
        missing_processing, missing_order_date, "normalized dataset"
    );

    rows
}
