use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An input cell before coercion. Spreadsheets and databases hand us native
/// booleans and numbers, CSV hands us text for everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }

    /// Render as an identifier key. Integral floats lose their fractional part
    /// so that `3.0` from a spreadsheet and `"3"` from CSV land on the same key.
    pub fn as_key(&self) -> String {
        match self {
            RawValue::Bool(b) => b.to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Text content for label-like columns. Numbers are rendered, blank text is absent.
    pub fn as_label(&self) -> Option<String> {
        let label = self.as_key();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

/// One joined order/warehouse/product row as delivered by a data source.
/// `None` is the single representation of a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub order_id: Option<RawValue>,
    #[serde(default)]
    pub warehouse_id: Option<RawValue>,
    #[serde(default)]
    pub warehouse_name: Option<RawValue>,
    #[serde(default)]
    pub warehouse_location: Option<RawValue>,
    #[serde(default)]
    pub team_assignment: Option<RawValue>,
    #[serde(default)]
    pub product_id: Option<RawValue>,
    #[serde(default)]
    pub product_name: Option<RawValue>,
    #[serde(default)]
    pub product_category: Option<RawValue>,
    #[serde(default)]
    pub brand: Option<RawValue>,
    #[serde(default)]
    pub quantity: Option<RawValue>,
    #[serde(default)]
    pub order_date: Option<RawValue>,
    #[serde(default)]
    pub expected_delivery_date: Option<RawValue>,
    #[serde(default)]
    pub actual_delivery_date: Option<RawValue>,
    #[serde(default)]
    pub processing_time: Option<RawValue>,
    #[serde(default)]
    pub shipping_time: Option<RawValue>,
    #[serde(default)]
    pub order_status: Option<RawValue>,
    #[serde(default)]
    pub is_fulfilled: Option<RawValue>,
}

/// Raw record from CSV ingestion. Every cell is text; empty cells are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvRecord {
    pub order_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub warehouse_name: Option<String>,
    pub warehouse_location: Option<String>,
    pub team_assignment: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<String>,
    pub order_date: Option<String>,
    pub expected_delivery_date: Option<String>,
    pub actual_delivery_date: Option<String>,
    pub processing_time: Option<String>,
    pub shipping_time: Option<String>,
    pub order_status: Option<String>,
    pub is_fulfilled: Option<String>,
}

impl CsvRecord {
    pub fn to_raw(&self) -> RawRecord {
        fn cell(v: &Option<String>) -> Option<RawValue> {
            v.as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(RawValue::text)
        }

        RawRecord {
            order_id: cell(&self.order_id),
            warehouse_id: cell(&self.warehouse_id),
            warehouse_name: cell(&self.warehouse_name),
            warehouse_location: cell(&self.warehouse_location),
            team_assignment: cell(&self.team_assignment),
            product_id: cell(&self.product_id),
            product_name: cell(&self.product_name),
            product_category: cell(&self.product_category),
            brand: cell(&self.brand),
            quantity: cell(&self.quantity),
            order_date: cell(&self.order_date),
            expected_delivery_date: cell(&self.expected_delivery_date),
            actual_delivery_date: cell(&self.actual_delivery_date),
            processing_time: cell(&self.processing_time),
            shipping_time: cell(&self.shipping_time),
            order_status: cell(&self.order_status),
            is_fulfilled: cell(&self.is_fulfilled),
        }
    }

    pub fn from_raw(raw: &RawRecord) -> Self {
        fn cell(v: &Option<RawValue>) -> Option<String> {
            v.as_ref().map(|v| match v {
                RawValue::Bool(true) => "True".to_string(),
                RawValue::Bool(false) => "False".to_string(),
                other => other.as_key(),
            })
        }

        CsvRecord {
            order_id: cell(&raw.order_id),
            warehouse_id: cell(&raw.warehouse_id),
            warehouse_name: cell(&raw.warehouse_name),
            warehouse_location: cell(&raw.warehouse_location),
            team_assignment: cell(&raw.team_assignment),
            product_id: cell(&raw.product_id),
            product_name: cell(&raw.product_name),
            product_category: cell(&raw.product_category),
            brand: cell(&raw.brand),
            quantity: cell(&raw.quantity),
            order_date: cell(&raw.order_date),
            expected_delivery_date: cell(&raw.expected_delivery_date),
            actual_delivery_date: cell(&raw.actual_delivery_date),
            processing_time: cell(&raw.processing_time),
            shipping_time: cell(&raw.shipping_time),
            order_status: cell(&raw.order_status),
            is_fulfilled: cell(&raw.is_fulfilled),
        }
    }
}

/// Warehouse dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub warehouse_location: String,
    pub team_assignment: String,
}

/// Product dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub product_category: String,
    pub brand: String,
}

/// Normalized joined row. `None` marks a value that was absent or could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id: String,
    pub warehouse_id: String,
    pub warehouse_name: String,
    pub warehouse_location: String,
    pub team_assignment: Option<String>,
    pub product_id: String,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<u32>,
    pub order_date: Option<NaiveDateTime>,
    pub expected_delivery_date: Option<NaiveDateTime>,
    pub actual_delivery_date: Option<NaiveDateTime>,
    /// Hours
    pub processing_time: Option<f64>,
    /// Hours
    pub shipping_time: Option<f64>,
    pub order_status: Option<String>,
    pub is_fulfilled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering() {
        assert_eq!(RawValue::Float(3.0).as_key(), "3");
        assert_eq!(RawValue::Int(12).as_key(), "12");
        assert_eq!(RawValue::text(" WH-1 ").as_key(), "WH-1");
        assert_eq!(RawValue::Float(2.5).as_key(), "2.5");
    }

    #[test]
    fn test_blank_csv_cells_are_missing() {
        let csv = CsvRecord {
            order_id: Some("1".into()),
            processing_time: Some("  ".into()),
            ..Default::default()
        };
        let raw = csv.to_raw();
        assert_eq!(raw.order_id, Some(RawValue::text("1")));
        assert_eq!(raw.processing_time, None);
    }

    #[test]
    fn test_untagged_json_values() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"order_id": 7, "processing_time": "4.5", "is_fulfilled": true, "shipping_time": null}"#,
        )
        .unwrap();
        assert_eq!(raw.order_id, Some(RawValue::Int(7)));
        assert_eq!(raw.processing_time, Some(RawValue::text("4.5")));
        assert_eq!(raw.is_fulfilled, Some(RawValue::Bool(true)));
        assert_eq!(raw.shipping_time, None);
        assert_eq!(raw.warehouse_id, None);
    }

    #[test]
    fn test_csv_round_trip_keeps_boolean_spelling() {
        let raw = RawRecord {
            is_fulfilled: Some(RawValue::Bool(false)),
            ..Default::default()
        };
        assert_eq!(CsvRecord::from_raw(&raw).is_fulfilled.as_deref(), Some("False"));
    }
}
