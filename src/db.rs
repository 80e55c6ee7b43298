use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::models::{Product, RawRecord, RawValue, Warehouse};
use crate::normalize::parse_datetime;
use crate::sample::TIMESTAMP_FORMAT;

pub type DbConn = Surreal<Db>;

/// Initialize database connection with RocksDB backend
pub async fn connect(path: &str) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns("warehouse_ops").use_db("dashboard").await?;
    Ok(db)
}

/// Initialize database schema
pub async fn init_schema(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        -- Warehouse dimension
        DEFINE TABLE warehouses SCHEMAFULL;
        DEFINE FIELD warehouse_id ON warehouses TYPE string;
        DEFINE FIELD warehouse_name ON warehouses TYPE string;
        DEFINE FIELD warehouse_location ON warehouses TYPE string;
        DEFINE FIELD team_assignment ON warehouses TYPE string;
        DEFINE INDEX idx_warehouse_id ON warehouses FIELDS warehouse_id UNIQUE;

        -- Product dimension
        DEFINE TABLE products SCHEMAFULL;
        DEFINE FIELD product_id ON products TYPE string;
        DEFINE FIELD product_name ON products TYPE string;
        DEFINE FIELD product_category ON products TYPE string;
        DEFINE FIELD brand ON products TYPE string;
        DEFINE INDEX idx_product_id ON products FIELDS product_id UNIQUE;

        -- Orders keep their cells as delivered (schemaless); order_date is canonical text
        DEFINE TABLE orders SCHEMALESS;
        DEFINE INDEX idx_order_id ON orders FIELDS order_id UNIQUE;
        DEFINE INDEX idx_order_date ON orders FIELDS order_date;
        "#,
    )
    .await?
    .check()?;

    Ok(())
}

/// Order document. The dimension keys are turned into record links after insert.
#[derive(Debug, Clone, Serialize)]
struct OrderDoc {
    order_id: String,
    warehouse_key: String,
    product_key: String,
    quantity: Option<RawValue>,
    order_date: Option<RawValue>,
    expected_delivery_date: Option<RawValue>,
    actual_delivery_date: Option<RawValue>,
    processing_time: Option<RawValue>,
    shipping_time: Option<RawValue>,
    order_status: Option<RawValue>,
    is_fulfilled: Option<RawValue>,
}

fn key(value: &Option<RawValue>) -> String {
    value.as_ref().map(RawValue::as_key).unwrap_or_default()
}

/// Rewrite parseable timestamps into the one text format range queries compare against
fn canonical_timestamp(value: &Option<RawValue>) -> Option<RawValue> {
    match parse_datetime(value.as_ref()) {
        Some(dt) => Some(RawValue::Text(dt.format(TIMESTAMP_FORMAT).to_string())),
        None => value.clone(),
    }
}

/// Split joined rows back into the three tables
fn split(records: &[RawRecord]) -> (Vec<Warehouse>, Vec<Product>, Vec<OrderDoc>) {
    let mut warehouses: BTreeMap<String, Warehouse> = BTreeMap::new();
    let mut products: BTreeMap<String, Product> = BTreeMap::new();

    let orders = records
        .iter()
        .map(|r| {
            let warehouse_key = key(&r.warehouse_id);
            let product_key = key(&r.product_id);

            warehouses
                .entry(warehouse_key.clone())
                .or_insert_with(|| Warehouse {
                    warehouse_id: warehouse_key.clone(),
                    warehouse_name: key(&r.warehouse_name),
                    warehouse_location: key(&r.warehouse_location),
                    team_assignment: key(&r.team_assignment),
                });
            products.entry(product_key.clone()).or_insert_with(|| Product {
                product_id: product_key.clone(),
                product_name: key(&r.product_name),
                product_category: key(&r.product_category),
                brand: key(&r.brand),
            });

            OrderDoc {
                order_id: key(&r.order_id),
                warehouse_key,
                product_key,
                quantity: r.quantity.clone(),
                order_date: canonical_timestamp(&r.order_date),
                expected_delivery_date: canonical_timestamp(&r.expected_delivery_date),
                actual_delivery_date: canonical_timestamp(&r.actual_delivery_date),
                processing_time: r.processing_time.clone(),
                shipping_time: r.shipping_time.clone(),
                order_status: r.order_status.clone(),
                is_fulfilled: r.is_fulfilled.clone(),
            }
        })
        .collect();

    (
        warehouses.into_values().collect(),
        products.into_values().collect(),
        orders,
    )
}

/// Store a joined dataset as warehouses, products and linked orders. Returns the order count.
pub async fn insert_dataset(db: &DbConn, records: &[RawRecord]) -> Result<usize> {
    let (warehouses, products, orders) = split(records);

    info!("Inserting {} warehouses...", warehouses.len());
    for w in warehouses {
        db.query("CREATE type::thing('warehouses', $id) CONTENT $data")
            .bind(("id", w.warehouse_id.clone()))
            .bind(("data", w))
            .await?
            .check()?;
    }

    info!("Inserting {} products...", products.len());
    for p in products {
        db.query("CREATE type::thing('products', $id) CONTENT $data")
            .bind(("id", p.product_id.clone()))
            .bind(("data", p))
            .await?
            .check()?;
    }

    info!("Inserting {} orders...", orders.len());
    let count = orders.len();
    for (i, order) in orders.into_iter().enumerate() {
        db.query("CREATE orders CONTENT $data")
            .bind(("data", order))
            .await?
            .check()?;
        if (i + 1) % 1000 == 0 {
            debug!("Inserted {} orders", i + 1);
        }
    }

    db.query(
        r#"
        UPDATE orders SET
            warehouse = type::thing('warehouses', warehouse_key),
            product = type::thing('products', product_key)
        "#,
    )
    .await?
    .check()?;

    Ok(count)
}

/// Joined rows for orders placed within `[start, end]`
pub async fn fetch_records(db: &DbConn, start: &str, end: &str) -> Result<Vec<RawRecord>> {
    let rows: Vec<serde_json::Value> = db
        .query(
            r#"
            SELECT
                order_id,
                warehouse.warehouse_id AS warehouse_id,
                warehouse.warehouse_name AS warehouse_name,
                warehouse.warehouse_location AS warehouse_location,
                warehouse.team_assignment AS team_assignment,
                product.product_id AS product_id,
                product.product_name AS product_name,
                product.product_category AS product_category,
                product.brand AS brand,
                quantity,
                order_date,
                expected_delivery_date,
                actual_delivery_date,
                processing_time,
                shipping_time,
                order_status,
                is_fulfilled
            FROM orders
            WHERE order_date >= $start AND order_date <= $end
            "#,
        )
        .bind(("start", start.to_string()))
        .bind(("end", end.to_string()))
        .await?
        .take(0)?;

    let records = rows
        .into_iter()
        .map(serde_json::from_value::<RawRecord>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::sample::{generate_sample, SampleOptions};
    use chrono::NaiveDateTime;

    #[test]
    fn test_split_dedupes_dimensions() {
        let mk = |order: i64, warehouse: &str, product: &str| RawRecord {
            order_id: Some(RawValue::Int(order)),
            warehouse_id: Some(RawValue::text(warehouse)),
            warehouse_name: Some(RawValue::text(format!("Warehouse #{}", warehouse))),
            product_id: Some(RawValue::text(product)),
            order_date: Some(RawValue::text("2024-05-01T10:00:00")),
            ..Default::default()
        };
        let records = vec![mk(1, "1", "a"), mk(2, "1", "b"), mk(3, "2", "a")];
        let (warehouses, products, orders) = split(&records);

        assert_eq!(warehouses.len(), 2);
        assert_eq!(products.len(), 2);
        assert_eq!(orders.len(), 3);
        assert_eq!(warehouses[0].warehouse_name, "Warehouse #1");
        assert_eq!(orders[2].warehouse_key, "2");
        assert_eq!(orders[0].order_date, Some(RawValue::text("2024-05-01 10:00:00")));
    }

    #[test]
    fn test_unparseable_timestamp_is_kept_verbatim() {
        let value = Some(RawValue::text("someday"));
        assert_eq!(canonical_timestamp(&value), value);
        assert_eq!(canonical_timestamp(&None), None);
    }

    #[tokio::test]
    async fn test_roundtrip_through_record_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");
        let db = connect(&path.to_string_lossy()).await.unwrap();
        init_schema(&db).await.unwrap();

        let now = NaiveDateTime::parse_from_str("2024-06-30 12:00:00", TIMESTAMP_FORMAT).unwrap();
        let records = generate_sample(&SampleOptions::new(now));
        assert_eq!(insert_dataset(&db, &records).await.unwrap(), 200);

        let (start, end) = ("2024-06-01 00:00:00", "2024-06-15 23:59:59");
        let fetched = fetch_records(&db, start, end).await.unwrap();

        let lo = NaiveDateTime::parse_from_str(start, TIMESTAMP_FORMAT).unwrap();
        let hi = NaiveDateTime::parse_from_str(end, TIMESTAMP_FORMAT).unwrap();
        let expected: Vec<_> = normalize(&records)
            .into_iter()
            .filter(|r| r.order_date.map_or(false, |d| d >= lo && d <= hi))
            .collect();
        assert!(!expected.is_empty());
        assert!(expected.len() < records.len());

        let mut rows = normalize(&fetched);
        rows.sort_by_key(|r| r.order_id.parse::<u32>().unwrap_or(0));
        assert_eq!(rows.len(), expected.len());

        // dimension columns come back through the links
        for (got, want) in rows.iter().zip(expected.iter()) {
            assert_eq!(got.order_id, want.order_id);
            assert_eq!(got.warehouse_id, want.warehouse_id);
            assert_eq!(got.warehouse_name, want.warehouse_name);
            assert_eq!(got.team_assignment, want.team_assignment);
            assert_eq!(got.product_category, want.product_category);
            assert_eq!(got.order_date, want.order_date);
            assert_eq!(got.is_fulfilled, want.is_fulfilled);
        }
    }
}
