//! Sample dataset generator
//!
//! Produces a small, seeded warehouse/product/order dataset already joined into raw rows.
//! Cells are emitted the way a database would hand them over: native numbers and booleans,
//! timestamps as text.

use chrono::{Duration, NaiveDateTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::models::{Product, RawRecord, RawValue, Warehouse};

const WAREHOUSE_LOCATIONS: &[&str] = &[
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
    "San Antonio",
    "San Diego",
    "Dallas",
];
const TEAM_ASSIGNMENTS: &[&str] = &["Brand Team", "Performance Team", "Social Media Team"];
const PRODUCT_CATEGORIES: &[&str] = &["Electronics", "Clothing", "Furniture", "Food", "Books"];
const BRANDS: &[&str] = &[
    "PremiumBrand",
    "ValueChoice",
    "LuxuryItems",
    "EssentialGoods",
    "TrendyStuff",
];
const STATUS_OPTIONS: &[&str] = &["Processing", "Shipped", "Delivered", "Canceled"];
/// Hours added to the expected delivery; four in seven orders arrive on time
const DELAY_HOURS: &[i64] = &[0, 0, 0, 0, 12, 24, 48];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleOptions {
    pub seed: u64,
    pub warehouses: usize,
    pub products: usize,
    pub orders: usize,
    pub days: i64,
    /// End of the generated window; orders fall in the `days` before it
    pub now: NaiveDateTime,
}

impl SampleOptions {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            seed: 42,
            warehouses: 5,
            products: 20,
            orders: 200,
            days: 60,
            now,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }
}

fn pick<'a>(options: &[&'a str], rng: &mut impl Rng) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn format_ts(dt: NaiveDateTime) -> RawValue {
    RawValue::Text(dt.format(TIMESTAMP_FORMAT).to_string())
}

fn hours(h: f64) -> Duration {
    Duration::milliseconds((h * 3_600_000.0) as i64)
}

pub fn generate_warehouses(count: usize, rng: &mut impl Rng) -> Vec<Warehouse> {
    (1..=count)
        .map(|i| Warehouse {
            warehouse_id: i.to_string(),
            warehouse_name: format!("Warehouse #{}", i),
            warehouse_location: pick(WAREHOUSE_LOCATIONS, rng).to_string(),
            team_assignment: pick(TEAM_ASSIGNMENTS, rng).to_string(),
        })
        .collect()
}

pub fn generate_products(count: usize, rng: &mut impl Rng) -> Vec<Product> {
    (1..=count)
        .map(|i| Product {
            product_id: i.to_string(),
            product_name: format!("Product {}", i),
            product_category: pick(PRODUCT_CATEGORIES, rng).to_string(),
            brand: pick(BRANDS, rng).to_string(),
        })
        .collect()
}

fn order_status(age_days: i64, rng: &mut impl Rng) -> &'static str {
    if age_days > 7 {
        // older orders are almost always delivered
        if rng.gen_bool(0.95) {
            "Delivered"
        } else {
            "Canceled"
        }
    } else {
        pick(STATUS_OPTIONS, rng)
    }
}

/// Generate the joined sample dataset. Deterministic for a given seed and `now`.
pub fn generate_sample(options: &SampleOptions) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(options.seed);

    let warehouses = generate_warehouses(options.warehouses.max(1), &mut rng);
    let products = generate_products(options.products.max(1), &mut rng);
    // a negative window collapses to orders placed on `now`'s day
    let days = options.days.max(0);
    let start = options.now - Duration::days(days);

    (1..=options.orders)
        .map(|order_id| {
            let order_date = start + Duration::days(rng.gen_range(0..=days));
            let processing_time = rng.gen_range(2.0..48.0);
            let shipping_time = rng.gen_range(24.0..120.0);
            let expected = order_date + hours(processing_time + shipping_time);
            let delay = DELAY_HOURS.choose(&mut rng).copied().unwrap_or(0);
            let actual = expected + Duration::hours(delay);

            let status = order_status((options.now - order_date).num_days(), &mut rng);
            let delivered = status == "Delivered";

            let warehouse = &warehouses[rng.gen_range(0..warehouses.len())];
            let product = &products[rng.gen_range(0..products.len())];
            let quantity = rng.gen_range(1..=5);

            RawRecord {
                order_id: Some(RawValue::Int(order_id as i64)),
                warehouse_id: Some(RawValue::text(&warehouse.warehouse_id)),
                warehouse_name: Some(RawValue::text(&warehouse.warehouse_name)),
                warehouse_location: Some(RawValue::text(&warehouse.warehouse_location)),
                team_assignment: Some(RawValue::text(&warehouse.team_assignment)),
                product_id: Some(RawValue::text(&product.product_id)),
                product_name: Some(RawValue::text(&product.product_name)),
                product_category: Some(RawValue::text(&product.product_category)),
                brand: Some(RawValue::text(&product.brand)),
                quantity: Some(RawValue::Int(quantity)),
                order_date: Some(format_ts(order_date)),
                expected_delivery_date: Some(format_ts(expected)),
                actual_delivery_date: delivered.then(|| format_ts(actual)),
                processing_time: Some(RawValue::Float(processing_time)),
                shipping_time: Some(RawValue::Float(shipping_time)),
                order_status: Some(RawValue::text(status)),
                is_fulfilled: Some(RawValue::Bool(delivered)),
            }
        })
        .collect()
}
