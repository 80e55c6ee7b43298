//! Write the seeded sample dataset as CSV
//!
//! Run: ./target/release/generate_sample [--seed 42] [--orders 200] [--output raw-data/sample_orders.csv]

use anyhow::Result;
use clap::Parser;
use csv::Writer;
use std::path::PathBuf;
use tracing::info;

use warehouse_ops::models::CsvRecord;
use warehouse_ops::sample::{generate_sample, SampleOptions};

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate a sample warehouse order dataset")]
struct Args {
    #[arg(long, default_value = "42")]
    seed: u64,

    #[arg(long, default_value = "200")]
    orders: usize,

    /// Length of the order window in days
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(i64).range(0..))]
    days: i64,

    #[arg(long, default_value = "raw-data/sample_orders.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut options = SampleOptions::default().with_seed(args.seed);
    options.orders = args.orders;
    options.days = args.days;

    let records = generate_sample(&options);

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = Writer::from_path(&args.output)?;
    for record in &records {
        writer.serialize(CsvRecord::from_raw(record))?;
    }
    writer.flush()?;

    info!("Wrote {} orders to {:?}", records.len(), args.output);
    Ok(())
}
