//! Load a CSV or Excel export of joined order rows into the embedded database
//!
//! Run: ./target/release/ingest --input raw-data/orders.csv [--db-path data/warehouse_ops.db]
//!      ./target/release/ingest --sample   (seeded sample dataset instead of a file)

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use warehouse_ops::db;
use warehouse_ops::sample::{generate_sample, SampleOptions};
use warehouse_ops::source::{read_csv, read_excel, DataSource, DEFAULT_DB_PATH};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Load warehouse order data into SurrealDB")]
struct Args {
    /// CSV or Excel file with joined order rows
    #[arg(long, required_unless_present = "sample")]
    input: Option<PathBuf>,

    /// Ingest the generated sample dataset
    #[arg(long)]
    sample: bool,

    #[arg(long, default_value = "42")]
    seed: u64,

    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let records = match &args.input {
        Some(path) if !args.sample => {
            info!("Reading {:?}", path);
            match DataSource::from_file(path.clone())? {
                DataSource::Excel(path) => read_excel(&path)?,
                _ => read_csv(path)?,
            }
        }
        _ => {
            info!("Generating sample dataset (seed {})", args.seed);
            generate_sample(&SampleOptions::default().with_seed(args.seed))
        }
    };

    info!("Connecting to SurrealDB at {}", args.db_path);
    let conn = db::connect(&args.db_path).await?;

    info!("Initializing schema...");
    db::init_schema(&conn).await?;

    let count = db::insert_dataset(&conn, &records).await?;

    println!("\n=== Ingestion Complete ===");
    println!("Orders inserted: {}", count);
    println!("Database: {}", args.db_path);

    Ok(())
}
