//! REST API server for the warehouse dashboard
//!
//! Usage:
//!   ./target/release/api_server [--port 8080] [--source sample|csv|excel|database] [--path P] [--config C]
//!
//! REST endpoints (all report endpoints accept ?preset=&start=&end=):
//!   GET /api/v1/health                 - Health check
//!   GET /api/v1/dashboard              - Full report
//!   GET /api/v1/kpis                   - Headline KPIs
//!   GET /api/v1/warehouses             - Scored warehouse summary
//!   GET /api/v1/warehouses/slowest     - Slowest warehouses (?limit=N)
//!   GET /api/v1/trends                 - Daily, monthly and weekday trends
//!   GET /api/v1/bottlenecks            - Processing-stage counts per warehouse
//!   GET /api/v1/recommendations        - Warnings and recommendations
//!   GET /api/v1/charts/:name           - heatmap | bottlenecks | comparison | trends

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warehouse_ops::api::{self, DashboardService};
use warehouse_ops::config;
use warehouse_ops::source::{DataSource, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve warehouse dashboard reports over HTTP")]
struct Args {
    #[arg(long, default_value = "8080")]
    port: u16,

    #[arg(long, value_enum, default_value = "sample")]
    source: SourceKind,

    /// CSV/Excel file, or database directory
    #[arg(long)]
    path: Option<PathBuf>,

    /// JSON config file (falls back to WAREHOUSE_OPS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_banner(port: u16, source: &str) {
    println!("============================================================");
    println!("         WAREHOUSE OPERATIONS API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  Source:   {}", source);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/dashboard           Full report");
    println!("  GET /api/v1/kpis                KPIs");
    println!("  GET /api/v1/warehouses          Warehouse summary");
    println!("  GET /api/v1/warehouses/slowest  Slowest warehouses");
    println!("  GET /api/v1/trends              Trends");
    println!("  GET /api/v1/bottlenecks         Bottlenecks");
    println!("  GET /api/v1/recommendations     Recommendations");
    println!("  GET /api/v1/charts/:name        Chart description");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    let source = DataSource::from_kind(args.source, args.path, None)?;

    print_banner(args.port, source.label());

    let service = Arc::new(DashboardService::new(source, config));
    let app = api::router(service);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
