//! Warehouse operations report
//!
//! Run: ./target/release/warehouse_ops [--source sample|csv|excel|database] [--path FILE]
//!      [--preset "Brand Team"] [--start YYYY-MM-DD] [--end YYYY-MM-DD] [--section all] [--json]

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warehouse_ops::config;
use warehouse_ops::dashboard::{build_report, DashboardReport, DataOrigin};
use warehouse_ops::filter::TeamPreset;
use warehouse_ops::insights::AdvisoryKind;
use warehouse_ops::sample::SampleOptions;
use warehouse_ops::source::{load_or_fallback, DataSource, DateRange, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    All,
    Kpi,
    Warehouses,
    Trends,
    Bottlenecks,
    Insights,
}

#[derive(Parser, Debug)]
#[command(name = "warehouse_ops")]
#[command(about = "Warehouse performance report: KPIs, rankings, trends and recommendations")]
struct Args {
    /// Where the order data comes from
    #[arg(long, value_enum, default_value = "sample")]
    source: SourceKind,

    /// CSV/Excel file, or database directory
    #[arg(long)]
    path: Option<PathBuf>,

    /// Team preset: "All Teams", "Brand Team", "Performance Team", "Social Media Team"
    #[arg(long, default_value = "All Teams")]
    preset: String,

    /// First order date (YYYY-MM-DD), database source only
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last order date (YYYY-MM-DD), database source only
    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long, value_enum, default_value = "all")]
    section: Section,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// JSON config file (falls back to WAREHOUSE_OPS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the sample dataset
    #[arg(long)]
    seed: Option<u64>,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * width as f64).round().max(0.0) as usize;
    "█".repeat(len.min(width))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    let preset = TeamPreset::from(args.preset.as_str());

    let source = DataSource::from_kind(args.source, args.path.clone(), args.seed)?;
    let now = Local::now().naive_local();
    let range = DateRange::resolve(args.start, args.end, now, config.default_range_days)?;
    let fallback = match &source {
        DataSource::Sample(options) => options.clone(),
        _ => SampleOptions::new(now),
    };

    let dataset = load_or_fallback(&source, &range, config.fetch_timeout(), &fallback).await?;
    info!("Using {} rows from {}", dataset.records.len(), dataset.origin);

    let report =
        build_report(&dataset.records, preset, &config).with_origin(DataOrigin::from(&dataset));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", "█".repeat(80));
    println!("{}  WAREHOUSE OPERATIONS - {}  {}", "█".repeat(15), preset.name().to_uppercase(), "█".repeat(15));
    println!("{}", "█".repeat(80));

    if let Some(notice) = report.origin.as_ref().and_then(|o| o.notice.as_deref()) {
        println!("\n  ⚠ {}", notice);
    }
    if report.is_empty() {
        println!("\n  No data available for the selected filters.");
    }

    let section = args.section;
    if matches!(section, Section::All | Section::Kpi) {
        print_kpis(&report);
    }
    if matches!(section, Section::All | Section::Warehouses) {
        print_warehouses(&report);
    }
    if matches!(section, Section::All | Section::Trends) {
        print_trends(&report);
    }
    if matches!(section, Section::All | Section::Bottlenecks) {
        print_bottlenecks(&report);
    }
    if matches!(section, Section::All | Section::Insights) {
        print_insights(&report);
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}

fn print_kpis(report: &DashboardReport) {
    print_section_header("KEY PERFORMANCE INDICATORS");

    let kpis = &report.kpis;
    println!("  Orders:               {:>12}", kpis.order_count);
    println!("  Avg Handling Time:    {:>11.1}h", kpis.avg_handling_time);
    println!("  Delay Percentage:     {:>11.1}%", kpis.delay_percentage);
    println!("  Fulfillment Rate:     {:>11.1}%", kpis.fulfillment_rate);
}

fn print_warehouses(report: &DashboardReport) {
    print_section_header("WAREHOUSE PERFORMANCE");

    println!(
        "  {:16} {:14} {:>8} {:>10} {:>10} {:>10} {:>8}",
        "Warehouse", "Location", "Orders", "Avg Hrs", "Delay", "Fulfilled", "Score"
    );
    println!("  {}", "─".repeat(82));
    for w in &report.warehouses {
        println!(
            "  {:16} {:14} {:>8} {:>10.1} {:>9.1}% {:>9.1}% {:>8.1}",
            w.warehouse_name,
            w.warehouse_location,
            w.order_count,
            w.avg_processing_time,
            w.delay_rate,
            w.fulfillment_rate,
            w.performance_score
        );
    }

    if !report.slowest.is_empty() {
        println!("\n  Slowest warehouses:");
        for (i, w) in report.slowest.iter().enumerate() {
            println!("    {}. {} ({:.1} hrs)", i + 1, w.warehouse_name, w.avg_processing_time);
        }
    }
}

fn print_trends(report: &DashboardReport) {
    print_section_header("TRENDS");

    let max_orders = report
        .time_series
        .iter()
        .map(|p| p.order_count)
        .max()
        .unwrap_or(0) as f64;

    println!("  {:12} {:>8} {:>10}  {}", "Date", "Orders", "Avg Hrs", "Volume");
    println!("  {}", "─".repeat(60));
    for p in &report.time_series {
        println!(
            "  {:12} {:>8} {:>10.1}  {}",
            p.date.format("%Y-%m-%d"),
            p.order_count,
            p.avg_processing_time,
            bar(p.order_count as f64, max_orders, 25)
        );
    }

    println!("\n  {:10} {:>8} {:>10}", "Month", "Orders", "Avg Hrs");
    println!("  {}", "─".repeat(30));
    for m in &report.monthly {
        println!(
            "  {:10} {:>8} {:>10.1}",
            format!("{}-{:02}", m.year, m.month),
            m.order_count,
            m.avg_processing_time
        );
    }

    const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    println!("\n  {:10} {:>8} {:>10}", "Weekday", "Orders", "Avg Hrs");
    println!("  {}", "─".repeat(30));
    for d in &report.weekdays {
        let day = DAYS.get(d.day_of_week as usize).copied().unwrap_or("?");
        println!("  {:10} {:>8} {:>10.1}", day, d.order_count, d.avg_processing_time);
    }
}

fn print_bottlenecks(report: &DashboardReport) {
    print_section_header("PROCESSING BOTTLENECKS");

    println!("  {:16} {:10} {:>8}", "Warehouse", "Stage", "Orders");
    println!("  {}", "─".repeat(36));
    for b in &report.bottlenecks {
        println!("  {:16} {:10} {:>8}", b.warehouse_name, b.stage.as_str(), b.count);
    }
}

fn print_insights(report: &DashboardReport) {
    print_section_header("INSIGHTS & RECOMMENDATIONS");

    for advisory in &report.advisories {
        let marker = match advisory.kind {
            AdvisoryKind::Warning => "⚠",
            AdvisoryKind::Recommendation => "→",
        };
        println!("  {} {}", marker, advisory.message);
    }
}
