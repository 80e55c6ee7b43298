//! Data sources
//!
//! Where the raw joined rows come from. The choice is an explicit `DataSource` value
//! handed to the loader; nothing here is ambient state.

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{self, DbConn};
use crate::models::{CsvRecord, RawRecord, RawValue};
use crate::sample::{generate_sample, SampleOptions, TIMESTAMP_FORMAT};

pub const DEFAULT_DB_PATH: &str = "data/warehouse_ops.db";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file format: {0} (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("the {0} source needs a --path")]
    MissingPath(&'static str),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel parse failed: {0}")]
    Excel(String),

    #[error("database unavailable: {0}")]
    Database(String),

    #[error("data source timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// The upstream could not supply a dataset at all (as opposed to bad input)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SourceError::Database(_) | SourceError::Timeout(_) | SourceError::Unavailable(_)
        )
    }
}

/// Source kinds selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    Sample,
    Csv,
    Excel,
    Database,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(PathBuf),
    Excel(PathBuf),
    Sample(SampleOptions),
    Database { path: PathBuf },
}

impl DataSource {
    pub fn from_kind(kind: SourceKind, path: Option<PathBuf>, seed: Option<u64>) -> Result<Self, SourceError> {
        match kind {
            SourceKind::Sample => {
                let mut options = SampleOptions::default();
                if let Some(seed) = seed {
                    options = options.with_seed(seed);
                }
                Ok(DataSource::Sample(options))
            }
            SourceKind::Csv => path.map(DataSource::Csv).ok_or(SourceError::MissingPath("csv")),
            SourceKind::Excel => path.map(DataSource::Excel).ok_or(SourceError::MissingPath("excel")),
            SourceKind::Database => Ok(DataSource::Database {
                path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            }),
        }
    }

    /// Pick CSV or Excel from the file extension
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(DataSource::Csv(path)),
            "xlsx" | "xls" => Ok(DataSource::Excel(path)),
            _ => Err(SourceError::UnsupportedFormat(ext)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Csv(_) => "csv",
            DataSource::Excel(_) => "excel",
            DataSource::Sample(_) => "sample",
            DataSource::Database { .. } => "database",
        }
    }
}

/// Inclusive order-date window handed to the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, SourceError> {
        if start > end {
            return Err(SourceError::InvalidRange(format!("{} is after {}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Whole days: start at midnight, end at the last second of `end`
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, SourceError> {
        let start = start.and_hms_opt(0, 0, 0);
        let end = end.and_hms_opt(23, 59, 59);
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(SourceError::InvalidRange("out of range date".to_string())),
        }
    }

    pub fn last_days(now: NaiveDateTime, days: i64) -> Self {
        Self {
            start: now - ChronoDuration::days(days),
            end: now,
        }
    }

    /// Fill the missing ends of a requested window from the `days` before `now`
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: NaiveDateTime,
        days: i64,
    ) -> Result<Self, SourceError> {
        let default = Self::last_days(now, days);
        Self::from_dates(
            start.unwrap_or(default.start.date()),
            end.unwrap_or(default.end.date()),
        )
    }

    pub fn contains(&self, dt: NaiveDateTime) -> bool {
        dt >= self.start && dt <= self.end
    }
}

/// Read a CSV export of joined rows. Structurally broken lines are skipped and counted.
pub fn read_csv(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => records.push(record.to_raw()),
            Err(e) => {
                skipped += 1;
                warn!("Skipping CSV row: {}", e);
            }
        }
    }

    info!("Parsed {} records from {:?} ({} skipped)", records.len(), path, skipped);
    Ok(records)
}

fn excel_cell(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty => None,
        Data::Bool(b) => Some(RawValue::Bool(*b)),
        Data::Int(i) => Some(RawValue::Int(*i)),
        Data::Float(f) => Some(RawValue::Float(*f)),
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(RawValue::Text(s.clone())),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| RawValue::Text(dt.format(TIMESTAMP_FORMAT).to_string())),
        Data::DateTimeIso(s) => Some(RawValue::Text(s.clone())),
        other => Some(RawValue::Text(other.to_string())),
    }
}

/// Place a cell under the column it was read from. Unknown columns are ignored.
fn assign(record: &mut RawRecord, column: &str, value: Option<RawValue>) {
    let slot = match column {
        "order_id" => &mut record.order_id,
        "warehouse_id" => &mut record.warehouse_id,
        "warehouse_name" => &mut record.warehouse_name,
        "warehouse_location" => &mut record.warehouse_location,
        "team_assignment" => &mut record.team_assignment,
        "product_id" => &mut record.product_id,
        "product_name" => &mut record.product_name,
        "product_category" => &mut record.product_category,
        "brand" => &mut record.brand,
        "quantity" => &mut record.quantity,
        "order_date" => &mut record.order_date,
        "expected_delivery_date" => &mut record.expected_delivery_date,
        "actual_delivery_date" => &mut record.actual_delivery_date,
        "processing_time" => &mut record.processing_time,
        "shipping_time" => &mut record.shipping_time,
        "order_status" => &mut record.order_status,
        "is_fulfilled" => &mut record.is_fulfilled,
        _ => return,
    };
    *slot = value;
}

/// Read the first worksheet of a spreadsheet; the first row holds column names.
/// Cells keep their native type so that booleans and numbers reach the normalizer as such.
pub fn read_excel(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
    if !path.exists() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| SourceError::Excel(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::Excel("workbook has no worksheets".to_string()))?
        .map_err(|e| SourceError::Excel(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_lowercase())
        .collect();

    let records: Vec<RawRecord> = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            let mut record = RawRecord::default();
            for (header, cell) in headers.iter().zip(row.iter()) {
                assign(&mut record, header, excel_cell(cell));
            }
            record
        })
        .collect();

    info!("Parsed {} records from {:?}", records.len(), path);
    Ok(records)
}

async fn run_blocking<F>(f: F) -> Result<Vec<RawRecord>, SourceError>
where
    F: FnOnce() -> Result<Vec<RawRecord>, SourceError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?
}

/// Open the database behind a `Database` source, bounded by `timeout`
pub async fn open_database(path: &Path, timeout: Duration) -> Result<DbConn, SourceError> {
    let path = path.to_string_lossy();
    tokio::time::timeout(timeout, db::connect(&path))
        .await
        .map_err(|_| SourceError::Timeout(timeout))?
        .map_err(|e| SourceError::Database(e.to_string()))
}

async fn fetch_range(conn: &DbConn, range: &DateRange) -> Result<Vec<RawRecord>, SourceError> {
    let start = range.start.format(TIMESTAMP_FORMAT).to_string();
    let end = range.end.format(TIMESTAMP_FORMAT).to_string();
    db::fetch_records(conn, &start, &end)
        .await
        .map_err(|e| SourceError::Database(e.to_string()))
}

/// Orders in `range` from an already open connection, bounded by `timeout`
pub async fn load_from_connection(
    conn: &DbConn,
    range: &DateRange,
    timeout: Duration,
) -> Result<Vec<RawRecord>, SourceError> {
    let records = tokio::time::timeout(timeout, fetch_range(conn, range))
        .await
        .map_err(|_| SourceError::Timeout(timeout))??;

    info!(source = "database", rows = records.len(), "Loaded dataset");
    Ok(records)
}

/// Fetch one dataset, bounded by `timeout`. Only the database source applies `range`;
/// files and generated samples are returned whole.
pub async fn load_records(
    source: &DataSource,
    range: &DateRange,
    timeout: Duration,
) -> Result<Vec<RawRecord>, SourceError> {
    let fetch = async {
        match source {
            DataSource::Csv(path) => {
                let path = path.clone();
                run_blocking(move || read_csv(&path)).await
            }
            DataSource::Excel(path) => {
                let path = path.clone();
                run_blocking(move || read_excel(&path)).await
            }
            DataSource::Sample(options) => Ok(generate_sample(options)),
            DataSource::Database { path } => {
                let conn = db::connect(&path.to_string_lossy())
                    .await
                    .map_err(|e| SourceError::Database(e.to_string()))?;
                fetch_range(&conn, range).await
            }
        }
    };

    let records = tokio::time::timeout(timeout, fetch)
        .await
        .map_err(|_| SourceError::Timeout(timeout))??;

    info!(source = source.label(), rows = records.len(), "Loaded dataset");
    Ok(records)
}

/// A dataset plus the source that actually produced it
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<RawRecord>,
    pub origin: &'static str,
    /// Why the sample dataset stands in for the requested source
    pub fallback_reason: Option<String>,
}

impl LoadedDataset {
    pub fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Settle a fetch result for `source`: an unavailable upstream is replaced by the sample
/// dataset so callers always get rows to work with. Bad input (missing file, parse errors)
/// is still reported.
pub fn with_fallback(
    source: &DataSource,
    result: Result<Vec<RawRecord>, SourceError>,
    fallback: &SampleOptions,
) -> Result<LoadedDataset, SourceError> {
    match result {
        Ok(records) => Ok(LoadedDataset {
            records,
            origin: source.label(),
            fallback_reason: None,
        }),
        Err(e) if e.is_unavailable() => {
            warn!("{}. Using sample data instead.", e);
            Ok(LoadedDataset {
                records: generate_sample(fallback),
                origin: "sample",
                fallback_reason: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}

/// `load_records` followed by `with_fallback`
pub async fn load_or_fallback(
    source: &DataSource,
    range: &DateRange,
    timeout: Duration,
    fallback: &SampleOptions,
) -> Result<LoadedDataset, SourceError> {
    with_fallback(source, load_records(source, range, timeout).await, fallback)
}
