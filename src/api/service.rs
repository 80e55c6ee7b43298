//! Dashboard service shared by the REST handlers
//!
//! Every call loads a fresh dataset and computes a fresh report. The only state kept is the
//! database connection, opened on first use and shared by all requests.

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::DashboardConfig;
use crate::dashboard::{build_report_from_rows, prepare, DashboardReport, DataOrigin};
use crate::db::DbConn;
use crate::models::RawRecord;
use crate::derive::EnrichedRow;
use crate::filter::TeamPreset;
use crate::sample::SampleOptions;
use crate::source::{
    load_from_connection, load_records, open_database, with_fallback, DataSource, DateRange,
    SourceError,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    BadDate(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Request parameters common to every report endpoint, already parsed
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub preset: TeamPreset,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportRequest {
    pub fn parse(
        preset: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            preset: preset.map(TeamPreset::from).unwrap_or_default(),
            start: start.map(parse_date).transpose()?,
            end: end.map(parse_date).transpose()?,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ServiceError::BadDate(s.to_string()))
}

pub struct DashboardService {
    source: DataSource,
    config: DashboardConfig,
    db: OnceCell<DbConn>,
}

impl DashboardService {
    pub fn new(source: DataSource, config: DashboardConfig) -> Self {
        Self {
            source,
            config,
            db: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source_label(&self) -> &'static str {
        self.source.label()
    }

    /// Filtered rows plus the report built from them
    pub async fn report(
        &self,
        request: &ReportRequest,
    ) -> Result<(Vec<EnrichedRow>, DashboardReport), ServiceError> {
        let now = Local::now().naive_local();
        let range = DateRange::resolve(request.start, request.end, now, self.config.default_range_days)?;

        let fallback = match &self.source {
            DataSource::Sample(options) => options.clone(),
            _ => SampleOptions::new(now),
        };
        let dataset = with_fallback(&self.source, self.fetch(&range).await, &fallback)?;

        let rows = prepare(&dataset.records, request.preset);
        let report = build_report_from_rows(&rows, request.preset, &self.config)
            .with_origin(DataOrigin::from(&dataset));
        info!(
            origin = dataset.origin,
            fell_back = dataset.fell_back(),
            preset = request.preset.name(),
            orders = report.kpis.order_count,
            "Built dashboard report"
        );
        Ok((rows, report))
    }

    async fn fetch(&self, range: &DateRange) -> Result<Vec<RawRecord>, SourceError> {
        let timeout = self.config.fetch_timeout();
        match &self.source {
            DataSource::Database { path } => {
                // a failed open is not cached; the next request tries again
                let conn = self
                    .db
                    .get_or_try_init(|| open_database(path, timeout))
                    .await?;
                load_from_connection(conn, range, timeout).await
            }
            source => load_records(source, range, timeout).await,
        }
    }
}
