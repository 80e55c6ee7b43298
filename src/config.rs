//! Dashboard configuration
//!
//! Every field has a default, so an absent or partial JSON file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::insights::InsightThresholds;
use crate::scoring::ScoreWeights;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "WAREHOUSE_OPS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub thresholds: InsightThresholds,
    pub weights: ScoreWeights,
    /// Upper bound for one data fetch
    pub fetch_timeout_secs: u64,
    /// How many warehouses the "slowest" list shows
    pub top_slowest: usize,
    /// Days covered by the default date range
    pub default_range_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thresholds: InsightThresholds::default(),
            weights: ScoreWeights::default(),
            fetch_timeout_secs: 3,
            top_slowest: 3,
            default_range_days: 30,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Load from an explicit path, else from `WAREHOUSE_OPS_CONFIG`, else defaults.
pub fn load(explicit: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => {
            let config = DashboardConfig::from_file(&path)?;
            info!("Loaded config from {:?}", path);
            Ok(config)
        }
        None => Ok(DashboardConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"thresholds": {{"max_delay_percentage": 15.0}}, "top_slowest": 5}}"#).unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.thresholds.max_delay_percentage, 15.0);
        assert_eq!(config.thresholds.max_handling_hours, 24.0);
        assert_eq!(config.thresholds.min_fulfillment_rate, 85.0);
        assert_eq!(config.weights, ScoreWeights::default());
        assert_eq!(config.top_slowest, 5);
        assert_eq!(config.fetch_timeout_secs, 3);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(matches!(load(Some(file.path())), Err(ConfigError::Parse { .. })));

        let missing = Path::new("/definitely/not/here.json");
        assert!(matches!(load(Some(missing)), Err(ConfigError::Read { .. })));
    }
}
