//! Configuration schema definitions using serde.

use chrono::NaiveDate;
use ecomdash_common::{CoordinateStrategy, DashboardError, LogFormat, LoggingConfig, RowErrorPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file configuration.
    pub data: DataConfig,
    /// Report computation settings.
    pub report: ReportConfig,
    /// Initial date filter; unset bounds default to the data set's span.
    pub filter: FilterConfig,
    /// Report cache configuration.
    pub cache: CacheConfig,
    /// Logging configuration.
    pub logging: LogSettings,
    /// How the binary prints the dashboard.
    pub output: OutputFormat,
}

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Merged order/item/payment table.
    pub orders_path: PathBuf,
    /// Customer table; enables the per-city distribution together with
    /// `geolocation_path`.
    pub customers_path: Option<PathBuf>,
    /// Zip-prefix geolocation samples.
    pub geolocation_path: Option<PathBuf>,
    /// Handling of rows whose cells fail to parse.
    pub row_errors: RowErrorPolicy,
}

/// Report computation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows kept by the top-N category reports.
    pub top_n: usize,
    /// Bucket count of the price histogram.
    pub histogram_bins: usize,
    /// Sampling applied before bucketing prices.
    pub sampling: SamplingConfig,
    /// Reduction of several samples per zip prefix to one point.
    pub coordinate_strategy: CoordinateStrategy,
}

/// Bernoulli sampling of the price histogram input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Probability of keeping each row; `None` keeps every row.
    pub fraction: Option<f64>,
    /// Seed of the sampling generator.
    pub seed: u64,
}

/// Initial date bounds, both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Report cache keyed by filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_capacity: u64,
}

/// Logging settings as they appear in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `ecomdash_analytics=debug`.
    pub level: String,
    pub format: LogFormat,
    pub file_path: Option<PathBuf>,
}

impl LogSettings {
    /// Convert into the subscriber configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file_path.clone(),
            ..LoggingConfig::default()
        }
    }
}

/// Output format of the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(DashboardError::validation_field(
                format!("unknown output format '{other}'"),
                "output",
            )),
        }
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.data.orders_path.as_os_str().is_empty() {
            return Err(DashboardError::validation_field(
                "orders path cannot be empty",
                "data.orders_path",
            ));
        }

        if self.data.customers_path.is_some() != self.data.geolocation_path.is_some() {
            return Err(DashboardError::validation_field(
                "customers and geolocation paths must be set together",
                "data.geolocation_path",
            ));
        }

        if self.report.top_n == 0 {
            return Err(DashboardError::validation_field(
                "top_n must be at least 1",
                "report.top_n",
            ));
        }

        if self.report.histogram_bins == 0 {
            return Err(DashboardError::validation_field(
                "histogram_bins must be at least 1",
                "report.histogram_bins",
            ));
        }

        if let Some(fraction) = self.report.sampling.fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(DashboardError::validation_field(
                    format!("sampling fraction must be in (0, 1], got {fraction}"),
                    "report.sampling.fraction",
                ));
            }
        }

        if let (Some(start), Some(end)) = (self.filter.start_date, self.filter.end_date) {
            if start > end {
                return Err(DashboardError::validation_field(
                    format!("start date {start} is after end date {end}"),
                    "filter.start_date",
                ));
            }
        }

        if self.cache.enabled && self.cache.max_capacity == 0 {
            return Err(DashboardError::validation_field(
                "cache max_capacity must be positive when the cache is enabled",
                "cache.max_capacity",
            ));
        }

        Ok(())
    }

    /// Whether the customer distribution can be computed.
    pub fn has_geolocation(&self) -> bool {
        self.data.customers_path.is_some() && self.data.geolocation_path.is_some()
    }
}
