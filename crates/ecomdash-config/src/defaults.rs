//! Default values.

use crate::schema::*;
use ecomdash_common::{CoordinateStrategy, LogFormat, RowErrorPolicy};
use std::path::PathBuf;

/// Rows kept by the top-N category reports.
pub const DEFAULT_TOP_N: usize = 10;
/// Bucket count of the price histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;
/// Seed of the histogram sampling generator.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;
/// Default order table file name.
pub const DEFAULT_ORDERS_PATH: &str = "all_data.csv";

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            report: ReportConfig::default(),
            filter: FilterConfig::default(),
            cache: CacheConfig::default(),
            logging: LogSettings::default(),
            output: OutputFormat::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            orders_path: PathBuf::from(DEFAULT_ORDERS_PATH),
            customers_path: None,
            geolocation_path: None,
            row_errors: RowErrorPolicy::Skip,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            sampling: SamplingConfig::default(),
            coordinate_strategy: CoordinateStrategy::FirstSample,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            fraction: None,
            seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 64,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file_path: None,
        }
    }
}
