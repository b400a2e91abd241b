//! Integration tests for ecomdash-config crate.

use ecomdash_common::{CoordinateStrategy, LogFormat, RowErrorPolicy};
use ecomdash_config::{Config, ConfigLoader, OutputFormat, DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_N};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_default_config_validation() {
    let config = Config::default();

    assert!(config.validate().is_ok());
    assert_eq!(config.report.top_n, DEFAULT_TOP_N);
    assert_eq!(config.report.histogram_bins, DEFAULT_HISTOGRAM_BINS);
    assert_eq!(config.report.sampling.fraction, None);
    assert_eq!(config.report.sampling.seed, 42);
    assert!(!config.has_geolocation());
}

#[test]
fn test_partial_yaml_keeps_defaults() {
    let yaml = r#"
data:
  orders_path: "data/all_data.csv"
  customers_path: "data/customers_dataset.csv"
  geolocation_path: "data/geolocation_dataset.csv"
  row_errors: fail
report:
  sampling:
    fraction: 0.1
  coordinate_strategy: centroid
filter:
  start_date: 2017-01-01
logging:
  format: json
output: text
"#;

    let config = ConfigLoader::parse_yaml(yaml).unwrap();

    assert_eq!(config.data.orders_path, PathBuf::from("data/all_data.csv"));
    assert_eq!(config.data.row_errors, RowErrorPolicy::Fail);
    assert_eq!(config.report.sampling.fraction, Some(0.1));
    assert_eq!(config.report.sampling.seed, 42);
    assert_eq!(config.report.top_n, 10);
    assert_eq!(config.report.coordinate_strategy, CoordinateStrategy::Centroid);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.output, OutputFormat::Text);
    assert!(config.filter.end_date.is_none());
    assert!(config.has_geolocation());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_rejects_bad_values() {
    let mut config = Config::default();
    config.report.sampling.fraction = Some(0.0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.report.sampling.fraction = Some(1.5);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.report.histogram_bins = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.report.top_n = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.filter.start_date = chrono::NaiveDate::from_ymd_opt(2018, 2, 1);
    config.filter.end_date = chrono::NaiveDate::from_ymd_opt(2018, 1, 1);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.data.customers_path = Some(PathBuf::from("customers.csv"));
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "data:\n  orders_path: orders.csv\nreport:\n  top_n: 5").unwrap();

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.data.orders_path, PathBuf::from("orders.csv"));
    assert_eq!(config.report.top_n, 5);
}

#[test]
fn test_missing_file_is_reported() {
    let err = ConfigLoader::load_from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.yaml"));
}

#[test]
fn test_invalid_file_fails_validation() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "report:\n  histogram_bins: 0").unwrap();

    assert!(ConfigLoader::load_from_file(file.path()).is_err());
}
