//! Configuration loading utilities

use crate::schema::{Config, OutputFormat};
use chrono::NaiveDate;
use ecomdash_common::{DashboardError, Result as DashboardResult};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ECOMDASH_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] DashboardError),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner,
            other => DashboardError::config_with_source(other.to_string(), other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse_yaml(&content)?;
        debug!(path = %path.display(), "Parsed configuration file");

        Self::apply_env_overrides(&mut config)?;
        config.validate().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Parse configuration text without overrides or validation
    pub fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from the environment and the default file locations
    pub fn load() -> DashboardResult<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::load_config(&config_path)?
        } else if Path::new("ecomdash.yaml").exists() {
            Self::load_config("ecomdash.yaml")?
        } else if Path::new("ecomdash.yml").exists() {
            Self::load_config("ecomdash.yml")?
        } else {
            info!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate()?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DashboardResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply process environment overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ECOMDASH_ORDERS_PATH") {
            config.data.orders_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("ECOMDASH_CUSTOMERS_PATH") {
            config.data.customers_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("ECOMDASH_GEOLOCATION_PATH") {
            config.data.geolocation_path = Some(PathBuf::from(path));
        }

        if let Some(date) = lookup("ECOMDASH_START_DATE") {
            config.filter.start_date = Some(parse_env("ECOMDASH_START_DATE", &date, parse_date)?);
        }

        if let Some(date) = lookup("ECOMDASH_END_DATE") {
            config.filter.end_date = Some(parse_env("ECOMDASH_END_DATE", &date, parse_date)?);
        }

        if let Some(fraction) = lookup("ECOMDASH_SAMPLE_FRACTION") {
            config.report.sampling.fraction = if fraction.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_env("ECOMDASH_SAMPLE_FRACTION", &fraction, |s| {
                    s.trim().parse::<f64>()
                })?)
            };
        }

        if let Some(seed) = lookup("ECOMDASH_SAMPLE_SEED") {
            config.report.sampling.seed =
                parse_env("ECOMDASH_SAMPLE_SEED", &seed, |s| s.trim().parse::<u64>())?;
        }

        if let Some(level) = lookup("ECOMDASH_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(output) = lookup("ECOMDASH_OUTPUT") {
            config.output = parse_env("ECOMDASH_OUTPUT", &output, |s| s.parse::<OutputFormat>())?;
        }

        Ok(())
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

fn parse_env<T, E, F>(var: &str, value: &str, parse: F) -> Result<T, ConfigError>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    parse(value).map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_replace_fields() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("ECOMDASH_ORDERS_PATH", "/data/orders.csv"),
            ("ECOMDASH_START_DATE", "2017-01-01"),
            ("ECOMDASH_END_DATE", "2017-12-31"),
            ("ECOMDASH_SAMPLE_FRACTION", "0.1"),
            ("ECOMDASH_SAMPLE_SEED", "7"),
            ("ECOMDASH_OUTPUT", "text"),
        ]);

        ConfigLoader::apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.data.orders_path, PathBuf::from("/data/orders.csv"));
        assert_eq!(config.filter.start_date, NaiveDate::from_ymd_opt(2017, 1, 1));
        assert_eq!(config.filter.end_date, NaiveDate::from_ymd_opt(2017, 12, 31));
        assert_eq!(config.report.sampling.fraction, Some(0.1));
        assert_eq!(config.report.sampling.seed, 7);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_sample_fraction_none_disables_sampling() {
        let mut config = Config::default();
        config.report.sampling.fraction = Some(0.5);

        ConfigLoader::apply_overrides(&mut config, lookup_from(&[("ECOMDASH_SAMPLE_FRACTION", "none")]))
            .unwrap();

        assert_eq!(config.report.sampling.fraction, None);
    }

    #[test]
    fn test_bad_override_names_the_variable() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(
            &mut config,
            lookup_from(&[("ECOMDASH_START_DATE", "01/02/2017")]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("ECOMDASH_START_DATE"));
    }

    #[test]
    fn test_validation_error_converts_without_wrapping() {
        let err = ConfigError::ValidationError(DashboardError::validation("bad"));
        let converted: DashboardError = err.into();
        assert!(matches!(converted, DashboardError::Validation { .. }));
    }
}
