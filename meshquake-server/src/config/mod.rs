//! Configuration module for meshquake.
//!
//! Merges the optional TOML file with command-line overrides into the
//! immutable [`RunConfig`] plus the endpoint settings the binary needs to
//! build its components.

pub mod file;

use crate::config::file::FileConfig;
use meshquake_core::config::{AlertThresholds, DeliveryTarget, RunConfig, RunMode};
use meshquake_core::geo::{GeoPoint, ObserverLocation};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values given on the command line. They win over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub radio_ip: Option<String>,
    pub min_magnitude: Option<f64>,
    pub channel: Option<u32>,
    pub max_distance_miles: Option<f64>,
}

/// An HTTP endpoint with its request timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: Url,
    pub timeout: Duration,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub run: RunConfig,
    pub feed: Endpoint,
    pub geocoder: Endpoint,
    pub transport_program: String,
    pub part_pacing: Duration,
    /// SQLite file name relative to the data directory.
    pub database: String,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    overrides: CliOverrides,
}

impl ConfigLoader {
    pub fn new(config_path: Option<&Path>, overrides: CliOverrides) -> Self {
        Self {
            config_path: config_path.map(Path::to_path_buf),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// Without a config path every value starts from its default. A path
    /// that cannot be read is an error.
    pub fn load(&self, mode: RunMode) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match &self.config_path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
                        path: path.clone(),
                        source,
                    })?;
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        self.apply_overrides(&mut file_config);
        validate(&file_config)?;
        build_loaded_config(mode, file_config)
    }

    fn apply_overrides(&self, config: &mut FileConfig) {
        if let Some(radio_ip) = &self.overrides.radio_ip {
            config.transport.radio_ip = Some(radio_ip.clone());
        }
        if let Some(min_magnitude) = self.overrides.min_magnitude {
            config.alerts.min_magnitude = min_magnitude;
        }
        if let Some(channel) = self.overrides.channel {
            config.transport.channel = channel;
        }
        if let Some(max_distance_miles) = self.overrides.max_distance_miles {
            config.alerts.max_distance_miles = max_distance_miles;
        }
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if !config.alerts.min_magnitude.is_finite() {
        return Err(ConfigError::ValidationError(
            "min_magnitude must be a finite number".to_string(),
        ));
    }
    let max_distance = config.alerts.max_distance_miles;
    if !max_distance.is_finite() || max_distance < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "max_distance_miles must be a non-negative number, got {max_distance}"
        )));
    }
    if !(-90.0..=90.0).contains(&config.observer.latitude)
        || !(-180.0..=180.0).contains(&config.observer.longitude)
    {
        return Err(ConfigError::ValidationError(format!(
            "observer coordinates out of range: {}, {}",
            config.observer.latitude, config.observer.longitude
        )));
    }
    if config.schedule.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poll_interval_secs must be greater than zero".to_string(),
        ));
    }
    if config.transport.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "transport program must not be empty".to_string(),
        ));
    }
    if config.storage.database.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage database must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })
}

/// Parse a base URL that request paths are joined onto.
///
/// A missing trailing slash is added, otherwise `Url::join` would replace
/// the last path segment.
fn parse_base_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let mut url = parse_url(field, value)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn build_loaded_config(mode: RunMode, config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let feed = Endpoint {
        url: parse_url("feed.url", &config.feed.url)?,
        timeout: Duration::from_secs(config.feed.timeout_secs),
    };
    let geocoder = Endpoint {
        url: parse_base_url("geocoder.base_url", &config.geocoder.base_url)?,
        timeout: Duration::from_secs(config.geocoder.timeout_secs),
    };

    let run = RunConfig {
        mode,
        observer: ObserverLocation::new(
            GeoPoint::new(config.observer.latitude, config.observer.longitude),
            config.observer.label,
        ),
        thresholds: AlertThresholds {
            min_magnitude: config.alerts.min_magnitude,
            max_distance_miles: config.alerts.max_distance_miles,
        },
        delivery: DeliveryTarget {
            channel: config.transport.channel,
            radio_address: config.transport.radio_ip,
        },
        poll_interval: Duration::from_secs(config.schedule.poll_interval_secs),
    };

    Ok(LoadedConfig {
        run,
        feed,
        geocoder,
        transport_program: config.transport.program,
        part_pacing: Duration::from_secs(config.schedule.part_pacing_secs),
        database: config.storage.database,
    })
}
