//! TOML file configuration structures.
//!
//! These structs directly map to the `meshquake.toml` file format. Every
//! section and key is optional.

use meshquake_core::config::{AlertThresholds, RunConfig};
use meshquake_core::feed::UsgsFeed;
use meshquake_core::geo::ObserverLocation;
use meshquake_core::geocoder::ZippopotamGeocoder;
use meshquake_core::processors::dispatcher::DEFAULT_PART_PACING;
use meshquake_core::transport::MeshtasticCli;
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub feed: FeedConfig,
    pub geocoder: GeocoderConfig,
    pub observer: ObserverConfig,
    pub alerts: AlertsConfig,
    pub transport: TransportConfig,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
}

/// Earthquake feed section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// GeoJSON summary feed URL.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: UsgsFeed::DEFAULT_URL.to_string(),
            timeout_secs: UsgsFeed::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Postal-code geocoder section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    /// Base URL; the postal code is appended to it.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: ZippopotamGeocoder::DEFAULT_BASE_URL.to_string(),
            timeout_secs: ZippopotamGeocoder::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Fixed observer location, used when no postal code is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObserverConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Name shown in alerts, e.g. `M4.2 50mi from SJ`.
    pub label: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            latitude: ObserverLocation::DEFAULT_POINT.latitude,
            longitude: ObserverLocation::DEFAULT_POINT.longitude,
            label: ObserverLocation::DEFAULT_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertsConfig {
    pub min_magnitude: f64,
    pub max_distance_miles: f64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            min_magnitude: AlertThresholds::DEFAULT_MIN_MAGNITUDE,
            max_distance_miles: AlertThresholds::DEFAULT_MAX_DISTANCE_MILES,
        }
    }
}

/// Meshtastic CLI section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Executable to invoke for each message.
    pub program: String,
    pub channel: u32,
    /// Radio address passed with `-t`. Absent means the CLI default device.
    pub radio_ip: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            program: MeshtasticCli::DEFAULT_PROGRAM.to_string(),
            channel: 0,
            radio_ip: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub poll_interval_secs: u64,
    pub part_pacing_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: RunConfig::DEFAULT_POLL_INTERVAL.as_secs(),
            part_pacing_secs: DEFAULT_PART_PACING.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite file name, relative to the data directory.
    pub database: String,
}

impl StorageConfig {
    pub const DEFAULT_DATABASE: &'static str = "earthquakes.db";
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: Self::DEFAULT_DATABASE.to_string(),
        }
    }
}
