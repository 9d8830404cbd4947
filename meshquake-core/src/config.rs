//! Immutable run configuration.
//!
//! Built once at startup and shared by reference with every component.
//! Nothing in here changes for the lifetime of the process.

use crate::entities::processed_record::RecordTable;
use crate::geo::ObserverLocation;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// How the poll loop behaves and where it records processed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Deduplicate, deliver, repeat forever.
    Live,
    /// One cycle; print the candidate and stored history, never deliver.
    Rehearsal,
    /// One cycle with real delivery, recorded in the rehearsal table.
    RehearsalSend,
}

impl RunMode {
    /// Table used for processed records in this mode.
    pub fn record_table(self) -> RecordTable {
        match self {
            RunMode::Live => RecordTable::Live,
            RunMode::Rehearsal | RunMode::RehearsalSend => RecordTable::Rehearsal,
        }
    }

    /// Whether already-processed events are skipped during selection.
    pub fn deduplicates(self) -> bool {
        matches!(self, RunMode::Live)
    }

    /// Whether selected alerts are handed to the transport.
    pub fn delivers(self) -> bool {
        !matches!(self, RunMode::Rehearsal)
    }

    /// Whether the orchestrator keeps polling after the first cycle.
    pub fn is_continuous(self) -> bool {
        matches!(self, RunMode::Live)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Live => "live",
            RunMode::Rehearsal => "rehearsal",
            RunMode::RehearsalSend => "rehearsal-send",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown run mode: {0}")]
pub struct UnknownRunMode(pub String);

impl FromStr for RunMode {
    type Err = UnknownRunMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" | "prod" => Ok(RunMode::Live),
            "rehearsal" | "dev" => Ok(RunMode::Rehearsal),
            "rehearsal-send" | "devsend" => Ok(RunMode::RehearsalSend),
            _ => Err(UnknownRunMode(s.to_string())),
        }
    }
}

/// Magnitude and distance gates an event must pass to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    pub min_magnitude: f64,
    /// Inclusive radius around the observer.
    pub max_distance_miles: f64,
}

impl AlertThresholds {
    pub const DEFAULT_MIN_MAGNITUDE: f64 = 0.0;
    pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 120.0;
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            min_magnitude: Self::DEFAULT_MIN_MAGNITUDE,
            max_distance_miles: Self::DEFAULT_MAX_DISTANCE_MILES,
        }
    }
}

/// Where alert text goes on the mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub channel: u32,
    /// Explicit radio address; `None` lets the transport pick its default.
    pub radio_address: Option<String>,
}

/// Everything a cycle needs to know, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: RunMode,
    pub observer: ObserverLocation,
    pub thresholds: AlertThresholds,
    pub delivery: DeliveryTarget,
    /// Sleep between live cycles.
    pub poll_interval: Duration,
}

impl RunConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            observer: ObserverLocation::default(),
            thresholds: AlertThresholds::default(),
            delivery: DeliveryTarget::default(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}
