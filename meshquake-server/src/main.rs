//! meshquake
//!
//! Polls a public earthquake feed and relays nearby events as short text
//! alerts over a Meshtastic mesh radio.

mod config;
mod report;
mod shutdown;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use config::{CliOverrides, ConfigLoader};
use meshquake_core::config::RunMode;
use meshquake_core::entities::processed_record::RecordStore;
use meshquake_core::feed::UsgsFeed;
use meshquake_core::geocoder::{Geocoder, ZippopotamGeocoder};
use meshquake_core::processors::{CycleOutcome, DeliveryDispatcher, PollOrchestrator};
use meshquake_core::transport::MeshtasticCli;
use shutdown::spawn_shutdown_listener;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "meshquake_error.log";

/// meshquake - earthquake alerts over a mesh radio
#[derive(Parser, Debug)]
#[command(name = "meshquake")]
#[command(version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// Run mode: live, rehearsal or rehearsal-send
    #[arg(default_value = "live")]
    mode: String,

    /// Radio address passed to the Meshtastic CLI
    #[arg(long)]
    radio_ip: Option<String>,

    /// Postal code to resolve as the observer location
    #[arg(long)]
    zip: Option<String>,

    /// Minimum magnitude to report
    #[arg(long)]
    min_mag: Option<f64>,

    /// Meshtastic channel index
    #[arg(long)]
    ch_index: Option<u32>,

    /// Maximum distance from the observer, in miles
    #[arg(long)]
    max_distance: Option<f64>,

    /// Path to the configuration file
    #[arg(short, long, env = "MESHQUAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the database and log file
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            radio_ip: self.radio_ip.clone(),
            min_magnitude: self.min_mag,
            channel: self.ch_index,
            max_distance_miles: self.max_distance,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();

    let mode = match args.mode.parse::<RunMode>() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{e}\n\n{}", Args::command().render_usage());
            return Ok(());
        }
    };

    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("failed to create data directory {:?}", args.data_dir))?;
    init_tracing(&args.data_dir);

    let loaded = ConfigLoader::new(args.config.as_deref(), args.overrides())
        .load(mode)
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;

    tracing::info!(
        mode = %mode,
        zip = ?args.zip,
        min_magnitude = loaded.run.thresholds.min_magnitude,
        max_distance_miles = loaded.run.thresholds.max_distance_miles,
        radio_address = ?loaded.run.delivery.radio_address,
        channel = loaded.run.delivery.channel,
        "Starting meshquake v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut run_config = loaded.run;
    if let Some(zip) = &args.zip {
        let geocoder = ZippopotamGeocoder::new(loaded.geocoder.url, loaded.geocoder.timeout)?;
        let observer = geocoder.resolve(zip).await.map_err(|e| {
            tracing::error!(postal_code = %zip, error = %e, "Postal code lookup failed");
            e
        })?;
        run_config.observer = observer;
    }
    tracing::info!(
        label = %run_config.observer.label,
        latitude = run_config.observer.point.latitude,
        longitude = run_config.observer.point.longitude,
        "Observer location"
    );

    let database_path = args.data_dir.join(&loaded.database);
    let store = RecordStore::connect(
        &format!("sqlite://{}", database_path.display()),
        mode.record_table(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to open database {:?}: {}", database_path, e);
        e
    })?;
    store.ensure_table().await?;

    let feed = Arc::new(UsgsFeed::new(loaded.feed.url, loaded.feed.timeout)?);
    let transport = Arc::new(MeshtasticCli::new(loaded.transport_program));
    let dispatcher = DeliveryDispatcher::new(transport).with_pacing(loaded.part_pacing);
    let orchestrator =
        PollOrchestrator::new(Arc::new(run_config), feed, store.clone(), dispatcher);

    let shutdown_rx = spawn_shutdown_listener();
    let result = orchestrator.run(shutdown_rx).await;

    tracing::info!("Closing database connections...");
    store.close().await;

    match result? {
        Some(CycleOutcome::Rehearsed { alert, history, .. }) => {
            report::print_rehearsal(&alert, &history);
        }
        Some(outcome) => tracing::debug!(?outcome, "Single cycle finished"),
        None => {}
    }

    tracing::info!("meshquake shutdown complete");
    Ok(())
}

/// Parse arguments, exiting with status 1 on any invalid value.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

/// Initialize the tracing subscriber with a console layer and a file layer.
///
/// The log file lives in `data_dir`. If it cannot be opened, logging goes to
/// the console only.
fn init_tracing(data_dir: &Path) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let log_path = data_dir.join(LOG_FILE_NAME);
    let (file_layer, file_error) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(path = ?log_path, error = %e, "Failed to open log file, logging to console only");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_parse_flags() {
        let args = Args::try_parse_from([
            "meshquake",
            "rehearsal",
            "--radio-ip",
            "192.168.1.50",
            "--zip",
            "95014",
            "--min-mag",
            "2.5",
            "--ch-index",
            "3",
            "--max-distance",
            "80",
        ])
        .unwrap();

        assert_eq!(args.mode, "rehearsal");
        assert_eq!(args.zip.as_deref(), Some("95014"));
        assert_eq!(
            args.overrides(),
            CliOverrides {
                radio_ip: Some("192.168.1.50".to_string()),
                min_magnitude: Some(2.5),
                channel: Some(3),
                max_distance_miles: Some(80.0),
            }
        );
    }

    #[test]
    fn test_mode_defaults_to_live() {
        let args = Args::try_parse_from(["meshquake"]).unwrap();
        assert_eq!(args.mode.parse::<RunMode>().unwrap(), RunMode::Live);
    }

    #[test]
    fn test_unknown_mode_still_parses() {
        let args = Args::try_parse_from(["meshquake", "staging"]).unwrap();
        assert!(args.mode.parse::<RunMode>().is_err());
    }

    #[test]
    fn test_non_numeric_flag_is_rejected() {
        let err = Args::try_parse_from(["meshquake", "live", "--min-mag", "strong"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Args::try_parse_from(["meshquake", "--ch-index", "-1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_negative_magnitude_is_accepted() {
        let args = Args::try_parse_from(["meshquake", "live", "--min-mag", "-0.5"]).unwrap();
        assert_eq!(args.min_mag, Some(-0.5));
        assert_eq!(args.mode, "live");

        let args = Args::try_parse_from(["meshquake", "--min-mag", "-1"]).unwrap();
        assert_eq!(args.min_mag, Some(-1.0));
        assert_eq!(args.mode, "live");
    }
}
