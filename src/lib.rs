//! Labeled sensor snapshot recorder.
//!
//! Samples position, barometer, magnetometer, network path and the daylight
//! statistic on a fixed cadence, tags each sample with the user's
//! INSIDE/OUTSIDE/TRANSIT ground truth, keeps the series on disk and exports
//! it as privacy-filtered CSV. The OS providers and the UI live in the host
//! shell; they plug in through [`sensing::ReadingSource`] and
//! [`sensing::DaylightProvider`] and drive the [`recorder::commands`].

pub mod models;
pub mod recorder;
pub mod sensing;
pub mod settings;
pub mod snapshots;
pub mod utils;

use std::path::Path;

use anyhow::{Context, Result};

pub use models::{GroundTruthLabel, Snapshot};
pub use recorder::{RecorderController, RecorderOverview, RecorderStatus};
pub use sensing::{DaylightProvider, ReadingSink, ReadingSource, SensorEvent, SensorSources};
pub use settings::{RecorderSettings, SettingsStore};

pub struct AppState {
    pub recorder: RecorderController,
    pub settings: SettingsStore,
}

/// Brings the recorder up against the app's private `data_dir`: reads
/// `settings.json`, reloads the saved log and starts the network monitor.
pub async fn setup(data_dir: &Path, sources: SensorSources) -> Result<AppState> {
    utils::logging::init_logging();
    log::info!("sensorlog starting up...");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join(settings::SETTINGS_FILE_NAME))?;
    let recorder = RecorderController::new(data_dir, settings.recorder(), sources).await;

    Ok(AppState { recorder, settings })
}
