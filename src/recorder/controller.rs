use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    models::{GroundTruthLabel, Snapshot},
    sensing::{AdapterState, SensingController, SensorSources},
    settings::RecorderSettings,
    snapshots::{export_csv, SnapshotStore},
};

use super::state::{RecorderCore, RecorderOverview, RecorderStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

struct Sampler {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Handle the presentation layer drives: start/stop, labels, export, clear.
#[derive(Clone)]
pub struct RecorderController {
    core: Arc<Mutex<RecorderCore>>,
    adapter: Arc<Mutex<AdapterState>>,
    sensing: Arc<Mutex<SensingController>>,
    sampler: Arc<Mutex<Option<Sampler>>>,
    settings: RecorderSettings,
}

impl RecorderController {
    /// Loads any saved log from `data_dir` and brings up the providers.
    pub async fn new(data_dir: &Path, settings: RecorderSettings, sources: SensorSources) -> Self {
        let store = SnapshotStore::new(settings.snapshot_path(data_dir));
        let mut core = RecorderCore::new(store, settings.autosave_every());
        core.load();

        let sensing = SensingController::new(sources, &settings).await;

        Self {
            core: Arc::new(Mutex::new(core)),
            adapter: sensing.adapter(),
            sensing: Arc::new(Mutex::new(sensing)),
            sampler: Arc::new(Mutex::new(None)),
            settings,
        }
    }

    pub async fn start_logging(&self) -> Result<()> {
        let mut sampler = self.sampler.lock().await;
        if sampler.is_some() {
            bail!("logging already active");
        }

        self.sensing.lock().await.start_sensing()?;
        self.core.lock().await.begin_logging();

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            Arc::clone(&self.core),
            Arc::clone(&self.adapter),
            self.settings.initial_sample_delay(),
            self.settings.sample_interval(),
            cancel_token.clone(),
        ));
        *sampler = Some(Sampler {
            handle,
            cancel_token,
        });

        log_info!("logging started");
        Ok(())
    }

    /// Cancels the timers, unsubscribes the motion providers and saves.
    pub async fn stop_logging(&self) -> Result<()> {
        let mut sampler = self.sampler.lock().await;
        let Some(Sampler {
            handle,
            cancel_token,
        }) = sampler.take()
        else {
            return Ok(());
        };

        cancel_token.cancel();
        if let Err(err) = handle.await {
            log_error!("sampling task failed to join: {err}");
        }

        let stopped = self.sensing.lock().await.stop_sensing().await;
        self.core.lock().await.end_logging();

        log_info!("logging stopped");
        stopped
    }

    /// Sets the active label and records one snapshot under it right away.
    pub async fn set_label(&self, label: impl Into<GroundTruthLabel>) -> Snapshot {
        let mut core = self.core.lock().await;
        let readings = self.adapter.lock().await;
        core.set_label(label.into(), &readings)
    }

    /// Records one snapshot with the current label.
    pub async fn record_now(&self) -> Snapshot {
        record_sample(&self.core, &self.adapter).await
    }

    pub async fn export_csv(&self) -> Result<PathBuf> {
        let core = self.core.lock().await;
        export_csv(core.log(), &self.settings.export_dir(), Utc::now())
            .context("CSV export failed")
    }

    /// Irreversibly drops the log in memory and on disk.
    pub async fn clear_log(&self) {
        self.core.lock().await.clear();
    }

    pub async fn save_now(&self) -> bool {
        self.core.lock().await.save()
    }

    pub async fn readings(&self) -> AdapterState {
        self.adapter.lock().await.clone()
    }

    pub async fn snapshots(&self) -> Vec<Snapshot> {
        self.core.lock().await.log().as_slice().to_vec()
    }

    pub async fn status(&self) -> RecorderStatus {
        self.core.lock().await.status()
    }

    pub async fn overview(&self) -> RecorderOverview {
        let (authorized, unavailable) = {
            let sensing = self.sensing.lock().await;
            (
                sensing.daylight_authorized(),
                sensing.unavailable_sources().to_vec(),
            )
        };
        self.core.lock().await.overview(authorized, &unavailable)
    }

    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Stops logging if needed, then tears down every provider.
    pub async fn shutdown(&self) -> Result<()> {
        self.stop_logging().await?;
        self.sensing.lock().await.shutdown().await
    }
}

async fn record_sample(core: &Mutex<RecorderCore>, adapter: &Mutex<AdapterState>) -> Snapshot {
    let mut core = core.lock().await;
    let readings = adapter.lock().await;
    core.record(&readings)
}

/// One sample after `initial_delay`, then one every `interval` measured from
/// the start, until cancelled.
async fn sampling_loop(
    core: Arc<Mutex<RecorderCore>>,
    adapter: Arc<Mutex<AdapterState>>,
    initial_delay: Duration,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let started = Instant::now();
    let first_sample = time::sleep_until(started + initial_delay);
    tokio::pin!(first_sample);
    let mut first_done = false;

    let mut ticker = time::interval_at(started + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = &mut first_sample, if !first_done => {
                first_done = true;
                record_sample(&core, &adapter).await;
            }
            _ = ticker.tick() => {
                record_sample(&core, &adapter).await;
            }
        }
    }
}
