use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GroundTruthLabel, Snapshot};
use crate::sensing::{AdapterState, SourceKind};
use crate::snapshots::{SnapshotLog, SnapshotStore};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecorderStatus {
    #[default]
    Idle,
    Logging,
}

/// Read-only summary for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderOverview {
    pub status: RecorderStatus,
    pub label: GroundTruthLabel,
    pub snapshot_count: usize,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub daylight_authorized: bool,
    pub unavailable_sources: Vec<String>,
}

/// Everything the recorder mutates, owned in one place.
///
/// Persistence here is best-effort: failures are logged and the in-memory
/// log stays authoritative.
pub struct RecorderCore {
    log: SnapshotLog,
    store: SnapshotStore,
    label: GroundTruthLabel,
    status: RecorderStatus,
    autosave_every: u32,
    recorded_while_logging: u32,
    last_saved_at: Option<DateTime<Utc>>,
}

impl RecorderCore {
    pub fn new(store: SnapshotStore, autosave_every: u32) -> Self {
        Self {
            log: SnapshotLog::new(),
            store,
            label: GroundTruthLabel::Unknown,
            status: RecorderStatus::Idle,
            autosave_every: autosave_every.max(1),
            recorded_while_logging: 0,
            last_saved_at: None,
        }
    }

    pub fn status(&self) -> RecorderStatus {
        self.status
    }

    pub fn label(&self) -> &GroundTruthLabel {
        &self.label
    }

    pub fn log(&self) -> &SnapshotLog {
        &self.log
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Replaces the in-memory log with the persisted one. A missing or
    /// unreadable file leaves the log empty.
    pub fn load(&mut self) {
        match self.store.load() {
            Ok(Some(entries)) => {
                log_info!(
                    "loaded {} snapshots from {}",
                    entries.len(),
                    self.store.path().display()
                );
                self.log.replace_all(entries);
            }
            Ok(None) => {
                log_debug!("no saved snapshots at {}", self.store.path().display());
                self.log.clear();
            }
            Err(err) => {
                log_error!("failed to load snapshots: {err:#}");
                self.log.clear();
            }
        }
    }

    /// Returns whether the file now matches memory.
    pub fn save(&mut self) -> bool {
        match self.store.save(self.log.as_slice()) {
            Ok(()) => {
                self.last_saved_at = Some(Utc::now());
                log_debug!("saved {} snapshots", self.log.len());
                true
            }
            Err(err) => {
                log_error!("failed to save snapshots: {err:#}");
                false
            }
        }
    }

    /// Appends one snapshot and autosaves on every `autosave_every`-th
    /// snapshot taken while logging.
    pub fn record(&mut self, readings: &AdapterState) -> Snapshot {
        let snapshot = self.log.record(readings, &self.label).clone();

        if self.status == RecorderStatus::Logging {
            self.recorded_while_logging = self.recorded_while_logging.wrapping_add(1);
            if self.recorded_while_logging % self.autosave_every == 0 {
                self.save();
            }
        }

        snapshot
    }

    /// Switches the active label and records immediately, logging or not.
    pub fn set_label(&mut self, label: GroundTruthLabel, readings: &AdapterState) -> Snapshot {
        log_info!("label changed: {} -> {}", self.label, label);
        self.label = label;
        self.record(readings)
    }

    pub fn begin_logging(&mut self) {
        self.status = RecorderStatus::Logging;
        self.recorded_while_logging = 0;
    }

    pub fn end_logging(&mut self) {
        self.status = RecorderStatus::Idle;
        self.save();
    }

    /// Drops every snapshot in memory and on disk.
    pub fn clear(&mut self) {
        self.log.clear();
        self.recorded_while_logging = 0;
        if let Err(err) = self.store.delete() {
            log_warn!("failed to delete saved snapshots: {err:#}");
        }
        log_info!("snapshot log cleared");
    }

    pub fn overview(&self, daylight_authorized: bool, unavailable: &[SourceKind]) -> RecorderOverview {
        RecorderOverview {
            status: self.status,
            label: self.label.clone(),
            snapshot_count: self.log.len(),
            last_saved_at: self.last_saved_at,
            daylight_authorized,
            unavailable_sources: unavailable.iter().map(|kind| kind.to_string()).collect(),
        }
    }
}
