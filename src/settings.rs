use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

const DEFAULT_INITIAL_SAMPLE_DELAY_MS: u64 = 1_000;
const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 5;
const DEFAULT_AUTOSAVE_EVERY: u32 = 12;
const DEFAULT_DAYLIGHT_POLL_SECS: u64 = 30;
const DEFAULT_MAGNETOMETER_INTERVAL_MS: u64 = 1_000;
const DEFAULT_SNAPSHOT_FILE_NAME: &str = "sensor_snapshots.json";

/// Recorder cadence and storage knobs. Zero values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderSettings {
    pub initial_sample_delay_ms: u64,
    pub sample_interval_secs: u64,
    pub autosave_every: u32,
    pub daylight_poll_secs: u64,
    pub magnetometer_interval_ms: u64,
    pub snapshot_file_name: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            initial_sample_delay_ms: DEFAULT_INITIAL_SAMPLE_DELAY_MS,
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            autosave_every: DEFAULT_AUTOSAVE_EVERY,
            daylight_poll_secs: DEFAULT_DAYLIGHT_POLL_SECS,
            magnetometer_interval_ms: DEFAULT_MAGNETOMETER_INTERVAL_MS,
            snapshot_file_name: DEFAULT_SNAPSHOT_FILE_NAME.into(),
            export_dir: None,
        }
    }
}

impl RecorderSettings {
    pub fn initial_sample_delay(&self) -> Duration {
        Duration::from_millis(non_zero(
            self.initial_sample_delay_ms,
            DEFAULT_INITIAL_SAMPLE_DELAY_MS,
        ))
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(non_zero(
            self.sample_interval_secs,
            DEFAULT_SAMPLE_INTERVAL_SECS,
        ))
    }

    pub fn autosave_every(&self) -> u32 {
        if self.autosave_every == 0 {
            DEFAULT_AUTOSAVE_EVERY
        } else {
            self.autosave_every
        }
    }

    pub fn daylight_poll_interval(&self) -> Duration {
        Duration::from_secs(non_zero(self.daylight_poll_secs, DEFAULT_DAYLIGHT_POLL_SECS))
    }

    pub fn magnetometer_interval(&self) -> Duration {
        Duration::from_millis(non_zero(
            self.magnetometer_interval_ms,
            DEFAULT_MAGNETOMETER_INTERVAL_MS,
        ))
    }

    pub fn snapshot_path(&self, data_dir: &Path) -> PathBuf {
        let name = if self.snapshot_file_name.trim().is_empty() {
            DEFAULT_SNAPSHOT_FILE_NAME
        } else {
            self.snapshot_file_name.as_str()
        };
        data_dir.join(name)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn non_zero(value: u64, fallback: u64) -> u64 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<RecorderSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            RecorderSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn recorder(&self) -> RecorderSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update_recorder(&self, settings: RecorderSettings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &RecorderSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join(SETTINGS_FILE_NAME)).unwrap();
        let settings = store.recorder();

        assert_eq!(settings, RecorderSettings::default());
        assert_eq!(settings.sample_interval(), Duration::from_secs(5));
        assert_eq!(settings.initial_sample_delay(), Duration::from_secs(1));
        assert_eq!(settings.autosave_every(), 12);
        assert_eq!(settings.daylight_poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.recorder(), RecorderSettings::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{ "sampleIntervalSecs": 2, "autosaveEvery": 0 }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().recorder();
        assert_eq!(settings.sample_interval(), Duration::from_secs(2));
        assert_eq!(settings.autosave_every(), 12);
        assert_eq!(settings.snapshot_file_name, "sensor_snapshots.json");
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.recorder();
        settings.daylight_poll_secs = 60;
        store.update_recorder(settings.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.recorder(), settings);
    }
}
