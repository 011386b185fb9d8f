//! CSV rendering of the snapshot log.
//!
//! Latitude and longitude are never written. Precision per column is fixed:
//! accuracies and altitude 1 decimal, speed/pressure/magnetics 2, relative
//! altitude 3.

use std::{
    fmt::Write as _,
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::Snapshot;

pub const CSV_HEADER: &str = "timestamp,label,h_accuracy,v_accuracy,altitude,floor,speed,\
rel_altitude,pressure_kPa,mag_x,mag_y,mag_z,mag_magnitude,network_type,is_expensive,\
time_in_daylight_min";

/// Renders the header plus one line per snapshot, in order.
pub fn render_csv<'a>(snapshots: impl IntoIterator<Item = &'a Snapshot>) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for snapshot in snapshots {
        let fields = [
            snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            quote_field(snapshot.label.as_str()),
            decimal(snapshot.h_accuracy, 1),
            decimal(snapshot.v_accuracy, 1),
            decimal(snapshot.altitude, 1),
            snapshot.floor.map(|f| f.to_string()).unwrap_or_default(),
            decimal(snapshot.speed, 2),
            decimal(snapshot.rel_altitude, 3),
            decimal(snapshot.pressure_kpa, 2),
            decimal(snapshot.mag_x, 2),
            decimal(snapshot.mag_y, 2),
            decimal(snapshot.mag_z, 2),
            decimal(snapshot.mag_magnitude, 2),
            snapshot.network_type.as_str().to_string(),
            snapshot.is_expensive.to_string(),
            decimal(snapshot.time_in_daylight_min, 1),
        ];
        let _ = writeln!(out, "{}", fields.join(","));
    }

    out
}

/// Writes a new `sensor_log_<stamp>_<suffix>.csv` under `dir` and returns its
/// path. Each call gets its own file; a failed write leaves nothing behind.
pub fn export_csv<'a>(
    snapshots: impl IntoIterator<Item = &'a Snapshot>,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix(&export_file_prefix(now))
        .suffix(".csv")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create CSV export in {}", dir.display()))?;
    let target = file.path().to_path_buf();
    file.write_all(render_csv(snapshots).as_bytes())
        .with_context(|| format!("Failed to write CSV export to {}", target.display()))?;

    let (_, path) = file.keep().context("Failed to keep CSV export")?;
    Ok(path)
}

fn export_file_prefix(now: DateTime<Utc>) -> String {
    format!("sensor_log_{}_", now.format("%Y%m%d_%H%M%S_%3f"))
}

fn decimal(value: Option<f64>, places: usize) -> String {
    value
        .map(|v| format!("{v:.places$}"))
        .unwrap_or_default()
}

fn quote_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
