//! Snapshot data model.
//!
//! A snapshot is one labeled, timestamped copy of every adapter reading. The
//! serialized field names are the persisted file format and line up with the
//! CSV header, so renaming any of them breaks previously saved logs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::readings::{MagneticField, PathType};
use crate::sensing::AdapterState;

/// User-asserted ground truth attached to each snapshot.
///
/// The host UI only sends the fixed vocabulary, but any other text is kept
/// verbatim as `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroundTruthLabel {
    Inside,
    Outside,
    Transit,
    #[default]
    Unknown,
    Custom(String),
}

impl GroundTruthLabel {
    pub fn as_str(&self) -> &str {
        match self {
            GroundTruthLabel::Inside => "INSIDE",
            GroundTruthLabel::Outside => "OUTSIDE",
            GroundTruthLabel::Transit => "TRANSIT",
            GroundTruthLabel::Unknown => "UNKNOWN",
            GroundTruthLabel::Custom(text) => text,
        }
    }
}

impl From<String> for GroundTruthLabel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "INSIDE" => GroundTruthLabel::Inside,
            "OUTSIDE" => GroundTruthLabel::Outside,
            "TRANSIT" => GroundTruthLabel::Transit,
            "UNKNOWN" => GroundTruthLabel::Unknown,
            _ => GroundTruthLabel::Custom(value),
        }
    }
}

impl From<&str> for GroundTruthLabel {
    fn from(value: &str) -> Self {
        GroundTruthLabel::from(value.to_string())
    }
}

impl From<GroundTruthLabel> for String {
    fn from(label: GroundTruthLabel) -> Self {
        match label {
            GroundTruthLabel::Custom(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for GroundTruthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled record of all sensor readings at an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub label: GroundTruthLabel,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub h_accuracy: Option<f64>,
    pub v_accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub floor: Option<i32>,
    pub speed: Option<f64>,
    pub course: Option<f64>,

    pub rel_altitude: Option<f64>,
    #[serde(rename = "pressure_kPa")]
    pub pressure_kpa: Option<f64>,

    pub mag_x: Option<f64>,
    pub mag_y: Option<f64>,
    pub mag_z: Option<f64>,
    pub mag_magnitude: Option<f64>,

    #[serde(default)]
    pub network_type: PathType,
    #[serde(default)]
    pub is_expensive: bool,
    #[serde(default)]
    pub is_constrained: bool,

    pub time_in_daylight_min: Option<f64>,
}

impl Snapshot {
    /// Copies whatever the adapter last saw. No staleness check is applied:
    /// each quantity is as old as its provider's last callback.
    pub fn capture(
        readings: &AdapterState,
        label: GroundTruthLabel,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let position = readings.position().copied().unwrap_or_default();
        let barometer = readings.barometer();
        let magnetic = readings.magnetic();
        let network = readings.network();

        Self {
            id: Uuid::new_v4(),
            timestamp,
            label,
            latitude: position.latitude,
            longitude: position.longitude,
            h_accuracy: position.horizontal_accuracy,
            v_accuracy: position.vertical_accuracy,
            altitude: position.altitude,
            floor: position.floor,
            speed: position.speed,
            course: position.course,
            rel_altitude: barometer.map(|b| b.relative_altitude),
            pressure_kpa: barometer.map(|b| b.pressure_kpa),
            mag_x: magnetic.map(|m| m.x),
            mag_y: magnetic.map(|m| m.y),
            mag_z: magnetic.map(|m| m.z),
            mag_magnitude: magnetic.map(|m| m.magnitude),
            network_type: network.path_type,
            is_expensive: network.is_expensive,
            is_constrained: network.is_constrained,
            time_in_daylight_min: readings.daylight_minutes(),
        }
    }

    /// The magnetic group, present only when all four values are.
    pub fn magnetic(&self) -> Option<MagneticField> {
        match (self.mag_x, self.mag_y, self.mag_z, self.mag_magnitude) {
            (Some(x), Some(y), Some(z), Some(magnitude)) => Some(MagneticField {
                x,
                y,
                z,
                magnitude,
            }),
            _ => None,
        }
    }
}
