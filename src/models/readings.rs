//! Typed readings delivered by the external sensor providers.
//!
//! Each struct is the group of values one provider callback overwrites at
//! once. None of them carry history; the adapter keeps only the latest.

use serde::{Deserialize, Serialize};

/// One position fix. Dimensions the provider could not resolve stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub horizontal_accuracy: Option<f64>,
    pub vertical_accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub floor: Option<i32>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
}

impl PositionFix {
    /// False if any resolved dimension is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [
            self.latitude,
            self.longitude,
            self.horizontal_accuracy,
            self.vertical_accuracy,
            self.altitude,
            self.speed,
            self.course,
        ]
        .into_iter()
        .flatten()
        .all(f64::is_finite)
    }
}

/// Barometer update. `relative_altitude` is measured from the moment the
/// subscription was (re)established.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarometerReading {
    pub relative_altitude: f64,
    pub pressure_kpa: f64,
}

impl BarometerReading {
    pub fn is_finite(&self) -> bool {
        self.relative_altitude.is_finite() && self.pressure_kpa.is_finite()
    }
}

/// Raw magnetometer axes in microtesla, as pushed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagneticSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Magnetometer axes plus the derived field strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagneticField {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub magnitude: f64,
}

impl From<MagneticSample> for MagneticField {
    fn from(sample: MagneticSample) -> Self {
        let MagneticSample { x, y, z } = sample;
        Self {
            x,
            y,
            z,
            magnitude: (x * x + y * y + z * z).sqrt(),
        }
    }
}

impl MagneticField {
    /// The magnitude can overflow to infinity even when every axis is finite.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.z, self.magnitude]
            .into_iter()
            .all(f64::is_finite)
    }
}

/// Interface kinds a network path may report as in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterfaceKind {
    Wifi,
    Cellular,
    WiredEthernet,
    Loopback,
    Other,
}

/// Coarse classification of the active network path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    Wifi,
    Cellular,
    Wired,
    Loopback,
    Other,
    #[default]
    Unknown,
}

impl PathType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathType::Wifi => "wifi",
            PathType::Cellular => "cellular",
            PathType::Wired => "wired",
            PathType::Loopback => "loopback",
            PathType::Other => "other",
            PathType::Unknown => "unknown",
        }
    }
}

/// What the OS reports whenever the network path changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPathUpdate {
    pub satisfied: bool,
    pub interfaces: Vec<InterfaceKind>,
    pub is_expensive: bool,
    pub is_constrained: bool,
}

/// Classified network state as stored in the adapter and in snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPath {
    pub path_type: PathType,
    pub is_expensive: bool,
    pub is_constrained: bool,
}

impl From<&NetworkPathUpdate> for NetworkPath {
    fn from(update: &NetworkPathUpdate) -> Self {
        Self {
            path_type: classify_path(update),
            is_expensive: update.is_expensive,
            is_constrained: update.is_constrained,
        }
    }
}

// Priority order matters: a phone on wifi with cellular standby is "wifi".
const PATH_PRIORITY: [(InterfaceKind, PathType); 5] = [
    (InterfaceKind::Wifi, PathType::Wifi),
    (InterfaceKind::Cellular, PathType::Cellular),
    (InterfaceKind::WiredEthernet, PathType::Wired),
    (InterfaceKind::Loopback, PathType::Loopback),
    (InterfaceKind::Other, PathType::Other),
];

fn classify_path(update: &NetworkPathUpdate) -> PathType {
    if !update.satisfied {
        return PathType::Unknown;
    }

    PATH_PRIORITY
        .iter()
        .find(|(kind, _)| update.interfaces.contains(kind))
        .map(|(_, path_type)| *path_type)
        .unwrap_or(PathType::Unknown)
}
