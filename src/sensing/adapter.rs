use serde::Serialize;

use crate::models::{BarometerReading, MagneticField, NetworkPath, PositionFix};

use super::sources::SensorEvent;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Latest known value per physical quantity.
///
/// Each group is overwritten in place by its provider; nothing here keeps
/// history and nothing is synchronized across groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterState {
    position: Option<PositionFix>,
    barometer: Option<BarometerReading>,
    magnetic: Option<MagneticField>,
    network: NetworkPath,
    daylight_minutes: Option<f64>,
}

impl AdapterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the group the event belongs to. Readings with NaN or
    /// infinite values are dropped and the previous value stays.
    pub fn apply(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Position(fix) if fix.is_finite() => self.position = Some(fix),
            SensorEvent::Barometer(reading) if reading.is_finite() => {
                self.barometer = Some(reading)
            }
            SensorEvent::Magnetic(sample) => {
                let field = MagneticField::from(sample);
                if field.is_finite() {
                    self.magnetic = Some(field);
                } else {
                    log_warn!("dropping non-finite magnetometer reading: {sample:?}");
                }
            }
            SensorEvent::Network(update) => self.network = NetworkPath::from(&update),
            SensorEvent::Daylight(minutes) if minutes.is_finite() => {
                self.daylight_minutes = Some(minutes)
            }
            SensorEvent::Failed(failure) => {
                log_warn!("{} provider error: {}", failure.kind, failure.reason);
            }
            other => log_warn!("dropping non-finite reading: {other:?}"),
        }
    }

    pub fn position(&self) -> Option<&PositionFix> {
        self.position.as_ref()
    }

    pub fn barometer(&self) -> Option<BarometerReading> {
        self.barometer
    }

    pub fn magnetic(&self) -> Option<MagneticField> {
        self.magnetic
    }

    pub fn network(&self) -> NetworkPath {
        self.network
    }

    pub fn daylight_minutes(&self) -> Option<f64> {
        self.daylight_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterfaceKind, MagneticSample, NetworkPathUpdate, PathType};
    use crate::sensing::sources::{FailureReason, ProviderFailure, SourceKind};

    #[test]
    fn later_reading_overwrites_whole_group() {
        let mut state = AdapterState::new();
        state.apply(SensorEvent::Position(PositionFix {
            latitude: Some(1.0),
            altitude: Some(10.0),
            floor: Some(2),
            ..Default::default()
        }));
        state.apply(SensorEvent::Position(PositionFix {
            latitude: Some(2.0),
            ..Default::default()
        }));

        let position = state.position().unwrap();
        assert_eq!(position.latitude, Some(2.0));
        assert_eq!(position.altitude, None);
        assert_eq!(position.floor, None);
    }

    #[test]
    fn magnetic_update_recomputes_magnitude() {
        let mut state = AdapterState::new();
        state.apply(SensorEvent::Magnetic(MagneticSample {
            x: 1.0,
            y: 2.0,
            z: 2.0,
        }));
        assert!((state.magnetic().unwrap().magnitude - 3.0).abs() < 1e-12);

        state.apply(SensorEvent::Magnetic(MagneticSample {
            x: 0.0,
            y: 6.0,
            z: 8.0,
        }));
        let field = state.magnetic().unwrap();
        assert_eq!((field.x, field.y, field.z), (0.0, 6.0, 8.0));
        assert!((field.magnitude - 10.0).abs() < 1e-12);
    }

    #[test]
    fn failure_leaves_previous_values_untouched() {
        let mut state = AdapterState::new();
        state.apply(SensorEvent::Daylight(42.0));
        state.apply(SensorEvent::Failed(ProviderFailure {
            kind: SourceKind::Daylight,
            reason: FailureReason::PermissionDenied,
        }));
        state.apply(SensorEvent::Failed(ProviderFailure {
            kind: SourceKind::Position,
            reason: FailureReason::Other("timeout".into()),
        }));

        assert_eq!(state.daylight_minutes(), Some(42.0));
        assert!(state.position().is_none());
    }

    #[test]
    fn non_finite_readings_keep_previous_values() {
        let mut state = AdapterState::new();
        state.apply(SensorEvent::Magnetic(MagneticSample {
            x: 3.0,
            y: 4.0,
            z: 0.0,
        }));
        state.apply(SensorEvent::Barometer(BarometerReading {
            relative_altitude: 0.5,
            pressure_kpa: 100.9,
        }));
        state.apply(SensorEvent::Daylight(7.5));

        state.apply(SensorEvent::Magnetic(MagneticSample {
            x: f64::MAX,
            y: f64::MAX,
            z: 0.0,
        }));
        state.apply(SensorEvent::Barometer(BarometerReading {
            relative_altitude: f64::NAN,
            pressure_kpa: 100.8,
        }));
        state.apply(SensorEvent::Daylight(f64::INFINITY));
        state.apply(SensorEvent::Position(PositionFix {
            altitude: Some(f64::NAN),
            ..Default::default()
        }));

        let field = state.magnetic().unwrap();
        assert_eq!((field.x, field.y, field.magnitude), (3.0, 4.0, 5.0));
        assert_eq!(state.barometer().unwrap().pressure_kpa, 100.9);
        assert_eq!(state.daylight_minutes(), Some(7.5));
        assert!(state.position().is_none());
    }

    #[test]
    fn network_update_is_classified() {
        let mut state = AdapterState::new();
        assert_eq!(state.network().path_type, PathType::Unknown);

        state.apply(SensorEvent::Network(NetworkPathUpdate {
            satisfied: true,
            interfaces: vec![InterfaceKind::WiredEthernet],
            is_expensive: false,
            is_constrained: true,
        }));
        assert_eq!(state.network().path_type, PathType::Wired);
        assert!(state.network().is_constrained);
    }
}
