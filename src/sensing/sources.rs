//! Capability seams for the OS sensor providers.
//!
//! The host shell wraps each platform framework in a [`ReadingSource`] (push
//! providers) or a [`DaylightProvider`] (the pulled health statistic). The
//! recorder only ever sees typed readings arriving through a [`ReadingSink`].

use std::{fmt, future::Future, pin::Pin, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::models::{BarometerReading, MagneticSample, NetworkPathUpdate, PositionFix};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Position,
    Barometer,
    Magnetometer,
    Network,
    Daylight,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Position => "position",
            SourceKind::Barometer => "barometer",
            SourceKind::Magnetometer => "magnetometer",
            SourceKind::Network => "network",
            SourceKind::Daylight => "daylight",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    PermissionDenied,
    Unavailable,
    Other(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::PermissionDenied => f.write_str("permission denied"),
            FailureReason::Unavailable => f.write_str("provider unavailable"),
            FailureReason::Other(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub kind: SourceKind,
    pub reason: FailureReason,
}

/// Everything that can arrive from a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Position(PositionFix),
    Barometer(BarometerReading),
    Magnetic(MagneticSample),
    Network(NetworkPathUpdate),
    Daylight(f64),
    Failed(ProviderFailure),
}

/// Push handle given to a source when it is started.
///
/// Cloneable so platform callbacks can hold their own copy. Pushing after the
/// recorder shut down is silently dropped.
#[derive(Clone)]
pub struct ReadingSink {
    kind: SourceKind,
    interval: Option<Duration>,
    tx: mpsc::UnboundedSender<SensorEvent>,
}

impl ReadingSink {
    pub(crate) fn new(
        kind: SourceKind,
        interval: Option<Duration>,
        tx: mpsc::UnboundedSender<SensorEvent>,
    ) -> Self {
        Self { kind, interval, tx }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Update cadence the recorder asks for, if the quantity is sampled on a
    /// fixed interval (the magnetometer is).
    pub fn requested_interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn push(&self, event: SensorEvent) {
        let _ = self.tx.send(event);
    }

    pub fn fail(&self, reason: FailureReason) {
        self.push(SensorEvent::Failed(ProviderFailure {
            kind: self.kind,
            reason,
        }));
    }
}

/// A push-style provider (position, barometer, magnetometer, network path).
pub trait ReadingSource: Send {
    fn kind(&self) -> SourceKind;

    /// Probed once at setup; unavailable sources are never started.
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, sink: ReadingSink) -> Result<()>;

    fn stop(&mut self);
}

/// The pulled daylight statistic (cumulative minutes in daylight).
pub trait DaylightProvider: Send + Sync {
    /// Asked once at startup. `Ok(false)` means the user declined.
    fn request_authorization(&self) -> BoxFuture<'_, Result<bool>>;

    /// Cumulative minutes between `from` and `to`.
    fn cumulative_minutes(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> BoxFuture<'_, Result<f64>>;
}

/// The full provider set a recorder is built from. Any slot may be empty
/// when the host has no such provider.
#[derive(Default)]
pub struct SensorSources {
    pub position: Option<Box<dyn ReadingSource>>,
    pub barometer: Option<Box<dyn ReadingSource>>,
    pub magnetometer: Option<Box<dyn ReadingSource>>,
    pub network: Option<Box<dyn ReadingSource>>,
    pub daylight: Option<Arc<dyn DaylightProvider>>,
}
