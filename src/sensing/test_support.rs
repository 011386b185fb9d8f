//! Hardware-free providers for exercising the recorder in tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};

use super::sources::{
    BoxFuture, DaylightProvider, FailureReason, ReadingSink, ReadingSource, SensorEvent,
    SensorSources, SourceKind,
};

#[derive(Default)]
struct FakeSourceShared {
    sink: Mutex<Option<ReadingSink>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

pub struct FakeSource {
    kind: SourceKind,
    available: bool,
    fail_start: bool,
    shared: Arc<FakeSourceShared>,
}

/// Test-side handle to push readings into a started [`FakeSource`].
#[derive(Clone)]
pub struct FakeSourceHandle {
    shared: Arc<FakeSourceShared>,
}

impl FakeSource {
    pub fn new(kind: SourceKind) -> (Self, FakeSourceHandle) {
        let shared = Arc::new(FakeSourceShared::default());
        let source = Self {
            kind,
            available: true,
            fail_start: false,
            shared: Arc::clone(&shared),
        };
        (source, FakeSourceHandle { shared })
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

impl ReadingSource for FakeSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, sink: ReadingSink) -> Result<()> {
        if self.fail_start {
            return Err(anyhow!("{} refused to start", self.kind));
        }
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        *self.shared.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        *self.shared.sink.lock().unwrap() = None;
    }
}

impl FakeSourceHandle {
    /// Pushes if the source is currently subscribed; returns whether it was.
    pub fn push(&self, event: SensorEvent) -> bool {
        match self.shared.sink.lock().unwrap().as_ref() {
            Some(sink) => {
                sink.push(event);
                true
            }
            None => false,
        }
    }

    pub fn fail(&self, reason: FailureReason) -> bool {
        match self.shared.sink.lock().unwrap().as_ref() {
            Some(sink) => {
                sink.fail(reason);
                true
            }
            None => false,
        }
    }

    pub fn requested_interval(&self) -> Option<Duration> {
        self.shared
            .sink
            .lock()
            .unwrap()
            .as_ref()
            .and_then(ReadingSink::requested_interval)
    }

    pub fn is_started(&self) -> bool {
        self.shared.sink.lock().unwrap().is_some()
    }

    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }
}

pub struct FakeDaylight {
    authorized: bool,
    minutes: Mutex<f64>,
    latency: Duration,
    queries: AtomicUsize,
}

impl FakeDaylight {
    pub fn new(authorized: bool, minutes: f64) -> Arc<Self> {
        Self::with_latency(authorized, minutes, Duration::ZERO)
    }

    pub fn with_latency(authorized: bool, minutes: f64, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            authorized,
            minutes: Mutex::new(minutes),
            latency,
            queries: AtomicUsize::new(0),
        })
    }

    pub fn set_minutes(&self, minutes: f64) {
        *self.minutes.lock().unwrap() = minutes;
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl DaylightProvider for FakeDaylight {
    fn request_authorization(&self) -> BoxFuture<'_, Result<bool>> {
        let authorized = self.authorized;
        Box::pin(async move { Ok(authorized) })
    }

    fn cumulative_minutes(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> BoxFuture<'_, Result<f64>> {
        Box::pin(async move {
            if from > to {
                return Err(anyhow!("query window starts after it ends"));
            }
            self.queries.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            Ok(*self.minutes.lock().unwrap())
        })
    }
}

/// Handles for every fake in a [`SensorSources`] bundle built by [`fake_sources`].
pub struct FakeHandles {
    pub position: FakeSourceHandle,
    pub barometer: FakeSourceHandle,
    pub magnetometer: FakeSourceHandle,
    pub network: FakeSourceHandle,
    pub daylight: Arc<FakeDaylight>,
}

pub fn fake_sources(daylight: Arc<FakeDaylight>) -> (SensorSources, FakeHandles) {
    let (position, position_handle) = FakeSource::new(SourceKind::Position);
    let (barometer, barometer_handle) = FakeSource::new(SourceKind::Barometer);
    let (magnetometer, magnetometer_handle) = FakeSource::new(SourceKind::Magnetometer);
    let (network, network_handle) = FakeSource::new(SourceKind::Network);

    let sources = SensorSources {
        position: Some(Box::new(position)),
        barometer: Some(Box::new(barometer)),
        magnetometer: Some(Box::new(magnetometer)),
        network: Some(Box::new(network)),
        daylight: Some(daylight.clone()),
    };
    let handles = FakeHandles {
        position: position_handle,
        barometer: barometer_handle,
        magnetometer: magnetometer_handle,
        network: network_handle,
        daylight,
    };
    (sources, handles)
}

/// Lets the dispatcher and any spawned queries run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
