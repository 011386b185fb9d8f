use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::settings::RecorderSettings;

use super::adapter::AdapterState;
use super::loop_worker::{daylight_poll_loop, dispatch_loop};
use super::sources::{
    DaylightProvider, ReadingSink, ReadingSource, SensorEvent, SensorSources, SourceKind,
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Owns the provider subscriptions and the adapter state they feed.
pub struct SensingController {
    adapter: Arc<Mutex<AdapterState>>,
    events_tx: mpsc::UnboundedSender<SensorEvent>,
    dispatcher: Option<JoinHandle<()>>,
    dispatcher_token: CancellationToken,
    motion_sources: Vec<Box<dyn ReadingSource>>,
    network: Option<Box<dyn ReadingSource>>,
    daylight: Option<Arc<dyn DaylightProvider>>,
    daylight_authorized: bool,
    unavailable: Vec<SourceKind>,
    magnetometer_interval: Duration,
    daylight_poll_interval: Duration,
    poll_handle: Option<JoinHandle<()>>,
    poll_token: Option<CancellationToken>,
    active: bool,
}

impl SensingController {
    /// Probes availability, starts the always-on network source and asks for
    /// daylight permission once. Must be called inside a Tokio runtime.
    pub async fn new(sources: SensorSources, settings: &RecorderSettings) -> Self {
        let SensorSources {
            position,
            barometer,
            magnetometer,
            network,
            daylight,
        } = sources;

        let mut unavailable = Vec::new();
        let motion_sources: Vec<Box<dyn ReadingSource>> = [position, barometer, magnetometer]
            .into_iter()
            .flatten()
            .filter(|source| keep_if_available(&**source, &mut unavailable))
            .collect();
        let network = network.filter(|source| keep_if_available(&**source, &mut unavailable));

        let adapter = Arc::new(Mutex::new(AdapterState::new()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let dispatcher_token = CancellationToken::new();
        let dispatcher = tokio::spawn(dispatch_loop(
            Arc::clone(&adapter),
            events_rx,
            dispatcher_token.clone(),
        ));

        let daylight_authorized = match &daylight {
            Some(provider) => match provider.request_authorization().await {
                Ok(true) => true,
                Ok(false) => {
                    log_warn!("daylight statistic access not granted; value stays empty");
                    false
                }
                Err(err) => {
                    log_error!("daylight authorization request failed: {err:#}");
                    false
                }
            },
            None => false,
        };

        let mut controller = Self {
            adapter,
            events_tx,
            dispatcher: Some(dispatcher),
            dispatcher_token,
            motion_sources,
            network,
            daylight,
            daylight_authorized,
            unavailable,
            magnetometer_interval: settings.magnetometer_interval(),
            daylight_poll_interval: settings.daylight_poll_interval(),
            poll_handle: None,
            poll_token: None,
            active: false,
        };

        if let Some(mut network) = controller.network.take() {
            let sink = controller.sink_for(network.kind());
            if let Err(err) = network.start(sink) {
                log_error!("network path monitor failed to start: {err:#}");
            }
            controller.network = Some(network);
        }

        controller
    }

    pub fn adapter(&self) -> Arc<Mutex<AdapterState>> {
        Arc::clone(&self.adapter)
    }

    pub async fn readings(&self) -> AdapterState {
        self.adapter.lock().await.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn daylight_authorized(&self) -> bool {
        self.daylight_authorized
    }

    pub fn unavailable_sources(&self) -> &[SourceKind] {
        &self.unavailable
    }

    /// Subscribes the position, barometer and magnetometer providers and
    /// starts the daylight poll. A provider that fails to start is logged and
    /// skipped; the others still run.
    pub fn start_sensing(&mut self) -> Result<()> {
        if self.active {
            bail!("sensing already active");
        }

        let mut sources = std::mem::take(&mut self.motion_sources);
        for source in sources.iter_mut() {
            let sink = self.sink_for(source.kind());
            match source.start(sink) {
                Ok(()) => log_info!("{} provider started", source.kind()),
                Err(err) => log_error!("{} provider failed to start: {err:#}", source.kind()),
            }
        }
        self.motion_sources = sources;

        if let (Some(provider), true) = (&self.daylight, self.daylight_authorized) {
            let token = CancellationToken::new();
            let handle = tokio::spawn(daylight_poll_loop(
                Arc::clone(provider),
                self.events_tx.clone(),
                self.daylight_poll_interval,
                token.clone(),
            ));
            self.poll_token = Some(token);
            self.poll_handle = Some(handle);
        }

        self.active = true;
        Ok(())
    }

    pub async fn stop_sensing(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        for source in self.motion_sources.iter_mut() {
            source.stop();
        }

        if let Some(token) = self.poll_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.poll_handle.take() {
            handle.await.context("daylight poll task failed to join")?;
        }

        Ok(())
    }

    /// Stops everything, including the network monitor and the dispatcher.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stop_sensing().await?;

        if let Some(network) = self.network.as_mut() {
            network.stop();
        }

        self.dispatcher_token.cancel();
        if let Some(handle) = self.dispatcher.take() {
            handle.await.context("sensor dispatcher failed to join")?;
        }
        Ok(())
    }

    fn sink_for(&self, kind: SourceKind) -> ReadingSink {
        let interval = match kind {
            SourceKind::Magnetometer => Some(self.magnetometer_interval),
            _ => None,
        };
        ReadingSink::new(kind, interval, self.events_tx.clone())
    }
}

fn keep_if_available(source: &dyn ReadingSource, unavailable: &mut Vec<SourceKind>) -> bool {
    if source.is_available() {
        true
    } else {
        log_warn!("{} provider not available on this device; skipping", source.kind());
        unavailable.push(source.kind());
        false
    }
}
