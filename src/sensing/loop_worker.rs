use std::sync::Arc;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::adapter::AdapterState;
use super::sources::{DaylightProvider, FailureReason, ProviderFailure, SensorEvent, SourceKind};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Single writer of adapter state: every provider event funnels through here.
pub async fn dispatch_loop(
    adapter: Arc<Mutex<AdapterState>>,
    mut events: mpsc::UnboundedReceiver<SensorEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("sensor dispatcher shutting down");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    log_info!("sensor event channel closed");
                    break;
                };
                adapter.lock().await.apply(event);
            }
        }
    }
}

/// Queries the daylight statistic immediately, then on every `every` tick
/// until cancelled.
///
/// Each query runs detached, so one issued before cancellation still lands
/// in the adapter if it completes afterwards.
pub async fn daylight_poll_loop(
    provider: Arc<dyn DaylightProvider>,
    events: mpsc::UnboundedSender<SensorEvent>,
    every: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_debug!("daylight poll loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                spawn_daylight_query(Arc::clone(&provider), events.clone());
            }
        }
    }
}

fn spawn_daylight_query(
    provider: Arc<dyn DaylightProvider>,
    events: mpsc::UnboundedSender<SensorEvent>,
) {
    tokio::spawn(async move {
        let now = Local::now();
        let event = match provider.cumulative_minutes(start_of_day(now), now).await {
            Ok(minutes) => SensorEvent::Daylight(minutes),
            Err(err) => SensorEvent::Failed(ProviderFailure {
                kind: SourceKind::Daylight,
                reason: FailureReason::Other(format!("{err:#}")),
            }),
        };
        let _ = events.send(event);
    });
}

/// Local midnight of the day containing `now`, or the first instant of that
/// day that exists when a DST jump skips midnight.
pub(crate) fn start_of_day(now: DateTime<Local>) -> DateTime<Local> {
    first_local_instant(now.date_naive(), |at| at.and_local_timezone(Local)).unwrap_or(now)
}

/// Walks forward from midnight in quarter hours until `resolve` maps the wall
/// time to a real instant. Offset transitions fall on quarter-hour boundaries.
fn first_local_instant<T>(
    date: NaiveDate,
    resolve: impl Fn(NaiveDateTime) -> LocalResult<T>,
) -> Option<T> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..24 * 4)
        .map(|quarter| midnight + chrono::Duration::minutes(15 * quarter))
        .find_map(|at| resolve(at).earliest())
}
