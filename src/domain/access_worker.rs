//! Background processing of access-count increments.
//!
//! Resolution hands the target back to the caller first and records the access
//! afterwards: [`AccessRecorder::record`] enqueues an [`AccessEvent`] and
//! [`run_access_worker`] applies it to the store. An increment that fails on a
//! transient error is retried once; a final failure is logged and counted,
//! never dropped silently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, error, info, warn};

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::LinkStore;
use crate::error::AppError;

/// Number of extra attempts after a transient increment failure.
const INCREMENT_RETRIES: usize = 1;

/// Tuning knobs for [`run_access_worker`].
#[derive(Debug, Clone, Copy)]
pub struct AccessWorkerSettings {
    /// Maximum number of increments in flight at once.
    pub concurrency: usize,
    /// Pause before retrying a transient failure.
    pub retry_delay: Duration,
}

impl Default for AccessWorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_delay: Duration::from_millis(50),
        }
    }
}

/// Sending half of the access queue.
///
/// Cheap to clone; every clone feeds the same worker and shares one overflow
/// budget.
#[derive(Debug, Clone)]
pub struct AccessRecorder {
    sender: mpsc::Sender<AccessEvent>,
    overflow: Arc<Semaphore>,
    overflow_limit: usize,
}

/// Creates a bounded access queue.
///
/// Up to `capacity` further events may wait for room once the queue is full.
pub fn access_channel(capacity: usize) -> (AccessRecorder, mpsc::Receiver<AccessEvent>) {
    let (sender, receiver) = mpsc::channel(capacity);
    let recorder = AccessRecorder {
        sender,
        overflow: Arc::new(Semaphore::new(capacity)),
        overflow_limit: capacity,
    };
    (recorder, receiver)
}

impl AccessRecorder {
    /// Dispatches one increment without waiting for it.
    ///
    /// Must be called from within a Tokio runtime. When the queue is full the
    /// event is handed to a task that waits for room. At most as many events
    /// as the queue holds can wait this way; beyond that, and when the worker
    /// is gone, the lost increment is logged and counted.
    pub fn record(&self, event: AccessEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {
                metrics::counter!("link_access_dispatched_total").increment(1);
            }
            Err(TrySendError::Full(event)) => self.defer(event),
            Err(TrySendError::Closed(event)) => {
                report_lost(&event, "Access worker is not running, increment not recorded")
            }
        }
    }

    fn defer(&self, event: AccessEvent) {
        let Ok(permit) = self.overflow.clone().try_acquire_owned() else {
            report_lost(&event, "Access queue saturated, increment not recorded");
            return;
        };

        warn!(
            link_id = event.link_id,
            code = %event.code,
            "Access queue full, deferring increment"
        );
        let sender = self.sender.clone();
        tokio::spawn(async move {
            match sender.send(event).await {
                Ok(()) => {
                    metrics::counter!("link_access_dispatched_total").increment(1);
                }
                Err(mpsc::error::SendError(event)) => {
                    report_lost(&event, "Access worker is not running, increment not recorded")
                }
            }
            drop(permit);
        });
    }

    /// Returns true once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining queue slots.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Events currently waiting for room in a full queue.
    pub fn deferred(&self) -> usize {
        self.overflow_limit - self.overflow.available_permits()
    }
}

fn report_lost(event: &AccessEvent, message: &'static str) {
    metrics::counter!("link_access_failed_total").increment(1);
    error!(link_id = event.link_id, code = %event.code, "{}", message);
}

/// Applies queued access events to the store until every sender is dropped.
///
/// Events are processed concurrently up to `settings.concurrency`. On
/// shutdown the function waits for in-flight increments before returning.
pub async fn run_access_worker(
    mut rx: mpsc::Receiver<AccessEvent>,
    store: Arc<dyn LinkStore>,
    settings: AccessWorkerSettings,
) {
    let concurrency = settings.concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let store = store.clone();
        let retry_delay = settings.retry_delay;

        tokio::spawn(async move {
            process_event(store.as_ref(), &event, retry_delay).await;
            drop(permit);
        });
    }

    // All permits back means no increment is still running.
    if permits.acquire_many(concurrency as u32).await.is_err() {
        warn!("Access worker semaphore closed during drain");
    }
    info!("Access worker stopped");
}

async fn process_event(store: &dyn LinkStore, event: &AccessEvent, retry_delay: Duration) {
    match increment_with_retry(store, event.link_id, retry_delay).await {
        Ok(true) => debug!(link_id = event.link_id, code = %event.code, "Access recorded"),
        Ok(false) => warn!(
            link_id = event.link_id,
            code = %event.code,
            "Link deleted before access was recorded"
        ),
        Err(e) => {
            metrics::counter!("link_access_failed_total").increment(1);
            error!(
                link_id = event.link_id,
                code = %event.code,
                error = %e,
                "Failed to record access"
            );
        }
    }
}

/// Increments the access counter, retrying once on a transient error.
///
/// A retry after an ambiguous timeout can count the same access twice; that
/// risk is accepted rather than masked.
pub async fn increment_with_retry(
    store: &dyn LinkStore,
    link_id: i64,
    retry_delay: Duration,
) -> Result<bool, AppError> {
    let strategy = FixedInterval::new(retry_delay).take(INCREMENT_RETRIES);

    RetryIf::spawn(
        strategy,
        || store.increment_access(link_id),
        |e: &AppError| e.is_transient(),
    )
    .await
}
