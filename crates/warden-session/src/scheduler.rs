//! Trailing-debounce scheduler for session refreshes.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, trace};

use crate::lock;

/// A spawned task that is aborted when its handle is dropped.
pub(crate) struct ScopedTask {
    handle: JoinHandle<()>,
}

impl ScopedTask {
    /// Spawn `future` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScopedTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Coalesces bursts of refresh requests into a single deferred run.
///
/// Each [`request_refresh`](Self::request_refresh) (re)arms one timer; a
/// request arriving before the timer fires replaces it, so only the most
/// recent request survives. When the timer fires the task is started as an
/// independent in-flight run, so a later request never cancels a refresh
/// that is already talking to the backend.
///
/// Dropping the scheduler cancels the armed timer and aborts in-flight runs.
pub struct RefreshScheduler {
    delay: Duration,
    pending: Mutex<Option<ScopedTask>>,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl RefreshScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// The debounce window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer to run `task` once the debounce window elapses,
    /// replacing any timer that has not fired yet.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn request_refresh<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let in_flight = Arc::clone(&self.in_flight);

        let timer = ScopedTask::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!("refresh timer fired");
            let mut runs = lock(&in_flight);
            while runs.try_join_next().is_some() {}
            runs.spawn(task);
        });

        let previous = lock(&self.pending).replace(timer);
        if previous.is_some_and(|p| !p.is_finished()) {
            debug!(delay_ms = delay.as_millis() as u64, "superseded pending refresh");
        }
    }

    /// Returns true if a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Number of fired refreshes still running.
    pub fn in_flight(&self) -> usize {
        let mut runs = lock(&self.in_flight);
        while runs.try_join_next().is_some() {}
        runs.len()
    }

    /// Disarm the pending timer, leaving in-flight runs alone.
    pub fn cancel_pending(&self) {
        if lock(&self.pending).take().is_some() {
            trace!("pending refresh cancelled");
        }
    }

    /// Disarm the pending timer and abort every in-flight run.
    pub fn cancel_all(&self) {
        self.cancel_pending();
        lock(&self.in_flight).abort_all();
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
