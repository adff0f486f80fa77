use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Single-slot timer with "replace pending job" semantics.
///
/// `arm` aborts whatever timer is pending and schedules a new one. Once a
/// timer elapses its job is spawned as a detached task, so a later `arm` or
/// `cancel` only ever stops a timer that is still waiting, never a job that
/// has already started (an HTTP request in flight, for instance).
///
/// Must be used from within a tokio runtime.
pub struct Debouncer {
    name: &'static str,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn arm<F, Fut>(&self, delay: Duration, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = self.name;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("{} timer elapsed after {:?}", name, delay);
            tokio::spawn(job());
        });

        if let Some(previous) = self.slot().replace(timer) {
            if !previous.is_finished() {
                debug!("{} timer re-armed", name);
            }
            previous.abort();
        }
    }

    /// Clears the pending timer, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match self.slot().take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.slot().take() {
            handle.abort();
        }
    }
}
