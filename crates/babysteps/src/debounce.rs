//! Cancel-and-reschedule deferred actions.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{trace, warn};

type Running = Arc<Mutex<Vec<JoinHandle<()>>>>;

/// Runs the most recently scheduled action once a quiet period has passed
/// without another [`schedule`](Self::schedule) call.
///
/// Only the timer is cancelable. Once it elapses the action is spawned as its
/// own task, so cancelling afterwards never interrupts work already started.
/// Started actions stay tracked until they finish; [`idle`](Self::idle)
/// waits for them.
///
/// All methods must be called from within a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    running: Running,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
            running: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, superseding whatever was pending.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let running = Arc::clone(&self.running);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!("Debounce window elapsed");
            let mut running = lock(&running);
            running.retain(|task| !task.is_finished());
            running.push(tokio::spawn(action));
        });

        if let Some(previous) = lock(&self.pending).replace(timer) {
            previous.abort();
        }
    }

    /// Drop the pending action, if any. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match lock(&self.pending).take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether an action is waiting for its quiet period to end.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Wait until every action that has already started has finished.
    ///
    /// A pending action is left alone and may start after this returns.
    pub async fn idle(&self) {
        loop {
            let started = std::mem::take(&mut *lock(&self.running));
            if started.is_empty() {
                return;
            }
            for task in started {
                if let Err(e) = task.await {
                    if e.is_panic() {
                        warn!("Debounced action panicked: {e}");
                    }
                }
            }
        }
    }

    /// Cancel the pending action and wait for started ones to finish.
    ///
    /// Once this returns no action scheduled so far will run again.
    pub async fn stop(&self) {
        let timer = lock(&self.pending).take();
        if let Some(timer) = timer {
            timer.abort();
            // An abort racing the timer's final poll may still start the action
            let _ = timer.await;
        }
        self.idle().await;
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
