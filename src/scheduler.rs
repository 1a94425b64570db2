//! # Scheduler Adapter
//!
//! Arranges future invocations of the batch handler. The contract is only
//! the delay and the trigger-uniqueness invariant, never the mechanism:
//! the core checks before creating and deletes the firing trigger before
//! deciding whether to create the next one, so at most one trigger per
//! handler name exists at any time.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Trigger bookkeeping for the batch handler.
pub trait SchedulerAdapter: Send + Sync {
    /// Whether a trigger for `handler` is currently pending.
    fn has_pending_trigger(&self, handler: &str) -> bool;
    /// Arrange for `handler` to be invoked once after `delay`.
    fn schedule(&self, handler: &str, delay: Duration);
    /// Delete every pending trigger for `handler`.
    fn delete_triggers(&self, handler: &str);
}

/// Timer-task realization: each trigger is a spawned task that sleeps for
/// the delay and then sends the handler name on a channel. The receiving
/// side (see [`crate::controller::JobController::drive`]) invokes the
/// handler.
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<String>,
    pending: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl TokioScheduler {
    /// Create the scheduler and the channel on which fired handler names
    /// arrive.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fired, receiver) = mpsc::unbounded_channel();
        (
            Self {
                fired,
                pending: Arc::new(Mutex::new(HashMap::new())),
            },
            receiver,
        )
    }
}

impl SchedulerAdapter for TokioScheduler {
    fn has_pending_trigger(&self, handler: &str) -> bool {
        self.pending
            .lock()
            .get(handler)
            .is_some_and(|handle| !handle.is_finished())
    }

    fn schedule(&self, handler: &str, delay: Duration) {
        let mut pending = self.pending.lock();

        // The core checks before creating, but enforce uniqueness here
        // too: a replaced trigger is aborted, never left to fire twice.
        if let Some(previous) = pending.remove(handler) {
            if !previous.is_finished() {
                warn!(handler = %handler, "Replacing an existing pending trigger");
                previous.abort();
            }
        }

        let fired = self.fired.clone();
        let registry = Arc::clone(&self.pending);
        let name = handler.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            registry.lock().remove(&name);
            let _ = fired.send(name);
        });

        debug!(handler = %handler, delay_ms = delay.as_millis() as u64, "Trigger scheduled");
        pending.insert(handler.to_string(), handle);
    }

    fn delete_triggers(&self, handler: &str) {
        if let Some(handle) = self.pending.lock().remove(handler) {
            handle.abort();
            debug!(handler = %handler, "Trigger deleted");
        }
    }
}
