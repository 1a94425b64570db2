//! Shared test doubles for the integration tests: a scripted classifier
//! and a recording scheduler that never actually fires.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sentiment_batch::{Classifier, ClassifierError, SchedulerAdapter};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Classifier returning scripted responses in order; once the script is
/// exhausted every call succeeds with `"positive"`. Records the text of
/// every call so tests can assert exactly which rows hit the API.
#[derive(Default)]
pub struct ScriptedClassifier {
    responses: Mutex<VecDeque<Result<String, ClassifierError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, label: &str) {
        self.responses.lock().push_back(Ok(label.to_string()));
    }

    pub fn push_err(&self, err: ClassifierError) {
        self.responses.lock().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(
        &self,
        text: &str,
        _aux_label: Option<&str>,
    ) -> Result<String, ClassifierError> {
        self.calls.lock().push(text.to_string());
        match self.responses.lock().pop_front() {
            Some(response) => response,
            None => Ok("positive".to_string()),
        }
    }
}

/// Scheduler that records trigger bookkeeping without ever firing.
/// Flags any attempt to create a second trigger for a handler that
/// already has one pending, so tests can assert trigger uniqueness.
#[derive(Default)]
pub struct RecordingScheduler {
    pending: Mutex<HashMap<String, Duration>>,
    schedule_log: Mutex<Vec<(String, Duration)>>,
    delete_count: Mutex<usize>,
    overlap_detected: Mutex<bool>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a pending trigger, simulating a job already in flight.
    pub fn seed_trigger(&self, handler: &str, delay: Duration) {
        self.pending.lock().insert(handler.to_string(), delay);
    }

    pub fn schedule_log(&self) -> Vec<(String, Duration)> {
        self.schedule_log.lock().clone()
    }

    pub fn delete_count(&self) -> usize {
        *self.delete_count.lock()
    }

    /// True if two triggers for the same handler ever coexisted.
    pub fn overlap_detected(&self) -> bool {
        *self.overlap_detected.lock()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl SchedulerAdapter for RecordingScheduler {
    fn has_pending_trigger(&self, handler: &str) -> bool {
        self.pending.lock().contains_key(handler)
    }

    fn schedule(&self, handler: &str, delay: Duration) {
        let mut pending = self.pending.lock();
        if pending.contains_key(handler) {
            *self.overlap_detected.lock() = true;
        }
        pending.insert(handler.to_string(), delay);
        self.schedule_log.lock().push((handler.to_string(), delay));
    }

    fn delete_triggers(&self, handler: &str) {
        if self.pending.lock().remove(handler).is_some() {
            *self.delete_count.lock() += 1;
        }
    }
}
