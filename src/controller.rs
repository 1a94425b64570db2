//! # Job Controller
//!
//! Ties the batch runner to the scheduler adapter. An external "run now"
//! signal calls [`JobController::start`]; thereafter the job drives itself
//! through scheduled triggers until every row has been visited. Trigger
//! uniqueness, not a lock, keeps the job single-flight.

use crate::classifier::Classifier;
use crate::config::BatchConfig;
use crate::constants::BATCH_HANDLER;
use crate::cursor::ProgressCursor;
use crate::error::Result;
use crate::logging;
use crate::metrics::{MetricsAccumulator, MetricsSnapshot};
use crate::rows::{self, is_truthy, RowSource, SheetColumn};
use crate::runner::{BatchOutcome, BatchRunner};
use crate::scheduler::SchedulerAdapter;
use crate::state::JobState;
use crate::store::PropertyStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// What a call to [`JobController::start`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Started {
    /// No non-empty flag cell exists; nothing was scheduled.
    NothingToProcess,
    /// A trigger was already pending; the call was a no-op.
    AlreadyScheduled,
    /// A trigger was created and the first batch ran synchronously.
    Running,
}

/// Orchestrates batches across ticks.
pub struct JobController {
    source: Arc<dyn RowSource>,
    scheduler: Arc<dyn SchedulerAdapter>,
    store: Arc<dyn PropertyStore>,
    runner: BatchRunner,
    metrics: MetricsAccumulator,
    config: BatchConfig,
    state: Mutex<JobState>,
}

impl JobController {
    pub fn new(
        source: Arc<dyn RowSource>,
        scheduler: Arc<dyn SchedulerAdapter>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn PropertyStore>,
        config: BatchConfig,
    ) -> Self {
        let metrics = MetricsAccumulator::new(store.clone());
        let runner = BatchRunner::new(classifier, metrics.clone(), config.batch_size);
        Self {
            source,
            scheduler,
            store,
            runner,
            metrics,
            config,
            state: Mutex::new(JobState::Idle),
        }
    }

    /// Current lifecycle state, for observability.
    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    /// External "run now" entry point.
    ///
    /// Idempotent: repeated calls while a job is in flight neither create
    /// duplicate triggers nor duplicate work.
    pub async fn start(&self) -> Result<Started> {
        let count = self.source.row_count()?;
        let flags = if count == 0 {
            Vec::new()
        } else {
            self.source.read_column_range(SheetColumn::Flag, 0, count)?
        };

        if !flags.iter().any(|flag| is_truthy(flag)) {
            info!("No flagged rows found; nothing to process");
            return Ok(Started::NothingToProcess);
        }

        if self.scheduler.has_pending_trigger(BATCH_HANDLER) {
            info!("A trigger is already pending for the batch handler");
            return Ok(Started::AlreadyScheduled);
        }

        self.scheduler
            .schedule(BATCH_HANDLER, self.config.initial_delay());
        *self.state.lock() = JobState::Scheduled;
        info!(
            delay_ms = self.config.initial_delay_ms,
            "Processing started; trigger set for the next batch"
        );

        // The first batch runs synchronously so work does not wait out
        // the initial delay.
        self.on_tick().await?;
        Ok(Started::Running)
    }

    /// One invocation of the batch handler, whether via trigger or the
    /// synchronous first call.
    pub async fn on_tick(&self) -> Result<BatchOutcome> {
        // Delete the trigger that caused this invocation before doing any
        // work, so the handler cannot re-fire while still running and a
        // doubly-delivered tick leaves no orphaned trigger behind.
        self.scheduler.delete_triggers(BATCH_HANDLER);
        *self.state.lock() = JobState::Running;

        let row_set = rows::load_rows(self.source.as_ref())?;
        let mut cursor = ProgressCursor::load(self.store.clone())?;
        let outcome = self
            .runner
            .run_batch(self.source.as_ref(), &row_set, &mut cursor)
            .await?;

        if outcome.has_more {
            if self.scheduler.has_pending_trigger(BATCH_HANDLER) {
                warn!("A trigger is already pending; not creating a second one");
            } else {
                self.scheduler
                    .schedule(BATCH_HANDLER, self.config.cooldown_delay());
            }
            *self.state.lock() = JobState::Scheduled;
            info!(next_start = outcome.end, "Scheduled next batch");
        } else {
            *self.state.lock() = JobState::Idle;
            info!("All rows processed");
            logging::log_final_metrics(&self.metrics.snapshot()?);
        }

        Ok(outcome)
    }

    /// Consume fired triggers until the job goes idle with nothing
    /// pending. Pair with [`crate::scheduler::TokioScheduler`].
    pub async fn drive(&self, fired: &mut mpsc::UnboundedReceiver<String>) -> Result<()> {
        loop {
            if self.state() == JobState::Idle && !self.scheduler.has_pending_trigger(BATCH_HANDLER)
            {
                return Ok(());
            }
            match fired.recv().await {
                Some(handler) if handler == BATCH_HANDLER => {
                    self.on_tick().await?;
                }
                Some(other) => {
                    warn!(handler = %other, "Ignoring trigger for unknown handler");
                }
                None => return Ok(()),
            }
        }
    }

    /// Current accumulated metrics, for operator inspection.
    pub fn current_metrics(&self) -> Result<MetricsSnapshot> {
        self.metrics.snapshot()
    }

    /// Operator reset: wipes metrics counters and the progress cursor.
    pub fn reset_metrics(&self) -> Result<()> {
        self.metrics.reset()?;
        info!("All metrics reset");
        Ok(())
    }
}
