#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Sentiment Batch
//!
//! Resumable batch scheduler core that incrementally classifies rows of
//! tabular text data (hotel reviews) by sentiment through an external
//! generative-language API.
//!
//! ## Overview
//!
//! The job processes small batches on a recurring timer to stay under
//! external API rate limits. Progress and metrics are durable: an
//! invocation may be killed and restarted at any point and the next tick
//! resumes from the last completed batch without duplicating work.
//!
//! ## Architecture
//!
//! The core is a **resumable batch-processing state machine**
//! (`Idle -> Scheduled -> Running -> (Scheduled | Idle)`) kept
//! single-flight by a trigger-uniqueness invariant rather than a lock.
//! Spreadsheet I/O, the prompt content, and the concrete API wire shape
//! are thin adapters behind the [`rows::RowSource`],
//! [`classifier::Classifier`], [`scheduler::SchedulerAdapter`], and
//! [`store::PropertyStore`] traits.
//!
//! ## Module Organization
//!
//! - [`controller`] - Job controller tying the runner to the scheduler
//! - [`runner`] - One bounded batch per invocation
//! - [`cursor`] - Durable resume position
//! - [`metrics`] - Durable counters accumulated across batches
//! - [`classifier`] - Classification client and error taxonomy
//! - [`rows`] - Row model and tabular store adapter
//! - [`scheduler`] - Trigger bookkeeping and timer realization
//! - [`store`] - Durable key-value persistence
//! - [`tokens`] - Character-class token estimation (metrics only)
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sentiment_batch::{
//!     BatchConfig, GeminiClassifier, InMemorySheet, JobController, JsonFileStore,
//!     TokioScheduler,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::from_env()?;
//! let classifier = Arc::new(GeminiClassifier::new(&config)?);
//! let store = Arc::new(JsonFileStore::open("job_state.json")?);
//! let sheet = Arc::new(InMemorySheet::new(&[
//!     ("the room was spotless", "x", ""),
//!     ("never coming back", "x", ""),
//! ]));
//! let (scheduler, mut fired) = TokioScheduler::new();
//!
//! let controller = JobController::new(sheet, Arc::new(scheduler), classifier, store, config);
//! controller.start().await?;
//! controller.drive(&mut fired).await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod constants;
pub mod controller;
pub mod cursor;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod prompt;
pub mod rows;
pub mod runner;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod tokens;

pub use classifier::{Classifier, ClassifierError, GeminiClassifier};
pub use config::BatchConfig;
pub use constants::BATCH_HANDLER;
pub use controller::{JobController, Started};
pub use cursor::ProgressCursor;
pub use error::{BatchError, Result};
pub use metrics::{MetricsAccumulator, MetricsSnapshot};
pub use rows::{load_rows, InMemorySheet, Row, RowSource, SheetColumn};
pub use runner::{BatchOutcome, BatchRunner};
pub use scheduler::{SchedulerAdapter, TokioScheduler};
pub use state::JobState;
pub use store::{InMemoryStore, JsonFileStore, PropertyStore};
pub use tokens::estimate_tokens;
