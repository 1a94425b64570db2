//! # Batch Runner
//!
//! Processes one bounded, contiguous slice of rows per invocation: skips
//! ineligible rows, classifies eligible ones strictly in index order,
//! writes results through immediately, accumulates metrics, and advances
//! the durable cursor. Restart safety comes from the combination of
//! write-through results and eligibility re-checks, not from any lock.

use crate::classifier::Classifier;
use crate::cursor::ProgressCursor;
use crate::error::Result;
use crate::logging;
use crate::metrics::MetricsAccumulator;
use crate::prompt::build_contents;
use crate::rows::{Row, RowSource, SheetColumn};
use crate::tokens::estimate_tokens;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, trace, warn};

/// Result of one batch invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows successfully classified in this batch.
    pub processed_count: usize,
    /// First row index not covered by this batch window.
    pub end: usize,
    /// Whether rows remain beyond this batch window.
    pub has_more: bool,
}

/// Executes one batch of classification work.
pub struct BatchRunner {
    classifier: Arc<dyn Classifier>,
    metrics: MetricsAccumulator,
    batch_size: usize,
}

impl BatchRunner {
    /// `batch_size` of zero is clamped to one: a batch must always make
    /// forward progress.
    pub fn new(classifier: Arc<dyn Classifier>, metrics: MetricsAccumulator, batch_size: usize) -> Self {
        Self {
            classifier,
            metrics,
            batch_size: batch_size.max(1),
        }
    }

    /// Process the window `[cursor, cursor + batch_size)` clamped to the
    /// row count.
    ///
    /// The cursor advances to the end of the window unconditionally, even
    /// when every row was skipped or an auth failure aborted the batch:
    /// all-skipped regions still count as visited, which guarantees
    /// forward progress and prevents infinite reprocessing.
    pub async fn run_batch(
        &self,
        source: &dyn RowSource,
        rows: &[Row],
        cursor: &mut ProgressCursor,
    ) -> Result<BatchOutcome> {
        let start = cursor.value();
        let end = rows.len().min(start.saturating_add(self.batch_size));

        let mut processed: u64 = 0;
        let mut batch_time_ms: u64 = 0;
        let mut token_counts: Vec<u64> = Vec::new();

        for row in rows.iter().take(end).skip(start) {
            if !row.eligible() {
                trace!(row = row.index, "Row not eligible, skipping");
                continue;
            }

            let turns = build_contents(&row.input_text, row.aux_label.as_deref());
            let prompt_json = serde_json::to_string(&turns)?;
            let token_estimate = estimate_tokens(&prompt_json);

            let started = Instant::now();
            match self
                .classifier
                .classify(&row.input_text, row.aux_label.as_deref())
                .await
            {
                Ok(label) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    source.write_cell(SheetColumn::Result, row.index, &label)?;
                    batch_time_ms += elapsed_ms;
                    token_counts.push(token_estimate);
                    processed += 1;
                    info!(
                        row = row.index,
                        label = %label,
                        tokens = token_estimate,
                        duration_ms = elapsed_ms,
                        "Row classified"
                    );
                }
                Err(err) if err.is_fatal() => {
                    error!(
                        row = row.index,
                        error = %err,
                        "Credential rejected, aborting remaining rows in this batch"
                    );
                    break;
                }
                Err(err) => {
                    warn!(row = row.index, error = %err, "Row classification failed, continuing");
                }
            }
        }

        if processed > 0 {
            let avg_time_ms = batch_time_ms as f64 / processed as f64;
            let avg_tokens = (token_counts.iter().sum::<u64>() as f64
                / token_counts.len() as f64)
                .round() as u64;
            logging::log_batch_summary(processed, avg_time_ms, avg_tokens);
            self.metrics
                .add_batch(processed, batch_time_ms, &token_counts)?;
        }

        cursor.advance_to(end)?;

        Ok(BatchOutcome {
            processed_count: processed as usize,
            end,
            has_more: end < rows.len(),
        })
    }
}
