//! # Metrics Accumulator
//!
//! Durable counters accumulated across every batch of every run: reviews
//! processed, total inference time, total estimated tokens. Averages are
//! derived on read, never stored.

use crate::constants::keys;
use crate::error::Result;
use crate::store::{read_counter, PropertyStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time view of the durable metrics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_reviews: u64,
    pub total_inference_time_ms: u64,
    pub total_tokens: u64,
}

impl MetricsSnapshot {
    /// Average wall-clock time per classified review, in milliseconds.
    pub fn avg_inference_time_ms(&self) -> f64 {
        if self.total_reviews == 0 {
            return 0.0;
        }
        self.total_inference_time_ms as f64 / self.total_reviews as f64
    }

    /// Average estimated tokens per classified review, rounded.
    pub fn avg_tokens(&self) -> u64 {
        if self.total_reviews == 0 {
            return 0;
        }
        (self.total_tokens as f64 / self.total_reviews as f64).round() as u64
    }
}

/// Accumulates batch totals into the durable property store.
#[derive(Clone)]
pub struct MetricsAccumulator {
    store: Arc<dyn PropertyStore>,
}

impl MetricsAccumulator {
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }

    /// Add one batch's totals to the durable counters.
    ///
    /// Reads the three counters, adds the contributions, and writes them
    /// back through `set_all` as one logical unit per invocation.
    pub fn add_batch(&self, count: u64, time_ms: u64, token_counts: &[u64]) -> Result<MetricsSnapshot> {
        let current = self.snapshot()?;
        let updated = MetricsSnapshot {
            total_reviews: current.total_reviews + count,
            total_inference_time_ms: current.total_inference_time_ms + time_ms,
            total_tokens: current.total_tokens + token_counts.iter().sum::<u64>(),
        };

        self.store.set_all(&[
            (keys::TOTAL_REVIEWS, updated.total_reviews.to_string()),
            (
                keys::TOTAL_INFERENCE_TIME_MS,
                updated.total_inference_time_ms.to_string(),
            ),
            (keys::TOTAL_TOKENS, updated.total_tokens.to_string()),
        ])?;

        Ok(updated)
    }

    /// Current counter values, substituting 0 for any absent counter.
    pub fn snapshot(&self) -> Result<MetricsSnapshot> {
        Ok(MetricsSnapshot {
            total_reviews: read_counter(self.store.as_ref(), keys::TOTAL_REVIEWS)?,
            total_inference_time_ms: read_counter(
                self.store.as_ref(),
                keys::TOTAL_INFERENCE_TIME_MS,
            )?,
            total_tokens: read_counter(self.store.as_ref(), keys::TOTAL_TOKENS)?,
        })
    }

    /// Operator reset: wipes all durable properties, counters and the
    /// progress cursor alike, so the next run starts fresh.
    pub fn reset(&self) -> Result<()> {
        self.store.delete_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn accumulator() -> MetricsAccumulator {
        MetricsAccumulator::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn test_snapshot_defaults_to_zero() {
        let metrics = accumulator();
        let snapshot = metrics.snapshot().unwrap();
        assert_eq!(snapshot.total_reviews, 0);
        assert_eq!(snapshot.total_inference_time_ms, 0);
        assert_eq!(snapshot.total_tokens, 0);
        assert_eq!(snapshot.avg_inference_time_ms(), 0.0);
        assert_eq!(snapshot.avg_tokens(), 0);
    }

    #[test]
    fn test_add_batch_accumulates() {
        let metrics = accumulator();
        metrics.add_batch(2, 300, &[10, 14]).unwrap();
        metrics.add_batch(1, 100, &[6]).unwrap();

        let snapshot = metrics.snapshot().unwrap();
        assert_eq!(snapshot.total_reviews, 3);
        assert_eq!(snapshot.total_inference_time_ms, 400);
        assert_eq!(snapshot.total_tokens, 30);
        assert_eq!(snapshot.avg_tokens(), 10);
        assert!((snapshot.avg_inference_time_ms() - 133.33).abs() < 0.01);
    }

    #[test]
    fn test_monotonic_across_batches() {
        let metrics = accumulator();
        let mut previous = metrics.snapshot().unwrap();
        for batch in 0..4u64 {
            let current = metrics.add_batch(batch, batch * 10, &[batch]).unwrap();
            assert!(current.total_reviews >= previous.total_reviews);
            assert!(current.total_inference_time_ms >= previous.total_inference_time_ms);
            assert!(current.total_tokens >= previous.total_tokens);
            previous = current;
        }
    }

    #[test]
    fn test_reset_clears_counters() {
        let metrics = accumulator();
        metrics.add_batch(5, 1_000, &[1, 2, 3, 4, 5]).unwrap();
        metrics.reset().unwrap();
        assert_eq!(metrics.snapshot().unwrap().total_reviews, 0);
    }
}
