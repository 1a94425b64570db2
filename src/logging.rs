//! # Structured Logging Module
//!
//! Environment-aware structured logging for the batch classification job.
//! Every row failure, batch summary, and final metrics line carries enough
//! context (row index, durations, counters) to diagnose a stalled job from
//! logs alone.

use crate::metrics::MetricsSnapshot;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level.clone())),
        );

        // Use try_init to avoid panic if a global subscriber already exists
        // (embedding applications commonly install their own).
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            environment = %environment,
            level = %log_level,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables.
fn get_environment() -> String {
    std::env::var("SENTIMENT_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment.
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log per-batch summary after a batch completes.
pub fn log_batch_summary(processed: u64, avg_time_ms: f64, avg_tokens: u64) {
    tracing::info!(
        processed = processed,
        avg_time_ms = %format!("{avg_time_ms:.2}"),
        avg_tokens = avg_tokens,
        timestamp = %Utc::now().to_rfc3339(),
        "Batch complete"
    );
}

/// Log the accumulated metrics once a job has exhausted all rows.
pub fn log_final_metrics(snapshot: &MetricsSnapshot) {
    if snapshot.total_reviews == 0 {
        return;
    }
    tracing::info!(
        total_reviews = snapshot.total_reviews,
        total_inference_time_ms = snapshot.total_inference_time_ms,
        avg_time_ms = %format!("{:.2}", snapshot.avg_inference_time_ms()),
        total_tokens = snapshot.total_tokens,
        avg_tokens = snapshot.avg_tokens(),
        timestamp = %Utc::now().to_rfc3339(),
        "Final metrics"
    );
}
