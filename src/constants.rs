//! # System Constants
//!
//! Core constants that define the operational boundaries of the batch
//! classification job: the scheduler handler name, durable property keys,
//! and default tuning values.

/// Handler name under which batch triggers are registered with the
/// scheduler adapter. Trigger uniqueness is enforced per handler name.
pub const BATCH_HANDLER: &str = "process_next_batch";

/// Keys under which durable job state is persisted in the property store.
pub mod keys {
    /// Index of the first row not yet attempted (the progress cursor).
    pub const LAST_PROCESSED_INDEX: &str = "last_processed_index";
    /// Cumulative count of successfully classified reviews.
    pub const TOTAL_REVIEWS: &str = "total_reviews";
    /// Cumulative wall-clock time spent in classification calls.
    pub const TOTAL_INFERENCE_TIME_MS: &str = "total_inference_time_ms";
    /// Cumulative estimated prompt tokens across all classified rows.
    pub const TOTAL_TOKENS: &str = "total_tokens";
}

/// Default tuning values, overridable through [`crate::config::BatchConfig`].
pub mod defaults {
    /// Rows attempted per tick. Deliberately small to stay under API quota.
    pub const BATCH_SIZE: usize = 3;
    /// Delay before the first scheduled trigger fires.
    pub const INITIAL_DELAY_MS: u64 = 1_000;
    /// Cooldown between batches. Much longer than the initial delay so a
    /// long job paces itself under external rate limits.
    pub const COOLDOWN_DELAY_MS: u64 = 20_000;
    /// Per-request timeout for classification calls.
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub const MODEL_ID: &str = "gemini-1.5-pro-latest";
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com";

    /// Deterministic decoding parameters for classification.
    pub const MAX_OUTPUT_TOKENS: u32 = 8_192;
    pub const TEMPERATURE: f32 = 0.0;
    pub const TOP_P: f32 = 0.95;
}
