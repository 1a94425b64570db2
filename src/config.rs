use crate::constants::defaults;
use crate::error::{BatchError, Result};
use std::time::Duration;

/// Runtime configuration for the batch classification job.
///
/// Values come from [`Default`] and may be overridden through
/// `SENTIMENT_*` environment variables via [`BatchConfig::from_env`].
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Model identifier appended to the generateContent endpoint path.
    pub model_id: String,
    /// API key passed as a query parameter. Never logged.
    pub api_key: String,
    /// Base URL of the generative-language API.
    pub base_url: String,
    /// Rows attempted per tick.
    pub batch_size: usize,
    /// Delay before the first scheduled trigger fires.
    pub initial_delay_ms: u64,
    /// Cooldown between batches, pacing calls under API rate limits.
    pub cooldown_delay_ms: u64,
    /// Per-request timeout for classification calls.
    pub request_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            model_id: defaults::MODEL_ID.to_string(),
            api_key: String::new(),
            base_url: defaults::BASE_URL.to_string(),
            batch_size: defaults::BATCH_SIZE,
            initial_delay_ms: defaults::INITIAL_DELAY_MS,
            cooldown_delay_ms: defaults::COOLDOWN_DELAY_MS,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BatchConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(model_id) = std::env::var("SENTIMENT_MODEL_ID") {
            config.model_id = model_id;
        }

        if let Ok(api_key) = std::env::var("SENTIMENT_API_KEY") {
            config.api_key = api_key;
        }

        if let Ok(base_url) = std::env::var("SENTIMENT_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(batch_size) = std::env::var("SENTIMENT_BATCH_SIZE") {
            config.batch_size = batch_size
                .parse()
                .map_err(|e| BatchError::ConfigurationError(format!("Invalid batch_size: {e}")))?;
            if config.batch_size == 0 {
                return Err(BatchError::ConfigurationError(
                    "batch_size must be positive".to_string(),
                ));
            }
        }

        if let Ok(delay) = std::env::var("SENTIMENT_INITIAL_DELAY_MS") {
            config.initial_delay_ms = delay.parse().map_err(|e| {
                BatchError::ConfigurationError(format!("Invalid initial_delay_ms: {e}"))
            })?;
        }

        if let Ok(delay) = std::env::var("SENTIMENT_COOLDOWN_DELAY_MS") {
            config.cooldown_delay_ms = delay.parse().map_err(|e| {
                BatchError::ConfigurationError(format!("Invalid cooldown_delay_ms: {e}"))
            })?;
        }

        if let Ok(timeout) = std::env::var("SENTIMENT_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse().map_err(|e| {
                BatchError::ConfigurationError(format!("Invalid request_timeout_secs: {e}"))
            })?;
        }

        Ok(config)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn cooldown_delay(&self) -> Duration {
        Duration::from_millis(self.cooldown_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.initial_delay_ms, 1_000);
        assert_eq!(config.cooldown_delay_ms, 20_000);
        assert!(config.cooldown_delay() > config.initial_delay());
    }

    #[test]
    fn test_invalid_batch_size_rejected() {
        std::env::set_var("SENTIMENT_BATCH_SIZE", "zero");
        let result = BatchConfig::from_env();
        std::env::remove_var("SENTIMENT_BATCH_SIZE");
        assert!(matches!(result, Err(BatchError::ConfigurationError(_))));
    }
}
