use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    StoreError(String),
    RowSourceError(String),
    SchedulerError(String),
    ConfigurationError(String),
    SerializationError(String),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::StoreError(msg) => write!(f, "Store error: {msg}"),
            BatchError::RowSourceError(msg) => write!(f, "Row source error: {msg}"),
            BatchError::SchedulerError(msg) => write!(f, "Scheduler error: {msg}"),
            BatchError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            BatchError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for BatchError {}

impl From<serde_json::Error> for BatchError {
    fn from(err: serde_json::Error) -> Self {
        BatchError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
