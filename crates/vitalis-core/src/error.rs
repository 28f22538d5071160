use thiserror::Error;

/// Top-level error type for Vitalis.
#[derive(Debug, Error)]
pub enum VitalisError {
    /// A required reminder field was missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// No reminder with the given id in the buckets the operation looks at.
    #[error("not found: {0}")]
    NotFound(String),

    /// Durable storage read/write failed or returned undecodable data.
    #[error("storage error: {0}")]
    Storage(String),

    /// A notification could not be scheduled or cancelled.
    #[error("scheduling error: {0}")]
    Scheduling(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
