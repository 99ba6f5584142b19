//! Job store error types.

use thiserror::Error;

/// Result type for job store operations.
pub type JobStoreResult<T> = Result<T, JobStoreError>;

/// Errors that can occur while persisting or loading a `Job`.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job already exists: {0}")]
    AlreadyExists(String),

    #[error("both canonical and backup records are corrupt for job {0}")]
    BothGenerationsCorrupt(String),

    #[error("unsupported schema version {found} for job {job_id} (expected {expected})")]
    UnsupportedSchemaVersion { job_id: String, found: u32, expected: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobStoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists(id.into())
    }

    /// Whether a subsequent `save`/`load` of the same job might succeed
    /// without operator intervention. Corruption and schema mismatches are
    /// not retryable; they require manual inspection of the record.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobStoreError::Io(_))
    }
}
