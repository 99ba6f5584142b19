//! Model Adapter error types.

use thiserror::Error;

use subgen_models::ErrorKind;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    RequestFailed(String),

    #[error("model response could not be parsed: {0}")]
    ResponseInvalid(String),

    #[error("upstream quota or rate limit exceeded: {0}")]
    QuotaExceeded(String),

    #[error("credential missing or permission denied: {0}")]
    AuthFailed(String),

    #[error("no prompt template registered for language {language:?} mode {mode:?}")]
    NoTemplate { language: String, mode: Option<String> },

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Classify per the C12 taxonomy so the scheduler's fixed policy table
    /// can decide retry/pause/fail without inspecting this crate's types
    /// (spec.md §4.5: "Quota errors are surfaced as a distinct kind").
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            ModelError::AuthFailed(_) => ErrorKind::AuthFault,
            ModelError::ResponseInvalid(_) => ErrorKind::ModelOutputInvalid,
            ModelError::NoTemplate { .. } => ErrorKind::InvalidInput,
            ModelError::RequestFailed(_) | ModelError::Timeout(_) | ModelError::Io(_) => ErrorKind::TransientIo,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientIo)
    }
}
