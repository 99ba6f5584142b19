//! The scheduler's own error type: a thin `#[from]` wrapper over every
//! component crate's error, plus the scheduler-local faults (bad
//! configuration, job abandonment). `kind()` delegates to the wrapped
//! component where one exists; `subgen-jobstore` and `subgen-subtitles`
//! don't classify their own errors, so those two are mapped by hand.
//!
//! Grounded on `vclip-worker::error::WorkerError`, whose
//! `is_retryable`/`is_permanent_failure`/`is_quota_exceeded` trio is
//! replaced here by a single `kind()` call into [`crate::policy::for_kind`].

use subgen_models::ErrorKind;
use thiserror::Error;

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("media error: {0}")]
    Media(#[from] subgen_media::MediaError),

    #[error("storage error: {0}")]
    Storage(#[from] subgen_blob::StorageError),

    #[error("model error: {0}")]
    Model(#[from] subgen_modelclient::ModelError),

    #[error("quality error: {0}")]
    Quality(#[from] subgen_quality::QualityError),

    #[error("job store error: {0}")]
    JobStore(#[from] subgen_jobstore::JobStoreError),

    #[error("subtitle parse error: {0}")]
    Parse(#[from] subgen_subtitles::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("job abandoned")]
    Abandoned,
}

impl OrchestratorError {
    /// Classify per the C12 taxonomy (spec.md §4.11). This is the value
    /// `policy::for_kind` consumes to decide what the scheduler does next.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::Media(e) => e.kind(),
            OrchestratorError::Storage(e) => e.kind(),
            OrchestratorError::Model(e) => e.kind(),
            OrchestratorError::Quality(e) => e.kind(),
            // JobStoreError carries no kind() of its own: only Io(_) is
            // ever retryable, everything else (corruption, schema skew,
            // duplicate create) is a local invariant violation.
            OrchestratorError::JobStore(e) => {
                if e.is_retryable() {
                    ErrorKind::TransientIo
                } else {
                    ErrorKind::InvalidInput
                }
            }
            // A parse failure means the model's raw cue text didn't match
            // the cue grammar at all -- treat it the same as an
            // unparseable model response.
            OrchestratorError::Parse(_) => ErrorKind::ModelOutputInvalid,
            OrchestratorError::Io(_) => ErrorKind::TransientIo,
            OrchestratorError::Config(_) => ErrorKind::InvalidInput,
            OrchestratorError::Abandoned => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobstore_not_found_classifies_as_invalid_input() {
        let err = OrchestratorError::JobStore(subgen_jobstore::JobStoreError::not_found("x"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn jobstore_io_fault_classifies_as_transient() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk hiccup");
        let err = OrchestratorError::JobStore(subgen_jobstore::JobStoreError::Io(io_err));
        assert_eq!(err.kind(), ErrorKind::TransientIo);
    }

    #[test]
    fn parse_fault_classifies_as_model_output_invalid() {
        let err = OrchestratorError::Parse(subgen_subtitles::ParseError { line: 1, message: "bad".into() });
        assert_eq!(err.kind(), ErrorKind::ModelOutputInvalid);
    }

    #[test]
    fn abandoned_classifies_as_cancelled() {
        assert_eq!(OrchestratorError::Abandoned.kind(), ErrorKind::Cancelled);
    }
}
