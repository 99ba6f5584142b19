//! Quality Gate error type — exclusively for faults in the pluggable
//! linguistic scorer; metrics/verdict computation is pure and infallible.

use thiserror::Error;

use subgen_models::ErrorKind;

pub type QualityResult<T> = Result<T, QualityError>;

#[derive(Debug, Error)]
pub enum QualityError {
    #[error("linguistic scorer request failed: {0}")]
    ScorerUnavailable(String),

    #[error("linguistic scorer returned an out-of-range score: {0}")]
    ScoreOutOfRange(String),
}

impl QualityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QualityError::ScorerUnavailable(_) => ErrorKind::TransientIo,
            QualityError::ScoreOutOfRange(_) => ErrorKind::ModelOutputInvalid,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientIo)
    }
}
